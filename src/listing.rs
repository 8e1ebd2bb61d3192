// Wire types for listing records returned by the listing source

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

// Records arrive with either string or numeric ids depending on the source
// version; both normalize to the same textual identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        ListingId(value.to_string())
    }
}

impl From<String> for ListingId {
    fn from(value: String) -> Self {
        ListingId(value)
    }
}

impl From<u64> for ListingId {
    fn from(value: u64) -> Self {
        ListingId(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => ListingId(text),
            RawId::Number(number) => ListingId(number.to_string()),
        })
    }
}

// Optional display fields drop to `None` when their shape is wrong so one bad
// value does not reject the whole page
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price_per_night: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    // Untrusted fields whose shape drifts between source versions
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListingRecord {
    pub fn new(id: impl Into<ListingId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            price_per_night: None,
            price: None,
            rating: None,
            category: None,
            extra: Map::new(),
        }
    }

    pub fn nightly_price(&self) -> Option<f64> {
        self.price_per_night.or(self.price)
    }

    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref().map(crate::category::label_for)
    }

    // Image URL under either of the spellings seen on the wire
    pub fn image_url(&self) -> Option<&str> {
        ["image_url", "imageUrl"]
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(Value::as_str))
    }
}

// One page from `GET /hotels`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    pub items: Vec<ListingRecord>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl ListingPage {
    pub fn new(items: Vec<ListingRecord>) -> Self {
        let count = Some(items.len());
        Self {
            items,
            count,
            total: None,
        }
    }

    pub fn record_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_string_ids_normalize() {
        let page: ListingPage = serde_json::from_str(
            r#"{"items":[{"id":12,"name":"A"},{"id":"12","name":"B"}],"total":40}"#,
        )
        .unwrap();
        assert_eq!(page.items[0].id, page.items[1].id);
        assert_eq!(page.items[0].id.as_str(), "12");
        assert_eq!(page.total, Some(40));
        assert_eq!(page.count, None);
        assert_eq!(page.record_count(), 2);
    }

    #[test]
    fn test_price_fallback_and_extra_fields() {
        let record: ListingRecord = serde_json::from_str(
            r#"{
                "id": 3,
                "name": "한옥스테이 북촌",
                "address": null,
                "price": 120000,
                "category": "B02011600",
                "image_url": "https://img.example.com/3.jpg",
                "badges": ["new"]
            }"#,
        )
        .unwrap();
        assert_eq!(record.address, None);
        assert_eq!(record.nightly_price(), Some(120000.0));
        assert_eq!(record.category_label(), Some("한옥"));
        assert_eq!(record.image_url(), Some("https://img.example.com/3.jpg"));
        assert!(record.extra.contains_key("badges"));

        let preferred = ListingRecord {
            price_per_night: Some(90000.0),
            price: Some(120000.0),
            ..ListingRecord::new("4", "Hotel")
        };
        assert_eq!(preferred.nightly_price(), Some(90000.0));
    }

    #[test]
    fn test_large_and_fractional_numeric_ids_are_kept() {
        let page: ListingPage = serde_json::from_str(
            r#"{"items":[{"id":18446744073709551615,"name":"A"},{"id":3.0,"name":"B"}]}"#,
        )
        .unwrap();
        assert_eq!(page.items[0].id.as_str(), "18446744073709551615");
        assert_eq!(page.items[1].id.as_str(), "3.0");
    }

    #[test]
    fn test_malformed_optional_field_keeps_rest_of_page() {
        let page: ListingPage = serde_json::from_str(
            r#"{"items":[
                {"id":1,"name":"A","rating":"4.5","price":70000},
                {"id":2,"name":"B","rating":4.1,"address":{"line":"x"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(page.record_count(), 2);
        assert_eq!(page.items[0].rating, None);
        assert_eq!(page.items[0].nightly_price(), Some(70000.0));
        assert_eq!(page.items[1].rating, Some(4.1));
        assert_eq!(page.items[1].address, None);
    }

    #[test]
    fn test_record_without_id_is_rejected() {
        let result = serde_json::from_str::<ListingRecord>(r#"{"name":"nameless"}"#);
        assert!(result.is_err());
    }
}
