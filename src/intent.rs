// Search intent normalization
//
// Raw user input is normalized once into an immutable `SearchIntent`; the
// outgoing `ListingQuery` is derived from the intent and never carries empty
// filters.

use crate::category;
use crate::error::FetchError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Raw values as typed into the search bar and filter chips
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInput {
    pub query: String,
    pub category_label: String,
    pub stay: Option<StayFilter>,
}

impl SearchInput {
    pub fn new(query: impl Into<String>, category_label: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category_label: category_label.into(),
            stay: None,
        }
    }

    pub fn with_stay(mut self, stay: StayFilter) -> Self {
        self.stay = Some(stay);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayFilter {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
}

impl StayFilter {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
            adults: 1,
            children: 0,
        }
    }

    pub fn guests(mut self, adults: u32, children: u32) -> Self {
        self.adults = adults;
        self.children = children;
        self
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    fn validate(&self) -> Result<(), FetchError> {
        if self.check_out <= self.check_in {
            return Err(FetchError::Validation(format!(
                "check-out {} must be after check-in {}",
                self.check_out, self.check_in
            )));
        }
        if self.adults == 0 {
            return Err(FetchError::Validation(
                "at least one adult is required".to_string(),
            ));
        }
        Ok(())
    }
}

// The user's current search, already normalized.
//
// `query` and `category` are `None` when the corresponding filter is absent;
// an empty string is never stored. A new value is built on every filter
// change or page advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIntent {
    query: Option<String>,
    category: Option<String>,
    stay: Option<StayFilter>,
    page: u32,
}

impl SearchIntent {
    pub fn from_input(input: &SearchInput) -> Result<Self, FetchError> {
        if let Some(stay) = &input.stay {
            stay.validate()?;
        }

        let query = input.query.trim();
        Ok(Self {
            query: (!query.is_empty()).then(|| query.to_string()),
            category: category::code_for(&input.category_label),
            stay: input.stay,
            page: 1,
        })
    }

    // Same filters, different page
    pub fn at_page(&self, page: u32) -> Result<Self, FetchError> {
        if page == 0 {
            return Err(FetchError::Validation(
                "page must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            page,
            ..self.clone()
        })
    }

    pub fn first_page(&self) -> Self {
        Self {
            page: 1,
            ..self.clone()
        }
    }

    pub fn next_page(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn stay(&self) -> Option<&StayFilter> {
        self.stay.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_first_page(&self) -> bool {
        self.page == 1
    }

    // True when both intents describe the same search, ignoring the page
    pub fn same_search(&self, other: &SearchIntent) -> bool {
        self.query == other.query && self.category == other.category && self.stay == other.stay
    }

    pub fn to_query(&self) -> ListingQuery {
        ListingQuery {
            location: self.query.clone(),
            category: self.category.clone(),
            stay: self.stay,
            page: self.page,
        }
    }
}

impl Default for SearchIntent {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            stay: None,
            page: 1,
        }
    }
}

// Outgoing parameters for `GET /hotels`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub location: Option<String>,
    pub category: Option<String>,
    pub stay: Option<StayFilter>,
    pub page: u32,
}

impl ListingQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(stay) = &self.stay {
            pairs.push(("check_in", stay.check_in.format("%Y-%m-%d").to_string()));
            pairs.push(("check_out", stay.check_out.format("%Y-%m-%d").to_string()));
            pairs.push(("adults", stay.adults.to_string()));
            pairs.push(("children", stay.children.to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs
    }
}
