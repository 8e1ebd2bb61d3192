// Ordered, id-unique accumulation of listing records

use crate::listing::{ListingId, ListingRecord};
use std::collections::HashSet;

// Records in arrival order. No two records share an id; every mutating
// method keeps that invariant, so callers never dedup by hand.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<ListingRecord>,
    ids: HashSet<ListingId>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Build from an arbitrary batch; later duplicates of an id are dropped
    pub fn from_records(records: Vec<ListingRecord>) -> Self {
        let mut set = Self::new();
        set.extend_unique(records);
        set
    }

    // Appends the record unless its id is already present
    pub fn push(&mut self, record: ListingRecord) -> bool {
        if self.ids.insert(record.id.clone()) {
            self.records.push(record);
            true
        } else {
            false
        }
    }

    // Returns how many records were actually appended
    pub fn extend_unique(&mut self, records: impl IntoIterator<Item = ListingRecord>) -> usize {
        records
            .into_iter()
            .map(|record| self.push(record))
            .filter(|added| *added)
            .count()
    }

    pub fn replace(&mut self, records: Vec<ListingRecord>) -> usize {
        self.clear();
        self.extend_unique(records)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.ids.clear();
    }

    pub fn contains(&self, id: &ListingId) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &ListingId) -> Option<&ListingRecord> {
        if !self.contains(id) {
            return None;
        }
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListingRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn ids(&self) -> impl Iterator<Item = &ListingId> {
        self.records.iter().map(|record| &record.id)
    }
}

impl PartialEq for ResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ListingRecord;
    type IntoIter = std::slice::Iter<'a, ListingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
