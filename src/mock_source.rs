// Scripted in-memory listing source for coordinator and trigger tests

use crate::error::FetchError;
use crate::intent::ListingQuery;
use crate::listing::{ListingId, ListingPage, ListingRecord};
use crate::source::ListingSource;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{oneshot, Mutex};

pub fn stays(ids: impl IntoIterator<Item = u64>) -> Vec<ListingRecord> {
    ids.into_iter()
        .map(|id| ListingRecord::new(id, format!("stay {}", id)))
        .collect()
}

// Key a scripted page by the filters it answers plus the page number
type PageKey = (Option<String>, Option<String>, u32);

fn key_of(query: &ListingQuery) -> PageKey {
    (query.location.clone(), query.category.clone(), query.page)
}

pub struct MockListingSource {
    pages: Mutex<HashMap<PageKey, ListingPage>>,
    listings: Mutex<HashMap<ListingId, ListingRecord>>,
    failures: Mutex<VecDeque<FetchError>>,
    holds: Mutex<VecDeque<oneshot::Receiver<()>>>,
    seen: Mutex<Vec<ListingQuery>>,
    request_count: AtomicUsize,
    detail_count: AtomicUsize,
}

impl MockListingSource {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            listings: Mutex::new(HashMap::new()),
            failures: Mutex::new(VecDeque::new()),
            holds: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
            request_count: AtomicUsize::new(0),
            detail_count: AtomicUsize::new(0),
        }
    }

    pub async fn add_page(
        &self,
        location: Option<&str>,
        category: Option<&str>,
        page: u32,
        items: Vec<ListingRecord>,
    ) {
        let key = (location.map(String::from), category.map(String::from), page);
        self.pages.lock().await.insert(key, ListingPage::new(items));
    }

    pub async fn add_listing(&self, record: ListingRecord) {
        self.listings.lock().await.insert(record.id.clone(), record);
    }

    pub async fn fail_next(&self, error: FetchError) {
        self.failures.lock().await.push_back(error);
    }

    // The next page request blocks until the returned sender fires (or is dropped)
    pub async fn hold_next(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.holds.lock().await.push_back(gate);
        release
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn detail_count(&self) -> usize {
        self.detail_count.load(Ordering::SeqCst)
    }

    pub async fn seen_queries(&self) -> Vec<ListingQuery> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl ListingSource for MockListingSource {
    async fn fetch_page(&self, query: &ListingQuery) -> Result<ListingPage, FetchError> {
        // Claim the gate before the request becomes observable to the test
        let gate = self.holds.lock().await.pop_front();
        self.seen.lock().await.push(query.clone());
        self.request_count.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if let Some(error) = self.failures.lock().await.pop_front() {
            return Err(error);
        }

        // Unscripted pages are empty, which reads as "no more pages"
        Ok(self
            .pages
            .lock()
            .await
            .get(&key_of(query))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_listing(&self, id: &ListingId) -> Result<ListingRecord, FetchError> {
        self.detail_count.fetch_add(1, Ordering::SeqCst);
        self.listings
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.clone()))
    }
}
