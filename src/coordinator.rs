// Fetch coordinator: owns the query state and drives requests against a
// listing source.
//
// Every request is tagged with the generation of the search that issued it.
// A new first-page search or a shutdown bumps the generation, so a response
// that settles afterwards is dropped instead of merged. The state lock is
// never held across an await.

use crate::error::FetchError;
use crate::intent::{SearchInput, SearchIntent};
use crate::listing::{ListingId, ListingRecord};
use crate::source::ListingSource;
use crate::state::{merge, PagerPhase, QueryState};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Loaded {
        page: u32,
        added: usize,
        has_more: bool,
    },
    Ignored(IgnoreReason),
    // Settled after its search was superseded or the coordinator shut down
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    InFlight,
    Exhausted,
    ShutDown,
    NothingToRetry,
}

struct Shared {
    state: QueryState,
    generation: u64,
    // Intent of the last failed request, if it is still worth retrying
    retry: Option<SearchIntent>,
    shut_down: bool,
}

pub struct FetchCoordinator<S: ListingSource> {
    source: Arc<S>,
    shared: Mutex<Shared>,
    details: DashMap<ListingId, ListingRecord>,
    updates: watch::Sender<QueryState>,
}

impl<S: ListingSource> FetchCoordinator<S> {
    pub fn new(source: Arc<S>) -> Self {
        let (updates, _) = watch::channel(QueryState::default());
        Self {
            source,
            shared: Mutex::new(Shared {
                state: QueryState::default(),
                generation: 0,
                retry: None,
                shut_down: false,
            }),
            details: DashMap::new(),
            updates,
        }
    }

    pub fn snapshot(&self) -> QueryState {
        self.shared.lock().state.clone()
    }

    // Receives a fresh snapshot after every state transition
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.updates.subscribe()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.lock().shut_down
    }

    // Normalize raw search-bar input and start a new search at page 1
    pub async fn search(&self, input: &SearchInput) -> Result<Outcome, FetchError> {
        match SearchIntent::from_input(input) {
            Ok(intent) => self.request(intent).await,
            Err(err) => {
                warn!(error = %err, "rejected search input");
                let mut shared = self.shared.lock();
                shared.state.last_error = Some(err.clone());
                self.publish(&shared.state);
                Err(err)
            }
        }
    }

    // Issue exactly one page request for `intent` and fold the result in.
    //
    // A first-page intent always starts a new search: the state is reset and
    // anything still in flight becomes stale. A later page must continue the
    // current search and is ignored while another request is in flight or
    // after the search is exhausted.
    pub async fn request(&self, intent: SearchIntent) -> Result<Outcome, FetchError> {
        let generation = {
            let mut shared = self.shared.lock();
            if shared.shut_down {
                return Ok(Outcome::Ignored(IgnoreReason::ShutDown));
            }

            if intent.is_first_page() {
                shared.generation += 1;
                shared.state = QueryState::for_intent(intent.clone());
                shared.retry = None;
            } else {
                if !intent.same_search(&shared.state.intent) {
                    return Err(FetchError::Validation(
                        "page continuation does not match the current search".to_string(),
                    ));
                }
                if shared.state.is_loading() {
                    return Ok(Outcome::Ignored(IgnoreReason::InFlight));
                }
                if shared.state.is_exhausted() {
                    return Ok(Outcome::Ignored(IgnoreReason::Exhausted));
                }
            }

            shared.state.begin_loading();
            self.publish(&shared.state);
            shared.generation
        };
        let mut pending = PendingRequest {
            coordinator: self,
            generation,
            armed: true,
        };

        let span = info_span!("listing_request", generation, page = intent.page());
        let result = self
            .source
            .fetch_page(&intent.to_query())
            .instrument(span)
            .await;

        pending.armed = false;
        let mut shared = self.shared.lock();
        if shared.shut_down || shared.generation != generation {
            warn!(
                generation,
                current = shared.generation,
                page = intent.page(),
                "discarding response for superseded search"
            );
            return Ok(Outcome::Discarded);
        }

        match result {
            Ok(page) => {
                let before = if intent.is_first_page() {
                    0
                } else {
                    shared.state.results.len()
                };
                let state = std::mem::take(&mut shared.state);
                shared.state = merge(state, &intent, page);
                shared.retry = None;

                let outcome = Outcome::Loaded {
                    page: intent.page(),
                    added: shared.state.results.len() - before,
                    has_more: shared.state.paging.has_more,
                };
                info!(
                    page = intent.page(),
                    total = shared.state.results.len(),
                    ?outcome,
                    "merged listing page"
                );
                self.publish(&shared.state);
                Ok(outcome)
            }
            Err(err) => {
                warn!(page = intent.page(), error = %err, "listing request failed");
                shared.state.fail(err.clone());
                shared.retry = Some(intent);
                self.publish(&shared.state);
                Err(err)
            }
        }
    }

    // Scroll-intersection entry point: request the page after the last one
    // loaded, unless a request is in flight or the search is exhausted
    pub async fn load_next(&self) -> Result<Outcome, FetchError> {
        let next = {
            let shared = self.shared.lock();
            if shared.shut_down {
                return Ok(Outcome::Ignored(IgnoreReason::ShutDown));
            }
            if shared.state.is_loading() {
                debug!("scroll signal ignored, request in flight");
                return Ok(Outcome::Ignored(IgnoreReason::InFlight));
            }
            if !shared.state.can_advance() {
                return Ok(Outcome::Ignored(IgnoreReason::Exhausted));
            }
            shared.state.next_intent()
        };
        self.request(next).await
    }

    // Re-issue the last failed request if it still belongs to the current search
    pub async fn retry(&self) -> Result<Outcome, FetchError> {
        let intent = {
            let mut shared = self.shared.lock();
            if shared.shut_down {
                return Ok(Outcome::Ignored(IgnoreReason::ShutDown));
            }
            // Keep the failed intent for a later retry
            if shared.state.is_loading() {
                return Ok(Outcome::Ignored(IgnoreReason::InFlight));
            }
            match shared.retry.take() {
                Some(intent) if intent.same_search(&shared.state.intent) => intent,
                _ => return Ok(Outcome::Ignored(IgnoreReason::NothingToRetry)),
            }
        };
        info!(page = intent.page(), "retrying listing request");
        self.request(intent).await
    }

    // Whether `retry` has a failed request of the current search to re-issue
    pub fn can_retry(&self) -> bool {
        let shared = self.shared.lock();
        !shared.shut_down
            && shared
                .retry
                .as_ref()
                .is_some_and(|intent| intent.same_search(&shared.state.intent))
    }

    // Detail lookup for the listing modal and the standalone listing page.
    // Records already in the result set are answered without a network call.
    pub async fn lookup(&self, id: &ListingId) -> Result<ListingRecord, FetchError> {
        let loaded = {
            let shared = self.shared.lock();
            if shared.shut_down {
                return Err(FetchError::Cancelled);
            }
            shared.state.results.get(id).cloned()
        };
        if let Some(record) = loaded {
            return Ok(record);
        }
        let cached = self.details.get(id).map(|entry| entry.value().clone());
        if let Some(record) = cached {
            return Ok(record);
        }

        let record = self.source.fetch_listing(id).await?;
        if self.is_shut_down() {
            return Err(FetchError::Cancelled);
        }
        self.details.insert(id.clone(), record.clone());
        Ok(record)
    }

    // After shutdown every settling request is a no-op
    pub fn shutdown(&self) {
        let mut shared = self.shared.lock();
        shared.shut_down = true;
        shared.generation += 1;
        shared.retry = None;
        drop(shared);
        self.details.clear();
        info!("fetch coordinator shut down");
    }

    fn publish(&self, state: &QueryState) {
        self.updates.send_replace(state.clone());
    }
}

// Settles the Loading phase when a request future is dropped before its
// response arrives (timeout, select!, abandoned call)
struct PendingRequest<'a, S: ListingSource> {
    coordinator: &'a FetchCoordinator<S>,
    generation: u64,
    armed: bool,
}

impl<S: ListingSource> Drop for PendingRequest<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut shared = self.coordinator.shared.lock();
        if shared.shut_down || shared.generation != self.generation || !shared.state.is_loading() {
            return;
        }
        debug!(generation = self.generation, "request cancelled before settling");
        shared.state.phase = PagerPhase::Idle;
        self.coordinator.publish(&shared.state);
    }
}
