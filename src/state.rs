// Query state and the pure merge step
//
// `merge` is the only way a settled page reaches the result set. It takes the
// current state by value and returns the next one, so it can be exercised
// without a coordinator, a runtime or a listing source.

use crate::error::FetchError;
use crate::intent::SearchIntent;
use crate::listing::ListingPage;
use crate::result_set::ResultSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingState {
    pub current_page: u32,
    pub has_more: bool,
}

impl Default for PagingState {
    fn default() -> Self {
        Self {
            current_page: 1,
            has_more: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagerPhase {
    #[default]
    Idle,
    Loading,
    // Terminal until a new search resets the state
    Exhausted,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub intent: SearchIntent,
    pub results: ResultSet,
    pub paging: PagingState,
    pub phase: PagerPhase,
    // Display only; never consulted for `has_more`
    pub reported_total: Option<u64>,
    pub last_error: Option<FetchError>,
    // Set once any page of the current intent has been merged
    pub first_page_loaded: bool,
}

impl QueryState {
    // Fresh state for a new search: empty results, page 1, more to load
    pub fn for_intent(intent: SearchIntent) -> Self {
        Self {
            intent,
            ..Self::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == PagerPhase::Loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == PagerPhase::Exhausted
    }

    // Whether a scroll-intersection signal should start a fetch
    pub fn can_advance(&self) -> bool {
        self.phase == PagerPhase::Idle && self.paging.has_more
    }

    // Intent the next scroll-intersection signal would request
    pub fn next_intent(&self) -> SearchIntent {
        if self.first_page_loaded {
            self.intent.next_page()
        } else {
            self.intent.first_page()
        }
    }

    pub fn begin_loading(&mut self) {
        self.phase = PagerPhase::Loading;
        self.last_error = None;
    }

    // Failure leaves results and paging untouched
    pub fn fail(&mut self, error: FetchError) {
        self.phase = PagerPhase::Idle;
        self.last_error = Some(error);
    }
}

// Fold a settled page into the state that requested it.
//
// Page 1 replaces the result set wholesale; later pages append only records
// whose id is not already present. `has_more` reflects whether the page
// carried any records at all, duplicates included.
pub fn merge(current: QueryState, intent: &SearchIntent, page: ListingPage) -> QueryState {
    let mut next = current;
    let record_count = page.record_count();

    if intent.is_first_page() {
        next.results.replace(page.items);
    } else {
        next.results.extend_unique(page.items);
    }

    next.paging = PagingState {
        current_page: intent.page(),
        has_more: record_count > 0,
    };
    next.phase = if next.paging.has_more {
        PagerPhase::Idle
    } else {
        PagerPhase::Exhausted
    };
    next.intent = intent.clone();
    next.reported_total = if intent.is_first_page() {
        page.total
    } else {
        page.total.or(next.reported_total)
    };
    next.last_error = None;
    next.first_page_loaded = true;
    next
}
