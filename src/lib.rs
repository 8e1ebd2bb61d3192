// Listing synchronization for the stay search interface: search intent
// normalization, infinite-scroll paging with id dedup, and stale-response
// handling against an external listing source.

pub mod category;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod intent;
pub mod listing;
#[cfg(test)]
pub mod mock_source;
pub mod result_set;
pub mod source;
pub mod state;
pub mod trigger;

// Re-export key types for convenience
pub use config::ClientConfig;
pub use coordinator::{FetchCoordinator, IgnoreReason, Outcome};
pub use error::{ConfigError, FetchError};
pub use intent::{ListingQuery, SearchInput, SearchIntent, StayFilter};
pub use listing::{ListingId, ListingPage, ListingRecord};
pub use result_set::ResultSet;
pub use source::{HttpListingSource, ListingSource};
pub use state::{merge, PagerPhase, PagingState, QueryState};
pub use trigger::{Intersection, ScrollTrigger, TriggerHandle, TriggerReport};
