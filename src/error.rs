// Error taxonomy for listing fetches and client configuration

use crate::listing::ListingId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    // The request never completed (connect failure, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {status_code} - {message}")]
    Server { status_code: u16, message: String },

    #[error("Listing not found: {0}")]
    NotFound(ListingId),

    // Rejected before any network call
    #[error("Invalid search: {0}")]
    Validation(String),

    #[error("Malformed response body: {0}")]
    Decode(String),

    // The coordinator was shut down before the call could complete
    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    // Whether re-triggering the same request can plausibly succeed
    pub fn is_user_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Server { .. } | FetchError::Decode(_)
        )
    }

    // Text shown in place of the listing grid
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::NotFound(_) => "This stay is no longer available.",
            FetchError::Validation(_) => "Please check your search and try again.",
            FetchError::Cancelled => "This search was closed.",
            _ => "Unable to load stays right now.",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Server {
                status_code: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("No listing source base URL configured")]
    MissingBaseUrl,
}
