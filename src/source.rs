// Listing source: the external provider of listing pages
//
// The coordinator only sees the `ListingSource` trait; `HttpListingSource`
// speaks the REST contract (`GET /hotels`, `GET /hotels/{id}`).

use crate::config::ClientConfig;
use crate::error::{ConfigError, FetchError};
use crate::intent::ListingQuery;
use crate::listing::{ListingId, ListingPage, ListingRecord};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

#[async_trait]
pub trait ListingSource: Send + Sync + 'static {
    // One page of listings for the given query
    async fn fetch_page(&self, query: &ListingQuery) -> Result<ListingPage, FetchError>;

    // A single listing; a miss is `FetchError::NotFound`
    async fn fetch_listing(&self, id: &ListingId) -> Result<ListingRecord, FetchError>;
}

// `reqwest::Client` is reference counted internally, so this type is cheap to
// clone and does not need an extra `Arc`.
#[derive(Clone)]
pub struct HttpListingSource {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpListingSource {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::Invalid(format!("http client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn page_url(&self, query: &ListingQuery) -> Result<reqwest::Url, FetchError> {
        reqwest::Url::parse_with_params(&self.config.endpoint("/hotels"), query.to_pairs())
            .map_err(|e| FetchError::Validation(format!("cannot build listing URL: {}", e)))
    }

    pub fn listing_url(&self, id: &ListingId) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.config.endpoint("/hotels"))
            .map_err(|e| FetchError::Validation(format!("cannot build listing URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Validation("base URL cannot carry a path".to_string()))?
            .push(id.as_str());
        Ok(url)
    }

    async fn get(&self, url: reqwest::Url) -> Result<reqwest::Response, FetchError> {
        debug!(%url, "listing source request");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Body is diagnostic text at best; an unreadable body is not worth failing over
        let message = response.text().await.unwrap_or_default();
        Err(FetchError::Server {
            status_code: status.as_u16(),
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                message
            },
        })
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_page(&self, query: &ListingQuery) -> Result<ListingPage, FetchError> {
        let url = self.page_url(query)?;
        let response = self.get(url).await?;
        let page = response.json::<ListingPage>().await?;
        Ok(page)
    }

    async fn fetch_listing(&self, id: &ListingId) -> Result<ListingRecord, FetchError> {
        let url = self.listing_url(id)?;
        match self.get(url).await {
            Ok(response) => Ok(response.json::<ListingRecord>().await?),
            Err(FetchError::Server { status_code, .. })
                if status_code == StatusCode::NOT_FOUND.as_u16() =>
            {
                Err(FetchError::NotFound(id.clone()))
            }
            Err(err) => Err(err),
        }
    }
}
