use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{Page, PageCursor, Resident, ResidentRef},
    error::FetchError,
};
use tracing::{debug, warn};
use url::Url;

pub mod controller;
mod enricher;
#[cfg(test)]
mod test_support;

pub use controller::{
    DetailTicket, ListTicket, ListView, ViewState, ViewStateController, DETAIL_ERROR_MESSAGE,
    LIST_ERROR_MESSAGE,
};
pub use enricher::{enrich_page, enrich_residents};

pub const DEFAULT_API_BASE_URL: &str = "https://swapi.dev/api";
const PLANETS_PATH: &str = "planets/";

/// Which page of the planet collection to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// First page of the collection.
    Default,
    /// Explicit 1-based page number.
    Number(u32),
    /// A `next`/`previous` cursor taken from a previously fetched page.
    Cursor(PageCursor),
}

impl PageRequest {
    pub fn page_number(&self) -> Option<u32> {
        match self {
            Self::Default => Some(1),
            Self::Number(number) => Some((*number).max(1)),
            Self::Cursor(cursor) => cursor.page_number(),
        }
    }
}

#[async_trait]
pub trait PlanetSource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError>;
    async fn fetch_resident(&self, reference: &ResidentRef) -> Result<Resident, FetchError>;
}

/// HTTP-backed [`PlanetSource`] talking to a SWAPI-compatible planets API.
#[derive(Debug, Clone)]
pub struct PlanetsClient {
    http: Client,
    base_url: Url,
}

impl PlanetsClient {
    pub fn new(api_base_url: &str) -> Result<Self> {
        Self::with_http_client(Client::new(), api_base_url)
    }

    pub fn with_http_client(http: Client, api_base_url: &str) -> Result<Self> {
        let trimmed = api_base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(anyhow!(
                "api base url must start with http:// or https://: {api_base_url}"
            ));
        }
        // The trailing slash makes relative references resolve beneath the base path.
        let base_url = Url::parse(&format!("{trimmed}/"))
            .with_context(|| format!("invalid api base url: {api_base_url}"))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn page_url(&self, request: &PageRequest) -> Result<Url, FetchError> {
        match request {
            PageRequest::Default | PageRequest::Number(_) => {
                let mut url = self.resolve(PLANETS_PATH)?;
                {
                    let mut query = url.query_pairs_mut();
                    if let PageRequest::Number(number) = request {
                        query.append_pair("page", &(*number).max(1).to_string());
                    }
                    query.append_pair("format", "json");
                }
                Ok(url)
            }
            PageRequest::Cursor(cursor) => self.resolve(cursor.as_str()),
        }
    }

    pub fn resident_url(&self, reference: &ResidentRef) -> Result<Url, FetchError> {
        self.resolve(reference.as_str())
    }

    fn resolve(&self, reference: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(reference)
            .map_err(|e| FetchError::network(reference, format!("invalid reference: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let url_text = url.to_string();
        debug!(url = %url_text, "planets api request");

        let response = self.http.get(url).send().await.map_err(|e| {
            warn!(url = %url_text, error = %e, "planets api request failed");
            FetchError::network(&url_text, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url_text, %status, "planets api returned non-success status");
            return Err(FetchError::network(
                &url_text,
                format!("unexpected status {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(&url_text, e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(url = %url_text, error = %e, "planets api body did not match schema");
            FetchError::decode(&url_text, e.to_string())
        })
    }
}

#[async_trait]
impl PlanetSource for PlanetsClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError> {
        let url = self.page_url(request)?;
        let page: Page = self.get_json(url).await?;
        debug!(
            planets = page.results.len(),
            has_next = page.next.is_some(),
            has_previous = page.previous.is_some(),
            "planets page decoded"
        );
        Ok(page)
    }

    async fn fetch_resident(&self, reference: &ResidentRef) -> Result<Resident, FetchError> {
        let url = self.resident_url(reference)?;
        self.get_json(url).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
