use std::time::Duration;

use readtrack_core::Isbn;
use serde::de::DeserializeOwned;

use crate::{AuthorRecord, CatalogApi, EditionRecord, FetchError, WorkRecord};

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("readtrack/", env!("CARGO_PKG_VERSION"));

/// Blocking Open Library client. Every request carries the same timeout and
/// is attempted exactly once.
#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| FetchError::Network(err.to_string()))?;
        Ok(Self::with_http(base_url, http))
    }

    /// Uses a preconfigured HTTP client, e.g. one with custom proxy settings.
    pub fn with_http(base_url: impl Into<String>, http: reqwest::blocking::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url_for_key(&self, key: &str) -> String {
        let key = key.trim();
        if key.starts_with('/') {
            format!("{}{key}.json", self.base_url)
        } else {
            format!("{}/{key}.json", self.base_url)
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.http.get(url).send().map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "catalog request rejected");
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().map_err(classify)?;
        serde_json::from_str(&body).map_err(|err| FetchError::Parse(err.to_string()))
    }
}

impl CatalogApi for OpenLibraryClient {
    fn edition_by_isbn(&self, isbn: &Isbn) -> Result<EditionRecord, FetchError> {
        self.get_json(&format!("{}/isbn/{isbn}.json", self.base_url))
    }

    fn work(&self, key: &str) -> Result<WorkRecord, FetchError> {
        self.get_json(&self.url_for_key(key))
    }

    fn author(&self, key: &str) -> Result<AuthorRecord, FetchError> {
        self.get_json(&self.url_for_key(key))
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_decode() {
        FetchError::Parse(err.to_string())
    } else {
        FetchError::Network(err.to_string())
    }
}
