//! ISBN metadata resolution against a remote book catalog.
//!
//! A lookup walks edition → work → authors. Edition and work failures end
//! the lookup; a failed author only costs that author's name.

use readtrack_core::Isbn;
use serde::Deserialize;
use thiserror::Error;

mod openlibrary;

pub use openlibrary::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, OpenLibraryClient};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Network,
    Parse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Network => "network",
            FailureKind::Parse => "parse",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed catalog request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Timeout => FailureKind::Timeout,
            FetchError::Network(_) | FetchError::Status(_) => FailureKind::Network,
            FetchError::Parse(_) => FailureKind::Parse,
        }
    }
}

/// A failure that ends the whole lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("edition lookup failed: {0}")]
    Edition(#[source] FetchError),
    #[error("work lookup failed: {0}")]
    Work(#[source] FetchError),
}

impl LookupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LookupError::Edition(err) | LookupError::Work(err) => err.kind(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyRef {
    #[serde(default)]
    pub key: Option<String>,
}

/// An author reference, either `{"key": ...}` or `{"author": {"key": ...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthorRef {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub author: Option<KeyRef>,
}

impl AuthorRef {
    pub fn key(&self) -> Option<&str> {
        self.key
            .as_deref()
            .or_else(|| self.author.as_ref().and_then(|a| a.key.as_deref()))
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EditionRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub works: Vec<KeyRef>,
    #[serde(default)]
    pub authors: Vec<AuthorRef>,
}

impl EditionRecord {
    pub fn work_key(&self) -> Option<&str> {
        self.works
            .iter()
            .find_map(|w| w.key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkRecord {
    #[serde(default)]
    pub authors: Vec<AuthorRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthorRecord {
    #[serde(default)]
    pub name: Option<String>,
}

/// Read-only access to the remote catalog.
pub trait CatalogApi {
    fn edition_by_isbn(&self, isbn: &Isbn) -> Result<EditionRecord, FetchError>;
    fn work(&self, key: &str) -> Result<WorkRecord, FetchError>;
    fn author(&self, key: &str) -> Result<AuthorRecord, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
}

/// Outcome of the author stage for one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorName {
    Resolved(String),
    Absorbed { key: String, kind: FailureKind },
}

impl AuthorName {
    pub fn as_str(&self) -> &str {
        match self {
            AuthorName::Resolved(name) => name,
            AuthorName::Absorbed { .. } => UNKNOWN_AUTHOR,
        }
    }
}

/// Runs the full edition → work → authors chain for `isbn`.
///
/// Returns `Ok(None)` when neither a title nor an author could be recovered.
pub fn resolve(api: &dyn CatalogApi, isbn: &Isbn) -> Result<Option<BookMetadata>, LookupError> {
    tracing::debug!(%isbn, "fetching edition");
    let edition = api.edition_by_isbn(isbn).map_err(LookupError::Edition)?;

    let title = edition
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_TITLE)
        .to_string();

    let author_refs = match edition.work_key() {
        Some(work_key) => {
            tracing::debug!(%isbn, work_key, "fetching work");
            api.work(work_key).map_err(LookupError::Work)?.authors
        }
        None => edition.authors,
    };

    let names = resolve_authors(api, &author_refs);
    let author = join_author_names(&names);

    if title == UNKNOWN_TITLE && author == UNKNOWN_AUTHOR {
        tracing::info!(%isbn, "lookup found nothing usable");
        return Ok(None);
    }
    Ok(Some(BookMetadata { title, author }))
}

/// Fetches each referenced author in order. Failures become placeholders.
pub fn resolve_authors(api: &dyn CatalogApi, refs: &[AuthorRef]) -> Vec<AuthorName> {
    refs.iter()
        .filter_map(AuthorRef::key)
        .map(|key| match api.author(key) {
            Ok(record) => AuthorName::Resolved(
                record
                    .name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            ),
            Err(err) => {
                tracing::warn!(key, error = %err, "author lookup failed, using placeholder");
                AuthorName::Absorbed {
                    key: key.to_string(),
                    kind: err.kind(),
                }
            }
        })
        .collect()
}

pub fn join_author_names(names: &[AuthorName]) -> String {
    if names.is_empty() {
        return UNKNOWN_AUTHOR.to_string();
    }
    names
        .iter()
        .map(AuthorName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
