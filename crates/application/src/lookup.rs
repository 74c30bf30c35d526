//! Off-thread ISBN lookups with single-delivery results.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use readtrack_core::Isbn;
use readtrack_engine::{BookMetadata, CatalogApi, FailureKind, LookupError};

pub type SharedCatalogApi = Arc<dyn CatalogApi + Send + Sync>;

/// What a finished lookup hands back to the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStatus {
    Found(BookMetadata),
    NotFound,
    InvalidInput(String),
    Failed { kind: FailureKind, message: String },
}

impl LookupStatus {
    fn from_resolution(result: Result<Option<BookMetadata>, LookupError>) -> Self {
        match result {
            Ok(Some(metadata)) => LookupStatus::Found(metadata),
            Ok(None) => LookupStatus::NotFound,
            Err(err) => LookupStatus::Failed {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }

    /// Machine-readable status: `found`, `not-found`, `invalid-input` or
    /// `error:<kind>`.
    pub fn label(&self) -> String {
        match self {
            LookupStatus::Found(_) => "found".to_string(),
            LookupStatus::NotFound => "not-found".to_string(),
            LookupStatus::InvalidInput(_) => "invalid-input".to_string(),
            LookupStatus::Failed { kind, .. } => format!("error:{kind}"),
        }
    }

    pub fn message(&self) -> String {
        match self {
            LookupStatus::Found(found) => format!("Found \"{}\" by {}", found.title, found.author),
            LookupStatus::NotFound => "No book found for this ISBN".to_string(),
            LookupStatus::InvalidInput(reason) => reason.clone(),
            LookupStatus::Failed {
                kind: FailureKind::Timeout,
                ..
            } => "Lookup timed out".to_string(),
            LookupStatus::Failed { kind, message } => format!("Lookup failed ({kind}): {message}"),
        }
    }
}

/// Whether a worker is outstanding.
///
/// Validation happens synchronously inside [`LookupCoordinator::request`]
/// before any worker starts, and delivery happens inside
/// [`LookupCoordinator::poll`] or [`LookupCoordinator::wait_timeout`], which
/// hand the result over and return to `Idle` in the same call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    Running,
}

struct Pending {
    isbn: Isbn,
    rx: Receiver<LookupStatus>,
}

/// Owns the thread boundary for one dialog's lookups.
///
/// Workers never touch UI or library state: each sends one [`LookupStatus`]
/// and exits. The owner collects it with [`LookupCoordinator::poll`].
pub struct LookupCoordinator {
    api: SharedCatalogApi,
    pending: Option<Pending>,
}

impl LookupCoordinator {
    pub fn new(api: SharedCatalogApi) -> Self {
        Self { api, pending: None }
    }

    pub fn phase(&self) -> LookupPhase {
        if self.pending.is_some() {
            LookupPhase::Running
        } else {
            LookupPhase::Idle
        }
    }

    pub fn pending_isbn(&self) -> Option<&Isbn> {
        self.pending.as_ref().map(|p| &p.isbn)
    }

    /// Starts a lookup for `input`.
    ///
    /// Input that is not a 10- or 13-digit ISBN is answered immediately with
    /// [`LookupStatus::InvalidInput`] and no worker is started. Otherwise
    /// returns `None` and the result arrives through [`Self::poll`]. A lookup
    /// still running from an earlier request is abandoned.
    pub fn request(&mut self, input: &str) -> Option<LookupStatus> {
        let isbn = match Isbn::parse(input) {
            Ok(isbn) => isbn,
            Err(err) => return Some(LookupStatus::InvalidInput(err.to_string())),
        };

        if let Some(previous) = self.pending.take() {
            tracing::debug!(isbn = %previous.isbn, "abandoning earlier lookup");
        }

        let (tx, rx) = mpsc::channel();
        let api = Arc::clone(&self.api);
        let worker_isbn = isbn.clone();
        let spawned = thread::Builder::new()
            .name("isbn-lookup".to_string())
            .spawn(move || {
                let status =
                    LookupStatus::from_resolution(readtrack_engine::resolve(&*api, &worker_isbn));
                tracing::info!(isbn = %worker_isbn, status = %status.label(), "lookup finished");
                // The receiver is gone when the dialog closed first.
                let _ = tx.send(status);
            });

        match spawned {
            Ok(_) => {
                tracing::info!(%isbn, "lookup started");
                self.pending = Some(Pending { isbn, rx });
                None
            }
            Err(err) => {
                tracing::error!(%isbn, error = %err, "failed to spawn lookup worker");
                Some(LookupStatus::Failed {
                    kind: FailureKind::Network,
                    message: format!("could not start lookup: {err}"),
                })
            }
        }
    }

    /// Non-blocking check for the running lookup's result. Each result is
    /// returned exactly once.
    pub fn poll(&mut self) -> Option<LookupStatus> {
        let pending = self.pending.as_ref()?;
        match pending.rx.try_recv() {
            Ok(status) => {
                self.pending = None;
                Some(status)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                Some(worker_vanished())
            }
        }
    }

    /// Blocks up to `timeout` for the running lookup's result.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<LookupStatus> {
        let pending = self.pending.as_ref()?;
        match pending.rx.recv_timeout(timeout) {
            Ok(status) => {
                self.pending = None;
                Some(status)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.pending = None;
                Some(worker_vanished())
            }
        }
    }
}

fn worker_vanished() -> LookupStatus {
    LookupStatus::Failed {
        kind: FailureKind::Network,
        message: "lookup worker exited without a result".to_string(),
    }
}
