//! JSON document persistence for the library.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use readtrack_core::{Book, Theme, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything that is persisted: the ordered books and the theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDocument {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no library file at {}", path.display())]
    Missing { path: PathBuf },
    #[error("malformed library file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("book #{} in {} is invalid: {source}", index + 1, path.display())]
    InvalidBook {
        path: PathBuf,
        index: usize,
        #[source]
        source: ValidationError,
    },
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("serialize library: {0}")]
    Serialize(#[from] serde_json::Error),
    /// An unreadable document was moved to `backup` so later saves cannot
    /// overwrite it.
    #[error("{source}; original kept at {}", backup.display())]
    SetAside {
        backup: PathBuf,
        #[source]
        source: Box<PersistenceError>,
    },
}

impl PersistenceError {
    pub fn is_missing(&self) -> bool {
        matches!(self, PersistenceError::Missing { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document, failing on any problem.
    pub fn try_load(&self) -> Result<LibraryDocument, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(PersistenceError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(PersistenceError::Io {
                    action: "read",
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let doc: LibraryDocument =
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        for (index, book) in doc.books.iter().enumerate() {
            book.validate().map_err(|source| PersistenceError::InvalidBook {
                path: self.path.clone(),
                index,
                source,
            })?;
        }
        Ok(doc)
    }

    /// Reads the document, falling back to an empty library and the default
    /// theme. The reason for a fallback is returned so callers can report it.
    pub fn load(&self) -> (LibraryDocument, Option<PersistenceError>) {
        match self.try_load() {
            Ok(doc) => {
                tracing::info!(
                    path = %self.path.display(),
                    books = doc.books.len(),
                    theme = %doc.theme,
                    "loaded library"
                );
                (doc, None)
            }
            Err(err) if err.is_missing() => {
                tracing::info!(path = %self.path.display(), "no library file yet, starting empty");
                (LibraryDocument::default(), Some(err))
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load library, starting empty");
                let issue = match self.set_aside() {
                    Ok(backup) => PersistenceError::SetAside {
                        backup,
                        source: Box::new(err),
                    },
                    Err(rename_err) => {
                        tracing::error!(
                            error = %rename_err,
                            "could not move unreadable library aside"
                        );
                        err
                    }
                };
                (LibraryDocument::default(), Some(issue))
            }
        }
    }

    /// Moves the current file to `<name>.bad`, replacing an older backup.
    fn set_aside(&self) -> Result<PathBuf, PersistenceError> {
        let backup = self.sibling_path(".bad");
        fs::rename(&self.path, &backup).map_err(|source| PersistenceError::Io {
            action: "move aside",
            path: self.path.clone(),
            source,
        })?;
        tracing::warn!(backup = %backup.display(), "moved unreadable library aside");
        Ok(backup)
    }

    /// Replaces the whole document. The new content is written next to the
    /// target and renamed over it, so readers never observe a partial file.
    pub fn save(&self, books: &[Book], theme: Theme) -> Result<(), PersistenceError> {
        #[derive(Serialize)]
        struct DocumentRef<'a> {
            books: &'a [Book],
            theme: Theme,
        }

        let json = serde_json::to_string_pretty(&DocumentRef { books, theme })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                action: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json.as_bytes()).map_err(|source| PersistenceError::Io {
            action: "write",
            path: tmp_path.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(PersistenceError::Io {
                action: "replace",
                path: self.path.clone(),
                source,
            });
        }

        tracing::debug!(path = %self.path.display(), books = books.len(), "saved library");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling_path(".tmp")
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "library.json".into());
        name.push(suffix);
        self.path.with_file_name(name)
    }
}
