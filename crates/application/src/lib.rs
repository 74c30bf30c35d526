//! Application orchestration layer for the reading tracker.

use readtrack_core::{Book, Theme, ValidationError};
use readtrack_storage::{PersistenceError, Storage};
use thiserror::Error;

mod lookup;

pub use lookup::{LookupCoordinator, LookupPhase, LookupStatus, SharedCatalogApi};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("book index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The mutation was applied in memory but could not be written.
    #[error("changes kept in memory but not saved: {0}")]
    NotSaved(#[from] PersistenceError),
}

/// The ordered book list and theme, owned by the UI thread.
///
/// Every mutation writes the whole document back immediately and raises the
/// refresh flag.
#[derive(Debug)]
pub struct Library {
    storage: Storage,
    books: Vec<Book>,
    theme: Theme,
    needs_refresh: bool,
}

impl Library {
    /// Loads from `storage`, falling back to an empty library. The fallback
    /// reason, if any, is returned for reporting.
    pub fn open(storage: Storage) -> (Self, Option<PersistenceError>) {
        let (doc, issue) = storage.load();
        let library = Self {
            storage,
            books: doc.books,
            theme: doc.theme,
            needs_refresh: true,
        };
        (library, issue)
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Flips the theme. Persisted by the next save.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.needs_refresh = true;
        self.theme
    }

    pub fn append(&mut self, book: Book) -> Result<(), LibraryError> {
        book.validate()?;
        tracing::info!(title = %book.title, index = self.books.len(), "adding book");
        self.books.push(book);
        self.commit()
    }

    /// Replaces the book at `index`, returning the previous entry.
    pub fn replace(&mut self, index: usize, book: Book) -> Result<Book, LibraryError> {
        self.check_index(index)?;
        book.validate()?;
        tracing::info!(title = %book.title, index, "updating book");
        let previous = std::mem::replace(&mut self.books[index], book);
        self.commit().map(|()| previous)
    }

    /// Removes the book at `index`; later entries shift down by one.
    pub fn remove_at(&mut self, index: usize) -> Result<Book, LibraryError> {
        self.check_index(index)?;
        let removed = self.books.remove(index);
        tracing::info!(title = %removed.title, index, "removed book");
        self.commit().map(|()| removed)
    }

    pub fn save(&self) -> Result<(), PersistenceError> {
        self.storage.save(&self.books, self.theme)
    }

    /// Returns whether the view should be rebuilt, clearing the flag.
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.needs_refresh)
    }

    fn check_index(&self, index: usize) -> Result<(), LibraryError> {
        if index < self.books.len() {
            Ok(())
        } else {
            tracing::error!(index, len = self.books.len(), "book index out of range");
            Err(LibraryError::IndexOutOfRange {
                index,
                len: self.books.len(),
            })
        }
    }

    fn commit(&mut self) -> Result<(), LibraryError> {
        self.needs_refresh = true;
        self.save().map_err(|err| {
            tracing::warn!(error = %err, "failed to save library");
            LibraryError::NotSaved(err)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

/// State shared by the views: the library, the selection and the last
/// status line.
#[derive(Debug)]
pub struct AppContext {
    pub library: Library,
    pub selected: usize,
    pub status: Option<StatusMessage>,
}

impl AppContext {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            selected: 0,
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<StatusMessage>) -> Self {
        self.status = status;
        self
    }

    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.library.len().saturating_sub(1));
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.library.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.library.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Records the outcome of a mutation in the status line.
    pub fn report(&mut self, result: Result<(), LibraryError>, done: impl Into<String>) {
        self.status = Some(match result {
            Ok(()) => StatusMessage::info(done),
            Err(err) => StatusMessage::error(err.to_string()),
        });
        self.clamp_selection();
    }
}
