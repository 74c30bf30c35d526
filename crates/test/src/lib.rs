//! Test helpers and fixtures.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};

use readtrack_core::{Book, Isbn};
use readtrack_engine::{
    AuthorRecord, AuthorRef, CatalogApi, EditionRecord, FetchError, KeyRef, WorkRecord,
};

pub fn make_book(title: &str, author: &str, current: Option<u32>, total: Option<u32>) -> Book {
    Book {
        current_progress: current,
        total_pages: total,
        ..Book::new(title, author)
    }
}

pub fn make_chapter_book(
    title: &str,
    author: &str,
    current: Option<u32>,
    total: Option<u32>,
) -> Book {
    Book {
        track_chapters: true,
        current_chapter: current,
        total_chapters: total,
        ..Book::new(title, author)
    }
}

pub fn author_refs(keys: &[&str]) -> Vec<AuthorRef> {
    keys.iter()
        .map(|key| AuthorRef {
            key: Some(key.to_string()),
            author: None,
        })
        .collect()
}

pub fn edition(title: Option<&str>, work_key: Option<&str>, author_keys: &[&str]) -> EditionRecord {
    EditionRecord {
        title: title.map(str::to_string),
        works: work_key
            .map(|key| {
                vec![KeyRef {
                    key: Some(key.to_string()),
                }]
            })
            .unwrap_or_default(),
        authors: author_refs(author_keys),
    }
}

pub fn work(author_keys: &[&str]) -> WorkRecord {
    WorkRecord {
        authors: author_keys
            .iter()
            .map(|key| AuthorRef {
                key: None,
                author: Some(KeyRef {
                    key: Some(key.to_string()),
                }),
            })
            .collect(),
    }
}

/// Holds scripted lookups until opened.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn open(&self) {
        let (lock, cvar) = &*self.state;
        *lock.lock().unwrap_or_else(|e| e.into_inner()) = true;
        cvar.notify_all();
    }

    fn wait(&self) {
        let (lock, cvar) = &*self.state;
        let mut open = lock.lock().unwrap_or_else(|e| e.into_inner());
        while !*open {
            open = cvar.wait(open).unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// A [`CatalogApi`] answering from fixed tables. Unknown keys answer 404.
#[derive(Debug, Default)]
pub struct ScriptedCatalog {
    editions: HashMap<String, Result<EditionRecord, FetchError>>,
    works: HashMap<String, Result<WorkRecord, FetchError>>,
    authors: HashMap<String, Result<AuthorRecord, FetchError>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Gate>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edition(mut self, isbn: &str, record: Result<EditionRecord, FetchError>) -> Self {
        self.editions.insert(isbn.to_string(), record);
        self
    }

    pub fn with_work(mut self, key: &str, record: Result<WorkRecord, FetchError>) -> Self {
        self.works.insert(key.to_string(), record);
        self
    }

    pub fn with_author(mut self, key: &str, name: Result<&str, FetchError>) -> Self {
        let record = name.map(|name| AuthorRecord {
            name: Some(name.to_string()),
        });
        self.authors.insert(key.to_string(), record);
        self
    }

    /// Makes every edition fetch wait until the returned gate is opened.
    pub fn gated(mut self) -> (Self, Gate) {
        let gate = Gate::default();
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl CatalogApi for ScriptedCatalog {
    fn edition_by_isbn(&self, isbn: &Isbn) -> Result<EditionRecord, FetchError> {
        self.record(format!("edition:{isbn}"));
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        self.editions
            .get(isbn.as_str())
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }

    fn work(&self, key: &str) -> Result<WorkRecord, FetchError> {
        self.record(format!("work:{key}"));
        self.works
            .get(key)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }

    fn author(&self, key: &str) -> Result<AuthorRecord, FetchError> {
        self.record(format!("author:{key}"));
        self.authors
            .get(key)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_books() {
        let book = make_chapter_book("Dune", "Frank Herbert", Some(2), Some(48));
        assert!(book.track_chapters);
        assert_eq!(book.total_chapters, Some(48));
        assert_eq!(book.total_pages, None);
    }

    #[test]
    fn scripted_catalog_answers_404_for_unknown_keys() {
        let api = ScriptedCatalog::new().with_author("/authors/A1", Ok("Frank Herbert"));
        assert_eq!(
            api.author("/authors/A1").unwrap().name.as_deref(),
            Some("Frank Herbert")
        );
        assert_eq!(api.work("/works/W9"), Err(FetchError::Status(404)));
        assert_eq!(api.calls(), vec!["author:/authors/A1", "work:/works/W9"]);
    }

    #[test]
    fn edition_fixture_sets_work_and_authors() {
        let record = edition(Some("Dune"), Some("/works/W1"), &["/authors/A1"]);
        assert_eq!(record.work_key(), Some("/works/W1"));
        assert_eq!(record.authors[0].key(), Some("/authors/A1"));
    }
}
