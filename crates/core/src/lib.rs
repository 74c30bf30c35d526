//! Core domain types for the reading tracker.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUnit {
    Pages,
    Chapters,
}

impl ProgressUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressUnit::Pages => "pages",
            ProgressUnit::Chapters => "chapters",
        }
    }
}

impl std::fmt::Display for ProgressUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked book.
///
/// Only the count pair selected by `track_chapters` is meaningful; the other
/// pair keeps whatever it held before the mode was switched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub track_chapters: bool,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_progress: Option<u32>,
    #[serde(default)]
    pub total_chapters: Option<u32>,
    #[serde(default)]
    pub current_chapter: Option<u32>,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            image_path: None,
            track_chapters: false,
            total_pages: None,
            current_progress: None,
            total_chapters: None,
            current_chapter: None,
        }
    }

    pub fn unit(&self) -> ProgressUnit {
        if self.track_chapters {
            ProgressUnit::Chapters
        } else {
            ProgressUnit::Pages
        }
    }

    /// Returns `(current, total)` of the active pair.
    pub fn active_counts(&self) -> (Option<u32>, Option<u32>) {
        if self.track_chapters {
            (self.current_chapter, self.total_chapters)
        } else {
            (self.current_progress, self.total_pages)
        }
    }

    /// Rounded completion percentage, or `None` when the active total is
    /// missing or zero.
    pub fn percent(&self) -> Option<u32> {
        let (current, total) = self.active_counts();
        let total = total.filter(|t| *t > 0)?;
        let current = current.unwrap_or(0);
        Some(rounded_percent(current, total))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        if let (Some(current), Some(total)) = self.active_counts()
            && current > total
        {
            return Err(ValidationError::ProgressExceedsTotal {
                current,
                total,
                unit: self.unit(),
            });
        }
        Ok(())
    }
}

/// Formats the active progress pair for display, e.g. `"30/120 (25%) pages"`.
pub fn progress_string(book: &Book) -> String {
    let (Some(percent), (current, Some(total))) = (book.percent(), book.active_counts()) else {
        return NOT_AVAILABLE.to_string();
    };
    format!(
        "{}/{total} ({percent}%) {}",
        current.unwrap_or(0),
        book.unit()
    )
}

// Half-up rounding in integer space; `total` must be non-zero.
fn rounded_percent(current: u32, total: u32) -> u32 {
    let current = u64::from(current);
    let total = u64::from(total);
    let pct = (current * 200 + total) / (total * 2);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("author must not be empty")]
    EmptyAuthor,
    #[error("{field} must be a whole number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("current progress {current} exceeds total {total} {unit}")]
    ProgressExceedsTotal {
        current: u32,
        total: u32,
        unit: ProgressUnit,
    },
    #[error("ISBN must be 10 or 13 digits, got {0:?}")]
    InvalidIsbn(String),
}

/// A 10- or 13-digit ISBN. Construction is the shape check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Isbn(String);

impl Isbn {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let valid_len = matches!(input.len(), 10 | 13);
        if valid_len && input.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(ValidationError::InvalidIsbn(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Isbn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text-typed form state for creating or editing a [`Book`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub image_path: String,
    pub track_chapters: bool,
    pub total_pages: String,
    pub current_progress: String,
    pub total_chapters: String,
    pub current_chapter: String,
}

impl BookDraft {
    pub fn from_book(book: &Book) -> Self {
        fn count(value: Option<u32>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            image_path: book.image_path.clone().unwrap_or_default(),
            track_chapters: book.track_chapters,
            total_pages: count(book.total_pages),
            current_progress: count(book.current_progress),
            total_chapters: count(book.total_chapters),
            current_chapter: count(book.current_chapter),
        }
    }

    pub fn to_book(&self) -> Result<Book, ValidationError> {
        let image_path = self.image_path.trim();
        let book = Book {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            image_path: (!image_path.is_empty()).then(|| image_path.to_string()),
            track_chapters: self.track_chapters,
            total_pages: parse_count("total pages", &self.total_pages)?,
            current_progress: parse_count("current page", &self.current_progress)?,
            total_chapters: parse_count("total chapters", &self.total_chapters)?,
            current_chapter: parse_count("current chapter", &self.current_chapter)?,
        };
        book.validate()?;
        Ok(book)
    }
}

fn parse_count(field: &'static str, value: &str) -> Result<Option<u32>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
