//! Quote domain model.
//!
//! # Responsibility
//! - Define the record persisted locally, exported to files and synced with
//!   the remote store.
//! - Provide validation and derived-category helpers.
//!
//! # Invariants
//! - `text` is non-empty after trimming.
//! - `category` is non-empty after trimming.
//! - Serialized field names match the browser export format (`updatedAt`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Integer identity shared by local and remote records.
pub type QuoteId = i64;

/// Fallback category for user-added quotes without a category.
pub const DEFAULT_CATEGORY: &str = "General";
/// Fallback category for imported quotes without a category.
pub const IMPORTED_CATEGORY: &str = "Imported";
/// Sentinel category assigned to every record fetched from the remote store.
pub const SERVER_CATEGORY: &str = "Server";
/// Pseudo-category that selects every quote.
pub const ALL_CATEGORIES: &str = "all";

/// Validation errors for quote records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteValidationError {
    EmptyText(QuoteId),
    EmptyCategory(QuoteId),
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText(id) => write!(f, "quote {id} has empty text"),
            Self::EmptyCategory(id) => write!(f, "quote {id} has empty category"),
        }
    }
}

impl Error for QuoteValidationError {}

/// One quote with its sync metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    /// Quotable content.
    pub text: String,
    pub category: String,
    /// True once the remote store confirmed or supplied this record.
    #[serde(default)]
    pub synced: bool,
    /// Unix epoch milliseconds of the last local mutation.
    #[serde(default)]
    pub updated_at: i64,
}

impl Quote {
    /// Creates a local, not yet synced quote stamped with the current time.
    pub fn new(id: QuoteId, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            category: category.into(),
            synced: false,
            updated_at: now_epoch_ms(),
        }
    }

    /// Creates a record as delivered by the remote store.
    ///
    /// Remote records always carry the sentinel category and count as synced.
    pub fn from_remote(id: QuoteId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            category: SERVER_CATEGORY.to_string(),
            synced: true,
            updated_at: now_epoch_ms(),
        }
    }

    /// Checks the stored-record invariants.
    pub fn validate(&self) -> Result<(), QuoteValidationError> {
        if self.text.trim().is_empty() {
            return Err(QuoteValidationError::EmptyText(self.id));
        }
        if self.category.trim().is_empty() {
            return Err(QuoteValidationError::EmptyCategory(self.id));
        }
        Ok(())
    }

    /// Returns whether `text` or `category` differ from `other`.
    ///
    /// `synced` and `updated_at` are deliberately not compared.
    pub fn content_differs(&self, other: &Quote) -> bool {
        self.text != other.text || self.category != other.category
    }

    /// Returns whether this quote belongs to the given filter category.
    pub fn matches_category(&self, category: &str) -> bool {
        category == ALL_CATEGORIES || self.category == category
    }
}

/// Returns the next free local id: one above the current maximum.
///
/// `None` when the maximum is already `QuoteId::MAX`.
pub fn next_local_id(quotes: &[Quote]) -> Option<QuoteId> {
    match quotes.iter().map(|quote| quote.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Derives the selectable category list: `all` followed by the sorted,
/// deduplicated categories present in `quotes`.
pub fn derive_categories(quotes: &[Quote]) -> Vec<String> {
    let distinct: BTreeSet<&str> = quotes.iter().map(|quote| quote.category.as_str()).collect();
    std::iter::once(ALL_CATEGORIES)
        .chain(distinct)
        .map(str::to_string)
        .collect()
}

/// Seed collection used when no collection has been persisted yet.
pub fn default_quotes() -> Vec<Quote> {
    let seeds = [
        (
            1,
            "The best way to predict the future is to create it.",
            "Motivation",
        ),
        (2, "Do one thing every day that scares you.", "Inspiration"),
        (
            3,
            "Success is not final, failure is not fatal: It is the courage to continue that counts.",
            "Perseverance",
        ),
    ];
    seeds
        .into_iter()
        .map(|(id, text, category)| Quote {
            synced: true,
            ..Quote::new(id, text, category)
        })
        .collect()
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
