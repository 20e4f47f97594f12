//! Quote repository over durable and session key-value stores.
//!
//! # Responsibility
//! - Load/save the full quote collection under the `quotes` key.
//! - Load/save the selected category filter under `selectedCategory`.
//! - Load/save the last displayed quote in the session store (`lastQuote`).
//!
//! # Invariants
//! - The collection is always written as one JSON array.
//! - Persisted ids are unique; a collection with duplicate ids is rejected.

use crate::model::quote::{Quote, QuoteId, QuoteValidationError};
use crate::store::{KeyValueStore, StoreError};
use log::{debug, error};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub const QUOTES_KEY: &str = "quotes";
pub const SELECTED_CATEGORY_KEY: &str = "selectedCategory";
pub const LAST_QUOTE_KEY: &str = "lastQuote";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for quote persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(QuoteValidationError),
    Store(StoreError),
    DuplicateId(QuoteId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "duplicate quote id: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted quote data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::DuplicateId(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<QuoteValidationError> for RepoError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Typed access to persisted quote state.
#[derive(Clone)]
pub struct QuoteRepository {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl QuoteRepository {
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Loads the persisted collection, or `None` when nothing was saved yet.
    pub fn load_quotes(&self) -> RepoResult<Option<Vec<Quote>>> {
        let Some(raw) = self.durable.get(QUOTES_KEY)? else {
            return Ok(None);
        };
        let quotes: Vec<Quote> = serde_json::from_str(&raw).map_err(|err| {
            error!("event=quotes_load module=repo status=error error_code=decode_failed error={err}");
            RepoError::InvalidData(format!("`{QUOTES_KEY}` is not a quote array: {err}"))
        })?;
        check_collection(&quotes)?;
        debug!(
            "event=quotes_load module=repo status=ok count={}",
            quotes.len()
        );
        Ok(Some(quotes))
    }

    /// Replaces the persisted collection.
    pub fn save_quotes(&self, quotes: &[Quote]) -> RepoResult<()> {
        check_collection(quotes)?;
        let encoded = serde_json::to_string(quotes)
            .map_err(|err| RepoError::InvalidData(format!("failed to encode quotes: {err}")))?;
        self.durable.set(QUOTES_KEY, &encoded)?;
        debug!(
            "event=quotes_save module=repo status=ok count={}",
            quotes.len()
        );
        Ok(())
    }

    pub fn load_selected_category(&self) -> RepoResult<Option<String>> {
        Ok(self.durable.get(SELECTED_CATEGORY_KEY)?)
    }

    pub fn save_selected_category(&self, category: &str) -> RepoResult<()> {
        Ok(self.durable.set(SELECTED_CATEGORY_KEY, category)?)
    }

    /// Loads the last displayed quote of this session.
    pub fn load_last_quote(&self) -> RepoResult<Option<Quote>> {
        let Some(raw) = self.session.get(LAST_QUOTE_KEY)? else {
            return Ok(None);
        };
        let quote = serde_json::from_str(&raw).map_err(|err| {
            RepoError::InvalidData(format!("`{LAST_QUOTE_KEY}` is not a quote: {err}"))
        })?;
        Ok(Some(quote))
    }

    pub fn save_last_quote(&self, quote: &Quote) -> RepoResult<()> {
        let encoded = serde_json::to_string(quote)
            .map_err(|err| RepoError::InvalidData(format!("failed to encode quote: {err}")))?;
        Ok(self.session.set(LAST_QUOTE_KEY, &encoded)?)
    }
}

fn check_collection(quotes: &[Quote]) -> RepoResult<()> {
    let mut seen = HashSet::with_capacity(quotes.len());
    for quote in quotes {
        quote.validate()?;
        if !seen.insert(quote.id) {
            return Err(RepoError::DuplicateId(quote.id));
        }
    }
    Ok(())
}
