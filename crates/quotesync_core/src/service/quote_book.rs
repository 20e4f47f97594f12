//! Quote collection use-case service.
//!
//! # Responsibility
//! - Own the in-memory quote collection and keep it persisted.
//! - Provide add/remove, category filter and random display entry points.
//!
//! # Invariants
//! - Every mutation is persisted before it becomes visible; a failed write
//!   leaves the in-memory collection unchanged.
//! - Local ids are allocated one above the current maximum id.
//! - The category set is derived on demand and never stored.

use crate::model::quote::{
    default_quotes, derive_categories, next_local_id, Quote, QuoteId, ALL_CATEGORIES,
    DEFAULT_CATEGORY,
};
use crate::repo::quote_repo::{QuoteRepository, RepoError, RepoResult};
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type QuoteBookResult<T> = Result<T, QuoteBookError>;

/// Service error for quote collection use-cases.
#[derive(Debug)]
pub enum QuoteBookError {
    /// Quote text is empty after trimming.
    EmptyText,
    /// Target quote does not exist.
    NotFound(QuoteId),
    /// The highest id is already `QuoteId::MAX`.
    IdsExhausted,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for QuoteBookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text cannot be empty"),
            Self::NotFound(id) => write!(f, "quote not found: {id}"),
            Self::IdsExhausted => write!(f, "no local quote id left above the current maximum"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QuoteBookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for QuoteBookError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Explicitly owned quote collection.
pub struct QuoteBook {
    quotes: Vec<Quote>,
    repo: QuoteRepository,
}

impl QuoteBook {
    /// Loads the persisted collection, seeding the default quotes when the
    /// store holds none yet.
    pub fn load(repo: QuoteRepository) -> RepoResult<Self> {
        let quotes = match repo.load_quotes()? {
            Some(quotes) => quotes,
            None => {
                info!("event=quote_book_seed module=service status=ok");
                default_quotes()
            }
        };
        Ok(Self { quotes, repo })
    }

    /// Builds a book around an explicit collection without touching storage.
    pub fn with_quotes(repo: QuoteRepository, quotes: Vec<Quote>) -> Self {
        Self { quotes, repo }
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn get(&self, id: QuoteId) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.id == id)
    }

    pub fn repository(&self) -> &QuoteRepository {
        &self.repo
    }

    /// Adds one user-submitted quote.
    ///
    /// # Contract
    /// - `text` and `category` are trimmed; blank category falls back to
    ///   `General`.
    /// - New record is `synced = false` with a fresh local id.
    /// - Blank text fails with `EmptyText` and nothing changes.
    /// - `IdsExhausted` when the current maximum id is `QuoteId::MAX`.
    pub fn add_quote(&mut self, text: &str, category: Option<&str>) -> QuoteBookResult<Quote> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QuoteBookError::EmptyText);
        }
        let category = category
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        let Some(id) = next_local_id(&self.quotes) else {
            warn!("event=quote_add module=service status=error error_code=ids_exhausted");
            return Err(QuoteBookError::IdsExhausted);
        };
        let quote = Quote::new(id, text, category);
        let mut staged = self.quotes.clone();
        staged.push(quote.clone());
        self.commit(staged)?;

        info!(
            "event=quote_add module=service status=ok id={} category_len={}",
            quote.id,
            quote.category.len()
        );
        Ok(quote)
    }

    /// Removes one quote by id and persists the result.
    pub fn remove_quote(&mut self, id: QuoteId) -> QuoteBookResult<Quote> {
        let index = self
            .quotes
            .iter()
            .position(|quote| quote.id == id)
            .ok_or(QuoteBookError::NotFound(id))?;
        let mut staged = self.quotes.clone();
        let removed = staged.remove(index);
        self.commit(staged)?;

        info!("event=quote_remove module=service status=ok id={id}");
        Ok(removed)
    }

    /// Returns `all` followed by the sorted distinct categories.
    pub fn categories(&self) -> Vec<String> {
        derive_categories(&self.quotes)
    }

    /// Returns quotes matching a filter category (`all` matches every quote).
    pub fn filtered(&self, category: &str) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|quote| quote.matches_category(category))
            .collect()
    }

    /// Persists the category filter choice.
    pub fn select_category(&self, category: &str) -> QuoteBookResult<()> {
        self.repo.save_selected_category(category.trim())?;
        Ok(())
    }

    /// Returns the saved filter if it still names a known category,
    /// otherwise `all`.
    pub fn selected_category(&self) -> QuoteBookResult<String> {
        let saved = self.repo.load_selected_category()?;
        let categories = self.categories();
        Ok(match saved {
            Some(value) if categories.contains(&value) => value,
            Some(stale) => {
                debug!("event=category_restore module=service status=fallback stale_len={}", stale.len());
                ALL_CATEGORIES.to_string()
            }
            None => ALL_CATEGORIES.to_string(),
        })
    }

    /// Picks one quote uniformly from the filtered pool and remembers it as
    /// the session's last shown quote.
    ///
    /// Returns `Ok(None)` when the filter matches nothing.
    pub fn show_random<R: Rng + ?Sized>(
        &self,
        category: &str,
        rng: &mut R,
    ) -> QuoteBookResult<Option<Quote>> {
        let pool = self.filtered(category);
        let Some(picked) = pool.choose(rng).map(|quote| (*quote).clone()) else {
            return Ok(None);
        };
        if let Err(err) = self.repo.save_last_quote(&picked) {
            warn!("event=last_quote_save module=service status=error error={err}");
        }
        Ok(Some(picked))
    }

    /// Restores the last quote shown in this session.
    pub fn last_shown(&self) -> QuoteBookResult<Option<Quote>> {
        Ok(self.repo.load_last_quote()?)
    }

    /// Writes the current collection to durable storage.
    pub fn persist(&self) -> RepoResult<()> {
        self.repo.save_quotes(&self.quotes)
    }

    /// Persists `staged` and, only on success, makes it the live collection.
    pub(crate) fn commit(&mut self, staged: Vec<Quote>) -> RepoResult<()> {
        self.repo.save_quotes(&staged)?;
        self.quotes = staged;
        Ok(())
    }
}
