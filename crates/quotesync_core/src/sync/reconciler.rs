//! Local/remote reconciliation.
//!
//! # Responsibility
//! - Fetch remote records, merge them server-wins into the quote book,
//!   push every still-unsynced local quote, and persist the result.
//! - Report the outcome as a typed [`SyncReport`] or [`SyncError`].
//!
//! # Invariants
//! - A failed fetch leaves the collection and persisted state untouched.
//! - Merge and push results are staged on a copy and committed only after
//!   persistence succeeds.
//! - At most one sync runs at a time per reconciler; overlapping calls fail
//!   fast with `AlreadyRunning`.
//! - Individual push failures never abort the batch.

use super::merge::merge_remote;
use super::remote::{RemoteError, RemoteStore};
use crate::model::quote::QuoteId;
use crate::repo::quote_repo::RepoError;
use crate::service::quote_book::QuoteBook;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Default number of records fetched per sync.
pub const DEFAULT_PAGE_LIMIT: u32 = 5;

pub type SyncResult<T> = Result<T, SyncError>;

/// Sync failure; the collection is unchanged whenever one is returned.
#[derive(Debug)]
pub enum SyncError {
    /// Another sync on the same reconciler is still in flight.
    AlreadyRunning,
    /// Fetching from the remote store failed.
    Fetch(RemoteError),
    /// Writing the merged collection failed.
    Persist(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "sync already in progress"),
            Self::Fetch(err) => write!(f, "sync fetch failed: {err}"),
            Self::Persist(err) => write!(f, "sync persist failed: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AlreadyRunning => None,
            Self::Fetch(err) => Some(err),
            Self::Persist(err) => Some(err),
        }
    }
}

/// Result of pushing one local quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub id: QuoteId,
    pub result: Result<(), RemoteError>,
}

impl PushOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of one successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Records returned by the remote store.
    pub fetched: usize,
    pub added: usize,
    /// Local records overwritten by their remote copy.
    pub conflicts: usize,
    pub confirmed: usize,
    /// One entry per unsynced local quote, in collection order.
    pub pushes: Vec<PushOutcome>,
    /// Category set recomputed after the merge.
    pub categories: Vec<String>,
}

impl SyncReport {
    pub fn pushed(&self) -> usize {
        self.pushes.iter().filter(|outcome| outcome.is_ok()).count()
    }

    pub fn push_failures(&self) -> impl Iterator<Item = &PushOutcome> {
        self.pushes.iter().filter(|outcome| !outcome.is_ok())
    }
}

/// Clears the in-flight flag when a sync ends, including on cancellation.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Reconciles a shared quote book with a remote store.
pub struct Reconciler<R: RemoteStore> {
    remote: R,
    book: Arc<Mutex<QuoteBook>>,
    page_limit: u32,
    in_flight: AtomicBool,
}

impl<R: RemoteStore> Reconciler<R> {
    pub fn new(remote: R, book: Arc<Mutex<QuoteBook>>, page_limit: u32) -> Self {
        Self {
            remote,
            book,
            page_limit: page_limit.max(1),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Shared handle to the reconciled quote book.
    pub fn book(&self) -> Arc<Mutex<QuoteBook>> {
        Arc::clone(&self.book)
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Returns whether a sync is currently in flight.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one fetch-merge-push-persist cycle.
    ///
    /// # Errors
    /// - `AlreadyRunning` when another call on this reconciler is in flight.
    /// - `Fetch` when the remote store cannot be read; nothing is mutated.
    /// - `Persist` when the merged collection cannot be written; the
    ///   in-memory collection stays as it was before the call.
    pub async fn sync(&self) -> SyncResult<SyncReport> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("event=sync module=sync status=skip reason=already_running");
            return Err(SyncError::AlreadyRunning);
        };
        let started_at = Instant::now();
        info!(
            "event=sync module=sync status=start page_limit={}",
            self.page_limit
        );

        let remote = match self.remote.fetch_quotes(self.page_limit).await {
            Ok(remote) => remote,
            Err(err) => {
                error!(
                    "event=sync module=sync status=error duration_ms={} error_code=fetch_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(SyncError::Fetch(err));
            }
        };
        let fetched = remote.len();

        let mut book = self.book.lock().await;
        let mut staged = book.quotes().to_vec();
        let stats = merge_remote(&mut staged, remote);

        let mut pushes = Vec::new();
        for quote in staged.iter_mut().filter(|quote| !quote.synced) {
            let result = self.remote.push_quote(quote).await;
            match &result {
                Ok(()) => quote.synced = true,
                Err(err) => warn!(
                    "event=sync_push module=sync status=error id={} error={}",
                    quote.id, err
                ),
            }
            pushes.push(PushOutcome {
                id: quote.id,
                result,
            });
        }

        if let Err(err) = book.commit(staged) {
            error!(
                "event=sync module=sync status=error duration_ms={} error_code=persist_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(SyncError::Persist(err));
        }

        let report = SyncReport {
            fetched,
            added: stats.added,
            conflicts: stats.conflicts,
            confirmed: stats.confirmed,
            categories: book.categories(),
            pushes,
        };
        info!(
            "event=sync module=sync status=ok duration_ms={} fetched={} added={} conflicts={} confirmed={} pushed={} push_failed={}",
            started_at.elapsed().as_millis(),
            report.fetched,
            report.added,
            report.conflicts,
            report.confirmed,
            report.pushed(),
            report.pushes.len() - report.pushed()
        );
        Ok(report)
    }
}
