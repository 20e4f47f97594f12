//! Core domain logic for quotesync.
//! This crate owns the quote collection, its persistence and its
//! reconciliation with the remote store.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod sync;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::quote::{
    derive_categories, Quote, QuoteId, QuoteValidationError, ALL_CATEGORIES, DEFAULT_CATEGORY,
    IMPORTED_CATEGORY, SERVER_CATEGORY,
};
pub use repo::quote_repo::{QuoteRepository, RepoError, RepoResult};
pub use service::quote_book::{QuoteBook, QuoteBookError, QuoteBookResult};
pub use service::transfer::{
    export_json, export_to_dir, import_from_file, import_json, ImportSummary, TransferError,
    EXPORT_FILE_NAME,
};
pub use store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreError};
pub use sync::http_remote::HttpRemoteStore;
pub use sync::reconciler::{PushOutcome, Reconciler, SyncError, SyncReport, SyncResult};
pub use sync::remote::{RemoteError, RemoteResult, RemoteStore};
pub use sync::scheduler::{SchedulerStats, SyncHandle, SyncScheduler};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
