//! Remote synchronization.
//!
//! # Responsibility
//! - Define the remote store contract and its HTTP implementation.
//! - Reconcile the local quote book with the remote store (server wins).
//! - Schedule periodic reconciliation with a stoppable handle.

pub mod http_remote;
pub mod merge;
pub mod reconciler;
pub mod remote;
pub mod scheduler;
