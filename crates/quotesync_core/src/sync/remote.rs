//! Remote store contract.
//!
//! # Responsibility
//! - Define the fetch/push operations the reconciler needs from a server.
//! - Classify remote failures into transport, status and decode errors.

use crate::model::quote::Quote;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Endpoint configuration is unusable.
    InvalidEndpoint(String),
    /// Request never produced a response (DNS, connect, timeout).
    Transport(String),
    /// Server answered with a non-success status.
    Status { code: u16, message: String },
    /// Response body did not match the expected shape.
    Decode(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEndpoint(msg) => write!(f, "invalid remote endpoint: {msg}"),
            Self::Transport(msg) => write!(f, "remote transport error: {msg}"),
            Self::Status { code, message } => write!(f, "remote returned {code}: {message}"),
            Self::Decode(msg) => write!(f, "remote response decode error: {msg}"),
        }
    }
}

impl Error for RemoteError {}

/// Read/write access to the remote quote store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches up to `limit` records, mapped to synced quotes carrying the
    /// server sentinel category.
    async fn fetch_quotes(&self, limit: u32) -> RemoteResult<Vec<Quote>>;

    /// Pushes one local quote. Any success status counts as accepted.
    async fn push_quote(&self, quote: &Quote) -> RemoteResult<()>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn fetch_quotes(&self, limit: u32) -> RemoteResult<Vec<Quote>> {
        (**self).fetch_quotes(limit).await
    }

    async fn push_quote(&self, quote: &Quote) -> RemoteResult<()> {
        (**self).push_quote(quote).await
    }
}
