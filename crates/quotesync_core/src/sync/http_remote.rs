//! HTTP remote store against a JSONPlaceholder-style `posts` endpoint.
//!
//! # Responsibility
//! - `GET <endpoint>?_limit=N` and map each `{id, title}` to a server quote.
//! - `POST <endpoint>` one `{title, body, userId}` document per local quote.
//!
//! # Invariants
//! - Every request is bounded by the configured timeout.
//! - Posts with a blank title are dropped; they cannot form a valid quote.

use super::remote::{RemoteError, RemoteResult, RemoteStore};
use crate::model::quote::Quote;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default public mock endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
/// `userId` sent with every pushed quote.
const PUSH_USER_ID: i64 = 1;
const USER_AGENT: &str = concat!("quotesync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct RemotePost {
    id: i64,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PushBody<'a> {
    title: &'a str,
    body: &'a str,
    user_id: i64,
}

/// `reqwest`-backed implementation of [`RemoteStore`].
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    endpoint: Url,
}

impl HttpRemoteStore {
    /// Builds a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> RemoteResult<Self> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|err| RemoteError::InvalidEndpoint(format!("`{endpoint}`: {err}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidEndpoint(format!(
                "unsupported scheme `{}`",
                endpoint.scheme()
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| RemoteError::Transport(format!("failed to build client: {err}")))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_quotes(&self, limit: u32) -> RemoteResult<Vec<Quote>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("_limit", limit)])
            .send()
            .await
            .map_err(|err| RemoteError::Transport(format!("fetch failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let posts: Vec<RemotePost> = response
            .json()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))?;

        let fetched = posts.len();
        let quotes: Vec<Quote> = posts
            .into_iter()
            .filter_map(|post| {
                if post.title.trim().is_empty() {
                    warn!(
                        "event=remote_fetch module=sync status=skip reason=blank_title id={}",
                        post.id
                    );
                    return None;
                }
                Some(Quote::from_remote(post.id, post.title))
            })
            .collect();
        debug!(
            "event=remote_fetch module=sync status=ok fetched={fetched} mapped={}",
            quotes.len()
        );
        Ok(quotes)
    }

    async fn push_quote(&self, quote: &Quote) -> RemoteResult<()> {
        let body = PushBody {
            title: &quote.text,
            body: &quote.category,
            user_id: PUSH_USER_ID,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| RemoteError::Transport(format!("push failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                code: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }
        debug!(
            "event=remote_push module=sync status=ok id={} http_status={}",
            quote.id,
            status.as_u16()
        );
        Ok(())
    }
}
