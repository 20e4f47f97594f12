#![allow(dead_code)]

use async_trait::async_trait;
use quotesync_core::store::StoreResult;
use quotesync_core::{
    KeyValueStore, MemoryKeyValueStore, Quote, QuoteBook, QuoteId, QuoteRepository, Reconciler,
    RemoteError, RemoteResult, RemoteStore, StoreError,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scriptable in-memory remote store.
#[derive(Default)]
pub struct MockRemote {
    records: Mutex<Vec<Quote>>,
    fail_fetch: AtomicBool,
    failing_pushes: Mutex<HashSet<QuoteId>>,
    pushed: Mutex<Vec<Quote>>,
    fetch_calls: AtomicUsize,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockRemote {
    pub fn with_records(records: Vec<Quote>) -> Arc<Self> {
        let remote = Self::default();
        *remote.records.lock().unwrap() = records;
        Arc::new(remote)
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_push_for(&self, id: QuoteId) {
        self.failing_pushes.lock().unwrap().insert(id);
    }

    /// Makes every fetch wait until the returned notifier fires.
    pub fn gate_fetch(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.fetch_gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn pushed_ids(&self) -> Vec<QuoteId> {
        self.pushed.lock().unwrap().iter().map(|quote| quote.id).collect()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn fetch_quotes(&self, limit: u32) -> RemoteResult<Vec<Quote>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.fetch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                code: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn push_quote(&self, quote: &Quote) -> RemoteResult<()> {
        if self.failing_pushes.lock().unwrap().contains(&quote.id) {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        self.pushed.lock().unwrap().push(quote.clone());
        Ok(())
    }
}

/// Durable store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Poisoned);
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }
}

pub fn memory_repo() -> (Arc<MemoryKeyValueStore>, QuoteRepository) {
    let durable = Arc::new(MemoryKeyValueStore::new());
    let repo = QuoteRepository::new(durable.clone(), Arc::new(MemoryKeyValueStore::new()));
    (durable, repo)
}

pub fn book_with(quotes: Vec<Quote>) -> (Arc<MemoryKeyValueStore>, QuoteBook) {
    let (durable, repo) = memory_repo();
    (durable, QuoteBook::with_quotes(repo, quotes))
}

pub fn reconciler_for(
    remote: Arc<MockRemote>,
    book: QuoteBook,
) -> Arc<Reconciler<Arc<MockRemote>>> {
    Arc::new(Reconciler::new(
        remote,
        Arc::new(tokio::sync::Mutex::new(book)),
        5,
    ))
}
