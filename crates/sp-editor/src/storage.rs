//! Client-side storage contracts.
//!
//! Uploaded PDF bytes go to a `BlobStore` (IndexedDB in the browser) and
//! their metadata to a `MetadataStore` (per-tab session storage). Both are
//! keyed by the upload's file id. `MemoryStore` implements both for tests
//! and native hosts.

use sp_core::Result;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Quota report from the host's storage estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageEstimate {
    pub quota: u64,
    pub usage: u64,
}

impl StorageEstimate {
    pub fn available(&self) -> u64 {
        self.quota.saturating_sub(self.usage)
    }
}

#[allow(async_fn_in_trait)]
pub trait BlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// `Ok(None)` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// `None` when the host cannot estimate (or estimation failed).
    async fn estimate(&self) -> Option<StorageEstimate>;
}

pub trait MetadataStore {
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn get_item(&self, key: &str) -> Option<String>;
}

/// In-memory store with an optional quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RefCell<HashMap<String, Vec<u8>>>,
    items: RefCell<HashMap<String, String>>,
    quota: Option<u64>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: u64) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Number of successful `put`/`set_item` calls.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn usage(&self) -> u64 {
        self.blobs.borrow().values().map(|b| b.len() as u64).sum()
    }
}

impl BlobStore for MemoryStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.blobs.borrow_mut().insert(key.to_string(), bytes.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    async fn estimate(&self) -> Option<StorageEstimate> {
        self.quota.map(|quota| StorageEstimate {
            quota,
            usage: self.usage(),
        })
    }
}

impl MetadataStore for MemoryStore {
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}
