//! Per-ad-set write serialization.
//!
//! Combination generation reads the existing tuple set, expands, and
//! inserts; two concurrent generate calls for the same ad set would race
//! that read-then-write window. Each ad set gets its own async mutex so
//! writes to one ad set queue up while other ad sets proceed untouched.

use std::collections::HashMap;
use std::sync::Arc;

use adcraft_core::types::DbId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-ad-set write locks.
#[derive(Default)]
pub struct AdsetLocks {
    inner: Mutex<HashMap<DbId, Arc<Mutex<()>>>>,
}

impl AdsetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the write lock for one ad set, waiting if another writer
    /// holds it. The guard releases on drop.
    ///
    /// Lock entries are never evicted; the registry grows with the number
    /// of distinct ad sets ever written, which is small.
    pub async fn acquire(&self, ad_set_id: DbId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(ad_set_id).or_default())
        };
        lock.lock_owned().await
    }
}
