//! In-memory cache of rendered pages.
//!
//! Entries are served byte-for-byte until their TTL runs out or the cache is
//! cleared. Writes made directly to the database do not invalidate anything;
//! only handlers that change posts, groups or users call [`PageCache::clear`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// A rendered page body and when it was stored.
#[derive(Debug, Clone)]
struct CachedPage {
    body: String,
    cached_at: Instant,
}

impl CachedPage {
    fn is_valid(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// Shared page cache with a single TTL for every entry.
#[derive(Debug)]
pub struct PageCache {
    entries: RwLock<HashMap<String, CachedPage>>,
    ttl: Duration,
}

impl PageCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Cache key for a page as seen by a particular viewer.
    #[must_use]
    pub fn key(uri: &str, viewer_id: Option<i64>) -> String {
        match viewer_id {
            Some(id) => format!("{uri}#user={id}"),
            None => format!("{uri}#anon"),
        }
    }

    /// Get a fresh entry, if there is one.
    pub fn get(&self, key: &str) -> Option<String> {
        if self.ttl.is_zero() {
            return None;
        }
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|page| page.is_valid(self.ttl))
            .map(|page| page.body.clone())
    }

    pub fn insert(&self, key: String, body: String) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CachedPage {
                body,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, page| page.is_valid(self.ttl));
        before - entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(20))
    }
}
