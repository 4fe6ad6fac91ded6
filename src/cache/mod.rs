//! Rendered page cache with time-based revalidation
//!
//! Detail pages are rendered once and then served from memory. After the
//! revalidation interval an entry turns stale: it is still served, and the
//! caller is expected to refresh it in the background. Identifiers being
//! resolved are tracked so each one is fetched by a single task at a time.
//!
//! Lookups that produced no page (unknown identifier, CMS failure) are kept
//! only for a short while and only up to [`MAX_MISSES`] at once.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

/// Most not-found or failed entries kept at once
pub const MAX_MISSES: usize = 1024;

/// What is stored for an identifier
#[derive(Debug, Clone, PartialEq)]
pub enum CachedPage {
    /// Rendered HTML
    Page(Arc<str>),
    /// The CMS has no document with this identifier
    NotFound,
    /// The CMS could not be reached or answered with an error
    Failed,
}

impl CachedPage {
    /// A lookup that produced no page
    pub fn is_miss(&self) -> bool {
        !matches!(self, CachedPage::Page(_))
    }
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Fresh(CachedPage),
    /// Only rendered pages go stale; expired misses are reported as `Missing`
    Stale(CachedPage),
    Missing,
}

#[derive(Debug)]
struct Entry {
    page: CachedPage,
    rendered_at: Instant,
}

type Entries = HashMap<String, Entry>;

/// In-memory cache of rendered pages keyed by identifier
#[derive(Debug)]
pub struct PageCache {
    revalidate_after: Duration,
    miss_ttl: Duration,
    max_misses: usize,
    entries: RwLock<Entries>,
    pending: Mutex<HashSet<String>>,
}

impl PageCache {
    pub fn new(revalidate_after: Duration, miss_ttl: Duration) -> Self {
        Self {
            revalidate_after,
            miss_ttl,
            max_misses: MAX_MISSES,
            entries: RwLock::new(HashMap::new()),
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Keep at most `max` not-found or failed entries
    pub fn with_max_misses(mut self, max: usize) -> Self {
        self.max_misses = max.max(1);
        self
    }

    /// Look up an identifier
    pub async fn lookup(&self, key: &str) -> Lookup {
        self.lookup_at(key, Instant::now()).await
    }

    /// Look up an identifier as of `now`
    pub async fn lookup_at(&self, key: &str, now: Instant) -> Lookup {
        let entries = self.entries.read().await;
        let Some(entry) = entries.get(key) else {
            return Lookup::Missing;
        };

        let age = now.saturating_duration_since(entry.rendered_at);
        match &entry.page {
            CachedPage::Page(_) if age < self.revalidate_after => Lookup::Fresh(entry.page.clone()),
            CachedPage::Page(_) => Lookup::Stale(entry.page.clone()),
            _ if age < self.miss_ttl => Lookup::Fresh(entry.page.clone()),
            _ => Lookup::Missing,
        }
    }

    /// Store a page rendered now
    pub async fn insert(&self, key: &str, page: CachedPage) {
        self.insert_at(key, page, Instant::now()).await
    }

    /// Store a page rendered at `rendered_at`
    pub async fn insert_at(&self, key: &str, page: CachedPage, rendered_at: Instant) {
        let mut entries = self.entries.write().await;
        self.put(&mut entries, key, page, rendered_at);
    }

    /// Remember that resolving `key` failed
    ///
    /// A rendered page already cached for `key` is kept as is. Returns whether
    /// the failure was recorded.
    pub async fn record_failure(&self, key: &str) -> bool {
        self.record_failure_at(key, Instant::now()).await
    }

    pub async fn record_failure_at(&self, key: &str, at: Instant) -> bool {
        let mut entries = self.entries.write().await;
        if matches!(entries.get(key), Some(Entry { page: CachedPage::Page(_), .. })) {
            return false;
        }
        self.put(&mut entries, key, CachedPage::Failed, at);
        true
    }

    fn put(&self, entries: &mut Entries, key: &str, page: CachedPage, rendered_at: Instant) {
        let adds_miss = page.is_miss() && !entries.get(key).is_some_and(|e| e.page.is_miss());
        if adds_miss {
            self.make_room_for_miss(entries, rendered_at);
        }
        entries.insert(key.to_string(), Entry { page, rendered_at });
    }

    /// Drop expired misses, then the oldest ones, until one more fits
    fn make_room_for_miss(&self, entries: &mut Entries, now: Instant) {
        let misses = entries.values().filter(|e| e.page.is_miss()).count();
        if misses < self.max_misses {
            return;
        }

        entries.retain(|_, e| {
            !e.page.is_miss() || now.saturating_duration_since(e.rendered_at) < self.miss_ttl
        });

        let mut misses: Vec<(Instant, String)> = entries
            .iter()
            .filter(|(_, e)| e.page.is_miss())
            .map(|(key, e)| (e.rendered_at, key.clone()))
            .collect();
        if misses.len() < self.max_misses {
            return;
        }

        misses.sort();
        let excess = misses.len() + 1 - self.max_misses;
        for (_, key) in misses.into_iter().take(excess) {
            entries.remove(&key);
        }
    }

    /// Number of cached identifiers
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Claim an identifier for resolution; `false` if another task already holds it
    pub async fn begin(&self, key: &str) -> bool {
        self.pending.lock().await.insert(key.to_string())
    }

    /// Release a claim taken with [`PageCache::begin`]
    pub async fn finish(&self, key: &str) {
        self.pending.lock().await.remove(key);
    }

    pub async fn is_pending(&self, key: &str) -> bool {
        self.pending.lock().await.contains(key)
    }
}
