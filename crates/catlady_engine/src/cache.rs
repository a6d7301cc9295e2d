use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use catlady_core::{Clock, Snapshot, SystemClock};
use dashmap::DashMap;
use feed_logging::feed_debug;

struct CacheEntry {
    snapshot: Arc<Snapshot>,
    inserted_at: Instant,
}

/// Feed id -> most recent snapshot, each entry live for a fixed TTL.
///
/// Expiry is decided on read; `sweep` only reclaims memory held by entries
/// nobody asks for anymore.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn get(&self, feed_id: &str) -> Option<Arc<Snapshot>> {
        let entry = self.entries.get(feed_id)?;
        if self.is_live(&entry, self.clock.now()) {
            Some(entry.snapshot.clone())
        } else {
            None
        }
    }

    /// Stores `snapshot` under `feed_id`, replacing any previous entry.
    pub fn set(&self, feed_id: impl Into<String>, snapshot: Arc<Snapshot>) {
        let entry = CacheEntry {
            snapshot,
            inserted_at: self.clock.now(),
        };
        self.entries.insert(feed_id.into(), entry);
    }

    /// Drops expired entries, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| self.is_live(entry, now));
        before.saturating_sub(self.entries.len())
    }

    /// Entries physically held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs `sweep` every `interval` on a background thread. The thread exits
    /// on the first tick after the cache has been dropped.
    pub fn spawn_sweeper(cache: &Arc<Self>, interval: Duration) -> thread::JoinHandle<()> {
        let cache = Arc::downgrade(cache);
        thread::spawn(move || loop {
            thread::sleep(interval);
            let Some(cache) = cache.upgrade() else {
                break;
            };
            let removed = cache.sweep();
            if removed > 0 {
                feed_debug!("Swept {} expired feed snapshots", removed);
            }
        })
    }

    fn is_live(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }
}
