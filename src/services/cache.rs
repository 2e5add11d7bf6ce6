use std::time::{Duration, Instant};

use dashmap::DashMap;

/// TTL cache scoped by (provider, owner). Backs the plan-catalog and
/// account-details lookups; a successful upgrade invalidates both scopes so
/// the destination screen never observes stale seat or plan data.
pub struct ScopedCache<T> {
    ttl: Duration,
    entries: DashMap<String, CachedEntry<T>>,
}

struct CachedEntry<T> {
    value: T,
    stored_at: Instant,
}

fn scope_key(provider: &str, owner: &str) -> String {
    format!("{}/{}", provider, owner)
}

impl<T: Clone> ScopedCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, provider: &str, owner: &str) -> Option<T> {
        let key = scope_key(provider, owner);
        if let Some(entry) = self.entries.get(&key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
        }

        // Expired entries are dropped on the read path.
        self.entries.remove(&key);
        None
    }

    pub fn put(&self, provider: &str, owner: &str, value: T) {
        self.entries.insert(
            scope_key(provider, owner),
            CachedEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, provider: &str, owner: &str) {
        self.entries.remove(&scope_key(provider, owner));
    }
}
