use dashmap::DashMap;
use std::sync::Arc;
use std::time::{ Duration, Instant };

/// Raw response bodies keyed by the exact request identifier.
///
/// Entries expire by TTL only. Expired entries are dropped on lookup and swept on every insert,
/// so the map never holds more than one TTL window of distinct keys.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: DashMap<String, (Instant, Arc<str>)>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        if !self.is_enabled() {
            return None;
        }

        let fresh = match self.entries.get(key) {
            Some(entry) => {
                let (fetched_at, body) = entry.value();
                if fetched_at.elapsed() < self.ttl { Some(Arc::clone(body)) } else { None }
            }
            None => {
                return None;
            }
        };

        if fresh.is_none() {
            self.entries.remove_if(key, |_, (fetched_at, _)| fetched_at.elapsed() >= self.ttl);
        }
        fresh
    }

    pub fn insert(&self, key: String, body: Arc<str>) {
        if self.is_enabled() {
            self.entries.retain(|_, (fetched_at, _)| fetched_at.elapsed() < self.ttl);
            self.entries.insert(key, (Instant::now(), body));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
