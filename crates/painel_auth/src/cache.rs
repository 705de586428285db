use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A definitive answer previously obtained from the directory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedDecision {
    Authorized,
    Denied,
}

/// Bounded decision cache for the authorization gate.
///
/// Absence of an entry means "unknown" and triggers a remote lookup; a stored
/// `Denied` is a known negative, so removals stay distinguishable from emails
/// that were never checked. Entries expire after `ttl` and the oldest entry
/// is evicted once `capacity` is reached.
#[derive(Debug)]
pub struct AuthCache {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<String, (CachedDecision, Instant)>,
}

impl AuthCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, email: &str) -> Option<CachedDecision> {
        self.entries
            .get(email)
            .and_then(|(decision, stored_at)| (stored_at.elapsed() < self.ttl).then_some(*decision))
    }

    pub fn insert(&mut self, email: String, decision: CachedDecision) {
        if !self.entries.contains_key(&email) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, stored_at))| *stored_at)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                self.entries.remove(&key);
            }
        }
        self.entries.insert(email, (decision, Instant::now()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AuthCache {
    /// Sized for one operator session: a few hundred lookups, refreshed
    /// every fifteen minutes.
    fn default() -> Self {
        Self::new(1024, Duration::from_secs(15 * 60))
    }
}
