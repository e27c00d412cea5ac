//! Registry of per-client limiter state.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use super::bucket::{Quota, TokenBucket};

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A token was consumed; forward the request.
    Allowed,
    /// No token available; reject the request.
    Denied {
        /// Time until the next token, if the bucket refills at all.
        retry_after: Option<Duration>,
    },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Limiter state held for one client.
#[derive(Debug)]
pub struct ClientLimiterEntry {
    bucket: TokenBucket,
    last_seen: Instant,
}

impl ClientLimiterEntry {
    fn new(quota: Quota, now: Instant) -> Self {
        Self {
            bucket: TokenBucket::new(quota, now),
            last_seen: now,
        }
    }

    fn touch(&mut self, now: Instant) {
        self.last_seen = now;
    }

    fn is_stale(&self, now: Instant, stale_after: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > stale_after
    }
}

/// Maps client identity to its limiter state.
///
/// A single mutex guards the map and every entry. An admit call holds it for
/// the whole lookup, touch and token check, so updates for one client are
/// linearized and an entry is never evicted halfway through an admit.
pub struct ClientRegistry {
    clients: Mutex<HashMap<String, ClientLimiterEntry>>,
    quota: Quota,
}

impl ClientRegistry {
    pub fn new(quota: Quota) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            quota,
        }
    }

    /// Decide whether a request from `identity` may proceed.
    pub fn admit(&self, identity: &str) -> Admission {
        let now = Instant::now();
        let mut clients = self.lock();

        let entry = Self::get_or_create(&mut clients, identity, self.quota, now);
        entry.touch(now);

        match entry.bucket.try_acquire(now) {
            Ok(()) => Admission::Allowed,
            Err(retry_after) => Admission::Denied { retry_after },
        }
    }

    /// Remove clients not seen for longer than `stale_after`.
    ///
    /// Returns how many entries were removed.
    pub fn evict_stale(&self, stale_after: Duration) -> usize {
        let now = Instant::now();
        let mut clients = self.lock();

        let before = clients.len();
        clients.retain(|_, entry| !entry.is_stale(now, stale_after));
        before - clients.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.lock().contains_key(identity)
    }

    fn get_or_create<'a>(
        clients: &'a mut HashMap<String, ClientLimiterEntry>,
        identity: &str,
        quota: Quota,
        now: Instant,
    ) -> &'a mut ClientLimiterEntry {
        clients.entry(identity.to_owned()).or_insert_with(|| {
            tracing::trace!(client = %identity, "Tracking new client");
            ClientLimiterEntry::new(quota, now)
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ClientLimiterEntry>> {
        // Entries stay consistent even if a holder panicked; keep serving.
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
