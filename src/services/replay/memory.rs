use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use crate::services::replay::store::{ReplayError, ReplayFuture, ReplayStore};

/// Process-local replay store.
///
/// Only correct for a single instance; multi-instance deployments need the
/// Valkey store. Expired keys are pruned on every call.
#[derive(Debug, Default)]
pub struct InMemoryReplayStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl InMemoryReplayStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_and_store_at(&self, key: &str, ttl: Duration, now: Instant) -> Result<bool, ReplayError> {
        let mut entries = self.entries.lock().map_err(|_| ReplayError::Poisoned)?;

        entries.retain(|_, expires_at| *expires_at > now);

        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), now + ttl);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReplayStore for InMemoryReplayStore {
    fn check_and_store<'a>(&'a self, key: &'a str, ttl_secs: u64) -> ReplayFuture<'a> {
        let result = self.check_and_store_at(key, Duration::from_secs(ttl_secs.max(1)), Instant::now());
        Box::pin(async move { result })
    }
}
