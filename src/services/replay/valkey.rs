use std::sync::Arc;

use crate::services::{
    cache::{CacheClient, ValkeyClient, ttl_seconds},
    replay::store::{ReplayError, ReplayFuture, ReplayStore},
};

pub const DEFAULT_REPLAY_KEY_PREFIX: &str = "sig:replay";

/// Valkey-backed replay store (Redis protocol)
///
/// Fail-closed: any backend error is returned as `Err`, and the verifier
/// rejects the request.
#[derive(Clone)]
pub struct ValkeyReplayStore<C: CacheClient> {
    cache: Arc<C>,
    // key prefix to avoid collisions across environments
    prefix: String,
}

impl ValkeyReplayStore<ValkeyClient> {
    pub async fn new(redis_url: &str) -> Result<Self, ReplayError> {
        Self::new_with_prefix(redis_url, DEFAULT_REPLAY_KEY_PREFIX).await
    }

    pub async fn new_with_prefix(
        redis_url: &str,
        prefix: impl Into<String>,
    ) -> Result<Self, ReplayError> {
        let client = ValkeyClient::new(redis_url).await?;
        Ok(Self::new_with_cache(Arc::new(client), prefix))
    }
}

impl<C: CacheClient> ValkeyReplayStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, raw: &str) -> String {
        format!("{}:{}", self.prefix, raw)
    }
}

impl<C: CacheClient> ReplayStore for ValkeyReplayStore<C> {
    fn check_and_store<'a>(&'a self, key: &'a str, ttl_secs: u64) -> ReplayFuture<'a> {
        Box::pin(async move {
            let full_key = self.key(key);

            // SET <key> "1" NX EX <ttl>
            let stored = self
                .cache
                .set_if_absent_with_ttl(&full_key, "1", ttl_seconds(ttl_secs))
                .await?;

            tracing::debug!(
                backend = self.cache.backend_name(),
                key = %full_key,
                stored,
                "replay check"
            );

            Ok(stored)
        })
    }
}
