use std::{future::Future, pin::Pin};

use crate::services::cache::CacheError;

pub type ReplayFuture<'a> = Pin<Box<dyn Future<Output = Result<bool, ReplayError>> + Send + 'a>>;

/// Nonce bookkeeping for signed requests.
pub trait ReplayStore: Send + Sync {
    // Atomically check whether `key` was already seen and store it with TTL.
    //
    // Returns:
    // - Ok(true)  => first time (stored)
    // - Ok(false) => replay detected (already exists)
    // - Err(_)    => backend failure (caller must treat as verification failure)
    fn check_and_store<'a>(&'a self, key: &'a str, ttl_secs: u64) -> ReplayFuture<'a>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("replay store lock poisoned")]
    Poisoned,
}
