//! Read-through cache for membership checks and user profiles.
//!
//! The cache is never a source of truth. Every failure is logged by the
//! typed caches and reported to callers as a miss, so a Redis outage only
//! costs extra calls to the user service.

pub mod memory;
pub mod redis_cache;
pub mod user_info_cache;
pub mod workspace_cache;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
pub use user_info_cache::UserInfoCache;
pub use workspace_cache::WorkspaceCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache payload error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Minimal string key-value contract both backends satisfy
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    /// Values come back in key order, `None` for absent keys
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError>;
    async fn del(&self, keys: &[String]) -> Result<(), CacheError>;
    /// Delete every key starting with `prefix`
    async fn del_prefix(&self, prefix: &str) -> Result<(), CacheError>;
}
