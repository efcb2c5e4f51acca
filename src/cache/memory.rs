use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{CacheError, KeyValueCache};

/// Process-local backend used when no Redis URL is configured
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>> {
        // A poisoned map only holds cache entries; keep serving it
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn live(entries: &mut HashMap<String, (String, Instant)>, key: &str) -> Option<String> {
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(Self::live(&mut self.lock(), key))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.lock()
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        let mut entries = self.lock();
        Ok(keys.iter().map(|key| Self::live(&mut entries, key)).collect())
    }

    async fn del(&self, keys: &[String]) -> Result<(), CacheError> {
        let mut entries = self.lock();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn del_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        self.lock().retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}
