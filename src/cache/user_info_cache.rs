use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use super::{CacheError, KeyValueCache};
use crate::client::{SimpleUser, UserProfile, WorkspaceProfile};

/// Profile cache. Detailed and simple shapes are stored separately so list
/// endpoints can batch-read the small one.
#[derive(Clone)]
pub struct UserInfoCache {
    store: Arc<dyn KeyValueCache>,
    ttl: Duration,
}

impl UserInfoCache {
    pub fn new(store: Arc<dyn KeyValueCache>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn user_info_key(user_id: Uuid) -> String {
        format!("user_info:{}", user_id)
    }

    fn simple_user_key(user_id: Uuid) -> String {
        format!("simple_user:{}", user_id)
    }

    fn workspace_profile_key(workspace_id: Uuid, user_id: Uuid) -> String {
        format!("workspace_profile:{}:{}", workspace_id, user_id)
    }

    async fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let result: Result<Option<T>, CacheError> = async {
            match self.store.get(key).await? {
                Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
                None => Ok(None),
            }
        }
        .await;

        result.unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "profile cache read failed");
            None
        })
    }

    async fn write<T: serde::Serialize>(&self, key: &str, value: &T) {
        let result: Result<(), CacheError> = async {
            let raw = serde_json::to_string(value)?;
            self.store.set_ex(key, &raw, self.ttl).await
        }
        .await;

        if let Err(e) = result {
            warn!(key = %key, error = %e, "profile cache write failed");
        }
    }

    pub async fn get_user_info(&self, user_id: Uuid) -> Option<UserProfile> {
        self.read(&Self::user_info_key(user_id)).await
    }

    pub async fn set_user_info(&self, profile: &UserProfile) {
        self.write(&Self::user_info_key(profile.user_id), profile).await
    }

    pub async fn get_simple_user(&self, user_id: Uuid) -> Option<SimpleUser> {
        self.read(&Self::simple_user_key(user_id)).await
    }

    pub async fn set_simple_user(&self, user: &SimpleUser) {
        self.write(&Self::simple_user_key(user.user_id), user).await
    }

    pub async fn get_workspace_profile(&self, workspace_id: Uuid, user_id: Uuid) -> Option<WorkspaceProfile> {
        self.read(&Self::workspace_profile_key(workspace_id, user_id)).await
    }

    pub async fn set_workspace_profile(&self, profile: &WorkspaceProfile) {
        self.write(
            &Self::workspace_profile_key(profile.workspace_id, profile.user_id),
            profile,
        )
        .await
    }

    /// Only cached users are returned; absent ids are misses, not unknown users
    pub async fn get_simple_users_batch(&self, user_ids: &[Uuid]) -> HashMap<Uuid, SimpleUser> {
        if user_ids.is_empty() {
            return HashMap::new();
        }

        let keys: Vec<String> = user_ids.iter().map(|id| Self::simple_user_key(*id)).collect();
        let values = match self.store.mget(&keys).await {
            Ok(values) => values,
            Err(e) => {
                warn!(count = keys.len(), error = %e, "profile cache batch read failed");
                return HashMap::new();
            }
        };

        user_ids
            .iter()
            .zip(values)
            .filter_map(|(id, raw)| {
                let user: SimpleUser = serde_json::from_str(&raw?).ok()?;
                Some((*id, user))
            })
            .collect()
    }

    pub async fn set_simple_users_batch(&self, users: &[SimpleUser]) {
        for user in users {
            self.set_simple_user(user).await;
        }
    }

    pub async fn invalidate_user(&self, user_id: Uuid) {
        let keys = [Self::user_info_key(user_id), Self::simple_user_key(user_id)];
        if let Err(e) = self.store.del(&keys).await {
            warn!(user_id = %user_id, error = %e, "profile cache invalidation failed");
        }
    }

    pub async fn invalidate_workspace_profile(&self, workspace_id: Uuid, user_id: Uuid) {
        let key = Self::workspace_profile_key(workspace_id, user_id);
        if let Err(e) = self.store.del(&[key.clone()]).await {
            warn!(key = %key, error = %e, "profile cache invalidation failed");
        }
    }
}
