use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use super::KeyValueCache;

/// Memoized workspace membership checks, keyed `workspace_member:{ws}:{user}`
#[derive(Clone)]
pub struct WorkspaceCache {
    store: Arc<dyn KeyValueCache>,
    ttl: Duration,
}

impl WorkspaceCache {
    pub fn new(store: Arc<dyn KeyValueCache>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn membership_key(workspace_id: Uuid, user_id: Uuid) -> String {
        format!("workspace_member:{}:{}", workspace_id, user_id)
    }

    /// `None` is a miss, including when the backend is unavailable
    pub async fn get_membership(&self, workspace_id: Uuid, user_id: Uuid) -> Option<bool> {
        let key = Self::membership_key(workspace_id, user_id);
        match self.store.get(&key).await {
            Ok(Some(value)) => match value.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "membership cache read failed");
                None
            }
        }
    }

    pub async fn set_membership(&self, workspace_id: Uuid, user_id: Uuid, is_member: bool) {
        let key = Self::membership_key(workspace_id, user_id);
        let value = if is_member { "true" } else { "false" };
        if let Err(e) = self.store.set_ex(&key, value, self.ttl).await {
            warn!(key = %key, error = %e, "membership cache write failed");
        }
    }

    pub async fn invalidate_membership(&self, workspace_id: Uuid, user_id: Uuid) {
        let key = Self::membership_key(workspace_id, user_id);
        if let Err(e) = self.store.del(&[key.clone()]).await {
            warn!(key = %key, error = %e, "membership cache invalidation failed");
        }
    }

    /// Drop every cached membership of a workspace
    pub async fn invalidate_workspace(&self, workspace_id: Uuid) {
        let prefix = format!("workspace_member:{}:", workspace_id);
        if let Err(e) = self.store.del_prefix(&prefix).await {
            warn!(workspace_id = %workspace_id, error = %e, "workspace cache invalidation failed");
        }
    }
}
