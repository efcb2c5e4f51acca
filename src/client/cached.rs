use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{ClientError, SimpleUser, UserClient, UserProfile, WorkspaceProfile};
use crate::cache::{UserInfoCache, WorkspaceCache};

/// Read-through decorator. Only successful answers are cached, so a failing
/// user service is retried on the next request.
pub struct CachedUserClient {
    inner: Arc<dyn UserClient>,
    workspaces: WorkspaceCache,
    users: UserInfoCache,
}

impl CachedUserClient {
    pub fn new(inner: Arc<dyn UserClient>, workspaces: WorkspaceCache, users: UserInfoCache) -> Self {
        Self {
            inner,
            workspaces,
            users,
        }
    }
}

#[async_trait]
impl UserClient for CachedUserClient {
    async fn validate_workspace_member(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<bool, ClientError> {
        if let Some(is_member) = self.workspaces.get_membership(workspace_id, user_id).await {
            debug!(%workspace_id, %user_id, "membership cache hit");
            return Ok(is_member);
        }

        let is_member = self
            .inner
            .validate_workspace_member(workspace_id, user_id, token)
            .await?;
        self.workspaces
            .set_membership(workspace_id, user_id, is_member)
            .await;
        Ok(is_member)
    }

    async fn get_workspace_profile(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<WorkspaceProfile, ClientError> {
        if let Some(profile) = self.users.get_workspace_profile(workspace_id, user_id).await {
            return Ok(profile);
        }

        let profile = self
            .inner
            .get_workspace_profile(workspace_id, user_id, token)
            .await?;
        self.users.set_workspace_profile(&profile).await;
        Ok(profile)
    }

    async fn get_user_profile(&self, user_id: Uuid, token: &str) -> Result<UserProfile, ClientError> {
        if let Some(profile) = self.users.get_user_info(user_id).await {
            return Ok(profile);
        }

        let profile = self.inner.get_user_profile(user_id, token).await?;
        self.users.set_user_info(&profile).await;
        self.users.set_simple_user(&SimpleUser::from(&profile)).await;
        Ok(profile)
    }
}
