//! Client for the external user service.
//!
//! The service owns users, workspace memberships as seen by other services,
//! and workspace-scoped profiles. Every call forwards the caller's bearer
//! token; the user service re-validates it.

pub mod cached;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use cached::CachedUserClient;
pub use http::HttpUserClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("user service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("user service returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode user service response: {0}")]
    Decode(String),

    #[error("invalid user service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Body of `GET /api/workspaces/{workspaceId}/validate-member/{userId}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipValidation {
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub is_valid: bool,
}

impl MembershipValidation {
    /// Either flag counts
    pub fn is_member(&self) -> bool {
        self.valid || self.is_valid
    }
}

/// Detailed user record, cached under `user_info:{userId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "id")]
    pub user_id: Uuid,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A user's profile inside one workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceProfile {
    #[serde(default)]
    pub profile_id: Option<Uuid>,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub nick_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// Display shape used to decorate responses, cached under `simple_user:{userId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&UserProfile> for SimpleUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            user_id: profile.user_id,
            name: profile.name.clone(),
            email: profile.email.clone(),
        }
    }
}

impl From<&WorkspaceProfile> for SimpleUser {
    fn from(profile: &WorkspaceProfile) -> Self {
        Self {
            user_id: profile.user_id,
            name: profile.nick_name.clone(),
            email: profile.email.clone(),
        }
    }
}

#[async_trait]
pub trait UserClient: Send + Sync {
    async fn validate_workspace_member(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<bool, ClientError>;

    async fn get_workspace_profile(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<WorkspaceProfile, ClientError>;

    async fn get_user_profile(&self, user_id: Uuid, token: &str) -> Result<UserProfile, ClientError>;
}
