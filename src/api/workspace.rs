use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::check_length;
use crate::client::SimpleUser;
use crate::database::models::{Workspace, WorkspaceJoinRequest, WorkspaceMember};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CreateWorkspaceRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_length("name", self.name.trim(), 2, 100)?;
        check_length("description", &self.description, 0, 500)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateWorkspaceRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            check_length("name", name.trim(), 2, 100)?;
        }
        if let Some(description) = &self.description {
            check_length("description", description, 0, 500)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDefaultWorkspaceRequest {
    pub workspace_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceResponse {
    pub fn new(workspace: &Workspace, owner: Option<&SimpleUser>) -> Self {
        Self {
            id: workspace.id,
            name: workspace.name.clone(),
            description: workspace.description.clone(),
            owner_id: workspace.owner_id,
            owner_name: owner.map(|u| u.name.clone()).unwrap_or_default(),
            owner_email: owner.map(|u| u.email.clone()).unwrap_or_default(),
            created_at: workspace.created_at,
            updated_at: workspace.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMemberResponse {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub role_name: String,
    pub is_default: bool,
    pub joined_at: DateTime<Utc>,
}

impl WorkspaceMemberResponse {
    pub fn new(member: &WorkspaceMember, user: Option<&SimpleUser>) -> Self {
        Self {
            id: member.id,
            workspace_id: member.workspace_id,
            user_id: member.user_id,
            user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
            user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
            role_name: member.role.to_string(),
            is_default: member.is_default,
            joined_at: member.joined_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceJoinRequestResponse {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceJoinRequestResponse {
    pub fn new(request: &WorkspaceJoinRequest, user: Option<&SimpleUser>) -> Self {
        Self {
            id: request.id,
            workspace_id: request.workspace_id,
            user_id: request.user_id,
            user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
            user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
            status: request.status.to_string(),
            requested_at: request.requested_at,
            updated_at: request.updated_at,
        }
    }
}
