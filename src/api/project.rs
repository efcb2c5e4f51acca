use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_length, Pagination};
use crate::client::SimpleUser;
use crate::database::models::{Project, ProjectJoinRequest, ProjectMember};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub workspace_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
}

impl CreateProjectRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_length("name", self.name.trim(), 2, 100)?;
        check_length("description", &self.description, 0, 500)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl UpdateProjectRequest {
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
pub struct ProjectSearchQuery {
    pub workspace_id: Uuid,
    pub query: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ProjectSearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub project_id: Uuid,
    pub workspace_id: Uuid,
    pub owner_id: Uuid,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub owner_email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub owner_name: String,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectResponse {
    pub fn new(project: &Project, owner: Option<&SimpleUser>) -> Self {
        Self {
            project_id: project.id,
            workspace_id: project.workspace_id,
            owner_id: project.owner_id,
            owner_email: owner.map(|u| u.email.clone()).unwrap_or_default(),
            owner_name: owner.map(|u| u.name.clone()).unwrap_or_default(),
            name: project.name.clone(),
            description: project.description.clone(),
            is_public: project.is_public,
            is_default: project.is_default,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedProjectsResponse {
    pub projects: Vec<ProjectResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberResponse {
    pub member_id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    pub role_name: String,
    pub joined_at: DateTime<Utc>,
}

impl ProjectMemberResponse {
    pub fn new(member: &ProjectMember, user: Option<&SimpleUser>) -> Self {
        Self {
            member_id: member.id,
            project_id: member.project_id,
            user_id: member.user_id,
            user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
            user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
            role_name: member.role.to_string(),
            joined_at: member.joined_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRoleRequest {
    pub role_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectJoinRequest {
    pub project_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJoinRequestRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinRequestListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectJoinRequestResponse {
    pub request_id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectJoinRequestResponse {
    pub fn new(request: &ProjectJoinRequest, user: Option<&SimpleUser>) -> Self {
        Self {
            request_id: request.id,
            project_id: request.project_id,
            user_id: request.user_id,
            user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
            user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
            status: request.status.to_string(),
            requested_at: request.requested_at,
            updated_at: request.updated_at,
        }
    }
}
