use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::access::{load_project, require_manager, require_workspace_member};
use super::enrichment::ProfileDirectory;
use crate::api::parse_choice;
use crate::api::project::{
    CreateProjectJoinRequest, JoinRequestListQuery, ProjectJoinRequestResponse, UpdateJoinRequestRequest,
};
use crate::cache::WorkspaceCache;
use crate::client::UserClient;
use crate::database::models::ProjectJoinRequest;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::repository::ProjectRepository;
use crate::types::JoinRequestStatus;

const DECISIONS: &[JoinRequestStatus] = &[JoinRequestStatus::Approved, JoinRequestStatus::Rejected];

/// PENDING → APPROVED | REJECTED; both outcomes are final.
pub struct ProjectJoinRequestService {
    projects: Arc<dyn ProjectRepository>,
    client: Arc<dyn UserClient>,
    workspace_cache: WorkspaceCache,
    profiles: ProfileDirectory,
}

impl ProjectJoinRequestService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        client: Arc<dyn UserClient>,
        workspace_cache: WorkspaceCache,
        profiles: ProfileDirectory,
    ) -> Self {
        Self {
            projects,
            client,
            workspace_cache,
            profiles,
        }
    }

    pub async fn create(
        &self,
        caller: &AuthUser,
        req: CreateProjectJoinRequest,
    ) -> Result<ProjectJoinRequestResponse, ApiError> {
        let project = load_project(self.projects.as_ref(), req.project_id).await?;

        if self.projects.find_member(project.id, caller.user_id).await?.is_some() {
            return Err(ApiError::already_member("You are already a member of this project"));
        }
        if self
            .projects
            .find_pending_join_request(project.id, caller.user_id)
            .await?
            .is_some()
        {
            return Err(ApiError::pending_request_exists(
                "You already have a pending join request for this project",
            ));
        }

        require_workspace_member(self.client.as_ref(), project.workspace_id, caller.user_id, &caller.token)
            .await?;

        let request = self
            .projects
            .create_join_request(project.id, caller.user_id)
            .await
            .map_err(|err| match ApiError::from(err) {
                // lost a race with a concurrent request from the same user
                ApiError::AlreadyExists(_) => ApiError::pending_request_exists(
                    "You already have a pending join request for this project",
                ),
                other => other,
            })?;

        info!(project_id = %project.id, user_id = %caller.user_id, "project join request created");
        Ok(self.respond(project.workspace_id, request, &caller.token).await)
    }

    pub async fn list(
        &self,
        caller: &AuthUser,
        project_id: Uuid,
        query: JoinRequestListQuery,
    ) -> Result<Vec<ProjectJoinRequestResponse>, ApiError> {
        let project = load_project(self.projects.as_ref(), project_id).await?;
        require_manager(self.projects.as_ref(), project_id, caller.user_id).await?;

        let status = query
            .status
            .as_deref()
            .map(|s| parse_choice("status", s, JoinRequestStatus::ALL))
            .transpose()?;

        let requests = self.projects.list_join_requests(project_id, status).await?;
        let user_ids: Vec<Uuid> = requests.iter().map(|r| r.user_id).collect();
        let profiles = self
            .profiles
            .workspace_profiles(project.workspace_id, &user_ids, &caller.token)
            .await;

        Ok(requests
            .iter()
            .map(|r| ProjectJoinRequestResponse::new(r, profiles.get(&r.user_id)))
            .collect())
    }

    /// Approve or reject. Approval adds the requester as MEMBER in the same
    /// transaction as the status change.
    pub async fn decide(
        &self,
        caller: &AuthUser,
        request_id: Uuid,
        req: UpdateJoinRequestRequest,
    ) -> Result<ProjectJoinRequestResponse, ApiError> {
        let request = self
            .projects
            .find_join_request(request_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Join request not found"))?;
        let project = load_project(self.projects.as_ref(), request.project_id).await?;
        require_manager(self.projects.as_ref(), project.id, caller.user_id).await?;

        if request.status.is_terminal() {
            return Err(ApiError::validation("Join request has already been processed"));
        }
        let decision = parse_choice("status", &req.status, DECISIONS)?;

        let updated = match decision {
            JoinRequestStatus::Approved => {
                let (updated, member) = self.projects.approve_join_request(request.id).await?;
                self.workspace_cache
                    .invalidate_membership(project.workspace_id, member.user_id)
                    .await;
                info!(project_id = %project.id, user_id = %member.user_id, "project join request approved");
                updated
            }
            JoinRequestStatus::Rejected => {
                let updated = self.projects.reject_join_request(request.id).await?;
                info!(project_id = %project.id, user_id = %updated.user_id, "project join request rejected");
                updated
            }
            JoinRequestStatus::Pending => {
                return Err(ApiError::invalid_field("status", "must be one of APPROVED, REJECTED"));
            }
        };

        Ok(self.respond(project.workspace_id, updated, &caller.token).await)
    }

    async fn respond(
        &self,
        workspace_id: Uuid,
        request: ProjectJoinRequest,
        token: &str,
    ) -> ProjectJoinRequestResponse {
        let profiles = self
            .profiles
            .workspace_profiles(workspace_id, &[request.user_id], token)
            .await;
        ProjectJoinRequestResponse::new(&request, profiles.get(&request.user_id))
    }
}
