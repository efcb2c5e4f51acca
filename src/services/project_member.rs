use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::access::{load_project, require_manager, require_member, require_owner};
use super::enrichment::ProfileDirectory;
use crate::api::parse_choice;
use crate::api::project::{ProjectMemberResponse, UpdateMemberRoleRequest};
use crate::cache::WorkspaceCache;
use crate::database::models::ProjectMember;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::repository::ProjectRepository;
use crate::types::MemberRole;

/// Member listing, removal and role changes. The OWNER row created with the
/// project is never removed or demoted through this service.
pub struct ProjectMemberService {
    projects: Arc<dyn ProjectRepository>,
    workspace_cache: WorkspaceCache,
    profiles: ProfileDirectory,
}

impl ProjectMemberService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        workspace_cache: WorkspaceCache,
        profiles: ProfileDirectory,
    ) -> Self {
        Self {
            projects,
            workspace_cache,
            profiles,
        }
    }

    pub async fn list(&self, caller: &AuthUser, project_id: Uuid) -> Result<Vec<ProjectMemberResponse>, ApiError> {
        let project = load_project(self.projects.as_ref(), project_id).await?;
        require_member(self.projects.as_ref(), project_id, caller.user_id).await?;

        let members = self.projects.list_members(project_id).await?;
        let user_ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();
        let profiles = self
            .profiles
            .workspace_profiles(project.workspace_id, &user_ids, &caller.token)
            .await;

        Ok(members
            .iter()
            .map(|m| ProjectMemberResponse::new(m, profiles.get(&m.user_id)))
            .collect())
    }

    /// `target_user_id` is the member's user id
    pub async fn remove(&self, caller: &AuthUser, project_id: Uuid, target_user_id: Uuid) -> Result<(), ApiError> {
        let project = load_project(self.projects.as_ref(), project_id).await?;
        require_manager(self.projects.as_ref(), project_id, caller.user_id).await?;

        let target = self.find_target(project_id, target_user_id).await?;
        if target.role.is_owner() {
            return Err(ApiError::validation("Cannot remove the project owner"));
        }
        if target.user_id == caller.user_id {
            return Err(ApiError::validation("You cannot remove yourself from the project"));
        }

        self.projects.delete_member(target.id).await?;
        self.workspace_cache
            .invalidate_membership(project.workspace_id, target.user_id)
            .await;

        info!(%project_id, user_id = %target.user_id, "project member removed");
        Ok(())
    }

    pub async fn change_role(
        &self,
        caller: &AuthUser,
        project_id: Uuid,
        target_user_id: Uuid,
        req: UpdateMemberRoleRequest,
    ) -> Result<ProjectMemberResponse, ApiError> {
        let project = load_project(self.projects.as_ref(), project_id).await?;
        require_owner(self.projects.as_ref(), project_id, caller.user_id).await?;

        let role: MemberRole = parse_choice("roleName", &req.role_name, MemberRole::ALL)?;

        let target = self.find_target(project_id, target_user_id).await?;
        if target.role.is_owner() {
            return Err(ApiError::validation("The owner's role cannot be changed"));
        }
        if role.is_owner() {
            return Err(ApiError::validation("A project has exactly one owner; ownership cannot be assigned"));
        }

        let updated = self.projects.update_member_role(target.id, role).await?;
        info!(%project_id, user_id = %updated.user_id, role = %role, "project member role changed");

        let profiles = self
            .profiles
            .workspace_profiles(project.workspace_id, &[updated.user_id], &caller.token)
            .await;
        Ok(ProjectMemberResponse::new(&updated, profiles.get(&updated.user_id)))
    }

    async fn find_target(&self, project_id: Uuid, user_id: Uuid) -> Result<ProjectMember, ApiError> {
        self.projects
            .find_member(project_id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Project member not found"))
    }
}
