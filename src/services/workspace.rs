use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::enrichment::ProfileDirectory;
use crate::api::parse_choice;
use crate::api::project::{JoinRequestListQuery, UpdateJoinRequestRequest, UpdateMemberRoleRequest};
use crate::api::workspace::{
    CreateWorkspaceRequest, SetDefaultWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceJoinRequestResponse,
    WorkspaceMemberResponse, WorkspaceResponse,
};
use crate::cache::WorkspaceCache;
use crate::database::models::{NewWorkspace, Workspace, WorkspaceMember};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::repository::WorkspaceRepository;
use crate::types::{JoinRequestStatus, MemberRole};

const DECISIONS: &[JoinRequestStatus] = &[JoinRequestStatus::Approved, JoinRequestStatus::Rejected];

/// Workspaces with the same owner/admin/member rules projects use.
/// Removing a member stamps `left_at` instead of deleting the row.
pub struct WorkspaceService {
    workspaces: Arc<dyn WorkspaceRepository>,
    cache: WorkspaceCache,
    profiles: ProfileDirectory,
}

impl WorkspaceService {
    pub fn new(workspaces: Arc<dyn WorkspaceRepository>, cache: WorkspaceCache, profiles: ProfileDirectory) -> Self {
        Self {
            workspaces,
            cache,
            profiles,
        }
    }

    pub async fn create(&self, caller: &AuthUser, req: CreateWorkspaceRequest) -> Result<WorkspaceResponse, ApiError> {
        req.validate()?;

        let (workspace, _owner) = self
            .workspaces
            .create_with_owner(NewWorkspace {
                name: req.name.trim().to_string(),
                description: req.description,
                owner_id: caller.user_id,
            })
            .await?;
        self.cache.invalidate_membership(workspace.id, caller.user_id).await;

        info!(workspace_id = %workspace.id, "workspace created");
        Ok(self.with_owner(&workspace, &caller.token).await)
    }

    /// Workspaces the caller currently belongs to
    pub async fn list(&self, caller: &AuthUser) -> Result<Vec<WorkspaceResponse>, ApiError> {
        let workspaces = self.workspaces.list_for_user(caller.user_id).await?;
        let owner_ids: Vec<Uuid> = workspaces.iter().map(|w| w.owner_id).collect();
        let owners = self.profiles.simple_users(&owner_ids, &caller.token).await;

        Ok(workspaces
            .iter()
            .map(|w| WorkspaceResponse::new(w, owners.get(&w.owner_id)))
            .collect())
    }

    pub async fn get(&self, caller: &AuthUser, workspace_id: Uuid) -> Result<WorkspaceResponse, ApiError> {
        let workspace = self.load(workspace_id).await?;
        self.require_role(workspace_id, caller.user_id, |_| true).await?;
        Ok(self.with_owner(&workspace, &caller.token).await)
    }

    pub async fn update(
        &self,
        caller: &AuthUser,
        workspace_id: Uuid,
        req: UpdateWorkspaceRequest,
    ) -> Result<WorkspaceResponse, ApiError> {
        req.validate()?;
        let mut workspace = self.load(workspace_id).await?;
        self.require_role(workspace_id, caller.user_id, MemberRole::can_manage).await?;

        if let Some(name) = req.name {
            workspace.name = name.trim().to_string();
        }
        if let Some(description) = req.description {
            workspace.description = description;
        }

        let updated = self.workspaces.update(&workspace).await?;
        Ok(self.with_owner(&updated, &caller.token).await)
    }

    pub async fn delete(&self, caller: &AuthUser, workspace_id: Uuid) -> Result<(), ApiError> {
        self.load(workspace_id).await?;
        self.require_role(workspace_id, caller.user_id, MemberRole::is_owner).await?;

        self.workspaces.soft_delete(workspace_id).await?;
        self.cache.invalidate_workspace(workspace_id).await;
        info!(%workspace_id, "workspace deleted");
        Ok(())
    }

    pub async fn list_members(
        &self,
        caller: &AuthUser,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceMemberResponse>, ApiError> {
        self.load(workspace_id).await?;
        self.require_role(workspace_id, caller.user_id, |_| true).await?;

        let members = self.workspaces.list_members(workspace_id).await?;
        let user_ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();
        let profiles = self.profiles.workspace_profiles(workspace_id, &user_ids, &caller.token).await;

        Ok(members
            .iter()
            .map(|m| WorkspaceMemberResponse::new(m, profiles.get(&m.user_id)))
            .collect())
    }

    pub async fn change_member_role(
        &self,
        caller: &AuthUser,
        workspace_id: Uuid,
        target_user_id: Uuid,
        req: UpdateMemberRoleRequest,
    ) -> Result<WorkspaceMemberResponse, ApiError> {
        self.load(workspace_id).await?;
        self.require_role(workspace_id, caller.user_id, MemberRole::is_owner).await?;

        let role: MemberRole = parse_choice("roleName", &req.role_name, MemberRole::ALL)?;

        let target = self.find_target(workspace_id, target_user_id).await?;
        if target.role.is_owner() {
            return Err(ApiError::validation("The owner's role cannot be changed"));
        }
        if role.is_owner() {
            return Err(ApiError::validation(
                "A workspace has exactly one owner; ownership cannot be assigned",
            ));
        }

        let updated = self.workspaces.update_member_role(target.id, role).await?;
        info!(%workspace_id, user_id = %updated.user_id, role = %role, "workspace member role changed");
        Ok(WorkspaceMemberResponse::new(&updated, None))
    }

    pub async fn remove_member(&self, caller: &AuthUser, workspace_id: Uuid, target_user_id: Uuid) -> Result<(), ApiError> {
        self.load(workspace_id).await?;
        self.require_role(workspace_id, caller.user_id, MemberRole::can_manage).await?;

        let target = self.find_target(workspace_id, target_user_id).await?;
        if target.role.is_owner() {
            return Err(ApiError::validation("Cannot remove the workspace owner"));
        }
        if target.user_id == caller.user_id {
            return Err(ApiError::validation("You cannot remove yourself from the workspace"));
        }

        self.workspaces.remove_member(target.id).await?;
        self.cache.invalidate_membership(workspace_id, target.user_id).await;
        info!(%workspace_id, user_id = %target.user_id, "workspace member removed");
        Ok(())
    }

    pub async fn create_join_request(
        &self,
        caller: &AuthUser,
        workspace_id: Uuid,
    ) -> Result<WorkspaceJoinRequestResponse, ApiError> {
        self.load(workspace_id).await?;

        if self.workspaces.find_member(workspace_id, caller.user_id).await?.is_some() {
            return Err(ApiError::already_member("You are already a member of this workspace"));
        }
        if self
            .workspaces
            .find_pending_join_request(workspace_id, caller.user_id)
            .await?
            .is_some()
        {
            return Err(ApiError::pending_request_exists(
                "You already have a pending join request for this workspace",
            ));
        }

        let request = self
            .workspaces
            .create_join_request(workspace_id, caller.user_id)
            .await
            .map_err(|err| match ApiError::from(err) {
                ApiError::AlreadyExists(_) => ApiError::pending_request_exists(
                    "You already have a pending join request for this workspace",
                ),
                other => other,
            })?;

        info!(%workspace_id, user_id = %caller.user_id, "workspace join request created");
        Ok(WorkspaceJoinRequestResponse::new(&request, None))
    }

    pub async fn list_join_requests(
        &self,
        caller: &AuthUser,
        workspace_id: Uuid,
        query: JoinRequestListQuery,
    ) -> Result<Vec<WorkspaceJoinRequestResponse>, ApiError> {
        self.load(workspace_id).await?;
        self.require_role(workspace_id, caller.user_id, MemberRole::can_manage).await?;

        let status = query
            .status
            .as_deref()
            .map(|s| parse_choice("status", s, JoinRequestStatus::ALL))
            .transpose()?;

        let requests = self.workspaces.list_join_requests(workspace_id, status).await?;
        let user_ids: Vec<Uuid> = requests.iter().map(|r| r.user_id).collect();
        let profiles = self.profiles.simple_users(&user_ids, &caller.token).await;

        Ok(requests
            .iter()
            .map(|r| WorkspaceJoinRequestResponse::new(r, profiles.get(&r.user_id)))
            .collect())
    }

    pub async fn decide_join_request(
        &self,
        caller: &AuthUser,
        workspace_id: Uuid,
        request_id: Uuid,
        req: UpdateJoinRequestRequest,
    ) -> Result<WorkspaceJoinRequestResponse, ApiError> {
        self.load(workspace_id).await?;
        self.require_role(workspace_id, caller.user_id, MemberRole::can_manage).await?;

        let request = self
            .workspaces
            .find_join_request(request_id)
            .await?
            .filter(|r| r.workspace_id == workspace_id)
            .ok_or_else(|| ApiError::not_found("Join request not found"))?;

        if request.status.is_terminal() {
            return Err(ApiError::validation("Join request has already been processed"));
        }
        let decision = parse_choice("status", &req.status, DECISIONS)?;

        let updated = match decision {
            JoinRequestStatus::Approved => {
                let (updated, member) = self.workspaces.approve_join_request(request.id).await?;
                self.cache.invalidate_membership(workspace_id, member.user_id).await;
                info!(%workspace_id, user_id = %member.user_id, "workspace join request approved");
                updated
            }
            JoinRequestStatus::Rejected => {
                let updated = self.workspaces.reject_join_request(request.id).await?;
                info!(%workspace_id, user_id = %updated.user_id, "workspace join request rejected");
                updated
            }
            JoinRequestStatus::Pending => {
                return Err(ApiError::invalid_field("status", "must be one of APPROVED, REJECTED"));
            }
        };

        Ok(WorkspaceJoinRequestResponse::new(&updated, None))
    }

    /// Exactly one default per user; switching is atomic
    pub async fn set_default(
        &self,
        caller: &AuthUser,
        req: SetDefaultWorkspaceRequest,
    ) -> Result<WorkspaceMemberResponse, ApiError> {
        self.load(req.workspace_id).await?;
        self.require_role(req.workspace_id, caller.user_id, |_| true).await?;

        let member = self.workspaces.set_default(caller.user_id, req.workspace_id).await?;
        Ok(WorkspaceMemberResponse::new(&member, None))
    }

    async fn load(&self, workspace_id: Uuid) -> Result<Workspace, ApiError> {
        self.workspaces
            .find_by_id(workspace_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Workspace not found"))
    }

    async fn require_role(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        allowed: impl Fn(&MemberRole) -> bool,
    ) -> Result<WorkspaceMember, ApiError> {
        let member = self
            .workspaces
            .find_member(workspace_id, user_id)
            .await?
            .ok_or_else(|| {
                warn!(%workspace_id, %user_id, "caller is not a workspace member");
                ApiError::forbidden("You are not a member of this workspace")
            })?;

        if !allowed(&member.role) {
            warn!(%workspace_id, %user_id, role = %member.role, "insufficient workspace role");
            return Err(ApiError::forbidden("You do not have permission to perform this action"));
        }
        Ok(member)
    }

    async fn find_target(&self, workspace_id: Uuid, user_id: Uuid) -> Result<WorkspaceMember, ApiError> {
        self.workspaces
            .find_member(workspace_id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Workspace member not found"))
    }

    async fn with_owner(&self, workspace: &Workspace, token: &str) -> WorkspaceResponse {
        let owners = self
            .profiles
            .workspace_profiles(workspace.id, &[workspace.owner_id], token)
            .await;
        WorkspaceResponse::new(workspace, owners.get(&workspace.owner_id))
    }
}
