//! Membership and role gates shared by the project-scoped services.

use tracing::warn;
use uuid::Uuid;

use crate::client::UserClient;
use crate::database::models::{Board, Project, ProjectMember};
use crate::error::ApiError;
use crate::repository::{BoardRepository, ProjectRepository};

pub async fn load_project(projects: &dyn ProjectRepository, project_id: Uuid) -> Result<Project, ApiError> {
    projects
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

pub async fn load_board(boards: &dyn BoardRepository, board_id: Uuid) -> Result<Board, ApiError> {
    boards
        .find_by_id(board_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))
}

/// Board together with its project. A board under a deleted project is
/// unreachable.
pub async fn load_live_board(
    boards: &dyn BoardRepository,
    projects: &dyn ProjectRepository,
    board_id: Uuid,
) -> Result<(Board, Project), ApiError> {
    let board = load_board(boards, board_id).await?;
    let project = projects
        .find_by_id(board.project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;
    Ok((board, project))
}

/// Current membership of `user_id`, or Forbidden
pub async fn require_member(
    projects: &dyn ProjectRepository,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<ProjectMember, ApiError> {
    match projects.find_member(project_id, user_id).await? {
        Some(member) => Ok(member),
        None => {
            warn!(%project_id, %user_id, "caller is not a project member");
            Err(ApiError::forbidden("You are not a member of this project"))
        }
    }
}

/// Membership with OWNER or ADMIN role, or Forbidden
pub async fn require_manager(
    projects: &dyn ProjectRepository,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<ProjectMember, ApiError> {
    let member = require_member(projects, project_id, user_id).await?;
    if !member.role.can_manage() {
        warn!(%project_id, %user_id, role = %member.role, "manager role required");
        return Err(ApiError::forbidden("Only project owners or admins can perform this action"));
    }
    Ok(member)
}

/// Membership with OWNER role, or Forbidden
pub async fn require_owner(
    projects: &dyn ProjectRepository,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<ProjectMember, ApiError> {
    let member = require_member(projects, project_id, user_id).await?;
    if !member.role.is_owner() {
        warn!(%project_id, %user_id, role = %member.role, "owner role required");
        return Err(ApiError::forbidden("Only the project owner can perform this action"));
    }
    Ok(member)
}

/// Workspace membership through the user service. A failed call denies.
pub async fn require_workspace_member(
    client: &dyn UserClient,
    workspace_id: Uuid,
    user_id: Uuid,
    token: &str,
) -> Result<(), ApiError> {
    match client.validate_workspace_member(workspace_id, user_id, token).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            warn!(%workspace_id, %user_id, "caller is not a workspace member");
            Err(ApiError::forbidden("You are not a member of this workspace"))
        }
        Err(err) => {
            warn!(%workspace_id, %user_id, error = %err, "workspace membership check failed");
            Err(ApiError::forbidden("Unable to verify workspace membership"))
        }
    }
}
