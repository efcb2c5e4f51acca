use axum::extract::State;
use uuid::Uuid;

use crate::api::project::{JoinRequestListQuery, UpdateJoinRequestRequest, UpdateMemberRoleRequest};
use crate::api::workspace::{
    CreateWorkspaceRequest, SetDefaultWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceJoinRequestResponse,
    WorkspaceMemberResponse, WorkspaceResponse,
};
use crate::middleware::{ApiResponse, ApiResult, AppJson, AppPath, AppQuery, AuthUser};
use crate::state::AppState;

/// POST /api/workspaces
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateWorkspaceRequest>,
) -> ApiResult<WorkspaceResponse> {
    let workspace = state.workspaces.create(&user, req).await?;
    Ok(ApiResponse::created(workspace))
}

/// GET /api/workspaces - the caller's workspaces, default first
pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<WorkspaceResponse>> {
    let workspaces = state.workspaces.list(&user).await?;
    Ok(ApiResponse::success(workspaces))
}

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(workspace_id): AppPath<Uuid>,
) -> ApiResult<WorkspaceResponse> {
    let workspace = state.workspaces.get(&user, workspace_id).await?;
    Ok(ApiResponse::success(workspace))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(workspace_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateWorkspaceRequest>,
) -> ApiResult<WorkspaceResponse> {
    let workspace = state.workspaces.update(&user, workspace_id, req).await?;
    Ok(ApiResponse::success(workspace))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(workspace_id): AppPath<Uuid>,
) -> ApiResult<()> {
    state.workspaces.delete(&user, workspace_id).await?;
    Ok(ApiResponse::no_content())
}

/// PUT /api/workspaces/default
pub async fn set_default(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<SetDefaultWorkspaceRequest>,
) -> ApiResult<WorkspaceMemberResponse> {
    let member = state.workspaces.set_default(&user, req).await?;
    Ok(ApiResponse::success(member))
}

/// GET /api/workspaces/:workspace_id/members
pub async fn list_members(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(workspace_id): AppPath<Uuid>,
) -> ApiResult<Vec<WorkspaceMemberResponse>> {
    let members = state.workspaces.list_members(&user, workspace_id).await?;
    Ok(ApiResponse::success(members))
}

/// PUT /api/workspaces/:workspace_id/members/:user_id/role
pub async fn change_member_role(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((workspace_id, user_id)): AppPath<(Uuid, Uuid)>,
    AppJson(req): AppJson<UpdateMemberRoleRequest>,
) -> ApiResult<WorkspaceMemberResponse> {
    let member = state
        .workspaces
        .change_member_role(&user, workspace_id, user_id, req)
        .await?;
    Ok(ApiResponse::success(member))
}

/// DELETE /api/workspaces/:workspace_id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((workspace_id, user_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<()> {
    state.workspaces.remove_member(&user, workspace_id, user_id).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/workspaces/:workspace_id/join-requests
pub async fn create_join_request(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(workspace_id): AppPath<Uuid>,
) -> ApiResult<WorkspaceJoinRequestResponse> {
    let request = state.workspaces.create_join_request(&user, workspace_id).await?;
    Ok(ApiResponse::created(request))
}

pub async fn list_join_requests(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(workspace_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<JoinRequestListQuery>,
) -> ApiResult<Vec<WorkspaceJoinRequestResponse>> {
    let requests = state.workspaces.list_join_requests(&user, workspace_id, query).await?;
    Ok(ApiResponse::success(requests))
}

/// PUT /api/workspaces/:workspace_id/join-requests/:request_id
pub async fn decide_join_request(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((workspace_id, request_id)): AppPath<(Uuid, Uuid)>,
    AppJson(req): AppJson<UpdateJoinRequestRequest>,
) -> ApiResult<WorkspaceJoinRequestResponse> {
    let request = state
        .workspaces
        .decide_join_request(&user, workspace_id, request_id, req)
        .await?;
    Ok(ApiResponse::success(request))
}
