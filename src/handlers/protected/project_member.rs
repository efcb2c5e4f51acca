use axum::extract::State;
use uuid::Uuid;

use crate::api::project::{ProjectMemberResponse, UpdateMemberRoleRequest};
use crate::middleware::{ApiResponse, ApiResult, AppJson, AppPath, AuthUser};
use crate::state::AppState;

/// GET /api/projects/:project_id/members
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
) -> ApiResult<Vec<ProjectMemberResponse>> {
    let members = state.project_members.list(&user, project_id).await?;
    Ok(ApiResponse::success(members))
}

/// DELETE /api/projects/:project_id/members/:member_id
///
/// `member_id` is the member's user id.
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, member_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<()> {
    state.project_members.remove(&user, project_id, member_id).await?;
    Ok(ApiResponse::no_content())
}

/// PUT /api/projects/:project_id/members/:member_id/role
pub async fn change_role(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((project_id, member_id)): AppPath<(Uuid, Uuid)>,
    AppJson(req): AppJson<UpdateMemberRoleRequest>,
) -> ApiResult<ProjectMemberResponse> {
    let member = state.project_members.change_role(&user, project_id, member_id, req).await?;
    Ok(ApiResponse::success(member))
}
