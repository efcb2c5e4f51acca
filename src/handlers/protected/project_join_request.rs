use axum::extract::State;
use uuid::Uuid;

use crate::api::project::{
    CreateProjectJoinRequest, JoinRequestListQuery, ProjectJoinRequestResponse, UpdateJoinRequestRequest,
};
use crate::middleware::{ApiResponse, ApiResult, AppJson, AppPath, AppQuery, AuthUser};
use crate::state::AppState;

/// POST /api/projects/join-requests
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateProjectJoinRequest>,
) -> ApiResult<ProjectJoinRequestResponse> {
    let request = state.project_join_requests.create(&user, req).await?;
    Ok(ApiResponse::created(request))
}

/// GET /api/projects/:project_id/join-requests?status=
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<JoinRequestListQuery>,
) -> ApiResult<Vec<ProjectJoinRequestResponse>> {
    let requests = state.project_join_requests.list(&user, project_id, query).await?;
    Ok(ApiResponse::success(requests))
}

/// PUT /api/projects/join-requests/:join_request_id
pub async fn decide(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(request_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateJoinRequestRequest>,
) -> ApiResult<ProjectJoinRequestResponse> {
    let request = state.project_join_requests.decide(&user, request_id, req).await?;
    Ok(ApiResponse::success(request))
}
