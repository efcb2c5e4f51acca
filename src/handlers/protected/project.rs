use axum::extract::State;
use uuid::Uuid;

use crate::api::init_settings::ProjectInitSettingsResponse;
use crate::api::project::{
    CreateProjectRequest, PaginatedProjectsResponse, ProjectResponse, ProjectSearchQuery, UpdateProjectRequest,
};
use crate::middleware::{ApiResponse, ApiResult, AppJson, AppPath, AppQuery, AuthUser};
use crate::state::AppState;

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateProjectRequest>,
) -> ApiResult<ProjectResponse> {
    let project = state.projects.create(&user, req).await?;
    Ok(ApiResponse::created(project))
}

/// GET /api/projects/workspace/:workspace_id
pub async fn list_by_workspace(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(workspace_id): AppPath<Uuid>,
) -> ApiResult<Vec<ProjectResponse>> {
    let projects = state.projects.list_by_workspace(&user, workspace_id).await?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/projects/workspace/:workspace_id/default
pub async fn get_default(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(workspace_id): AppPath<Uuid>,
) -> ApiResult<ProjectResponse> {
    let project = state.projects.get_default(&user, workspace_id).await?;
    Ok(ApiResponse::success(project))
}

/// GET /api/projects/search?workspaceId=&query=&page=&limit=
pub async fn search(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<ProjectSearchQuery>,
) -> ApiResult<PaginatedProjectsResponse> {
    let page = state.projects.search(&user, query).await?;
    Ok(ApiResponse::success(page))
}

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
) -> ApiResult<ProjectResponse> {
    let project = state.projects.get(&user, project_id).await?;
    Ok(ApiResponse::success(project))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateProjectRequest>,
) -> ApiResult<ProjectResponse> {
    let project = state.projects.update(&user, project_id, req).await?;
    Ok(ApiResponse::success(project))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
) -> ApiResult<()> {
    state.projects.delete(&user, project_id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/projects/:project_id/init-settings - field definitions for the board editor
pub async fn init_settings(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
) -> ApiResult<ProjectInitSettingsResponse> {
    let settings = state.projects.init_settings(&user, project_id).await?;
    Ok(ApiResponse::success(settings))
}
