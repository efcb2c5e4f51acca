use axum::extract::State;
use uuid::Uuid;

use crate::api::board::{
    BoardDetailResponse, BoardListQuery, BoardResponse, CreateBoardRequest, PaginatedBoardsResponse,
    UpdateBoardFieldRequest, UpdateBoardRequest,
};
use crate::middleware::{ApiResponse, ApiResult, AppJson, AppPath, AppQuery, AuthUser};
use crate::state::AppState;

/// POST /api/boards
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateBoardRequest>,
) -> ApiResult<BoardResponse> {
    let board = state.boards.create(&user, req).await?;
    Ok(ApiResponse::created(board))
}

/// GET /api/boards/:board_id - board with participants and comments
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(board_id): AppPath<Uuid>,
) -> ApiResult<BoardDetailResponse> {
    let board = state.boards.get(&user, board_id).await?;
    Ok(ApiResponse::success(board))
}

/// GET /api/boards/project/:project_id
pub async fn list_by_project(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(project_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<BoardListQuery>,
) -> ApiResult<PaginatedBoardsResponse> {
    let page = state.boards.list_by_project(&user, project_id, query).await?;
    Ok(ApiResponse::success(page))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(board_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateBoardRequest>,
) -> ApiResult<BoardResponse> {
    let board = state.boards.update(&user, board_id, req).await?;
    Ok(ApiResponse::success(board))
}

/// PUT /api/boards/:board_id/field
pub async fn update_field(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(board_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateBoardFieldRequest>,
) -> ApiResult<BoardResponse> {
    let board = state.boards.update_field(&user, board_id, req).await?;
    Ok(ApiResponse::success(board))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(board_id): AppPath<Uuid>,
) -> ApiResult<()> {
    state.boards.delete(&user, board_id).await?;
    Ok(ApiResponse::no_content())
}
