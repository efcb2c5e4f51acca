use axum::extract::State;
use uuid::Uuid;

use crate::api::comment::{CommentResponse, CreateCommentRequest, UpdateCommentRequest};
use crate::middleware::{ApiResponse, ApiResult, AppJson, AppPath, AuthUser};
use crate::state::AppState;

/// POST /api/comments
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateCommentRequest>,
) -> ApiResult<CommentResponse> {
    let comment = state.comments.create(&user, req).await?;
    Ok(ApiResponse::created(comment))
}

/// GET /api/comments/board/:board_id - oldest first
pub async fn list_by_board(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(board_id): AppPath<Uuid>,
) -> ApiResult<Vec<CommentResponse>> {
    let comments = state.comments.list_by_board(&user, board_id).await?;
    Ok(ApiResponse::success(comments))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(comment_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateCommentRequest>,
) -> ApiResult<CommentResponse> {
    let comment = state.comments.update(&user, comment_id, req).await?;
    Ok(ApiResponse::success(comment))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(comment_id): AppPath<Uuid>,
) -> ApiResult<()> {
    state.comments.delete(&user, comment_id).await?;
    Ok(ApiResponse::no_content())
}
