use axum::extract::State;
use uuid::Uuid;

use crate::api::participant::{AddParticipantRequest, ParticipantResponse};
use crate::middleware::{ApiResponse, ApiResult, AppJson, AppPath, AuthUser};
use crate::state::AppState;

/// POST /api/participants
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<AddParticipantRequest>,
) -> ApiResult<ParticipantResponse> {
    let participant = state.participants.add(&user, req).await?;
    Ok(ApiResponse::created(participant))
}

/// GET /api/participants/board/:board_id
pub async fn list_by_board(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(board_id): AppPath<Uuid>,
) -> ApiResult<Vec<ParticipantResponse>> {
    let participants = state.participants.list_by_board(&user, board_id).await?;
    Ok(ApiResponse::success(participants))
}

/// DELETE /api/participants/board/:board_id/user/:user_id
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((board_id, user_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<()> {
    state.participants.remove(&user, board_id, user_id).await?;
    Ok(ApiResponse::no_content())
}
