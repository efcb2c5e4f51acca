use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::access::load_live_board;
use super::enrichment::ProfileDirectory;
use crate::api::participant::{AddParticipantRequest, ParticipantResponse};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::repository::{BoardRepository, ParticipantRepository, ProjectRepository};

const ALREADY_PARTICIPATING: &str = "User is already a participant of this board";

pub struct ParticipantService {
    participants: Arc<dyn ParticipantRepository>,
    boards: Arc<dyn BoardRepository>,
    projects: Arc<dyn ProjectRepository>,
    profiles: ProfileDirectory,
}

impl ParticipantService {
    pub fn new(
        participants: Arc<dyn ParticipantRepository>,
        boards: Arc<dyn BoardRepository>,
        projects: Arc<dyn ProjectRepository>,
        profiles: ProfileDirectory,
    ) -> Self {
        Self {
            participants,
            boards,
            projects,
            profiles,
        }
    }

    pub async fn add(&self, caller: &AuthUser, req: AddParticipantRequest) -> Result<ParticipantResponse, ApiError> {
        let (board, _project) = load_live_board(self.boards.as_ref(), self.projects.as_ref(), req.board_id).await?;

        if self.participants.find(board.id, req.user_id).await?.is_some() {
            return Err(ApiError::already_exists(ALREADY_PARTICIPATING));
        }

        let participant = self
            .participants
            .create(board.id, req.user_id)
            .await
            .map_err(|err| match ApiError::from(err) {
                ApiError::AlreadyExists(_) => ApiError::already_exists(ALREADY_PARTICIPATING),
                other => other,
            })?;

        info!(board_id = %board.id, user_id = %req.user_id, "participant added");
        let user = self.profiles.simple_user(participant.user_id, &caller.token).await;
        Ok(ParticipantResponse::new(&participant, user.as_ref()))
    }

    pub async fn list_by_board(
        &self,
        caller: &AuthUser,
        board_id: Uuid,
    ) -> Result<Vec<ParticipantResponse>, ApiError> {
        let (board, _project) = load_live_board(self.boards.as_ref(), self.projects.as_ref(), board_id).await?;

        let participants = self.participants.list_by_board(board.id).await?;
        let user_ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
        let users = self.profiles.simple_users(&user_ids, &caller.token).await;

        Ok(participants
            .iter()
            .map(|p| ParticipantResponse::new(p, users.get(&p.user_id)))
            .collect())
    }

    pub async fn remove(&self, _caller: &AuthUser, board_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        let (board, _project) = load_live_board(self.boards.as_ref(), self.projects.as_ref(), board_id).await?;

        let participant = self
            .participants
            .find(board.id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Participant not found"))?;

        self.participants.soft_delete(participant.id).await?;
        info!(%board_id, %user_id, "participant removed");
        Ok(())
    }
}
