use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::SimpleUser;
use crate::database::models::Participant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddParticipantRequest {
    pub board_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub board_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl ParticipantResponse {
    pub fn new(participant: &Participant, user: Option<&SimpleUser>) -> Self {
        Self {
            id: participant.id,
            board_id: participant.board_id,
            user_id: participant.user_id,
            user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
            user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
            created_at: participant.created_at,
        }
    }
}
