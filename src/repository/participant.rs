use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Participant;
use crate::database::DatabaseError;

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// A concurrent duplicate surfaces as `DatabaseError::UniqueViolation`
    async fn create(&self, board_id: Uuid, user_id: Uuid) -> Result<Participant, DatabaseError>;
    async fn find(&self, board_id: Uuid, user_id: Uuid) -> Result<Option<Participant>, DatabaseError>;
    async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Participant>, DatabaseError>;
    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    async fn create(&self, board_id: Uuid, user_id: Uuid) -> Result<Participant, DatabaseError> {
        let participant = sqlx::query_as::<_, Participant>(
            "INSERT INTO participants (id, board_id, user_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(board_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(participant)
    }

    async fn find(&self, board_id: Uuid, user_id: Uuid) -> Result<Option<Participant>, DatabaseError> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT * FROM participants WHERE board_id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(participant)
    }

    async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Participant>, DatabaseError> {
        let participants = sqlx::query_as::<_, Participant>(
            "SELECT * FROM participants WHERE board_id = $1 AND deleted_at IS NULL ORDER BY created_at ASC",
        )
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(participants)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE participants SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
