use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Board, BoardFilter, NewBoard, Page};
use crate::database::{found, DatabaseError};

#[async_trait]
pub trait BoardRepository: Send + Sync {
    async fn create(&self, board: NewBoard) -> Result<Board, DatabaseError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Board>, DatabaseError>;
    async fn list_by_project(
        &self,
        project_id: Uuid,
        filter: &BoardFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Board>, DatabaseError>;
    /// Last writer wins; there is no version check
    async fn update(&self, board: &Board) -> Result<Board, DatabaseError>;
    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

pub struct PgBoardRepository {
    pool: PgPool,
}

impl PgBoardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LIST_FILTER: &str = "project_id = $1 AND deleted_at IS NULL
    AND ($2::text IS NULL OR stage = $2)
    AND ($3::text IS NULL OR importance = $3)
    AND ($4::text IS NULL OR role = $4)
    AND ($5::uuid IS NULL OR assignee_id = $5)
    AND ($6::uuid IS NULL OR author_id = $6)";

#[async_trait]
impl BoardRepository for PgBoardRepository {
    async fn create(&self, board: NewBoard) -> Result<Board, DatabaseError> {
        let custom_fields = serde_json::json!({
            "stage": board.stage,
            "importance": board.importance,
            "role": board.role,
        });

        let created = sqlx::query_as::<_, Board>(
            "INSERT INTO boards
                (id, project_id, author_id, assignee_id, title, content, stage, importance, role, due_date, custom_fields)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(board.project_id)
        .bind(board.author_id)
        .bind(board.assignee_id)
        .bind(&board.title)
        .bind(&board.content)
        .bind(board.stage.as_str())
        .bind(board.importance.as_str())
        .bind(board.role.as_str())
        .bind(board.due_date)
        .bind(custom_fields)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Board>, DatabaseError> {
        let board = sqlx::query_as::<_, Board>("SELECT * FROM boards WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(board)
    }

    async fn list_by_project(
        &self,
        project_id: Uuid,
        filter: &BoardFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Board>, DatabaseError> {
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM boards WHERE {}", LIST_FILTER))
            .bind(project_id)
            .bind(filter.stage.map(|v| v.as_str()))
            .bind(filter.importance.map(|v| v.as_str()))
            .bind(filter.role.map(|v| v.as_str()))
            .bind(filter.assignee_id)
            .bind(filter.author_id)
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Board>(&format!(
            "SELECT * FROM boards WHERE {} ORDER BY created_at DESC LIMIT $7 OFFSET $8",
            LIST_FILTER
        ))
        .bind(project_id)
        .bind(filter.stage.map(|v| v.as_str()))
        .bind(filter.importance.map(|v| v.as_str()))
        .bind(filter.role.map(|v| v.as_str()))
        .bind(filter.assignee_id)
        .bind(filter.author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, total })
    }

    async fn update(&self, board: &Board) -> Result<Board, DatabaseError> {
        let updated = sqlx::query_as::<_, Board>(
            "UPDATE boards
             SET title = $2, content = $3, stage = $4, importance = $5, role = $6,
                 assignee_id = $7, due_date = $8, custom_fields = custom_fields || $9, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(board.id)
        .bind(&board.title)
        .bind(&board.content)
        .bind(board.stage.as_str())
        .bind(board.importance.as_str())
        .bind(board.role.as_str())
        .bind(board.assignee_id)
        .bind(board.due_date)
        .bind(board.classification_json())
        .fetch_optional(&self.pool)
        .await?;
        found(updated, "Board")
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE boards SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
