use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Comment;
use crate::database::{found, DatabaseError};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, board_id: Uuid, user_id: Uuid, content: &str) -> Result<Comment, DatabaseError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, DatabaseError>;
    async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Comment>, DatabaseError>;
    async fn update(&self, comment: &Comment) -> Result<Comment, DatabaseError>;
    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, board_id: Uuid, user_id: Uuid, content: &str) -> Result<Comment, DatabaseError> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, board_id, user_id, content)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(board_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, DatabaseError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Comment>, DatabaseError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE board_id = $1 AND deleted_at IS NULL ORDER BY created_at ASC",
        )
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn update(&self, comment: &Comment) -> Result<Comment, DatabaseError> {
        let updated = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(comment.id)
        .bind(&comment.content)
        .fetch_optional(&self.pool)
        .await?;
        found(updated, "Comment")
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE comments SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
