use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{BoardImportance, BoardRole, BoardStage};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: Uuid,
    pub project_id: Uuid,
    pub author_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub stage: BoardStage,
    #[sqlx(try_from = "String")]
    pub importance: BoardImportance,
    #[sqlx(try_from = "String")]
    pub role: BoardRole,
    pub due_date: Option<DateTime<Utc>>,
    /// Denormalized classification values used for filtering
    pub custom_fields: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Board {
    pub fn classification_json(&self) -> Value {
        json!({
            "stage": self.stage,
            "importance": self.importance,
            "role": self.role,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewBoard {
    pub project_id: Uuid,
    pub author_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub stage: BoardStage,
    pub importance: BoardImportance,
    pub role: BoardRole,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct BoardFilter {
    pub stage: Option<BoardStage>,
    pub importance: Option<BoardImportance>,
    pub role: Option<BoardRole>,
    pub assignee_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

impl BoardFilter {
    pub fn matches(&self, board: &Board) -> bool {
        self.stage.map_or(true, |s| board.stage == s)
            && self.importance.map_or(true, |i| board.importance == i)
            && self.role.map_or(true, |r| board.role == r)
            && self.assignee_id.map_or(true, |a| board.assignee_id == Some(a))
            && self.author_id.map_or(true, |a| board.author_id == a)
    }
}
