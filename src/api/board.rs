use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::comment::CommentResponse;
use super::participant::ParticipantResponse;
use super::{check_length, parse_choice, Pagination};
use crate::client::SimpleUser;
use crate::database::models::{Board, BoardFilter};
use crate::error::ApiError;
use crate::types::{BoardField, BoardImportance, BoardRole, BoardStage};

pub const DEFAULT_BOARD_LIMIT: i64 = 20;
pub const MAX_BOARD_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub project_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub stage_id: String,
    pub importance_id: String,
    pub role_id: String,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Classification parsed out of a create request
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub stage: BoardStage,
    pub importance: BoardImportance,
    pub role: BoardRole,
}

impl CreateBoardRequest {
    pub fn validate(&self) -> Result<Classification, ApiError> {
        check_length("title", self.title.trim(), 1, 200)?;
        check_length("content", &self.content, 0, 5000)?;

        Ok(Classification {
            stage: parse_choice("stageId", &self.stage_id, BoardStage::ALL)?,
            importance: parse_choice("importanceId", &self.importance_id, BoardImportance::ALL)?,
            role: parse_choice("roleId", &self.role_id, BoardRole::ALL)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub stage_id: Option<String>,
    pub importance_id: Option<String>,
    pub role_id: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateBoardRequest {
    /// Validate and copy every present field onto `board`
    pub fn apply_to(&self, board: &mut Board) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            let title = title.trim();
            check_length("title", title, 1, 200)?;
            board.title = title.to_string();
        }
        if let Some(content) = &self.content {
            check_length("content", content, 0, 5000)?;
            board.content = content.clone();
        }
        if let Some(stage) = &self.stage_id {
            board.stage = parse_choice("stageId", stage, BoardStage::ALL)?;
        }
        if let Some(importance) = &self.importance_id {
            board.importance = parse_choice("importanceId", importance, BoardImportance::ALL)?;
        }
        if let Some(role) = &self.role_id {
            board.role = parse_choice("roleId", role, BoardRole::ALL)?;
        }
        if let Some(assignee) = self.assignee_id {
            board.assignee_id = Some(assignee);
        }
        if let Some(due_date) = self.due_date {
            board.due_date = Some(due_date);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardFieldRequest {
    pub field_id: String,
    pub value: String,
}

impl UpdateBoardFieldRequest {
    pub fn apply_to(&self, board: &mut Board) -> Result<(), ApiError> {
        match parse_choice("fieldId", &self.field_id, BoardField::ALL)? {
            BoardField::Stage => board.stage = parse_choice("value", &self.value, BoardStage::ALL)?,
            BoardField::Importance => {
                board.importance = parse_choice("value", &self.value, BoardImportance::ALL)?
            }
            BoardField::Role => board.role = parse_choice("value", &self.value, BoardRole::ALL)?,
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardListQuery {
    pub stage_id: Option<String>,
    pub importance_id: Option<String>,
    pub role_id: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl BoardListQuery {
    pub fn filter(&self) -> Result<BoardFilter, ApiError> {
        Ok(BoardFilter {
            stage: self
                .stage_id
                .as_deref()
                .map(|v| parse_choice("stageId", v, BoardStage::ALL))
                .transpose()?,
            importance: self
                .importance_id
                .as_deref()
                .map(|v| parse_choice("importanceId", v, BoardImportance::ALL))
                .transpose()?,
            role: self
                .role_id
                .as_deref()
                .map(|v| parse_choice("roleId", v, BoardRole::ALL))
                .transpose()?,
            assignee_id: self.assignee_id,
            author_id: self.author_id,
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub board_id: Uuid,
    pub project_id: Uuid,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub assignee_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub assignee_email: String,
    pub title: String,
    pub content: String,
    pub stage_id: BoardStage,
    pub importance_id: BoardImportance,
    pub role_id: BoardRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoardResponse {
    pub fn new(board: &Board, author: Option<&SimpleUser>, assignee: Option<&SimpleUser>) -> Self {
        Self {
            board_id: board.id,
            project_id: board.project_id,
            author_id: board.author_id,
            author_name: author.map(|u| u.name.clone()).unwrap_or_default(),
            author_email: author.map(|u| u.email.clone()).unwrap_or_default(),
            assignee_id: board.assignee_id,
            assignee_name: assignee.map(|u| u.name.clone()).unwrap_or_default(),
            assignee_email: assignee.map(|u| u.email.clone()).unwrap_or_default(),
            title: board.title.clone(),
            content: board.content.clone(),
            stage_id: board.stage,
            importance_id: board.importance,
            role_id: board.role,
            due_date: board.due_date,
            created_at: board.created_at,
            updated_at: board.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedBoardsResponse {
    pub boards: Vec<BoardResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct BoardDetailResponse {
    #[serde(flatten)]
    pub board: BoardResponse,
    pub participants: Vec<ParticipantResponse>,
    pub comments: Vec<CommentResponse>,
}
