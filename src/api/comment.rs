use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::check_length;
use crate::client::SimpleUser;
use crate::database::models::Comment;
use crate::error::ApiError;

const MAX_COMMENT_LEN: usize = 5000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub board_id: Uuid,
    pub content: String,
}

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_length("content", self.content.trim(), 1, MAX_COMMENT_LEN)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

impl UpdateCommentRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_length("content", self.content.trim(), 1, MAX_COMMENT_LEN)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub comment_id: Uuid,
    pub board_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_email: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(comment: &Comment, user: Option<&SimpleUser>) -> Self {
        Self {
            comment_id: comment.id,
            board_id: comment.board_id,
            user_id: comment.user_id,
            user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
            user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
            content: comment.content.clone(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
