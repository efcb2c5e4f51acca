use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::access::load_live_board;
use super::enrichment::ProfileDirectory;
use crate::api::comment::{CommentResponse, CreateCommentRequest, UpdateCommentRequest};
use crate::database::models::Comment;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::repository::{BoardRepository, CommentRepository, ProjectRepository};

/// Comments on a board. Any authenticated caller may edit or delete.
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    boards: Arc<dyn BoardRepository>,
    projects: Arc<dyn ProjectRepository>,
    profiles: ProfileDirectory,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        boards: Arc<dyn BoardRepository>,
        projects: Arc<dyn ProjectRepository>,
        profiles: ProfileDirectory,
    ) -> Self {
        Self {
            comments,
            boards,
            projects,
            profiles,
        }
    }

    pub async fn create(&self, caller: &AuthUser, req: CreateCommentRequest) -> Result<CommentResponse, ApiError> {
        req.validate()?;
        let (board, _project) = load_live_board(self.boards.as_ref(), self.projects.as_ref(), req.board_id).await?;

        let comment = self.comments.create(board.id, caller.user_id, &req.content).await?;
        info!(comment_id = %comment.id, board_id = %board.id, "comment created");
        Ok(self.respond(&comment, &caller.token).await)
    }

    pub async fn list_by_board(&self, caller: &AuthUser, board_id: Uuid) -> Result<Vec<CommentResponse>, ApiError> {
        let (board, _project) = load_live_board(self.boards.as_ref(), self.projects.as_ref(), board_id).await?;

        let comments = self.comments.list_by_board(board.id).await?;
        let user_ids: Vec<Uuid> = comments.iter().map(|c| c.user_id).collect();
        let users = self.profiles.simple_users(&user_ids, &caller.token).await;

        Ok(comments
            .iter()
            .map(|c| CommentResponse::new(c, users.get(&c.user_id)))
            .collect())
    }

    pub async fn update(
        &self,
        caller: &AuthUser,
        comment_id: Uuid,
        req: UpdateCommentRequest,
    ) -> Result<CommentResponse, ApiError> {
        req.validate()?;
        let mut comment = self.load(comment_id).await?;
        comment.content = req.content;

        let updated = self.comments.update(&comment).await?;
        Ok(self.respond(&updated, &caller.token).await)
    }

    pub async fn delete(&self, _caller: &AuthUser, comment_id: Uuid) -> Result<(), ApiError> {
        self.load(comment_id).await?;
        self.comments.soft_delete(comment_id).await?;
        info!(%comment_id, "comment deleted");
        Ok(())
    }

    async fn load(&self, comment_id: Uuid) -> Result<Comment, ApiError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Comment not found"))?;
        // a comment on a deleted board is gone too
        load_live_board(self.boards.as_ref(), self.projects.as_ref(), comment.board_id)
            .await
            .map_err(|err| match err {
                ApiError::NotFound(_) => ApiError::not_found("Comment not found"),
                other => other,
            })?;
        Ok(comment)
    }

    async fn respond(&self, comment: &Comment, token: &str) -> CommentResponse {
        let user = self.profiles.simple_user(comment.user_id, token).await;
        CommentResponse::new(comment, user.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::board::CreateBoardRequest;
    use crate::cache::UserInfoCache;
    use crate::database::models::{Board, BoardFilter, NewBoard, Page};
    use crate::database::DatabaseError;
    use crate::testing::TestEnv;

    async fn board(env: &TestEnv, owner: &AuthUser) -> Uuid {
        let project = env.project_owned_by(owner).await;
        env.boards
            .create(
                owner,
                CreateBoardRequest {
                    project_id: project.id,
                    title: "Task".into(),
                    content: String::new(),
                    stage_id: "pending".into(),
                    importance_id: "normal".into(),
                    role_id: "planner".into(),
                    assignee_id: None,
                    due_date: None,
                },
            )
            .await
            .unwrap()
            .board_id
    }

    fn comment(board_id: Uuid, content: &str) -> CreateCommentRequest {
        CreateCommentRequest { board_id, content: content.to_string() }
    }

    #[tokio::test]
    async fn author_is_the_caller() {
        let env = TestEnv::new();
        let owner = env.user();
        env.client.add_profile(owner.user_id, "Park", "park@example.com");
        let board_id = board(&env, &owner).await;

        let created = env.comments.create(&owner, comment(board_id, "Looks good")).await.unwrap();
        assert_eq!(created.user_id, owner.user_id);
        assert_eq!(created.user_name, "Park");

        let listed = env.comments.list_by_board(&owner, board_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "Looks good");
    }

    #[tokio::test]
    async fn missing_board_is_not_found() {
        let env = TestEnv::new();
        let user = env.user();

        let err = env.comments.create(&user, comment(Uuid::new_v4(), "hi")).await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let env = TestEnv::new();
        let owner = env.user();
        let board_id = board(&env, &owner).await;

        let err = env.comments.create(&owner, comment(board_id, "")).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn anyone_may_edit_and_delete() {
        let env = TestEnv::new();
        let (owner, other) = (env.user(), env.user());
        let board_id = board(&env, &owner).await;
        let created = env.comments.create(&owner, comment(board_id, "first")).await.unwrap();

        let updated = env
            .comments
            .update(&other, created.comment_id, UpdateCommentRequest { content: "edited".into() })
            .await
            .unwrap();
        assert_eq!(updated.content, "edited");

        env.comments.delete(&other, created.comment_id).await.unwrap();
        assert!(env.comments.list_by_board(&owner, board_id).await.unwrap().is_empty());

        let err = env.comments.delete(&other, created.comment_id).await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    struct UnreachableBoards;

    fn pool_timeout() -> DatabaseError {
        DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
    }

    #[async_trait::async_trait]
    impl BoardRepository for UnreachableBoards {
        async fn create(&self, _board: NewBoard) -> Result<Board, DatabaseError> {
            Err(pool_timeout())
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Board>, DatabaseError> {
            Err(pool_timeout())
        }

        async fn list_by_project(
            &self,
            _project_id: Uuid,
            _filter: &BoardFilter,
            _limit: i64,
            _offset: i64,
        ) -> Result<Page<Board>, DatabaseError> {
            Err(pool_timeout())
        }

        async fn update(&self, _board: &Board) -> Result<Board, DatabaseError> {
            Err(pool_timeout())
        }

        async fn soft_delete(&self, _id: Uuid) -> Result<(), DatabaseError> {
            Err(pool_timeout())
        }
    }

    #[tokio::test]
    async fn storage_failures_are_not_reported_as_missing() {
        let env = TestEnv::new();
        let owner = env.user();
        let board_id = board(&env, &owner).await;
        let created = env.comments.create(&owner, comment(board_id, "Looks good")).await.unwrap();

        let service = CommentService::new(
            env.store.clone(),
            Arc::new(UnreachableBoards),
            env.store.clone(),
            ProfileDirectory::new(
                env.client.clone(),
                UserInfoCache::new(env.cache.clone(), std::time::Duration::from_secs(600)),
            ),
        );

        let err = service
            .update(&owner, created.comment_id, UpdateCommentRequest { content: "edited".into() })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");

        let err = service.delete(&owner, created.comment_id).await.unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}
