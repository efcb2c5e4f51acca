use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::access::{load_live_board, load_project, require_member};
use super::enrichment::ProfileDirectory;
use crate::api::board::{
    BoardDetailResponse, BoardListQuery, BoardResponse, CreateBoardRequest, PaginatedBoardsResponse,
    UpdateBoardFieldRequest, UpdateBoardRequest, DEFAULT_BOARD_LIMIT, MAX_BOARD_LIMIT,
};
use crate::api::comment::CommentResponse;
use crate::api::participant::ParticipantResponse;
use crate::api::Pagination;
use crate::database::models::{Board, NewBoard, Project};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::repository::{BoardRepository, CommentRepository, ParticipantRepository, ProjectRepository};

pub struct BoardService {
    boards: Arc<dyn BoardRepository>,
    projects: Arc<dyn ProjectRepository>,
    participants: Arc<dyn ParticipantRepository>,
    comments: Arc<dyn CommentRepository>,
    profiles: ProfileDirectory,
}

impl BoardService {
    pub fn new(
        boards: Arc<dyn BoardRepository>,
        projects: Arc<dyn ProjectRepository>,
        participants: Arc<dyn ParticipantRepository>,
        comments: Arc<dyn CommentRepository>,
        profiles: ProfileDirectory,
    ) -> Self {
        Self {
            boards,
            projects,
            participants,
            comments,
            profiles,
        }
    }

    pub async fn create(&self, caller: &AuthUser, req: CreateBoardRequest) -> Result<BoardResponse, ApiError> {
        let classification = req.validate()?;
        let project = load_project(self.projects.as_ref(), req.project_id).await?;
        require_member(self.projects.as_ref(), project.id, caller.user_id).await?;
        if let Some(assignee) = req.assignee_id {
            self.require_assignable(&project, assignee).await?;
        }

        let board = self
            .boards
            .create(NewBoard {
                project_id: project.id,
                author_id: caller.user_id,
                assignee_id: req.assignee_id,
                title: req.title.trim().to_string(),
                content: req.content,
                stage: classification.stage,
                importance: classification.importance,
                role: classification.role,
                due_date: req.due_date,
            })
            .await?;

        info!(board_id = %board.id, project_id = %project.id, "board created");
        Ok(self.respond(&board, &caller.token).await)
    }

    /// Board with its participants and comments
    pub async fn get(&self, caller: &AuthUser, board_id: Uuid) -> Result<BoardDetailResponse, ApiError> {
        let (board, project) = load_live_board(self.boards.as_ref(), self.projects.as_ref(), board_id).await?;
        require_member(self.projects.as_ref(), project.id, caller.user_id).await?;

        let (participants, comments) = futures::try_join!(
            self.participants.list_by_board(board.id),
            self.comments.list_by_board(board.id),
        )?;

        let mut user_ids = vec![board.author_id];
        user_ids.extend(board.assignee_id);
        user_ids.extend(participants.iter().map(|p| p.user_id));
        user_ids.extend(comments.iter().map(|c| c.user_id));
        let users = self.profiles.simple_users(&user_ids, &caller.token).await;

        Ok(BoardDetailResponse {
            board: BoardResponse::new(
                &board,
                users.get(&board.author_id),
                board.assignee_id.and_then(|id| users.get(&id)),
            ),
            participants: participants
                .iter()
                .map(|p| ParticipantResponse::new(p, users.get(&p.user_id)))
                .collect(),
            comments: comments
                .iter()
                .map(|c| CommentResponse::new(c, users.get(&c.user_id)))
                .collect(),
        })
    }

    pub async fn list_by_project(
        &self,
        caller: &AuthUser,
        project_id: Uuid,
        query: BoardListQuery,
    ) -> Result<PaginatedBoardsResponse, ApiError> {
        let filter = query.filter()?;
        let (page, limit) = query.pagination().resolve(DEFAULT_BOARD_LIMIT, MAX_BOARD_LIMIT)?;
        let offset = Pagination::offset(page, limit)?;

        load_project(self.projects.as_ref(), project_id).await?;
        require_member(self.projects.as_ref(), project_id, caller.user_id).await?;

        let result = self
            .boards
            .list_by_project(project_id, &filter, limit, offset)
            .await?;

        let mut user_ids: Vec<Uuid> = result.items.iter().map(|b| b.author_id).collect();
        user_ids.extend(result.items.iter().filter_map(|b| b.assignee_id));
        let users = self.profiles.simple_users(&user_ids, &caller.token).await;

        Ok(PaginatedBoardsResponse {
            boards: result
                .items
                .iter()
                .map(|b| BoardResponse::new(b, users.get(&b.author_id), b.assignee_id.and_then(|id| users.get(&id))))
                .collect(),
            total: result.total,
            page,
            limit,
        })
    }

    /// Partial update; absent fields keep their stored value
    pub async fn update(
        &self,
        caller: &AuthUser,
        board_id: Uuid,
        req: UpdateBoardRequest,
    ) -> Result<BoardResponse, ApiError> {
        let (mut board, project) = self.load_editable(caller, board_id).await?;

        let previous_assignee = board.assignee_id;
        req.apply_to(&mut board)?;
        if let Some(assignee) = board.assignee_id.filter(|a| Some(*a) != previous_assignee) {
            self.require_assignable(&project, assignee).await?;
        }

        let updated = self.boards.update(&board).await?;
        info!(%board_id, "board updated");
        Ok(self.respond(&updated, &caller.token).await)
    }

    pub async fn update_field(
        &self,
        caller: &AuthUser,
        board_id: Uuid,
        req: UpdateBoardFieldRequest,
    ) -> Result<BoardResponse, ApiError> {
        let (mut board, _project) = self.load_editable(caller, board_id).await?;
        req.apply_to(&mut board)?;

        let updated = self.boards.update(&board).await?;
        info!(%board_id, field = %req.field_id, "board field updated");
        Ok(self.respond(&updated, &caller.token).await)
    }

    pub async fn delete(&self, caller: &AuthUser, board_id: Uuid) -> Result<(), ApiError> {
        self.load_editable(caller, board_id).await?;
        self.boards.soft_delete(board_id).await?;
        info!(%board_id, "board deleted");
        Ok(())
    }

    /// Author, or a project OWNER/ADMIN
    async fn load_editable(&self, caller: &AuthUser, board_id: Uuid) -> Result<(Board, Project), ApiError> {
        let (board, project) = load_live_board(self.boards.as_ref(), self.projects.as_ref(), board_id).await?;
        let member = require_member(self.projects.as_ref(), project.id, caller.user_id).await?;

        if board.author_id != caller.user_id && !member.role.can_manage() {
            return Err(ApiError::forbidden(
                "Only the board author or project admins can modify this board",
            ));
        }
        Ok((board, project))
    }

    async fn require_assignable(&self, project: &Project, assignee: Uuid) -> Result<(), ApiError> {
        if self.projects.find_member(project.id, assignee).await?.is_none() {
            return Err(ApiError::invalid_field("assigneeId", "must be a member of the project"));
        }
        Ok(())
    }

    async fn respond(&self, board: &Board, token: &str) -> BoardResponse {
        let mut user_ids = vec![board.author_id];
        user_ids.extend(board.assignee_id);
        let users = self.profiles.simple_users(&user_ids, token).await;
        BoardResponse::new(board, users.get(&board.author_id), board.assignee_id.and_then(|id| users.get(&id)))
    }
}
