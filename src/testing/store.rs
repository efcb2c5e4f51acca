//! In-memory implementation of every repository trait.
//!
//! Mirrors the PostgreSQL implementations closely enough for service tests:
//! soft-deleted rows are invisible, the partial unique indexes surface as
//! `UniqueViolation`, and list orders match the SQL `ORDER BY` clauses.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::database::models::{
    Board, BoardFilter, Comment, NewBoard, NewProject, NewWorkspace, Page, Participant, Project,
    ProjectJoinRequest, ProjectMember, TaxonomyItem, Workspace, WorkspaceJoinRequest, WorkspaceMember,
};
use crate::database::DatabaseError;
use crate::repository::{
    BoardRepository, CommentRepository, ParticipantRepository, ProjectRepository, TaxonomyRepository,
    WorkspaceRepository,
};
use crate::types::{JoinRequestStatus, MemberRole, TaxonomyKind};

#[derive(Default)]
struct Tables {
    workspaces: Vec<Workspace>,
    workspace_members: Vec<WorkspaceMember>,
    workspace_join_requests: Vec<WorkspaceJoinRequest>,
    projects: Vec<Project>,
    project_members: Vec<ProjectMember>,
    project_join_requests: Vec<ProjectJoinRequest>,
    boards: Vec<Board>,
    comments: Vec<Comment>,
    participants: Vec<Participant>,
    taxonomy: Vec<(TaxonomyKind, TaxonomyItem)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

fn unique(constraint: &str) -> DatabaseError {
    DatabaseError::UniqueViolation(constraint.to_string())
}

fn missing(what: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found", what))
}

fn page<T: Clone>(rows: Vec<T>, limit: i64, offset: i64) -> Page<T> {
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect();
    Page { items, total }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn project_members(&self, project_id: Uuid) -> Vec<ProjectMember> {
        self.lock()
            .project_members
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect()
    }

    pub fn add_project_member(&self, project_id: Uuid, user_id: Uuid, role: MemberRole) -> ProjectMember {
        let member = ProjectMember {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            role,
            joined_at: Utc::now(),
        };
        self.lock().project_members.push(member.clone());
        member
    }

    pub fn owners_of(&self, project_id: Uuid) -> Vec<Uuid> {
        self.project_members(project_id)
            .into_iter()
            .filter(|m| m.role.is_owner())
            .map(|m| m.user_id)
            .collect()
    }

    pub fn project_join_requests(&self, project_id: Uuid) -> Vec<ProjectJoinRequest> {
        self.lock()
            .project_join_requests
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Active workspaces flagged as the user's default
    pub fn default_workspaces(&self, user_id: Uuid) -> Vec<Uuid> {
        self.lock()
            .workspace_members
            .iter()
            .filter(|m| m.user_id == user_id && m.is_default && m.left_at.is_none())
            .map(|m| m.workspace_id)
            .collect()
    }

    pub fn workspace_member_left(&self, workspace_id: Uuid, user_id: Uuid) -> bool {
        self.lock()
            .workspace_members
            .iter()
            .any(|m| m.workspace_id == workspace_id && m.user_id == user_id && m.left_at.is_some())
    }

    /// Seed a system default item, returning its id
    pub fn add_system_default(&self, kind: TaxonomyKind, project_id: Uuid, name: &str) -> Uuid {
        let now = Utc::now();
        let mut tables = self.lock();
        let display_order = next_display_order(&tables, kind, project_id);
        let item = TaxonomyItem {
            id: Uuid::new_v4(),
            project_id,
            name: name.to_string(),
            color: "#808080".to_string(),
            is_system_default: true,
            display_order,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let id = item.id;
        tables.taxonomy.push((kind, item));
        id
    }
}

fn next_display_order(tables: &Tables, kind: TaxonomyKind, project_id: Uuid) -> i32 {
    tables
        .taxonomy
        .iter()
        .filter(|(k, item)| *k == kind && item.project_id == project_id && item.deleted_at.is_none())
        .map(|(_, item)| item.display_order + 1)
        .max()
        .unwrap_or(0)
}

fn active_workspace_member<'a>(
    tables: &'a mut Tables,
    workspace_id: Uuid,
    user_id: Uuid,
) -> Option<&'a mut WorkspaceMember> {
    tables
        .workspace_members
        .iter_mut()
        .find(|m| m.workspace_id == workspace_id && m.user_id == user_id && m.left_at.is_none())
}

#[async_trait]
impl WorkspaceRepository for MemoryStore {
    async fn create_with_owner(
        &self,
        workspace: NewWorkspace,
    ) -> Result<(Workspace, WorkspaceMember), DatabaseError> {
        let now = Utc::now();
        let mut tables = self.lock();

        let has_default = tables
            .workspace_members
            .iter()
            .any(|m| m.user_id == workspace.owner_id && m.is_default && m.left_at.is_none());

        let created = Workspace {
            id: Uuid::new_v4(),
            name: workspace.name,
            description: workspace.description,
            owner_id: workspace.owner_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let owner = WorkspaceMember {
            id: Uuid::new_v4(),
            workspace_id: created.id,
            user_id: created.owner_id,
            role: MemberRole::Owner,
            is_default: !has_default,
            joined_at: now,
            left_at: None,
        };

        tables.workspaces.push(created.clone());
        tables.workspace_members.push(owner.clone());
        Ok((created, owner))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        Ok(self
            .lock()
            .workspaces
            .iter()
            .find(|w| w.id == id && w.deleted_at.is_none())
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Workspace>, DatabaseError> {
        let tables = self.lock();
        let mut rows: Vec<(bool, Workspace)> = tables
            .workspace_members
            .iter()
            .filter(|m| m.user_id == user_id && m.left_at.is_none())
            .filter_map(|m| {
                tables
                    .workspaces
                    .iter()
                    .find(|w| w.id == m.workspace_id && w.deleted_at.is_none())
                    .map(|w| (m.is_default, w.clone()))
            })
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.created_at.cmp(&b.1.created_at)));
        Ok(rows.into_iter().map(|(_, w)| w).collect())
    }

    async fn update(&self, workspace: &Workspace) -> Result<Workspace, DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .workspaces
            .iter_mut()
            .find(|w| w.id == workspace.id && w.deleted_at.is_none())
            .ok_or_else(|| missing("Workspace"))?;
        row.name = workspace.name.clone();
        row.description = workspace.description.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .workspaces
            .iter_mut()
            .find(|w| w.id == id && w.deleted_at.is_none())
            .ok_or_else(|| missing("Workspace"))?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn find_member(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, DatabaseError> {
        Ok(active_workspace_member(&mut self.lock(), workspace_id, user_id).map(|m| m.clone()))
    }

    async fn list_members(&self, workspace_id: Uuid) -> Result<Vec<WorkspaceMember>, DatabaseError> {
        Ok(self
            .lock()
            .workspace_members
            .iter()
            .filter(|m| m.workspace_id == workspace_id && m.left_at.is_none())
            .cloned()
            .collect())
    }

    async fn update_member_role(
        &self,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<WorkspaceMember, DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .workspace_members
            .iter_mut()
            .find(|m| m.id == member_id && m.left_at.is_none())
            .ok_or_else(|| missing("Workspace member"))?;
        row.role = role;
        Ok(row.clone())
    }

    async fn remove_member(&self, member_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .workspace_members
            .iter_mut()
            .find(|m| m.id == member_id && m.left_at.is_none())
            .ok_or_else(|| missing("Workspace member"))?;
        row.left_at = Some(Utc::now());
        row.is_default = false;
        Ok(())
    }

    async fn set_default(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<WorkspaceMember, DatabaseError> {
        let mut tables = self.lock();
        if active_workspace_member(&mut tables, workspace_id, user_id).is_none() {
            return Err(missing("Workspace member"));
        }

        for member in tables.workspace_members.iter_mut().filter(|m| m.user_id == user_id) {
            member.is_default = false;
        }
        let row = active_workspace_member(&mut tables, workspace_id, user_id).ok_or_else(|| missing("Workspace member"))?;
        row.is_default = true;
        Ok(row.clone())
    }

    async fn find_pending_join_request(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceJoinRequest>, DatabaseError> {
        Ok(self
            .lock()
            .workspace_join_requests
            .iter()
            .find(|r| r.workspace_id == workspace_id && r.user_id == user_id && r.status == JoinRequestStatus::Pending)
            .cloned())
    }

    async fn create_join_request(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<WorkspaceJoinRequest, DatabaseError> {
        let mut tables = self.lock();
        let pending = tables
            .workspace_join_requests
            .iter()
            .any(|r| r.workspace_id == workspace_id && r.user_id == user_id && r.status == JoinRequestStatus::Pending);
        if pending {
            return Err(unique("workspace_join_requests_one_pending"));
        }

        let now = Utc::now();
        let request = WorkspaceJoinRequest {
            id: Uuid::new_v4(),
            workspace_id,
            user_id,
            status: JoinRequestStatus::Pending,
            requested_at: now,
            updated_at: now,
        };
        tables.workspace_join_requests.push(request.clone());
        Ok(request)
    }

    async fn find_join_request(&self, id: Uuid) -> Result<Option<WorkspaceJoinRequest>, DatabaseError> {
        Ok(self.lock().workspace_join_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_join_requests(
        &self,
        workspace_id: Uuid,
        status: Option<JoinRequestStatus>,
    ) -> Result<Vec<WorkspaceJoinRequest>, DatabaseError> {
        Ok(self
            .lock()
            .workspace_join_requests
            .iter()
            .rev()
            .filter(|r| r.workspace_id == workspace_id && status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    async fn approve_join_request(
        &self,
        id: Uuid,
    ) -> Result<(WorkspaceJoinRequest, WorkspaceMember), DatabaseError> {
        let mut tables = self.lock();
        let now = Utc::now();

        let (workspace_id, user_id) = tables
            .workspace_join_requests
            .iter()
            .find(|r| r.id == id && r.status == JoinRequestStatus::Pending)
            .map(|r| (r.workspace_id, r.user_id))
            .ok_or(DatabaseError::NotPending)?;
        if active_workspace_member(&mut tables, workspace_id, user_id).is_some() {
            return Err(unique("workspace_members_active_unique"));
        }

        let request = tables
            .workspace_join_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(DatabaseError::NotPending)?;
        request.status = JoinRequestStatus::Approved;
        request.updated_at = now;
        let request = request.clone();
        let member = WorkspaceMember {
            id: Uuid::new_v4(),
            workspace_id: request.workspace_id,
            user_id: request.user_id,
            role: MemberRole::Member,
            is_default: false,
            joined_at: now,
            left_at: None,
        };
        tables.workspace_members.push(member.clone());
        Ok((request, member))
    }

    async fn reject_join_request(&self, id: Uuid) -> Result<WorkspaceJoinRequest, DatabaseError> {
        let mut tables = self.lock();
        let request = tables
            .workspace_join_requests
            .iter_mut()
            .find(|r| r.id == id && r.status == JoinRequestStatus::Pending)
            .ok_or(DatabaseError::NotPending)?;
        request.status = JoinRequestStatus::Rejected;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }
}

fn live_projects(tables: &Tables, workspace_id: Uuid) -> Vec<Project> {
    // newest first
    tables
        .projects
        .iter()
        .rev()
        .filter(|p| p.workspace_id == workspace_id && p.deleted_at.is_none())
        .cloned()
        .collect()
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn create_with_owner(
        &self,
        project: NewProject,
    ) -> Result<(Project, ProjectMember), DatabaseError> {
        let now = Utc::now();
        let mut tables = self.lock();
        let has_default = live_projects(&tables, project.workspace_id).iter().any(|p| p.is_default);

        let created = Project {
            id: Uuid::new_v4(),
            workspace_id: project.workspace_id,
            owner_id: project.owner_id,
            name: project.name,
            description: project.description,
            is_default: !has_default,
            is_public: project.is_public,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let owner = ProjectMember {
            id: Uuid::new_v4(),
            project_id: created.id,
            user_id: created.owner_id,
            role: MemberRole::Owner,
            joined_at: now,
        };

        tables.projects.push(created.clone());
        tables.project_members.push(owner.clone());
        Ok((created, owner))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        Ok(self
            .lock()
            .projects
            .iter()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .cloned())
    }

    async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Project>, DatabaseError> {
        Ok(live_projects(&self.lock(), workspace_id))
    }

    async fn find_default(&self, workspace_id: Uuid) -> Result<Option<Project>, DatabaseError> {
        Ok(live_projects(&self.lock(), workspace_id)
            .into_iter()
            .find(|p| p.is_default))
    }

    async fn search(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Project>, DatabaseError> {
        let needle = query.map(str::to_lowercase);
        let rows: Vec<Project> = live_projects(&self.lock(), workspace_id)
            .into_iter()
            .filter(|p| {
                needle.as_deref().map_or(true, |n| {
                    p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
                })
            })
            .collect();
        Ok(page(rows, limit, offset))
    }

    async fn update(&self, project: &Project) -> Result<Project, DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .projects
            .iter_mut()
            .find(|p| p.id == project.id && p.deleted_at.is_none())
            .ok_or_else(|| missing("Project"))?;
        row.name = project.name.clone();
        row.description = project.description.clone();
        row.is_public = project.is_public;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .ok_or_else(|| missing("Project"))?;
        row.deleted_at = Some(Utc::now());
        row.is_default = false;
        Ok(())
    }

    async fn find_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>, DatabaseError> {
        Ok(self
            .lock()
            .project_members
            .iter()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_members(&self, project_id: Uuid) -> Result<Vec<ProjectMember>, DatabaseError> {
        Ok(self.project_members(project_id))
    }

    async fn update_member_role(
        &self,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<ProjectMember, DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .project_members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or_else(|| missing("Project member"))?;
        row.role = role;
        Ok(row.clone())
    }

    async fn delete_member(&self, member_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let before = tables.project_members.len();
        tables.project_members.retain(|m| m.id != member_id);
        if tables.project_members.len() == before {
            return Err(missing("Project member"));
        }
        Ok(())
    }

    async fn find_pending_join_request(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectJoinRequest>, DatabaseError> {
        Ok(self
            .lock()
            .project_join_requests
            .iter()
            .find(|r| r.project_id == project_id && r.user_id == user_id && r.status == JoinRequestStatus::Pending)
            .cloned())
    }

    async fn create_join_request(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<ProjectJoinRequest, DatabaseError> {
        let mut tables = self.lock();
        let pending = tables
            .project_join_requests
            .iter()
            .any(|r| r.project_id == project_id && r.user_id == user_id && r.status == JoinRequestStatus::Pending);
        if pending {
            return Err(unique("project_join_requests_one_pending"));
        }

        let now = Utc::now();
        let request = ProjectJoinRequest {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            status: JoinRequestStatus::Pending,
            requested_at: now,
            updated_at: now,
        };
        tables.project_join_requests.push(request.clone());
        Ok(request)
    }

    async fn find_join_request(&self, id: Uuid) -> Result<Option<ProjectJoinRequest>, DatabaseError> {
        Ok(self.lock().project_join_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_join_requests(
        &self,
        project_id: Uuid,
        status: Option<JoinRequestStatus>,
    ) -> Result<Vec<ProjectJoinRequest>, DatabaseError> {
        Ok(self
            .lock()
            .project_join_requests
            .iter()
            .rev()
            .filter(|r| r.project_id == project_id && status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    async fn approve_join_request(
        &self,
        id: Uuid,
    ) -> Result<(ProjectJoinRequest, ProjectMember), DatabaseError> {
        let mut tables = self.lock();
        let now = Utc::now();

        let (project_id, user_id) = tables
            .project_join_requests
            .iter()
            .find(|r| r.id == id && r.status == JoinRequestStatus::Pending)
            .map(|r| (r.project_id, r.user_id))
            .ok_or(DatabaseError::NotPending)?;
        let already = tables
            .project_members
            .iter()
            .any(|m| m.project_id == project_id && m.user_id == user_id);
        if already {
            return Err(unique("project_members_project_id_user_id_key"));
        }

        let request = tables
            .project_join_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(DatabaseError::NotPending)?;
        request.status = JoinRequestStatus::Approved;
        request.updated_at = now;
        let request = request.clone();
        let member = ProjectMember {
            id: Uuid::new_v4(),
            project_id: request.project_id,
            user_id: request.user_id,
            role: MemberRole::Member,
            joined_at: now,
        };
        tables.project_members.push(member.clone());
        Ok((request, member))
    }

    async fn reject_join_request(&self, id: Uuid) -> Result<ProjectJoinRequest, DatabaseError> {
        let mut tables = self.lock();
        let request = tables
            .project_join_requests
            .iter_mut()
            .find(|r| r.id == id && r.status == JoinRequestStatus::Pending)
            .ok_or(DatabaseError::NotPending)?;
        request.status = JoinRequestStatus::Rejected;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }
}

#[async_trait]
impl BoardRepository for MemoryStore {
    async fn create(&self, board: NewBoard) -> Result<Board, DatabaseError> {
        let now = Utc::now();
        let mut created = Board {
            id: Uuid::new_v4(),
            project_id: board.project_id,
            author_id: board.author_id,
            assignee_id: board.assignee_id,
            title: board.title,
            content: board.content,
            stage: board.stage,
            importance: board.importance,
            role: board.role,
            due_date: board.due_date,
            custom_fields: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        created.custom_fields = created.classification_json();
        self.lock().boards.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Board>, DatabaseError> {
        Ok(self
            .lock()
            .boards
            .iter()
            .find(|b| b.id == id && b.deleted_at.is_none())
            .cloned())
    }

    async fn list_by_project(
        &self,
        project_id: Uuid,
        filter: &BoardFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Board>, DatabaseError> {
        let rows: Vec<Board> = self
            .lock()
            .boards
            .iter()
            .rev()
            .filter(|b| b.project_id == project_id && b.deleted_at.is_none() && filter.matches(b))
            .cloned()
            .collect();
        Ok(page(rows, limit, offset))
    }

    async fn update(&self, board: &Board) -> Result<Board, DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .boards
            .iter_mut()
            .find(|b| b.id == board.id && b.deleted_at.is_none())
            .ok_or_else(|| missing("Board"))?;
        *row = Board {
            custom_fields: board.classification_json(),
            updated_at: Utc::now(),
            ..board.clone()
        };
        Ok(row.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .boards
            .iter_mut()
            .find(|b| b.id == id && b.deleted_at.is_none())
            .ok_or_else(|| missing("Board"))?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, board_id: Uuid, user_id: Uuid, content: &str) -> Result<Comment, DatabaseError> {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            board_id,
            user_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.lock().comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, DatabaseError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .cloned())
    }

    async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Comment>, DatabaseError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| c.board_id == board_id && c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn update(&self, comment: &Comment) -> Result<Comment, DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id && c.deleted_at.is_none())
            .ok_or_else(|| missing("Comment"))?;
        row.content = comment.content.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .ok_or_else(|| missing("Comment"))?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl ParticipantRepository for MemoryStore {
    async fn create(&self, board_id: Uuid, user_id: Uuid) -> Result<Participant, DatabaseError> {
        let mut tables = self.lock();
        let exists = tables
            .participants
            .iter()
            .any(|p| p.board_id == board_id && p.user_id == user_id && p.deleted_at.is_none());
        if exists {
            return Err(unique("participants_board_user_active"));
        }

        let participant = Participant {
            id: Uuid::new_v4(),
            board_id,
            user_id,
            created_at: Utc::now(),
            deleted_at: None,
        };
        tables.participants.push(participant.clone());
        Ok(participant)
    }

    async fn find(&self, board_id: Uuid, user_id: Uuid) -> Result<Option<Participant>, DatabaseError> {
        Ok(self
            .lock()
            .participants
            .iter()
            .find(|p| p.board_id == board_id && p.user_id == user_id && p.deleted_at.is_none())
            .cloned())
    }

    async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Participant>, DatabaseError> {
        Ok(self
            .lock()
            .participants
            .iter()
            .filter(|p| p.board_id == board_id && p.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let row = tables
            .participants
            .iter_mut()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .ok_or_else(|| missing("Participant"))?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl TaxonomyRepository for MemoryStore {
    async fn create(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        name: &str,
        color: &str,
    ) -> Result<TaxonomyItem, DatabaseError> {
        let now = Utc::now();
        let mut tables = self.lock();
        let taken = tables.taxonomy.iter().any(|(k, item)| {
            *k == kind && item.project_id == project_id && item.name == name && item.deleted_at.is_none()
        });
        if taken {
            return Err(unique("taxonomy_project_name_active"));
        }

        let item = TaxonomyItem {
            id: Uuid::new_v4(),
            project_id,
            name: name.to_string(),
            color: color.to_string(),
            is_system_default: false,
            display_order: next_display_order(&tables, kind, project_id),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.taxonomy.push((kind, item.clone()));
        Ok(item)
    }

    async fn find_by_id(&self, kind: TaxonomyKind, id: Uuid) -> Result<Option<TaxonomyItem>, DatabaseError> {
        Ok(self
            .lock()
            .taxonomy
            .iter()
            .find(|(k, item)| *k == kind && item.id == id && item.deleted_at.is_none())
            .map(|(_, item)| item.clone()))
    }

    async fn find_by_name(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<TaxonomyItem>, DatabaseError> {
        Ok(self
            .lock()
            .taxonomy
            .iter()
            .find(|(k, item)| {
                *k == kind && item.project_id == project_id && item.name == name && item.deleted_at.is_none()
            })
            .map(|(_, item)| item.clone()))
    }

    async fn list_by_project(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
    ) -> Result<Vec<TaxonomyItem>, DatabaseError> {
        let mut items: Vec<TaxonomyItem> = self
            .lock()
            .taxonomy
            .iter()
            .filter(|(k, item)| *k == kind && item.project_id == project_id && item.deleted_at.is_none())
            .map(|(_, item)| item.clone())
            .collect();
        // stable sort keeps insertion order for equal display orders
        items.sort_by_key(|item| item.display_order);
        Ok(items)
    }

    async fn update(&self, kind: TaxonomyKind, item: &TaxonomyItem) -> Result<TaxonomyItem, DatabaseError> {
        let mut tables = self.lock();
        let taken = tables.taxonomy.iter().any(|(k, other)| {
            *k == kind
                && other.project_id == item.project_id
                && other.id != item.id
                && other.name == item.name
                && other.deleted_at.is_none()
        });
        if taken {
            return Err(unique("taxonomy_project_name_active"));
        }

        let (_, row) = tables
            .taxonomy
            .iter_mut()
            .find(|(k, row)| *k == kind && row.id == item.id && row.deleted_at.is_none())
            .ok_or_else(|| missing(kind.label()))?;
        row.name = item.name.clone();
        row.color = item.color.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn soft_delete(&self, kind: TaxonomyKind, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let (_, row) = tables
            .taxonomy
            .iter_mut()
            .find(|(k, row)| *k == kind && row.id == id && row.deleted_at.is_none())
            .ok_or_else(|| missing(kind.label()))?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn reorder(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        orders: &[(Uuid, i32)],
    ) -> Result<Vec<TaxonomyItem>, DatabaseError> {
        {
            let mut tables = self.lock();
            let known = |tables: &Tables, id: Uuid| {
                tables.taxonomy.iter().any(|(k, item)| {
                    *k == kind && item.id == id && item.project_id == project_id && item.deleted_at.is_none()
                })
            };
            // all or nothing
            if orders.iter().any(|(id, _)| !known(&tables, *id)) {
                return Err(missing(kind.label()));
            }

            let now = Utc::now();
            for (id, display_order) in orders {
                if let Some((_, item)) = tables.taxonomy.iter_mut().find(|(k, item)| *k == kind && item.id == *id) {
                    item.display_order = *display_order;
                    item.updated_at = now;
                }
            }
        }
        TaxonomyRepository::list_by_project(self, kind, project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_project(workspace_id: Uuid, name: &str) -> NewProject {
        NewProject {
            workspace_id,
            owner_id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            is_public: false,
        }
    }

    #[tokio::test]
    async fn one_pending_join_request_per_user() {
        let store = MemoryStore::new();
        let (project, user) = (Uuid::new_v4(), Uuid::new_v4());

        ProjectRepository::create_join_request(&store, project, user).await.unwrap();
        let err = ProjectRepository::create_join_request(&store, project, user).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn approving_twice_is_not_pending() {
        let store = MemoryStore::new();
        let request = ProjectRepository::create_join_request(&store, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        ProjectRepository::approve_join_request(&store, request.id).await.unwrap();
        let err = ProjectRepository::approve_join_request(&store, request.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotPending));
    }

    #[tokio::test]
    async fn deleting_the_default_project_frees_the_slot() {
        let store = MemoryStore::new();
        let ws = Uuid::new_v4();

        let (first, _) = ProjectRepository::create_with_owner(&store, new_project(ws, "First")).await.unwrap();
        ProjectRepository::soft_delete(&store, first.id).await.unwrap();
        let (second, _) = ProjectRepository::create_with_owner(&store, new_project(ws, "Second")).await.unwrap();
        assert!(second.is_default);
    }
}
