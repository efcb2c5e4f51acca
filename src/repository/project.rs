use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{NewProject, Page, Project, ProjectJoinRequest, ProjectMember};
use crate::database::DatabaseError;
use crate::types::{JoinRequestStatus, MemberRole};

use super::contains_pattern;

/// Projects together with their members and join requests
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert the project and its OWNER membership in one transaction. The
    /// first live project of a workspace becomes its default.
    async fn create_with_owner(
        &self,
        project: NewProject,
    ) -> Result<(Project, ProjectMember), DatabaseError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DatabaseError>;
    async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Project>, DatabaseError>;
    async fn find_default(&self, workspace_id: Uuid) -> Result<Option<Project>, DatabaseError>;
    async fn search(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Project>, DatabaseError>;
    async fn update(&self, project: &Project) -> Result<Project, DatabaseError>;
    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn find_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>, DatabaseError>;
    async fn list_members(&self, project_id: Uuid) -> Result<Vec<ProjectMember>, DatabaseError>;
    async fn update_member_role(
        &self,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<ProjectMember, DatabaseError>;
    async fn delete_member(&self, member_id: Uuid) -> Result<(), DatabaseError>;

    async fn find_pending_join_request(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectJoinRequest>, DatabaseError>;
    async fn create_join_request(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<ProjectJoinRequest, DatabaseError>;
    async fn find_join_request(&self, id: Uuid) -> Result<Option<ProjectJoinRequest>, DatabaseError>;
    async fn list_join_requests(
        &self,
        project_id: Uuid,
        status: Option<JoinRequestStatus>,
    ) -> Result<Vec<ProjectJoinRequest>, DatabaseError>;
    /// PENDING → APPROVED plus MEMBER insert, atomically. Fails with
    /// `NotPending` when the request was already processed.
    async fn approve_join_request(
        &self,
        id: Uuid,
    ) -> Result<(ProjectJoinRequest, ProjectMember), DatabaseError>;
    async fn reject_join_request(&self, id: Uuid) -> Result<ProjectJoinRequest, DatabaseError>;
}

pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const MEMBER_COLUMNS: &str = "id, project_id, user_id, role, joined_at";
const JOIN_REQUEST_COLUMNS: &str = "id, project_id, user_id, status, requested_at, updated_at";

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create_with_owner(
        &self,
        project: NewProject,
    ) -> Result<(Project, ProjectMember), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let has_default: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE workspace_id = $1 AND is_default AND deleted_at IS NULL)",
        )
        .bind(project.workspace_id)
        .fetch_one(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, workspace_id, owner_id, name, description, is_default, is_public)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(project.workspace_id)
        .bind(project.owner_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(!has_default)
        .bind(project.is_public)
        .fetch_one(&mut *tx)
        .await?;

        let owner = sqlx::query_as::<_, ProjectMember>(&format!(
            "INSERT INTO project_members (id, project_id, user_id, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(created.id)
        .bind(project.owner_id)
        .bind(MemberRole::Owner.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((created, owner))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Project>, DatabaseError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects
             WHERE workspace_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn find_default(&self, workspace_id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects
             WHERE workspace_id = $1 AND is_default AND deleted_at IS NULL
             LIMIT 1",
        )
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn search(
        &self,
        workspace_id: Uuid,
        query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Project>, DatabaseError> {
        let pattern = query.map(contains_pattern);
        let filter = "workspace_id = $1 AND deleted_at IS NULL
             AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM projects WHERE {}", filter))
            .bind(workspace_id)
            .bind(pattern.as_deref())
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Project>(&format!(
            "SELECT * FROM projects WHERE {} ORDER BY created_at DESC LIMIT $3 OFFSET $4",
            filter
        ))
        .bind(workspace_id)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, total })
    }

    async fn update(&self, project: &Project) -> Result<Project, DatabaseError> {
        let updated = sqlx::query_as::<_, Project>(
            "UPDATE projects
             SET name = $2, description = $3, is_public = $4, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.is_public)
        .fetch_optional(&self.pool)
        .await?;
        crate::database::found(updated, "Project")
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE projects SET deleted_at = NOW(), is_default = FALSE WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectMember>, DatabaseError> {
        let member = sqlx::query_as::<_, ProjectMember>(&format!(
            "SELECT {} FROM project_members WHERE project_id = $1 AND user_id = $2",
            MEMBER_COLUMNS
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn list_members(&self, project_id: Uuid) -> Result<Vec<ProjectMember>, DatabaseError> {
        let members = sqlx::query_as::<_, ProjectMember>(&format!(
            "SELECT {} FROM project_members WHERE project_id = $1 ORDER BY joined_at ASC",
            MEMBER_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn update_member_role(
        &self,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<ProjectMember, DatabaseError> {
        let member = sqlx::query_as::<_, ProjectMember>(&format!(
            "UPDATE project_members SET role = $2 WHERE id = $1 RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(member_id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;
        crate::database::found(member, "Member")
    }

    async fn delete_member(&self, member_id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM project_members WHERE id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_pending_join_request(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectJoinRequest>, DatabaseError> {
        let request = sqlx::query_as::<_, ProjectJoinRequest>(&format!(
            "SELECT {} FROM project_join_requests
             WHERE project_id = $1 AND user_id = $2 AND status = 'PENDING'",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn create_join_request(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<ProjectJoinRequest, DatabaseError> {
        let request = sqlx::query_as::<_, ProjectJoinRequest>(&format!(
            "INSERT INTO project_join_requests (id, project_id, user_id, status)
             VALUES ($1, $2, $3, 'PENDING')
             RETURNING {}",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn find_join_request(&self, id: Uuid) -> Result<Option<ProjectJoinRequest>, DatabaseError> {
        let request = sqlx::query_as::<_, ProjectJoinRequest>(&format!(
            "SELECT {} FROM project_join_requests WHERE id = $1",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn list_join_requests(
        &self,
        project_id: Uuid,
        status: Option<JoinRequestStatus>,
    ) -> Result<Vec<ProjectJoinRequest>, DatabaseError> {
        let requests = sqlx::query_as::<_, ProjectJoinRequest>(&format!(
            "SELECT {} FROM project_join_requests
             WHERE project_id = $1 AND ($2::text IS NULL OR status = $2)
             ORDER BY requested_at DESC",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(project_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn approve_join_request(
        &self,
        id: Uuid,
    ) -> Result<(ProjectJoinRequest, ProjectMember), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Conditional transition: a concurrent approval loses here
        let request = sqlx::query_as::<_, ProjectJoinRequest>(&format!(
            "UPDATE project_join_requests
             SET status = 'APPROVED', updated_at = NOW()
             WHERE id = $1 AND status = 'PENDING'
             RETURNING {}",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DatabaseError::NotPending)?;

        let member = sqlx::query_as::<_, ProjectMember>(&format!(
            "INSERT INTO project_members (id, project_id, user_id, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(request.project_id)
        .bind(request.user_id)
        .bind(MemberRole::Member.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((request, member))
    }

    async fn reject_join_request(&self, id: Uuid) -> Result<ProjectJoinRequest, DatabaseError> {
        let request = sqlx::query_as::<_, ProjectJoinRequest>(&format!(
            "UPDATE project_join_requests
             SET status = 'REJECTED', updated_at = NOW()
             WHERE id = $1 AND status = 'PENDING'
             RETURNING {}",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        request.ok_or(DatabaseError::NotPending)
    }
}
