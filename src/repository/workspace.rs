use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{NewWorkspace, Workspace, WorkspaceJoinRequest, WorkspaceMember};
use crate::database::{found, DatabaseError};
use crate::types::{JoinRequestStatus, MemberRole};

/// Workspaces with their memberships and join requests. Membership removal
/// is soft: `left_at` is stamped and the row is kept.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Insert the workspace and its OWNER membership in one transaction. The
    /// membership becomes the user's default when they have none.
    async fn create_with_owner(
        &self,
        workspace: NewWorkspace,
    ) -> Result<(Workspace, WorkspaceMember), DatabaseError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Workspace>, DatabaseError>;
    async fn update(&self, workspace: &Workspace) -> Result<Workspace, DatabaseError>;
    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn find_member(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, DatabaseError>;
    async fn list_members(&self, workspace_id: Uuid) -> Result<Vec<WorkspaceMember>, DatabaseError>;
    async fn update_member_role(
        &self,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<WorkspaceMember, DatabaseError>;
    async fn remove_member(&self, member_id: Uuid) -> Result<(), DatabaseError>;
    /// Clear every default flag of the user and set the given one, atomically
    async fn set_default(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<WorkspaceMember, DatabaseError>;

    async fn find_pending_join_request(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceJoinRequest>, DatabaseError>;
    async fn create_join_request(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<WorkspaceJoinRequest, DatabaseError>;
    async fn find_join_request(&self, id: Uuid) -> Result<Option<WorkspaceJoinRequest>, DatabaseError>;
    async fn list_join_requests(
        &self,
        workspace_id: Uuid,
        status: Option<JoinRequestStatus>,
    ) -> Result<Vec<WorkspaceJoinRequest>, DatabaseError>;
    async fn approve_join_request(
        &self,
        id: Uuid,
    ) -> Result<(WorkspaceJoinRequest, WorkspaceMember), DatabaseError>;
    async fn reject_join_request(&self, id: Uuid) -> Result<WorkspaceJoinRequest, DatabaseError>;
}

pub struct PgWorkspaceRepository {
    pool: PgPool,
}

impl PgWorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const MEMBER_COLUMNS: &str = "id, workspace_id, user_id, role, is_default, joined_at, left_at";
const JOIN_REQUEST_COLUMNS: &str = "id, workspace_id, user_id, status, requested_at, updated_at";

#[async_trait]
impl WorkspaceRepository for PgWorkspaceRepository {
    async fn create_with_owner(
        &self,
        workspace: NewWorkspace,
    ) -> Result<(Workspace, WorkspaceMember), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Workspace>(
            "INSERT INTO workspaces (id, name, description, owner_id)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&workspace.name)
        .bind(&workspace.description)
        .bind(workspace.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        let has_default: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM workspace_members WHERE user_id = $1 AND is_default AND left_at IS NULL)",
        )
        .bind(workspace.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        let owner = sqlx::query_as::<_, WorkspaceMember>(&format!(
            "INSERT INTO workspace_members (id, workspace_id, user_id, role, is_default)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(created.id)
        .bind(workspace.owner_id)
        .bind(MemberRole::Owner.as_str())
        .bind(!has_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((created, owner))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        let workspace = sqlx::query_as::<_, Workspace>(
            "SELECT * FROM workspaces WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(workspace)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Workspace>, DatabaseError> {
        let workspaces = sqlx::query_as::<_, Workspace>(
            "SELECT w.* FROM workspaces w
             JOIN workspace_members m ON m.workspace_id = w.id
             WHERE m.user_id = $1 AND m.left_at IS NULL AND w.deleted_at IS NULL
             ORDER BY m.is_default DESC, w.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(workspaces)
    }

    async fn update(&self, workspace: &Workspace) -> Result<Workspace, DatabaseError> {
        let updated = sqlx::query_as::<_, Workspace>(
            "UPDATE workspaces SET name = $2, description = $3, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
        )
        .bind(workspace.id)
        .bind(&workspace.name)
        .bind(&workspace.description)
        .fetch_optional(&self.pool)
        .await?;
        found(updated, "Workspace")
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE workspaces SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_member(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, DatabaseError> {
        let member = sqlx::query_as::<_, WorkspaceMember>(&format!(
            "SELECT {} FROM workspace_members
             WHERE workspace_id = $1 AND user_id = $2 AND left_at IS NULL",
            MEMBER_COLUMNS
        ))
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn list_members(&self, workspace_id: Uuid) -> Result<Vec<WorkspaceMember>, DatabaseError> {
        let members = sqlx::query_as::<_, WorkspaceMember>(&format!(
            "SELECT {} FROM workspace_members
             WHERE workspace_id = $1 AND left_at IS NULL
             ORDER BY joined_at ASC",
            MEMBER_COLUMNS
        ))
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn update_member_role(
        &self,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<WorkspaceMember, DatabaseError> {
        let member = sqlx::query_as::<_, WorkspaceMember>(&format!(
            "UPDATE workspace_members SET role = $2
             WHERE id = $1 AND left_at IS NULL
             RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(member_id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;
        found(member, "Member")
    }

    async fn remove_member(&self, member_id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE workspace_members SET left_at = NOW(), is_default = FALSE
             WHERE id = $1 AND left_at IS NULL",
        )
        .bind(member_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_default(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<WorkspaceMember, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE workspace_members SET is_default = FALSE WHERE user_id = $1 AND is_default")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let member = sqlx::query_as::<_, WorkspaceMember>(&format!(
            "UPDATE workspace_members SET is_default = TRUE
             WHERE user_id = $1 AND workspace_id = $2 AND left_at IS NULL
             RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(user_id)
        .bind(workspace_id)
        .fetch_optional(&mut *tx)
        .await?;

        // Dropping the transaction without commit restores the previous default
        let member = found(member, "Workspace membership")?;
        tx.commit().await?;
        Ok(member)
    }

    async fn find_pending_join_request(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceJoinRequest>, DatabaseError> {
        let request = sqlx::query_as::<_, WorkspaceJoinRequest>(&format!(
            "SELECT {} FROM workspace_join_requests
             WHERE workspace_id = $1 AND user_id = $2 AND status = 'PENDING'",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn create_join_request(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<WorkspaceJoinRequest, DatabaseError> {
        let request = sqlx::query_as::<_, WorkspaceJoinRequest>(&format!(
            "INSERT INTO workspace_join_requests (id, workspace_id, user_id, status)
             VALUES ($1, $2, $3, 'PENDING')
             RETURNING {}",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(workspace_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn find_join_request(&self, id: Uuid) -> Result<Option<WorkspaceJoinRequest>, DatabaseError> {
        let request = sqlx::query_as::<_, WorkspaceJoinRequest>(&format!(
            "SELECT {} FROM workspace_join_requests WHERE id = $1",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn list_join_requests(
        &self,
        workspace_id: Uuid,
        status: Option<JoinRequestStatus>,
    ) -> Result<Vec<WorkspaceJoinRequest>, DatabaseError> {
        let requests = sqlx::query_as::<_, WorkspaceJoinRequest>(&format!(
            "SELECT {} FROM workspace_join_requests
             WHERE workspace_id = $1 AND ($2::text IS NULL OR status = $2)
             ORDER BY requested_at DESC",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(workspace_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn approve_join_request(
        &self,
        id: Uuid,
    ) -> Result<(WorkspaceJoinRequest, WorkspaceMember), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, WorkspaceJoinRequest>(&format!(
            "UPDATE workspace_join_requests
             SET status = 'APPROVED', updated_at = NOW()
             WHERE id = $1 AND status = 'PENDING'
             RETURNING {}",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DatabaseError::NotPending)?;

        let member = sqlx::query_as::<_, WorkspaceMember>(&format!(
            "INSERT INTO workspace_members (id, workspace_id, user_id, role, is_default)
             VALUES ($1, $2, $3, $4, FALSE)
             RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(request.workspace_id)
        .bind(request.user_id)
        .bind(MemberRole::Member.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((request, member))
    }

    async fn reject_join_request(&self, id: Uuid) -> Result<WorkspaceJoinRequest, DatabaseError> {
        let request = sqlx::query_as::<_, WorkspaceJoinRequest>(&format!(
            "UPDATE workspace_join_requests
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
