use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::TaxonomyItem;
use crate::database::{found, DatabaseError};
use crate::types::TaxonomyKind;

/// Custom stages, roles and importance levels. The three families share a
/// row shape and live in separate tables selected by `TaxonomyKind`.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Appends after the current highest `display_order`
    async fn create(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        name: &str,
        color: &str,
    ) -> Result<TaxonomyItem, DatabaseError>;
    async fn find_by_id(&self, kind: TaxonomyKind, id: Uuid) -> Result<Option<TaxonomyItem>, DatabaseError>;
    async fn find_by_name(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<TaxonomyItem>, DatabaseError>;
    async fn list_by_project(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
    ) -> Result<Vec<TaxonomyItem>, DatabaseError>;
    async fn update(&self, kind: TaxonomyKind, item: &TaxonomyItem) -> Result<TaxonomyItem, DatabaseError>;
    async fn soft_delete(&self, kind: TaxonomyKind, id: Uuid) -> Result<(), DatabaseError>;
    /// Apply all `(id, display_order)` pairs in one transaction
    async fn reorder(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        orders: &[(Uuid, i32)],
    ) -> Result<Vec<TaxonomyItem>, DatabaseError>;
}

pub struct PgTaxonomyRepository {
    pool: PgPool,
}

impl PgTaxonomyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaxonomyRepository for PgTaxonomyRepository {
    async fn create(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        name: &str,
        color: &str,
    ) -> Result<TaxonomyItem, DatabaseError> {
        let table = kind.table();
        let item = sqlx::query_as::<_, TaxonomyItem>(&format!(
            "INSERT INTO {table} (id, project_id, name, color, display_order)
             VALUES ($1, $2, $3, $4,
                 (SELECT COALESCE(MAX(display_order) + 1, 0) FROM {table}
                  WHERE project_id = $2 AND deleted_at IS NULL))
             RETURNING *"
        ))
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(name)
        .bind(color)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn find_by_id(&self, kind: TaxonomyKind, id: Uuid) -> Result<Option<TaxonomyItem>, DatabaseError> {
        let item = sqlx::query_as::<_, TaxonomyItem>(&format!(
            "SELECT * FROM {} WHERE id = $1 AND deleted_at IS NULL",
            kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn find_by_name(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        name: &str,
    ) -> Result<Option<TaxonomyItem>, DatabaseError> {
        let item = sqlx::query_as::<_, TaxonomyItem>(&format!(
            "SELECT * FROM {} WHERE project_id = $1 AND name = $2 AND deleted_at IS NULL",
            kind.table()
        ))
        .bind(project_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn list_by_project(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
    ) -> Result<Vec<TaxonomyItem>, DatabaseError> {
        let items = sqlx::query_as::<_, TaxonomyItem>(&format!(
            "SELECT * FROM {} WHERE project_id = $1 AND deleted_at IS NULL
             ORDER BY display_order ASC, created_at ASC",
            kind.table()
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn update(&self, kind: TaxonomyKind, item: &TaxonomyItem) -> Result<TaxonomyItem, DatabaseError> {
        let updated = sqlx::query_as::<_, TaxonomyItem>(&format!(
            "UPDATE {} SET name = $2, color = $3, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING *",
            kind.table()
        ))
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.color)
        .fetch_optional(&self.pool)
        .await?;
        found(updated, kind.label())
    }

    async fn soft_delete(&self, kind: TaxonomyKind, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query(&format!(
            "UPDATE {} SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
            kind.table()
        ))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn reorder(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        orders: &[(Uuid, i32)],
    ) -> Result<Vec<TaxonomyItem>, DatabaseError> {
        let update = format!(
            "UPDATE {} SET display_order = $3, updated_at = NOW()
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL",
            kind.table()
        );

        let mut tx = self.pool.begin().await?;
        for (id, display_order) in orders {
            let result = sqlx::query(&update)
                .bind(id)
                .bind(project_id)
                .bind(display_order)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(DatabaseError::NotFound(format!("{} not found", kind.label())));
            }
        }
        tx.commit().await?;

        self.list_by_project(kind, project_id).await
    }
}
