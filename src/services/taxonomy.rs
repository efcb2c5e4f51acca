use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::access::{load_project, require_manager, require_member};
use crate::api::taxonomy::{
    CreateTaxonomyItemRequest, ReorderRequest, TaxonomyItemResponse, UpdateTaxonomyItemRequest, DEFAULT_COLOR,
};
use crate::database::models::TaxonomyItem;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::repository::{ProjectRepository, TaxonomyRepository};
use crate::types::TaxonomyKind;

/// Project-scoped custom stages, roles and importance levels. Reads need
/// membership, writes need OWNER or ADMIN.
pub struct TaxonomyService {
    taxonomy: Arc<dyn TaxonomyRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl TaxonomyService {
    pub fn new(taxonomy: Arc<dyn TaxonomyRepository>, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { taxonomy, projects }
    }

    /// Ordered by `displayOrder`
    pub async fn list(
        &self,
        caller: &AuthUser,
        kind: TaxonomyKind,
        project_id: Uuid,
    ) -> Result<Vec<TaxonomyItemResponse>, ApiError> {
        load_project(self.projects.as_ref(), project_id).await?;
        require_member(self.projects.as_ref(), project_id, caller.user_id).await?;

        let items = self.taxonomy.list_by_project(kind, project_id).await?;
        Ok(items.iter().map(TaxonomyItemResponse::from).collect())
    }

    pub async fn get(
        &self,
        caller: &AuthUser,
        kind: TaxonomyKind,
        project_id: Uuid,
        item_id: Uuid,
    ) -> Result<TaxonomyItemResponse, ApiError> {
        load_project(self.projects.as_ref(), project_id).await?;
        require_member(self.projects.as_ref(), project_id, caller.user_id).await?;

        let item = self.load(kind, project_id, item_id).await?;
        Ok((&item).into())
    }

    pub async fn create(
        &self,
        caller: &AuthUser,
        kind: TaxonomyKind,
        project_id: Uuid,
        req: CreateTaxonomyItemRequest,
    ) -> Result<TaxonomyItemResponse, ApiError> {
        req.validate()?;
        load_project(self.projects.as_ref(), project_id).await?;
        require_manager(self.projects.as_ref(), project_id, caller.user_id).await?;

        let name = req.name.trim();
        self.ensure_unique(kind, project_id, name, None).await?;

        let color = req.color.as_deref().unwrap_or(DEFAULT_COLOR);
        let item = self
            .taxonomy
            .create(kind, project_id, name, color)
            .await
            .map_err(|err| duplicate_name(kind, err.into()))?;

        info!(%project_id, kind = %kind, item_id = %item.id, "taxonomy item created");
        Ok((&item).into())
    }

    pub async fn update(
        &self,
        caller: &AuthUser,
        kind: TaxonomyKind,
        project_id: Uuid,
        item_id: Uuid,
        req: UpdateTaxonomyItemRequest,
    ) -> Result<TaxonomyItemResponse, ApiError> {
        req.validate()?;
        load_project(self.projects.as_ref(), project_id).await?;
        require_manager(self.projects.as_ref(), project_id, caller.user_id).await?;

        let mut item = self.load(kind, project_id, item_id).await?;
        if let Some(name) = req.name {
            let name = name.trim().to_string();
            self.ensure_unique(kind, project_id, &name, Some(item.id)).await?;
            item.name = name;
        }
        if let Some(color) = req.color {
            item.color = color;
        }

        let updated = self
            .taxonomy
            .update(kind, &item)
            .await
            .map_err(|err| duplicate_name(kind, err.into()))?;
        Ok((&updated).into())
    }

    /// System defaults cannot be deleted
    pub async fn delete(
        &self,
        caller: &AuthUser,
        kind: TaxonomyKind,
        project_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), ApiError> {
        load_project(self.projects.as_ref(), project_id).await?;
        require_manager(self.projects.as_ref(), project_id, caller.user_id).await?;

        let item = self.load(kind, project_id, item_id).await?;
        if item.is_system_default {
            return Err(ApiError::validation(format!(
                "{} is a system default and cannot be deleted",
                kind.label()
            )));
        }

        self.taxonomy.soft_delete(kind, item.id).await?;
        info!(%project_id, kind = %kind, %item_id, "taxonomy item deleted");
        Ok(())
    }

    pub async fn reorder(
        &self,
        caller: &AuthUser,
        kind: TaxonomyKind,
        project_id: Uuid,
        req: ReorderRequest,
    ) -> Result<Vec<TaxonomyItemResponse>, ApiError> {
        req.validate()?;
        load_project(self.projects.as_ref(), project_id).await?;
        require_manager(self.projects.as_ref(), project_id, caller.user_id).await?;

        let known: HashSet<Uuid> = self
            .taxonomy
            .list_by_project(kind, project_id)
            .await?
            .iter()
            .map(|item| item.id)
            .collect();
        if let Some(unknown) = req.orders.iter().find(|o| !known.contains(&o.id)) {
            return Err(ApiError::not_found(format!("{} {} not found", kind.label(), unknown.id)));
        }

        let orders: Vec<(Uuid, i32)> = req.orders.iter().map(|o| (o.id, o.display_order)).collect();
        let items = self.taxonomy.reorder(kind, project_id, &orders).await?;
        Ok(items.iter().map(TaxonomyItemResponse::from).collect())
    }

    async fn load(&self, kind: TaxonomyKind, project_id: Uuid, item_id: Uuid) -> Result<TaxonomyItem, ApiError> {
        self.taxonomy
            .find_by_id(kind, item_id)
            .await?
            .filter(|item| item.project_id == project_id)
            .ok_or_else(|| ApiError::not_found(format!("{} not found", kind.label())))
    }

    async fn ensure_unique(
        &self,
        kind: TaxonomyKind,
        project_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), ApiError> {
        match self.taxonomy.find_by_name(kind, project_id, name).await? {
            Some(existing) if Some(existing.id) != except => Err(name_taken(kind)),
            _ => Ok(()),
        }
    }
}

fn name_taken(kind: TaxonomyKind) -> ApiError {
    ApiError::already_exists(format!("{} with this name already exists", kind.label()))
}

/// The unique index is the backstop for concurrent creates
fn duplicate_name(kind: TaxonomyKind, err: ApiError) -> ApiError {
    match err {
        ApiError::AlreadyExists(_) => name_taken(kind),
        other => other,
    }
}
