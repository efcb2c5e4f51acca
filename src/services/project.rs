use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::access::{load_project, require_member, require_owner, require_workspace_member};
use super::enrichment::ProfileDirectory;
use crate::api::init_settings::{CustomTaxonomies, ProjectInitSettingsResponse, BOARD_FIELDS, FIELD_TYPES};
use crate::api::project::{
    CreateProjectRequest, PaginatedProjectsResponse, ProjectResponse, ProjectSearchQuery,
    UpdateProjectRequest,
};
use crate::api::taxonomy::TaxonomyItemResponse;
use crate::api::Pagination;
use crate::client::UserClient;
use crate::database::models::{NewProject, Project};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::repository::{ProjectRepository, TaxonomyRepository};
use crate::types::TaxonomyKind;

const DEFAULT_SEARCH_LIMIT: i64 = 10;
const MAX_SEARCH_LIMIT: i64 = 100;

pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    taxonomy: Arc<dyn TaxonomyRepository>,
    client: Arc<dyn UserClient>,
    profiles: ProfileDirectory,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        taxonomy: Arc<dyn TaxonomyRepository>,
        client: Arc<dyn UserClient>,
        profiles: ProfileDirectory,
    ) -> Self {
        Self {
            projects,
            taxonomy,
            client,
            profiles,
        }
    }

    /// The caller becomes OWNER. The first project of a workspace is its default.
    pub async fn create(&self, caller: &AuthUser, req: CreateProjectRequest) -> Result<ProjectResponse, ApiError> {
        req.validate()?;
        require_workspace_member(self.client.as_ref(), req.workspace_id, caller.user_id, &caller.token).await?;

        let (project, _owner) = self
            .projects
            .create_with_owner(NewProject {
                workspace_id: req.workspace_id,
                owner_id: caller.user_id,
                name: req.name.trim().to_string(),
                description: req.description,
                is_public: req.is_public,
            })
            .await?;

        info!(project_id = %project.id, workspace_id = %project.workspace_id, "project created");
        Ok(self.with_owner(project, &caller.token).await)
    }

    pub async fn list_by_workspace(
        &self,
        caller: &AuthUser,
        workspace_id: Uuid,
    ) -> Result<Vec<ProjectResponse>, ApiError> {
        require_workspace_member(self.client.as_ref(), workspace_id, caller.user_id, &caller.token).await?;

        let projects = self.projects.list_by_workspace(workspace_id).await?;
        Ok(self.with_owners(projects, &caller.token).await)
    }

    pub async fn get_default(&self, caller: &AuthUser, workspace_id: Uuid) -> Result<ProjectResponse, ApiError> {
        require_workspace_member(self.client.as_ref(), workspace_id, caller.user_id, &caller.token).await?;

        let project = self
            .projects
            .find_default(workspace_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Default project not found"))?;
        Ok(self.with_owner(project, &caller.token).await)
    }

    pub async fn get(&self, caller: &AuthUser, project_id: Uuid) -> Result<ProjectResponse, ApiError> {
        let project = load_project(self.projects.as_ref(), project_id).await?;
        require_member(self.projects.as_ref(), project_id, caller.user_id).await?;
        Ok(self.with_owner(project, &caller.token).await)
    }

    pub async fn update(
        &self,
        caller: &AuthUser,
        project_id: Uuid,
        req: UpdateProjectRequest,
    ) -> Result<ProjectResponse, ApiError> {
        req.validate()?;
        let mut project = load_project(self.projects.as_ref(), project_id).await?;
        require_owner(self.projects.as_ref(), project_id, caller.user_id).await?;

        if let Some(name) = req.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = req.description {
            project.description = description;
        }
        if let Some(is_public) = req.is_public {
            project.is_public = is_public;
        }

        let updated = self.projects.update(&project).await?;
        Ok(self.with_owner(updated, &caller.token).await)
    }

    /// Soft delete. Boards and members are left in place but become unreachable.
    pub async fn delete(&self, caller: &AuthUser, project_id: Uuid) -> Result<(), ApiError> {
        load_project(self.projects.as_ref(), project_id).await?;
        require_owner(self.projects.as_ref(), project_id, caller.user_id).await?;

        self.projects.soft_delete(project_id).await?;
        info!(%project_id, "project deleted");
        Ok(())
    }

    pub async fn search(
        &self,
        caller: &AuthUser,
        query: ProjectSearchQuery,
    ) -> Result<PaginatedProjectsResponse, ApiError> {
        let (page, limit) = query.pagination().resolve(DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT)?;
        let offset = Pagination::offset(page, limit)?;
        require_workspace_member(self.client.as_ref(), query.workspace_id, caller.user_id, &caller.token).await?;

        let term = query.query.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let found = self
            .projects
            .search(query.workspace_id, term, limit, offset)
            .await?;

        Ok(PaginatedProjectsResponse {
            projects: self.with_owners(found.items, &caller.token).await,
            total: found.total,
            page,
            limit,
        })
    }

    pub async fn init_settings(
        &self,
        caller: &AuthUser,
        project_id: Uuid,
    ) -> Result<ProjectInitSettingsResponse, ApiError> {
        let project = load_project(self.projects.as_ref(), project_id).await?;
        require_member(self.projects.as_ref(), project_id, caller.user_id).await?;

        let (stages, roles, importances) = futures::try_join!(
            self.taxonomy.list_by_project(TaxonomyKind::Stage, project_id),
            self.taxonomy.list_by_project(TaxonomyKind::Role, project_id),
            self.taxonomy.list_by_project(TaxonomyKind::Importance, project_id),
        )?;

        Ok(ProjectInitSettingsResponse {
            project: (&project).into(),
            fields: BOARD_FIELDS.clone(),
            field_types: FIELD_TYPES.clone(),
            custom: CustomTaxonomies {
                stages: stages.iter().map(TaxonomyItemResponse::from).collect(),
                roles: roles.iter().map(TaxonomyItemResponse::from).collect(),
                importances: importances.iter().map(TaxonomyItemResponse::from).collect(),
            },
        })
    }

    async fn with_owner(&self, project: Project, token: &str) -> ProjectResponse {
        let owners = self
            .profiles
            .workspace_profiles(project.workspace_id, &[project.owner_id], token)
            .await;
        ProjectResponse::new(&project, owners.get(&project.owner_id))
    }

    /// All projects passed here belong to one workspace
    async fn with_owners(&self, projects: Vec<Project>, token: &str) -> Vec<ProjectResponse> {
        let Some(workspace_id) = projects.first().map(|p| p.workspace_id) else {
            return Vec::new();
        };

        let owner_ids: Vec<Uuid> = projects.iter().map(|p| p.owner_id).collect();
        let owners = self.profiles.workspace_profiles(workspace_id, &owner_ids, token).await;

        projects
            .iter()
            .map(|project| ProjectResponse::new(project, owners.get(&project.owner_id)))
            .collect()
    }
}
