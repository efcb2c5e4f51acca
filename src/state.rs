use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::{KeyValueCache, UserInfoCache, WorkspaceCache};
use crate::client::UserClient;
use crate::config::CacheConfig;
use crate::database::HealthCheck;
use crate::middleware::JwtSecret;
use crate::repository::{
    BoardRepository, CommentRepository, ParticipantRepository, PgBoardRepository, PgCommentRepository,
    PgParticipantRepository, PgProjectRepository, PgTaxonomyRepository, PgWorkspaceRepository, ProjectRepository,
    TaxonomyRepository, WorkspaceRepository,
};
use crate::services::{
    BoardService, CommentService, ParticipantService, ProfileDirectory, ProjectJoinRequestService,
    ProjectMemberService, ProjectService, TaxonomyService, WorkspaceService,
};

/// One handle per aggregate
#[derive(Clone)]
pub struct Repositories {
    pub workspaces: Arc<dyn WorkspaceRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub boards: Arc<dyn BoardRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub participants: Arc<dyn ParticipantRepository>,
    pub taxonomy: Arc<dyn TaxonomyRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            workspaces: Arc::new(PgWorkspaceRepository::new(pool.clone())),
            projects: Arc::new(PgProjectRepository::new(pool.clone())),
            boards: Arc::new(PgBoardRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            participants: Arc::new(PgParticipantRepository::new(pool.clone())),
            taxonomy: Arc::new(PgTaxonomyRepository::new(pool)),
        }
    }
}

/// Shared by every handler. Cloning copies `Arc`s only.
#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: JwtSecret,
    pub database: Arc<dyn HealthCheck>,
    pub projects: Arc<ProjectService>,
    pub project_members: Arc<ProjectMemberService>,
    pub project_join_requests: Arc<ProjectJoinRequestService>,
    pub workspaces: Arc<WorkspaceService>,
    pub boards: Arc<BoardService>,
    pub comments: Arc<CommentService>,
    pub participants: Arc<ParticipantService>,
    pub taxonomy: Arc<TaxonomyService>,
}

impl AppState {
    pub fn new(
        jwt_secret: &str,
        database: Arc<dyn HealthCheck>,
        repos: Repositories,
        client: Arc<dyn UserClient>,
        cache: Arc<dyn KeyValueCache>,
        cache_config: &CacheConfig,
    ) -> Self {
        let workspace_cache = WorkspaceCache::new(cache.clone(), cache_config.membership_ttl());
        let user_cache = UserInfoCache::new(cache, cache_config.profile_ttl());
        let profiles = ProfileDirectory::new(client.clone(), user_cache);

        Self {
            jwt_secret: JwtSecret(Arc::from(jwt_secret)),
            database,
            projects: Arc::new(ProjectService::new(
                repos.projects.clone(),
                repos.taxonomy.clone(),
                client.clone(),
                profiles.clone(),
            )),
            project_members: Arc::new(ProjectMemberService::new(
                repos.projects.clone(),
                workspace_cache.clone(),
                profiles.clone(),
            )),
            project_join_requests: Arc::new(ProjectJoinRequestService::new(
                repos.projects.clone(),
                client,
                workspace_cache.clone(),
                profiles.clone(),
            )),
            workspaces: Arc::new(WorkspaceService::new(
                repos.workspaces.clone(),
                workspace_cache,
                profiles.clone(),
            )),
            boards: Arc::new(BoardService::new(
                repos.boards.clone(),
                repos.projects.clone(),
                repos.participants.clone(),
                repos.comments.clone(),
                profiles.clone(),
            )),
            comments: Arc::new(CommentService::new(
                repos.comments.clone(),
                repos.boards.clone(),
                repos.projects.clone(),
                profiles.clone(),
            )),
            participants: Arc::new(ParticipantService::new(
                repos.participants.clone(),
                repos.boards.clone(),
                repos.projects.clone(),
                profiles,
            )),
            taxonomy: Arc::new(TaxonomyService::new(repos.taxonomy, repos.projects)),
        }
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}
