//! In-process doubles for unit and router tests: repositories backed by
//! vectors, a scriptable user service and a cache that always fails.

mod store;
mod user_client;

pub use store::MemoryStore;
pub use user_client::FakeUserClient;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::api::project::CreateProjectRequest;
use crate::auth::{generate_jwt, Claims};
use crate::cache::{CacheError, KeyValueCache, MemoryCache, UserInfoCache, WorkspaceCache};
use crate::client::{CachedUserClient, UserClient};
use crate::config::CacheConfig;
use crate::database::models::Project;
use crate::database::{DatabaseError, HealthCheck};
use crate::middleware::AuthUser;
use crate::repository::ProjectRepository;
use crate::services::{
    BoardService, CommentService, ParticipantService, ProjectJoinRequestService, ProjectMemberService,
    ProjectService, TaxonomyService, WorkspaceService,
};
use crate::state::{AppState, Repositories};

pub const TEST_SECRET: &str = "test-secret-for-board-service";

/// Every operation errors, as during a Redis outage
pub struct FailingCache;

fn cache_down() -> CacheError {
    CacheError::Serialization(serde_json::Error::io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "cache unavailable",
    )))
}

#[async_trait]
impl KeyValueCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(cache_down())
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(cache_down())
    }

    async fn mget(&self, _keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        Err(cache_down())
    }

    async fn del(&self, _keys: &[String]) -> Result<(), CacheError> {
        Err(cache_down())
    }

    async fn del_prefix(&self, _prefix: &str) -> Result<(), CacheError> {
        Err(cache_down())
    }
}

/// Database health check with a switchable answer
#[derive(Default)]
pub struct StubDatabase {
    down: AtomicBool,
}

impl StubDatabase {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl HealthCheck for StubDatabase {
    async fn ping(&self) -> Result<(), DatabaseError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// Services wired the way `main` wires them, over in-memory doubles
pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub client: Arc<FakeUserClient>,
    pub cache: Arc<dyn KeyValueCache>,
    pub database: Arc<StubDatabase>,
    pub projects: Arc<ProjectService>,
    pub members: Arc<ProjectMemberService>,
    pub join_requests: Arc<ProjectJoinRequestService>,
    pub workspaces: Arc<WorkspaceService>,
    pub boards: Arc<BoardService>,
    pub comments: Arc<CommentService>,
    pub participants: Arc<ParticipantService>,
    pub taxonomy: Arc<TaxonomyService>,
    state: AppState,
}

impl TestEnv {
    /// Services talk to the fake user service directly
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Services go through the read-through cache over the fake, as in `main`
    pub fn with_cached_client() -> Self {
        Self::build(true)
    }

    fn build(cached: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(FakeUserClient::new());
        let cache: Arc<dyn KeyValueCache> = Arc::new(MemoryCache::new());
        let database = Arc::new(StubDatabase::default());

        let repos = Repositories {
            workspaces: store.clone(),
            projects: store.clone(),
            boards: store.clone(),
            comments: store.clone(),
            participants: store.clone(),
            taxonomy: store.clone(),
        };
        let cache_config = CacheConfig {
            redis_url: None,
            membership_ttl_secs: 300,
            profile_ttl_secs: 600,
        };
        let direct: Arc<dyn UserClient> = client.clone();
        let user_client: Arc<dyn UserClient> = if cached {
            Arc::new(CachedUserClient::new(
                direct,
                WorkspaceCache::new(cache.clone(), cache_config.membership_ttl()),
                UserInfoCache::new(cache.clone(), cache_config.profile_ttl()),
            ))
        } else {
            direct
        };
        let state = AppState::new(
            TEST_SECRET,
            database.clone(),
            repos,
            user_client,
            cache.clone(),
            &cache_config,
        );

        Self {
            store,
            client,
            cache,
            database,
            projects: state.projects.clone(),
            members: state.project_members.clone(),
            join_requests: state.project_join_requests.clone(),
            workspaces: state.workspaces.clone(),
            boards: state.boards.clone(),
            comments: state.comments.clone(),
            participants: state.participants.clone(),
            taxonomy: state.taxonomy.clone(),
            state,
        }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// A fresh user holding a valid token
    pub fn user(&self) -> AuthUser {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, chrono::Duration::hours(1));
        let token = generate_jwt(&claims, TEST_SECRET).unwrap();
        AuthUser { user_id, token }
    }

    /// Workspace known to the user service with the given members
    pub fn workspace_with(&self, users: &[&AuthUser]) -> Uuid {
        let workspace_id = Uuid::new_v4();
        for user in users {
            self.client.add_workspace_member(workspace_id, user.user_id);
        }
        workspace_id
    }

    pub fn project_request(&self, workspace_id: Uuid, name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            workspace_id,
            name: name.to_string(),
            description: format!("{} description", name),
            is_public: false,
        }
    }

    /// Project in its own workspace, created through the service
    pub async fn project_owned_by(&self, owner: &AuthUser) -> Project {
        let workspace_id = self.workspace_with(&[owner]);
        let created = self
            .projects
            .create(owner, self.project_request(workspace_id, "Project"))
            .await
            .unwrap();
        ProjectRepository::find_by_id(self.store.as_ref(), created.project_id)
            .await
            .unwrap()
            .unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
