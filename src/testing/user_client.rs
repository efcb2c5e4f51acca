use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::client::{ClientError, UserClient, UserProfile, WorkspaceProfile};

#[derive(Default)]
struct State {
    members: HashSet<(Uuid, Uuid)>,
    profiles: HashMap<Uuid, UserProfile>,
    workspace_profiles: HashMap<(Uuid, Uuid), WorkspaceProfile>,
    unavailable: bool,
    fail_profiles: bool,
    profiles_answered_as: Option<Uuid>,
    validation_calls: usize,
    profile_calls: usize,
}

/// Scriptable stand-in for the user service
#[derive(Default)]
pub struct FakeUserClient {
    state: Mutex<State>,
}

fn outage(path: &str) -> ClientError {
    ClientError::Status {
        status: 503,
        url: format!("http://user-service.test{}", path),
    }
}

impl FakeUserClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_workspace_member(&self, workspace_id: Uuid, user_id: Uuid) {
        self.lock().members.insert((workspace_id, user_id));
    }

    pub fn remove_workspace_member(&self, workspace_id: Uuid, user_id: Uuid) {
        self.lock().members.remove(&(workspace_id, user_id));
    }

    /// Every call fails while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Profile lookups fail while membership checks keep working
    pub fn fail_profiles(&self, fail: bool) {
        self.lock().fail_profiles = fail;
    }

    /// Workspace profile lookups ignore the requested user and answer for `user_id`
    pub fn answer_workspace_profiles_as(&self, user_id: Uuid) {
        self.lock().profiles_answered_as = Some(user_id);
    }

    pub fn validation_calls(&self) -> usize {
        self.lock().validation_calls
    }

    /// Counts both profile endpoints
    pub fn profile_calls(&self) -> usize {
        self.lock().profile_calls
    }

    pub fn add_profile(&self, user_id: Uuid, name: &str, email: &str) {
        self.lock().profiles.insert(
            user_id,
            UserProfile {
                user_id,
                email: email.to_string(),
                name: name.to_string(),
                provider: "google".to_string(),
                is_active: true,
            },
        );
    }

    pub fn add_workspace_profile(&self, workspace_id: Uuid, user_id: Uuid, nick_name: &str, email: &str) {
        self.lock().workspace_profiles.insert(
            (workspace_id, user_id),
            WorkspaceProfile {
                profile_id: Some(Uuid::new_v4()),
                workspace_id,
                user_id,
                nick_name: nick_name.to_string(),
                email: email.to_string(),
                profile_image_url: None,
            },
        );
    }
}

#[async_trait]
impl UserClient for FakeUserClient {
    async fn validate_workspace_member(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        _token: &str,
    ) -> Result<bool, ClientError> {
        let mut state = self.lock();
        state.validation_calls += 1;
        if state.unavailable {
            return Err(outage("/api/workspaces/validate-member"));
        }
        Ok(state.members.contains(&(workspace_id, user_id)))
    }

    async fn get_workspace_profile(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        _token: &str,
    ) -> Result<WorkspaceProfile, ClientError> {
        let mut state = self.lock();
        state.profile_calls += 1;
        if state.unavailable || state.fail_profiles {
            return Err(outage("/api/workspaces/profile"));
        }
        let user_id = state.profiles_answered_as.unwrap_or(user_id);

        if let Some(profile) = state.workspace_profiles.get(&(workspace_id, user_id)) {
            return Ok(profile.clone());
        }
        // fall back to the account profile
        state
            .profiles
            .get(&user_id)
            .map(|profile| WorkspaceProfile {
                profile_id: None,
                workspace_id,
                user_id,
                nick_name: profile.name.clone(),
                email: profile.email.clone(),
                profile_image_url: None,
            })
            .ok_or_else(|| ClientError::Status {
                status: 404,
                url: format!("http://user-service.test/api/workspaces/{}/profile/{}", workspace_id, user_id),
            })
    }

    async fn get_user_profile(&self, user_id: Uuid, _token: &str) -> Result<UserProfile, ClientError> {
        let mut state = self.lock();
        state.profile_calls += 1;
        if state.unavailable || state.fail_profiles {
            return Err(outage("/api/users"));
        }

        state.profiles.get(&user_id).cloned().ok_or_else(|| ClientError::Status {
            status: 404,
            url: format!("http://user-service.test/api/users/{}", user_id),
        })
    }
}
