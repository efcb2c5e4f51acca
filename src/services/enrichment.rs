use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::cache::UserInfoCache;
use crate::client::{SimpleUser, UserClient};

/// Best-effort name/email lookup. Failures are logged and the user is left
/// out of the result; callers render missing entries as empty fields.
#[derive(Clone)]
pub struct ProfileDirectory {
    client: Arc<dyn UserClient>,
    users: UserInfoCache,
}

impl ProfileDirectory {
    pub fn new(client: Arc<dyn UserClient>, users: UserInfoCache) -> Self {
        Self { client, users }
    }

    /// Workspace-scoped profiles, one concurrent call per distinct user
    pub async fn workspace_profiles(
        &self,
        workspace_id: Uuid,
        user_ids: &[Uuid],
        token: &str,
    ) -> HashMap<Uuid, SimpleUser> {
        let lookups = distinct(user_ids).into_iter().map(|user_id| async move {
            match self.client.get_workspace_profile(workspace_id, user_id, token).await {
                Ok(profile) if profile.user_id == user_id => Some((user_id, SimpleUser::from(&profile))),
                Ok(profile) => {
                    warn!(%workspace_id, %user_id, answered = %profile.user_id, "workspace profile is for another user");
                    None
                }
                Err(err) => {
                    warn!(%workspace_id, %user_id, error = %err, "workspace profile lookup failed");
                    None
                }
            }
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }

    /// Simple profiles from the batch cache, with live calls for the misses
    pub async fn simple_users(&self, user_ids: &[Uuid], token: &str) -> HashMap<Uuid, SimpleUser> {
        let wanted = distinct(user_ids);
        let mut found = self.users.get_simple_users_batch(&wanted).await;

        let misses: Vec<Uuid> = wanted.into_iter().filter(|id| !found.contains_key(id)).collect();
        let lookups = misses.into_iter().map(|user_id| async move {
            match self.client.get_user_profile(user_id, token).await {
                Ok(profile) => Some(SimpleUser::from(&profile)),
                Err(err) => {
                    warn!(%user_id, error = %err, "user profile lookup failed");
                    None
                }
            }
        });

        let fetched: Vec<SimpleUser> = join_all(lookups).await.into_iter().flatten().collect();
        self.users.set_simple_users_batch(&fetched).await;
        found.extend(fetched.into_iter().map(|user| (user.user_id, user)));
        found
    }

    pub async fn simple_user(&self, user_id: Uuid, token: &str) -> Option<SimpleUser> {
        self.simple_users(&[user_id], token).await.remove(&user_id)
    }
}

/// Keeps first-seen order
fn distinct(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
