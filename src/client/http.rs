use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::{ClientError, MembershipValidation, UserClient, UserProfile, WorkspaceProfile};
use crate::config::UserApiConfig;

/// reqwest-backed client. One instance is shared by every request.
#[derive(Clone)]
pub struct HttpUserClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUserClient {
    pub fn new(config: &UserApiConfig) -> Result<Self, ClientError> {
        Url::parse(&config.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, token: &str) -> Result<T, ClientError> {
        debug!(url = %url, "calling user service");

        let response = self.http.get(url.clone()).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "user service returned non-success status");
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl UserClient for HttpUserClient {
    async fn validate_workspace_member(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<bool, ClientError> {
        let url = self.endpoint(&format!(
            "/api/workspaces/{}/validate-member/{}",
            workspace_id, user_id
        ))?;
        let validation: MembershipValidation = self.get_json(url, token).await?;
        Ok(validation.is_member())
    }

    /// The endpoint answers for the token's owner; `userId` is passed as a
    /// hint for services that resolve other members.
    async fn get_workspace_profile(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        token: &str,
    ) -> Result<WorkspaceProfile, ClientError> {
        let mut url = self.endpoint(&format!("/api/profiles/workspace/{}", workspace_id))?;
        url.query_pairs_mut().append_pair("userId", &user_id.to_string());
        self.get_json(url, token).await
    }

    async fn get_user_profile(&self, user_id: Uuid, token: &str) -> Result<UserProfile, ClientError> {
        let url = self.endpoint(&format!("/api/users/{}", user_id))?;
        self.get_json(url, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    async fn spawn_user_service() -> String {
        async fn validate(Path((ws, user)): Path<(Uuid, Uuid)>, headers: HeaderMap) -> Json<serde_json::Value> {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer good-token");
            Json(json!({ "workspaceId": ws, "userId": user, "valid": false, "isValid": authorized }))
        }

        async fn user(Path(id): Path<String>) -> Result<Json<serde_json::Value>, StatusCode> {
            match id.as_str() {
                "00000000-0000-0000-0000-000000000001" => Ok(Json(json!({
                    "userId": id, "email": "one@example.com", "name": "One"
                }))),
                "00000000-0000-0000-0000-000000000002" => Ok(Json(json!({ "unexpected": true }))),
                _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
            }
        }

        let app = Router::new()
            .route("/api/workspaces/:ws/validate-member/:user", get(validate))
            .route("/api/users/:id", get(user));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    fn client(base_url: String) -> HttpUserClient {
        HttpUserClient::new(&UserApiConfig {
            base_url,
            timeout_ms: 2_000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn validation_forwards_bearer_token() {
        let client = client(spawn_user_service().await);
        let (ws, user) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(client.validate_workspace_member(ws, user, "good-token").await.unwrap());
        assert!(!client.validate_workspace_member(ws, user, "other-token").await.unwrap());
    }

    #[tokio::test]
    async fn non_success_and_malformed_bodies_are_errors() {
        let client = client(spawn_user_service().await);

        let ok = client
            .get_user_profile(Uuid::from_u128(1), "t")
            .await
            .unwrap();
        assert_eq!(ok.email, "one@example.com");

        let malformed = client.get_user_profile(Uuid::from_u128(2), "t").await;
        assert!(matches!(malformed, Err(ClientError::Decode(_))));

        let failed = client.get_user_profile(Uuid::from_u128(3), "t").await;
        assert!(matches!(failed, Err(ClientError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let port = portpicker::pick_unused_port().unwrap();
        let client = client(format!("http://127.0.0.1:{}", port));

        let result = client
            .validate_workspace_member(Uuid::new_v4(), Uuid::new_v4(), "t")
            .await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
