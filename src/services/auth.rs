//! Authentication service
//!
//! Exchanges credentials or a refresh token for a backend access token.

use crate::client::{ApiClient, ApiError};
use crate::models::{AuthResponse, LoginRequest, RefreshRequest};

pub struct AuthService<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self
            .client
            .post_json(&self.client.api_url("Auth/login"), &request)
            .await?;
        tracing::info!(account_id = response.account.account_id, role = %response.account.account_role, "signed in");
        Ok(response)
    }

    /// Trade a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ApiError> {
        let request = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response: AuthResponse = self
            .client
            .post_json(&self.client.api_url("Auth/refresh"), &request)
            .await?;
        tracing::debug!(account_id = response.account.account_id, "access token refreshed");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::models::AccountRole;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(&BackendConfig {
            base_url: server.url(),
            ..BackendConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_login_sends_camel_case_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/Auth/login")
            .match_body(Matcher::Json(json!({"email": "staff@fu.edu.vn", "password": "secret1"})))
            .with_status(200)
            .with_body(
                json!({
                    "accessToken": "abc",
                    "refreshToken": "def",
                    "expiresIn": 3600,
                    "account": {"AccountId": 2, "AccountName": "Staff", "AccountEmail": "staff@fu.edu.vn", "AccountRole": 1}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let response = AuthService::new(&client)
            .login(" staff@fu.edu.vn ", "secret1")
            .await
            .unwrap();

        assert_eq!(response.access_token, "abc");
        assert_eq!(response.account.account_role, AccountRole::Staff);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/Auth/login")
            .with_status(401)
            .with_body(r#"{"message":"Invalid email or password"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = AuthService::new(&client).login("x@fu.edu.vn", "bad").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_refresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/Auth/refresh")
            .match_body(Matcher::Json(json!({"refreshToken": "def"})))
            .with_status(200)
            .with_body(
                json!({
                    "accessToken": "new",
                    "account": {"AccountId": 2, "AccountName": "Staff", "AccountEmail": "staff@fu.edu.vn", "AccountRole": 1}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let response = AuthService::new(&client).refresh("def").await.unwrap();

        assert_eq!(response.access_token, "new");
        assert!(response.refresh_token.is_none());
        mock.assert_async().await;
    }
}
