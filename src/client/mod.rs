//! Backend API client
//!
//! A thin `reqwest` wrapper around the FU News REST/OData backend:
//! - OData reads under `/{odata_prefix}/{EntitySet}`
//! - REST writes under `/{api_prefix}/{EntitySet}/...`
//! - Bearer token attached per signed-in user
//!
//! Non-success responses are turned into [`ApiError::Status`] carrying the
//! HTTP status and the backend's message. There is no retry policy.

mod error;
pub mod odata;

pub use error::ApiError;
pub use odata::{Direction, ODataPage, ODataQuery};

use reqwest::{header, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::BackendConfig;

/// HTTP client for the backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    odata_prefix: String,
    api_prefix: String,
    bearer: Option<String>,
}

impl ApiClient {
    /// Create an anonymous client from configuration
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("funews/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            odata_prefix: config.odata_prefix.trim_matches('/').to_string(),
            api_prefix: config.api_prefix.trim_matches('/').to_string(),
            bearer: None,
        })
    }

    /// Clone of this client that sends `Authorization: Bearer <token>`
    pub fn authorized(&self, token: &str) -> Self {
        Self {
            bearer: Some(token.to_string()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{odata}/{path}`
    pub fn odata_url(&self, path: &str) -> String {
        join_url(&self.base_url, &self.odata_prefix, path)
    }

    /// `{base}/{api}/{path}`
    pub fn api_url(&self, path: &str) -> String {
        join_url(&self.base_url, &self.api_prefix, path)
    }

    /// GET and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, url)).await?;
        decode(response).await
    }

    /// POST a JSON body and decode the JSON answer
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, url).json(body))
            .await?;
        decode(response).await
    }

    /// PUT a JSON body; any answer body is ignored
    pub async fn put_json<B>(&self, url: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::PUT, url).json(body)).await?;
        Ok(())
    }

    /// PUT without a body (state transitions such as restore)
    pub async fn put_empty(&self, url: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::PUT, url)).await?;
        Ok(())
    }

    /// DELETE; any answer body is ignored
    pub async fn delete(&self, url: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "backend request");

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "backend unreachable");
            ApiError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status, &body);
        tracing::warn!(%method, %path, status = status.as_u16(), error = %err, "backend error");
        Err(err)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Err(ApiError::Decode("empty response body".to_string()));
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn join_url(base: &str, prefix: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", base, path)
    } else {
        format!("{}/{}/{}", base, prefix, path)
    }
}
