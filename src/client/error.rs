//! Backend client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Longest raw body echoed back as an error message
const MAX_RAW_MESSAGE_LEN: usize = 200;

/// Error returned by every backend call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// The request never produced a response (connect, timeout, TLS)
    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("Unexpected backend response: {0}")]
    Decode(String),

    /// The client could not be constructed
    #[error("Invalid backend configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Build a status error from a response body
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status when the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message suitable for the error banner
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Transport(e) if e.is_timeout() => {
                "The news service did not respond in time".to_string()
            }
            ApiError::Transport(_) => "The news service is unreachable".to_string(),
            ApiError::Decode(_) | ApiError::Config(_) => {
                "The news service returned an unexpected response".to_string()
            }
        }
    }
}

/// Pull a human message out of a backend error body.
///
/// Understands `{"message": ..}`, `{"error": {"message": ..}}`,
/// `{"error": ".."}`, ASP.NET problem details (`title`), and plain text.
fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let candidates = [
            value.get("message"),
            value.pointer("/error/message"),
            value.get("error"),
            value.get("title"),
        ];
        return candidates
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }

    if body.len() <= MAX_RAW_MESSAGE_LEN && !body.starts_with('<') {
        return Some(body.to_string());
    }
    None
}
