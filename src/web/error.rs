//! Web error types
//!
//! Handlers return [`WebError`]. Converting it to a response only records
//! what should happen; the `render_failures` middleware finishes the job
//! because it can see the request URI and the session:
//! - sign-in needed: redirect to `/login?next=<uri>`
//! - access denied: redirect to `/` with an error flash
//! - anything else: the error page with a Retry link

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;

use crate::client::ApiError;
use crate::view::ViewError;

#[derive(Debug, Error)]
pub enum WebError {
    /// No session on a protected page
    #[error("Sign in required")]
    LoginRequired,

    /// The session was rejected and has to be ended
    #[error("Your session has expired")]
    SessionExpired,

    /// Signed in, but the role may not do this
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// What `render_failures` should do with a failed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Login { end_session: bool },
    Denied { message: String },
    Page { message: String },
}

impl WebError {
    /// Status of the error page
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::LoginRequired | WebError::SessionExpired => StatusCode::SEE_OTHER,
            WebError::Forbidden(_) => StatusCode::FORBIDDEN,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Api(e) => match e.status() {
                Some(code) if code >= 500 => StatusCode::BAD_GATEWAY,
                Some(code) => StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY),
                None => StatusCode::BAD_GATEWAY,
            },
            WebError::View(_) | WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message for the error banner
    pub fn user_message(&self) -> String {
        match self {
            WebError::Api(e) => e.user_message(),
            WebError::View(_) | WebError::Internal(_) => {
                "Something went wrong while preparing this page".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn failure(&self) -> Failure {
        match self {
            WebError::LoginRequired => Failure::Login { end_session: false },
            WebError::SessionExpired => Failure::Login { end_session: true },
            WebError::Api(e) if e.is_unauthorized() => Failure::Login { end_session: true },
            WebError::Forbidden(message) => Failure::Denied {
                message: message.clone(),
            },
            WebError::Api(e) if e.is_forbidden() => Failure::Denied {
                message: e.user_message(),
            },
            other => Failure::Page {
                message: other.user_message(),
            },
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let failure = self.failure();
        let mut response = match &failure {
            Failure::Login { .. } => Redirect::to("/login").into_response(),
            Failure::Denied { .. } => Redirect::to("/").into_response(),
            Failure::Page { message } => {
                let status = self.status();
                if status.is_server_error() {
                    tracing::error!(status = status.as_u16(), error = %self, "request failed");
                } else {
                    tracing::debug!(status = status.as_u16(), error = %self, "request failed");
                }
                (status, message.clone()).into_response()
            }
        };
        response.extensions_mut().insert(failure);
        response
    }
}

/// Backend refusals a form can show inline (duplicate names and the like)
pub fn is_rejection(err: &ApiError) -> bool {
    matches!(err.status(), Some(400 | 409 | 422))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: StatusCode, body: &str) -> WebError {
        WebError::Api(ApiError::from_response(status, body))
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(api(StatusCode::NOT_FOUND, "").status(), StatusCode::NOT_FOUND);
        assert_eq!(api(StatusCode::INTERNAL_SERVER_ERROR, "").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(api(StatusCode::SERVICE_UNAVAILABLE, "").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(api(StatusCode::CONFLICT, "").status(), StatusCode::CONFLICT);
        assert_eq!(
            WebError::Api(ApiError::Decode("x".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(WebError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            api(StatusCode::UNAUTHORIZED, "").failure(),
            Failure::Login { end_session: true }
        );
        assert_eq!(
            WebError::LoginRequired.failure(),
            Failure::Login { end_session: false }
        );
        assert_eq!(
            api(StatusCode::FORBIDDEN, r#"{"message":"Admins only"}"#).failure(),
            Failure::Denied {
                message: "Admins only".to_string()
            }
        );
        assert_eq!(
            api(StatusCode::BAD_GATEWAY, r#"{"message":"upstream down"}"#).failure(),
            Failure::Page {
                message: "upstream down".to_string()
            }
        );
    }

    #[test]
    fn test_internal_details_are_not_shown() {
        let err = WebError::Internal(anyhow::anyhow!("db password wrong"));
        assert!(!err.user_message().contains("password"));
    }

    #[test]
    fn test_response_carries_failure() {
        let response = WebError::NotFound("Article not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.extensions().get::<Failure>(),
            Some(&Failure::Page {
                message: "Article not found".to_string()
            })
        );

        let response = WebError::Forbidden("Staff only".into()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
    }

    #[test]
    fn test_is_rejection() {
        assert!(is_rejection(&ApiError::from_response(StatusCode::CONFLICT, "")));
        assert!(!is_rejection(&ApiError::from_response(StatusCode::NOT_FOUND, "")));
    }
}
