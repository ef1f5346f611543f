//! Web middleware
//!
//! Contains:
//! - Application state shared by every handler
//! - Session loading from the cookie, with token refresh
//! - Role guards (signed in, staff, admin)
//! - Finishing failed responses (login redirects, flashes, error page)

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use anyhow::Context as _;
use std::sync::Arc;
use tera::Context;

use crate::client::ApiClient;
use crate::config::{Config, SessionConfig};
use crate::models::AccountRole;
use crate::services::{AuthService, MarkdownRenderer, SearchDebouncer};
use crate::session::{Flash, MemorySessionStore, Session, SessionStore};
use crate::view::{PageVars, Renderer};

use super::common::referer_path;
use super::error::{Failure, WebError};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Anonymous backend client; signed-in calls go through [`AppState::api_for`]
    pub api: ApiClient,
    pub sessions: Arc<dyn SessionStore>,
    pub renderer: Arc<Renderer>,
    pub markdown: MarkdownRenderer,
    pub debouncer: SearchDebouncer,
}

impl AppState {
    /// Build state from configuration with the in-memory session store
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let renderer = match &config.ui.templates_dir {
            Some(dir) => Renderer::with_overrides(dir)
                .with_context(|| format!("Failed to load templates from {}", dir.display()))?,
            None => Renderer::new().context("Failed to load embedded templates")?,
        };
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(config.session.ttl()));
        Self::with_parts(config, sessions, renderer)
    }

    /// Build state around an existing session store and renderer
    pub fn with_parts(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        renderer: Renderer,
    ) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.backend).context("Failed to create backend client")?;
        let debouncer = SearchDebouncer::new(config.ui.search_debounce());
        Ok(Self {
            config: Arc::new(config),
            api,
            sessions,
            renderer: Arc::new(renderer),
            markdown: MarkdownRenderer::new(),
            debouncer,
        })
    }

    /// Backend client carrying the session's bearer token
    pub fn api_for(&self, session: &Session) -> ApiClient {
        self.api.authorized(&session.access_token)
    }

    /// Render a page with status 200
    pub async fn render(
        &self,
        session: Option<&Session>,
        uri: &Uri,
        template: &str,
        context: Context,
    ) -> Result<Response, WebError> {
        self.render_with_status(StatusCode::OK, session, uri, template, context)
            .await
    }

    /// Render a page, consuming the session's pending flash
    pub async fn render_with_status(
        &self,
        status: StatusCode,
        session: Option<&Session>,
        uri: &Uri,
        template: &str,
        context: Context,
    ) -> Result<Response, WebError> {
        let flash = match session {
            Some(session) => self.sessions.take_flash(&session.id).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to read flash");
                None
            }),
            None => None,
        };
        let vars = PageVars::new(&self.config.ui.site_name, request_path(uri))
            .with_account(session.map(|s| s.account.clone()))
            .with_flash(flash);
        let html = self.renderer.render_page(template, &context, &vars)?;
        Ok((status, Html(html)).into_response())
    }

    /// Queue a flash for the next page and redirect there
    pub async fn redirect_with_flash(&self, session: &Session, to: &str, flash: Flash) -> Response {
        if let Err(e) = self.sessions.set_flash(&session.id, flash).await {
            tracing::warn!(error = %e, "failed to store flash");
        }
        Redirect::to(to).into_response()
    }
}

/// Signed-in session, inserted by [`load_session`]
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or(WebError::LoginRequired)
    }
}

/// Session when signed in, `None` for visitors
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(
            parts.extensions.get::<CurrentSession>().map(|s| s.0.clone()),
        ))
    }
}

/// Path and query of a request, used for `next` and Retry links
pub fn request_path(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Read the session id from the cookie header
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that starts a session
pub fn session_cookie(config: &SessionConfig, id: &str) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name, id, config.ttl_seconds
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that ends a session
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", config.cookie_name);
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn set_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "invalid session cookie"),
    }
}

/// Session loading middleware
///
/// Looks up the session named by the cookie, refreshes the backend token
/// when it is about to expire, and inserts [`CurrentSession`]. A session
/// that cannot be refreshed is ended and its cookie cleared.
pub async fn load_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(id) = session_id_from_headers(request.headers(), &state.config.session.cookie_name) else {
        return next.run(request).await;
    };

    let stored = match state.sessions.get(&id).await {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(error = %e, "session lookup failed");
            None
        }
    };

    let session = match stored {
        Some(session) => refresh_if_needed(&state, session).await,
        None => None,
    };

    match session {
        Some(session) => {
            request.extensions_mut().insert(CurrentSession(session));
            next.run(request).await
        }
        None => {
            if let Err(e) = state.sessions.remove(&id).await {
                tracing::warn!(error = %e, "failed to remove stale session");
            }
            let mut response = next.run(request).await;
            set_cookie(&mut response, &clear_session_cookie(&state.config.session));
            response
        }
    }
}

async fn refresh_if_needed(state: &AppState, mut session: Session) -> Option<Session> {
    let margin = chrono::Duration::seconds(state.config.session.refresh_margin_seconds);
    if !session.needs_refresh(margin) {
        return Some(session);
    }

    let Some(refresh_token) = session.refresh_token.clone() else {
        // Without a refresh token the session lives until the token expires
        let expired = session.expires_at.is_some_and(|at| at <= chrono::Utc::now());
        return (!expired).then_some(session);
    };

    match AuthService::new(&state.api).refresh(&refresh_token).await {
        Ok(auth) => {
            session.apply_refresh(auth);
            if let Err(e) = state.sessions.put(session.clone()).await {
                tracing::warn!(error = %e, "failed to store refreshed session");
            }
            tracing::debug!(account_id = session.account.account_id, "refreshed backend token");
            Some(session)
        }
        Err(e) => {
            tracing::info!(account_id = session.account.account_id, error = %e, "token refresh failed, ending session");
            None
        }
    }
}

/// Authentication middleware
pub async fn require_auth(request: Request, next: Next) -> Result<Response, WebError> {
    if request.extensions().get::<CurrentSession>().is_none() {
        return Err(WebError::LoginRequired);
    }
    Ok(next.run(request).await)
}

/// Staff authorization middleware (Staff or Admin)
pub async fn require_staff(request: Request, next: Next) -> Result<Response, WebError> {
    let session = request
        .extensions()
        .get::<CurrentSession>()
        .ok_or(WebError::LoginRequired)?;

    if !session.0.account.is_staff() {
        return Err(WebError::Forbidden(
            "You do not have access to the news management pages".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Admin authorization middleware
pub async fn require_admin(request: Request, next: Next) -> Result<Response, WebError> {
    let session = request
        .extensions()
        .get::<CurrentSession>()
        .ok_or(WebError::LoginRequired)?;

    if !session.0.account.is_admin() {
        return Err(WebError::Forbidden(
            "Only administrators can do that".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Permanent deletes are reserved for administrators
pub fn can_hard_delete(role: AccountRole) -> bool {
    role == AccountRole::Admin
}

/// Failure finishing middleware
///
/// Turns the [`Failure`] recorded by `WebError` into the final response:
/// a login redirect carrying `next`, a flash on the home page, or the
/// error page with a Retry link back to where the user was.
pub async fn render_failures(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let referer = request
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let session = request.extensions().get::<CurrentSession>().map(|s| s.0.clone());

    let response = next.run(request).await;
    let Some(failure) = response.extensions().get::<Failure>().cloned() else {
        return response;
    };

    // Where the user was when it failed; POSTs go back to the page with the form
    let origin = if method == Method::GET || method == Method::HEAD {
        request_path(&uri)
    } else {
        referer
            .as_deref()
            .and_then(referer_path)
            .unwrap_or_else(|| request_path(&uri))
    };

    match failure {
        Failure::Login { end_session } => {
            let target = if origin.starts_with('/') && method == Method::GET {
                format!("/login?next={}", urlencoding::encode(&origin))
            } else {
                "/login".to_string()
            };
            let mut redirect = Redirect::to(&target).into_response();
            if end_session {
                if let Some(session) = &session {
                    if let Err(e) = state.sessions.remove(&session.id).await {
                        tracing::warn!(error = %e, "failed to end rejected session");
                    }
                    tracing::info!(account_id = session.account.account_id, "backend rejected token, session ended");
                }
                set_cookie(&mut redirect, &clear_session_cookie(&state.config.session));
            }
            redirect
        }
        Failure::Denied { message } => {
            tracing::info!(path = %uri.path(), %message, "access denied");
            match &session {
                Some(session) => state.redirect_with_flash(session, "/", Flash::error(message)).await,
                None => Redirect::to("/").into_response(),
            }
        }
        Failure::Page { message } => {
            let status = response.status();
            let mut context = Context::new();
            context.insert("status", &status.as_u16());
            context.insert("message", &message);
            context.insert("retry", &origin);
            let vars = PageVars::new(&state.config.ui.site_name, request_path(&uri))
                .with_account(session.map(|s| s.account));
            match state.renderer.render_page("error.html", &context, &vars) {
                Ok(html) => (status, Html(html)).into_response(),
                Err(e) => {
                    tracing::error!(error = %e, "failed to render error page");
                    (status, message).into_response()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; funews_session=abc123; other=1"),
        );
        assert_eq!(
            session_id_from_headers(&headers, "funews_session"),
            Some("abc123".to_string())
        );
        assert_eq!(session_id_from_headers(&headers, "missing"), None);

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("funews_session="));
        assert_eq!(session_id_from_headers(&empty, "funews_session"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut config = SessionConfig::default();
        let cookie = session_cookie(&config, "abc");
        assert_eq!(
            cookie,
            "funews_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400"
        );

        config.secure = true;
        assert!(session_cookie(&config, "abc").ends_with("; Secure"));
        assert!(clear_session_cookie(&config).contains("Max-Age=0"));
    }

    #[test]
    fn test_request_path_keeps_query() {
        let uri: Uri = "/admin/tags?q=exam&page=2".parse().unwrap();
        assert_eq!(request_path(&uri), "/admin/tags?q=exam&page=2");
    }

    #[test]
    fn test_only_admin_can_hard_delete() {
        assert!(can_hard_delete(AccountRole::Admin));
        assert!(!can_hard_delete(AccountRole::Staff));
        assert!(!can_hard_delete(AccountRole::Lecturer));
    }
}
