//! Sign in and sign out

use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tera::Context;

use crate::services::AuthService;
use crate::session::{Flash, Session};
use crate::validation::{is_valid_email, FormErrors};

use super::common::safe_next;
use super::error::WebError;
use super::middleware::{clear_session_cookie, session_cookie, AppState, MaybeSession};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

async fn render_login(
    state: &AppState,
    uri: &Uri,
    status: StatusCode,
    email: &str,
    next: &str,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let mut context = Context::new();
    context.insert("email", email);
    context.insert("next", next);
    context.insert("errors", errors);
    state
        .render_with_status(status, None, uri, "login.html", context)
        .await
}

/// `GET /login`
pub async fn login_page(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<LoginQuery>,
) -> Result<Response, WebError> {
    let next = safe_next(query.next.as_deref());
    if session.is_some() {
        return Ok(Redirect::to(&next).into_response());
    }
    render_login(&state, &uri, StatusCode::OK, "", &next, &FormErrors::new()).await
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let next = safe_next(Some(&form.next));
    let email = form.email.trim();

    let mut errors = FormErrors::new();
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Email is not valid");
    }
    if form.password.is_empty() {
        errors.add("password", "Password is required");
    }
    if !errors.is_empty() {
        return render_login(&state, &uri, StatusCode::BAD_REQUEST, email, &next, &errors).await;
    }

    let auth = match AuthService::new(&state.api).login(email, &form.password).await {
        Ok(auth) => auth,
        Err(e) if matches!(e.status(), Some(400 | 401 | 403 | 404)) => {
            tracing::info!(email, "sign in rejected");
            errors.add("_form", "Invalid email or password");
            return render_login(&state, &uri, StatusCode::UNAUTHORIZED, email, &next, &errors).await;
        }
        Err(e) => return Err(e.into()),
    };

    let session = Session::from_auth(auth);
    state.sessions.put(session.clone()).await?;
    if let Err(e) = state
        .sessions
        .set_flash(
            &session.id,
            Flash::success(format!("Welcome, {}", session.account.account_name)),
        )
        .await
    {
        tracing::warn!(error = %e, "failed to store flash");
    }

    Ok((
        [(header::SET_COOKIE, session_cookie(&state.config.session, &session.id))],
        Redirect::to(&next),
    )
        .into_response())
}

/// `POST /logout`
pub async fn logout(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response, WebError> {
    if let Some(session) = session {
        state.sessions.remove(&session.id).await?;
        tracing::info!(account_id = session.account.account_id, "signed out");
    }
    Ok((
        [(header::SET_COOKIE, clear_session_cookie(&state.config.session))],
        Redirect::to("/"),
    )
        .into_response())
}
