//! Admin screens
//!
//! Staff manage articles, categories, tags and the trash. Accounts and
//! permanent deletes are reserved for administrators. Every entity follows
//! the same route layout:
//! - `GET  /admin/{entity}`              list (`?q=&page=`)
//! - `GET  /admin/{entity}/new`          create form
//! - `POST /admin/{entity}`              create
//! - `GET  /admin/{entity}/{id}/edit`    edit form
//! - `POST /admin/{entity}/{id}/edit`    update
//! - `GET  /admin/{entity}/{id}/delete`  confirmation page
//! - `POST /admin/{entity}/{id}/delete`  soft or hard delete

pub mod accounts;
pub mod articles;
pub mod categories;
pub mod tags;
pub mod trash;

use axum::{
    http::{StatusCode, Uri},
    middleware as axum_middleware,
    response::{Redirect, Response},
    routing::{get, post},
    Router,
};
use tera::Context;

use crate::models::TrashEntity;
use crate::services::{DeleteMode, TrashService};
use crate::session::{Flash, Session};
use crate::validation::FormErrors;

use super::common::DeleteForm;
use super::error::{is_rejection, WebError};
use super::middleware::{self, can_hard_delete, AppState};

/// Routes open to Staff and Admin
pub fn staff_router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(|| async { Redirect::to("/admin/articles") }))
        .nest("/admin/articles", articles::router())
        .nest("/admin/categories", categories::router())
        .nest("/admin/tags", tags::router())
        .route("/admin/trash", get(trash::list))
        .route("/admin/trash/{entity}/{id}/restore", post(trash::restore))
        .route_layer(axum_middleware::from_fn(middleware::require_staff))
}

/// Routes open to Admin only
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .nest("/admin/accounts", accounts::router())
        .route("/admin/trash/{entity}/{id}/purge", post(trash::purge))
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
}

/// Listing URL of an entity's admin screen
pub fn list_url(entity: TrashEntity) -> String {
    format!("/admin/{}", entity.slug())
}

/// Delete confirmation page
pub async fn confirm_delete(
    state: &AppState,
    session: &Session,
    uri: &Uri,
    entity: TrashEntity,
    id: i64,
    title: &str,
) -> Result<Response, WebError> {
    let mut context = Context::new();
    context.insert("entity_label", entity.label());
    context.insert("title", title);
    context.insert("action", &format!("{}/{}/delete", list_url(entity), id));
    context.insert("cancel", &list_url(entity));
    context.insert("can_hard_delete", &can_hard_delete(session.role()));
    state
        .render(Some(session), uri, "confirm_delete.html", context)
        .await
}

/// Carry out a confirmed delete
///
/// Soft deletes move the record to the trash. Hard deletes are refused for
/// anyone but an administrator before the backend is called.
pub async fn delete(
    state: &AppState,
    session: &Session,
    entity: TrashEntity,
    id: i64,
    form: &DeleteForm,
) -> Result<Response, WebError> {
    let mode = DeleteMode::parse(&form.mode)
        .ok_or_else(|| WebError::BadRequest("Choose how to delete the record".to_string()))?;
    let back = list_url(entity);

    if mode == DeleteMode::Hard && !can_hard_delete(session.role()) {
        tracing::warn!(
            account_id = session.account.account_id,
            entity = %entity,
            id,
            "permanent delete refused"
        );
        return Ok(state
            .redirect_with_flash(
                session,
                &back,
                Flash::error("Only administrators can delete permanently"),
            )
            .await);
    }

    let api = state.api_for(session);
    match TrashService::new(&api).delete(entity, id, mode).await {
        Ok(()) => {
            let message = match mode {
                DeleteMode::Soft => format!("{} moved to trash", entity.label()),
                DeleteMode::Hard => format!("{} deleted permanently", entity.label()),
            };
            Ok(state.redirect_with_flash(session, &back, Flash::success(message)).await)
        }
        Err(e) if is_rejection(&e) => Ok(state
            .redirect_with_flash(
                session,
                &back,
                Flash::error(format!("Could not delete: {}", e.user_message())),
            )
            .await),
        Err(e) => Err(e.into()),
    }
}

/// Status and form-level error for a backend refusal of a write
pub fn rejected_form(err: &crate::client::ApiError) -> (StatusCode, FormErrors) {
    let status = err
        .status()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::BAD_REQUEST);
    let mut errors = FormErrors::new();
    errors.add("_form", err.user_message());
    (status, errors)
}
