//! Tag management

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, Uri},
    response::Response,
    routing::get,
    Form, Router,
};
use tera::Context;

use crate::models::{Pagination, TrashEntity};
use crate::services::TagService;
use crate::session::{Flash, Session};
use crate::validation::{FormErrors, TagForm};

use crate::web::common::{pager_url, DeleteForm, ListQuery};
use crate::web::error::{is_rejection, WebError};
use crate::web::middleware::{AppState, CurrentSession};
use super::rejected_form;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/new", get(new_form))
        .route("/{id}/edit", get(edit_form).post(update))
        .route("/{id}/delete", get(confirm_delete).post(delete))
}

async fn list(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let api = state.api_for(&session);
    let page = Pagination::request(query.page, state.config.ui.admin_page_size);
    let tags = TagService::new(&api).list(query.keyword(), page).await?;

    let mut context = Context::new();
    context.insert("q", query.keyword());
    context.insert("pagination", &tags.pagination);
    context.insert("pager_url", &pager_url("/admin/tags", query.keyword()));
    context.insert("tags", &tags);
    state.render(Some(&session), &uri, "admin/tags.html", context).await
}

async fn render_form(
    state: &AppState,
    session: &Session,
    uri: &Uri,
    status: StatusCode,
    target: Option<i64>,
    form: &TagForm,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let (heading, action) = match target {
        Some(id) => ("Edit tag".to_string(), format!("/admin/tags/{}/edit", id)),
        None => ("New tag".to_string(), "/admin/tags".to_string()),
    };

    let mut context = Context::new();
    context.insert("heading", &heading);
    context.insert("action", &action);
    context.insert("form", form);
    context.insert("errors", errors);
    state
        .render_with_status(status, Some(session), uri, "admin/tag_form.html", context)
        .await
}

async fn new_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, WebError> {
    render_form(&state, &session, &uri, StatusCode::OK, None, &TagForm::default(), &FormErrors::new()).await
}

async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<TagForm>,
) -> Result<Response, WebError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, &uri, StatusCode::BAD_REQUEST, None, &form, &errors).await
        }
    };

    match TagService::new(&state.api_for(&session)).create(&input).await {
        Ok(tag) => {
            tracing::info!(id = tag.tag_id, "tag created");
            Ok(state
                .redirect_with_flash(
                    &session,
                    "/admin/tags",
                    Flash::success(format!("Tag \"{}\" created", tag.tag_name)),
                )
                .await)
        }
        Err(e) if is_rejection(&e) => {
            let (status, errors) = rejected_form(&e);
            render_form(&state, &session, &uri, status, None, &form, &errors).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn edit_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let tag = TagService::new(&state.api_for(&session)).get(id).await?;
    render_form(&state, &session, &uri, StatusCode::OK, Some(id), &TagForm::from(&tag), &FormErrors::new())
        .await
}

async fn update(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Form(form): Form<TagForm>,
) -> Result<Response, WebError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, &uri, StatusCode::BAD_REQUEST, Some(id), &form, &errors)
                .await
        }
    };

    match TagService::new(&state.api_for(&session)).update(id, &input).await {
        Ok(()) => {
            tracing::info!(id, "tag updated");
            Ok(state
                .redirect_with_flash(&session, "/admin/tags", Flash::success("Tag updated"))
                .await)
        }
        Err(e) if is_rejection(&e) => {
            let (status, errors) = rejected_form(&e);
            render_form(&state, &session, &uri, status, Some(id), &form, &errors).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn confirm_delete(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let tag = TagService::new(&state.api_for(&session)).get(id).await?;
    super::confirm_delete(&state, &session, &uri, TrashEntity::Tag, id, &tag.tag_name).await
}

async fn delete(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, WebError> {
    super::delete(&state, &session, TrashEntity::Tag, id, &form).await
}
