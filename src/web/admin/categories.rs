//! Category management

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, Uri},
    response::Response,
    routing::get,
    Form, Router,
};
use tera::Context;

use crate::models::{Pagination, TrashEntity};
use crate::services::CategoryService;
use crate::session::{Flash, Session};
use crate::validation::{CategoryForm, FormErrors};

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
    let categories = CategoryService::new(&api).list(query.keyword(), page).await?;

    let mut context = Context::new();
    context.insert("q", query.keyword());
    context.insert("pagination", &categories.pagination);
    context.insert("pager_url", &pager_url("/admin/categories", query.keyword()));
    context.insert("categories", &categories);
    state
        .render(Some(&session), &uri, "admin/categories.html", context)
        .await
}

/// Render the category form; a category cannot be its own parent
async fn render_form(
    state: &AppState,
    session: &Session,
    uri: &Uri,
    status: StatusCode,
    target: Option<i64>,
    form: &CategoryForm,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let mut parents = CategoryService::new(&state.api_for(session)).all().await?;
    parents.retain(|c| Some(c.category_id) != target);

    let (heading, action) = match target {
        Some(id) => ("Edit category".to_string(), format!("/admin/categories/{}/edit", id)),
        None => ("New category".to_string(), "/admin/categories".to_string()),
    };

    let mut context = Context::new();
    context.insert("heading", &heading);
    context.insert("action", &action);
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("parents", &parents);
    state
        .render_with_status(status, Some(session), uri, "admin/category_form.html", context)
        .await
}

async fn new_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, WebError> {
    let form = CategoryForm {
        is_active: Some("on".to_string()),
        ..CategoryForm::default()
    };
    render_form(&state, &session, &uri, StatusCode::OK, None, &form, &FormErrors::new()).await
}

async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<CategoryForm>,
) -> Result<Response, WebError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, &uri, StatusCode::BAD_REQUEST, None, &form, &errors).await
        }
    };

    match CategoryService::new(&state.api_for(&session)).create(&input).await {
        Ok(category) => {
            tracing::info!(id = category.category_id, "category created");
            Ok(state
                .redirect_with_flash(
                    &session,
                    "/admin/categories",
                    Flash::success(format!("Category \"{}\" created", category.category_name)),
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
    let category = CategoryService::new(&state.api_for(&session)).get(id).await?;
    let form = CategoryForm::from(&category);
    render_form(&state, &session, &uri, StatusCode::OK, Some(id), &form, &FormErrors::new()).await
}

async fn update(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Form(form): Form<CategoryForm>,
) -> Result<Response, WebError> {
    let mut result = form.validate();
    if let Ok(input) = &result {
        if input.parent_category_id == Some(id) {
            let mut errors = FormErrors::new();
            errors.add("parent_category_id", "A category cannot be its own parent");
            result = Err(errors);
        }
    }
    let input = match result {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, &uri, StatusCode::BAD_REQUEST, Some(id), &form, &errors)
                .await
        }
    };

    match CategoryService::new(&state.api_for(&session)).update(id, &input).await {
        Ok(()) => {
            tracing::info!(id, "category updated");
            Ok(state
                .redirect_with_flash(&session, "/admin/categories", Flash::success("Category updated"))
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
    let category = CategoryService::new(&state.api_for(&session)).get(id).await?;
    super::confirm_delete(&state, &session, &uri, TrashEntity::Category, id, &category.category_name)
        .await
}

async fn delete(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, WebError> {
    super::delete(&state, &session, TrashEntity::Category, id, &form).await
}
