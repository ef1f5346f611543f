//! Article management

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, Uri},
    response::Response,
    routing::get,
    Form, Router,
};
use tera::Context;

use crate::models::{Pagination, TrashEntity};
use crate::services::{CategoryService, NewsQuery, NewsService, TagService};
use crate::session::{Flash, Session};
use crate::validation::{ArticleForm, FormErrors};

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

/// Both statuses, newest first
async fn list(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let api = state.api_for(&session);
    let page = Pagination::request(query.page, state.config.ui.admin_page_size);
    let articles = NewsService::new(&api)
        .search(&NewsQuery::admin(query.keyword()), page)
        .await?;

    let mut context = Context::new();
    context.insert("q", query.keyword());
    context.insert("pagination", &articles.pagination);
    context.insert("pager_url", &pager_url("/admin/articles", query.keyword()));
    context.insert("articles", &articles);
    state
        .render(Some(&session), &uri, "admin/articles.html", context)
        .await
}

/// Render the article form with its category and tag choices
async fn render_form(
    state: &AppState,
    session: &Session,
    uri: &Uri,
    status: StatusCode,
    target: Option<i64>,
    form: &ArticleForm,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let api = state.api_for(session);
    let categories = CategoryService::new(&api);
    let tags = TagService::new(&api);
    let (categories, tags) = futures::try_join!(categories.active(), tags.all())?;

    let (heading, action) = match target {
        Some(id) => ("Edit article".to_string(), format!("/admin/articles/{}/edit", id)),
        None => ("New article".to_string(), "/admin/articles".to_string()),
    };

    let mut context = Context::new();
    context.insert("heading", &heading);
    context.insert("action", &action);
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("categories", &categories);
    context.insert("tags", &tags);
    state
        .render_with_status(status, Some(session), uri, "admin/article_form.html", context)
        .await
}

async fn new_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, WebError> {
    let form = ArticleForm {
        news_status: "1".to_string(),
        ..ArticleForm::default()
    };
    render_form(&state, &session, &uri, StatusCode::OK, None, &form, &FormErrors::new()).await
}

async fn create(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, WebError> {
    let form = ArticleForm::from_pairs(pairs);
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, &uri, StatusCode::BAD_REQUEST, None, &form, &errors).await
        }
    };

    match NewsService::new(&state.api_for(&session)).create(&input).await {
        Ok(article) => {
            tracing::info!(
                account_id = session.account.account_id,
                id = article.news_article_id,
                "article created"
            );
            Ok(state
                .redirect_with_flash(
                    &session,
                    "/admin/articles",
                    Flash::success(format!("Article \"{}\" created", article.news_title)),
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
    let article = NewsService::new(&state.api_for(&session)).get(id).await?;
    let form = ArticleForm::from(&article);
    render_form(&state, &session, &uri, StatusCode::OK, Some(id), &form, &FormErrors::new()).await
}

async fn update(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, WebError> {
    let form = ArticleForm::from_pairs(pairs);
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return render_form(&state, &session, &uri, StatusCode::BAD_REQUEST, Some(id), &form, &errors)
                .await
        }
    };

    match NewsService::new(&state.api_for(&session)).update(id, &input).await {
        Ok(()) => {
            tracing::info!(account_id = session.account.account_id, id, "article updated");
            Ok(state
                .redirect_with_flash(&session, "/admin/articles", Flash::success("Article updated"))
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
    let article = NewsService::new(&state.api_for(&session)).get(id).await?;
    super::confirm_delete(&state, &session, &uri, TrashEntity::NewsArticle, id, &article.news_title).await
}

async fn delete(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, WebError> {
    super::delete(&state, &session, TrashEntity::NewsArticle, id, &form).await
}

