//! Public pages
//!
//! News listing with search, article detail, category pages and the live
//! search endpoint behind the search box.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::models::{NewsArticle, Pagination};
use crate::services::{CategoryService, NewsQuery, NewsService};
use crate::session::Session;

use super::common::{pager_url, ListQuery};
use super::error::WebError;
use super::middleware::{AppState, MaybeSession};

fn viewer_is_staff(session: &Option<Session>) -> bool {
    session.as_ref().is_some_and(|s| s.account.is_staff())
}

/// `GET /` - active news, newest first, with keyword search
pub async fn home(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let page = Pagination::request(query.page, state.config.ui.page_size);
    let search = NewsQuery::public(query.keyword());
    let news = NewsService::new(&state.api);
    let categories = CategoryService::new(&state.api);

    let (articles, categories) =
        futures::try_join!(news.search(&search, page), categories.active())?;

    let mut context = Context::new();
    context.insert("q", query.keyword());
    context.insert("pagination", &articles.pagination);
    context.insert("pager_url", &pager_url("/", query.keyword()));
    context.insert("articles", &articles);
    context.insert("categories", &categories);
    state.render(session.as_ref(), &uri, "home.html", context).await
}

/// `GET /news/{id}`
///
/// Inactive articles are only shown to staff.
pub async fn article(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let staff = viewer_is_staff(&session);
    let api = match &session {
        Some(session) if staff => state.api_for(session),
        _ => state.api.clone(),
    };

    let article = NewsService::new(&api).get(id).await?;
    if !article.is_active() && !staff {
        return Err(WebError::NotFound("Article not found".to_string()));
    }

    let mut context = Context::new();
    context.insert("body_html", &state.markdown.render(&article.news_content));
    context.insert("article", &article);
    state.render(session.as_ref(), &uri, "article.html", context).await
}

/// `GET /categories/{id}` - active news filed under one category
pub async fn category(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let page = Pagination::request(query.page, state.config.ui.page_size);
    let categories = CategoryService::new(&state.api);
    let news = NewsService::new(&state.api);

    let (category, articles) = futures::try_join!(categories.get(id), news.by_category(id, page))?;
    if !category.is_active && !viewer_is_staff(&session) {
        return Err(WebError::NotFound("Category not found".to_string()));
    }

    let mut context = Context::new();
    context.insert("pagination", &articles.pagination);
    context.insert("pager_url", &pager_url(&format!("/categories/{}", id), ""));
    context.insert("category", &category);
    context.insert("articles", &articles);
    state.render(session.as_ref(), &uri, "category.html", context).await
}

#[derive(Debug, Deserialize)]
pub struct LiveSearchQuery {
    #[serde(default)]
    pub q: String,
    /// Per-tab id used to debounce visitors without a session
    pub client: Option<String>,
}

/// One live search suggestion
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub id: i64,
    pub title: String,
    pub headline: String,
    pub url: String,
}

impl From<NewsArticle> for Suggestion {
    fn from(article: NewsArticle) -> Self {
        Self {
            url: format!("/news/{}", article.news_article_id),
            id: article.news_article_id,
            title: article.news_title,
            headline: article.headline,
        }
    }
}

/// `GET /search/live?q=..` - JSON suggestions for the search box
///
/// Calls from the same session (or browser tab) are debounced: a call
/// overtaken by a newer one during the delay answers 204 and never reaches
/// the backend.
pub async fn live_search(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Query(query): Query<LiveSearchQuery>,
) -> Response {
    let keyword = query.q.trim();
    if keyword.is_empty() {
        return Json(Vec::<Suggestion>::new()).into_response();
    }

    let key = session
        .map(|s| s.id)
        .or(query.client.filter(|c| !c.trim().is_empty()));
    if let Some(key) = key {
        if !state.debouncer.settle(&key).await {
            return StatusCode::NO_CONTENT.into_response();
        }
    }

    match NewsService::new(&state.api)
        .suggest(keyword, state.config.ui.live_search_limit)
        .await
    {
        Ok(articles) => {
            let suggestions: Vec<Suggestion> = articles.into_iter().map(Suggestion::from).collect();
            Json(suggestions).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "live search failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.user_message() })),
            )
                .into_response()
        }
    }
}

/// Any unmatched path
pub async fn not_found() -> WebError {
    WebError::NotFound("Page not found".to_string())
}

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}
