//! Trash screen
//!
//! Lists soft-deleted records and restores them. Staff see articles,
//! categories and tags; accounts in the trash are visible to admins only,
//! and only admins can purge.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::models::{TrashEntity, TrashItem};
use crate::services::TrashService;
use crate::session::{Flash, Session};

use crate::web::error::WebError;
use crate::web::middleware::{AppState, CurrentSession};

const TRASH_URL: &str = "/admin/trash";

#[derive(Debug, Deserialize)]
pub struct TrashQuery {
    #[serde(default)]
    pub entity: String,
}

#[derive(Debug, Serialize)]
struct EntityOption {
    slug: &'static str,
    label: &'static str,
}

#[derive(Debug, Serialize)]
struct TrashRow {
    label: &'static str,
    slug: &'static str,
    id: i64,
    title: String,
    deleted_at: DateTime<Utc>,
    deleted_by: Option<String>,
}

impl From<TrashItem> for TrashRow {
    fn from(item: TrashItem) -> Self {
        Self {
            label: item.entity_type.label(),
            slug: item.entity_type.slug(),
            id: item.entity_id,
            title: item.title,
            deleted_at: item.deleted_at,
            deleted_by: item.deleted_by,
        }
    }
}

/// Entity kinds the viewer may manage in the trash
fn visible_entities(session: &Session) -> Vec<TrashEntity> {
    TrashEntity::ALL
        .into_iter()
        .filter(|e| *e != TrashEntity::SystemAccount || session.account.is_admin())
        .collect()
}

fn entity_from_path(session: &Session, slug: &str) -> Result<TrashEntity, WebError> {
    let entity = TrashEntity::from_slug(slug)
        .ok_or_else(|| WebError::NotFound(format!("Unknown record type '{}'", slug)))?;
    if !visible_entities(session).contains(&entity) {
        return Err(WebError::Forbidden(
            "Only administrators can manage deleted accounts".to_string(),
        ));
    }
    Ok(entity)
}

/// `GET /admin/trash[?entity=<slug>]`
pub async fn list(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<TrashQuery>,
) -> Result<Response, WebError> {
    let visible = visible_entities(&session);
    let filter = TrashEntity::from_slug(query.entity.trim()).filter(|e| visible.contains(e));

    let items = TrashService::new(&state.api_for(&session)).list(filter).await?;
    let rows: Vec<TrashRow> = items
        .into_iter()
        .filter(|item| visible.contains(&item.entity_type))
        .map(TrashRow::from)
        .collect();

    let entities: Vec<EntityOption> = visible
        .iter()
        .map(|e| EntityOption {
            slug: e.slug(),
            label: e.label(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("entities", &entities);
    context.insert("entity", filter.map(|e| e.slug()).unwrap_or(""));
    context.insert("items", &rows);
    state
        .render(Some(&session), &uri, "admin/trash.html", context)
        .await
}

/// `POST /admin/trash/{entity}/{id}/restore`
pub async fn restore(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path((slug, id)): Path<(String, i64)>,
) -> Result<Response, WebError> {
    let entity = entity_from_path(&session, &slug)?;
    TrashService::new(&state.api_for(&session))
        .restore(entity, id)
        .await?;
    Ok(state
        .redirect_with_flash(
            &session,
            TRASH_URL,
            Flash::success(format!("{} restored", entity.label())),
        )
        .await)
}

/// `POST /admin/trash/{entity}/{id}/purge` (Admin only)
pub async fn purge(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path((slug, id)): Path<(String, i64)>,
) -> Result<Response, WebError> {
    let entity = entity_from_path(&session, &slug)?;
    TrashService::new(&state.api_for(&session))
        .purge(entity, id)
        .await?;
    Ok(state
        .redirect_with_flash(
            &session,
            TRASH_URL,
            Flash::success(format!("{} deleted permanently", entity.label())),
        )
        .await)
}
