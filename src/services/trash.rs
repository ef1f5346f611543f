//! Trash service
//!
//! Soft delete, restore, and permanent delete for every entity set, plus the
//! listing of soft-deleted records. The entity services delegate their
//! delete calls here so the endpoint layout lives in one place:
//! - `DELETE /api/{Set}/{id}`            soft delete (moves to trash)
//! - `PUT    /api/{Set}/{id}/restore`    restore from trash
//! - `DELETE /api/{Set}/{id}/permanent`  hard delete
//! - `GET    /api/Trash[?entityType=..]` list trash

use crate::client::{ApiClient, ApiError};
use crate::models::{TrashEntity, TrashItem};

/// Delete flavour chosen on the confirmation page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Move to trash; can be restored
    Soft,
    /// Remove permanently
    Hard,
}

impl DeleteMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "soft" | "trash" => Some(DeleteMode::Soft),
            "hard" | "permanent" => Some(DeleteMode::Hard),
            _ => None,
        }
    }
}

pub struct TrashService<'a> {
    client: &'a ApiClient,
}

impl<'a> TrashService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List soft-deleted records, newest first, optionally of one kind
    ///
    /// Rows that do not decode (an entity type this front-end does not know)
    /// are skipped with a warning.
    pub async fn list(&self, entity: Option<TrashEntity>) -> Result<Vec<TrashItem>, ApiError> {
        let mut url = self.client.api_url("Trash");
        if let Some(entity) = entity {
            url = format!("{}?entityType={}", url, urlencoding::encode(&format!("{:?}", entity)));
        }
        let rows: Vec<serde_json::Value> = self.client.get_json(&url).await?;
        let mut items: Vec<TrashItem> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<TrashItem>(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable trash row");
                    None
                }
            })
            .collect();
        items.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(items)
    }

    pub async fn soft_delete(&self, entity: TrashEntity, id: i64) -> Result<(), ApiError> {
        let url = self.client.api_url(&format!("{}/{}", entity.entity_set(), id));
        self.client.delete(&url).await?;
        tracing::info!(entity = %entity, id, "moved to trash");
        Ok(())
    }

    pub async fn hard_delete(&self, entity: TrashEntity, id: i64) -> Result<(), ApiError> {
        let url = self
            .client
            .api_url(&format!("{}/{}/permanent", entity.entity_set(), id));
        self.client.delete(&url).await?;
        tracing::info!(entity = %entity, id, "deleted permanently");
        Ok(())
    }

    pub async fn delete(&self, entity: TrashEntity, id: i64, mode: DeleteMode) -> Result<(), ApiError> {
        match mode {
            DeleteMode::Soft => self.soft_delete(entity, id).await,
            DeleteMode::Hard => self.hard_delete(entity, id).await,
        }
    }

    pub async fn restore(&self, entity: TrashEntity, id: i64) -> Result<(), ApiError> {
        let url = self
            .client
            .api_url(&format!("{}/{}/restore", entity.entity_set(), id));
        self.client.put_empty(&url).await?;
        tracing::info!(entity = %entity, id, "restored from trash");
        Ok(())
    }

    /// Permanently remove a record that is already in the trash
    pub async fn purge(&self, entity: TrashEntity, id: i64) -> Result<(), ApiError> {
        self.hard_delete(entity, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(&BackendConfig {
            base_url: server.url(),
            ..BackendConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_delete_mode_parse() {
        assert_eq!(DeleteMode::parse("soft"), Some(DeleteMode::Soft));
        assert_eq!(DeleteMode::parse("HARD"), Some(DeleteMode::Hard));
        assert_eq!(DeleteMode::parse("permanent"), Some(DeleteMode::Hard));
        assert_eq!(DeleteMode::parse("archive"), None);
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/Trash")
            .match_query(Matcher::UrlEncoded("entityType".into(), "Tag".into()))
            .with_status(200)
            .with_body(
                r#"[
                    {"EntityType":"Tag","EntityId":1,"Title":"old","DeletedAt":"2024-01-01T00:00:00Z"},
                    {"EntityType":"Tag","EntityId":2,"Title":"newer","DeletedAt":"2024-02-01T00:00:00Z"}
                ]"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let items = TrashService::new(&client).list(Some(TrashEntity::Tag)).await.unwrap();

        assert_eq!(items.iter().map(|i| i.entity_id).collect::<Vec<_>>(), vec![2, 1]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_skips_unknown_rows() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/Trash")
            .with_status(200)
            .with_body(
                r#"[
                    {"EntityType":"Comment","EntityId":9,"Title":"spam","DeletedAt":"2024-03-01T00:00:00Z"},
                    {"EntityType":"Category","EntityId":4,"Title":"Events","DeletedAt":"2024-02-01T00:00:00Z"}
                ]"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let items = TrashService::new(&client).list(None).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].entity_type, TrashEntity::Category);
        assert_eq!(items[0].entity_id, 4);
    }

    #[tokio::test]
    async fn test_delete_modes_hit_distinct_endpoints() {
        let mut server = mockito::Server::new_async().await;
        let soft = server
            .mock("DELETE", "/api/NewsArticles/5")
            .with_status(204)
            .create_async()
            .await;
        let hard = server
            .mock("DELETE", "/api/NewsArticles/6/permanent")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        let trash = TrashService::new(&client);
        trash.delete(TrashEntity::NewsArticle, 5, DeleteMode::Soft).await.unwrap();
        trash.delete(TrashEntity::NewsArticle, 6, DeleteMode::Hard).await.unwrap();

        soft.assert_async().await;
        hard.assert_async().await;
    }

    #[tokio::test]
    async fn test_restore() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/Categories/3/restore")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server);
        TrashService::new(&client).restore(TrashEntity::Category, 3).await.unwrap();
        mock.assert_async().await;
    }
}
