//! Category service
//!
//! Listing, lookup and maintenance of news categories. Active categories
//! feed the public navigation and the article form's category picker.

use crate::client::odata::{self, Direction, ODataPage, ODataQuery};
use crate::client::{ApiClient, ApiError};
use crate::models::{Category, CategoryInput, Paged, Pagination, TrashEntity};
use crate::services::trash::TrashService;

const ENTITY_SET: &str = "Categories";
const SEARCH_FIELDS: &[&str] = &["CategoryName", "CategoryDescription"];

pub struct CategoryService<'a> {
    client: &'a ApiClient,
}

impl<'a> CategoryService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of categories whose name or description matches
    pub async fn list(&self, keyword: &str, page: Pagination) -> Result<Paged<Category>, ApiError> {
        let url = ODataQuery::new()
            .filter_opt(odata::keyword_filter(SEARCH_FIELDS, keyword))
            .order_by("CategoryName", Direction::Asc)
            .page(&page)
            .apply(&self.client.odata_url(ENTITY_SET));

        let result: ODataPage<Category> = self.client.get_json(&url).await?;
        Ok(result.into_paged(page))
    }

    /// Every category, sorted by name
    pub async fn all(&self) -> Result<Vec<Category>, ApiError> {
        let url = ODataQuery::new()
            .order_by("CategoryName", Direction::Asc)
            .apply(&self.client.odata_url(ENTITY_SET));
        let result: ODataPage<Category> = self.client.get_json(&url).await?;
        Ok(result.value)
    }

    /// Active categories, sorted by name
    pub async fn active(&self) -> Result<Vec<Category>, ApiError> {
        let url = ODataQuery::new()
            .filter(odata::eq("IsActive", true))
            .order_by("CategoryName", Direction::Asc)
            .apply(&self.client.odata_url(ENTITY_SET));
        let result: ODataPage<Category> = self.client.get_json(&url).await?;
        Ok(result.value)
    }

    pub async fn get(&self, id: i64) -> Result<Category, ApiError> {
        let url = self.client.odata_url(&format!("{}({})", ENTITY_SET, id));
        self.client.get_json(&url).await
    }

    pub async fn create(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let category: Category = self
            .client
            .post_json(&self.client.api_url(ENTITY_SET), input)
            .await?;
        tracing::info!(id = category.category_id, name = %category.category_name, "category created");
        Ok(category)
    }

    pub async fn update(&self, id: i64, input: &CategoryInput) -> Result<(), ApiError> {
        let url = self.client.api_url(&format!("{}/{}", ENTITY_SET, id));
        self.client.put_json(&url, input).await?;
        tracing::info!(id, "category updated");
        Ok(())
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), ApiError> {
        TrashService::new(self.client).soft_delete(TrashEntity::Category, id).await
    }

    pub async fn hard_delete(&self, id: i64) -> Result<(), ApiError> {
        TrashService::new(self.client).hard_delete(TrashEntity::Category, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(&BackendConfig {
            base_url: server.url(),
            ..BackendConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_active_filters_on_flag() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/odata/Categories")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$filter".into(), "IsActive eq true".into()),
                Matcher::UrlEncoded("$orderby".into(), "CategoryName asc".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"value": [
                    {"CategoryId": 1, "CategoryName": "Academic", "IsActive": true},
                    {"CategoryId": 2, "CategoryName": "Events", "IsActive": true}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let categories = CategoryService::new(&client).active().await.unwrap();

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].category_name, "Academic");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_with_keyword() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/odata/Categories")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "$filter".into(),
                    "(contains(tolower(CategoryName),'event') or contains(tolower(CategoryDescription),'event'))".into(),
                ),
                Matcher::UrlEncoded("$top".into(), "10".into()),
                Matcher::UrlEncoded("$skip".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"@odata.count": 1, "value": [{"CategoryId": 2, "CategoryName": "Events"}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let page = CategoryService::new(&client)
            .list("Event", Pagination::request(1, 10))
            .await
            .unwrap();

        assert_eq!(page.pagination.total_count, 1);
        assert_eq!(page.items[0].category_id, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_puts_input() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/Categories/2")
            .match_body(Matcher::Json(json!({
                "CategoryName": "Events",
                "CategoryDescription": "Campus events",
                "IsActive": false
            })))
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        let input = CategoryInput {
            category_name: "Events".to_string(),
            category_description: "Campus events".to_string(),
            parent_category_id: None,
            is_active: false,
        };
        CategoryService::new(&client).update(2, &input).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_in_use_category_reports_backend_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/Categories/1/permanent")
            .with_status(409)
            .with_body(r#"{"message":"Category has articles"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = CategoryService::new(&client).hard_delete(1).await.unwrap_err();
        assert_eq!(err.user_message(), "Category has articles");
    }
}
