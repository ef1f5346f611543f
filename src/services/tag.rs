//! Tag service
//!
//! Tag listing and maintenance. The full tag list backs the article form's
//! tag checkboxes.

use crate::client::odata::{self, Direction, ODataPage, ODataQuery};
use crate::client::{ApiClient, ApiError};
use crate::models::{Paged, Pagination, Tag, TagInput, TrashEntity};
use crate::services::trash::TrashService;

const ENTITY_SET: &str = "Tags";

pub struct TagService<'a> {
    client: &'a ApiClient,
}

impl<'a> TagService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, keyword: &str, page: Pagination) -> Result<Paged<Tag>, ApiError> {
        let url = ODataQuery::new()
            .filter_opt(odata::keyword_filter(&["TagName"], keyword))
            .order_by("TagName", Direction::Asc)
            .page(&page)
            .apply(&self.client.odata_url(ENTITY_SET));

        let result: ODataPage<Tag> = self.client.get_json(&url).await?;
        Ok(result.into_paged(page))
    }

    pub async fn all(&self) -> Result<Vec<Tag>, ApiError> {
        let url = ODataQuery::new()
            .order_by("TagName", Direction::Asc)
            .apply(&self.client.odata_url(ENTITY_SET));
        let result: ODataPage<Tag> = self.client.get_json(&url).await?;
        Ok(result.value)
    }

    pub async fn get(&self, id: i64) -> Result<Tag, ApiError> {
        let url = self.client.odata_url(&format!("{}({})", ENTITY_SET, id));
        self.client.get_json(&url).await
    }

    pub async fn create(&self, input: &TagInput) -> Result<Tag, ApiError> {
        let tag: Tag = self
            .client
            .post_json(&self.client.api_url(ENTITY_SET), input)
            .await?;
        tracing::info!(id = tag.tag_id, name = %tag.tag_name, "tag created");
        Ok(tag)
    }

    pub async fn update(&self, id: i64, input: &TagInput) -> Result<(), ApiError> {
        let url = self.client.api_url(&format!("{}/{}", ENTITY_SET, id));
        self.client.put_json(&url, input).await?;
        tracing::info!(id, "tag updated");
        Ok(())
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), ApiError> {
        TrashService::new(self.client).soft_delete(TrashEntity::Tag, id).await
    }

    pub async fn hard_delete(&self, id: i64) -> Result<(), ApiError> {
        TrashService::new(self.client).hard_delete(TrashEntity::Tag, id).await
    }
}
