//! News article service
//!
//! Implements the article reads and writes behind the public pages and the
//! admin article screens:
//! - Keyword search with pagination (public and admin)
//! - Listing by category
//! - Article detail with category, tags and author expanded
//! - Create, update, soft delete, hard delete

use crate::client::odata::{self, Direction, ODataPage, ODataQuery};
use crate::client::{ApiClient, ApiError};
use crate::models::{NewsArticle, NewsArticleInput, NewsStatus, Paged, Pagination, TrashEntity};
use crate::services::trash::TrashService;

const ENTITY_SET: &str = "NewsArticles";
const SEARCH_FIELDS: &[&str] = &["NewsTitle", "Headline"];

/// Filters for an article listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsQuery {
    /// Keyword matched against title and headline
    pub keyword: String,
    /// Restrict to one category
    pub category_id: Option<i64>,
    /// Include inactive articles (admin listings)
    pub include_inactive: bool,
}

impl NewsQuery {
    /// Public listing filtered by keyword
    pub fn public(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    /// Admin listing filtered by keyword
    pub fn admin(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            include_inactive: true,
            ..Self::default()
        }
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// OData query options for this listing (without paging)
    pub fn to_odata(&self) -> ODataQuery {
        let mut query = ODataQuery::new();
        if !self.include_inactive {
            query = query.filter(odata::eq("NewsStatus", i32::from(NewsStatus::Active)));
        }
        if let Some(category_id) = self.category_id {
            query = query.filter(odata::eq("CategoryId", category_id));
        }
        query
            .filter_opt(odata::keyword_filter(SEARCH_FIELDS, &self.keyword))
            .order_by("CreatedDate", Direction::Desc)
    }
}

pub struct NewsService<'a> {
    client: &'a ApiClient,
}

impl<'a> NewsService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of articles matching the query
    pub async fn search(&self, query: &NewsQuery, page: Pagination) -> Result<Paged<NewsArticle>, ApiError> {
        let url = query
            .to_odata()
            .expand("Category")
            .expand("Tags")
            .page(&page)
            .apply(&self.client.odata_url(ENTITY_SET));

        let result: ODataPage<NewsArticle> = self.client.get_json(&url).await?;
        Ok(result.into_paged(page))
    }

    /// One page of active articles in a category
    pub async fn by_category(&self, category_id: i64, page: Pagination) -> Result<Paged<NewsArticle>, ApiError> {
        self.search(&NewsQuery::default().in_category(category_id), page).await
    }

    /// Up to `limit` active articles whose title or headline matches
    pub async fn suggest(&self, keyword: &str, limit: u32) -> Result<Vec<NewsArticle>, ApiError> {
        let url = NewsQuery::public(keyword)
            .to_odata()
            .top(u64::from(limit))
            .apply(&self.client.odata_url(ENTITY_SET));

        let result: ODataPage<NewsArticle> = self.client.get_json(&url).await?;
        Ok(result.value)
    }

    pub async fn get(&self, id: i64) -> Result<NewsArticle, ApiError> {
        let url = ODataQuery::new()
            .expand("Category")
            .expand("Tags")
            .expand("CreatedBy")
            .apply(&self.client.odata_url(&format!("{}({})", ENTITY_SET, id)));
        self.client.get_json(&url).await
    }

    pub async fn create(&self, input: &NewsArticleInput) -> Result<NewsArticle, ApiError> {
        let article: NewsArticle = self
            .client
            .post_json(&self.client.api_url(ENTITY_SET), input)
            .await?;
        tracing::info!(id = article.news_article_id, "article created");
        Ok(article)
    }

    pub async fn update(&self, id: i64, input: &NewsArticleInput) -> Result<(), ApiError> {
        let url = self.client.api_url(&format!("{}/{}", ENTITY_SET, id));
        self.client.put_json(&url, input).await?;
        tracing::info!(id, "article updated");
        Ok(())
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), ApiError> {
        TrashService::new(self.client).soft_delete(TrashEntity::NewsArticle, id).await
    }

    pub async fn hard_delete(&self, id: i64) -> Result<(), ApiError> {
        TrashService::new(self.client).hard_delete(TrashEntity::NewsArticle, id).await
    }
}
