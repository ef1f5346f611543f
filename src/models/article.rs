//! News article model
//!
//! This module provides:
//! - `NewsArticle` entity as returned by the backend (optionally with its
//!   category and tags expanded)
//! - `NewsStatus` enum for visibility
//! - `NewsArticleInput` payload for create and update calls

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, SystemAccount, Tag};

/// News article entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct NewsArticle {
    /// Unique identifier
    pub news_article_id: i64,
    /// Article title
    pub news_title: String,
    /// Short lead shown in listings
    pub headline: String,
    /// Markdown body
    #[serde(default)]
    pub news_content: String,
    /// Where the story came from
    #[serde(default)]
    pub news_source: Option<String>,
    /// Category ID
    pub category_id: i64,
    /// Visibility status
    pub news_status: NewsStatus,
    /// Author account ID
    #[serde(default)]
    pub created_by_id: Option<i64>,
    /// Last editor account ID
    #[serde(default)]
    pub updated_by_id: Option<i64>,
    /// Creation timestamp
    pub created_date: DateTime<Utc>,
    /// Last modification timestamp
    #[serde(default)]
    pub modified_date: Option<DateTime<Utc>>,
    /// Expanded category (`$expand=Category`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Expanded tags (`$expand=Tags`)
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Expanded author (`$expand=CreatedBy`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<SystemAccount>,
}

impl NewsArticle {
    /// Whether the article is visible to the public
    pub fn is_active(&self) -> bool {
        self.news_status == NewsStatus::Active
    }

    /// IDs of the attached tags
    pub fn tag_ids(&self) -> Vec<i64> {
        self.tags.iter().map(|t| t.tag_id).collect()
    }
}

/// Article visibility status
///
/// The backend stores this as a bit; both `1`/`0` and `true`/`false` are
/// accepted on input, and `1`/`0` is sent back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "StatusRepr", into = "i32")]
pub enum NewsStatus {
    /// Published and visible
    #[default]
    Active,
    /// Hidden from the public
    Inactive,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusRepr {
    Flag(bool),
    Code(i64),
}

impl TryFrom<StatusRepr> for NewsStatus {
    type Error = String;

    fn try_from(value: StatusRepr) -> Result<Self, Self::Error> {
        match value {
            StatusRepr::Flag(true) | StatusRepr::Code(1) => Ok(NewsStatus::Active),
            StatusRepr::Flag(false) | StatusRepr::Code(0) => Ok(NewsStatus::Inactive),
            StatusRepr::Code(other) => Err(format!("invalid news status: {}", other)),
        }
    }
}

impl From<NewsStatus> for i32 {
    fn from(status: NewsStatus) -> Self {
        match status {
            NewsStatus::Active => 1,
            NewsStatus::Inactive => 0,
        }
    }
}

impl NewsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsStatus::Active => "active",
            NewsStatus::Inactive => "inactive",
        }
    }

    /// Parse a form value (`active`, `inactive`, `1`, `0`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" | "1" | "true" => Some(NewsStatus::Active),
            "inactive" | "0" | "false" => Some(NewsStatus::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for NewsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload for creating or updating an article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct NewsArticleInput {
    pub news_title: String,
    pub headline: String,
    pub news_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_source: Option<String>,
    pub category_id: i64,
    pub news_status: NewsStatus,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

impl From<&NewsArticle> for NewsArticleInput {
    fn from(article: &NewsArticle) -> Self {
        Self {
            news_title: article.news_title.clone(),
            headline: article.headline.clone(),
            news_content: article.news_content.clone(),
            news_source: article.news_source.clone(),
            category_id: article.category_id,
            news_status: article.news_status,
            tag_ids: article.tag_ids(),
        }
    }
}
