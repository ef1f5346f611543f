//! Trash (soft-deleted records) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of record that can be soft deleted, restored, or purged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrashEntity {
    NewsArticle,
    Category,
    Tag,
    SystemAccount,
}

impl TrashEntity {
    pub const ALL: [TrashEntity; 4] = [
        TrashEntity::NewsArticle,
        TrashEntity::Category,
        TrashEntity::Tag,
        TrashEntity::SystemAccount,
    ];

    /// Backend entity set name
    pub fn entity_set(&self) -> &'static str {
        match self {
            TrashEntity::NewsArticle => "NewsArticles",
            TrashEntity::Category => "Categories",
            TrashEntity::Tag => "Tags",
            TrashEntity::SystemAccount => "SystemAccounts",
        }
    }

    /// URL segment used by the admin screens
    pub fn slug(&self) -> &'static str {
        match self {
            TrashEntity::NewsArticle => "articles",
            TrashEntity::Category => "categories",
            TrashEntity::Tag => "tags",
            TrashEntity::SystemAccount => "accounts",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.slug() == slug)
    }

    /// Human label
    pub fn label(&self) -> &'static str {
        match self {
            TrashEntity::NewsArticle => "Article",
            TrashEntity::Category => "Category",
            TrashEntity::Tag => "Tag",
            TrashEntity::SystemAccount => "Account",
        }
    }
}

impl fmt::Display for TrashEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A soft-deleted record listed in the trash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TrashItem {
    pub entity_type: TrashEntity,
    pub entity_id: i64,
    /// Title or name of the deleted record
    pub title: String,
    pub deleted_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_roundtrip() {
        for entity in TrashEntity::ALL {
            assert_eq!(TrashEntity::from_slug(entity.slug()), Some(entity));
        }
        assert_eq!(TrashEntity::from_slug("comments"), None);
    }

    #[test]
    fn test_deserialize_trash_item() {
        let item: TrashItem = serde_json::from_str(
            r#"{"EntityType":"Category","EntityId":4,"Title":"Old events","DeletedAt":"2024-04-02T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(item.entity_type, TrashEntity::Category);
        assert_eq!(item.entity_type.entity_set(), "Categories");
        assert_eq!(item.deleted_by, None);
    }
}
