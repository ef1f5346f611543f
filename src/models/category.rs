//! Category model

use serde::{Deserialize, Serialize};

/// Category entity
///
/// Categories may be nested through `parent_category_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    /// Unique identifier
    pub category_id: i64,
    /// Display name
    pub category_name: String,
    /// Description shown on the category page
    #[serde(default)]
    pub category_description: String,
    /// Parent category ID (None for top level)
    #[serde(default)]
    pub parent_category_id: Option<i64>,
    /// Whether articles can be filed under it
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Payload for creating or updating a category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryInput {
    pub category_name: String,
    pub category_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category_id: Option<i64>,
    pub is_active: bool,
}

impl From<&Category> for CategoryInput {
    fn from(category: &Category) -> Self {
        Self {
            category_name: category.category_name.clone(),
            category_description: category.category_description.clone(),
            parent_category_id: category.parent_category_id,
            is_active: category.is_active,
        }
    }
}
