//! Tag model

use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// Unique identifier
    pub tag_id: i64,
    /// Tag name
    pub tag_name: String,
    /// Free-form note
    #[serde(default)]
    pub note: Option<String>,
}

/// Payload for creating or updating a tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TagInput {
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<&Tag> for TagInput {
    fn from(tag: &Tag) -> Self {
        Self {
            tag_name: tag.tag_name.clone(),
            note: tag.note.clone(),
        }
    }
}
