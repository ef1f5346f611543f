//! Form validation
//!
//! Each admin form is posted as strings, checked here, and only converted to
//! a backend payload when every field passes. Errors are collected per field
//! so the form can be re-rendered with a message beside each input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{
    AccountInput, AccountRole, Category, CategoryInput, NewsArticle, NewsArticleInput, NewsStatus,
    SystemAccount, Tag, TagInput,
};

pub const MAX_ACCOUNT_NAME: usize = 100;
pub const MIN_PASSWORD: usize = 6;
pub const MAX_TITLE: usize = 400;
pub const MAX_HEADLINE: usize = 150;
pub const MAX_CATEGORY_NAME: usize = 100;
pub const MAX_CATEGORY_DESCRIPTION: usize = 250;
pub const MAX_TAG_NAME: usize = 50;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .unwrap_or_else(|e| panic!("email pattern: {}", e))
});

/// Field name to message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(value)` when no errors were recorded
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// Whether a create or an update form is being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

fn required(errors: &mut FormErrors, field: &str, label: &str, value: &str, max: Option<usize>) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, format!("{} is required", label));
    } else if let Some(max) = max {
        if value.chars().count() > max {
            errors.add(field, format!("{} must be at most {} characters", label, max));
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Posted account form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub account_email: String,
    #[serde(default)]
    pub account_role: String,
    #[serde(default)]
    pub account_password: String,
}

impl AccountForm {
    pub fn validate(&self, mode: FormMode) -> Result<AccountInput, FormErrors> {
        let mut errors = FormErrors::new();

        required(&mut errors, "account_name", "Name", &self.account_name, Some(MAX_ACCOUNT_NAME));

        let email = self.account_email.trim();
        if email.is_empty() {
            errors.add("account_email", "Email is required");
        } else if !is_valid_email(email) {
            errors.add("account_email", "Email is not valid");
        }

        let role = self.account_role.parse::<AccountRole>();
        if role.is_err() {
            errors.add("account_role", "Select a role");
        }

        let password = self.account_password.as_str();
        match mode {
            FormMode::Create if password.is_empty() => {
                errors.add("account_password", "Password is required");
            }
            _ if !password.is_empty() && password.chars().count() < MIN_PASSWORD => {
                errors.add(
                    "account_password",
                    format!("Password must be at least {} characters", MIN_PASSWORD),
                );
            }
            _ => {}
        }

        errors.into_result(|| AccountInput {
            account_name: self.account_name.trim().to_string(),
            account_email: email.to_string(),
            account_role: role.unwrap_or_default(),
            account_password: (!password.is_empty()).then(|| password.to_string()),
        })
    }
}

/// Posted article form
///
/// Tags arrive as repeated `tag_ids` fields, so this is built from raw
/// form pairs rather than derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleForm {
    pub news_title: String,
    pub headline: String,
    pub news_content: String,
    pub news_source: String,
    pub category_id: String,
    pub news_status: String,
    pub tag_ids: Vec<i64>,
}

impl ArticleForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "news_title" => form.news_title = value,
                "headline" => form.headline = value,
                "news_content" => form.news_content = value,
                "news_source" => form.news_source = value,
                "category_id" => form.category_id = value,
                "news_status" => form.news_status = value,
                "tag_ids" => {
                    if let Ok(id) = value.trim().parse::<i64>() {
                        if !form.tag_ids.contains(&id) {
                            form.tag_ids.push(id);
                        }
                    }
                }
                _ => {}
            }
        }
        form
    }

    pub fn validate(&self) -> Result<NewsArticleInput, FormErrors> {
        let mut errors = FormErrors::new();

        required(&mut errors, "news_title", "Title", &self.news_title, Some(MAX_TITLE));
        required(&mut errors, "headline", "Headline", &self.headline, Some(MAX_HEADLINE));
        required(&mut errors, "news_content", "Content", &self.news_content, None);

        let category_id = self.category_id.trim().parse::<i64>().ok().filter(|id| *id > 0);
        if category_id.is_none() {
            errors.add("category_id", "Select a category");
        }

        let status = if self.news_status.trim().is_empty() {
            Some(NewsStatus::Active)
        } else {
            NewsStatus::parse(&self.news_status)
        };
        if status.is_none() {
            errors.add("news_status", "Select a status");
        }

        errors.into_result(|| NewsArticleInput {
            news_title: self.news_title.trim().to_string(),
            headline: self.headline.trim().to_string(),
            news_content: self.news_content.clone(),
            news_source: optional(&self.news_source),
            category_id: category_id.unwrap_or_default(),
            news_status: status.unwrap_or_default(),
            tag_ids: self.tag_ids.clone(),
        })
    }
}

/// Posted category form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub category_description: String,
    #[serde(default)]
    pub parent_category_id: String,
    /// Checkbox; present when ticked
    #[serde(default)]
    pub is_active: Option<String>,
}

impl CategoryForm {
    pub fn validate(&self) -> Result<CategoryInput, FormErrors> {
        let mut errors = FormErrors::new();

        required(&mut errors, "category_name", "Name", &self.category_name, Some(MAX_CATEGORY_NAME));
        required(
            &mut errors,
            "category_description",
            "Description",
            &self.category_description,
            Some(MAX_CATEGORY_DESCRIPTION),
        );

        let parent = self.parent_category_id.trim();
        let parent_category_id = if parent.is_empty() {
            None
        } else {
            match parent.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("parent_category_id", "Select a valid parent category");
                    None
                }
            }
        };

        errors.into_result(|| CategoryInput {
            category_name: self.category_name.trim().to_string(),
            category_description: self.category_description.trim().to_string(),
            parent_category_id,
            is_active: self.is_active.is_some(),
        })
    }
}

/// Posted tag form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagForm {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub note: String,
}

impl TagForm {
    pub fn validate(&self) -> Result<TagInput, FormErrors> {
        let mut errors = FormErrors::new();
        required(&mut errors, "tag_name", "Tag name", &self.tag_name, Some(MAX_TAG_NAME));

        errors.into_result(|| TagInput {
            tag_name: self.tag_name.trim().to_string(),
            note: optional(&self.note),
        })
    }
}

impl From<&SystemAccount> for AccountForm {
    /// Edit form prefilled from the stored account; the password stays blank
    fn from(account: &SystemAccount) -> Self {
        Self {
            account_name: account.account_name.clone(),
            account_email: account.account_email.clone(),
            account_role: account.account_role.code().to_string(),
            account_password: String::new(),
        }
    }
}

impl From<&NewsArticle> for ArticleForm {
    fn from(article: &NewsArticle) -> Self {
        Self {
            news_title: article.news_title.clone(),
            headline: article.headline.clone(),
            news_content: article.news_content.clone(),
            news_source: article.news_source.clone().unwrap_or_default(),
            category_id: article.category_id.to_string(),
            news_status: article.news_status.as_str().to_string(),
            tag_ids: article.tag_ids(),
        }
    }
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            category_name: category.category_name.clone(),
            category_description: category.category_description.clone(),
            parent_category_id: category
                .parent_category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            is_active: category.is_active.then(|| "on".to_string()),
        }
    }
}

impl From<&Tag> for TagForm {
    fn from(tag: &Tag) -> Self {
        Self {
            tag_name: tag.tag_name.clone(),
            note: tag.note.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_form() -> AccountForm {
        AccountForm {
            account_name: "Nguyen Van A".to_string(),
            account_email: "a@fu.edu.vn".to_string(),
            account_role: "1".to_string(),
            account_password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("staff@fu.edu.vn"));
        assert!(is_valid_email("first.last+news@fpt.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@fu.edu.vn"));
    }

    #[test]
    fn test_valid_account_form() {
        let input = account_form().validate(FormMode::Create).unwrap();
        assert_eq!(input.account_role, AccountRole::Staff);
        assert_eq!(input.account_password.as_deref(), Some("secret1"));
    }

    #[test]
    fn test_invalid_email_is_reported() {
        let form = AccountForm {
            account_email: "nope".to_string(),
            ..account_form()
        };
        let errors = form.validate(FormMode::Create).unwrap_err();
        assert_eq!(errors.get("account_email"), Some("Email is not valid"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_password_rules_depend_on_mode() {
        let blank = AccountForm {
            account_password: String::new(),
            ..account_form()
        };
        assert!(blank.validate(FormMode::Create).unwrap_err().has("account_password"));

        let input = blank.validate(FormMode::Update).unwrap();
        assert_eq!(input.account_password, None);

        let short = AccountForm {
            account_password: "12345".to_string(),
            ..account_form()
        };
        assert!(short.validate(FormMode::Update).unwrap_err().has("account_password"));
    }

    #[test]
    fn test_account_name_too_long() {
        let form = AccountForm {
            account_name: "x".repeat(MAX_ACCOUNT_NAME + 1),
            ..account_form()
        };
        assert!(form.validate(FormMode::Create).unwrap_err().has("account_name"));
    }

    #[test]
    fn test_bad_role() {
        let form = AccountForm {
            account_role: "9".to_string(),
            ..account_form()
        };
        assert!(form.validate(FormMode::Create).unwrap_err().has("account_role"));
    }

    #[test]
    fn test_article_form_from_pairs() {
        let pairs = vec![
            ("news_title".to_string(), " Exam week ".to_string()),
            ("headline".to_string(), "Schedule".to_string()),
            ("news_content".to_string(), "Body".to_string()),
            ("category_id".to_string(), "3".to_string()),
            ("news_status".to_string(), "0".to_string()),
            ("tag_ids".to_string(), "1".to_string()),
            ("tag_ids".to_string(), "4".to_string()),
            ("tag_ids".to_string(), "1".to_string()),
        ];
        let input = ArticleForm::from_pairs(pairs).validate().unwrap();

        assert_eq!(input.news_title, "Exam week");
        assert_eq!(input.category_id, 3);
        assert_eq!(input.news_status, NewsStatus::Inactive);
        assert_eq!(input.tag_ids, vec![1, 4]);
        assert_eq!(input.news_source, None);
    }

    #[test]
    fn test_article_form_errors() {
        let form = ArticleForm {
            headline: "h".repeat(MAX_HEADLINE + 1),
            ..ArticleForm::default()
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(errors.get("news_title"), Some("Title is required"));
        assert!(errors.has("headline"));
        assert!(errors.has("news_content"));
        assert_eq!(errors.get("category_id"), Some("Select a category"));
        assert!(!errors.has("news_status"));
    }

    #[test]
    fn test_category_form() {
        let form = CategoryForm {
            category_name: "Events".to_string(),
            category_description: "Campus events".to_string(),
            parent_category_id: String::new(),
            is_active: Some("on".to_string()),
        };
        let input = form.validate().unwrap();
        assert!(input.is_active);
        assert_eq!(input.parent_category_id, None);

        let unchecked = CategoryForm {
            is_active: None,
            category_description: "d".repeat(MAX_CATEGORY_DESCRIPTION + 1),
            ..form
        };
        assert!(unchecked.validate().unwrap_err().has("category_description"));
    }

    #[test]
    fn test_tag_form() {
        assert!(TagForm::default().validate().unwrap_err().has("tag_name"));

        let input = TagForm {
            tag_name: "exam".to_string(),
            note: "  ".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(input.note, None);
    }

    #[test]
    fn test_errors_serialize_as_map() {
        let mut errors = FormErrors::new();
        errors.add("tag_name", "Tag name is required");
        errors.add("tag_name", "ignored");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"tag_name": "Tag name is required"})
        );
    }

    #[test]
    fn test_edit_forms_prefill_and_revalidate() {
        let account = SystemAccount {
            account_id: 4,
            account_name: "Le Van C".to_string(),
            account_email: "c@fu.edu.vn".to_string(),
            account_role: AccountRole::Lecturer,
        };
        let form = AccountForm::from(&account);
        assert_eq!(form.account_role, "2");
        assert!(form.account_password.is_empty());
        let input = form.validate(FormMode::Update).unwrap();
        assert_eq!(input.account_role, AccountRole::Lecturer);
        assert_eq!(input.account_password, None);

        let category = Category {
            category_id: 2,
            category_name: "Events".to_string(),
            category_description: "Campus events".to_string(),
            parent_category_id: Some(1),
            is_active: false,
        };
        let form = CategoryForm::from(&category);
        assert_eq!(form.parent_category_id, "1");
        assert_eq!(form.is_active, None);
        assert_eq!(form.validate().unwrap(), CategoryInput::from(&category));

        let tag = Tag {
            tag_id: 5,
            tag_name: "exam".to_string(),
            note: None,
        };
        assert_eq!(TagForm::from(&tag).validate().unwrap(), TagInput::from(&tag));
    }
}
