//! Data models
//!
//! This module contains the data structures exchanged with the FU News backend.
//! Models represent:
//! - Backend entities (NewsArticle, Category, Tag, SystemAccount, TrashItem)
//! - Create/update payloads submitted by the admin screens
//! - Authentication payloads
//! - Pagination state for list pages

mod account;
mod article;
mod auth;
mod category;
mod page;
mod tag;
mod trash;

pub use account::{AccountInput, AccountRole, SystemAccount};
pub use article::{NewsArticle, NewsArticleInput, NewsStatus};
pub use auth::{AuthResponse, LoginRequest, RefreshRequest};
pub use category::{Category, CategoryInput};
pub use page::{Paged, Pagination};
pub use tag::{Tag, TagInput};
pub use trash::{TrashEntity, TrashItem};
