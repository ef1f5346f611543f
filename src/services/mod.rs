//! Services layer
//!
//! One service per backend entity set, each a short-lived view over an
//! [`ApiClient`](crate::client::ApiClient) carrying the caller's token.
//! Services are responsible for:
//! - Building OData queries for listings and lookups
//! - Calling the REST endpoints for writes, deletes and restores
//! - Turning backend envelopes into paged results

pub mod account;
pub mod auth;
pub mod category;
pub mod markdown;
pub mod news;
pub mod search;
pub mod tag;
pub mod trash;

pub use account::AccountService;
pub use auth::AuthService;
pub use category::CategoryService;
pub use markdown::MarkdownRenderer;
pub use news::{NewsQuery, NewsService};
pub use search::SearchDebouncer;
pub use tag::TagService;
pub use trash::{DeleteMode, TrashService};
