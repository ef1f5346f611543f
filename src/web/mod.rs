//! Web layer - HTTP handlers and routing
//!
//! Route groups:
//! - Public: news listing, article and category pages, live search, sign in
//! - Staff (Staff or Admin): article, category, tag and trash management
//! - Admin: accounts and permanent deletes from the trash
//!
//! Every request passes through session loading first; failures raised by
//! handlers and guards are finished into redirects or the error page.

pub mod admin;
pub mod auth;
pub mod common;
pub mod error;
pub mod middleware;
pub mod public;


pub use error::WebError;
pub use middleware::{AppState, CurrentSession, MaybeSession};

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Routes that need a signed-in user
fn protected_router() -> Router<AppState> {
    Router::new()
        .merge(admin::staff_router())
        .merge(admin::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_auth))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(public::home))
        .route("/news/{id}", get(public::article))
        .route("/categories/{id}", get(public::category))
        .route("/search/live", get(public::live_search))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/healthz", get(public::healthz))
        .merge(protected_router())
        .fallback(public::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn_with_state(
                    state.clone(),
                    middleware::load_session,
                ))
                .layer(axum_middleware::from_fn_with_state(
                    state.clone(),
                    middleware::render_failures,
                )),
        )
        .with_state(state)
}
