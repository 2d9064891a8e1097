//! Router configuration for the HTTP API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{health_check, list_posts, posts_panic, scrape, scrape_panic, AppState};

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/posts",
            get(list_posts).layer(CatchPanicLayer::custom(posts_panic)),
        )
        .route(
            "/scrape",
            post(scrape).layer(CatchPanicLayer::custom(scrape_panic)),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
