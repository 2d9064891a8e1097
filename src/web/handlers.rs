//! API handlers.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{PostsQuery, PostsResponse, ScrapeResult};
use crate::query::{distinct_channels, filter_by_channel};
use crate::scrape::Scraper;

/// Shared handler state.
pub struct AppState {
    pub scraper: Scraper,
}

impl AppState {
    pub fn new(scraper: Scraper) -> Self {
        Self { scraper }
    }
}

/// GET /api/posts - All posts plus the channel list.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostsQuery>,
) -> Json<PostsResponse> {
    let posts = state.scraper.store().list_all().await;
    let channels = distinct_channels(&posts);

    let posts = match query.channel.as_deref().filter(|c| !c.is_empty()) {
        Some(channel) => filter_by_channel(&posts, channel).into_iter().cloned().collect(),
        None => posts,
    };

    Json(PostsResponse::ok(posts, channels))
}

/// POST /api/scrape - Run one scrape cycle.
pub async fn scrape(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ScrapeResult>) {
    match state.scraper.run().await {
        Ok(added) => (StatusCode::OK, Json(ScrapeResult::added(added))),
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ScrapeResult::failed(e.to_string())),
            )
        }
    }
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

fn panic_message(err: &(dyn Any + Send)) -> &str {
    err.downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic")
}

/// Response for a panic inside [`list_posts`].
pub fn posts_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Post listing panicked: {}", panic_message(err.as_ref()));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(PostsResponse::failed("failed to load posts")),
    )
        .into_response()
}

/// Response for a panic inside [`scrape`].
pub fn scrape_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Scrape panicked: {}", panic_message(err.as_ref()));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ScrapeResult::failed("unexpected error during scrape")),
    )
        .into_response()
}
