//! HTTP API.
//!
//! | Method | Path           | Body                                         |
//! |--------|----------------|----------------------------------------------|
//! | GET    | `/api/posts`   | `{ posts, channels }`, optional `?channel=`  |
//! | POST   | `/api/scrape`  | `{ success, postsAdded, errors? }`           |
//! | GET    | `/health`      | `OK`                                         |
//!
//! Failures answer 500 with the same body shape and empty defaults.

pub mod dto;
pub mod handlers;
pub mod router;

use std::sync::Arc;

use tokio::net::TcpListener;

pub use handlers::AppState;
pub use router::create_router;

use crate::scrape::Scraper;

/// Bind `addr` and serve the API until the process exits.
pub async fn serve(addr: &str, scraper: Scraper) -> std::io::Result<()> {
    let router = create_router(Arc::new(AppState::new(scraper)));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router).await
}
