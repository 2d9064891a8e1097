//! gramfeed — collects posts from Instagram channel RSS mirrors into one
//! deduplicated, newest-first collection.
//!
//! ## Architecture overview
//!
//! ```text
//!                  ┌──────────────┐
//!  channel file ─► │   source/    │  fetch + parse + normalize (per feed)
//!                  └──────┬───────┘
//!                         │ Vec<Post>
//!                  ┌──────▼───────┐
//!                  │   scrape     │  one cycle, shared by every front end
//!                  └──────┬───────┘
//!                         │ merge_new
//!                  ┌──────▼───────┐
//!                  │ store/query  │  posts.json, newest first
//!                  └──┬────────┬──┘
//!                     │        │
//!               ┌─────▼──┐  ┌──▼──────────────────────┐
//!               │  web   │  │ app / ui / input/refresh │
//!               │ (axum) │  │ (terminal browser)       │
//!               └────────┘  └──────────────────────────┘
//! ```
//!
//! * **`source/`** — feed URLs, the tolerant RSS scanner, the normalizer and
//!   the concurrent fetcher.
//! * **`store`** — the JSON document on disk and the merge-by-id operation.
//! * **`query`** — channel list and per-channel filtering.
//! * **`scrape`** — reader → fetcher → merge, as one call.
//! * **`web`** — `GET /api/posts` and `POST /api/scrape`.
//! * **`app`**, **`ui`**, **`input`**, **`refresh`** — the terminal browser.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod query;
pub mod refresh;
pub mod scrape;
pub mod source;
pub mod store;
pub mod ui;
pub mod web;

pub use config::Config;
pub use error::{GramfeedError, Result};
pub use scrape::Scraper;
pub use source::Post;
pub use store::PostStore;

use std::sync::Arc;

use clock::SystemClock;
use source::{FeedFetcher, FeedSourceReader};

/// Wire the components described by `config` into a [`Scraper`].
pub fn build_scraper(config: &Config) -> Scraper {
    Scraper::new(
        FeedSourceReader::new(&config.feeds),
        FeedFetcher::new(Arc::new(SystemClock)),
        Arc::new(PostStore::new(&config.storage)),
    )
}
