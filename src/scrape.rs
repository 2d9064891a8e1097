//! One scrape cycle: read the channel file, fetch every feed, merge.
//!
//! Shared by the HTTP scrape trigger, the `scrape` command and the terminal
//! browser's refresh key.

use std::sync::Arc;

use tracing::info;

use crate::error::{GramfeedError, Result};
use crate::source::{FeedFetcher, FeedSourceReader};
use crate::store::PostStore;

/// Everything a scrape needs.
#[derive(Clone)]
pub struct Scraper {
    sources: FeedSourceReader,
    fetcher: FeedFetcher,
    store: Arc<PostStore>,
}

impl Scraper {
    pub fn new(sources: FeedSourceReader, fetcher: FeedFetcher, store: Arc<PostStore>) -> Self {
        Self {
            sources,
            fetcher,
            store,
        }
    }

    pub fn store(&self) -> &Arc<PostStore> {
        &self.store
    }

    /// Run one cycle and return the number of posts added.
    ///
    /// Fails with [`GramfeedError::NoFeedSources`] before touching the store
    /// when the channel file lists no feeds. Individual feed failures do not
    /// fail the cycle: if every feed fails the result is `Ok(0)`.
    pub async fn run(&self) -> Result<usize> {
        let sources = self.sources.read().await?;
        if sources.is_empty() {
            return Err(GramfeedError::NoFeedSources);
        }

        let urls: Vec<String> = sources.into_iter().map(|s| s.url).collect();
        let posts = self.fetcher.fetch_all(&urls).await;
        let fetched = posts.len();
        let added = self.store.merge_new(posts).await?;

        info!(feeds = urls.len(), fetched, added, "scrape finished");
        Ok(added)
    }
}
