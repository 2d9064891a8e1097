//! Feed Fetcher.
//!
//! Downloads every configured feed concurrently and runs the parser and the
//! normalizer over each document. A feed that fails (transport error,
//! non-2xx status, unreadable body) contributes nothing; the others are not
//! affected. There is no retry and no timeout beyond reqwest's defaults.

use std::sync::Arc;

use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, warn};

use super::normalize::normalize;
use super::parser::{extract_channel_title, parse_items};
use super::post::Post;
use crate::clock::{Clock, SystemClock};
use crate::error::{GramfeedError, Result};

/// Fetches feed documents and turns them into [`Post`]s.
#[derive(Clone)]
pub struct FeedFetcher {
    client: Client,
    clock: Arc<dyn Clock>,
}

impl FeedFetcher {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            client: Client::new(),
            clock,
        }
    }

    /// Parse an already-downloaded document.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// parsing logic without hitting the network.
    pub fn parse_document(xml: &str, clock: &dyn Clock) -> Vec<Post> {
        let channel_title = extract_channel_title(xml);
        parse_items(xml)
            .iter()
            .enumerate()
            .map(|(index, item)| normalize(item, &channel_title, index, clock))
            .collect()
    }

    /// Fetch a single feed.
    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<Post>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GramfeedError::FeedStatus(status.as_u16()));
        }

        let xml = response.text().await?;
        Ok(Self::parse_document(&xml, self.clock.as_ref()))
    }

    /// Fetch every feed concurrently.
    ///
    /// Posts are grouped by feed in `urls` order, each feed's posts in
    /// document order. Failed feeds are logged and skipped.
    pub async fn fetch_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<Post> {
        let results = join_all(urls.iter().map(|url| self.fetch_feed(url.as_ref()))).await;

        let mut posts = Vec::new();
        for (url, result) in urls.iter().zip(results) {
            match result {
                Ok(feed_posts) => {
                    debug!(url = url.as_ref(), posts = feed_posts.len(), "feed fetched");
                    posts.extend(feed_posts);
                }
                Err(e) => warn!(url = url.as_ref(), error = %e, "feed skipped"),
            }
        }
        posts
    }
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
