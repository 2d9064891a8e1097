//! Background refresh worker for the terminal browser.
//!
//! Runs on the tokio runtime and talks to the UI thread over unbounded
//! channels: the UI sends a [`RefreshRequest`] when the user presses `r`,
//! the worker scrapes, then re-reads the store and reports back. Requests
//! are handled one at a time, in order.
//!
//! There is no timer. Posts are only fetched when the user asks.

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::app::App;
use crate::scrape::Scraper;
use crate::source::Post;

/// Ask the worker to run one scrape.
#[derive(Debug)]
pub struct RefreshRequest;

/// Messages sent from the worker to the UI thread.
#[derive(Debug)]
pub enum RefreshMsg {
    /// A fresh read of the store, newest first.
    Loaded(Vec<Post>),
    /// A scrape finished and added this many posts.
    Scraped(usize),
    /// A scrape failed with this error description.
    Error(String),
}

/// Spawn the worker on `runtime`.
///
/// The store is read once immediately so the browser has something to show.
/// The worker stops when the request sender is dropped or the receiver goes
/// away.
pub fn spawn(
    runtime: &Handle,
    scraper: Scraper,
) -> (UnboundedSender<RefreshRequest>, UnboundedReceiver<RefreshMsg>) {
    let (req_tx, mut req_rx) = mpsc::unbounded_channel::<RefreshRequest>();
    let (msg_tx, msg_rx) = mpsc::unbounded_channel();

    runtime.spawn(async move {
        let posts = scraper.store().list_all().await;
        if msg_tx.send(RefreshMsg::Loaded(posts)).is_err() {
            return;
        }

        while req_rx.recv().await.is_some() {
            let msg = match scraper.run().await {
                Ok(added) => RefreshMsg::Scraped(added),
                Err(e) => RefreshMsg::Error(e.to_string()),
            };
            if msg_tx.send(msg).is_err() {
                return;
            }

            let posts = scraper.store().list_all().await;
            if msg_tx.send(RefreshMsg::Loaded(posts)).is_err() {
                return;
            }
        }
    });

    (req_tx, msg_rx)
}

/// Apply one worker message to the app.
pub fn apply(app: &mut App, msg: RefreshMsg) {
    match msg {
        RefreshMsg::Loaded(posts) => app.load_posts(posts, Utc::now()),
        RefreshMsg::Scraped(added) => app.finish_refresh(added),
        RefreshMsg::Error(e) => app.fail_refresh(&e),
    }
}
