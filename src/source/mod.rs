//! RSS ingestion.
//!
//! The pipeline runs leaf-first:
//!
//! ```text
//! channels ──► rss (fetch) ──► parser ──► normalize ──► Vec<Post>
//! ```
//!
//! * [`channels`] reads feed URLs from the channel file.
//! * [`parser`] scans raw RSS text into [`RawFeedItem`]s.
//! * [`normalize`] maps each item to a canonical [`Post`].
//! * [`rss`] downloads all feeds concurrently and isolates failures.
//!
//! Only the fetcher does I/O besides the channel file read; parsing and
//! normalization are pure functions over their inputs.

pub mod channels;
pub mod normalize;
pub mod parser;
pub mod post;
pub mod rss;

pub use channels::{FeedSource, FeedSourceReader};
pub use parser::RawFeedItem;
pub use post::{sort_newest_first, Post};
pub use rss::FeedFetcher;
