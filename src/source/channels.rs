//! Feed Source Reader.
//!
//! Reads the line-oriented channel file and keeps only lines that look like
//! feed URLs for the configured host. Everything else (blank lines, notes,
//! profile links) is ignored.

use std::path::PathBuf;

use crate::config::FeedsConfig;
use crate::error::Result;

/// A single feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
}

/// Loads [`FeedSource`]s from the channel file named in [`FeedsConfig`].
#[derive(Debug, Clone)]
pub struct FeedSourceReader {
    path: PathBuf,
    host_pattern: String,
}

impl FeedSourceReader {
    pub fn new(config: &FeedsConfig) -> Self {
        Self {
            path: config.channels_file.clone(),
            host_pattern: config.host_pattern.clone(),
        }
    }

    /// Read the channel file.
    ///
    /// A missing or unreadable file is an error; an empty result is not.
    pub async fn read(&self) -> Result<Vec<FeedSource>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(parse_sources(&content, &self.host_pattern))
    }
}

/// Filter `content` down to trimmed lines containing `host_pattern`, in file
/// order. Duplicates are kept.
pub fn parse_sources(content: &str, host_pattern: &str) -> Vec<FeedSource> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.contains(host_pattern))
        .map(|line| FeedSource {
            url: line.to_string(),
        })
        .collect()
}
