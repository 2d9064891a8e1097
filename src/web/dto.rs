//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::source::Post;

/// Query string of `GET /api/posts`.
#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    /// Restrict posts to one channel (case-insensitive).
    pub channel: Option<String>,
}

/// Body of `GET /api/posts`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
    pub channels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PostsResponse {
    pub fn ok(posts: Vec<Post>, channels: Vec<String>) -> Self {
        Self {
            posts,
            channels,
            error: None,
        }
    }

    /// Safe default payload for a failed read.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            posts: Vec::new(),
            channels: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Body of `POST /api/scrape`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub success: bool,
    pub posts_added: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ScrapeResult {
    pub fn added(posts_added: usize) -> Self {
        Self {
            success: true,
            posts_added,
            errors: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            posts_added: 0,
            errors: Some(vec![message.into()]),
        }
    }
}
