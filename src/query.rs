//! Read-side views over the post store.

use std::collections::BTreeSet;

use crate::source::Post;
use crate::store::PostStore;

/// Distinct usernames, ascending.
pub fn distinct_channels(posts: &[Post]) -> Vec<String> {
    posts
        .iter()
        .map(|p| p.username.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Posts whose username equals `username`, ignoring case.
pub fn filter_by_channel<'a>(posts: &'a [Post], username: &str) -> Vec<&'a Post> {
    let wanted = username.to_lowercase();
    posts
        .iter()
        .filter(|p| p.username.to_lowercase() == wanted)
        .collect()
}

impl PostStore {
    /// Every post, newest first.
    pub async fn list_all(&self) -> Vec<Post> {
        self.read_all().await
    }

    /// Distinct channel handles, ascending.
    pub async fn list_channels(&self) -> Vec<String> {
        distinct_channels(&self.read_all().await)
    }

    /// One channel's posts, newest first.
    pub async fn list_by_channel(&self, username: &str) -> Vec<Post> {
        let posts = self.read_all().await;
        filter_by_channel(&posts, username)
            .into_iter()
            .cloned()
            .collect()
    }
}
