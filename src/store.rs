//! Post Store.
//!
//! The whole collection lives in one pretty-printed JSON array and is read
//! and rewritten wholesale. A missing or corrupt file reads as an empty
//! store (first run). Merges hold an async mutex for the full
//! read-modify-write cycle, so concurrent scrapes in one process cannot drop
//! each other's additions.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::{GramfeedError, Result};
use crate::source::normalize::decode_entities;
use crate::source::{sort_newest_first, Post};

/// JSON-file backed post collection.
#[derive(Debug)]
pub struct PostStore {
    path: PathBuf,
    merge_lock: Mutex<()>,
}

impl PostStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self::at(config.posts_file())
    }

    /// Store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            merge_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Post>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// All posts, newest first, with image URLs entity-decoded.
    ///
    /// Never fails: an absent or unreadable document is an empty store.
    pub async fn read_all(&self) -> Vec<Post> {
        let mut posts = match self.load().await {
            Ok(posts) => posts,
            Err(GramfeedError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "post store not found, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "post store unreadable, treating as empty");
                Vec::new()
            }
        };

        for post in &mut posts {
            post.image_url = decode_entities(&post.image_url);
        }
        sort_newest_first(&mut posts);
        posts
    }

    /// Replace the stored collection with `posts`, as given.
    ///
    /// The document is written to a sibling temp file and renamed into
    /// place, so readers never observe a half-written file.
    pub async fn write_all(&self, posts: &[Post]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }

        let json = serde_json::to_string_pretty(posts)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Add the posts whose id is not stored yet and return how many were
    /// added.
    ///
    /// Ids repeated inside `new_posts` are only added once. When nothing is
    /// new the file is left untouched.
    pub async fn merge_new(&self, new_posts: Vec<Post>) -> Result<usize> {
        let _guard = self.merge_lock.lock().await;

        let mut posts = self.read_all().await;
        let mut seen: HashSet<String> = posts.iter().map(|p| p.id.clone()).collect();

        let fresh: Vec<Post> = new_posts
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        let added = fresh.len();

        if added > 0 {
            posts.extend(fresh);
            sort_newest_first(&mut posts);
            self.write_all(&posts).await?;
            info!(added, total = posts.len(), "merged new posts");
        }

        Ok(added)
    }
}
