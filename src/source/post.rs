//! The canonical post record.
//!
//! `Post` is what the normalizer produces, what the store persists and what
//! the HTTP API and the terminal browser display. Field names serialize in
//! camelCase (`displayName`, `imageUrl`) so the JSON document matches what
//! browser clients expect.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single normalized post from one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique key within the store. Usually the Instagram shortcode taken
    /// from the `/p/<code>/` permalink.
    pub id: String,

    /// Channel handle, without the leading `@`.
    pub username: String,

    /// Human-readable channel name.
    pub display_name: String,

    /// Plain-text caption (HTML stripped).
    pub caption: String,

    /// Absolute image URL, or empty when the item had none.
    pub image_url: String,

    /// Publication instant.
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,

    /// Link to the original post, or the channel profile.
    pub url: String,
}

/// Sort posts newest first.
///
/// The sort is stable, so posts sharing a timestamp keep their relative
/// order across repeated reads of unchanged data.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// `2024-01-01T00:00:00.000Z`-style timestamps.
mod iso_millis {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
