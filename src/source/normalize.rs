//! Post Normalizer.
//!
//! Turns a [`RawFeedItem`] plus the title of the channel it came from into a
//! canonical [`Post`]. All field derivation rules live here:
//!
//! | Field          | Source                                                      |
//! |----------------|-------------------------------------------------------------|
//! | `username`     | `@handle` in the channel title, else its first word         |
//! | `display_name` | channel title up to the first `(`                           |
//! | `caption`      | description with HTML stripped, else the item title         |
//! | `image_url`    | `<media:content url>`, else first `<img src>` in description |
//! | `id`           | shortcode after `/p/` in the link, else `<username>-<index>` |
//! | `timestamp`    | `pubDate`, else the clock's "now"                           |
//! | `url`          | the link, else the channel's profile URL                    |

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::parser::RawFeedItem;
use super::post::Post;
use crate::clock::Clock;

static RE_HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]+)").expect("valid handle regex"));

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static RE_IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src="([^"]+)""#).expect("valid img regex"));

/// Entities decoded by [`decode_entities`], checked in this order at each `&`.
const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

/// Decode the five basic HTML entities in a single left-to-right pass.
///
/// Output of one replacement is never re-scanned, so `&amp;lt;` becomes
/// `&lt;`, and a string without entities is returned unchanged.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replace tags with spaces, collapse whitespace, trim.
pub fn strip_html(html: &str) -> String {
    let spaced = RE_TAG.replace_all(html, " ");
    RE_WHITESPACE.replace_all(&spaced, " ").trim().to_string()
}

/// `src` of the first `<img>` in `html`, undecoded.
pub fn image_from_description(html: &str) -> Option<&str> {
    RE_IMG_SRC
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Channel handle from a title such as `Meeple Cafe (@meeple_cafe)`.
pub fn username_from_title(title: &str) -> String {
    match RE_HANDLE.captures(title).and_then(|c| c.get(1)) {
        Some(handle) => handle.as_str().to_string(),
        None => title.split_whitespace().next().unwrap_or_default().to_string(),
    }
}

/// Channel title up to the first `(`, trimmed.
pub fn display_name_from_title(title: &str) -> String {
    title.split('(').next().unwrap_or_default().trim().to_string()
}

/// Shortcode from an Instagram permalink (`.../p/<code>/...`).
fn shortcode_from_link(link: &str) -> Option<&str> {
    let (_, after) = link.split_once("/p/")?;
    let code = after.split('/').next().unwrap_or_default();
    (!code.is_empty()).then_some(code)
}

/// Parse an RSS date (RFC 2822), accepting RFC 3339 as well.
fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Build a [`Post`] from one item.
///
/// `index` is the item's position within its feed and only matters when the
/// link carries no shortcode. The fallback id is therefore not unique across
/// feeds, nor stable if the upstream feed reorders its items.
pub fn normalize(item: &RawFeedItem, channel_title: &str, index: usize, clock: &dyn Clock) -> Post {
    let username = username_from_title(channel_title);
    let link = non_empty(&item.link);
    let description = non_empty(&item.description);

    let raw_image = non_empty(&item.media_url)
        .or_else(|| description.and_then(image_from_description))
        .unwrap_or_default();

    let caption = match description {
        Some(html) => strip_html(html),
        None => item.title.clone().unwrap_or_default(),
    };

    let id = link
        .and_then(shortcode_from_link)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{username}-{index}"));

    let timestamp = item
        .pub_date
        .as_deref()
        .and_then(parse_pub_date)
        .unwrap_or_else(|| clock.now());

    let url = link
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://www.instagram.com/{username}/"));

    Post {
        id,
        display_name: display_name_from_title(channel_title),
        caption,
        image_url: decode_entities(raw_image),
        timestamp,
        url,
        username,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::source::parser::parse_items;
    use chrono::TimeZone;

    const CHANNEL: &str = "Meeple Cafe (@meeple_cafe) • Instagram photos and videos";

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2030, 5, 5, 5, 5, 5).unwrap())
    }

    fn item_with_link(link: &str) -> RawFeedItem {
        RawFeedItem {
            link: Some(link.to_string()),
            ..Default::default()
        }
    }

    // -- helpers -------------------------------------------------------------

    #[test]
    fn decode_entities_basic() {
        assert_eq!(
            decode_entities("a &amp; b &lt;c&gt; &quot;d&quot; &#39;e&#39;"),
            "a & b <c> \"d\" 'e'"
        );
    }

    #[test]
    fn decode_entities_is_single_pass() {
        assert_eq!(decode_entities("caf&amp;eacute;.jpg"), "caf&eacute;.jpg");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn decode_entities_leaves_plain_urls_alone() {
        let url = "https://cdn.example.com/p.jpg?a=1&b=2";
        let once = decode_entities(url);
        assert_eq!(once, url);
        assert_eq!(decode_entities(&once), once);
    }

    #[test]
    fn decode_entities_handles_trailing_ampersand() {
        assert_eq!(decode_entities("x&"), "x&");
        assert_eq!(decode_entities("&amp"), "&amp");
    }

    #[test]
    fn strip_html_collapses_whitespace() {
        assert_eq!(
            strip_html("<p>Hello</p><br/><b>board</b>\n\n  games  "),
            "Hello board games"
        );
        assert_eq!(strip_html("<div><img src=\"x\"/></div>"), "");
    }

    #[test]
    fn username_prefers_handle() {
        assert_eq!(username_from_title(CHANNEL), "meeple_cafe");
        assert_eq!(username_from_title("dicetower on Instagram"), "dicetower");
        assert_eq!(username_from_title(""), "");
    }

    #[test]
    fn display_name_cuts_at_parenthesis() {
        assert_eq!(display_name_from_title(CHANNEL), "Meeple Cafe");
        assert_eq!(display_name_from_title("  Dice Tower  "), "Dice Tower");
    }

    // -- normalize -----------------------------------------------------------

    #[test]
    fn normalize_full_item() {
        let item = RawFeedItem {
            title: Some("Title".into()),
            link: Some("https://www.instagram.com/p/C1a2b3/".into()),
            description: Some("<p>Game <b>night</b></p>".into()),
            pub_date: Some("Mon, 01 Jan 2024 10:00:00 GMT".into()),
            creator: Some("meeple_cafe".into()),
            media_url: Some("https://cdn.example.com/m.jpg?a=1&amp;b=2".into()),
        };

        let post = normalize(&item, CHANNEL, 0, &clock());

        assert_eq!(post.id, "C1a2b3");
        assert_eq!(post.username, "meeple_cafe");
        assert_eq!(post.display_name, "Meeple Cafe");
        assert_eq!(post.caption, "Game night");
        assert_eq!(post.image_url, "https://cdn.example.com/m.jpg?a=1&b=2");
        assert_eq!(post.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
        assert_eq!(post.url, "https://www.instagram.com/p/C1a2b3/");
    }

    #[test]
    fn image_from_enclosure_or_description() {
        let xml = r#"<rss><channel><title>Meeple (@meeple)</title>
<item>
  <link>https://www.instagram.com/p/AAA/</link>
  <description><![CDATA[<img src="https://cdn.example.com/ignored.jpg">]]></description>
  <media:content url="https://cdn.example.com/enclosure.jpg" medium="image"/>
</item>
<item>
  <link>https://www.instagram.com/p/BBB/</link>
  <description><![CDATA[<p><img class="x" src="https://cdn.example.com/sniffed.jpg?w=1&amp;h=2"></p>]]></description>
</item>
</channel></rss>"#;

        let posts: Vec<Post> = parse_items(xml)
            .iter()
            .enumerate()
            .map(|(i, item)| normalize(item, "Meeple (@meeple)", i, &clock()))
            .collect();

        assert_eq!(posts[0].image_url, "https://cdn.example.com/enclosure.jpg");
        assert_eq!(posts[1].image_url, "https://cdn.example.com/sniffed.jpg?w=1&h=2");
    }

    #[test]
    fn caption_falls_back_to_title_then_empty() {
        let titled = RawFeedItem {
            title: Some("Only a title".into()),
            ..Default::default()
        };
        assert_eq!(normalize(&titled, CHANNEL, 0, &clock()).caption, "Only a title");

        let bare = RawFeedItem::default();
        let post = normalize(&bare, CHANNEL, 0, &clock());
        assert_eq!(post.caption, "");
        assert_eq!(post.image_url, "");
    }

    #[test]
    fn id_strips_trailing_slash_and_query() {
        let post = normalize(&item_with_link("https://www.instagram.com/p/XyZ_1/?img_index=1"), CHANNEL, 0, &clock());
        assert_eq!(post.id, "XyZ_1");

        let post = normalize(&item_with_link("https://www.instagram.com/p/NoSlash"), CHANNEL, 0, &clock());
        assert_eq!(post.id, "NoSlash");
    }

    #[test]
    fn id_falls_back_to_username_and_index() {
        let reel = normalize(&item_with_link("https://www.instagram.com/reel/R1/"), CHANNEL, 3, &clock());
        assert_eq!(reel.id, "meeple_cafe-3");
        assert_eq!(reel.url, "https://www.instagram.com/reel/R1/");

        let empty = normalize(&item_with_link("https://www.instagram.com/p/"), CHANNEL, 4, &clock());
        assert_eq!(empty.id, "meeple_cafe-4");
    }

    #[test]
    fn fallback_ids_collide_across_feeds_with_the_same_handle() {
        // The fallback id only encodes the position within one feed, so two
        // feeds for the same channel produce the same id for their first item.
        let a = normalize(&RawFeedItem::default(), "Cafe (@meeple_cafe)", 0, &clock());
        let b = normalize(&RawFeedItem::default(), "Cafe mirror (@meeple_cafe)", 0, &clock());
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn missing_link_uses_profile_url() {
        let post = normalize(&RawFeedItem::default(), CHANNEL, 0, &clock());
        assert_eq!(post.url, "https://www.instagram.com/meeple_cafe/");
        assert_eq!(post.id, "meeple_cafe-0");
    }

    #[test]
    fn timestamp_accepts_rfc3339() {
        let item = RawFeedItem {
            pub_date: Some("2024-02-03T04:05:06+02:00".into()),
            ..Default::default()
        };
        let post = normalize(&item, CHANNEL, 0, &clock());
        assert_eq!(post.timestamp, Utc.with_ymd_and_hms(2024, 2, 3, 2, 5, 6).unwrap());
    }

    #[test]
    fn timestamp_falls_back_to_clock() {
        let bad = RawFeedItem {
            pub_date: Some("not-a-real-date".into()),
            ..Default::default()
        };
        assert_eq!(normalize(&bad, CHANNEL, 0, &clock()).timestamp, clock().0);
        assert_eq!(normalize(&RawFeedItem::default(), CHANNEL, 0, &clock()).timestamp, clock().0);
    }
}
