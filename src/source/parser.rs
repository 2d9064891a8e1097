//! Tolerant RSS scanner.
//!
//! Feed mirrors emit RSS that is close to, but not always, well-formed XML,
//! and they disagree on whether text fields are CDATA-wrapped. Rather than
//! reject such documents this module scans the text with regular
//! expressions:
//!
//! * each `<item>...</item>` span is located non-greedily;
//! * every scalar field is matched as `<tag><![CDATA[...]]></tag>` first and
//!   as `<tag>...</tag>` if that fails;
//! * the media URL comes from the `url` attribute of `<media:content>`.
//!
//! Nested `<item>` elements and namespace prefixes other than `media:` and
//! `dc:` are not supported.

use std::sync::LazyLock;

use regex::Regex;

/// Returned by [`extract_channel_title`] when the document has none.
pub const UNKNOWN_CHANNEL: &str = "Unknown";

/// One `<item>` as found in the document. Every field is optional; missing
/// elements stay `None` rather than being defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
    pub creator: Option<String>,
    pub media_url: Option<String>,
}

/// Build a field matcher. The CDATA alternative is listed first, so it wins
/// whenever it matches at the same position.
fn field_regex(prefix: &str, tag: &str) -> Regex {
    let tag = regex::escape(tag);
    Regex::new(&format!(
        r"(?s){prefix}<{tag}>(?:<!\[CDATA\[(.*?)\]\]>|(.*?))</{tag}>"
    ))
    .expect("valid field regex")
}

static RE_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item>(.*?)</item>").expect("valid item regex"));

static RE_TITLE: LazyLock<Regex> = LazyLock::new(|| field_regex("", "title"));
static RE_LINK: LazyLock<Regex> = LazyLock::new(|| field_regex("", "link"));
static RE_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| field_regex("", "description"));
static RE_PUB_DATE: LazyLock<Regex> = LazyLock::new(|| field_regex("", "pubDate"));
static RE_CREATOR: LazyLock<Regex> = LazyLock::new(|| field_regex("", "dc:creator"));

static RE_MEDIA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<media:content[^>]+url="([^"]+)""#).expect("valid media regex")
});

static RE_CHANNEL_TITLE: LazyLock<Regex> =
    LazyLock::new(|| field_regex(r"<channel>.*?", "title"));

/// First match of a field regex, preferring the CDATA capture.
fn capture_field(re: &Regex, xml: &str) -> Option<String> {
    let caps = re.captures(xml)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

fn parse_item(item_xml: &str) -> RawFeedItem {
    RawFeedItem {
        title: capture_field(&RE_TITLE, item_xml),
        link: capture_field(&RE_LINK, item_xml).map(|l| l.trim().to_string()),
        description: capture_field(&RE_DESCRIPTION, item_xml),
        pub_date: capture_field(&RE_PUB_DATE, item_xml).map(|d| d.trim().to_string()),
        creator: capture_field(&RE_CREATOR, item_xml),
        media_url: RE_MEDIA_URL
            .captures(item_xml)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
    }
}

/// Extract every `<item>` in document order.
pub fn parse_items(xml: &str) -> Vec<RawFeedItem> {
    RE_ITEM
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .map(|m| parse_item(m.as_str()))
        .collect()
}

/// The first `<title>` after `<channel>`, or [`UNKNOWN_CHANNEL`].
pub fn extract_channel_title(xml: &str) -> String {
    capture_field(&RE_CHANNEL_TITLE, xml).unwrap_or_else(|| UNKNOWN_CHANNEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:media="http://search.yahoo.com/mrss/" version="2.0">
  <channel>
    <title><![CDATA[Meeple Cafe (@meeple_cafe) - Instagram]]></title>
    <link>https://www.instagram.com/meeple_cafe/</link>
    <item>
      <title><![CDATA[New expansion night]]></title>
      <link>https://www.instagram.com/p/C1a2b3/</link>
      <description><![CDATA[<div><img src="https://cdn.example.com/a.jpg?x=1&amp;y=2"/><p>Tonight!</p></div>]]></description>
      <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate>
      <dc:creator><![CDATA[meeple_cafe]]></dc:creator>
      <media:content medium="image" url="https://cdn.example.com/media.jpg"/>
    </item>
    <item>
      <title>Plain title</title>
      <link>
        https://www.instagram.com/p/Z9y8x7/
      </link>
      <description>Plain description</description>
      <dc:creator>meeple_cafe</dc:creator>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_all_items_in_order() {
        let items = parse_items(FEED);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link.as_deref(), Some("https://www.instagram.com/p/C1a2b3/"));
        assert_eq!(items[1].link.as_deref(), Some("https://www.instagram.com/p/Z9y8x7/"));
    }

    #[test]
    fn extracts_cdata_fields() {
        let item = &parse_items(FEED)[0];
        assert_eq!(item.title.as_deref(), Some("New expansion night"));
        assert_eq!(
            item.description.as_deref(),
            Some(r#"<div><img src="https://cdn.example.com/a.jpg?x=1&amp;y=2"/><p>Tonight!</p></div>"#)
        );
        assert_eq!(item.pub_date.as_deref(), Some("Mon, 01 Jan 2024 10:00:00 GMT"));
        assert_eq!(item.creator.as_deref(), Some("meeple_cafe"));
        assert_eq!(item.media_url.as_deref(), Some("https://cdn.example.com/media.jpg"));
    }

    #[test]
    fn extracts_plain_fields_and_leaves_missing_unset() {
        let item = &parse_items(FEED)[1];
        assert_eq!(item.title.as_deref(), Some("Plain title"));
        assert_eq!(item.description.as_deref(), Some("Plain description"));
        assert_eq!(item.creator.as_deref(), Some("meeple_cafe"));
        assert!(item.pub_date.is_none());
        assert!(item.media_url.is_none());
    }

    #[test]
    fn cdata_and_plain_titles_extract_the_same_text() {
        let xml = "<item><title><![CDATA[Foo]]></title></item>\
                   <item><title>Foo</title></item>";
        let items = parse_items(xml);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Foo"));
        assert_eq!(items[1].title.as_deref(), Some("Foo"));
    }

    #[test]
    fn multiline_cdata_is_kept_verbatim() {
        let xml = "<item><description><![CDATA[line one\nline two]]></description></item>";
        let items = parse_items(xml);
        assert_eq!(items[0].description.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn empty_item_has_no_fields() {
        let items = parse_items("<channel><item></item></channel>");
        assert_eq!(items, vec![RawFeedItem::default()]);
    }

    #[test]
    fn document_without_items() {
        assert!(parse_items("<rss><channel><title>x</title></channel></rss>").is_empty());
        assert!(parse_items("not xml at all").is_empty());
    }

    #[test]
    fn channel_title_cdata() {
        assert_eq!(extract_channel_title(FEED), "Meeple Cafe (@meeple_cafe) - Instagram");
    }

    #[test]
    fn channel_title_plain() {
        let xml = "<rss><channel>\n<title>Dice Tower</title><item><title>Item</title></item></channel></rss>";
        assert_eq!(extract_channel_title(xml), "Dice Tower");
    }

    #[test]
    fn channel_title_ignores_titles_before_channel() {
        let xml = "<rss><title>Outer</title><channel><title>Inner</title></channel></rss>";
        assert_eq!(extract_channel_title(xml), "Inner");
    }

    #[test]
    fn channel_title_defaults_to_unknown() {
        assert_eq!(extract_channel_title("<rss><channel></channel></rss>"), UNKNOWN_CHANNEL);
        assert_eq!(extract_channel_title(""), "Unknown");
    }
}
