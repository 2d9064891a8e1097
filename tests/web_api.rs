//! Web API Tests
//!
//! Integration tests for the posts and scrape endpoints.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use gramfeed::config::FeedsConfig;
use gramfeed::source::{FeedFetcher, FeedSourceReader};
use gramfeed::web::{create_router, AppState};
use gramfeed::{Post, PostStore, Scraper};
use serde_json::Value;
use tempfile::TempDir;

fn post(id: &str, username: &str, day: u32) -> Post {
    Post {
        id: id.to_string(),
        username: username.to_string(),
        display_name: format!("{username} display"),
        caption: format!("caption {id}"),
        image_url: "https://cdn.example.com/img.jpg?a=1&amp;b=2".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
        url: format!("https://www.instagram.com/p/{id}/"),
    }
}

/// Create a test server over a temporary data directory.
async fn create_test_server(channels: &str, posts: &[Post]) -> (TestServer, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let channels_file = dir.path().join("channels.txt");
    std::fs::write(&channels_file, channels).unwrap();

    let store = Arc::new(PostStore::at(dir.path().join("data/posts.json")));
    if !posts.is_empty() {
        store.write_all(posts).await.unwrap();
    }

    let sources = FeedSourceReader::new(&FeedsConfig {
        channels_file,
        host_pattern: "rss.app/feeds/".to_string(),
    });
    let scraper = Scraper::new(sources, FeedFetcher::default(), store);
    let router = create_router(Arc::new(AppState::new(scraper)));

    let server = TestServer::new(router).expect("Failed to create test server");
    (server, dir)
}

#[tokio::test]
async fn test_list_posts_empty_store() {
    let (server, _dir) = create_test_server("", &[]).await;

    let response = server.get("/api/posts").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["posts"], serde_json::json!([]));
    assert_eq!(body["channels"], serde_json::json!([]));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_list_posts_sorted_with_channels() {
    let posts = [post("a", "meeple", 1), post("b", "dicetower", 3), post("c", "meeple", 2)];
    let (server, _dir) = create_test_server("", &posts).await;

    let response = server.get("/api/posts").await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    let ids: Vec<_> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["b", "c", "a"]);
    assert_eq!(body["channels"], serde_json::json!(["dicetower", "meeple"]));

    let first = &body["posts"][0];
    assert_eq!(first["displayName"], "dicetower display");
    assert_eq!(first["imageUrl"], "https://cdn.example.com/img.jpg?a=1&b=2");
    assert_eq!(first["timestamp"], "2024-06-03T09:00:00.000Z");
}

#[tokio::test]
async fn test_list_posts_filtered_by_channel() {
    let posts = [post("a", "meeple", 1), post("b", "dicetower", 3), post("c", "meeple", 2)];
    let (server, _dir) = create_test_server("", &posts).await;

    let response = server
        .get("/api/posts")
        .add_query_param("channel", "MEEPLE")
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    let ids: Vec<_> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["c", "a"]);
    // The channel list is never filtered.
    assert_eq!(body["channels"], serde_json::json!(["dicetower", "meeple"]));
}

#[tokio::test]
async fn test_scrape_without_feed_sources() {
    let (server, dir) = create_test_server("# no feeds yet\n", &[]).await;

    let response = server.post("/api/scrape").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["postsAdded"], 0);
    let errors = body["errors"].as_array().unwrap();
    assert!(!errors.is_empty());
    assert!(errors[0].as_str().unwrap().contains("no RSS feed URLs"));

    assert!(!dir.path().join("data/posts.json").exists());
}

#[tokio::test]
async fn test_scrape_with_missing_channel_file() {
    let (server, dir) = create_test_server("", &[]).await;
    std::fs::remove_file(dir.path().join("channels.txt")).unwrap();

    let response = server.post("/api/scrape").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["postsAdded"], 0);
    assert!(body["errors"][0].as_str().unwrap().starts_with("I/O error"));
}

#[tokio::test]
async fn test_scrape_with_unreachable_feeds_still_succeeds() {
    let (server, _dir) =
        create_test_server("http://127.0.0.1:9/rss.app/feeds/down.xml\n", &[]).await;

    let response = server.post("/api/scrape").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body, serde_json::json!({ "success": true, "postsAdded": 0 }));
}

#[tokio::test]
async fn test_health_check() {
    let (server, _dir) = create_test_server("", &[]).await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}
