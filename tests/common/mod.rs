//! Shared fixtures for integration tests.

#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use tempfile::TempDir;
use toolwatch::models::{Config, DelayRange};

/// Variable that is never set, so environment fallback stays empty.
pub const UNSET_KEY_ENV: &str = "TOOLWATCH_TEST_UNSET_KEY";

/// Config pointing both APIs at `server`, with state under `tmp` and no pauses.
pub fn test_config(server: &ServerGuard, tmp: &TempDir) -> Config {
    let mut config = Config::default();
    config.collector.api_base = server.url();
    config.collector.token = Some("gh-test-token".to_string());
    config.collector.topics = vec!["ai-tools".to_string()];
    config.collector.topic_delay_ms = DelayRange::zero();
    config.collector.item_delay_ms = DelayRange::zero();
    config.analyzer.api_base = format!("{}/v1", server.url());
    config.analyzer.retry_base_secs = 0;
    config.analyzer.transport_backoff_secs = 0;
    config.analyzer.api_key_env = UNSET_KEY_ENV.to_string();
    config.paths.output_dir = tmp.path().join("output");
    config.paths.seen_file = tmp.path().join("output/github_seen_urls.json");
    config.paths.key_cache = tmp.path().join("config/api_keys.json");
    config.logging.show_progress = false;
    config
}

pub fn repo_json(full_name: &str, stars: u64, language: Option<&str>) -> serde_json::Value {
    json!({
        "full_name": full_name,
        "html_url": format!("https://github.com/{full_name}"),
        "description": format!("{full_name} description"),
        "stargazers_count": stars,
        "language": language,
    })
}

pub fn mock_search(server: &mut ServerGuard, topic: &str, items: Vec<serde_json::Value>) -> Mock {
    server
        .mock("GET", "/search/repositories")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), format!("topic:{topic}")),
            Matcher::UrlEncoded("sort".into(), "stars".into()),
            Matcher::UrlEncoded("order".into(), "desc".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "total_count": items.len(), "items": items }).to_string())
        .create()
}

pub fn mock_topics(server: &mut ServerGuard, full_name: &str, names: &[&str]) -> Mock {
    server
        .mock("GET", format!("/repos/{full_name}/topics").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "names": names }).to_string())
        .create()
}

pub fn mock_models(server: &mut ServerGuard, status: usize) -> Mock {
    server
        .mock("GET", "/v1/models")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(json!({ "object": "list", "data": [{ "id": "deepseek-chat" }] }).to_string())
        .create()
}

pub fn completion_body(text: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }],
    })
    .to_string()
}
