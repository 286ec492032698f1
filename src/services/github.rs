// src/services/github.rs

//! GitHub search API client.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::CollectorConfig;
use crate::utils::http::{create_client, endpoint};
use crate::utils::{env_value, truncate};

/// Source of repository summaries for the collector.
pub trait RepoSource {
    /// Most-starred repositories carrying `topic`, as raw summary objects.
    fn search(&self, topic: &str, per_page: u32) -> Result<Vec<serde_json::Value>>;

    /// Topic tags of a repository (`owner/name`).
    fn topics(&self, full_name: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct TopicsResponse {
    #[serde(default)]
    names: Option<Vec<String>>,
}

/// Blocking client for `api.github.com` (or a compatible base URL).
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Build a client from config; `GITHUB_TOKEN` is used when no token is configured.
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let client = create_client(&config.user_agent, Duration::from_secs(config.timeout_secs))?;
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| env_value("GITHUB_TOKEN"));

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            token,
        })
    }

    fn get(&self, path: &str) -> Result<RequestBuilder> {
        let url = endpoint(&self.api_base, path)?;
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    fn check_status(context: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        log::debug!("{} failed with {}: {}", context, status, truncate(&body, 200));
        Err(AppError::api(status.as_u16(), truncate(&body, 200)))
    }
}

impl RepoSource for GitHubClient {
    fn search(&self, topic: &str, per_page: u32) -> Result<Vec<serde_json::Value>> {
        let query = format!("topic:{topic}");
        let per_page = per_page.to_string();
        let response = self
            .get("search/repositories")?
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()?;

        let body: SearchResponse = Self::check_status(topic, response)?.json()?;
        body.items
            .ok_or_else(|| AppError::collect(topic, "search response has no items field"))
    }

    fn topics(&self, full_name: &str) -> Result<Vec<String>> {
        let response = self.get(&format!("repos/{full_name}/topics"))?.send()?;

        let body: TopicsResponse = Self::check_status(full_name, response)?.json()?;
        body.names
            .ok_or_else(|| AppError::collect(full_name, "topics response has no names field"))
    }
}
