// src/services/collector.rs

//! Tool collector service.
//!
//! Searches each topic, drops repositories already in the seen-set and
//! normalizes the rest into tool records.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};

use crate::error::Result;
use crate::models::{CollectorConfig, DelayRange, RepoSummary, SeenPolicy, ToolRecord};
use crate::services::github::RepoSource;
use crate::storage::SeenSet;
use crate::utils::pause;

/// Summary of a collection run.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    pub records: Vec<ToolRecord>,
    pub topic_total: usize,
    pub topic_failures: usize,
    pub item_failures: usize,
    pub skipped_seen: usize,
}

/// Collects new repositories from a [`RepoSource`].
pub struct ToolCollector<S> {
    source: S,
    seen: SeenSet,
    per_page: u32,
    topic_delay: DelayRange,
    item_delay: DelayRange,
    policy: SeenPolicy,
    today: NaiveDate,
}

impl<S: RepoSource> ToolCollector<S> {
    pub fn new(source: S, seen: SeenSet, config: &CollectorConfig, policy: SeenPolicy) -> Self {
        Self {
            source,
            seen,
            per_page: config.per_page,
            topic_delay: config.topic_delay_ms,
            item_delay: config.item_delay_ms,
            policy,
            today: Local::now().date_naive(),
        }
    }

    /// Override the discovery date stamped on new records.
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Collect new records across `topics`, most-starred first.
    pub fn collect_all(&mut self, topics: &[String]) -> Result<Vec<ToolRecord>> {
        Ok(self.collect(topics)?.records)
    }

    /// Collect new records across `topics` and report per-stage counts.
    ///
    /// A failing topic or item is logged and skipped. Only persisting the
    /// seen-set can fail the whole run.
    pub fn collect(&mut self, topics: &[String]) -> Result<CollectOutcome> {
        let mut outcome = CollectOutcome {
            topic_total: topics.len(),
            ..CollectOutcome::default()
        };
        let mut accepted = HashSet::new();

        for topic in topics {
            pause(self.topic_delay);
            log::info!("Searching GitHub topic '{}'", topic);

            let items = match self.source.search(topic, self.per_page) {
                Ok(items) => items,
                Err(e) => {
                    outcome.topic_failures += 1;
                    log::warn!("Failed to search topic '{}': {}", topic, e);
                    continue;
                }
            };

            let before = outcome.records.len();
            for item in items {
                let summary: RepoSummary = match serde_json::from_value(item) {
                    Ok(summary) => summary,
                    Err(e) => {
                        outcome.item_failures += 1;
                        log::warn!("Skipping malformed result for '{}': {}", topic, e);
                        continue;
                    }
                };

                if self.seen.contains(&summary.html_url) || accepted.contains(&summary.html_url) {
                    outcome.skipped_seen += 1;
                    log::debug!("Already seen {}", summary.html_url);
                    continue;
                }

                let full_name = summary.full_name.clone();
                let record = match summary.into_record(self.today) {
                    Ok(record) => record,
                    Err(e) => {
                        outcome.item_failures += 1;
                        log::warn!("Skipping result for '{}': {}", topic, e);
                        continue;
                    }
                };

                let tags = self.tags_for(&full_name, topic);
                pause(self.item_delay);

                accepted.insert(record.url.clone());
                outcome.records.push(record.with_tags(tags));
            }

            log::info!(
                "Topic '{}': {} new repositories",
                topic,
                outcome.records.len() - before
            );
        }

        // Stable, so equal star counts keep discovery order.
        outcome.records.sort_by(|a, b| b.stars.cmp(&a.stars));

        if self.policy == SeenPolicy::OnCollect {
            self.commit(outcome.records.iter().map(|r| r.url.as_str()))?;
        }

        Ok(outcome)
    }

    /// Add URLs to the seen-set and persist it. Returns how many were new.
    pub fn commit<'a>(&mut self, urls: impl IntoIterator<Item = &'a str>) -> Result<usize> {
        let added = urls.into_iter().filter(|url| self.seen.insert(*url)).count();
        self.seen.save()?;
        log::info!(
            "Seen-set now holds {} URLs ({} new)",
            self.seen.len(),
            added
        );
        Ok(added)
    }

    fn tags_for(&self, full_name: &str, topic: &str) -> Vec<String> {
        match self.source.topics(full_name) {
            Ok(names) => names,
            Err(e) => {
                log::debug!("Topics for {} unavailable ({}), using '{}'", full_name, e, topic);
                vec![topic.to_string()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeSource {
        results: HashMap<String, Vec<serde_json::Value>>,
        topics: HashMap<String, Vec<String>>,
    }

    impl FakeSource {
        fn with_topic(mut self, topic: &str, items: Vec<serde_json::Value>) -> Self {
            self.results.insert(topic.to_string(), items);
            self
        }

        fn with_tags(mut self, full_name: &str, tags: &[&str]) -> Self {
            self.topics.insert(
                full_name.to_string(),
                tags.iter().map(|t| t.to_string()).collect(),
            );
            self
        }
    }

    impl RepoSource for FakeSource {
        fn search(&self, topic: &str, _per_page: u32) -> Result<Vec<serde_json::Value>> {
            self.results
                .get(topic)
                .cloned()
                .ok_or_else(|| AppError::api(503, "unavailable"))
        }

        fn topics(&self, full_name: &str) -> Result<Vec<String>> {
            self.topics
                .get(full_name)
                .cloned()
                .ok_or_else(|| AppError::api(404, "not found"))
        }
    }

    fn repo(full_name: &str, stars: u64) -> serde_json::Value {
        json!({
            "full_name": full_name,
            "html_url": format!("https://github.com/{full_name}"),
            "description": null,
            "stargazers_count": stars,
            "language": "Python",
        })
    }

    fn config() -> CollectorConfig {
        CollectorConfig {
            topic_delay_ms: DelayRange::zero(),
            item_delay_ms: DelayRange::zero(),
            ..CollectorConfig::default()
        }
    }

    fn topics(names: &[&str]) -> Vec<String> {
        names.iter().map(|t| t.to_string()).collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn test_skips_seen_and_grows_set() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.json");
        let mut seen = SeenSet::load(&path);
        seen.insert("https://github.com/old/tool");
        seen.save().unwrap();

        let source = FakeSource::default()
            .with_topic("ai-tools", vec![repo("old/tool", 900), repo("new/tool", 10)])
            .with_tags("new/tool", &["llm", "agents"]);
        let mut collector =
            ToolCollector::new(source, SeenSet::load(&path), &config(), SeenPolicy::OnCollect)
                .with_date(date());

        let outcome = collector.collect(&topics(&["ai-tools"])).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped_seen, 1);

        let record = &outcome.records[0];
        assert_eq!(record.name, "new / tool");
        assert_eq!(record.description, "No description");
        assert_eq!(record.tags, vec!["llm", "agents"]);
        assert_eq!(record.discovered_date, date());

        let reloaded = SeenSet::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("https://github.com/new/tool"));

        // Same results again yield nothing new.
        let again = collector.collect_all(&topics(&["ai-tools"])).unwrap();
        assert!(again.is_empty());
        assert_eq!(SeenSet::load(&path).len(), 2);
    }

    #[test]
    fn test_topic_failure_is_isolated() {
        let tmp = TempDir::new().unwrap();
        let source = FakeSource::default().with_topic("llm", vec![repo("a/one", 5)]);
        let mut collector = ToolCollector::new(
            source,
            SeenSet::load(tmp.path().join("seen.json")),
            &config(),
            SeenPolicy::OnCollect,
        );

        let outcome = collector.collect(&topics(&["broken", "llm"])).unwrap();
        assert_eq!(outcome.topic_total, 2);
        assert_eq!(outcome.topic_failures, 1);
        assert_eq!(outcome.records.len(), 1);
        // Topics lookup failed, so the searched topic is the only tag.
        assert_eq!(outcome.records[0].tags, vec!["llm"]);
    }

    #[test]
    fn test_dedups_across_topics_and_sorts_by_stars() {
        let tmp = TempDir::new().unwrap();
        let source = FakeSource::default()
            .with_topic("llm", vec![repo("a/low", 1), repo("a/shared", 50)])
            .with_topic(
                "agents",
                vec![
                    repo("a/shared", 50),
                    repo("a/high", 500),
                    json!({ "full_name": "bad/item" }),
                ],
            );
        let mut collector = ToolCollector::new(
            source,
            SeenSet::load(tmp.path().join("seen.json")),
            &config(),
            SeenPolicy::OnCollect,
        );

        let outcome = collector.collect(&topics(&["llm", "agents"])).unwrap();
        let names: Vec<&str> = outcome.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a / high", "a / shared", "a / low"]);
        assert_eq!(outcome.item_failures, 1);
        assert_eq!(outcome.skipped_seen, 1);
    }

    #[test]
    fn test_on_enriched_policy_defers_commit() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.json");
        let source = FakeSource::default().with_topic("llm", vec![repo("a/one", 5)]);
        let mut collector =
            ToolCollector::new(source, SeenSet::load(&path), &config(), SeenPolicy::OnEnriched);

        let records = collector.collect_all(&topics(&["llm"])).unwrap();
        assert_eq!(records.len(), 1);
        assert!(collector.seen().is_empty());
        assert!(!path.exists());

        let added = collector.commit(records.iter().map(|r| r.url.as_str())).unwrap();
        assert_eq!(added, 1);
        assert!(SeenSet::load(&path).contains("https://github.com/a/one"));
    }
}
