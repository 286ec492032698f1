// src/pipeline/run.rs

//! Collection, enrichment and report pipeline.

use std::path::PathBuf;

use chrono::Local;

use crate::error::{AppError, Result};
use crate::models::{AnalysisResult, Config, DegradedReason, ReportFormat, SeenPolicy, ToolRecord};
use crate::services::analyzer::degrade_all;
use crate::services::report::write_report;
use crate::services::{
    ChatBackend, DeepSeekClient, GitHubClient, KeyManager, ProjectAnalyzer, RepoSource,
    ToolCollector,
};
use crate::storage::SeenSet;
use crate::utils::log as console;

/// Options of a single run, usually taken from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Key given on the command line, preferred over cache and environment
    pub api_key: Option<String>,
    /// Analyze only the first few records
    pub test_mode: bool,
    /// Request AI analysis at all
    pub analyze: bool,
    /// Overrides the configured report format
    pub format: Option<ReportFormat>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            test_mode: false,
            analyze: true,
            format: None,
        }
    }
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Written report, `None` when nothing new was found
    pub report: Option<PathBuf>,
    pub collected: usize,
    pub enriched: usize,
    pub degraded: usize,
    pub skipped_seen: usize,
    pub topic_failures: usize,
    pub item_failures: usize,
}

/// Run the full pipeline against GitHub and DeepSeek.
pub fn run_pipeline(config: &Config, options: &RunOptions) -> Result<RunSummary> {
    let source = GitHubClient::new(&config.collector)?;
    let seen = SeenSet::load(&config.paths.seen_file);
    let collector = ToolCollector::new(source, seen, &config.collector, config.state.seen_policy);
    let keys = KeyManager::from_config(config);

    run_with(config, options, collector, &keys, |key| {
        DeepSeekClient::new(key, &config.analyzer)
    })
}

/// Run the pipeline with injected collaborators.
///
/// `connect` builds the chat backend once a key has been resolved.
pub fn run_with<S, B, F>(
    config: &Config,
    options: &RunOptions,
    mut collector: ToolCollector<S>,
    keys: &KeyManager,
    connect: F,
) -> Result<RunSummary>
where
    S: RepoSource,
    B: ChatBackend,
    F: FnOnce(&str) -> Result<B>,
{
    console::header("AI tools collection");

    console::step(1, 3, "Collecting repositories from GitHub");
    let outcome = collector.collect(&config.collector.topics)?;
    let mut summary = RunSummary {
        collected: outcome.records.len(),
        skipped_seen: outcome.skipped_seen,
        topic_failures: outcome.topic_failures,
        item_failures: outcome.item_failures,
        ..RunSummary::default()
    };
    console::sub_item(&format!(
        "{} new, {} already seen, {}/{} topics failed",
        summary.collected, summary.skipped_seen, summary.topic_failures, outcome.topic_total
    ));

    if outcome.records.is_empty() {
        log::warn!("No new tools collected, skipping report");
        console::success("Nothing new today");
        return Ok(summary);
    }

    let records = if options.analyze {
        console::step(2, 3, "Analyzing repositories");
        let limit = if options.test_mode {
            config.analyzer.test_limit.min(outcome.records.len())
        } else {
            outcome.records.len()
        };
        let (selected, rest) = outcome.records.split_at(limit);
        if options.test_mode {
            log::info!("Test mode: analyzing {} of {} records", limit, outcome.records.len());
        }

        let results = enrich(config, options, keys, connect, selected)?;
        summary.enriched = results.iter().filter(|r| r.is_enriched()).count();
        summary.degraded = results.len() - summary.enriched;

        if config.state.seen_policy == SeenPolicy::OnEnriched {
            collector.commit(
                results
                    .iter()
                    .filter(|r| r.is_enriched())
                    .map(|r| r.original_data.url.as_str()),
            )?;
        }

        results
            .into_iter()
            .map(AnalysisResult::into_record)
            .chain(rest.iter().cloned())
            .collect::<Vec<ToolRecord>>()
    } else {
        console::step(2, 3, "Analysis disabled, skipping");
        if config.state.seen_policy == SeenPolicy::OnEnriched {
            collector.commit(outcome.records.iter().map(|r| r.url.as_str()))?;
        }
        outcome.records
    };

    if config.logging.show_progress {
        for record in &records {
            console::sub_item(&format!("{} ⭐{}", record.name, record.stars));
        }
    }

    console::step(3, 3, "Writing report");
    let format = options.format.unwrap_or(config.report.format);
    let path = write_report(&config.paths.output_dir, &records, format, Local::now())?;
    console::success(&format!("Report saved to {}", path.display()));

    console::summary(
        "Run summary",
        &[
            ("New tools", summary.collected.to_string()),
            ("Analyzed", summary.enriched.to_string()),
            ("Degraded", summary.degraded.to_string()),
            ("Report", path.display().to_string()),
        ],
    );

    summary.report = Some(path);
    Ok(summary)
}

fn enrich<B, F>(
    config: &Config,
    options: &RunOptions,
    keys: &KeyManager,
    connect: F,
    records: &[ToolRecord],
) -> Result<Vec<AnalysisResult>>
where
    B: ChatBackend,
    F: FnOnce(&str) -> Result<B>,
{
    let key = match keys.resolve_key(options.api_key.as_deref()) {
        Ok(key) => key,
        Err(AppError::MissingCredential { env_var }) => {
            log::error!("No API key found, records will be reported without analysis");
            let detail = format!("set {env_var} or pass --api-key");
            return Ok(degrade_all(records, DegradedReason::MissingCredential { detail }));
        }
        Err(e) => return Err(e),
    };

    let backend = match connect(&key) {
        Ok(backend) => backend,
        Err(e) => {
            log::error!("Analysis client could not be built: {}", e);
            let detail = e.to_string();
            return Ok(degrade_all(records, DegradedReason::BackendUnavailable { detail }));
        }
    };
    let mut analyzer = ProjectAnalyzer::new(backend, &config.analyzer);
    Ok(analyzer.analyze_all(records))
}
