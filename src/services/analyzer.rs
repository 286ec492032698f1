// src/services/analyzer.rs

//! Project analyzer.
//!
//! Validates the API key once, then asks the chat backend for an analysis of
//! each record. Every record yields an [`AnalysisResult`]; failures degrade
//! the record instead of dropping it.

use std::thread;
use std::time::Duration;

use crate::models::{AnalysisResult, AnalyzerConfig, DegradedReason, ToolRecord};
use crate::services::deepseek::{CallError, ChatBackend, ChatMessage, ChatRequest};
use crate::utils::http::RETRYABLE_STATUSES;
use crate::utils::retry::{RetryDecision, RetryPolicy, RetryState, TransientFailure};

const SYSTEM_PROMPT: &str = "You are a senior engineer reviewing open-source AI tools. \
Answer in concise Markdown.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyStatus {
    Unchecked,
    Valid,
    Invalid(String),
}

/// Enriches tool records through a [`ChatBackend`].
pub struct ProjectAnalyzer<B> {
    backend: B,
    model: String,
    temperature: f32,
    retry: RetryPolicy,
    key_status: KeyStatus,
}

impl<B: ChatBackend> ProjectAnalyzer<B> {
    pub fn new(backend: B, config: &AnalyzerConfig) -> Self {
        Self {
            backend,
            model: config.model.clone(),
            temperature: config.temperature,
            retry: RetryPolicy::new(
                config.max_retries,
                Duration::from_secs(config.retry_base_secs),
            ),
            key_status: KeyStatus::Unchecked,
        }
    }

    /// Model used for completions; may change after key validation.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Validate the key against the model list. Runs once per analyzer.
    ///
    /// Returns the rejection detail when the key is unusable.
    pub fn check_key(&mut self) -> Result<(), String> {
        if self.key_status == KeyStatus::Unchecked {
            self.key_status = match self.backend.list_models() {
                Ok(models) => {
                    if let Some(first) = models.and_then(|m| m.into_iter().next()) {
                        log::info!("API key valid, using model {}", first);
                        self.model = first;
                    } else {
                        log::info!("API key valid, keeping model {}", self.model);
                    }
                    KeyStatus::Valid
                }
                Err(e) => {
                    log::error!("API key validation failed: {}", e);
                    KeyStatus::Invalid(e.to_string())
                }
            };
        }

        match &self.key_status {
            KeyStatus::Invalid(detail) => Err(detail.clone()),
            _ => Ok(()),
        }
    }

    /// Analyze one record.
    pub fn analyze(&mut self, record: &ToolRecord) -> AnalysisResult {
        let outcome = match self.check_key() {
            Ok(()) => self.request_analysis(record),
            Err(detail) => Err(DegradedReason::InvalidCredential { detail }),
        };

        if let Err(reason) = &outcome {
            log::warn!("{}: {}", record.name, reason);
        }
        AnalysisResult::from_outcome(record, outcome)
    }

    /// Analyze every record in order. The output has one entry per input.
    pub fn analyze_all(&mut self, records: &[ToolRecord]) -> Vec<AnalysisResult> {
        if let Err(detail) = self.check_key() {
            return degrade_all(records, DegradedReason::InvalidCredential { detail });
        }

        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                log::info!("Analyzing {}/{}: {}", i + 1, records.len(), record.name);
                self.analyze(record)
            })
            .collect()
    }

    fn request_analysis(&self, record: &ToolRecord) -> Result<String, DegradedReason> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(record)),
            ],
            temperature: self.temperature,
        };

        let mut state = RetryState::new(self.retry);
        loop {
            let failure = match self.backend.complete(&request) {
                Ok(text) => return Ok(text),
                Err(CallError::Timeout) => TransientFailure::Timeout,
                Err(CallError::Status { status, .. }) if RETRYABLE_STATUSES.contains(&status) => {
                    TransientFailure::Status(status)
                }
                Err(CallError::Status { status, body }) => {
                    log::debug!("{} rejected with {}: {}", record.name, status, body);
                    return Err(DegradedReason::ApiError { status });
                }
                Err(CallError::Malformed(detail)) => {
                    return Err(DegradedReason::MalformedResponse(detail));
                }
                Err(CallError::Transport(detail)) => return Err(DegradedReason::Transport(detail)),
            };

            match state.on_failure(failure) {
                RetryDecision::Retry { retry, wait } => {
                    log::warn!(
                        "{}: {:?}, retry {}/{} in {:?}",
                        record.name,
                        failure,
                        retry,
                        self.retry.max_retries,
                        wait
                    );
                    if !wait.is_zero() {
                        thread::sleep(wait);
                    }
                }
                RetryDecision::GiveUp { attempts, last } => {
                    return Err(match last {
                        TransientFailure::Timeout => DegradedReason::Timeout { attempts },
                        TransientFailure::Status(status) => {
                            DegradedReason::RetriesExhausted { status, attempts }
                        }
                    });
                }
            }
        }
    }
}

/// Degrade every record with the same reason, keeping order.
pub fn degrade_all(records: &[ToolRecord], reason: DegradedReason) -> Vec<AnalysisResult> {
    records
        .iter()
        .map(|record| AnalysisResult::from_outcome(record, Err(reason.clone())))
        .collect()
}

/// User prompt for one record.
pub fn build_prompt(record: &ToolRecord) -> String {
    let tags = if record.tags.is_empty() {
        "none".to_string()
    } else {
        record.tags.join(", ")
    };

    format!(
        "Analyze the following open-source AI project.\n\n\
         Name: {}\n\
         Description: {}\n\
         Language: {}\n\
         Stars: {}\n\
         Tags: {}\n\n\
         Cover: 1) core functionality 2) technical highlights \
         3) typical use cases 4) how it compares with similar projects.",
        record.name,
        record.description,
        record.language_key(),
        record.stars,
        tags
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisStatus;
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Backend replaying scripted outcomes; an empty script succeeds.
    struct ScriptedBackend {
        models: std::result::Result<Option<Vec<String>>, CallError>,
        replies: RefCell<VecDeque<std::result::Result<String, CallError>>>,
        calls: Cell<usize>,
        last_model: RefCell<Option<String>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<std::result::Result<String, CallError>>) -> Self {
            Self {
                models: Ok(Some(vec!["deepseek-chat".to_string()])),
                replies: RefCell::new(replies.into()),
                calls: Cell::new(0),
                last_model: RefCell::new(None),
            }
        }

        fn rejecting() -> Self {
            Self {
                models: Err(CallError::Status {
                    status: 401,
                    body: "invalid key".to_string(),
                }),
                ..Self::new(Vec::new())
            }
        }
    }

    impl ChatBackend for &ScriptedBackend {
        fn list_models(&self) -> std::result::Result<Option<Vec<String>>, CallError> {
            self.models.clone()
        }

        fn complete(&self, request: &ChatRequest) -> std::result::Result<String, CallError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_model.borrow_mut() = Some(request.model.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok("analysis".to_string()))
        }
    }

    fn config() -> AnalyzerConfig {
        AnalyzerConfig {
            retry_base_secs: 0,
            ..AnalyzerConfig::default()
        }
    }

    fn record(name: &str) -> ToolRecord {
        ToolRecord::new(
            name,
            format!("https://github.com/{name}"),
            "GitHub",
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
        )
        .unwrap()
    }

    fn unavailable() -> std::result::Result<String, CallError> {
        Err(CallError::Status {
            status: 503,
            body: String::new(),
        })
    }

    #[test]
    fn test_transient_statuses_then_success() {
        let backend = ScriptedBackend::new(vec![unavailable(), unavailable()]);
        let mut analyzer = ProjectAnalyzer::new(&backend, &config());

        let result = analyzer.analyze(&record("a/b"));
        assert!(result.is_enriched());
        assert_eq!(result.analysis, "analysis");
        assert_eq!(backend.calls.get(), 3);
    }

    #[test]
    fn test_exhausted_retries_degrade() {
        let backend = ScriptedBackend::new(vec![unavailable(), unavailable(), unavailable()]);
        let mut analyzer = ProjectAnalyzer::new(&backend, &config());

        let result = analyzer.analyze(&record("a/b"));
        assert_eq!(
            result.degraded_reason(),
            Some(&DegradedReason::RetriesExhausted {
                status: 503,
                attempts: 3
            })
        );
        assert_eq!(backend.calls.get(), 3);
    }

    #[test]
    fn test_invalid_key_skips_requests() {
        let backend = ScriptedBackend::rejecting();
        let mut analyzer = ProjectAnalyzer::new(&backend, &config());
        let records = vec![record("a/one"), record("a/two"), record("a/three")];

        let results = analyzer.analyze_all(&records);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| matches!(
            r.degraded_reason(),
            Some(DegradedReason::InvalidCredential { .. })
        )));
        assert_eq!(backend.calls.get(), 0);
        assert!(analyzer.check_key().is_err());
    }

    #[test]
    fn test_timeouts_degrade_and_next_record_continues() {
        let backend = ScriptedBackend::new(vec![
            Err(CallError::Timeout),
            Err(CallError::Timeout),
            Err(CallError::Timeout),
        ]);
        let mut analyzer = ProjectAnalyzer::new(&backend, &config());
        let records = vec![record("slow/one"), record("fast/two")];

        let results = analyzer.analyze_all(&records);
        assert_eq!(results.len(), 2);
        let reason = results[0].degraded_reason().unwrap();
        assert!(matches!(reason, DegradedReason::Timeout { .. }));
        assert!(results[0].analysis.contains("timed out"));
        assert!(results[1].is_enriched());
        assert_eq!(results[1].project_name, "fast/two");
    }

    #[test]
    fn test_non_retryable_failures_fail_fast() {
        let backend = ScriptedBackend::new(vec![
            Err(CallError::Status {
                status: 400,
                body: "bad request".to_string(),
            }),
            Err(CallError::Malformed("no choices".to_string())),
        ]);
        let mut analyzer = ProjectAnalyzer::new(&backend, &config());

        let first = analyzer.analyze(&record("a/one"));
        assert_eq!(
            first.status,
            AnalysisStatus::Degraded {
                reason: DegradedReason::ApiError { status: 400 }
            }
        );
        let second = analyzer.analyze(&record("a/two"));
        assert!(matches!(
            second.degraded_reason(),
            Some(DegradedReason::MalformedResponse(_))
        ));
        assert_eq!(backend.calls.get(), 2);
    }

    #[test]
    fn test_listed_model_replaces_default() {
        let mut backend = ScriptedBackend::new(Vec::new());
        backend.models = Ok(Some(vec!["deepseek-reasoner".to_string()]));
        let mut analyzer = ProjectAnalyzer::new(&backend, &config());

        analyzer.analyze(&record("a/b"));
        assert_eq!(analyzer.model(), "deepseek-reasoner");
        assert_eq!(
            backend.last_model.borrow().as_deref(),
            Some("deepseek-reasoner")
        );
    }

    #[test]
    fn test_prompt_embeds_record_fields() {
        let record = record("a/b")
            .with_description(Some("Agent toolkit"))
            .with_stars(42)
            .with_tags(vec!["llm".into(), "agents".into()]);

        let prompt = build_prompt(&record);
        assert!(prompt.contains("Name: a/b"));
        assert!(prompt.contains("Agent toolkit"));
        assert!(prompt.contains("Language: unknown"));
        assert!(prompt.contains("Stars: 42"));
        assert!(prompt.contains("llm, agents"));
    }
}
