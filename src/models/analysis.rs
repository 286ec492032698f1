//! Enrichment results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ToolRecord;

/// Why a record could not be enriched.
///
/// The `Display` text is what the report shows in place of the analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradedReason {
    #[error("Analysis unavailable: no API key configured ({detail})")]
    MissingCredential { detail: String },

    #[error("Analysis unavailable: the API key was rejected ({detail})")]
    InvalidCredential { detail: String },

    #[error("Analysis unavailable: could not set up the analysis client ({detail})")]
    BackendUnavailable { detail: String },

    #[error("Analysis failed: request timed out after {attempts} attempt(s), try again later or raise the timeout")]
    Timeout { attempts: u32 },

    #[error("Analysis failed: API still returned {status} after {attempts} attempt(s), check the network or API settings")]
    RetriesExhausted { status: u16, attempts: u32 },

    #[error("Analysis failed: API returned error {status}")]
    ApiError { status: u16 },

    #[error("Analysis failed: unexpected response ({0})")]
    MalformedResponse(String),

    #[error("Analysis failed: {0}")]
    Transport(String),
}

/// Terminal state of a record after enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalysisStatus {
    Enriched,
    Degraded { reason: DegradedReason },
}

/// Analysis of a single record. Produced for every input record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub project_name: String,

    /// Completion text, or the failure explanation when degraded
    pub analysis: String,

    pub analyzed_at: NaiveDate,

    pub original_data: ToolRecord,

    pub status: AnalysisStatus,
}

impl AnalysisResult {
    /// Wrap the outcome of one enrichment attempt.
    pub fn from_outcome(
        record: &ToolRecord,
        outcome: std::result::Result<String, DegradedReason>,
    ) -> Self {
        let (analysis, status) = match outcome {
            Ok(text) => (text, AnalysisStatus::Enriched),
            Err(reason) => (reason.to_string(), AnalysisStatus::Degraded { reason }),
        };

        Self {
            project_name: record.name.clone(),
            analysis,
            analyzed_at: record.discovered_date,
            original_data: record.clone(),
            status,
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self.status, AnalysisStatus::Enriched)
    }

    pub fn degraded_reason(&self) -> Option<&DegradedReason> {
        match &self.status {
            AnalysisStatus::Degraded { reason } => Some(reason),
            AnalysisStatus::Enriched => None,
        }
    }

    /// The original record carrying this result's analysis text.
    pub fn into_record(self) -> ToolRecord {
        let mut record = self.original_data;
        record.analysis = Some(self.analysis);
        record
    }
}
