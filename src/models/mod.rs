// src/models/mod.rs

//! Domain models for the toolwatch application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod analysis;
mod config;
mod credential;
mod tool;

// Re-export all public types
pub use analysis::{AnalysisResult, AnalysisStatus, DegradedReason};
pub use config::{
    AnalyzerConfig, CollectorConfig, Config, DelayRange, LoggingConfig, MAX_KEY_TTL_DAYS,
    PathsConfig, ReportConfig, ReportFormat, SeenPolicy, StateConfig,
};
pub use credential::{Credential, CredentialFile};
pub use tool::{NO_DESCRIPTION, RepoSummary, ToolRecord, UNKNOWN_LANGUAGE};
