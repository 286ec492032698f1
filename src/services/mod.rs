//! Service layer.
//!
//! - Repository search (`GitHubClient`, `ToolCollector`)
//! - API key resolution (`KeyManager`)
//! - Chat-completion enrichment (`DeepSeekClient`, `ProjectAnalyzer`)
//! - Report rendering (`report`)

pub mod analyzer;
pub mod collector;
pub mod deepseek;
pub mod github;
pub mod keys;
pub mod report;

pub use analyzer::ProjectAnalyzer;
pub use collector::{CollectOutcome, ToolCollector};
pub use deepseek::{CallError, ChatBackend, DeepSeekClient};
pub use github::{GitHubClient, RepoSource};
pub use keys::{KeyManager, KeySource};
