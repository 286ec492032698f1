//! Pipeline entry points for CLI operations.
//!
//! - `run_pipeline`: Collect, analyze and report new AI repositories
//! - `run_seen_*`: Inspect and edit the seen-set
//! - `run_check_key`: Resolve and validate the API key
//! - `run_validate`: Check the configuration file

pub mod check_key;
pub mod run;
pub mod seen;
pub mod validate;

pub use check_key::run_check_key;
pub use run::{RunOptions, RunSummary, run_pipeline, run_with};
pub use seen::{run_seen_clear, run_seen_remove, run_seen_show};
pub use validate::run_validate;
