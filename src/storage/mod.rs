//! Persistent state kept between runs.
//!
//! ## Directory Structure
//!
//! ```text
//! {workdir}/
//! ├── config/
//! │   └── api_keys.json          # Cached API key with expiry
//! └── output/
//!     ├── github_seen_urls.json  # Seen-set: sorted array of repository URLs
//!     └── ai_tools_YYYYmmdd_HHMMSS.md
//! ```

pub mod local;
pub mod seen;

// Re-export for convenience
pub use local::JsonFile;
pub use seen::SeenSet;
