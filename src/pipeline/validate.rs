// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;
use crate::utils::log as console;

/// Load the configuration file strictly and check its values.
pub fn run_validate(config_path: &Path) -> Result<Config> {
    console::header("Validating configuration");

    let config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        log::warn!("{} not found, checking defaults", config_path.display());
        Config::default()
    };

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    console::success("Config OK");
    console::sub_item(&format!("User agent: {}", config.collector.user_agent));
    console::sub_item(&format!("Topics: {}", config.collector.topics.join(", ")));
    console::sub_item(&format!("Results per topic: {}", config.collector.per_page));
    console::sub_item(&format!(
        "Model: {} (timeout {}s, {} retries)",
        config.analyzer.model, config.analyzer.request_timeout_secs, config.analyzer.max_retries
    ));
    console::sub_item(&format!("Seen-set: {}", config.paths.seen_file.display()));
    console::sub_item(&format!("Reports: {}", config.paths.output_dir.display()));
    Ok(config)
}
