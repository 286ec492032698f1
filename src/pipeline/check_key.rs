// src/pipeline/check_key.rs

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::{DeepSeekClient, KeyManager, ProjectAnalyzer};
use crate::utils::log as console;
use crate::utils::mask_key;

/// Resolve and validate the API key, returning the model that would be used.
pub fn run_check_key(config: &Config, api_key: Option<&str>) -> Result<String> {
    console::header("API key check");

    let keys = KeyManager::from_config(config);
    let key = keys.resolve_key(api_key)?;
    console::sub_item(&format!("Key: {}", mask_key(&key)));

    let backend = DeepSeekClient::new(&key, &config.analyzer)?;
    let mut analyzer = ProjectAnalyzer::new(backend, &config.analyzer);
    match analyzer.check_key() {
        Ok(()) => {
            console::success(&format!("Key accepted, model {}", analyzer.model()));
            Ok(analyzer.model().to_string())
        }
        Err(detail) => Err(AppError::validation(format!("API key rejected: {detail}"))),
    }
}
