// src/pipeline/seen.rs

//! Seen-set maintenance commands.

use crate::error::Result;
use crate::models::Config;
use crate::storage::SeenSet;
use crate::utils::log as console;

/// Print every URL in the seen-set.
pub fn run_seen_show(config: &Config) -> Result<()> {
    let seen = SeenSet::load(&config.paths.seen_file);
    console::header(&format!("Seen-set: {}", seen.path().display()));

    if seen.is_empty() {
        console::sub_item("(empty)");
    }
    for url in seen.sorted() {
        console::sub_item(url);
    }
    console::success(&format!("{} URLs", seen.len()));
    Ok(())
}

/// Forget every URL so the next run collects everything again.
pub fn run_seen_clear(config: &Config) -> Result<usize> {
    let mut seen = SeenSet::load(&config.paths.seen_file);
    let count = seen.len();
    seen.clear()?;

    log::info!("Cleared {} URLs from {}", count, seen.path().display());
    console::success(&format!("Cleared {count} URLs"));
    Ok(count)
}

/// Evict one URL. Returns whether it was present.
pub fn run_seen_remove(config: &Config, url: &str) -> Result<bool> {
    let mut seen = SeenSet::load(&config.paths.seen_file);
    let removed = seen.remove(url)?;

    if removed {
        console::success(&format!("Removed {url}"));
    } else {
        log::warn!("{} is not in the seen-set", url);
    }
    Ok(removed)
}
