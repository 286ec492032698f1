//! Utility functions and helpers.

pub mod http;
pub mod log;
pub mod retry;

use std::thread;
use std::time::Duration;

use rand::Rng;
use unicode_segmentation::UnicodeSegmentation;

use crate::models::DelayRange;

/// Pick a random pause within the range (bounds inclusive).
pub fn jitter(range: DelayRange) -> Duration {
    let (low, high) = if range.min <= range.max {
        (range.min, range.max)
    } else {
        (range.max, range.min)
    };
    if low == high {
        return Duration::from_millis(low);
    }
    Duration::from_millis(rand::rng().random_range(low..=high))
}

/// Sleep for a random pause within the range.
pub fn pause(range: DelayRange) {
    let wait = jitter(range);
    if !wait.is_zero() {
        thread::sleep(wait);
    }
}

/// Shorten text to at most `max` grapheme clusters, appending `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Read an environment variable, treating empty values as unset.
pub fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Show only the first characters of a secret.
pub fn mask_key(key: &str) -> String {
    truncate(key, 8)
}
