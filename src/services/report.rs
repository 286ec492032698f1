// src/services/report.rs

//! Report rendering.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};

use crate::error::Result;
use crate::models::{ReportFormat, ToolRecord};

/// Headline numbers of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStats {
    pub count: usize,
    pub total_stars: u64,
    pub languages: BTreeSet<String>,
}

impl ReportStats {
    pub fn from_records(records: &[ToolRecord]) -> Self {
        Self {
            count: records.len(),
            total_stars: records.iter().map(|r| r.stars).sum(),
            languages: records.iter().map(|r| r.language_key().to_string()).collect(),
        }
    }

    fn language_list(&self) -> String {
        self.languages.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Records grouped by language, groups in lexicographic order.
pub fn group_by_language(records: &[ToolRecord]) -> BTreeMap<&str, Vec<&ToolRecord>> {
    let mut groups: BTreeMap<&str, Vec<&ToolRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.language_key()).or_default().push(record);
    }
    groups
}

/// Render records into a document.
pub fn render(records: &[ToolRecord], format: ReportFormat, date: NaiveDate) -> String {
    match format {
        ReportFormat::Markdown => render_markdown(records, date),
        ReportFormat::Text => render_text(records, date),
    }
}

fn render_markdown(records: &[ToolRecord], date: NaiveDate) -> String {
    let stats = ReportStats::from_records(records);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "# AI Tools Report - {}\n", date.format("%Y-%m-%d"));
    let _ = writeln!(out, "## Overview\n");
    let _ = writeln!(out, "- New tools: {}", stats.count);
    let _ = writeln!(out, "- Total stars: {}", stats.total_stars);
    let _ = writeln!(out, "- Languages: {}\n", stats.language_list());

    for (language, group) in group_by_language(records) {
        let _ = writeln!(out, "## {language}\n");
        for (i, record) in group.iter().enumerate() {
            let _ = writeln!(out, "### {}. {} ⭐{}\n", i + 1, record.name, record.stars);
            let _ = writeln!(out, "{}\n", record.summary());
            if record.analysis.is_some() {
                let _ = writeln!(out, "**Description**: {}\n", record.description);
            }
            let _ = writeln!(out, "**Tags**: {}\n", record.tags.join(", "));
            let _ = writeln!(out, "**{}**: [{}]({})\n", record.source, record.url, record.url);
            let _ = writeln!(out, "---\n");
        }
    }
    out
}

fn render_text(records: &[ToolRecord], date: NaiveDate) -> String {
    let stats = ReportStats::from_records(records);
    let rule = "=".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out, "AI Tools Report - {}", date.format("%Y-%m-%d"));
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "New tools:   {}", stats.count);
    let _ = writeln!(out, "Total stars: {}", stats.total_stars);
    let _ = writeln!(out, "Languages:   {}", stats.language_list());

    for (language, group) in group_by_language(records) {
        let _ = writeln!(out, "\n[{language}]");
        let _ = writeln!(out, "{}", "-".repeat(60));
        for (i, record) in group.iter().enumerate() {
            let _ = writeln!(out, "{}. {} ({} stars)", i + 1, record.name, record.stars);
            for line in record.summary().lines() {
                let _ = writeln!(out, "   {line}");
            }
            let _ = writeln!(out, "   Tags: {}", record.tags.join(", "));
            let _ = writeln!(out, "   Link: {}\n", record.url);
        }
    }
    out
}

/// File name of a report written at `now`.
pub fn report_file_name(format: ReportFormat, now: DateTime<Local>) -> String {
    format!("ai_tools_{}.{}", now.format("%Y%m%d_%H%M%S"), format.extension())
}

/// Render and store a report under `dir`, returning its path.
pub fn write_report(
    dir: &Path,
    records: &[ToolRecord],
    format: ReportFormat,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(format, now));
    fs::write(&path, render(records, format, now.date_naive()))?;
    log::info!("Report saved to {}", path.display());
    Ok(path)
}
