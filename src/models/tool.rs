//! Tool record data structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Language placeholder for repositories GitHub could not classify.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Description placeholder for repositories without one.
pub const NO_DESCRIPTION: &str = "No description";

/// A repository discovered by the collector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolRecord {
    /// Display name (`owner / repo`)
    pub name: String,

    pub description: String,

    /// Repository page, unique identifier of the record
    pub url: String,

    /// Platform the record came from
    pub source: String,

    pub stars: u64,

    pub language: String,

    /// Topic tags in the order the platform returns them
    pub tags: Vec<String>,

    pub discovered_date: NaiveDate,

    /// AI analysis or a failure explanation, once enrichment ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

impl ToolRecord {
    /// Create a record, rejecting missing identity fields.
    ///
    /// Blank descriptions and languages are replaced by their placeholders.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        discovered_date: NaiveDate,
    ) -> Result<Self> {
        let name = name.into();
        let url = url.into();
        if name.trim().is_empty() {
            return Err(AppError::validation("tool record has an empty name"));
        }
        if url.trim().is_empty() {
            return Err(AppError::validation(format!(
                "tool record '{name}' has an empty url"
            )));
        }

        Ok(Self {
            name,
            description: NO_DESCRIPTION.to_string(),
            url,
            source: source.into(),
            stars: 0,
            language: UNKNOWN_LANGUAGE.to_string(),
            tags: Vec::new(),
            discovered_date,
            analysis: None,
        })
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = non_blank(description).unwrap_or(NO_DESCRIPTION).to_string();
        self
    }

    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = non_blank(language).unwrap_or(UNKNOWN_LANGUAGE).to_string();
        self
    }

    pub fn with_stars(mut self, stars: u64) -> Self {
        self.stars = stars;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Language used to group the record in reports.
    pub fn language_key(&self) -> &str {
        non_blank(Some(&self.language)).unwrap_or(UNKNOWN_LANGUAGE)
    }

    /// Text shown for the record: analysis when present, description otherwise.
    pub fn summary(&self) -> &str {
        self.analysis.as_deref().unwrap_or(&self.description)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Repository summary as returned by the GitHub search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
}

impl RepoSummary {
    /// Normalize into a record; tags are attached separately.
    pub fn into_record(self, discovered_date: NaiveDate) -> Result<ToolRecord> {
        let name = self.full_name.replace('/', " / ");
        Ok(ToolRecord::new(name, self.html_url, "GitHub", discovered_date)?
            .with_description(self.description.as_deref())
            .with_language(self.language.as_deref())
            .with_stars(self.stargazers_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_url() {
        assert!(ToolRecord::new("a / b", "  ", "GitHub", date()).is_err());
        assert!(ToolRecord::new("", "https://github.com/a/b", "GitHub", date()).is_err());
    }

    #[test]
    fn test_summary_normalization() {
        let summary = RepoSummary {
            full_name: "openai/whisper".to_string(),
            html_url: "https://github.com/openai/whisper".to_string(),
            description: None,
            stargazers_count: 42,
            language: Some("   ".to_string()),
        };

        let record = summary.into_record(date()).unwrap();
        assert_eq!(record.name, "openai / whisper");
        assert_eq!(record.description, NO_DESCRIPTION);
        assert_eq!(record.language, UNKNOWN_LANGUAGE);
        assert_eq!(record.source, "GitHub");
        assert_eq!(record.stars, 42);
        assert!(record.analysis.is_none());
    }

    #[test]
    fn test_summary_prefers_analysis() {
        let mut record = ToolRecord::new("a / b", "https://github.com/a/b", "GitHub", date())
            .unwrap()
            .with_description(Some("desc"));
        assert_eq!(record.summary(), "desc");

        record.analysis = Some("analysis".to_string());
        assert_eq!(record.summary(), "analysis");
    }

    #[test]
    fn test_summary_deserializes_nulls() {
        let json = r#"{
            "full_name": "a/b",
            "html_url": "https://github.com/a/b",
            "description": null,
            "stargazers_count": 7,
            "language": null
        }"#;
        let summary: RepoSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.stargazers_count, 7);
        assert!(summary.language.is_none());
    }
}
