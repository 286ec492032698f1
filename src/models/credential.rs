//! API credential and its cache file format.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An API key together with its cache lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub key: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Issue a credential valid for `ttl` from `now`.
    pub fn issue(key: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// On-disk layout of the key cache.
///
/// Timestamps are written as RFC 3339. Naive local timestamps without an
/// offset are accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialFile {
    pub deepseek_api_key: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub expires_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }
}

impl From<&Credential> for CredentialFile {
    fn from(credential: &Credential) -> Self {
        Self {
            deepseek_api_key: credential.key.clone(),
            expires_at: credential.expires_at,
            updated_at: credential.issued_at,
        }
    }
}

impl From<CredentialFile> for Credential {
    fn from(file: CredentialFile) -> Self {
        Self {
            key: file.deepseek_api_key,
            issued_at: file.updated_at,
            expires_at: file.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDateTime, TimeZone};

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let credential = Credential::issue("sk-test", now, Duration::days(30));

        assert!(credential.is_valid_at(now));
        assert!(credential.is_valid_at(now + Duration::days(29)));
        assert!(!credential.is_valid_at(now + Duration::days(30)));
    }

    #[test]
    fn test_file_uses_iso_timestamps() {
        let now = DateTime::parse_from_rfc3339("2026-10-17T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let credential = Credential::issue("sk-test", now, Duration::days(30));

        let json = serde_json::to_value(CredentialFile::from(&credential)).unwrap();
        assert_eq!(json["deepseek_api_key"], "sk-test");
        assert_eq!(json["expires_at"], "2026-11-16T08:00:00Z");
        assert_eq!(json["updated_at"], "2026-10-17T08:00:00Z");
    }

    #[test]
    fn test_reads_naive_local_timestamps() {
        let raw = r#"{
            "deepseek_api_key": "sk-legacy",
            "expires_at": "2026-11-16T08:00:00.123456",
            "updated_at": "2026-10-17T08:00:00"
        }"#;

        let file: CredentialFile = serde_json::from_str(raw).unwrap();
        let expected = Local
            .from_local_datetime(
                &NaiveDateTime::parse_from_str("2026-11-16T08:00:00.123456", "%Y-%m-%dT%H:%M:%S%.f")
                    .unwrap(),
            )
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(file.expires_at, expected);
        assert!(file.updated_at < file.expires_at);

        let bad = r#"{"deepseek_api_key": "k", "expires_at": "soon", "updated_at": "now"}"#;
        assert!(serde_json::from_str::<CredentialFile>(bad).is_err());
    }
}
