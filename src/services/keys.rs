// src/services/keys.rs

//! API key resolution and caching.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::error::{AppError, Result};
use crate::models::{Config, Credential, CredentialFile, MAX_KEY_TTL_DAYS};
use crate::storage::JsonFile;
use crate::utils::{env_value, mask_key};

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Explicit,
    Cache,
    Environment,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeySource::Explicit => "command line",
            KeySource::Cache => "key cache",
            KeySource::Environment => "environment",
        })
    }
}

/// Resolves the chat API key: explicit → cached (unexpired) → environment.
pub struct KeyManager {
    cache: JsonFile,
    env_var: String,
    ttl: Duration,
}

impl KeyManager {
    /// `ttl_days` is clamped to `1..=MAX_KEY_TTL_DAYS`.
    pub fn new(cache_path: impl Into<PathBuf>, env_var: impl Into<String>, ttl_days: i64) -> Self {
        Self {
            cache: JsonFile::new(cache_path),
            env_var: env_var.into(),
            ttl: Duration::days(ttl_days.clamp(1, MAX_KEY_TTL_DAYS)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.paths.key_cache,
            &config.analyzer.api_key_env,
            config.analyzer.key_ttl_days,
        )
    }

    /// Resolve a key and refresh its cache entry.
    pub fn resolve_key(&self, explicit: Option<&str>) -> Result<String> {
        self.resolve_with(explicit, env_value(&self.env_var), Utc::now())
    }

    fn resolve_with(
        &self,
        explicit: Option<&str>,
        env_key: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let (key, source) = explicit
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| (k.to_string(), KeySource::Explicit))
            .or_else(|| self.load_cached(now).map(|c| (c.key, KeySource::Cache)))
            .or_else(|| env_key.map(|k| (k, KeySource::Environment)))
            .ok_or_else(|| AppError::missing_credential(&self.env_var))?;

        log::info!("Using API key {} from {}", mask_key(&key), source);
        self.store(&Credential::issue(key.clone(), now, self.ttl));
        Ok(key)
    }

    /// Cached credential, if present, readable and unexpired at `now`.
    pub fn load_cached(&self, now: DateTime<Utc>) -> Option<Credential> {
        let file = match self.cache.read::<CredentialFile>() {
            Ok(Some(file)) => file,
            Ok(None) => return None,
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable key cache {}: {}",
                    self.cache.path().display(),
                    e
                );
                return None;
            }
        };

        let credential = Credential::from(file);
        if credential.key.trim().is_empty() {
            return None;
        }
        if !credential.is_valid_at(now) {
            log::info!("Cached API key expired at {}", credential.expires_at);
            return None;
        }
        Some(credential)
    }

    fn store(&self, credential: &Credential) {
        match self.cache.write(&CredentialFile::from(credential)) {
            Ok(()) => log::debug!(
                "API key cached until {} in {}",
                credential.expires_at,
                self.cache.path().display()
            ),
            Err(e) => log::warn!("Failed to cache API key: {}", e),
        }
    }
}
