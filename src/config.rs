//! File-based configuration at ~/.cep/config.json.
//!
//! Every field has a default, so a partial (or missing) file is fine.

use crate::lookup::{builtin_provider, CepResolver, BUILTIN_PROVIDER_IDS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lower bound on the request timeout; zero would make every provider miss.
pub const MIN_TIMEOUT_SECS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider identifiers to register, e.g. `["viacep", "opencep"]`.
    pub providers: Vec<String>,
    /// Per-request timeout for every provider.
    pub timeout_secs: u64,
    /// Accepted for compatibility; the chain does not retry.
    pub retry_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: BUILTIN_PROVIDER_IDS.iter().map(|s| s.to_string()).collect(),
            timeout_secs: 3,
            retry_attempts: 3,
        }
    }
}

impl Config {
    /// Load from the default location (~/.cep/config.json).
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load from a specific path. Missing file → defaults.
    pub fn load_from(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => return Self::default(),
        };
        serde_json::from_str(&data).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            Self::default()
        })
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cep")
            .join("config.json")
    }

    /// Apply command-line flags on top of file values.
    pub fn with_overrides(self, providers: Option<Vec<String>>, timeout_secs: Option<u64>) -> Self {
        Self {
            providers: providers.unwrap_or(self.providers),
            timeout_secs: timeout_secs.unwrap_or(self.timeout_secs),
            ..self
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(MIN_TIMEOUT_SECS))
    }

    /// Build a resolver with the configured providers. An empty list means the built-ins.
    pub fn build_resolver(&self) -> CepResolver {
        let ids: Vec<&str> = if self.providers.is_empty() {
            BUILTIN_PROVIDER_IDS.to_vec()
        } else {
            self.providers.iter().map(String::as_str).collect()
        };

        if self.timeout_secs < MIN_TIMEOUT_SECS {
            tracing::warn!(
                timeout_secs = self.timeout_secs,
                "timeout too small, using {}s",
                MIN_TIMEOUT_SECS
            );
        }

        let mut resolver = CepResolver::new();
        for id in ids {
            match builtin_provider(id, self.timeout()) {
                Some(provider) => {
                    resolver.add_boxed(provider);
                }
                None => tracing::warn!(provider = id, "unknown provider, skipping"),
            }
        }
        tracing::debug!(
            providers = resolver.providers().len(),
            timeout_secs = self.timeout_secs,
            retry_attempts = self.retry_attempts,
            "resolver configured"
        );
        resolver
    }
}
