//! Core types for the CEP lookup subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Input shape a provider expects its CEP in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CepFormat {
    /// `01310930`
    DigitsOnly,
    /// `01310-930`
    Hyphenated,
    /// Whatever the caller typed, untouched.
    Any,
}

impl fmt::Display for CepFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DigitsOnly => write!(f, "digits_only"),
            Self::Hyphenated => write!(f, "hyphenated"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// A resolved address in the common shape shared by every provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub postal_code: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub complement: String,
    /// Fixed identifier of the provider that answered (e.g. "viacep").
    pub provider_id: String,
    /// Digits-only form of the CEP the caller asked for.
    /// Empty until the resolver attaches it.
    #[serde(default)]
    pub normalized_input_code: String,
}

impl AddressRecord {
    pub fn with_normalized_input_code(self, normalized_input_code: impl Into<String>) -> Self {
        Self {
            normalized_input_code: normalized_input_code.into(),
            ..self
        }
    }

    /// One-line human summary for terminal output.
    pub fn display_line(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for part in [&self.street, &self.neighborhood] {
            if !part.is_empty() {
                parts.push(part);
            }
        }
        let city_state = match (self.city.is_empty(), self.state.is_empty()) {
            (false, false) => format!("{}/{}", self.city, self.state),
            (false, true) => self.city.clone(),
            (true, false) => self.state.clone(),
            (true, true) => String::new(),
        };
        let mut line = parts.join(", ");
        if !city_state.is_empty() {
            if !line.is_empty() {
                line.push_str(" \u{2014} ");
            }
            line.push_str(&city_state);
        }
        format!("{} [{}]", line, self.provider_id)
    }
}

/// Static metadata describing a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub priority: i32,
    pub has_fallback: bool,
    pub required_format: CepFormat,
}

/// CEP lookup errors surfaced by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Input does not reduce to exactly 8 digits.
    InvalidCep(String),
    /// Valid CEP, but the chain produced no record.
    NotFound(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCep(cep) => write!(f, "Invalid CEP: '{}' (expected 8 digits, e.g. 01310-930)", cep),
            Self::NotFound(cep) => write!(f, "CEP not found: '{}'", cep),
        }
    }
}

impl std::error::Error for LookupError {}
