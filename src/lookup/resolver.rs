//! CEP resolver — orchestrates the provider fallback chain.
//!
//! Flow: validate → providers by priority (desc, stable) → first hit wins.
//! A provider without fallback that finds nothing ends the chain.

use super::formatter;
use super::providers::CepProvider;
use super::types::{AddressRecord, LookupError, ProviderDescriptor};

/// The resolver with its registered providers.
#[derive(Default)]
pub struct CepResolver {
    providers: Vec<Box<dyn CepProvider>>,
}

impl CepResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more provider. Registration order only matters between equal priorities.
    pub fn add_provider(&mut self, provider: impl CepProvider + 'static) -> &mut Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn add_boxed(&mut self, provider: Box<dyn CepProvider>) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Replace the whole registry.
    pub fn set_providers(&mut self, providers: Vec<Box<dyn CepProvider>>) -> &mut Self {
        self.providers = providers;
        self
    }

    pub fn clear_providers(&mut self) -> &mut Self {
        self.providers.clear();
        self
    }

    /// Registered providers, in registration order.
    pub fn providers(&self) -> &[Box<dyn CepProvider>] {
        &self.providers
    }

    /// Providers in the order a search will try them.
    fn chain(&self) -> Vec<&dyn CepProvider> {
        let mut chain: Vec<&dyn CepProvider> = self.providers.iter().map(|p| p.as_ref()).collect();
        // sort_by is stable: equal priorities keep registration order.
        chain.sort_by(|a, b| b.priority().cmp(&a.priority()));
        chain
    }

    /// Descriptors of the registered providers, in resolution order.
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.chain().into_iter().map(|p| p.descriptor()).collect()
    }

    /// Resolve a CEP, telling invalid input apart from a miss.
    pub fn lookup(&self, cep: &str) -> Result<AddressRecord, LookupError> {
        if !formatter::validate(cep) {
            tracing::debug!(cep, "invalid CEP");
            return Err(LookupError::InvalidCep(cep.to_string()));
        }

        for provider in self.chain() {
            let formatted = formatter::format(cep, provider.required_format());
            tracing::debug!(provider = provider.name(), cep = %formatted, "trying provider");

            if let Some(record) = provider.search(&formatted) {
                tracing::debug!(provider = provider.name(), cep, "CEP found");
                return Ok(record.with_normalized_input_code(formatter::normalize(cep)));
            }

            if !provider.has_fallback() {
                tracing::debug!(provider = provider.name(), "provider has no fallback, stopping chain");
                break;
            }
        }

        tracing::debug!(cep, "no provider found the CEP");
        Err(LookupError::NotFound(cep.to_string()))
    }

    /// Resolve a CEP; invalid input and misses both come back as `None`.
    pub fn search(&self, cep: &str) -> Option<AddressRecord> {
        self.lookup(cep).ok()
    }
}
