//! CEP lookup subsystem.
//!
//! Normalizes and validates Brazilian postal codes, then walks a
//! priority-ordered chain of remote providers until one answers.

pub mod formatter;
pub mod providers;
pub mod resolver;
pub mod types;

pub use providers::{
    builtin_provider, BrasilApiProvider, CepProvider, OpenCepProvider, ViaCepProvider,
    BUILTIN_PROVIDER_IDS,
};
pub use resolver::CepResolver;
pub use types::{AddressRecord, CepFormat, LookupError, ProviderDescriptor};
