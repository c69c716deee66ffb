//! CEP providers: ViaCEP, BrasilAPI and OpenCEP.

use super::formatter;
use super::types::{AddressRecord, CepFormat, ProviderDescriptor};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Identifiers of the providers shipped with the crate, in default registration order.
pub const BUILTIN_PROVIDER_IDS: &[&str] = &["viacep", "brasilapi", "opencep"];

const USER_AGENT: &str = concat!("cep-chain/", env!("CARGO_PKG_VERSION"));

/// Everything but unreserved characters, so `/ ? # % .` cannot leave the path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

/// A single remote address-lookup source.
///
/// `search` never fails loudly: transport errors, timeouts and
/// "not found" answers all come back as `None`.
pub trait CepProvider: Send + Sync {
    /// Look up one CEP, already reshaped per `required_format`.
    fn search(&self, cep: &str) -> Option<AddressRecord>;

    /// Display name for logs.
    fn name(&self) -> &str;

    /// Higher runs first.
    fn priority(&self) -> i32;

    /// Whether the chain may continue past this provider when it finds nothing.
    fn has_fallback(&self) -> bool;

    fn required_format(&self) -> CepFormat;

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            name: self.name().to_string(),
            priority: self.priority(),
            has_fallback: self.has_fallback(),
            required_format: self.required_format(),
        }
    }
}

/// Build a shipped provider from its identifier (case-insensitive).
pub fn builtin_provider(id: &str, timeout: Duration) -> Option<Box<dyn CepProvider>> {
    match id.trim().to_lowercase().as_str() {
        "viacep" => Some(Box::new(ViaCepProvider::new(timeout))),
        "brasilapi" => Some(Box::new(BrasilApiProvider::new(timeout))),
        "opencep" => Some(Box::new(OpenCepProvider::new(timeout))),
        _ => None,
    }
}

// ─── HTTP plumbing ──────────────────────────────────────────────

#[derive(Debug)]
enum FetchError {
    Transport(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::Status(code) => write!(f, "HTTP status {}", code),
            Self::Decode(msg) => write!(f, "invalid response body: {}", msg),
        }
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

fn fetch_json<T: DeserializeOwned>(agent: &ureq::Agent, url: &str) -> Result<T, FetchError> {
    let response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::Status(code, _) => FetchError::Status(code),
        ureq::Error::Transport(t) => FetchError::Transport(t.to_string()),
    })?;

    response
        .into_json()
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// `{base}/{cep}{suffix}` with `cep` encoded as exactly one path segment.
fn endpoint(base_url: &str, cep: &str, suffix: &str) -> String {
    format!("{}/{}{}", base_url, utf8_percent_encode(cep, SEGMENT), suffix)
}

fn trim_base(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

// ─── ViaCEP ─────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
struct ViaCepPayload {
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    complemento: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
    /// `true` (or `"true"`) when the CEP does not exist.
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

impl ViaCepPayload {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

fn viacep_to_record(p: ViaCepPayload) -> Option<AddressRecord> {
    if p.is_not_found() {
        return None;
    }
    Some(AddressRecord {
        postal_code: p.cep.unwrap_or_default(),
        street: p.logradouro.unwrap_or_default(),
        neighborhood: p.bairro.unwrap_or_default(),
        city: p.localidade.unwrap_or_default(),
        state: p.uf.unwrap_or_default(),
        complement: p.complemento.unwrap_or_default(),
        provider_id: ViaCepProvider::ID.to_string(),
        normalized_input_code: String::new(),
    })
}

/// viacep.com.br. Accepts the CEP with or without hyphen.
pub struct ViaCepProvider {
    agent: ureq::Agent,
    base_url: String,
}

impl ViaCepProvider {
    pub const ID: &'static str = "viacep";
    pub const BASE_URL: &'static str = "https://viacep.com.br/ws";

    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(Self::BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            base_url: trim_base(base_url),
        }
    }
}

impl CepProvider for ViaCepProvider {
    fn search(&self, cep: &str) -> Option<AddressRecord> {
        let url = endpoint(&self.base_url, cep, "/json");
        match fetch_json::<ViaCepPayload>(&self.agent, &url) {
            Ok(payload) => viacep_to_record(payload),
            Err(FetchError::Status(code)) => {
                tracing::debug!(provider = "ViaCEP", cep, status = code, "no result");
                None
            }
            Err(e) => {
                tracing::warn!(provider = "ViaCEP", cep, error = %e, "lookup failed");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "ViaCEP"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn has_fallback(&self) -> bool {
        true
    }

    fn required_format(&self) -> CepFormat {
        CepFormat::Any
    }
}

// ─── BrasilAPI ──────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
struct BrasilApiPayload {
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    street: Option<String>,
    /// Older responses carry the street here.
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    neighborhood: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    complement: Option<String>,
}

fn brasilapi_to_record(p: BrasilApiPayload) -> AddressRecord {
    AddressRecord {
        postal_code: p.cep.unwrap_or_default(),
        street: p.street.or(p.address).unwrap_or_default(),
        neighborhood: p.neighborhood.unwrap_or_default(),
        city: p.city.unwrap_or_default(),
        state: p.state.unwrap_or_default(),
        complement: p.complement.unwrap_or_default(),
        provider_id: BrasilApiProvider::ID.to_string(),
        normalized_input_code: String::new(),
    }
}

/// brasilapi.com.br CEP v1. Digits only.
pub struct BrasilApiProvider {
    agent: ureq::Agent,
    base_url: String,
}

impl BrasilApiProvider {
    pub const ID: &'static str = "brasilapi";
    pub const BASE_URL: &'static str = "https://brasilapi.com.br/api/cep/v1";

    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(Self::BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            base_url: trim_base(base_url),
        }
    }
}

impl CepProvider for BrasilApiProvider {
    fn search(&self, cep: &str) -> Option<AddressRecord> {
        let digits = formatter::normalize(cep);
        let url = endpoint(&self.base_url, &digits, "");
        match fetch_json::<BrasilApiPayload>(&self.agent, &url) {
            Ok(payload) => Some(brasilapi_to_record(payload)),
            Err(e) => {
                tracing::debug!(provider = "BrasilAPI", cep = %digits, error = %e, "no result");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "BrasilAPI"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn has_fallback(&self) -> bool {
        true
    }

    fn required_format(&self) -> CepFormat {
        CepFormat::DigitsOnly
    }
}

// ─── OpenCEP ────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
struct OpenCepPayload {
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    complemento: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
}

fn opencep_to_record(p: OpenCepPayload) -> AddressRecord {
    AddressRecord {
        postal_code: p.cep.unwrap_or_default(),
        street: p.logradouro.unwrap_or_default(),
        neighborhood: p.bairro.unwrap_or_default(),
        city: p.localidade.unwrap_or_default(),
        state: p.uf.unwrap_or_default(),
        complement: p.complemento.unwrap_or_default(),
        provider_id: OpenCepProvider::ID.to_string(),
        normalized_input_code: String::new(),
    }
}

/// opencep.com v1. Digits only; last link of the default chain.
pub struct OpenCepProvider {
    agent: ureq::Agent,
    base_url: String,
}

impl OpenCepProvider {
    pub const ID: &'static str = "opencep";
    pub const BASE_URL: &'static str = "https://opencep.com/v1";

    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(Self::BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            base_url: trim_base(base_url),
        }
    }
}

impl CepProvider for OpenCepProvider {
    fn search(&self, cep: &str) -> Option<AddressRecord> {
        let digits = formatter::normalize(cep);
        let url = endpoint(&self.base_url, &digits, "");
        match fetch_json::<OpenCepPayload>(&self.agent, &url) {
            Ok(payload) => Some(opencep_to_record(payload)),
            Err(e) => {
                tracing::debug!(provider = "OpenCEP", cep = %digits, error = %e, "no result");
                None
            }
        }
    }

    fn name(&self) -> &str {
        "OpenCEP"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn has_fallback(&self) -> bool {
        false
    }

    fn required_format(&self) -> CepFormat {
        CepFormat::DigitsOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viacep_mapping() {
        let payload: ViaCepPayload = serde_json::from_str(
            r#"{
                "cep": "01310-930",
                "logradouro": "Avenida Paulista",
                "complemento": "2100",
                "bairro": "Bela Vista",
                "localidade": "São Paulo",
                "uf": "SP",
                "ibge": "3550308"
            }"#,
        )
        .unwrap();
        let rec = viacep_to_record(payload).unwrap();
        assert_eq!(rec.postal_code, "01310-930");
        assert_eq!(rec.street, "Avenida Paulista");
        assert_eq!(rec.neighborhood, "Bela Vista");
        assert_eq!(rec.city, "São Paulo");
        assert_eq!(rec.state, "SP");
        assert_eq!(rec.complement, "2100");
        assert_eq!(rec.provider_id, "viacep");
        assert!(rec.normalized_input_code.is_empty());
    }

    #[test]
    fn test_viacep_erro_sentinel() {
        let payload: ViaCepPayload = serde_json::from_str(r#"{"erro": true}"#).unwrap();
        assert!(viacep_to_record(payload).is_none());

        let payload: ViaCepPayload = serde_json::from_str(r#"{"erro": "true"}"#).unwrap();
        assert!(viacep_to_record(payload).is_none());
    }

    #[test]
    fn test_viacep_erro_false_is_a_hit() {
        let payload: ViaCepPayload =
            serde_json::from_str(r#"{"cep": "01310-930", "erro": false}"#).unwrap();
        assert!(viacep_to_record(payload).is_some());
    }

    #[test]
    fn test_brasilapi_mapping() {
        let payload: BrasilApiPayload = serde_json::from_str(
            r#"{
                "cep": "01310930",
                "state": "SP",
                "city": "São Paulo",
                "neighborhood": "Bela Vista",
                "street": "Avenida Paulista",
                "service": "correios"
            }"#,
        )
        .unwrap();
        let rec = brasilapi_to_record(payload);
        assert_eq!(rec.street, "Avenida Paulista");
        assert_eq!(rec.city, "São Paulo");
        assert_eq!(rec.complement, "");
        assert_eq!(rec.provider_id, "brasilapi");
    }

    #[test]
    fn test_brasilapi_address_fallback() {
        let payload: BrasilApiPayload =
            serde_json::from_str(r#"{"cep": "01310930", "address": "Rua Augusta"}"#).unwrap();
        assert_eq!(brasilapi_to_record(payload).street, "Rua Augusta");
    }

    #[test]
    fn test_opencep_mapping_with_nulls() {
        let payload: OpenCepPayload = serde_json::from_str(
            r#"{"cep": "70040-010", "logradouro": null, "bairro": "Zona Cívico-Administrativa", "localidade": "Brasília", "uf": "DF"}"#,
        )
        .unwrap();
        let rec = opencep_to_record(payload);
        assert_eq!(rec.street, "");
        assert_eq!(rec.city, "Brasília");
        assert_eq!(rec.provider_id, "opencep");
    }

    #[test]
    fn test_builtin_descriptors() {
        let timeout = Duration::from_secs(1);
        let via = builtin_provider("viacep", timeout).unwrap().descriptor();
        assert_eq!(via.name, "ViaCEP");
        assert_eq!(via.priority, 100);
        assert!(via.has_fallback);
        assert_eq!(via.required_format, CepFormat::Any);

        let brasil = builtin_provider("BrasilAPI", timeout).unwrap().descriptor();
        assert_eq!(brasil.priority, 90);
        assert!(brasil.has_fallback);
        assert_eq!(brasil.required_format, CepFormat::DigitsOnly);

        let open = builtin_provider(" opencep ", timeout).unwrap().descriptor();
        assert_eq!(open.priority, 80);
        assert!(!open.has_fallback);
        assert_eq!(open.required_format, CepFormat::DigitsOnly);
    }

    #[test]
    fn test_builtin_unknown_id() {
        assert!(builtin_provider("correios", Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_endpoint_keeps_cep_in_one_segment() {
        assert_eq!(
            endpoint("https://viacep.com.br/ws", "01310-930", "/json"),
            "https://viacep.com.br/ws/01310-930/json"
        );
        assert_eq!(
            endpoint("https://viacep.com.br/ws", "01310930/../../x?a#b", "/json"),
            "https://viacep.com.br/ws/01310930%2F%2E%2E%2F%2E%2E%2Fx%3Fa%23b/json"
        );
        assert_eq!(endpoint("http://h/v1", " 01310%20930", ""), "http://h/v1/%2001310%2520930");
    }

    #[test]
    fn test_trim_base() {
        assert_eq!(trim_base("http://localhost:8080/ws/"), "http://localhost:8080/ws");
    }
}
