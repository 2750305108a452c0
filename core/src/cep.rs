//! Postal-code (CEP) lookup against a ViaCEP-compatible directory.
//!
//! Stateless and unrelated to the person service. The form uses it to
//! prefill street, city, and state before the user finishes typing.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::client::{ApiClient, ClientConfig};
use crate::error::ApiError;
use crate::http::Transport;
use crate::transport::UreqTransport;
use crate::types::lenient_text;

/// Public ViaCEP endpoint; lookups hit `{base}/{cep}/json/`.
pub const VIACEP_BASE_URL: &str = "https://viacep.com.br/ws";

const POSTAL_CODE_DIGITS: usize = 8;

/// Partial address resolved from a postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFragment {
    pub street: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The directory answered but has no entry for this code.
    #[error("postal code {0} not found")]
    NotFound(String),

    /// The input does not contain exactly eight digits.
    #[error("invalid postal code {0:?}")]
    InvalidPostalCode(String),

    #[error("postal code lookup failed: {0}")]
    Transport(#[from] ApiError),
}

pub trait PostalLookup {
    fn lookup(&self, postal_code: &str) -> Result<AddressFragment, LookupError>;
}

impl<T: PostalLookup + ?Sized> PostalLookup for &T {
    fn lookup(&self, postal_code: &str) -> Result<AddressFragment, LookupError> {
        (**self).lookup(postal_code)
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    logradouro: String,
    #[serde(default, deserialize_with = "lenient_text")]
    localidade: String,
    #[serde(default, deserialize_with = "lenient_text")]
    uf: String,
}

impl ViaCepResponse {
    /// ViaCEP has reported misses as both `"erro": true` and `"erro": "true"`.
    fn is_miss(&self) -> bool {
        match &self.erro {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// Keep only the digits of `raw`; `None` unless exactly eight remain.
pub fn normalize_postal_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == POSTAL_CODE_DIGITS).then_some(digits)
}

#[derive(Debug, Clone)]
pub struct ViaCepClient<T = UreqTransport> {
    client: ApiClient<T>,
}

impl ViaCepClient<UreqTransport> {
    pub fn new() -> Self {
        Self::with_client(ApiClient::new(ClientConfig::new(VIACEP_BASE_URL)))
    }
}

impl Default for ViaCepClient<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> ViaCepClient<T> {
    pub fn with_client(client: ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }
}

impl<T: Transport> PostalLookup for ViaCepClient<T> {
    fn lookup(&self, postal_code: &str) -> Result<AddressFragment, LookupError> {
        let cep = normalize_postal_code(postal_code)
            .ok_or_else(|| LookupError::InvalidPostalCode(postal_code.to_string()))?;

        let reply: ViaCepResponse = self.client.get(&format!("/{cep}/json/"))?;
        if reply.is_miss() {
            tracing::debug!(%cep, "postal code not found");
            return Err(LookupError::NotFound(cep));
        }

        Ok(AddressFragment {
            street: reply.logradouro,
            city: reply.localidade,
            state: reply.uf,
        })
    }
}
