//! Domain DTOs for the pessoa API.
//!
//! # Design
//! Field names are English on the Rust side and renamed to the Portuguese
//! wire names (`idPessoa`, `nome`, `cpf`, `dataNascimento`, `endereco`).
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any drift between the two crates.
//!
//! The server is not the only writer of these records, so decoding is lenient
//! where the form is lenient: a missing or `null` address (or address field)
//! becomes empty text, and numeric ids or house numbers become their decimal
//! text.

use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque identifier assigned by the remote system.
///
/// Accepted on the wire as either a JSON string or a JSON number and always
/// serialized back as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for PersonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Ok(Self(text)),
            Raw::Number(number) => Ok(Self(number.to_string())),
        }
    }
}

/// Address embedded in a [`Person`]. It has no identity of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "cep", default, deserialize_with = "lenient_text")]
    pub postal_code: String,
    #[serde(rename = "rua", default, deserialize_with = "lenient_text")]
    pub street: String,
    #[serde(rename = "numero", default, deserialize_with = "lenient_text")]
    pub number: String,
    #[serde(rename = "cidade", default, deserialize_with = "lenient_text")]
    pub city: String,
    #[serde(rename = "estado", default, deserialize_with = "lenient_text")]
    pub state: String,
}

/// A person record as stored by the remote system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "idPessoa")]
    pub id: PersonId,
    #[serde(rename = "nome")]
    pub name: String,
    /// Unformatted CPF, e.g. `"12345678901"`.
    #[serde(rename = "cpf", deserialize_with = "lenient_text")]
    pub tax_id: String,
    #[serde(rename = "dataNascimento")]
    pub birth_date: NaiveDate,
    #[serde(rename = "endereco", default, deserialize_with = "null_as_default")]
    pub address: Address,
}

/// Request payload for the create-or-update endpoint.
///
/// When `id` is `None` the field is omitted and the server creates a new
/// record; when it names an existing record the server updates it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePerson {
    #[serde(rename = "idPessoa", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PersonId>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "cpf")]
    pub tax_id: String,
    #[serde(rename = "dataNascimento")]
    pub birth_date: NaiveDate,
    #[serde(rename = "endereco")]
    pub address: Address,
}

impl From<&Person> for SavePerson {
    fn from(person: &Person) -> Self {
        Self {
            id: Some(person.id.clone()),
            name: person.name.clone(),
            tax_id: person.tax_id.clone(),
            birth_date: person.birth_date,
            address: person.address.clone(),
        }
    }
}

/// Decode `null`, strings, and numbers as text. Used for fields that a form
/// treats as plain text but a backend may store as numbers or leave empty.
pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(other) => Err(de::Error::custom(format!("expected text, found {other}"))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
