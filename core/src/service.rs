//! Person access layer over the `/pessoa` resource.
//!
//! Every operation is a failure boundary: whatever `ApiError` the HTTP
//! wrapper raises is replaced by a `DomainError` carrying a fixed prefix plus
//! the original message. Callers only ever see text.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::IgnoredAny;

use crate::client::{ApiClient, ClientConfig};
use crate::error::DomainError;
use crate::http::Transport;
use crate::transport::UreqTransport;
use crate::types::{Person, PersonId, SavePerson};

/// Collection path of the person resource.
pub const RESOURCE_PATH: &str = "/pessoa";

const LIST_FAILED: &str = "failed to list people: ";
const GET_BY_TAX_ID_FAILED: &str = "failed to fetch person by tax id: ";
const GET_BY_ID_FAILED: &str = "failed to fetch person by id: ";
const SAVE_FAILED: &str = "failed to save person: ";
const DELETE_FAILED: &str = "failed to delete person: ";

/// Everything but RFC 3986 unreserved characters is escaped in a key.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Operations the form component needs from the person backend.
pub trait PersonApi {
    /// Every stored person; empty when there are none.
    fn list_all(&self) -> Result<Vec<Person>, DomainError>;

    fn get_by_tax_id(&self, tax_id: &str) -> Result<Person, DomainError>;

    fn get_by_id(&self, id: &PersonId) -> Result<Person, DomainError>;

    /// Create when `person.id` is absent or unknown to the server, update
    /// otherwise. Returns the canonical saved record.
    fn create_or_update(&self, person: &SavePerson) -> Result<Person, DomainError>;

    /// Whether a missing id is an error is up to the server.
    fn delete(&self, id: &PersonId) -> Result<bool, DomainError>;
}

impl<T: PersonApi + ?Sized> PersonApi for &T {
    fn list_all(&self) -> Result<Vec<Person>, DomainError> {
        (**self).list_all()
    }

    fn get_by_tax_id(&self, tax_id: &str) -> Result<Person, DomainError> {
        (**self).get_by_tax_id(tax_id)
    }

    fn get_by_id(&self, id: &PersonId) -> Result<Person, DomainError> {
        (**self).get_by_id(id)
    }

    fn create_or_update(&self, person: &SavePerson) -> Result<Person, DomainError> {
        (**self).create_or_update(person)
    }

    fn delete(&self, id: &PersonId) -> Result<bool, DomainError> {
        (**self).delete(id)
    }
}

/// `PersonApi` implementation backed by an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct PersonService<T = UreqTransport> {
    client: ApiClient<T>,
}

impl PersonService<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: ApiClient::new(config),
        }
    }
}

impl<T: Transport> PersonService<T> {
    pub fn with_client(client: ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }
}

/// `key` is opaque, so it is percent-encoded into a single path segment.
fn item_path(key: &str) -> String {
    format!("{RESOURCE_PATH}/{}", utf8_percent_encode(key, PATH_SEGMENT))
}

impl<T: Transport> PersonApi for PersonService<T> {
    fn list_all(&self) -> Result<Vec<Person>, DomainError> {
        let people: Option<Vec<Person>> = self
            .client
            .get(RESOURCE_PATH)
            .map_err(|e| DomainError::wrap(LIST_FAILED, e))?;
        Ok(people.unwrap_or_default())
    }

    fn get_by_tax_id(&self, tax_id: &str) -> Result<Person, DomainError> {
        self.client
            .get(&item_path(tax_id))
            .map_err(|e| DomainError::wrap(GET_BY_TAX_ID_FAILED, e))
    }

    fn get_by_id(&self, id: &PersonId) -> Result<Person, DomainError> {
        self.client
            .get(&item_path(id.as_str()))
            .map_err(|e| DomainError::wrap(GET_BY_ID_FAILED, e))
    }

    fn create_or_update(&self, person: &SavePerson) -> Result<Person, DomainError> {
        let saved: Person = self
            .client
            .post(RESOURCE_PATH, person)
            .map_err(|e| DomainError::wrap(SAVE_FAILED, e))?;
        tracing::debug!(id = %saved.id, "person saved");
        Ok(saved)
    }

    fn delete(&self, id: &PersonId) -> Result<bool, DomainError> {
        let _: IgnoredAny = self
            .client
            .delete(&item_path(id.as_str()))
            .map_err(|e| DomainError::wrap(DELETE_FAILED, e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::client::tests::ScriptedTransport;
    use crate::http::{HttpMethod, TransportFailure};
    use crate::types::Address;

    const MARIA: &str = r#"{"idPessoa":"1","nome":"Maria","cpf":"12345678901","dataNascimento":"1990-05-17",
        "endereco":{"cep":"01001000","rua":"Praça da Sé","numero":"10","cidade":"São Paulo","estado":"SP"}}"#;

    fn service(transport: ScriptedTransport) -> PersonService<ScriptedTransport> {
        PersonService::with_client(ApiClient::with_transport(
            ClientConfig::new("http://localhost:8080"),
            transport,
        ))
    }

    fn draft() -> SavePerson {
        SavePerson {
            id: None,
            name: "Maria".to_string(),
            tax_id: "12345678901".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            address: Address {
                postal_code: "01001000".to_string(),
                street: "Praça da Sé".to_string(),
                number: "10".to_string(),
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
            },
        }
    }

    #[test]
    fn list_all_gets_collection() {
        let svc = service(ScriptedTransport::default().respond(200, &format!("[{MARIA}]")));
        let people = svc.list_all().unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Maria");

        let req = svc.client().transport().last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/pessoa");
    }

    #[test]
    fn list_all_treats_null_as_empty() {
        let svc = service(ScriptedTransport::default().respond(200, "null"));
        assert!(svc.list_all().unwrap().is_empty());
    }

    #[test]
    fn get_by_tax_id_and_id_use_item_path() {
        let svc = service(ScriptedTransport::default().respond(200, MARIA).respond(200, MARIA));

        svc.get_by_tax_id("12345678901").unwrap();
        assert_eq!(
            svc.client().transport().last_request().url,
            "http://localhost:8080/pessoa/12345678901"
        );

        let person = svc.get_by_id(&PersonId::new("1")).unwrap();
        assert_eq!(person.id.as_str(), "1");
        assert_eq!(svc.client().transport().last_request().url, "http://localhost:8080/pessoa/1");
    }

    #[test]
    fn keys_are_encoded_as_one_path_segment() {
        let svc = service(ScriptedTransport::default().respond(200, MARIA).respond(204, "").respond(200, MARIA));

        svc.get_by_id(&PersonId::new("a/b?x=1")).unwrap();
        assert_eq!(
            svc.client().transport().last_request().url,
            "http://localhost:8080/pessoa/a%2Fb%3Fx%3D1"
        );

        svc.delete(&PersonId::new("id #2")).unwrap();
        assert_eq!(
            svc.client().transport().last_request().url,
            "http://localhost:8080/pessoa/id%20%232"
        );

        svc.get_by_tax_id("123.456.789-01").unwrap();
        assert_eq!(
            svc.client().transport().last_request().url,
            "http://localhost:8080/pessoa/123.456.789-01"
        );
    }

    #[test]
    fn not_found_becomes_message_only_error() {
        let svc = service(ScriptedTransport::default().respond(404, ""));
        let err = svc.get_by_id(&PersonId::new("99")).unwrap_err();
        assert_eq!(
            err.message(),
            "failed to fetch person by id: request failed with status code 404"
        );
    }

    #[test]
    fn create_or_update_posts_full_draft() {
        let svc = service(ScriptedTransport::default().respond(201, MARIA));
        let saved = svc.create_or_update(&draft()).unwrap();
        assert_eq!(saved.id.as_str(), "1");

        let req = svc.client().transport().last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8080/pessoa");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body.get("idPessoa").is_none());
        assert_eq!(body["cpf"], "12345678901");
        assert_eq!(body["endereco"]["cidade"], "São Paulo");
    }

    #[test]
    fn create_or_update_requires_canonical_id() {
        let svc = service(ScriptedTransport::default().respond(
            200,
            r#"{"nome":"Maria","cpf":"12345678901","dataNascimento":"1990-05-17"}"#,
        ));
        let err = svc.create_or_update(&draft()).unwrap_err();
        assert!(err.message().starts_with("failed to save person: failed to decode response body"));
    }

    #[test]
    fn delete_reports_success() {
        let svc = service(ScriptedTransport::default().respond(204, "").respond(200, "true"));
        assert!(svc.delete(&PersonId::new("1")).unwrap());
        assert!(svc.delete(&PersonId::new("2")).unwrap());
        let req = svc.client().transport().last_request();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:8080/pessoa/2");
    }

    #[test]
    fn delete_network_failure_is_wrapped() {
        let svc = service(
            ScriptedTransport::default().fail(TransportFailure::NoResponse("connection refused".to_string())),
        );
        let err = svc.delete(&PersonId::new("1")).unwrap_err();
        assert_eq!(err.message(), "failed to delete person: network error: connection refused");
    }
}
