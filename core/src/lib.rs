//! Client core for the pessoa (person) registry API.
//!
//! # Overview
//! Everything a single-page "register and list people" client needs apart
//! from rendering: a JSON HTTP wrapper with logging interceptors, the person
//! access layer over `/pessoa`, a ViaCEP postal-code lookup, and the
//! form/list state machine that ties them together.
//!
//! # Design
//! - `ApiClient` is built explicitly from a `ClientConfig` and a `Transport`;
//!   there is no global client. `UreqTransport` does the real I/O, tests
//!   plug in scripted transports.
//! - `PersonService` turns transport errors into message-only
//!   `DomainError`s. `PersonForm` is the final error boundary.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod cep;
pub mod client;
pub mod draft;
pub mod error;
pub mod form;
pub mod format;
pub mod http;
pub mod service;
pub mod transport;
pub mod types;
pub mod view;

pub use cep::{AddressFragment, LookupError, PostalLookup, ViaCepClient};
pub use client::{ApiClient, ClientConfig};
pub use draft::{AddressField, DraftError, Field, PersonDraft};
pub use error::{ApiError, DomainError};
pub use form::{DeleteTicket, MountTicket, Notice, NoticeLevel, PersonForm, RequestToken, SubmitTicket};
pub use format::{format_city_state, format_tax_id};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportFailure};
pub use service::{PersonApi, PersonService};
pub use transport::UreqTransport;
pub use types::{Address, Person, PersonId, SavePerson};
pub use view::{RowView, TableView};
