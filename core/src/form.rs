//! Form/list state machine for the person registry.
//!
//! # Overview
//! `PersonForm` owns everything a single-page "register and list people"
//! screen needs: the draft being edited, the loaded records, the record
//! selected for editing, loading and error flags, the pagination cursor,
//! the delete-confirmation target, and a queue of transient notices. It is
//! the only component that holds state across requests.
//!
//! # Design
//! - Remote calls go through [`PersonApi`] and [`PostalLookup`], so hosts
//!   and tests can substitute their own backends.
//! - The component is the final error boundary: every handler stores the
//!   failure text in `last_error` (and, for submit and delete, raises an
//!   error notice). No handler returns an error.
//! - Mount, submit and delete are split into `begin_*` / `finish_*`.
//!   `begin_*` refuses to start while the same kind of request is
//!   outstanding, and `finish_*` only applies the result whose token is
//!   still outstanding, so a result delivered twice or for a forgotten
//!   ticket is dropped. `mount`, `submit` and `confirm_delete` run both
//!   halves back to back for synchronous hosts.
//! - Saving merges by id: drop any record with the returned id, then append
//!   the returned record. An edited record therefore moves to the end.

use std::time::{Duration, Instant};

use crate::cep::{normalize_postal_code, LookupError, PostalLookup};
use crate::draft::{Field, PersonDraft};
use crate::error::DomainError;
use crate::service::PersonApi;
use crate::types::{Person, PersonId, SavePerson};

/// Rows per table page.
pub const PAGE_SIZE: usize = 10;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

const SAVED: &str = "Person saved successfully.";
const DELETED: &str = "Person deleted successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient notification raised by submit and delete outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: Instant,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            raised_at: Instant::now(),
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.raised_at + NOTICE_TTL
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}

/// Identifies one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

/// The initial list load, started but not yet resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountTicket {
    token: RequestToken,
}

impl MountTicket {
    pub fn token(&self) -> RequestToken {
        self.token
    }
}

/// A create-or-update that has been started but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    token: RequestToken,
    payload: SavePerson,
}

impl SubmitTicket {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn payload(&self) -> &SavePerson {
        &self.payload
    }
}

/// A delete that has been confirmed but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTicket {
    token: RequestToken,
    id: PersonId,
}

impl DeleteTicket {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn id(&self) -> &PersonId {
        &self.id
    }
}

#[derive(Debug)]
pub struct PersonForm<A, L> {
    api: A,
    lookup: L,
    draft: PersonDraft,
    records: Vec<Person>,
    selected: Option<Person>,
    loading: bool,
    mounted: bool,
    last_error: Option<String>,
    current_page: usize,
    pending_delete: Option<Person>,
    notices: Vec<Notice>,
    scroll_to_form: bool,
    last_token: u64,
    mount_in_flight: Option<RequestToken>,
    submit_in_flight: Option<RequestToken>,
    delete_in_flight: Option<RequestToken>,
}

impl<A, L> PersonForm<A, L> {
    pub fn new(api: A, lookup: L) -> Self {
        Self {
            api,
            lookup,
            draft: PersonDraft::default(),
            records: Vec::new(),
            selected: None,
            loading: false,
            mounted: false,
            last_error: None,
            current_page: 1,
            pending_delete: None,
            notices: Vec::new(),
            scroll_to_form: false,
            last_token: 0,
            mount_in_flight: None,
            submit_in_flight: None,
            delete_in_flight: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn draft(&self) -> &PersonDraft {
        &self.draft
    }

    pub fn records(&self) -> &[Person] {
        &self.records
    }

    pub fn selected(&self) -> Option<&Person> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        PAGE_SIZE
    }

    pub fn pending_delete(&self) -> Option<&Person> {
        self.pending_delete.as_ref()
    }

    pub fn is_delete_prompt_open(&self) -> bool {
        self.pending_delete.is_some()
    }

    /// Whether a create-or-update is outstanding; hosts disable the submit
    /// control while this is true.
    pub fn is_submitting(&self) -> bool {
        self.submit_in_flight.is_some()
    }

    pub fn is_deleting(&self) -> bool {
        self.delete_in_flight.is_some()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn active_notices(&self, now: Instant) -> impl Iterator<Item = &Notice> + '_ {
        self.notices.iter().filter(move |notice| !notice.is_expired(now))
    }

    pub fn prune_notices(&mut self, now: Instant) {
        self.notices.retain(|notice| !notice.is_expired(now));
    }

    /// One-shot request to bring the form into view, set by `begin_edit`.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_form)
    }

    /// Update exactly one draft field.
    pub fn edit_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// Copy a listed record into the draft and mark it as being edited.
    /// Returns `false` when no record has `id`.
    pub fn begin_edit(&mut self, id: &PersonId) -> bool {
        let Some(person) = self.find(id).cloned() else {
            tracing::debug!(%id, "edit requested for unknown record");
            return false;
        };
        self.draft = PersonDraft::from_person(&person);
        self.selected = Some(person);
        self.scroll_to_form = true;
        true
    }

    /// Start the initial load. Only the first call per form returns a
    /// ticket; `is_loading` stays true until `finish_mount`.
    pub fn begin_mount(&mut self) -> Option<MountTicket> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        self.loading = true;
        let token = self.issue_token();
        self.mount_in_flight = Some(token);
        Some(MountTicket { token })
    }

    /// Apply the outcome of the `list_all` call started by `begin_mount`.
    pub fn finish_mount(&mut self, ticket: MountTicket, result: Result<Vec<Person>, DomainError>) {
        if self.mount_in_flight != Some(ticket.token) {
            tracing::debug!(token = ticket.token.0, "dropping stale load result");
            return;
        }
        self.mount_in_flight = None;

        match result {
            Ok(records) => {
                tracing::info!(count = records.len(), "people loaded");
                self.records = records;
                self.last_error = None;
            }
            Err(err) => self.record_error(err.message().to_string()),
        }

        self.loading = false;
    }

    /// Validate the draft and reserve a submit slot.
    ///
    /// Returns `None` when a submit is already outstanding or when the draft
    /// fails validation (which is recorded like any other submit failure).
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        if self.submit_in_flight.is_some() {
            tracing::debug!("submit ignored, previous submit still in flight");
            return None;
        }

        let id = self.selected.as_ref().map(|person| person.id.clone());
        let payload = match self.draft.to_save(id) {
            Ok(payload) => payload,
            Err(err) => {
                self.fail(err.to_string());
                return None;
            }
        };

        let token = self.issue_token();
        self.submit_in_flight = Some(token);
        Some(SubmitTicket { token, payload })
    }

    /// Apply the outcome of a create-or-update started by `begin_submit`.
    pub fn finish_submit(&mut self, ticket: SubmitTicket, result: Result<Person, DomainError>) {
        if self.submit_in_flight != Some(ticket.token) {
            tracing::debug!(token = ticket.token.0, "dropping stale submit result");
            return;
        }
        self.submit_in_flight = None;

        match result {
            Ok(saved) => {
                tracing::info!(id = %saved.id, "person saved");
                self.merge_saved(saved);
                self.draft = PersonDraft::default();
                self.selected = None;
                self.notify(NoticeLevel::Success, SAVED);
            }
            Err(err) => self.fail(err.message().to_string()),
        }
    }

    /// Open the delete confirmation for `id`. No remote call is made.
    pub fn request_delete(&mut self, id: &PersonId) -> bool {
        let Some(person) = self.find(id).cloned() else {
            tracing::debug!(%id, "delete requested for unknown record");
            return false;
        };
        self.pending_delete = Some(person);
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Reserve a delete slot for the record awaiting confirmation.
    pub fn begin_delete(&mut self) -> Option<DeleteTicket> {
        if self.delete_in_flight.is_some() {
            tracing::debug!("delete ignored, previous delete still in flight");
            return None;
        }
        let id = self.pending_delete.as_ref()?.id.clone();
        let token = self.issue_token();
        self.delete_in_flight = Some(token);
        Some(DeleteTicket { token, id })
    }

    /// Apply the outcome of a delete started by `begin_delete`. On failure
    /// the prompt stays open.
    pub fn finish_delete(&mut self, ticket: DeleteTicket, result: Result<bool, DomainError>) {
        if self.delete_in_flight != Some(ticket.token) {
            tracing::debug!(token = ticket.token.0, "dropping stale delete result");
            return;
        }
        self.delete_in_flight = None;

        match result {
            Ok(_) => {
                tracing::info!(id = %ticket.id, "person deleted");
                self.records.retain(|person| person.id != ticket.id);
                if self.pending_delete.as_ref().is_some_and(|p| p.id == ticket.id) {
                    self.pending_delete = None;
                }
                if self.selected.as_ref().is_some_and(|p| p.id == ticket.id) {
                    self.selected = None;
                }
                self.notify(NoticeLevel::Success, DELETED);
            }
            Err(err) => self.fail(err.message().to_string()),
        }
    }

    /// Page numbers are 1-based and not clamped.
    pub fn select_page(&mut self, page: usize) {
        self.current_page = page;
    }

    pub fn page_count(&self) -> usize {
        self.records.len().div_ceil(PAGE_SIZE)
    }

    pub fn page_numbers(&self) -> Vec<usize> {
        (1..=self.page_count()).collect()
    }

    /// Records on the current page; empty when the page is out of range.
    pub fn current_rows(&self) -> &[Person] {
        let len = self.records.len();
        let start = self.current_page.saturating_sub(1).saturating_mul(PAGE_SIZE).min(len);
        let end = start.saturating_add(PAGE_SIZE).min(len);
        &self.records[start..end]
    }

    fn find(&self, id: &PersonId) -> Option<&Person> {
        self.records.iter().find(|person| &person.id == id)
    }

    fn merge_saved(&mut self, saved: Person) {
        self.records.retain(|person| person.id != saved.id);
        self.records.push(saved);
    }

    fn issue_token(&mut self) -> RequestToken {
        self.last_token += 1;
        RequestToken(self.last_token)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice::new(level, message));
    }

    fn record_error(&mut self, message: String) {
        tracing::warn!("{message}");
        self.last_error = Some(message);
    }

    fn fail(&mut self, message: String) {
        self.notify(NoticeLevel::Error, message.clone());
        self.record_error(message);
    }
}

impl<A: PersonApi, L> PersonForm<A, L> {
    /// Initial load. Only the first call per form talks to the backend.
    pub fn mount(&mut self) {
        if let Some(ticket) = self.begin_mount() {
            let result = self.api.list_all();
            self.finish_mount(ticket, result);
        }
    }

    pub fn submit(&mut self) {
        if let Some(ticket) = self.begin_submit() {
            let result = self.api.create_or_update(ticket.payload());
            self.finish_submit(ticket, result);
        }
    }

    pub fn confirm_delete(&mut self) {
        if let Some(ticket) = self.begin_delete() {
            let result = self.api.delete(ticket.id());
            self.finish_delete(ticket, result);
        }
    }
}

impl<A, L: PostalLookup> PersonForm<A, L> {
    /// Prefill street, city and state from the draft's postal code.
    ///
    /// Returns whether the draft changed. Misses and failures leave the
    /// address untouched and are only logged.
    pub fn autofill_address(&mut self) -> bool {
        let raw = self.draft.address.postal_code.clone();
        match self.lookup.lookup(&raw) {
            Ok(fragment) => {
                let postal_code = normalize_postal_code(&raw).unwrap_or(raw);
                self.draft.apply_fragment(postal_code, fragment);
                true
            }
            Err(LookupError::NotFound(cep)) => {
                tracing::debug!(%cep, "no address for postal code");
                false
            }
            Err(err) => {
                tracing::error!("{err}");
                false
            }
        }
    }
}
