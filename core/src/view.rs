//! Table view model derived from `PersonForm` state.

use crate::form::PersonForm;
use crate::format::{format_city_state, format_tax_id};
use crate::types::{Person, PersonId};

/// Shown instead of the table when there are no records.
pub const EMPTY_STATE_MESSAGE: &str = "No people registered yet.";

/// One display-ready table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: PersonId,
    pub name: String,
    pub tax_id: String,
    pub birth_date: String,
    pub location: String,
}

impl From<&Person> for RowView {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id.clone(),
            name: person.name.clone(),
            tax_id: format_tax_id(&person.tax_id),
            birth_date: person.birth_date.to_string(),
            location: format_city_state(&person.address.city, &person.address.state),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    Loading,
    Empty { message: &'static str },
    Rows {
        rows: Vec<RowView>,
        pages: Vec<usize>,
        current_page: usize,
    },
}

impl<A, L> PersonForm<A, L> {
    pub fn table_view(&self) -> TableView {
        if self.is_loading() {
            return TableView::Loading;
        }
        if self.records().is_empty() {
            return TableView::Empty {
                message: EMPTY_STATE_MESSAGE,
            };
        }
        TableView::Rows {
            rows: self.current_rows().iter().map(RowView::from).collect(),
            pages: self.page_numbers(),
            current_page: self.current_page(),
        }
    }
}
