//! Form draft state and typed field paths.
//!
//! Fields are addressed by [`Field`], with address sub-fields nested under
//! [`Field::Address`]. Setting one field never touches its siblings.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::cep::AddressFragment;
use crate::types::{Address, Person, PersonId, SavePerson};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    PostalCode,
    Street,
    Number,
    City,
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    TaxId,
    BirthDate,
    Address(AddressField),
}

impl Field {
    /// Every editable field in form order.
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::TaxId,
        Field::BirthDate,
        Field::Address(AddressField::PostalCode),
        Field::Address(AddressField::Street),
        Field::Address(AddressField::Number),
        Field::Address(AddressField::City),
        Field::Address(AddressField::State),
    ];

    /// Form input name, matching the wire field path.
    pub fn input_name(self) -> &'static str {
        match self {
            Field::Name => "nome",
            Field::TaxId => "cpf",
            Field::BirthDate => "dataNascimento",
            Field::Address(AddressField::PostalCode) => "endereco.cep",
            Field::Address(AddressField::Street) => "endereco.rua",
            Field::Address(AddressField::Number) => "endereco.numero",
            Field::Address(AddressField::City) => "endereco.cidade",
            Field::Address(AddressField::State) => "endereco.estado",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.input_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.input_name() == name)
            .ok_or_else(|| UnknownField(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("field `{0}` is required")]
    Missing(Field),

    #[error("birth date {0:?} is not a valid YYYY-MM-DD date")]
    InvalidBirthDate(String),
}

/// In-progress, not yet submitted person. Every field is raw input text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDraft {
    pub name: String,
    pub tax_id: String,
    pub birth_date: String,
    pub address: Address,
}

impl PersonDraft {
    /// Copy a stored record into editable text.
    pub fn from_person(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            tax_id: person.tax_id.clone(),
            birth_date: person.birth_date.format(DATE_FORMAT).to_string(),
            address: person.address.clone(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::TaxId => &self.tax_id,
            Field::BirthDate => &self.birth_date,
            Field::Address(AddressField::PostalCode) => &self.address.postal_code,
            Field::Address(AddressField::Street) => &self.address.street,
            Field::Address(AddressField::Number) => &self.address.number,
            Field::Address(AddressField::City) => &self.address.city,
            Field::Address(AddressField::State) => &self.address.state,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::TaxId => &mut self.tax_id,
            Field::BirthDate => &mut self.birth_date,
            Field::Address(AddressField::PostalCode) => &mut self.address.postal_code,
            Field::Address(AddressField::Street) => &mut self.address.street,
            Field::Address(AddressField::Number) => &mut self.address.number,
            Field::Address(AddressField::City) => &mut self.address.city,
            Field::Address(AddressField::State) => &mut self.address.state,
        };
        *slot = value.into();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite street, city and state with a lookup result. Number is left
    /// alone since the directory does not know it.
    pub fn apply_fragment(&mut self, postal_code: String, fragment: AddressFragment) {
        self.address.postal_code = postal_code;
        self.address.street = fragment.street;
        self.address.city = fragment.city;
        self.address.state = fragment.state;
    }

    /// Check required fields and the date input, then build the payload.
    pub fn to_save(&self, id: Option<PersonId>) -> Result<SavePerson, DraftError> {
        if let Some(field) = Field::ALL
            .into_iter()
            .find(|field| self.get(*field).trim().is_empty())
        {
            return Err(DraftError::Missing(field));
        }

        let birth_date = NaiveDate::parse_from_str(self.birth_date.trim(), DATE_FORMAT)
            .map_err(|_| DraftError::InvalidBirthDate(self.birth_date.clone()))?;

        Ok(SavePerson {
            id,
            name: self.name.clone(),
            tax_id: self.tax_id.clone(),
            birth_date,
            address: self.address.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> PersonDraft {
        let mut draft = PersonDraft::default();
        for (field, value) in Field::ALL.into_iter().zip([
            "Maria",
            "12345678901",
            "1990-05-17",
            "01001000",
            "Praça da Sé",
            "10",
            "São Paulo",
            "SP",
        ]) {
            draft.set(field, value);
        }
        draft
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.input_name().parse::<Field>().unwrap(), field);
        }
        assert_eq!(
            "endereco.bairro".parse::<Field>().unwrap_err(),
            UnknownField("endereco.bairro".to_string())
        );
    }

    #[test]
    fn nested_edit_preserves_siblings() {
        let mut draft = filled();
        draft.set(Field::Address(AddressField::City), "Recife");
        assert_eq!(draft.address.city, "Recife");
        assert_eq!(draft.address.state, "SP");
        assert_eq!(draft.address.street, "Praça da Sé");
        assert_eq!(draft.name, "Maria");
    }

    #[test]
    fn to_save_reports_first_missing_field() {
        let mut draft = filled();
        draft.set(Field::Address(AddressField::Number), "  ");
        assert_eq!(
            draft.to_save(None).unwrap_err(),
            DraftError::Missing(Field::Address(AddressField::Number))
        );
        assert_eq!(
            PersonDraft::default().to_save(None).unwrap_err(),
            DraftError::Missing(Field::Name)
        );
    }

    #[test]
    fn to_save_rejects_non_iso_dates() {
        let mut draft = filled();
        draft.set(Field::BirthDate, "17/05/1990");
        assert_eq!(
            draft.to_save(None).unwrap_err(),
            DraftError::InvalidBirthDate("17/05/1990".to_string())
        );
    }

    #[test]
    fn to_save_carries_id_and_parsed_date() {
        let save = filled().to_save(Some(PersonId::new("3"))).unwrap();
        assert_eq!(save.id, Some(PersonId::new("3")));
        assert_eq!(save.birth_date, NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());
        assert_eq!(save.address.postal_code, "01001000");
    }

    #[test]
    fn apply_fragment_keeps_house_number() {
        let mut draft = filled();
        draft.apply_fragment(
            "20040020".to_string(),
            AddressFragment {
                street: "Avenida Rio Branco".to_string(),
                city: "Rio de Janeiro".to_string(),
                state: "RJ".to_string(),
            },
        );
        assert_eq!(draft.address.postal_code, "20040020");
        assert_eq!(draft.address.street, "Avenida Rio Branco");
        assert_eq!(draft.address.number, "10");
        assert_eq!(draft.address.state, "RJ");
    }
}
