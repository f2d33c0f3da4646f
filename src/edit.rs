//! Typed edits and the pure state transition that applies them.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::layout::{Layout, LayoutPosition, Section};
use crate::logo::Logo;
use crate::model::{non_negative, InvoiceItem, InvoiceState, ItemId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    #[error("unknown layout section: {0}")]
    UnknownSection(String),
    #[error("non-finite position for section {section}: ({x}, {y})")]
    NonFiniteCoordinate { section: Section, x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceField {
    Number,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Address,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    BankName,
    AccountName,
    AccountNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    Address,
    Phone,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    Description,
    Price,
    Quantity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Invoice(InvoiceField, String),
    Customer(CustomerField, String),
    Payment(PaymentField, String),
    Company(CompanyField, String),
    Terms(String),
    Item {
        id: ItemId,
        field: ItemField,
        value: String,
    },
    AddItem,
    RemoveItem(ItemId),
    SetLogo(Option<Logo>),
    SetCustomLayout(bool),
    MoveSection {
        section: Section,
        position: LayoutPosition,
    },
    ResetLayout,
}

static NUMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number regex")
});

/// Parses the longest leading decimal number in `input`. Anything that does
/// not yield a finite, non-negative number becomes 0.
pub fn coerce_number(input: &str) -> f64 {
    let value = NUMBER_PREFIX
        .find(input)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .unwrap_or(0.0);
    non_negative(value)
}

impl InvoiceState {
    /// Returns the state that results from applying `edit`. `self` is never
    /// modified; on error the caller keeps the old state.
    pub fn apply(&self, edit: Edit) -> Result<InvoiceState, EditError> {
        let mut next = self.clone();
        match edit {
            Edit::Invoice(field, value) => {
                let slot = match field {
                    InvoiceField::Number => &mut next.invoice.number,
                    InvoiceField::Date => &mut next.invoice.date,
                };
                *slot = value;
            }
            Edit::Customer(field, value) => {
                let slot = match field {
                    CustomerField::Name => &mut next.customer.name,
                    CustomerField::Address => &mut next.customer.address,
                    CustomerField::Phone => &mut next.customer.phone,
                };
                *slot = value;
            }
            Edit::Payment(field, value) => {
                let slot = match field {
                    PaymentField::BankName => &mut next.payment.bank_name,
                    PaymentField::AccountName => &mut next.payment.account_name,
                    PaymentField::AccountNumber => &mut next.payment.account_number,
                };
                *slot = value;
            }
            Edit::Company(field, value) => {
                let slot = match field {
                    CompanyField::Name => &mut next.company.name,
                    CompanyField::Address => &mut next.company.address,
                    CompanyField::Phone => &mut next.company.phone,
                    CompanyField::Email => &mut next.company.email,
                };
                *slot = value;
            }
            Edit::Terms(value) => next.terms = value,
            Edit::Item { id, field, value } => {
                let Some(item) = next.items.iter_mut().find(|item| item.id == id) else {
                    tracing::debug!(%id, "edit for missing item ignored");
                    return Ok(next);
                };
                match field {
                    ItemField::Description => item.description = value,
                    ItemField::Price => item.price = coerce_number(&value),
                    ItemField::Quantity => item.quantity = coerce_number(&value),
                }
            }
            Edit::AddItem => {
                let (added, _) = self.add_item();
                return Ok(added);
            }
            Edit::RemoveItem(id) => {
                if let Some(index) = next.items.iter().position(|item| item.id == id) {
                    next.items.remove(index);
                }
            }
            Edit::SetLogo(logo) => next.logo = logo,
            Edit::SetCustomLayout(enabled) => next.custom_layout = enabled,
            Edit::MoveSection { section, position } => {
                if !position.is_finite() {
                    return Err(EditError::NonFiniteCoordinate {
                        section,
                        x: position.x,
                        y: position.y,
                    });
                }
                next.layout.set(section, position);
            }
            Edit::ResetLayout => next.layout = Layout::default(),
        }
        Ok(next)
    }

    /// Appends a fresh item and returns the new state with the item's id.
    pub fn add_item(&self) -> (InvoiceState, ItemId) {
        let mut next = self.clone();
        let id = next.fresh_id();
        next.items.push(InvoiceItem {
            id,
            description: "New Item".to_string(),
            price: 0.0,
            quantity: 1.0,
        });
        (next, id)
    }

    /// String-keyed form of [`Edit::MoveSection`].
    pub fn update_layout_position_by_name(
        &self,
        name: &str,
        x: f64,
        y: f64,
    ) -> Result<InvoiceState, EditError> {
        let section: Section = name.parse()?;
        self.apply(Edit::MoveSection {
            section,
            position: LayoutPosition::new(x, y),
        })
    }
}
