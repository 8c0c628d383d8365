//! Input checks the settlement engine does not perform itself.
//!
//! The engine accepts anything and degrades quietly, so every write path
//! runs people and expenses through here first.
use thiserror::Error;

use crate::schemas::{Expense, Person};

/// Item totals may drift from the expense amount by at most a cent.
const ITEMS_TOLERANCE: f64 = 0.01;

/// Largest amount accepted for an expense or item. Keeps cent arithmetic
/// and trip totals finite.
pub const MAX_AMOUNT: f64 = 1e12;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("\"{0}\" already exists")]
    DuplicateName(String),
    #[error("Count must be at least 1")]
    InvalidWeight,
    #[error("Description is required")]
    DescriptionRequired,
    #[error("Amount must be a positive number")]
    InvalidAmount,
    #[error("Amount is too large")]
    AmountTooLarge,
    #[error("Please select who paid")]
    PayerRequired,
    #[error("Please select at least one person")]
    ConsumersRequired,
    #[error("Items total ({items_total:.2}) doesn't match expense amount ({amount:.2})")]
    ItemsTotalMismatch { items_total: f64, amount: f64 },
    #[error("Item {0} must have description, amount, and at least one person")]
    InvalidItem(usize),
}

/// Checks a person against the names already on the roster. The name is
/// compared trimmed, as it will be stored.
pub fn validate_person<'a, I>(person: &Person, existing_names: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let name = person.name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if existing_names.into_iter().any(|existing| existing == name) {
        return Err(ValidationError::DuplicateName(name.to_string()));
    }
    if person.weight < 1 {
        return Err(ValidationError::InvalidWeight);
    }
    Ok(())
}

pub fn validate_expense(expense: &Expense) -> Result<(), ValidationError> {
    if expense.description.trim().is_empty() {
        return Err(ValidationError::DescriptionRequired);
    }
    if !is_positive(expense.amount) {
        return Err(ValidationError::InvalidAmount);
    }
    if expense.amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge);
    }
    if expense.payer.is_empty() {
        return Err(ValidationError::PayerRequired);
    }
    if expense.consumers.is_empty() {
        return Err(ValidationError::ConsumersRequired);
    }

    if let Some(items) = expense.allocation_items() {
        let items_total: f64 = items.iter().map(|item| item.amount).sum();
        if (items_total - expense.amount).abs() > ITEMS_TOLERANCE {
            return Err(ValidationError::ItemsTotalMismatch {
                items_total,
                amount: expense.amount,
            });
        }
        for (index, item) in items.iter().enumerate() {
            if item.description.trim().is_empty()
                || !is_positive(item.amount)
                || item.amount > MAX_AMOUNT
                || item.consumers.is_empty()
            {
                return Err(ValidationError::InvalidItem(index));
            }
        }
    }
    Ok(())
}

fn is_positive(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}
