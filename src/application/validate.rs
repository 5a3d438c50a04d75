use rust_decimal::Decimal;

use crate::domain::{Amount, Currency};

use super::LedgerError;

/// A username is valid when it is not blank. The stored identifier is the
/// username as given, surrounding whitespace included.
pub(crate) fn validate_username(username: &str) -> Result<(), LedgerError> {
    if username.trim().is_empty() {
        return Err(LedgerError::InvalidUser(username.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_currency(code: &str) -> Result<Currency, LedgerError> {
    Currency::from_code(code).ok_or_else(|| LedgerError::InvalidCurrency(code.to_string()))
}

pub(crate) fn validate_amount(amount: Amount) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}
