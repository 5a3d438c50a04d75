use thiserror::Error;

use crate::domain::Amount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid user: {0:?}")]
    InvalidUser(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    #[error("Invalid amount {0}: amount must be greater than zero")]
    InvalidAmount(Amount),

    #[error("Invalid operation: {0} cannot send money to themselves")]
    SelfTransferNotAllowed(String),

    #[error("Insufficient balance for {username}: requested {requested}, available {available}")]
    InsufficientBalance {
        username: String,
        requested: Amount,
        available: Amount,
    },

    #[error("Balance overflow for {0}")]
    BalanceOverflow(String),
}
