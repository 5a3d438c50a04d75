use std::fmt;

use rust_decimal::Decimal;

/// Money is represented as a base-10 decimal to avoid floating-point drift
/// when converting between currencies.
pub type Amount = Decimal;

/// Format an amount for display, rounded to two decimal places.
/// Example: 170 -> "170.00", 2.4096 -> "2.41"
pub fn format_amount(amount: Amount) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Parse a decimal string into an amount.
/// Example: "50.00" -> 50, "12.5" -> 12.5, "-3" -> -3
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    Decimal::from_str_exact(input).map_err(|_| ParseAmountError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount is empty"),
            ParseAmountError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
