use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::Amount;

/// Currencies a ledger account holds a balance in.
///
/// Declaration order is the enumeration order used when drawing on other
/// currencies during a multi-currency deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ngn,
    Usd,
    Gbp,
    Yuan,
}

impl Currency {
    pub const COUNT: usize = 4;

    /// Every supported currency, in deduction order.
    pub const ALL: [Currency; Currency::COUNT] =
        [Currency::Ngn, Currency::Usd, Currency::Gbp, Currency::Yuan];

    /// The pivot currency of the reference rate table.
    pub const REFERENCE: Currency = Currency::Usd;

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Ngn => "NGN",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Yuan => "YUAN",
        }
    }

    /// Look up a currency by its exact code. Codes are case-sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        Currency::ALL.into_iter().find(|c| c.as_str() == code)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed exchange rates of every supported currency against a reference unit.
///
/// A table always holds a strictly positive rate for each currency in
/// [`Currency::ALL`] and cannot be modified once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    rates: [Amount; Currency::COUNT],
}

impl RateTable {
    /// Reference table: USD=1, NGN=415, GBP=0.86, YUAN=6.89.
    pub fn reference() -> Self {
        let mut rates = [Decimal::ONE; Currency::COUNT];
        rates[Currency::Ngn.index()] = Decimal::new(415, 0);
        rates[Currency::Usd.index()] = Decimal::ONE;
        rates[Currency::Gbp.index()] = Decimal::new(86, 2);
        rates[Currency::Yuan.index()] = Decimal::new(689, 2);
        Self { rates }
    }

    /// Build a table from `(code, rate)` pairs.
    pub fn new<I, S>(entries: I) -> Result<Self, RateTableError>
    where
        I: IntoIterator<Item = (S, Amount)>,
        S: AsRef<str>,
    {
        let mut rates: [Option<Amount>; Currency::COUNT] = [None; Currency::COUNT];

        for (code, rate) in entries {
            let code = code.as_ref();
            let currency = Currency::from_code(code)
                .ok_or_else(|| RateTableError::UnknownCurrency(code.to_string()))?;
            if rate <= Decimal::ZERO {
                return Err(RateTableError::NonPositiveRate { currency, rate });
            }
            rates[currency.index()] = Some(rate);
        }

        let mut table = [Decimal::ONE; Currency::COUNT];
        for currency in Currency::ALL {
            table[currency.index()] =
                rates[currency.index()].ok_or(RateTableError::MissingRate(currency))?;
        }

        Ok(Self { rates: table })
    }

    pub fn rate(&self, currency: Currency) -> Amount {
        self.rates[currency.index()]
    }

    /// Value of `amount` units of `from` expressed in `to`, pivoting through
    /// the reference unit: `amount / rate[from] * rate[to]`.
    /// Returns `None` on arithmetic overflow.
    pub fn convert(&self, amount: Amount, from: Currency, to: Currency) -> Option<Amount> {
        amount
            .checked_div(self.rate(from))?
            .checked_mul(self.rate(to))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, Amount)> + '_ {
        Currency::ALL.into_iter().map(|c| (c, self.rate(c)))
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::reference()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateTableError {
    UnknownCurrency(String),
    MissingRate(Currency),
    NonPositiveRate { currency: Currency, rate: Amount },
}

impl fmt::Display for RateTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateTableError::UnknownCurrency(code) => write!(f, "unknown currency code '{}'", code),
            RateTableError::MissingRate(currency) => write!(f, "missing rate for {}", currency),
            RateTableError::NonPositiveRate { currency, rate } => {
                write!(f, "rate for {} must be positive, got {}", currency, rate)
            }
        }
    }
}

impl std::error::Error for RateTableError {}
