use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{Amount, Currency, DeductionPlan};

pub type AccountId = Uuid;

/// Per-currency balances of an account.
///
/// Always holds exactly one entry for every supported currency, starting at
/// zero. Balances never go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Wallets(BTreeMap<Currency, Amount>);

impl Wallets {
    pub fn new() -> Self {
        Self(Currency::ALL.into_iter().map(|c| (c, Decimal::ZERO)).collect())
    }

    pub fn balance(&self, currency: Currency) -> Amount {
        self.0.get(&currency).copied().unwrap_or(Decimal::ZERO)
    }

    /// Balances in deduction order.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, Amount)> + '_ {
        self.0.iter().map(|(c, b)| (*c, *b))
    }

    /// Balance of `currency` after adding `amount`, or `None` on overflow.
    pub fn credited(&self, currency: Currency, amount: Amount) -> Option<Amount> {
        self.balance(currency).checked_add(amount)
    }

    pub fn credit(&mut self, currency: Currency, amount: Amount) -> Option<Amount> {
        let updated = self.credited(currency, amount)?;
        self.0.insert(currency, updated);
        Some(updated)
    }

    /// Subtract every entry of `plan`. A plan computed against these
    /// balances never exceeds them; any excess is clamped at zero.
    pub fn apply(&mut self, plan: &DeductionPlan) {
        for (currency, amount) in plan.iter() {
            let updated = self.balance(currency) - amount;
            self.0.insert(currency, updated.max(Decimal::ZERO));
        }
    }
}

impl Default for Wallets {
    fn default() -> Self {
        Self::new()
    }
}

/// A user account of the currency-aware ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub wallets: Wallets,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            wallets: Wallets::new(),
            created_at: Utc::now(),
        }
    }

    pub fn balance(&self, currency: Currency) -> Amount {
        self.wallets.balance(currency)
    }
}

/// A user account of the single-currency ledger.
#[derive(Debug, Clone, Serialize)]
pub struct SimpleAccount {
    pub id: AccountId,
    pub username: String,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
}

impl SimpleAccount {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            balance: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }
}
