// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use nummus::application::{LedgerService, SingleCurrencyService};
use nummus::domain::{Account, Amount, Currency, RateTable};
use nummus::storage::AccountStore;

/// Helper to create a currency-aware service over an empty store
pub fn test_service() -> LedgerService {
    LedgerService::new(AccountStore::new(), RateTable::reference())
}

/// Helper to create a single-currency service over an empty store
pub fn simple_service() -> SingleCurrencyService {
    SingleCurrencyService::new(AccountStore::new())
}

/// Every balance of a user, in currency order
pub fn balances(service: &LedgerService, username: &str) -> Result<Vec<(Currency, Amount)>> {
    Ok(service.check_balance(username)?.iter().collect())
}

/// Test fixture: users with starting balances
pub struct Users;

impl Users {
    /// Create a user and credit each `(amount, currency)` pair
    pub fn funded(
        service: &mut LedgerService,
        username: &str,
        credits: &[(Amount, &str)],
    ) -> Result<Account> {
        let mut account = service.create_user(username)?;
        for (amount, currency) in credits {
            account = service.credit_account(username, *amount, currency)?;
        }
        Ok(account)
    }
}
