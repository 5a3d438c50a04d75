use tracing::{debug, info, warn};

use crate::domain::{Amount, SimpleAccount};
use crate::storage::AccountStore;

use super::validate::{validate_amount, validate_username};
use super::LedgerError;

/// Ledger service for accounts holding a single, implicit currency.
pub struct SingleCurrencyService {
    store: AccountStore<SimpleAccount>,
}

impl SingleCurrencyService {
    pub fn new(store: AccountStore<SimpleAccount>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &AccountStore<SimpleAccount> {
        &self.store
    }

    pub fn reset(&mut self) {
        self.store.clear();
    }

    /// All accounts, sorted by username.
    pub fn list_accounts(&self) -> Vec<SimpleAccount> {
        let mut accounts: Vec<SimpleAccount> =
            self.store.iter().map(|(_, a)| a.clone()).collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        accounts
    }

    pub fn create_user(&mut self, username: &str) -> Result<SimpleAccount, LedgerError> {
        validate_username(username)?;

        if self.store.exists(username) {
            return Err(LedgerError::UserAlreadyExists(username.to_string()));
        }

        let account = SimpleAccount::new(username);
        self.store.add(username, account.clone());

        info!(user = username, id = %account.id, "User added");
        Ok(account)
    }

    pub fn credit_account(
        &mut self,
        username: &str,
        amount: Amount,
    ) -> Result<SimpleAccount, LedgerError> {
        validate_username(username)?;
        validate_amount(amount)?;

        let account = self.get_account_mut(username)?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(username.to_string()))?;

        info!(user = username, %amount, balance = %account.balance, "Account credited");
        Ok(account.clone())
    }

    pub fn send(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: Amount,
    ) -> Result<(SimpleAccount, SimpleAccount), LedgerError> {
        validate_username(sender)?;
        validate_username(recipient)?;

        if sender == recipient {
            return Err(LedgerError::SelfTransferNotAllowed(sender.to_string()));
        }

        validate_amount(amount)?;

        let from = self.get_account(sender)?;
        let to = self.get_account(recipient)?;
        check_sufficient_funds(from, amount)?;
        let credited = to
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(recipient.to_string()))?;

        let to = self.get_account_mut(recipient)?;
        to.balance = credited;
        let to = to.clone();

        let from = self.get_account_mut(sender)?;
        from.balance -= amount;
        let from = from.clone();

        info!(from = sender, to = recipient, %amount, "Money sent");
        Ok((from, to))
    }

    pub fn transfer(&mut self, username: &str, amount: Amount) -> Result<SimpleAccount, LedgerError> {
        validate_username(username)?;
        validate_amount(amount)?;

        let account = self.get_account_mut(username)?;
        check_sufficient_funds(account, amount)?;
        account.balance -= amount;

        info!(user = username, %amount, "Money transferred out");
        Ok(account.clone())
    }

    pub fn check_balance(&self, username: &str) -> Result<Amount, LedgerError> {
        validate_username(username)?;
        let account = self.get_account(username)?;

        debug!(user = username, balance = %account.balance, "Balance checked");
        Ok(account.balance)
    }

    fn get_account(&self, username: &str) -> Result<&SimpleAccount, LedgerError> {
        self.store
            .get(username)
            .ok_or_else(|| LedgerError::UserNotFound(username.to_string()))
    }

    fn get_account_mut(&mut self, username: &str) -> Result<&mut SimpleAccount, LedgerError> {
        self.store
            .get_mut(username)
            .ok_or_else(|| LedgerError::UserNotFound(username.to_string()))
    }
}

impl Default for SingleCurrencyService {
    fn default() -> Self {
        Self::new(AccountStore::new())
    }
}

fn check_sufficient_funds(account: &SimpleAccount, amount: Amount) -> Result<(), LedgerError> {
    if account.balance < amount {
        warn!(user = %account.username, balance = %account.balance, %amount, "Insufficient balance");
        return Err(LedgerError::InsufficientBalance {
            username: account.username.clone(),
            requested: amount,
            available: account.balance,
        });
    }
    Ok(())
}
