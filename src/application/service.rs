use tracing::{debug, info, warn};

use crate::domain::{
    plan_deduction, Account, Amount, Currency, DeductionError, DeductionPlan, RateTable, Wallets,
};
use crate::storage::AccountStore;

use super::validate::{validate_amount, validate_currency, validate_username};
use super::LedgerError;

/// Currency-aware ledger service.
///
/// Owns the account store and a fixed rate table. Every operation validates
/// its input, resolves accounts from the store and only then mutates, so a
/// failed call leaves all balances untouched.
pub struct LedgerService {
    store: AccountStore<Account>,
    rates: RateTable,
}

impl LedgerService {
    /// Create a new ledger service over the given store and rates.
    pub fn new(store: AccountStore<Account>, rates: RateTable) -> Self {
        Self { store, rates }
    }

    /// Empty ledger using the reference rate table.
    pub fn with_reference_rates() -> Self {
        Self::new(AccountStore::new(), RateTable::reference())
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn store(&self) -> &AccountStore<Account> {
        &self.store
    }

    /// Remove every account.
    pub fn reset(&mut self) {
        self.store.clear();
    }

    /// All accounts, sorted by username.
    pub fn list_accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.store.iter().map(|(_, a)| a.clone()).collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        accounts
    }

    // ========================
    // Account operations
    // ========================

    /// Create a new user with every currency balance at zero.
    pub fn create_user(&mut self, username: &str) -> Result<Account, LedgerError> {
        validate_username(username)?;

        if self.store.exists(username) {
            return Err(LedgerError::UserAlreadyExists(username.to_string()));
        }

        let account = Account::new(username);
        self.store.add(username, account.clone());

        info!(user = username, id = %account.id, "User added");
        Ok(account)
    }

    /// Add `amount` of `currency` to a user's balance.
    pub fn credit_account(
        &mut self,
        username: &str,
        amount: Amount,
        currency: &str,
    ) -> Result<Account, LedgerError> {
        validate_username(username)?;
        let currency = validate_currency(currency)?;
        validate_amount(amount)?;

        let account = self.get_account_mut(username)?;
        let balance = account
            .wallets
            .credit(currency, amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(username.to_string()))?;

        info!(user = username, %currency, %amount, %balance, "Account credited");
        Ok(account.clone())
    }

    /// Send money from one user to another.
    ///
    /// The sender is debited according to the deduction plan, possibly across
    /// several currencies; the recipient always receives the full `amount` in
    /// `currency`.
    pub fn send(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: Amount,
        currency: &str,
    ) -> Result<(Account, Account), LedgerError> {
        validate_username(sender)?;
        validate_username(recipient)?;
        let currency = validate_currency(currency)?;

        if sender == recipient {
            return Err(LedgerError::SelfTransferNotAllowed(sender.to_string()));
        }

        validate_amount(amount)?;

        // Resolve both sides before touching any balance
        let from = self.get_account(sender)?;
        self.get_account(recipient)?;

        let plan = self.deduction_for(from, amount, currency)?;

        // Only the recipient credit can fail; it must precede the sender debit.
        let to = self.get_account_mut(recipient)?;
        to.wallets
            .credit(currency, amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(recipient.to_string()))?;
        let to = to.clone();

        let from = self.get_account_mut(sender)?;
        from.wallets.apply(&plan);
        let from = from.clone();

        info!(
            from = sender,
            to = recipient,
            %currency,
            %amount,
            "Money sent"
        );
        Ok((from, to))
    }

    /// Move money out of a user's account. Funds leave the ledger.
    pub fn transfer(
        &mut self,
        username: &str,
        amount: Amount,
        currency: &str,
    ) -> Result<Account, LedgerError> {
        validate_username(username)?;
        let currency = validate_currency(currency)?;
        validate_amount(amount)?;

        let account = self.get_account(username)?;
        let plan = self.deduction_for(account, amount, currency)?;

        let account = self.get_account_mut(username)?;
        account.wallets.apply(&plan);

        info!(user = username, %currency, %amount, "Money transferred out");
        Ok(account.clone())
    }

    /// Current balance of every currency held by a user.
    pub fn check_balance(&self, username: &str) -> Result<Wallets, LedgerError> {
        validate_username(username)?;
        let account = self.get_account(username)?;

        debug!(user = username, balances = ?account.wallets, "Balance checked");
        Ok(account.wallets.clone())
    }

    /// Preview how `amount` of `currency` would be debited from a user,
    /// without changing anything.
    pub fn plan_deduction(
        &self,
        username: &str,
        amount: Amount,
        currency: &str,
    ) -> Result<DeductionPlan, LedgerError> {
        validate_username(username)?;
        let currency = validate_currency(currency)?;
        validate_amount(amount)?;

        let account = self.get_account(username)?;
        self.deduction_for(account, amount, currency)
    }

    fn get_account(&self, username: &str) -> Result<&Account, LedgerError> {
        self.store
            .get(username)
            .ok_or_else(|| LedgerError::UserNotFound(username.to_string()))
    }

    fn get_account_mut(&mut self, username: &str) -> Result<&mut Account, LedgerError> {
        self.store
            .get_mut(username)
            .ok_or_else(|| LedgerError::UserNotFound(username.to_string()))
    }

    fn deduction_for(
        &self,
        account: &Account,
        amount: Amount,
        currency: Currency,
    ) -> Result<DeductionPlan, LedgerError> {
        match plan_deduction(&account.wallets, amount, currency, &self.rates) {
            Ok(plan) => {
                debug!(user = %account.username, ?plan, "Deduction planned");
                Ok(plan)
            }
            Err(DeductionError::Insufficient {
                requested,
                shortfall,
                ..
            }) => {
                warn!(
                    user = %account.username,
                    %currency,
                    %requested,
                    %shortfall,
                    "Insufficient balance"
                );
                Err(LedgerError::InsufficientBalance {
                    username: account.username.clone(),
                    requested,
                    available: requested - shortfall,
                })
            }
            Err(DeductionError::Overflow) => {
                Err(LedgerError::BalanceOverflow(account.username.clone()))
            }
        }
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::with_reference_rates()
    }
}
