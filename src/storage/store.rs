use std::collections::HashMap;

/// In-memory store owning every account record, keyed by username.
///
/// The store does not police duplicates: `add` replaces an existing entry.
/// Callers check `exists` first.
#[derive(Debug, Clone)]
pub struct AccountStore<A> {
    accounts: HashMap<String, A>,
}

impl<A> AccountStore<A> {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    pub fn add(&mut self, username: impl Into<String>, account: A) {
        self.accounts.insert(username.into(), account);
    }

    pub fn get(&self, username: &str) -> Option<&A> {
        self.accounts.get(username)
    }

    pub fn get_mut(&mut self, username: &str) -> Option<&mut A> {
        self.accounts.get_mut(username)
    }

    pub fn exists(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    /// Drop every account. Only meant for isolating tests.
    pub fn clear(&mut self) {
        self.accounts.clear();
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &A)> {
        self.accounts.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<A> Default for AccountStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SimpleAccount;

    #[test]
    fn test_add_and_get() {
        let mut store = AccountStore::new();
        store.add("A", SimpleAccount::new("A"));

        assert!(store.exists("A"));
        assert_eq!(store.get("A").map(|a| a.username.as_str()), Some("A"));
        assert!(store.get("B").is_none());
        assert!(!store.exists("B"));
    }

    #[test]
    fn test_keys_are_not_normalised() {
        let mut store = AccountStore::new();
        store.add("A", SimpleAccount::new("A"));

        assert!(!store.exists(" A"));
        assert!(!store.exists("a"));
    }

    #[test]
    fn test_add_replaces_existing_entry() {
        let mut store = AccountStore::new();
        let first = SimpleAccount::new("A");
        let second = SimpleAccount::new("A");
        let second_id = second.id;

        store.add("A", first);
        store.add("A", second);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("A").map(|a| a.id), Some(second_id));
    }

    #[test]
    fn test_get_mut_changes_are_visible() {
        let mut store = AccountStore::new();
        store.add("A", SimpleAccount::new("A"));

        if let Some(account) = store.get_mut("A") {
            account.balance += rust_decimal::Decimal::TEN;
        }

        assert_eq!(
            store.get("A").map(|a| a.balance),
            Some(rust_decimal::Decimal::TEN)
        );
    }

    #[test]
    fn test_clear() {
        let mut store = AccountStore::new();
        store.add("A", SimpleAccount::new("A"));
        store.add("B", SimpleAccount::new("B"));
        assert_eq!(store.len(), 2);

        store.clear();

        assert!(store.is_empty());
        assert!(!store.exists("A"));
    }
}
