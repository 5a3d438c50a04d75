use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::domain::{Account, SimpleAccount};

/// Point-in-time view of every account balance.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSnapshot<A> {
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<A>,
}

impl<A> BalanceSnapshot<A> {
    pub fn new(accounts: Vec<A>) -> Self {
        Self {
            exported_at: Utc::now(),
            accounts,
        }
    }
}

/// Export multi-currency balances to CSV, one row per account and currency.
pub fn export_balances_csv<W: Write>(accounts: &[Account], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    // Write header
    csv_writer.write_record(["username", "currency", "balance"])?;

    let mut count = 0;
    for account in accounts {
        for (currency, balance) in account.wallets.iter() {
            csv_writer.write_record([
                account.username.as_str(),
                currency.as_str(),
                balance.to_string().as_str(),
            ])?;
            count += 1;
        }
    }

    csv_writer.flush()?;
    Ok(count)
}

/// Export single-currency balances to CSV, one row per account.
pub fn export_simple_balances_csv<W: Write>(
    accounts: &[SimpleAccount],
    writer: W,
) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["username", "balance"])?;

    for account in accounts {
        csv_writer.write_record([
            account.username.as_str(),
            account.balance.to_string().as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(accounts.len())
}

/// Export a balance snapshot as pretty-printed JSON.
pub fn export_json<A: Serialize, W: Write>(accounts: Vec<A>, mut writer: W) -> Result<usize> {
    let count = accounts.len();
    let snapshot = BalanceSnapshot::new(accounts);
    serde_json::to_writer_pretty(&mut writer, &snapshot)?;
    writeln!(writer)?;
    Ok(count)
}
