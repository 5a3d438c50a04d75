use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use crate::application::{LedgerService, SingleCurrencyService};
use crate::config::load_rate_table;
use crate::domain::{
    format_amount, parse_amount, plan_deduction, Account, Amount, Currency, RateTable,
    SimpleAccount, Wallets,
};
use crate::io::export::{export_balances_csv, export_json, export_simple_balances_csv};
use crate::storage::AccountStore;

/// Nummus - peer-to-peer balance ledger
#[derive(Parser)]
#[command(name = "nummus")]
#[command(about = "An in-memory peer-to-peer ledger with multi-currency deduction")]
#[command(version)]
pub struct Cli {
    /// Exchange rate table (JSON object of currency code -> rate)
    #[arg(short, long, global = true)]
    pub rates: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the sample sequence of ledger operations and print the balances
    Demo {
        /// Use single-currency accounts
        #[arg(long)]
        single: bool,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the exchange rate table in use
    Rates,

    /// Preview how an amount would be deducted from a set of balances
    Plan {
        /// Amount to deduct (e.g., "22" or "22.50")
        amount: String,

        /// Currency the amount is requested in
        #[arg(short, long)]
        currency: String,

        /// Available balance, repeatable (e.g., --balance USD=20 --balance NGN=1000)
        #[arg(short, long = "balance", value_name = "CODE=AMOUNT")]
        balances: Vec<String>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        let rates = match &self.rates {
            Some(path) => load_rate_table(path)?,
            None => RateTable::reference(),
        };

        match self.command {
            Commands::Demo { single, format } => {
                if single {
                    let service = run_single_currency_demo()?;
                    print_simple_accounts(&service.list_accounts(), &format)?;
                } else {
                    let service = run_demo(rates)?;
                    print_accounts(&service.list_accounts(), &format)?;
                }
            }

            Commands::Rates => {
                println!("{:<10} {:>12}", "CURRENCY", "RATE");
                println!("{}", "-".repeat(23));
                for (currency, rate) in rates.iter() {
                    let marker = if currency == Currency::REFERENCE {
                        " (reference)"
                    } else {
                        ""
                    };
                    println!("{:<10} {:>12}{}", currency.as_str(), rate.to_string(), marker);
                }
            }

            Commands::Plan {
                amount,
                currency,
                balances,
            } => {
                let amount =
                    parse_amount(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
                if amount <= Decimal::ZERO {
                    bail!("Amount must be greater than zero");
                }
                let currency = Currency::from_code(&currency)
                    .with_context(|| format!("Unknown currency '{}'", currency))?;

                let mut wallets = Wallets::new();
                for entry in &balances {
                    let (code, value) = parse_balance(entry)?;
                    wallets
                        .credit(code, value)
                        .with_context(|| format!("Balance overflow for {}", code))?;
                }

                let plan = plan_deduction(&wallets, amount, currency, &rates)?;
                println!("Deduct {} {}:", format_amount(amount), currency);
                for (code, value) in plan.iter() {
                    println!("  {:<6} {:>20}", code.as_str(), value.to_string());
                }
            }
        }

        Ok(())
    }
}

/// Install a stderr subscriber honouring `RUST_LOG`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded in a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Parse a `CODE=AMOUNT` balance argument.
fn parse_balance(entry: &str) -> Result<(Currency, Amount)> {
    let (code, value) = entry
        .split_once('=')
        .with_context(|| format!("Invalid balance '{}'. Use CODE=AMOUNT", entry))?;
    let currency = Currency::from_code(code.trim())
        .with_context(|| format!("Unknown currency '{}'", code.trim()))?;
    let value = parse_amount(value).with_context(|| format!("Invalid amount in '{}'", entry))?;
    if value < Decimal::ZERO {
        bail!("Balance for {} cannot be negative", currency);
    }
    Ok((currency, value))
}

/// Sample run: two users exchanging dollars, then a send that has to fall
/// back on naira once the dollar balance runs out.
fn run_demo(rates: RateTable) -> Result<LedgerService> {
    let mut service = LedgerService::new(AccountStore::new(), rates);

    let a = service.create_user("A")?;
    service.credit_account(&a.username, Amount::from(10), "USD")?;

    let b = service.create_user("B")?;
    service.credit_account(&b.username, Amount::from(20), "USD")?;

    service.send(&b.username, &a.username, Amount::from(15), "USD")?;

    service.check_balance(&a.username)?;
    service.check_balance(&b.username)?;

    service.transfer(&a.username, Amount::from(25), "USD")?;
    service.check_balance(&a.username)?;

    service.credit_account(&a.username, Amount::from(10), "USD")?;
    service.credit_account(&a.username, Amount::from(800), "NGN")?;
    service.send(&a.username, &b.username, Amount::from(11), "USD")?;

    Ok(service)
}

fn run_single_currency_demo() -> Result<SingleCurrencyService> {
    let mut service = SingleCurrencyService::new(AccountStore::new());

    let a = service.create_user("A")?;
    service.credit_account(&a.username, Amount::from(10))?;

    let b = service.create_user("B")?;
    service.credit_account(&b.username, Amount::from(20))?;

    service.send(&b.username, &a.username, Amount::from(15))?;

    service.check_balance(&a.username)?;
    service.check_balance(&b.username)?;

    service.transfer(&a.username, Amount::from(25))?;
    service.check_balance(&a.username)?;

    Ok(service)
}

fn print_accounts(accounts: &[Account], format: &str) -> Result<()> {
    match format {
        "json" => {
            export_json(accounts.to_vec(), io::stdout())?;
        }
        "csv" => {
            export_balances_csv(accounts, io::stdout())?;
        }
        "table" => {
            print!("{:<16}", "USER");
            for currency in Currency::ALL {
                print!(" {:>14}", currency.as_str());
            }
            println!();
            println!("{}", "-".repeat(16 + 15 * Currency::COUNT));

            for account in accounts {
                print!("{:<16}", account.username);
                for (_, balance) in account.wallets.iter() {
                    print!(" {:>14}", format_amount(balance));
                }
                println!();
            }
        }
        other => bail!("Unknown format '{}'. Use table, json or csv", other),
    }
    Ok(())
}

fn print_simple_accounts(accounts: &[SimpleAccount], format: &str) -> Result<()> {
    match format {
        "json" => {
            export_json(accounts.to_vec(), io::stdout())?;
        }
        "csv" => {
            export_simple_balances_csv(accounts, io::stdout())?;
        }
        "table" => {
            println!("{:<16} {:>14}", "USER", "BALANCE");
            println!("{}", "-".repeat(31));
            for account in accounts {
                println!(
                    "{:<16} {:>14}",
                    account.username,
                    format_amount(account.balance)
                );
            }
        }
        other => bail!("Unknown format '{}'. Use table, json or csv", other),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_plan_command() {
        let cli = Cli::try_parse_from([
            "nummus", "plan", "22", "--currency", "USD", "-b", "USD=20", "-b", "NGN=1000",
        ])
        .unwrap();

        match cli.command {
            Commands::Plan {
                amount,
                currency,
                balances,
            } => {
                assert_eq!(amount, "22");
                assert_eq!(currency, "USD");
                assert_eq!(balances, vec!["USD=20", "NGN=1000"]);
            }
            _ => panic!("expected plan command"),
        }
    }

    #[test]
    fn test_parse_demo_defaults() {
        let cli = Cli::try_parse_from(["nummus", "demo"]).unwrap();
        assert!(cli.rates.is_none());
        assert!(matches!(
            cli.command,
            Commands::Demo { single: false, ref format } if format == "table"
        ));
    }

    #[test]
    fn test_parse_balance() {
        assert_eq!(
            parse_balance("NGN=1000").unwrap(),
            (Currency::Ngn, dec!(1000))
        );
        assert_eq!(
            parse_balance("GBP = 0.86").unwrap(),
            (Currency::Gbp, dec!(0.86))
        );
        assert!(parse_balance("NGN").is_err());
        assert!(parse_balance("EUR=5").is_err());
        assert!(parse_balance("USD=-5").is_err());
    }

    #[test]
    fn test_demo_balances() -> Result<()> {
        let service = run_demo(RateTable::reference())?;

        let a = service.check_balance("A")?;
        assert_eq!(a.balance(Currency::Usd), dec!(0));
        assert_eq!(a.balance(Currency::Ngn), dec!(385));

        let b = service.check_balance("B")?;
        assert_eq!(b.balance(Currency::Usd), dec!(16));
        Ok(())
    }

    #[test]
    fn test_single_currency_demo_balances() -> Result<()> {
        let service = run_single_currency_demo()?;

        assert_eq!(service.check_balance("A")?, dec!(0));
        assert_eq!(service.check_balance("B")?, dec!(5));
        Ok(())
    }
}
