pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

pub use application::{LedgerError, LedgerService, SingleCurrencyService};
pub use domain::*;
pub use storage::AccountStore;
