// Application layer - use cases and orchestration over the account store.
// Both ledger variants share input validation and the error taxonomy.

pub mod error;
mod service;
mod simple;
mod validate;

pub use error::*;
pub use service::*;
pub use simple::*;
