mod account;
mod currency;
mod deduction;
mod money;

pub use account::*;
pub use currency::*;
pub use deduction::*;
pub use money::*;
