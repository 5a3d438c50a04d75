use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::{Amount, RateTable};

/// Parse a rate table from JSON of the form
/// `{"USD": "1", "NGN": "415", "GBP": "0.86", "YUAN": "6.89"}`.
/// Rates may be given as strings or numbers; strings keep exact precision.
pub fn parse_rate_table(json: &str) -> Result<RateTable> {
    let entries: BTreeMap<String, Amount> =
        serde_json::from_str(json).context("Rate table must be a JSON object of code -> rate")?;
    let table = RateTable::new(entries)?;
    Ok(table)
}

/// Load a rate table from a JSON file.
pub fn load_rate_table(path: impl AsRef<Path>) -> Result<RateTable> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rate table {}", path.display()))?;
    parse_rate_table(&json).with_context(|| format!("Invalid rate table {}", path.display()))
}
