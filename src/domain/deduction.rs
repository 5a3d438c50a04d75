use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::{Amount, Currency, RateTable, Wallets};

/// Ordered amounts to subtract from an account's currency balances.
///
/// Entries are in the order they were drawn; a currency appears at most once
/// and never with a zero amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeductionPlan {
    entries: Vec<(Currency, Amount)>,
}

impl DeductionPlan {
    pub fn iter(&self) -> impl Iterator<Item = (Currency, Amount)> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, currency: Currency) -> Option<Amount> {
        self.iter().find(|(c, _)| *c == currency).map(|(_, a)| a)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, currency: Currency, amount: Amount) {
        self.entries.push((currency, amount));
    }
}

/// Work out how to debit `amount` of `target` from `wallets`.
///
/// The target balance is used first. Any shortfall is drawn greedily from the
/// other non-zero balances in [`Currency::ALL`] order, each converted into the
/// target currency through `rates`. The last currency touched is only debited
/// the portion needed to close the gap. Nothing is mutated: either the
/// returned plan covers the full amount or an error is returned.
pub fn plan_deduction(
    wallets: &Wallets,
    amount: Amount,
    target: Currency,
    rates: &RateTable,
) -> Result<DeductionPlan, DeductionError> {
    let mut plan = DeductionPlan::default();
    let available = wallets.balance(target);

    if available >= amount {
        plan.push(target, amount);
        return Ok(plan);
    }

    if !available.is_zero() {
        plan.push(target, available);
    }

    // Shortfall, in units of the target currency
    let mut remaining = amount - available;

    for (currency, balance) in wallets.iter() {
        if currency == target || balance.is_zero() {
            continue;
        }

        // A value too large to represent covers any shortfall.
        let value = rates
            .convert(balance, currency, target)
            .unwrap_or(Decimal::MAX);

        if remaining <= value {
            let needed = remaining
                .checked_mul(rates.rate(currency))
                .and_then(|v| v.checked_div(rates.rate(target)))
                .ok_or(DeductionError::Overflow)?;
            plan.push(currency, needed.min(balance));
            return Ok(plan);
        }

        plan.push(currency, balance);
        remaining -= value;
    }

    Err(DeductionError::Insufficient {
        currency: target,
        requested: amount,
        shortfall: remaining,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeductionError {
    /// Every balance together is worth less than the requested amount.
    Insufficient {
        currency: Currency,
        requested: Amount,
        shortfall: Amount,
    },
    Overflow,
}

impl fmt::Display for DeductionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeductionError::Insufficient {
                currency,
                requested,
                shortfall,
            } => write!(
                f,
                "cannot cover {} {}: short by {} {}",
                requested, currency, shortfall, currency
            ),
            DeductionError::Overflow => write!(f, "amount overflow while converting currencies"),
        }
    }
}

impl std::error::Error for DeductionError {}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn wallets(balances: &[(Currency, Amount)]) -> Wallets {
        let mut wallets = Wallets::new();
        for (currency, amount) in balances {
            wallets.credit(*currency, *amount).unwrap();
        }
        wallets
    }

    #[test]
    fn test_target_balance_covers_amount() {
        let rates = RateTable::reference();
        let w = wallets(&[(Currency::Usd, dec!(50)), (Currency::Ngn, dec!(1000))]);

        let plan = plan_deduction(&w, dec!(22), Currency::Usd, &rates).unwrap();

        assert_eq!(plan.iter().collect::<Vec<_>>(), vec![(Currency::Usd, dec!(22))]);
    }

    #[test]
    fn test_exact_target_balance_stays_single_currency() {
        let rates = RateTable::reference();
        let w = wallets(&[(Currency::Usd, dec!(22)), (Currency::Ngn, dec!(1000))]);

        let plan = plan_deduction(&w, dec!(22), Currency::Usd, &rates).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.get(Currency::Usd), Some(dec!(22)));
    }

    #[test]
    fn test_shortfall_drawn_from_other_currency() {
        let rates = RateTable::reference();
        let w = wallets(&[(Currency::Usd, dec!(20)), (Currency::Ngn, dec!(1000))]);

        let plan = plan_deduction(&w, dec!(22), Currency::Usd, &rates).unwrap();

        assert_eq!(
            plan.iter().collect::<Vec<_>>(),
            vec![(Currency::Usd, dec!(20)), (Currency::Ngn, dec!(830))]
        );
    }

    #[test]
    fn test_zero_target_balance_is_not_planned() {
        let rates = RateTable::reference();
        let w = wallets(&[(Currency::Ngn, dec!(1000))]);

        let plan = plan_deduction(&w, dec!(2), Currency::Usd, &rates).unwrap();

        assert_eq!(plan.get(Currency::Usd), None);
        assert_eq!(
            plan.iter().collect::<Vec<_>>(),
            vec![(Currency::Ngn, dec!(830))]
        );
    }

    #[test]
    fn test_currencies_drained_in_enumeration_order() {
        let rates = RateTable::reference();
        // Each non-target balance is worth exactly 1 USD.
        let w = wallets(&[
            (Currency::Usd, dec!(1)),
            (Currency::Ngn, dec!(415)),
            (Currency::Gbp, dec!(0.86)),
            (Currency::Yuan, dec!(6.89)),
        ]);

        let plan = plan_deduction(&w, dec!(3.5), Currency::Usd, &rates).unwrap();

        assert_eq!(
            plan.iter().collect::<Vec<_>>(),
            vec![
                (Currency::Usd, dec!(1)),
                (Currency::Ngn, dec!(415)),
                (Currency::Gbp, dec!(0.86)),
                (Currency::Yuan, dec!(3.445)),
            ]
        );
    }

    #[test]
    fn test_earlier_currency_preferred_over_larger_one() {
        let rates = RateTable::reference();
        let w = wallets(&[(Currency::Ngn, dec!(830)), (Currency::Gbp, dec!(86))]);

        let plan = plan_deduction(&w, dec!(1), Currency::Usd, &rates).unwrap();

        assert_eq!(
            plan.iter().collect::<Vec<_>>(),
            vec![(Currency::Ngn, dec!(415))]
        );
    }

    #[test]
    fn test_shortfall_equal_to_value_takes_whole_balance() {
        let rates = RateTable::reference();
        let w = wallets(&[(Currency::Ngn, dec!(415))]);

        let plan = plan_deduction(&w, dec!(1), Currency::Usd, &rates).unwrap();

        assert_eq!(plan.get(Currency::Ngn), Some(dec!(415)));
    }

    #[test]
    fn test_non_reference_target_uses_cross_rate() {
        let rates = RateTable::reference();
        let w = wallets(&[(Currency::Usd, dec!(100))]);

        let plan = plan_deduction(&w, dec!(10), Currency::Gbp, &rates).unwrap();

        assert_eq!(plan.get(Currency::Usd), Some(dec!(10) * dec!(1) / dec!(0.86)));
        assert_eq!(plan.get(Currency::Gbp), None);
    }

    #[test]
    fn test_insufficient_across_all_currencies() {
        let rates = RateTable::reference();
        let w = wallets(&[(Currency::Usd, dec!(20)), (Currency::Ngn, dec!(1000))]);

        let err = plan_deduction(&w, dec!(30), Currency::Usd, &rates).unwrap_err();

        assert_eq!(
            err,
            DeductionError::Insufficient {
                currency: Currency::Usd,
                requested: dec!(30),
                shortfall: dec!(10) - dec!(1000) / dec!(415) * dec!(1),
            }
        );
    }

    #[test]
    fn test_empty_wallets_are_insufficient() {
        let rates = RateTable::reference();
        let err = plan_deduction(&Wallets::new(), dec!(10), Currency::Usd, &rates).unwrap_err();

        assert!(matches!(err, DeductionError::Insufficient { shortfall, .. } if shortfall == dec!(10)));
    }

    #[test]
    fn test_apply_plan_to_wallets() {
        let rates = RateTable::reference();
        let mut w = wallets(&[(Currency::Usd, dec!(20)), (Currency::Ngn, dec!(1000))]);

        let plan = plan_deduction(&w, dec!(22), Currency::Usd, &rates).unwrap();
        w.apply(&plan);

        assert_eq!(w.balance(Currency::Usd), dec!(0));
        assert_eq!(w.balance(Currency::Ngn), dec!(170));
        assert_eq!(w.balance(Currency::Gbp), dec!(0));
        assert_eq!(w.balance(Currency::Yuan), dec!(0));
    }
}
