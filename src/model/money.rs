use std::fmt::Display;

use rust_decimal::Decimal;

use super::Currency;
use crate::util::decimal::{dollar_precision_str, round_cents};

/// An amount in a currency, always held at cent precision.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn of(currency: Currency, amount: Decimal) -> Self {
        Money {
            amount: round_cents(amount).normalize(),
            currency,
        }
    }

    pub fn zero(currency: Currency) -> Self {
        Money::of(currency, Decimal::ZERO)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency, dollar_precision_str(&self.amount))
    }
}
