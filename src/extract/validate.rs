//! Consistency checks over extracted items, run before they are imported.
//!
//! The builder already refuses drafts that do not add up, so these mostly
//! guard items constructed some other way (or by a faulty recipe).

use std::fmt::Display;

use rust_decimal::Decimal;

use super::config::ExtractConfig;
use crate::{
    model::{
        AccountTransaction, AccountTxType, Currency, Item, Money, PortfolioTransaction,
        PortfolioTxType, Unit, UnitKind,
    },
    util::decimal::is_negative,
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ValidationIssue {
    /// Index into the checked item list.
    pub item_index: usize,
    pub message: String,
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Item {}: {}", self.item_index, self.message)
    }
}

pub struct ImportValidator {
    config: ExtractConfig,
}

impl ImportValidator {
    pub fn new(config: ExtractConfig) -> Self {
        ImportValidator { config }
    }

    fn close(&self, a: Decimal, b: Decimal) -> bool {
        a.checked_sub(b)
            .map(|d| d.abs() <= *self.config.tolerance)
            .unwrap_or(false)
    }

    /// Returns every issue found. Empty means the items can be imported into
    /// an account held in `currency`.
    pub fn check(&self, items: &[Item], currency: &Currency) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let mut msgs = Vec::new();
            match item {
                Item::Security(_) => (),
                Item::BuySell(e) => {
                    let p = e.portfolio_transaction();
                    let a = e.account_transaction();
                    self.check_portfolio_tx(p, currency, &mut msgs);
                    if a.date_time != p.date_time || a.amount != p.amount || a.note != p.note {
                        msgs.push(
                            "portfolio and account sides differ in date, amount or note"
                                .to_string(),
                        );
                    }
                    if a.tx_type != AccountTxType::from(p.tx_type) {
                        msgs.push(format!(
                            "account side is {} but portfolio side is {}",
                            a.tx_type, p.tx_type
                        ));
                    }
                }
                Item::Transaction(t) => self.check_account_tx(t, currency, &mut msgs),
            }
            issues.extend(msgs.into_iter().map(|message| ValidationIssue {
                item_index: i,
                message,
            }));
        }
        issues
    }

    fn check_units(units: &[Unit], currency: &Currency, msgs: &mut Vec<String>) {
        for u in units {
            if u.amount.currency() != currency {
                msgs.push(format!("{:?} unit is in {}, not {}", u.kind, u.amount.currency(),
                                  currency));
            }
            if is_negative(&u.amount.amount()) {
                msgs.push(format!("{:?} unit {} is negative", u.kind, u.amount));
            }
        }
    }

    fn check_portfolio_tx(
        &self,
        p: &PortfolioTransaction,
        currency: &Currency,
        msgs: &mut Vec<String>,
    ) {
        if p.currency() != currency {
            msgs.push(format!("amount is in {}, account is in {}", p.currency(), currency));
        }
        Self::check_units(&p.units, p.currency(), msgs);
        if is_negative(&p.amount.amount()) {
            msgs.push(format!("amount {} is negative", p.amount));
        }
        if !crate::util::decimal::is_positive(&p.shares) {
            msgs.push(format!("shares {} is not positive", p.shares));
        }

        let gross = p.gross_value();
        if is_negative(&gross.amount()) {
            msgs.push(format!("gross value {gross} is negative"));
        }

        let forex_unit = p.unit(UnitKind::GrossValue);
        if &p.security.currency != p.currency() {
            match forex_unit.and_then(|u| u.forex.as_ref()) {
                Some(fx) => {
                    if fx.amount.currency() != &p.security.currency {
                        msgs.push(format!(
                            "converted value is in {}, security is in {}",
                            fx.amount.currency(),
                            p.security.currency
                        ));
                    }
                }
                None => msgs.push(format!(
                    "security is in {} with no exchange rate to {}",
                    p.security.currency,
                    p.currency()
                )),
            }
        }
        if let Some(u) = forex_unit {
            if !self.close(u.amount.amount(), gross.amount()) {
                msgs.push(format!(
                    "gross value unit {} does not match {} {} fees and taxes",
                    u.amount,
                    p.amount,
                    match p.tx_type {
                        PortfolioTxType::Buy => "minus",
                        PortfolioTxType::Sell => "plus",
                    }
                ));
            }
            if let Some(fx) = &u.forex {
                let converted = fx.amount.amount().checked_mul(*fx.exchange_rate);
                let matches = converted.is_some_and(|c| {
                    self.close(Money::of(p.currency().clone(), c).amount(), u.amount.amount())
                });
                if !matches {
                    msgs.push(format!(
                        "{} at {} is not {}",
                        fx.amount, fx.exchange_rate, u.amount
                    ));
                }
            }
        }
    }

    fn check_account_tx(
        &self,
        t: &AccountTransaction,
        currency: &Currency,
        msgs: &mut Vec<String>,
    ) {
        if t.currency() != currency {
            msgs.push(format!("amount is in {}, account is in {}", t.currency(), currency));
        }
        Self::check_units(&t.units, t.currency(), msgs);
        if is_negative(&t.amount.amount()) {
            msgs.push(format!("amount {} is negative", t.amount));
        }
        if is_negative(&t.shares) {
            msgs.push(format!("shares {} is negative", t.shares));
        }
        if let Some(sec) = &t.security {
            if &sec.currency != t.currency() {
                msgs.push(format!(
                    "security is in {}, transaction is in {}",
                    sec.currency,
                    t.currency()
                ));
            }
        }

        match t.tx_type {
            AccountTxType::Dividends => {
                if t.security.is_none() {
                    msgs.push("dividend without a security".to_string());
                }
                if !crate::util::decimal::is_positive(&t.shares) {
                    msgs.push(format!("dividend on {} shares", t.shares));
                }
                let withheld = t.unit_sum(UnitKind::Tax).amount();
                if withheld > t.gross_value().amount() {
                    msgs.push(format!(
                        "withheld tax {} exceeds the gross dividend {}",
                        withheld,
                        t.gross_value()
                    ));
                }
            }
            AccountTxType::Deposit
            | AccountTxType::Removal
            | AccountTxType::Interest
            | AccountTxType::InterestCharge => {
                if t.security.is_some() {
                    msgs.push(format!("{} should not reference a security", t.tx_type));
                }
            }
            _ => (),
        }
    }
}
