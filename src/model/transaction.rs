use std::{fmt::Display, sync::Arc};

use rust_decimal::Decimal;
use time::PrimitiveDateTime;

use super::{Currency, Money, Security};
use crate::util::decimal::PosDecimal;

#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize)]
pub enum UnitKind {
    GrossValue,
    Fee,
    Tax,
}

/// The original-currency side of a converted value.
/// `amount * exchange_rate` is the value in the transaction currency.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize)]
pub struct Forex {
    pub amount: Money,
    pub exchange_rate: PosDecimal,
}

/// A component of a transaction amount (fee, tax, or converted gross value).
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize)]
pub struct Unit {
    pub kind: UnitKind,
    pub amount: Money,
    pub forex: Option<Forex>,
}

impl Unit {
    pub fn new(kind: UnitKind, amount: Money) -> Self {
        Unit { kind, amount, forex: None }
    }

    pub fn with_forex(kind: UnitKind, amount: Money, forex: Forex) -> Self {
        Unit { kind, amount, forex: Some(forex) }
    }
}

fn unit_sum(units: &[Unit], kind: UnitKind, currency: &Currency) -> Money {
    let total = units
        .iter()
        .filter(|u| u.kind == kind)
        .fold(Decimal::ZERO, |acc, u| acc + u.amount.amount());
    Money::of(currency.clone(), total)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize)]
pub enum PortfolioTxType {
    Buy,
    Sell,
}

impl PortfolioTxType {
    pub fn pretty_str(&self) -> &'static str {
        match self {
            PortfolioTxType::Buy => "Buy",
            PortfolioTxType::Sell => "Sell",
        }
    }
}

impl Display for PortfolioTxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty_str())
    }
}

/// The securities-side of a buy or sell.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize)]
pub struct PortfolioTransaction {
    pub tx_type: PortfolioTxType,
    pub date_time: PrimitiveDateTime,
    pub security: Arc<Security>,
    pub shares: Decimal,
    pub amount: Money,
    pub units: Vec<Unit>,
    pub note: Option<String>,
}

impl PortfolioTransaction {
    pub fn currency(&self) -> &Currency {
        self.amount.currency()
    }

    pub fn unit_sum(&self, kind: UnitKind) -> Money {
        unit_sum(&self.units, kind, self.currency())
    }

    pub fn unit(&self, kind: UnitKind) -> Option<&Unit> {
        self.units.iter().find(|u| u.kind == kind)
    }

    /// The value of the shares, before fees and taxes.
    pub fn gross_value(&self) -> Money {
        let costs = self.unit_sum(UnitKind::Fee).amount()
            + self.unit_sum(UnitKind::Tax).amount();
        let gross = match self.tx_type {
            PortfolioTxType::Buy => self.amount.amount() - costs,
            PortfolioTxType::Sell => self.amount.amount() + costs,
        };
        Money::of(self.currency().clone(), gross)
    }

    /// Unrounded. Zero when there are no shares, or the quotient does not fit.
    pub fn gross_price_per_share(&self) -> Decimal {
        self.gross_value()
            .amount()
            .checked_div(self.shares)
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize)]
pub enum AccountTxType {
    Deposit,
    Removal,
    Interest,
    InterestCharge,
    Dividends,
    Fees,
    FeesRefund,
    Taxes,
    TaxRefund,
    Buy,
    Sell,
}

impl AccountTxType {
    pub fn pretty_str(&self) -> &'static str {
        match self {
            AccountTxType::Deposit => "Deposit",
            AccountTxType::Removal => "Removal",
            AccountTxType::Interest => "Interest",
            AccountTxType::InterestCharge => "Interest Charge",
            AccountTxType::Dividends => "Dividends",
            AccountTxType::Fees => "Fees",
            AccountTxType::FeesRefund => "Fees Refund",
            AccountTxType::Taxes => "Taxes",
            AccountTxType::TaxRefund => "Tax Refund",
            AccountTxType::Buy => "Buy",
            AccountTxType::Sell => "Sell",
        }
    }
}

impl Display for AccountTxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty_str())
    }
}

impl From<PortfolioTxType> for AccountTxType {
    fn from(t: PortfolioTxType) -> Self {
        match t {
            PortfolioTxType::Buy => AccountTxType::Buy,
            PortfolioTxType::Sell => AccountTxType::Sell,
        }
    }
}

/// A cash movement on the account.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize)]
pub struct AccountTransaction {
    pub tx_type: AccountTxType,
    pub date_time: PrimitiveDateTime,
    pub amount: Money,
    pub security: Option<Arc<Security>>,
    pub shares: Decimal,
    pub units: Vec<Unit>,
    pub note: Option<String>,
}

impl AccountTransaction {
    pub fn currency(&self) -> &Currency {
        self.amount.currency()
    }

    pub fn unit_sum(&self, kind: UnitKind) -> Money {
        unit_sum(&self.units, kind, self.currency())
    }

    /// For dividends and interest, the amount before taxes and fees were
    /// withheld. Otherwise just the amount.
    pub fn gross_value(&self) -> Money {
        match self.tx_type {
            AccountTxType::Dividends
            | AccountTxType::Interest
            | AccountTxType::InterestCharge => Money::of(
                self.currency().clone(),
                self.amount.amount()
                    + self.unit_sum(UnitKind::Tax).amount()
                    + self.unit_sum(UnitKind::Fee).amount(),
            ),
            _ => self.amount.clone(),
        }
    }
}

/// A buy or sell, as seen from both the portfolio and the cash account.
/// Both sides always share date, amount, note and security.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize)]
pub struct BuySellEntry {
    portfolio: PortfolioTransaction,
    account: AccountTransaction,
}

impl BuySellEntry {
    pub(crate) fn from_portfolio_transaction(portfolio: PortfolioTransaction) -> Self {
        let account = AccountTransaction {
            tx_type: portfolio.tx_type.into(),
            date_time: portfolio.date_time,
            amount: portfolio.amount.clone(),
            security: Some(portfolio.security.clone()),
            shares: portfolio.shares,
            units: Vec::new(),
            note: portfolio.note.clone(),
        };
        BuySellEntry { portfolio, account }
    }

    pub fn portfolio_transaction(&self) -> &PortfolioTransaction {
        &self.portfolio
    }

    pub fn account_transaction(&self) -> &AccountTransaction {
        &self.account
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use super::{
        AccountTransaction, AccountTxType, BuySellEntry, PortfolioTransaction,
        PortfolioTxType, Unit, UnitKind,
    };
    use crate::{
        model::{Currency, Money, Security, SecurityProto},
        util::date::pub_testlib::datetime,
    };

    fn usd(d: rust_decimal::Decimal) -> Money {
        Money::of(Currency::usd(), d)
    }

    fn nvda() -> Arc<Security> {
        Arc::new(
            SecurityProto::new("NVIDIA CORP", Currency::usd())
                .with_wkn("67066G104")
                .into(),
        )
    }

    fn ptx(tx_type: PortfolioTxType, amount: rust_decimal::Decimal) -> PortfolioTransaction {
        PortfolioTransaction {
            tx_type,
            date_time: datetime("2023-06-22"),
            security: nvda(),
            shares: dec!(20),
            amount: usd(amount),
            units: vec![
                Unit::new(UnitKind::Fee, usd(dec!(0.09))),
                Unit::new(UnitKind::Tax, usd(dec!(0.01))),
            ],
            note: None,
        }
    }

    #[test]
    fn test_portfolio_gross_value() {
        let sell = ptx(PortfolioTxType::Sell, dec!(8450.90));
        assert_eq!(sell.gross_value(), usd(dec!(8451.00)));
        assert_eq!(sell.gross_price_per_share(), dec!(422.55));
        assert_eq!(sell.unit_sum(UnitKind::Fee), usd(dec!(0.09)));
        assert_eq!(sell.unit_sum(UnitKind::GrossValue), usd(dec!(0)));

        let buy = ptx(PortfolioTxType::Buy, dec!(8451.10));
        assert_eq!(buy.gross_value(), usd(dec!(8451.00)));

        let mut no_shares = buy.clone();
        no_shares.shares = dec!(0);
        assert_eq!(no_shares.gross_price_per_share(), dec!(0));
    }

    #[test]
    fn test_account_gross_value() {
        let div = AccountTransaction {
            tx_type: AccountTxType::Dividends,
            date_time: datetime("2023-06-28"),
            amount: usd(dec!(20.37)),
            security: Some(nvda()),
            shares: dec!(200),
            units: vec![Unit::new(UnitKind::Tax, usd(dec!(8.73)))],
            note: None,
        };
        assert_eq!(div.gross_value(), usd(dec!(29.10)));

        let mut deposit = div.clone();
        deposit.tx_type = AccountTxType::Deposit;
        assert_eq!(deposit.gross_value(), usd(dec!(20.37)));
    }

    #[test]
    fn test_buy_sell_entry_sides_agree() {
        let entry = BuySellEntry::from_portfolio_transaction(
            ptx(PortfolioTxType::Buy, dec!(100)));
        let p = entry.portfolio_transaction();
        let a = entry.account_transaction();
        assert_eq!(a.tx_type, AccountTxType::Buy);
        assert_eq!(a.amount, p.amount);
        assert_eq!(a.date_time, p.date_time);
        assert_eq!(a.security.as_ref(), Some(&p.security));
        assert_eq!(a.note, p.note);
        assert!(a.units.is_empty());
    }
}
