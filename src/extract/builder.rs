//! Turns the fields read from a statement block into model transactions.
//!
//! Builders are checked in full before anything touches the security
//! catalog, so a block either produces all of its items or none.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use time::Date;

use super::{catalog::SecurityLookup, config::ExtractConfig, error::ExtractError};
use crate::{
    model::{
        AccountTransaction, AccountTxType, BuySellEntry, Currency, Forex, Item, Money,
        PortfolioTransaction, PortfolioTxType, SecurityProto, Unit, UnitKind,
    },
    util::{
        date::{at_midnight, format_day_month_name_year},
        decimal::{is_negative, round_cents, PosDecimal},
    },
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OptionRight {
    Put,
    Call,
}

impl FromStr for OptionRight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PUT" => Ok(OptionRight::Put),
            "CALL" => Ok(OptionRight::Call),
            _ => Err(format!("Invalid option right \"{s}\"")),
        }
    }
}

impl Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionRight::Put => write!(f, "Put"),
            OptionRight::Call => write!(f, "Call"),
        }
    }
}

/// The position effect printed under option trades (eg. "Buy To Close").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OptionEffect {
    BuyToOpen,
    BuyToClose,
    SellToOpen,
    SellToClose,
}

impl OptionEffect {
    pub fn tx_type(&self) -> PortfolioTxType {
        match self {
            OptionEffect::BuyToOpen | OptionEffect::BuyToClose => PortfolioTxType::Buy,
            OptionEffect::SellToOpen | OptionEffect::SellToClose => PortfolioTxType::Sell,
        }
    }
}

impl FromStr for OptionEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "buy to open" => Ok(OptionEffect::BuyToOpen),
            "buy to close" => Ok(OptionEffect::BuyToClose),
            "sell to open" => Ok(OptionEffect::SellToOpen),
            "sell to close" => Ok(OptionEffect::SellToClose),
            _ => Err(format!("Invalid option effect \"{s}\"")),
        }
    }
}

impl Display for OptionEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OptionEffect::BuyToOpen => "Buy To Open",
            OptionEffect::BuyToClose => "Buy To Close",
            OptionEffect::SellToOpen => "Sell To Open",
            OptionEffect::SellToClose => "Sell To Close",
        };
        write!(f, "{s}")
    }
}

/// An option position closed without a trade.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OptionEvent {
    Expired,
    Assigned,
    Exercised,
}

impl Display for OptionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OptionEvent::Expired => "Expired",
            OptionEvent::Assigned => "Assigned",
            OptionEvent::Exercised => "Exercised",
        };
        write!(f, "{s}")
    }
}

/// eg. "TQQQ 16 Jun 2023 32.000 Put"
pub fn option_security_name(
    root: &str,
    expiry: &Date,
    strike: &Decimal,
    right: OptionRight,
) -> String {
    format!(
        "{} {} {:.3} {}",
        root,
        format_day_month_name_year(expiry),
        strike,
        right
    )
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BuySellBuilder {
    tx_type: PortfolioTxType,
    date: Date,
    security: SecurityProto,
    currency: Currency,
    shares: Decimal,
    price: Decimal,
    principal: Option<Decimal>,
    fees: Decimal,
    taxes: Decimal,
    net_amount: Option<Decimal>,
    note: Option<String>,
    exchange_rate: Option<PosDecimal>,
    line: usize,
}

/// Half a unit of the last printed decimal of `price`, for each share. A
/// rounded price times the share count is only known to within this.
/// Prices with fewer decimals are treated as printed to the cent.
fn price_rounding_slack(shares: Decimal, price: Decimal) -> Option<Decimal> {
    let scale = price.scale().max(2);
    let half_unit = Decimal::try_new(5, scale + 1).unwrap_or(Decimal::ZERO);
    half_unit.checked_mul(shares)
}

impl BuySellBuilder {
    /// `currency` is the currency the account is debited/credited in.
    pub fn new(
        tx_type: PortfolioTxType,
        date: Date,
        security: SecurityProto,
        currency: Currency,
        line: usize,
    ) -> Self {
        BuySellBuilder {
            tx_type,
            date,
            security,
            currency,
            shares: Decimal::ZERO,
            price: Decimal::ZERO,
            principal: None,
            fees: Decimal::ZERO,
            taxes: Decimal::ZERO,
            net_amount: None,
            note: None,
            exchange_rate: None,
            line,
        }
    }

    /// A zero-value closing of an option position. The direction comes from
    /// the position effect, and the note records what happened.
    pub fn option_closing(
        event: OptionEvent,
        effect: OptionEffect,
        date: Date,
        security: SecurityProto,
        currency: Currency,
        shares: Decimal,
        line: usize,
    ) -> Self {
        BuySellBuilder::new(effect.tx_type(), date, security, currency, line)
            .shares(shares)
            .net_amount(Decimal::ZERO)
            .note(&format!("{event}: {effect}"))
    }

    pub fn shares(mut self, shares: Decimal) -> Self {
        self.shares = shares;
        self
    }

    /// Gross price per share, in the security's currency.
    pub fn price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    /// The gross value as printed (eg. a PRINCIPAL column), in the
    /// security's currency. Takes precedence over shares times price.
    pub fn principal(mut self, principal: Decimal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Accumulates, so commission and regulatory fees can be added separately.
    pub fn fees(mut self, fees: Decimal) -> Self {
        self.fees += fees;
        self
    }

    pub fn taxes(mut self, taxes: Decimal) -> Self {
        self.taxes += taxes;
        self
    }

    /// The total debited or credited, as printed on the statement.
    pub fn net_amount(mut self, amount: Decimal) -> Self {
        self.net_amount = Some(amount);
        self
    }

    pub fn note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// Rate from the security's currency into the transaction currency.
    pub fn exchange_rate(mut self, rate: PosDecimal) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    fn check(self, config: &ExtractConfig) -> Result<Checked, ExtractError> {
        let line = self.line;
        let bad = |reason: String| ExtractError::inconsistent(line, reason);

        if !crate::util::decimal::is_positive(&self.shares) {
            return Err(bad(format!("share quantity {} is not positive", self.shares)));
        }
        for (what, v) in [("price", self.price), ("fees", self.fees), ("taxes", self.taxes)] {
            if is_negative(&v) {
                return Err(bad(format!("{what} {v} is negative")));
            }
        }

        let too_large = |what: &str| bad(format!("{what} is too large to compute"));
        let tolerance = *config.tolerance;

        let price_gross = self
            .shares
            .checked_mul(self.price)
            .ok_or_else(|| too_large("shares times price"))?;
        let slack = price_rounding_slack(self.shares, self.price)
            .and_then(|s| s.checked_add(tolerance))
            .ok_or_else(|| too_large("share quantity"))?;
        let (sec_gross, mut net_tolerance) = match self.principal {
            Some(principal) => {
                if is_negative(&principal) {
                    return Err(bad(format!("principal {principal} is negative")));
                }
                if (principal - price_gross).abs() > slack {
                    return Err(bad(format!(
                        "principal {principal} does not match {} shares at {} ({})",
                        self.shares,
                        self.price,
                        price_gross.round_dp(4)
                    )));
                }
                (principal, tolerance)
            }
            None => (price_gross, slack),
        };

        let cur = || self.currency.clone();
        let (gross, forex) = if self.security.currency == self.currency {
            (Money::of(cur(), sec_gross), None)
        } else {
            let rate = self.exchange_rate.ok_or_else(|| {
                bad(format!(
                    "security is traded in {} but the account is in {}, and no \
                     exchange rate is given",
                    self.security.currency, self.currency
                ))
            })?;
            let forex = Forex {
                amount: Money::of(self.security.currency.clone(), sec_gross),
                exchange_rate: rate,
            };
            if self.principal.is_none() {
                net_tolerance = net_tolerance
                    .checked_mul(*rate)
                    .ok_or_else(|| too_large("share quantity"))?;
            }
            let converted = sec_gross
                .checked_mul(*rate)
                .ok_or_else(|| too_large("converted gross value"))?;
            (Money::of(cur(), converted), Some(forex))
        };

        let fees = Money::of(cur(), self.fees);
        let taxes = Money::of(cur(), self.taxes);
        let costs = fees
            .amount()
            .checked_add(taxes.amount())
            .ok_or_else(|| too_large("fees and taxes"))?;
        let computed = match self.tx_type {
            PortfolioTxType::Buy => gross.amount().checked_add(costs),
            PortfolioTxType::Sell => gross.amount().checked_sub(costs),
        }
        .ok_or_else(|| too_large("amount"))?;

        let amount = match self.net_amount {
            Some(net) => {
                let net = round_cents(net);
                let diff = net.checked_sub(computed).ok_or_else(|| too_large("amount"))?;
                if diff.abs() > net_tolerance {
                    return Err(bad(format!(
                        "stated amount {net} does not match a gross value of {} with \
                         {costs} fees and taxes ({computed})",
                        gross.amount()
                    )));
                }
                net
            }
            None => computed,
        };
        if is_negative(&amount) {
            return Err(bad(format!("amount {amount} is negative")));
        }

        let mut units = Vec::new();
        if let Some(forex) = forex {
            // Recompute from the amount so the units add up exactly.
            let gross_value = match self.tx_type {
                PortfolioTxType::Buy => amount.checked_sub(costs),
                PortfolioTxType::Sell => amount.checked_add(costs),
            }
            .ok_or_else(|| too_large("gross value"))?;
            units.push(Unit::with_forex(
                UnitKind::GrossValue,
                Money::of(cur(), gross_value),
                forex,
            ));
        }
        if !fees.is_zero() {
            units.push(Unit::new(UnitKind::Fee, fees));
        }
        if !taxes.is_zero() {
            units.push(Unit::new(UnitKind::Tax, taxes));
        }

        Ok(Checked {
            security: Some(self.security),
            tx: CheckedTx::BuySell {
                tx_type: self.tx_type,
                date: self.date,
                shares: self.shares,
                amount: Money::of(cur(), amount),
                units,
                note: self.note,
            },
        })
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AccountTxBuilder {
    tx_type: AccountTxType,
    date: Date,
    currency: Currency,
    amount: Decimal,
    taxes: Decimal,
    fees: Decimal,
    security: Option<SecurityProto>,
    shares: Decimal,
    note: Option<String>,
    line: usize,
}

impl AccountTxBuilder {
    fn new(
        tx_type: AccountTxType,
        date: Date,
        currency: Currency,
        amount: Decimal,
        line: usize,
    ) -> Self {
        AccountTxBuilder {
            tx_type,
            date,
            currency,
            amount,
            taxes: Decimal::ZERO,
            fees: Decimal::ZERO,
            security: None,
            shares: Decimal::ZERO,
            note: None,
            line,
        }
    }

    fn by_sign(
        credit: AccountTxType,
        debit: AccountTxType,
        date: Date,
        currency: Currency,
        signed_amount: Decimal,
        line: usize,
    ) -> Self {
        let tx_type = if is_negative(&signed_amount) { debit } else { credit };
        AccountTxBuilder::new(tx_type, date, currency, signed_amount.abs(), line)
    }

    /// `net` is what was paid out after `withheld_tax`.
    pub fn dividend(
        date: Date,
        security: SecurityProto,
        currency: Currency,
        shares: Decimal,
        net: Decimal,
        withheld_tax: Decimal,
        line: usize,
    ) -> Self {
        let mut b = AccountTxBuilder::new(AccountTxType::Dividends, date, currency, net, line);
        b.security = Some(security);
        b.shares = shares;
        b.taxes = withheld_tax;
        b
    }

    /// Positive is interest earned, negative is interest charged.
    pub fn interest(date: Date, currency: Currency, signed_amount: Decimal, line: usize) -> Self {
        Self::by_sign(
            AccountTxType::Interest,
            AccountTxType::InterestCharge,
            date,
            currency,
            signed_amount,
            line,
        )
    }

    /// Journals, ACH and wires. Positive is a deposit, negative a removal.
    pub fn cash_transfer(
        date: Date,
        currency: Currency,
        signed_amount: Decimal,
        line: usize,
    ) -> Self {
        Self::by_sign(
            AccountTxType::Deposit,
            AccountTxType::Removal,
            date,
            currency,
            signed_amount,
            line,
        )
    }

    /// Negative is a fee charged, positive a refunded fee.
    pub fn fee(date: Date, currency: Currency, signed_amount: Decimal, line: usize) -> Self {
        Self::by_sign(
            AccountTxType::FeesRefund,
            AccountTxType::Fees,
            date,
            currency,
            signed_amount,
            line,
        )
    }

    pub fn note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    fn check(self, _config: &ExtractConfig) -> Result<Checked, ExtractError> {
        let line = self.line;
        let bad = |reason: String| ExtractError::inconsistent(line, reason);

        if is_negative(&self.amount) {
            return Err(bad(format!("{} amount {} is negative", self.tx_type, self.amount)));
        }
        if is_negative(&self.taxes) || is_negative(&self.fees) {
            return Err(bad(format!("{} taxes or fees are negative", self.tx_type)));
        }
        let amount = Money::of(self.currency.clone(), self.amount);
        if amount.is_zero() {
            return Err(bad(format!("{} amount is zero", self.tx_type)));
        }
        if let Some(sec) = &self.security {
            if sec.currency != self.currency {
                return Err(bad(format!(
                    "security is traded in {} but the account is in {}",
                    sec.currency, self.currency
                )));
            }
        }
        if self.tx_type == AccountTxType::Dividends {
            if self.security.is_none() {
                return Err(bad("dividend without a security".to_string()));
            }
            if !crate::util::decimal::is_positive(&self.shares) {
                return Err(bad(format!("dividend on {} shares", self.shares)));
            }
        }

        let mut units = Vec::new();
        let taxes = Money::of(self.currency.clone(), self.taxes);
        if !taxes.is_zero() {
            units.push(Unit::new(UnitKind::Tax, taxes));
        }
        let fees = Money::of(self.currency.clone(), self.fees);
        if !fees.is_zero() {
            units.push(Unit::new(UnitKind::Fee, fees));
        }

        Ok(Checked {
            security: self.security,
            tx: CheckedTx::Account {
                tx_type: self.tx_type,
                date: self.date,
                amount,
                shares: self.shares,
                units,
                note: self.note,
            },
        })
    }
}

/// What a recipe produces for one transaction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Draft {
    BuySell(BuySellBuilder),
    Account(AccountTxBuilder),
}

impl From<BuySellBuilder> for Draft {
    fn from(b: BuySellBuilder) -> Self {
        Draft::BuySell(b)
    }
}

impl From<AccountTxBuilder> for Draft {
    fn from(b: AccountTxBuilder) -> Self {
        Draft::Account(b)
    }
}

impl Draft {
    /// Applies all consistency rules. Nothing is created yet.
    pub fn check(self, config: &ExtractConfig) -> Result<Checked, ExtractError> {
        match self {
            Draft::BuySell(b) => b.check(config),
            Draft::Account(b) => b.check(config),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum CheckedTx {
    BuySell {
        tx_type: PortfolioTxType,
        date: Date,
        shares: Decimal,
        amount: Money,
        units: Vec<Unit>,
        note: Option<String>,
    },
    Account {
        tx_type: AccountTxType,
        date: Date,
        amount: Money,
        shares: Decimal,
        units: Vec<Unit>,
        note: Option<String>,
    },
}

/// A transaction which passed all checks, waiting on its security.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Checked {
    security: Option<SecurityProto>,
    tx: CheckedTx,
}

impl Checked {
    /// Resolves the security and appends the resulting items. A security
    /// the catalog had not seen is emitted just before the transaction.
    pub fn emit(self, catalog: &mut dyn SecurityLookup, out: &mut Vec<Item>) {
        let security = self.security.map(|proto| {
            let (sec, created) = catalog.lookup_or_create(proto);
            if created {
                out.push(Item::Security(sec.clone()));
            }
            sec
        });

        match (self.tx, security) {
            (
                CheckedTx::BuySell { tx_type, date, shares, amount, units, note },
                Some(security),
            ) => {
                out.push(Item::BuySell(BuySellEntry::from_portfolio_transaction(
                    PortfolioTransaction {
                        tx_type,
                        date_time: at_midnight(date),
                        security,
                        shares,
                        amount,
                        units,
                        note,
                    },
                )));
            }
            (CheckedTx::BuySell { .. }, None) => {
                // BuySellBuilder always carries a security.
                tracing::error!("Checked::emit: buy/sell without a security");
            }
            (CheckedTx::Account { tx_type, date, amount, shares, units, note }, security) => {
                out.push(Item::Transaction(AccountTransaction {
                    tx_type,
                    date_time: at_midnight(date),
                    amount,
                    security,
                    shares,
                    units,
                    note,
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::{
        option_security_name, AccountTxBuilder, BuySellBuilder, Draft, OptionEffect,
        OptionEvent, OptionRight,
    };
    use crate::{
        extract::{catalog::SecurityCatalog, config::ExtractConfig, error::ExtractError},
        model::{
            AccountTxType, Currency, Item, Money, PortfolioTxType, SecurityProto, UnitKind,
        },
        pdec,
        util::{date::pub_testlib::date, decimal::round_cents},
    };

    fn usd(d: rust_decimal::Decimal) -> Money {
        Money::of(Currency::usd(), d)
    }

    fn nvda() -> SecurityProto {
        SecurityProto::new("NVIDIA CORP", Currency::usd())
            .with_wkn("67066G104")
            .with_ticker("NVDA")
    }

    fn emit(draft: Draft) -> Result<Vec<Item>, ExtractError> {
        let checked = draft.check(&ExtractConfig::default())?;
        let mut catalog = SecurityCatalog::new();
        let mut items = Vec::new();
        checked.emit(&mut catalog, &mut items);
        Ok(items)
    }

    #[test]
    fn test_sell_with_net_amount() {
        let items = emit(
            BuySellBuilder::new(PortfolioTxType::Sell, date("2023-06-22"), nvda(),
                                Currency::usd(), 5)
                .shares(dec!(20))
                .price(dec!(422.55))
                .fees(dec!(0.00))
                .fees(dec!(0.09))
                .net_amount(dec!(8450.91))
                .into(),
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind_str(), "Security");
        let p = items[1].as_buy_sell().unwrap().portfolio_transaction();
        assert_eq!(p.tx_type, PortfolioTxType::Sell);
        assert_eq!(p.amount, usd(dec!(8450.91)));
        assert_eq!(p.unit_sum(UnitKind::Fee), usd(dec!(0.09)));
        assert_eq!(p.unit_sum(UnitKind::Tax), usd(dec!(0)));
        assert_eq!(round_cents(p.gross_price_per_share()), dec!(422.55));
        assert_eq!(p.note, None);
    }

    #[test]
    fn test_buy_without_net_amount() {
        let items = emit(
            BuySellBuilder::new(PortfolioTxType::Buy, date("2023-04-25"),
                                SecurityProto::new("SPDR SERIES TRUST", Currency::usd()),
                                Currency::usd(), 1)
                .shares(dec!(14))
                .price(dec!(91.7299))
                .fees(dec!(0.0114))
                .into(),
        )
        .unwrap();
        let p = items[1].as_buy_sell().unwrap().portfolio_transaction();
        // 1284.2186 -> 1284.22, plus 0.01 in fees
        assert_eq!(p.amount, usd(dec!(1284.23)));
        assert_eq!(p.unit_sum(UnitKind::Fee), usd(dec!(0.01)));
    }

    #[test]
    fn test_net_amount_mismatch() {
        let err = BuySellBuilder::new(PortfolioTxType::Buy, date("2023-03-24"), nvda(),
                                      Currency::usd(), 42)
            .shares(dec!(8))
            .price(dec!(277.26))
            .net_amount(dec!(2218.20))
            .check(&ExtractConfig::default())
            .unwrap_err();
        match err {
            ExtractError::Inconsistent { line, .. } => assert_eq!(line, 42),
            e => panic!("unexpected {e:?}"),
        }

        // Within tolerance
        let ok = BuySellBuilder::new(PortfolioTxType::Buy, date("2023-03-24"), nvda(),
                                     Currency::usd(), 42)
            .shares(dec!(8))
            .price(dec!(277.26))
            .net_amount(dec!(2218.09))
            .check(&ExtractConfig::default());
        assert!(ok.is_ok());
    }

    #[test]
    fn test_rounded_price() {
        // 1000 * 12.3457 is 12345.70, but the price was rounded to 4 decimals.
        let items = emit(
            BuySellBuilder::new(PortfolioTxType::Buy, date("2023-06-22"), nvda(),
                                Currency::usd(), 7)
                .shares(dec!(1000))
                .price(dec!(12.3457))
                .net_amount(dec!(12345.67))
                .into(),
        )
        .unwrap();
        let p = items[1].as_buy_sell().unwrap().portfolio_transaction();
        assert_eq!(p.amount, usd(dec!(12345.67)));
        assert_eq!(p.gross_price_per_share(), dec!(12.34567));

        // Still beyond what the rounding can explain
        let err = BuySellBuilder::new(PortfolioTxType::Buy, date("2023-06-22"), nvda(),
                                      Currency::usd(), 7)
            .shares(dec!(1000))
            .price(dec!(12.3457))
            .net_amount(dec!(12345.60))
            .check(&ExtractConfig::default());
        assert!(matches!(err, Err(ExtractError::Inconsistent { line: 7, .. })));
    }

    #[test]
    fn test_principal() {
        let sell = || BuySellBuilder::new(PortfolioTxType::Sell, date("2023-02-20"), nvda(),
                                          Currency::usd(), 3)
            .shares(dec!(500))
            .price(dec!(120.011));

        let items = emit(
            sell().principal(dec!(60005.62)).fees(dec!(0.12)).net_amount(dec!(60005.50)).into(),
        )
        .unwrap();
        let p = items[1].as_buy_sell().unwrap().portfolio_transaction();
        assert_eq!(p.amount, usd(dec!(60005.50)));
        assert_eq!(p.gross_value(), usd(dec!(60005.62)));

        // The net amount must follow from the principal to the cent.
        let cfg = ExtractConfig::default();
        assert!(sell().principal(dec!(60005.62)).net_amount(dec!(60005.50)).check(&cfg).is_err());
        // And the principal from the price, within its rounding.
        match sell().principal(dec!(60100.00)).check(&cfg).unwrap_err() {
            ExtractError::Inconsistent { reason, .. } => {
                assert!(reason.starts_with("principal 60100.00 does not match 500 shares"),
                        "{reason}");
            }
            e => panic!("unexpected {e:?}"),
        }
        assert!(sell().principal(dec!(-1)).check(&cfg).is_err());
    }

    #[test]
    fn test_values_too_large() {
        let err = BuySellBuilder::new(PortfolioTxType::Buy, date("2023-06-22"), nvda(),
                                      Currency::usd(), 12)
            .shares(dec!(100000000000000000))
            .price(dec!(100000000000000.00))
            .net_amount(dec!(1.00))
            .check(&ExtractConfig::default())
            .unwrap_err();
        assert_eq!(err, ExtractError::inconsistent(12, "shares times price is too large to compute"));

        let sap = SecurityProto::new("SAP SE", Currency::eur());
        let err = BuySellBuilder::new(PortfolioTxType::Buy, date("2023-06-22"), sap,
                                      Currency::usd(), 13)
            .shares(dec!(1))
            .price(dec!(70000000000000000000000000000))
            .exchange_rate(pdec!(2))
            .check(&ExtractConfig::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::Inconsistent { line: 13, .. }));
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = || BuySellBuilder::new(PortfolioTxType::Sell, date("2023-03-24"), nvda(),
                                          Currency::usd(), 1);
        let cfg = ExtractConfig::default();
        assert!(base().price(dec!(1)).check(&cfg).is_err()); // no shares
        assert!(base().shares(dec!(1)).price(dec!(-1)).check(&cfg).is_err());
        assert!(base().shares(dec!(1)).price(dec!(1)).fees(dec!(-1)).check(&cfg).is_err());
        // Fees larger than the proceeds
        assert!(base().shares(dec!(1)).price(dec!(1)).fees(dec!(5)).check(&cfg).is_err());
    }

    #[test]
    fn test_forex() {
        let sap = SecurityProto::new("SAP SE", Currency::eur()).with_isin("DE0007164600");
        let cfg = ExtractConfig::default();

        let no_rate = BuySellBuilder::new(PortfolioTxType::Buy, date("2023-05-02"),
                                          sap.clone(), Currency::usd(), 3)
            .shares(dec!(10))
            .price(dec!(120))
            .check(&cfg);
        assert!(no_rate.is_err());

        let items = emit(
            BuySellBuilder::new(PortfolioTxType::Buy, date("2023-05-02"), sap,
                                Currency::usd(), 3)
                .shares(dec!(10))
                .price(dec!(120))
                .fees(dec!(1.50))
                .exchange_rate(pdec!(1.1))
                .into(),
        )
        .unwrap();
        let p = items[1].as_buy_sell().unwrap().portfolio_transaction();
        assert_eq!(p.amount, usd(dec!(1321.50)));
        let gross = p.unit(UnitKind::GrossValue).unwrap();
        assert_eq!(gross.amount, usd(dec!(1320)));
        let forex = gross.forex.as_ref().unwrap();
        assert_eq!(forex.amount, Money::of(Currency::eur(), dec!(1200)));
        assert_eq!(forex.exchange_rate, pdec!(1.1));
    }

    #[test]
    fn test_option_closing() {
        let expiry = date("2023-06-16");
        let name = option_security_name("UPRO", &expiry, &dec!(48), OptionRight::Call);
        assert_eq!(name, "UPRO 16 Jun 2023 48.000 Call");

        let items = emit(
            BuySellBuilder::option_closing(
                OptionEvent::Expired,
                "Buy To Close".parse::<OptionEffect>().unwrap(),
                expiry,
                SecurityProto::new(&name, Currency::usd()).with_wkn("9LPDQC6"),
                Currency::usd(),
                dec!(200),
                9,
            )
            .into(),
        )
        .unwrap();
        let p = items[1].as_buy_sell().unwrap().portfolio_transaction();
        assert_eq!(p.tx_type, PortfolioTxType::Buy);
        assert_eq!(p.amount, usd(dec!(0)));
        assert_eq!(p.shares, dec!(200));
        assert_eq!(p.gross_price_per_share(), dec!(0));
        assert_eq!(p.unit_sum(UnitKind::Fee), usd(dec!(0)));
        assert_eq!(p.note.as_deref(), Some("Expired: Buy To Close"));
        assert_eq!(p.security.name, "UPRO 16 Jun 2023 48.000 Call");

        assert_eq!("sell  to CLOSE".parse::<OptionEffect>().unwrap(),
                   OptionEffect::SellToClose);
        assert!("hold".parse::<OptionEffect>().is_err());
        assert_eq!("put".parse::<OptionRight>().unwrap(), OptionRight::Put);
    }

    #[test]
    fn test_dividend() {
        let proshares = SecurityProto::new("PROSHARES TRUST", Currency::usd())
            .with_wkn("74347X864");
        let items = emit(
            AccountTxBuilder::dividend(date("2023-06-28"), proshares, Currency::usd(),
                                       dec!(200), dec!(20.37), dec!(8.73), 3)
                .into(),
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        let t = items[1].as_transaction().unwrap();
        assert_eq!(t.tx_type, AccountTxType::Dividends);
        assert_eq!(t.amount, usd(dec!(20.37)));
        assert_eq!(t.unit_sum(UnitKind::Tax), usd(dec!(8.73)));
        assert_eq!(t.gross_value(), usd(dec!(29.10)));
        assert_eq!(t.shares, dec!(200));
    }

    #[test]
    fn test_signed_account_transactions() {
        let d = date("2023-06-13");
        let cases = vec![
            (AccountTxBuilder::interest(d, Currency::usd(), dec!(0.05), 1),
             AccountTxType::Interest),
            (AccountTxBuilder::interest(d, Currency::usd(), dec!(-1.20), 1),
             AccountTxType::InterestCharge),
            (AccountTxBuilder::cash_transfer(d, Currency::usd(), dec!(21000), 1),
             AccountTxType::Deposit),
            (AccountTxBuilder::cash_transfer(d, Currency::usd(), dec!(-500), 1),
             AccountTxType::Removal),
            (AccountTxBuilder::fee(d, Currency::usd(), dec!(-25), 1),
             AccountTxType::Fees),
            (AccountTxBuilder::fee(d, Currency::usd(), dec!(25), 1),
             AccountTxType::FeesRefund),
        ];
        for (builder, exp_type) in cases {
            let items = emit(builder.note("x").into()).unwrap();
            assert_eq!(items.len(), 1);
            let t = items[0].as_transaction().unwrap();
            assert_eq!(t.tx_type, exp_type);
            assert!(!t.amount.amount().is_sign_negative());
            assert_eq!(t.note.as_deref(), Some("x"));
        }

        assert!(AccountTxBuilder::cash_transfer(d, Currency::usd(), dec!(0), 1)
            .check(&ExtractConfig::default())
            .is_err());
    }

    #[test]
    fn test_dividend_requires_shares() {
        let res = AccountTxBuilder::dividend(
            date("2023-06-28"),
            SecurityProto::new("X", Currency::usd()),
            Currency::usd(),
            dec!(0),
            dec!(1),
            dec!(0),
            1,
        )
        .check(&ExtractConfig::default());
        assert!(res.is_err());
    }
}
