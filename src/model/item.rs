use std::sync::Arc;

use time::PrimitiveDateTime;

use super::{AccountTransaction, BuySellEntry, Money, Security};

/// One unit of extraction output, consumed by an importer.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize)]
#[serde(tag = "item")]
pub enum Item {
    Security(Arc<Security>),
    BuySell(BuySellEntry),
    Transaction(AccountTransaction),
}

impl Item {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Item::Security(_) => "Security",
            Item::BuySell(_) => "BuySell",
            Item::Transaction(_) => "Transaction",
        }
    }

    pub fn is_transaction(&self) -> bool {
        !matches!(self, Item::Security(_))
    }

    pub fn date_time(&self) -> Option<PrimitiveDateTime> {
        match self {
            Item::Security(_) => None,
            Item::BuySell(e) => Some(e.portfolio_transaction().date_time),
            Item::Transaction(t) => Some(t.date_time),
        }
    }

    pub fn amount(&self) -> Option<&Money> {
        match self {
            Item::Security(_) => None,
            Item::BuySell(e) => Some(&e.portfolio_transaction().amount),
            Item::Transaction(t) => Some(&t.amount),
        }
    }

    pub fn security(&self) -> Option<&Arc<Security>> {
        match self {
            Item::Security(s) => Some(s),
            Item::BuySell(e) => Some(&e.portfolio_transaction().security),
            Item::Transaction(t) => t.security.as_ref(),
        }
    }

    pub fn as_buy_sell(&self) -> Option<&BuySellEntry> {
        match self {
            Item::BuySell(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_transaction(&self) -> Option<&AccountTransaction> {
        match self {
            Item::Transaction(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use super::Item;
    use crate::{
        model::{AccountTransaction, AccountTxType, Currency, Money, Security, SecurityProto},
        util::date::pub_testlib::datetime,
    };

    #[test]
    fn test_accessors() {
        let sec: Arc<Security> = Arc::new(SecurityProto::new("ISHARES TRUST", Currency::usd())
            .with_wkn("46436E718").into());
        let sec_item = Item::Security(sec.clone());
        assert_eq!(sec_item.kind_str(), "Security");
        assert!(!sec_item.is_transaction());
        assert_eq!(sec_item.date_time(), None);
        assert_eq!(sec_item.security(), Some(&sec));

        let tx_item = Item::Transaction(AccountTransaction {
            tx_type: AccountTxType::Interest,
            date_time: datetime("2023-04-17"),
            amount: Money::of(Currency::usd(), dec!(0.02)),
            security: None,
            shares: dec!(0),
            units: vec![],
            note: None,
        });
        assert!(tx_item.is_transaction());
        assert_eq!(tx_item.date_time(), Some(datetime("2023-04-17")));
        assert_eq!(tx_item.amount(), Some(&Money::of(Currency::usd(), dec!(0.02))));
        assert_eq!(tx_item.security(), None);
        assert!(tx_item.as_buy_sell().is_none());
        assert!(tx_item.as_transaction().is_some());
    }

    #[test]
    fn test_serialize_tagged() {
        let sec = Arc::new(SecurityProto::new("MICROSOFT CORP", Currency::usd())
            .with_ticker("MSFT").into());
        let json = serde_json::to_value(&Item::Security(sec)).unwrap();
        assert_eq!(json["item"], "Security");
        assert_eq!(json["name"], "MICROSOFT CORP");
        assert_eq!(json["ticker_symbol"], "MSFT");
        assert_eq!(json["currency"], "USD");
    }
}
