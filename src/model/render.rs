use rust_decimal::Decimal;

use super::{Item, Money, UnitKind};
use crate::util::decimal::dollar_precision_str;

#[derive(Default, Debug, PartialEq)]
pub struct RenderTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub notes: Vec<String>,
}

fn money_str(m: &Money) -> String {
    dollar_precision_str(&m.amount())
}

fn shares_str(d: &Decimal) -> String {
    d.normalize().to_string()
}

pub const ITEM_TABLE_HEADER: [&str; 12] = [
    "item",
    "date",
    "type",
    "security",
    "identifier",
    "shares",
    "amount",
    "fees",
    "taxes",
    "gross value",
    "currency",
    "note",
];

/// One row per item, in extraction order.
pub fn render_items_table(items: &[Item]) -> RenderTable {
    let mut rt = RenderTable::default();
    rt.header.extend(ITEM_TABLE_HEADER.iter().map(|h| h.to_string()));

    let mut n_security = 0;
    let mut n_buy_sell = 0;
    let mut n_tx = 0;
    for item in items {
        let row = match item {
            Item::Security(s) => {
                n_security += 1;
                vec![
                    item.kind_str().to_string(),
                    String::new(),
                    "New".to_string(),
                    s.name.clone(),
                    s.display_id().to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    s.currency.to_string(),
                    String::new(),
                ]
            }
            Item::BuySell(e) => {
                n_buy_sell += 1;
                let p = e.portfolio_transaction();
                vec![
                    item.kind_str().to_string(),
                    p.date_time.date().to_string(),
                    p.tx_type.to_string(),
                    p.security.name.clone(),
                    p.security.display_id().to_string(),
                    shares_str(&p.shares),
                    money_str(&p.amount),
                    money_str(&p.unit_sum(UnitKind::Fee)),
                    money_str(&p.unit_sum(UnitKind::Tax)),
                    money_str(&p.gross_value()),
                    p.currency().to_string(),
                    p.note.clone().unwrap_or_default(),
                ]
            }
            Item::Transaction(t) => {
                n_tx += 1;
                vec![
                    item.kind_str().to_string(),
                    t.date_time.date().to_string(),
                    t.tx_type.to_string(),
                    t.security.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
                    t.security
                        .as_ref()
                        .map(|s| s.display_id().to_string())
                        .unwrap_or_default(),
                    if t.shares.is_zero() { String::new() } else { shares_str(&t.shares) },
                    money_str(&t.amount),
                    money_str(&t.unit_sum(UnitKind::Fee)),
                    money_str(&t.unit_sum(UnitKind::Tax)),
                    money_str(&t.gross_value()),
                    t.currency().to_string(),
                    t.note.clone().unwrap_or_default(),
                ]
            }
        };
        rt.rows.push(row);
    }

    rt.notes.push(format!(
        "{n_security} new securities, {n_buy_sell} buy/sell entries, \
         {n_tx} account transactions"
    ));
    rt
}
