use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::{
    extract::{
        builder::{BuySellBuilder, Draft},
        config::ExtractConfig,
        doctype::{static_re, Block, DocumentType, Extractor, Section},
        error::{ExtractError, FieldParseError},
        fields,
        searcher::CapturesHelper,
    },
    model::{Currency, PortfolioTxType, SecurityProto},
};

const ACTION_EXPECTED: &str = "Buy, Bought, Sell or Sold";

fn parse_action(action: &str) -> Result<PortfolioTxType, FieldParseError> {
    let first_word = action.split_whitespace().next().unwrap_or_default();
    match first_word.to_uppercase().as_str() {
        "BUY" | "BOUGHT" => Ok(PortfolioTxType::Buy),
        // Includes "Sold Short"
        "SELL" | "SOLD" => Ok(PortfolioTxType::Sell),
        _ => Err(FieldParseError::new("action", action, ACTION_EXPECTED)),
    }
}

/// Reads the first capture of `re` anywhere in the block as an amount.
fn block_amount(
    block: &Block,
    text: &str,
    field: &str,
    re: &Regex,
) -> Result<Option<Decimal>, ExtractError> {
    match re.captures(text).and_then(|c| c.get(1)) {
        Some(m) => fields::parse_amount(m.as_str())
            .map(Some)
            .map_err(|e| e.at(field, block.start_line()).into()),
        None => Ok(None),
    }
}

lazy_static! {
    // Dates are matched loosely, so malformed ones reach the date parser.
    static ref PRE_MS_TRADE_RE: Regex = static_re(concat!(
        r"^(?P<txdate>\S+/\S+/\S+)\s+(?P<sdate>\S+/\S+/\S+)\s+",
        r"(?P<mkt>\d+)\s*(?P<cpt>\d+)\s+",
        r"(?P<sym>\S+)\s+(?P<act>\S+)\s+(?P<nshares>[\d,]+(?:\.\d+)?)\s+\$(?P<price>[\d,]*\.?\d+)"));
    // The name shares its line with the first of the amounts.
    static ref PRE_MS_NAME_RE: Regex =
        static_re(r"^(?P<name>.*?)\s*(?:COMMISSION|FEE|NET\s+AMOUNT)\s+\$");
    static ref PRE_MS_PRINCIPAL_RE: Regex = static_re(r"PRINCIPAL\s+(\$[\d,]*\.\d+)");
    static ref PRE_MS_COMMISSION_RE: Regex = static_re(r"COMMISSION\s+(\$[\d,]*\.\d+)");
    static ref PRE_MS_FEE_RE: Regex = static_re(r"\bFEE\s+(\$[\d,]*\.\d+)");
    static ref PRE_MS_NET_RE: Regex = static_re(r"NET\s+AMOUNT\s+(\$[\d,]*\.\d+)");

    static ref POST_MS_TRADE_RE: Regex = static_re(
        r"^(?P<txdate>\S+/\S+/\S+)\s+(?P<sdate>\S+/\S+/\S+)\s+(?P<nshares>[\d,]+(?:\.\d+)?)\s+(?P<price>[\d,]*\.?\d+)");
    static ref POST_MS_ACTION_RE: Regex =
        static_re(r"^Transaction\s+Type:\s*(?P<act>\S.*\S)$");
    static ref POST_MS_DESC_RE: Regex = static_re(r"^Description:\s*(?P<name>\S.*)$");
    static ref POST_MS_IDS_RE: Regex = static_re(concat!(
        r"ISIN:\s*(?P<sym>[^/\s]+)\s*/\s*(?P<cusip>[A-Z0-9]{9})\s*/\s*",
        r"(?P<isin>[A-Z]{2}[A-Z0-9]{9}\d)"));
    static ref POST_MS_PRINCIPAL_RE: Regex = static_re(r"Principal\s+(\$[\d,]*\.\d+)");
    static ref POST_MS_COMMISSION_RE: Regex = static_re(r"Commission\s+(\$[\d,]*\.\d+)");
    static ref POST_MS_FEE_RE: Regex = static_re(r"Transaction\s+Fee\s+(\$[\d,]*\.\d+)");
    static ref POST_MS_NET_RE: Regex = static_re(r"Net\s+Amount\s+(\$[\d,]*\.\d+)");
}

/// Trade confirmation from before Morgan Stanley acquired E*TRADE
/// (mid 2023 and before). One confirmation may list several trades.
fn pre_ms_trade(
    block: &Block,
    _config: &ExtractConfig,
) -> Result<Option<Vec<Draft>>, ExtractError> {
    let first = block.first();
    let Some(m) = PRE_MS_TRADE_RE.captures(first.text) else {
        return Ok(None);
    };
    let h = CapturesHelper::new(m, block.section, first.number);
    let tx_type = parse_action(h.group("act")?).map_err(|e| e.at("act", h.line()))?;

    let name = block
        .rest()
        .first()
        .and_then(|l| PRE_MS_NAME_RE.captures(l.text))
        .and_then(|c| c.name("name").map(|n| n.as_str().to_string()))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| block.missing("security name"))?;
    let security = SecurityProto::new(&name, Currency::usd()).with_ticker(h.group("sym")?);

    let text = block.text();
    let amount = |field: &str, re: &Regex| block_amount(block, &text, field, re);
    let principal = amount("principal", &*PRE_MS_PRINCIPAL_RE)?;
    let commission = amount("commission", &*PRE_MS_COMMISSION_RE)?;
    let fee = amount("fee", &*PRE_MS_FEE_RE)?;
    let net = amount("net amount", &*PRE_MS_NET_RE)?
        .ok_or_else(|| block.missing("net amount"))?;

    let mut bldr = BuySellBuilder::new(
        tx_type,
        h.short_date("txdate")?,
        security,
        Currency::usd(),
        h.line(),
    )
    .shares(h.shares("nshares")?)
    .price(h.amount("price")?)
    .fees(commission.unwrap_or(Decimal::ZERO))
    .fees(fee.unwrap_or(Decimal::ZERO))
    .net_amount(net);
    if let Some(principal) = principal {
        bldr = bldr.principal(principal);
    }
    Ok(Some(vec![bldr.into()]))
}

/// Trade confirmation from after Morgan Stanley acquired E*TRADE
/// (mid 2023 and later). There is a single trade per confirmation.
fn post_ms_trade(
    block: &Block,
    _config: &ExtractConfig,
) -> Result<Option<Vec<Draft>>, ExtractError> {
    let first = block.first();
    let Some(m) = POST_MS_TRADE_RE.captures(first.text) else {
        return Ok(None);
    };
    let h = CapturesHelper::new(m, block.section, first.number);

    let find = |re: &Regex| {
        block
            .rest()
            .iter()
            .find_map(|l| re.captures(l.text).map(|c| CapturesHelper::new(c, block.section, l.number)))
    };
    let act = find(&*POST_MS_ACTION_RE).ok_or_else(|| block.missing("transaction type"))?;
    let act_text = act.group("act")?;
    let tx_type = parse_action(act_text).map_err(|e| e.at("act", act.line()))?;
    let desc = find(&*POST_MS_DESC_RE).ok_or_else(|| block.missing("description"))?;
    let ids = find(&*POST_MS_IDS_RE).ok_or_else(|| block.missing("symbol / CUSIP / ISIN"))?;

    let security = SecurityProto::new(desc.group("name")?, Currency::usd())
        .with_ticker(ids.group("sym")?)
        .with_wkn(ids.group("cusip")?)
        .with_isin(ids.group("isin")?);

    let text = block.text();
    let amount = |field: &str, re: &Regex| block_amount(block, &text, field, re);
    let principal = amount("principal", &*POST_MS_PRINCIPAL_RE)?;
    let commission = amount("commission", &*POST_MS_COMMISSION_RE)?;
    let fee = amount("fee", &*POST_MS_FEE_RE)?;
    let net = amount("net amount", &*POST_MS_NET_RE)?
        .ok_or_else(|| block.missing("net amount"))?;

    let mut bldr = BuySellBuilder::new(
        tx_type,
        h.long_date("txdate")?,
        security,
        Currency::usd(),
        h.line(),
    )
    .shares(h.shares("nshares")?)
    .price(h.amount("price")?)
    .fees(commission.unwrap_or(Decimal::ZERO))
    .fees(fee.unwrap_or(Decimal::ZERO))
    .net_amount(net);
    if let Some(principal) = principal {
        bldr = bldr.principal(principal);
    }
    Ok(Some(vec![bldr.into()]))
}

pub struct Etrade {
    types: Vec<DocumentType>,
}

impl Etrade {
    pub fn new() -> Self {
        Etrade {
            types: vec![
                DocumentType {
                    name: "E*TRADE trade confirmation",
                    signatures: vec![static_re(r"E\*TRADE"), static_re(r"TRADE\s*CONFIRMATION")],
                    sections: vec![Section {
                        name: "TRADES",
                        start: static_re(r"SELL\s*QUANTITY\s*PRICE"),
                        end: None,
                        block_start: static_re(r"^\S+/\S+/\S+\s+\S+/\S+/\S+\s"),
                        recipe: pre_ms_trade,
                    }],
                },
                DocumentType {
                    name: "E*TRADE from Morgan Stanley trade confirmation",
                    signatures: vec![
                        static_re(r"E\*TRADE"),
                        static_re(r"This\s+transaction\s+is\s+confirmed"),
                    ],
                    sections: vec![Section {
                        name: "TRADE",
                        start: static_re(
                            r"Trade\s+Date\s+Settlement\s+Date\s+Quantity\s+Price\s+Settlement\s+Amount"),
                        end: None,
                        block_start: static_re(r"^\S+/\S+/\S+\s+\S+/\S+/\S+\s"),
                        recipe: post_ms_trade,
                    }],
                },
            ],
        }
    }
}

impl Default for Etrade {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for Etrade {
    fn label(&self) -> &'static str {
        "E*TRADE"
    }

    fn document_types(&self) -> &[DocumentType] {
        &self.types
    }
}
