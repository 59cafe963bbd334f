//! tastytrade statements.
//!
//! Two layouts are understood: the daily summary statement (one trade per
//! block, with the security name and CUSIP on the following lines), and the
//! monthly depot statement, which also carries option trades, dividends,
//! interest and cash movements.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::{
    extract::{
        builder::{
            option_security_name, AccountTxBuilder, BuySellBuilder, Draft, OptionEffect,
            OptionEvent, OptionRight,
        },
        config::ExtractConfig,
        doctype::{static_re, Block, DocumentType, Extractor, Section},
        error::{ExtractError, FieldParseError},
        searcher::CapturesHelper,
    },
    model::{Currency, PortfolioTxType, SecurityProto},
    util::decimal::is_negative,
};

const SHORT_DATE: &str = r"\d{2}/\d{2}/\d{2}";
/// Also matches malformed dates, so the date parser gets to report them.
const DATE_FIELD: &str = r"\S+/\S+/\S+";

lazy_static! {
    static ref SUMMARY_TRADE_RE: Regex = static_re(&format!(concat!(
        r"^(?P<tdate>{d})\s+(?P<sdate>{d})\s+",
        r"(?P<sym>[A-Z][A-Z0-9./]*)\s+(?P<bs>B|S)\s+",
        r"(?P<qty>[\d,]*\.?\d+)\s+(?P<price>[\d,]*\.?\d+)\s+",
        r"(?P<principal>[\d,]*\.\d{{2}})\s+(?P<commission>[\d,]*\.\d{{2}})\s+",
        r"(?P<fee>[\d,]*\.\d{{2}})\s+(?P<net>[\d,]*\.\d{{2}})$"), d = DATE_FIELD));
    static ref CUSIP_RE: Regex = static_re(r"^CUSIP:\s*(?P<cusip>[A-Z0-9]{9})$");

    static ref DEPOT_TRADE_RE: Regex = static_re(&format!(concat!(
        r"^(?P<tdate>{d})\s+(?P<sdate>{d})\s+(?P<acct>[A-Z])\s+",
        r"(?P<action>BOUGHT|SOLD|EXPIRED|ASSIGNED|EXERCISED)\s+",
        r"(?P<cusip>[A-Z0-9]{{7,9}})\s+(?P<desc>.+?)\s+",
        r"(?P<qty>[\d,]+(?:\.\d+)?)\s+(?P<price>[\d,]*\.?\d+)\s+",
        r"(?P<fees>[\d,]*\.?\d+)\s+(?P<amount>\(?[\d,]*\.\d{{2}}\)?)$"), d = DATE_FIELD));
    static ref EFFECT_RE: Regex =
        static_re(r"^(?P<effect>(?:Buy|Sell)\s+To\s+(?:Open|Close))$");
    static ref OPTION_RE: Regex = static_re(&format!(
        r"^(?P<right>PUT|CALL)\s+(?P<root>[A-Z][A-Z0-9.]*)\s+(?P<expiry>{d})\s+(?P<strike>[\d,]*\.?\d+)$",
        d = SHORT_DATE));

    static ref DIVIDEND_RE: Regex = static_re(&format!(concat!(
        r"^(?P<date>{d})\s+(?P<acct>[A-Z])\s+DIVIDEND\s+(?P<cusip>[A-Z0-9]{{9}})\s+",
        r"(?P<name>.+?)\s+CASH\s+DIV\s+ON\s+(?P<shares>[\d,]+(?:\.\d+)?)\s+SHS",
        r"(?:\s+TAX\s+WITHHELD\s+(?P<tax>[\d,]*\.\d{{2}}))?",
        r"\s+(?P<amount>\(?[\d,]*\.\d{{2}}\)?)$"), d = DATE_FIELD));
    static ref INTEREST_RE: Regex = static_re(&format!(concat!(
        r"^(?P<date>{d})\s+(?P<acct>[A-Z])\s+INTEREST\s+",
        r"(?P<desc>INTEREST\s+ON\s+(?:CREDIT|DEBIT)\s+BALANCE\s+AT\s+(?P<rate>[\d.]+\s*%).*?)",
        r"\s+(?P<amount>\(?[\d,]*\.\d{{2}}\)?)$"), d = DATE_FIELD));

    static ref FUNDS_RE: Regex = static_re(&format!(concat!(
        r"^(?P<date>{d})\s+(?P<acct>[A-Z])\s+(?P<kind>JOURNAL|ACH|WIRE|FEE)\s+",
        r"(?P<desc>.+?)\s+(?P<amount>\(?[\d,]*\.\d{{2}}\)?)$"), d = DATE_FIELD));
}

/// tastytrade accounts are held in USD.
fn usd() -> Currency {
    Currency::usd()
}

fn summary_trade(
    block: &Block,
    _config: &ExtractConfig,
) -> Result<Option<Vec<Draft>>, ExtractError> {
    let first = block.first();
    let Some(m) = SUMMARY_TRADE_RE.captures(first.text) else {
        return Ok(None);
    };
    let h = CapturesHelper::new(m, block.section, first.number);
    let tx_type = match h.group("bs")? {
        "B" => PortfolioTxType::Buy,
        _ => PortfolioTxType::Sell,
    };

    let mut name = None;
    let mut cusip = None;
    for l in block.rest() {
        if let Some(c) = CUSIP_RE.captures(l.text) {
            cusip = c.name("cusip").map(|v| v.as_str());
        } else if name.is_none() {
            name = Some(l.text);
        }
    }
    let name = name.ok_or_else(|| block.missing("security name"))?;
    let mut security = SecurityProto::new(name, usd()).with_ticker(h.group("sym")?);
    if let Some(cusip) = cusip {
        security = security.with_wkn(cusip);
    }

    let bldr = BuySellBuilder::new(tx_type, h.short_date("tdate")?, security, usd(), h.line())
        .shares(h.shares("qty")?)
        .price(h.amount("price")?)
        .principal(h.amount("principal")?)
        .fees(h.amount("commission")?)
        .fees(h.amount("fee")?)
        .net_amount(h.amount("net")?);
    Ok(Some(vec![bldr.into()]))
}

/// eg. "PUT TQQQ 06/16/23 32"
fn option_security(
    desc: &str,
    cusip: &str,
    block: &Block,
    line: usize,
) -> Result<Option<SecurityProto>, ExtractError> {
    let Some(m) = OPTION_RE.captures(desc) else {
        return Ok(None);
    };
    let h = CapturesHelper::new(m, block.section, line);
    let right_str = h.group("right")?;
    let right = right_str.parse::<OptionRight>().map_err(|_| {
        FieldParseError::new("right", right_str, "PUT or CALL").at("right", line)
    })?;
    let name = option_security_name(
        h.group("root")?,
        &h.short_date("expiry")?,
        &h.shares("strike")?,
        right,
    );
    Ok(Some(SecurityProto::new(&name, usd()).with_wkn(cusip)))
}

fn contract_shares(qty: Decimal, multiplier: Decimal, line: usize) -> Result<Decimal, ExtractError> {
    qty.checked_mul(multiplier).ok_or_else(|| {
        ExtractError::inconsistent(line, format!("{qty} contracts is too large a quantity"))
    })
}

fn position_effect(block: &Block) -> Result<Option<OptionEffect>, ExtractError> {
    for l in block.rest() {
        if let Some(m) = EFFECT_RE.captures(l.text) {
            let h = CapturesHelper::new(m, block.section, l.number);
            let text = h.group("effect")?;
            return text.parse::<OptionEffect>().map(Some).map_err(|_| {
                FieldParseError::new("effect", text, "Buy/Sell To Open/Close")
                    .at("effect", l.number)
                    .into()
            });
        }
    }
    Ok(None)
}

fn depot_trade(
    block: &Block,
    config: &ExtractConfig,
) -> Result<Option<Vec<Draft>>, ExtractError> {
    let first = block.first();
    let Some(m) = DEPOT_TRADE_RE.captures(first.text) else {
        return Ok(None);
    };
    let h = CapturesHelper::new(m, block.section, first.number);
    let line = h.line();
    let date = h.short_date("tdate")?;
    let cusip = h.group("cusip")?;
    let desc = h.group("desc")?;
    let qty = h.shares("qty")?;
    let option = option_security(desc, cusip, block, line)?;
    let multiplier = *config.option_multiplier;

    let action = h.group("action")?;
    let draft: Draft = match action {
        "BOUGHT" | "SOLD" => {
            let tx_type = if action == "BOUGHT" {
                PortfolioTxType::Buy
            } else {
                PortfolioTxType::Sell
            };
            // Debits are printed in parentheses.
            let amount = h.amount("amount")?;
            let is_debit = is_negative(&amount);
            if !amount.is_zero() && is_debit != (tx_type == PortfolioTxType::Buy) {
                return Err(ExtractError::inconsistent(
                    line,
                    format!(
                        "{action} with a {} of {}",
                        if is_debit { "debit" } else { "credit" },
                        amount.abs()
                    ),
                ));
            }

            let (security, shares, note) = match option {
                Some(sec) => (sec, contract_shares(qty, multiplier, line)?, Some(desc)),
                None => (SecurityProto::new(desc, usd()).with_wkn(cusip), qty, None),
            };
            let mut bldr = BuySellBuilder::new(tx_type, date, security, usd(), line)
                .shares(shares)
                .price(h.amount("price")?)
                .fees(h.amount("fees")?)
                .net_amount(amount.abs());
            if let Some(note) = note {
                bldr = bldr.note(note);
            }
            bldr.into()
        }
        _ => {
            let event = match action {
                "EXPIRED" => OptionEvent::Expired,
                "ASSIGNED" => OptionEvent::Assigned,
                "EXERCISED" => OptionEvent::Exercised,
                _ => return Ok(None),
            };
            let security = option.ok_or_else(|| {
                ExtractError::inconsistent(line, format!("{action} position {desc} is not an option"))
            })?;
            let effect = position_effect(block)?.ok_or_else(|| block.missing("effect"))?;
            BuySellBuilder::option_closing(
                event,
                effect,
                date,
                security,
                usd(),
                contract_shares(qty, multiplier, line)?,
                line,
            )
            .into()
        }
    };
    Ok(Some(vec![draft]))
}

fn dividend_or_interest(
    block: &Block,
    _config: &ExtractConfig,
) -> Result<Option<Vec<Draft>>, ExtractError> {
    let first = block.first();
    if let Some(m) = DIVIDEND_RE.captures(first.text) {
        let h = CapturesHelper::new(m, block.section, first.number);
        let security =
            SecurityProto::new(h.group("name")?, usd()).with_wkn(h.group("cusip")?);
        let bldr = AccountTxBuilder::dividend(
            h.short_date("date")?,
            security,
            usd(),
            h.shares("shares")?,
            h.amount("amount")?,
            h.opt_amount("tax")?.unwrap_or(Decimal::ZERO),
            h.line(),
        );
        return Ok(Some(vec![bldr.into()]));
    }
    if let Some(m) = INTEREST_RE.captures(first.text) {
        let h = CapturesHelper::new(m, block.section, first.number);
        // Only checked for format. The amount is what gets booked.
        h.percentage("rate")?;
        let bldr = AccountTxBuilder::interest(
            h.short_date("date")?,
            usd(),
            h.amount("amount")?,
            h.line(),
        )
        .note(h.group("desc")?);
        return Ok(Some(vec![bldr.into()]));
    }
    Ok(None)
}

fn funds(block: &Block, _config: &ExtractConfig) -> Result<Option<Vec<Draft>>, ExtractError> {
    let first = block.first();
    let Some(m) = FUNDS_RE.captures(first.text) else {
        return Ok(None);
    };
    let h = CapturesHelper::new(m, block.section, first.number);
    let date = h.short_date("date")?;
    let amount = h.amount("amount")?;
    let bldr = match h.group("kind")? {
        "FEE" => AccountTxBuilder::fee(date, usd(), amount, h.line()),
        _ => AccountTxBuilder::cash_transfer(date, usd(), amount, h.line()),
    };
    Ok(Some(vec![bldr.note(h.group("desc")?).into()]))
}

fn block_start_with_account() -> Regex {
    static_re(&format!(r"^{DATE_FIELD}\s+[A-Z]\s"))
}

pub struct Tastytrade {
    types: Vec<DocumentType>,
}

impl Tastytrade {
    pub fn new() -> Self {
        let summary = DocumentType {
            name: "tastytrade summary statement",
            signatures: vec![static_re("tastytrade"), static_re(r"SUMMARY\s+STATEMENT")],
            sections: vec![Section {
                name: "TRADES",
                start: static_re(r"^TRADE\s+SETTLE\s+SYMBOL/"),
                end: Some(static_re(r"^TOTAL\b")),
                block_start: static_re(&format!(r"^{DATE_FIELD}\s+{DATE_FIELD}\s")),
                recipe: summary_trade,
            }],
        };

        let depot = DocumentType {
            name: "tastytrade depot statement",
            signatures: vec![
                static_re("tastytrade"),
                static_re(r"(?:MONTHLY|ACCOUNT)\s+STATEMENT"),
                static_re(r"BUY\s+/\s+SELL\s+TRANSACTIONS"),
            ],
            sections: vec![
                Section {
                    name: "BUY / SELL TRANSACTIONS",
                    start: static_re(r"^BUY / SELL TRANSACTIONS$"),
                    end: Some(static_re(r"^TOTAL BUY / SELL TRANSACTIONS")),
                    block_start: static_re(&format!(r"^{DATE_FIELD}\s+{DATE_FIELD}\s")),
                    recipe: depot_trade,
                },
                Section {
                    name: "DIVIDENDS AND INTEREST",
                    start: static_re(r"^DIVIDENDS AND INTEREST$"),
                    end: Some(static_re(r"^TOTAL DIVIDENDS AND INTEREST")),
                    block_start: block_start_with_account(),
                    recipe: dividend_or_interest,
                },
                Section {
                    name: "FUNDS PAID AND RECEIVED",
                    start: static_re(r"^FUNDS PAID AND RECEIVED$"),
                    end: Some(static_re(r"^TOTAL FUNDS PAID AND RECEIVED")),
                    block_start: block_start_with_account(),
                    recipe: funds,
                },
            ],
        };

        Tastytrade {
            types: vec![summary, depot],
        }
    }
}

impl Default for Tastytrade {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for Tastytrade {
    fn label(&self) -> &'static str {
        "tastytrade"
    }

    fn document_types(&self) -> &[DocumentType] {
        &self.types
    }
}
