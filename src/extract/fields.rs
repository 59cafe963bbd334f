//! Parsers for the individual values found on statements.
//!
//! Each parser accepts exactly one textual format, and fails with a
//! FieldParseError carrying the offending text. Callers attach the field
//! name and line with `FieldParseError::at`.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use time::Date;

use super::error::FieldParseError;
use crate::util::{
    date::{parse_short_year_date, parse_slash_date},
    decimal::parse_large_decimal,
};

pub const SHORT_DATE_EXPECTED: &str = "a date like MM/DD/YY";
pub const LONG_DATE_EXPECTED: &str = "a date like MM/DD/YYYY";
pub const AMOUNT_EXPECTED: &str = "an amount like 1,234.56, $1,234.56 or (1,234.56)";
pub const SHARES_EXPECTED: &str = "a share quantity like 1,000 or 12.5";
pub const PERCENTAGE_EXPECTED: &str = "a percentage like 0.010%";

lazy_static! {
    // Either plain digits, or properly grouped thousands.
    static ref UNSIGNED_NUMBER_RE: Regex =
        Regex::new(r"^(?:\d{1,3}(?:,\d{3})+|\d+)?(?:\.\d+)?$").unwrap();
    static ref PERCENTAGE_RE: Regex =
        Regex::new(r"^(?P<num>\d+(?:\.\d+)?|\.\d+)\s*%$").unwrap();
}

fn parse_unsigned(s: &str) -> Option<Decimal> {
    if s.is_empty() || s == "." || !UNSIGNED_NUMBER_RE.is_match(s) {
        return None;
    }
    parse_large_decimal(s).ok()
}

/// MM/DD/YY, assumed to be in the 21st century.
pub fn parse_short_date(s: &str) -> Result<Date, FieldParseError> {
    parse_short_year_date(s)
        .map_err(|_| FieldParseError::new("date", s.trim(), SHORT_DATE_EXPECTED))
}

/// MM/DD/YYYY
pub fn parse_long_date(s: &str) -> Result<Date, FieldParseError> {
    parse_slash_date(s)
        .map_err(|_| FieldParseError::new("date", s.trim(), LONG_DATE_EXPECTED))
}

/// A money amount. Thousands separators and a '$' are allowed.
/// Parentheses or a leading minus make the amount negative.
pub fn parse_amount(s: &str) -> Result<Decimal, FieldParseError> {
    let err = || FieldParseError::new("amount", s.trim(), AMOUNT_EXPECTED);

    let mut body = s.trim();
    let mut negative = false;
    if body.starts_with('(') && body.ends_with(')') && body.len() >= 2 {
        negative = true;
        body = body[1..body.len() - 1].trim();
    }
    if let Some(rest) = body.strip_prefix('-') {
        if negative {
            return Err(err());
        }
        negative = true;
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_prefix('$') {
        body = rest.trim_start();
    }

    let mut d = parse_unsigned(body).ok_or_else(err)?;
    if negative {
        d.set_sign_negative(true);
    }
    Ok(d)
}

/// A non-negative share (or contract) quantity.
pub fn parse_shares(s: &str) -> Result<Decimal, FieldParseError> {
    parse_unsigned(s.trim())
        .ok_or_else(|| FieldParseError::new("shares", s.trim(), SHARES_EXPECTED))
}

/// "0.010%" is 0.010 (percentage points, not a fraction).
pub fn parse_percentage(s: &str) -> Result<Decimal, FieldParseError> {
    let err = || FieldParseError::new("percentage", s.trim(), PERCENTAGE_EXPECTED);
    let m = PERCENTAGE_RE.captures(s.trim()).ok_or_else(err)?;
    parse_large_decimal(&m["num"]).map_err(|_| err())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::{
        parse_amount, parse_long_date, parse_percentage, parse_shares,
        parse_short_date, AMOUNT_EXPECTED,
    };
    use crate::{extract::error::FieldParseError, util::date::pub_testlib::date};

    #[test]
    fn test_parse_dates() {
        assert_eq!(parse_short_date("06/16/23").unwrap(), date("2023-06-16"));
        assert_eq!(parse_long_date("11/03/2023").unwrap(), date("2023-11-03"));

        let err = parse_short_date("13/45/23").unwrap_err();
        assert_eq!(err.field, "date");
        assert_eq!(err.snippet, "13/45/23");
        assert_eq!(err.line, 0);
        assert!(parse_short_date("06/16/2023").is_err());
        assert!(parse_long_date("06/16/23").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("2,324.24").unwrap(), dec!(2324.24));
        assert_eq!(parse_amount("$1,306.51").unwrap(), dec!(1306.51));
        assert_eq!(parse_amount("(1,306.51)").unwrap(), dec!(-1306.51));
        assert_eq!(parse_amount("($42.13)").unwrap(), dec!(-42.13));
        assert_eq!(parse_amount("-0.05").unwrap(), dec!(-0.05));
        assert_eq!(parse_amount("- $3.00").unwrap(), dec!(-3));
        assert_eq!(parse_amount(".42").unwrap(), dec!(0.42));
        assert_eq!(parse_amount("21000.00").unwrap(), dec!(21000));

        assert_eq!(
            parse_amount("12,34.00").unwrap_err(),
            FieldParseError::new("amount", "12,34.00", AMOUNT_EXPECTED)
        );
        assert!(parse_amount("").is_err());
        assert!(parse_amount("$").is_err());
        assert!(parse_amount("(-1.00)").is_err());
        assert!(parse_amount("1.2.3").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_parse_shares() {
        assert_eq!(parse_shares("1,000").unwrap(), dec!(1000));
        assert_eq!(parse_shares("12.5").unwrap(), dec!(12.5));
        assert_eq!(parse_shares(" 8 ").unwrap(), dec!(8));
        assert!(parse_shares("-5").is_err());
        assert!(parse_shares("five").is_err());
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("0.010%").unwrap(), dec!(0.010));
        assert_eq!(parse_percentage("5 %").unwrap(), dec!(5));
        assert!(parse_percentage("0.010").is_err());
        assert!(parse_percentage("x%").is_err());
    }
}
