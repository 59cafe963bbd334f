use lazy_static::lazy_static;
pub use time::Date;
use time::{macros::format_description, PrimitiveDateTime, UtcOffset};

use super::basic::SError;

pub type StaticDateFormat<'a> =
    &'static [time::format_description::BorrowedFormatItem<'a>];

pub const STANDARD_DATE_FORMAT: StaticDateFormat =
    format_description!("[year]-[month]-[day]");
pub const SLASH_DATE_FORMAT: StaticDateFormat =
    format_description!("[month]/[day]/[year]");
/// eg. "16 Jun 2023". Used in option security names.
pub const DAY_MONTH_NAME_YEAR_FORMAT: StaticDateFormat =
    format_description!("[day] [month repr:short] [year]");

lazy_static! {
    static ref SHORT_SLASH_DATE_RE: regex::Regex =
        regex::Regex::new(r"^(\d{2}/\d{2})/(\d{2})$").unwrap();
}

pub fn parse_standard_date(date_str: &str) -> Result<Date, time::error::Parse> {
    Date::parse(date_str, STANDARD_DATE_FORMAT)
}

/// Parses MM/DD/YYYY
pub fn parse_slash_date(date_str: &str) -> Result<Date, time::error::Parse> {
    Date::parse(date_str.trim(), SLASH_DATE_FORMAT)
}

/// Parses MM/DD/YY.
///
/// This is required, because the default parse lib doesn't like two-digit years,
/// even if it lets you specify [year repr:last_two], it will just fail, claiming
/// there isn't enough information to construct the Date.
///
/// This function just cheats, and assumes we're in the 21st century.
pub fn parse_short_year_date(date_str: &str) -> Result<Date, SError> {
    match SHORT_SLASH_DATE_RE.captures(date_str.trim()) {
        Some(m) => {
            let long_date = format!("{}/20{}", &m[1], &m[2]);
            Date::parse(&long_date, SLASH_DATE_FORMAT).map_err(|e| e.to_string())
        }
        None => Err(format!(
            "Failed to parse date. {} did not match {:?}",
            date_str, *SHORT_SLASH_DATE_RE
        )),
    }
}

pub fn format_day_month_name_year(d: &Date) -> String {
    // The format description is static and valid, so this cannot fail for
    // any representable date.
    d.format(DAY_MONTH_NAME_YEAR_FORMAT)
        .unwrap_or_else(|_| d.to_string())
}

/// Transactions on statements carry no time of day.
pub fn at_midnight(d: Date) -> PrimitiveDateTime {
    d.midnight()
}

// This is a (possibly unsafe, but no worse than today_local) way
// to get the current system UtcOffset of local timezone.
// Using UtcOffset::current_local_offset is apparently unsafe on Linux,
// and will return an error if used without enabling some "unsafe" feature.
pub fn local_utc_offset() -> Result<UtcOffset, time::error::ComponentRange> {
    let now = chrono::offset::Local::now();
    let offset = now.offset();
    UtcOffset::from_whole_seconds(-1 * offset.utc_minus_local())
}

// Used by both unit and integration tests
pub mod pub_testlib {
    use time::{Date, PrimitiveDateTime};

    pub fn date(date_str: &str) -> Date {
        super::parse_standard_date(date_str).unwrap()
    }

    pub fn datetime(date_str: &str) -> PrimitiveDateTime {
        date(date_str).midnight()
    }
}
