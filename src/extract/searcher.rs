use rust_decimal::Decimal;
use time::Date;

use super::{
    error::{ExtractError, FieldParseError},
    fields,
};

/// Wraps the captures of a block's line pattern, so named groups can be read
/// through the field parsers with the section and line attached to any error.
pub struct CapturesHelper<'a> {
    pub m: regex::Captures<'a>,
    section: &'a str,
    line: usize,
}

impl<'a> CapturesHelper<'a> {
    pub fn new(m: regex::Captures<'a>, section: &'a str, line: usize) -> CapturesHelper<'a> {
        Self { m, section, line }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn opt_group(&self, name: &str) -> Option<&'a str> {
        self.m.name(name).map(|v| v.as_str().trim())
    }

    pub fn group(&self, name: &str) -> Result<&'a str, ExtractError> {
        self.opt_group(name).ok_or_else(|| ExtractError::MissingField {
            section: self.section.to_string(),
            field: name.to_string(),
            line: self.line,
        })
    }

    fn parse_group<T>(
        &self,
        name: &str,
        parse: fn(&str) -> Result<T, FieldParseError>,
    ) -> Result<T, ExtractError> {
        let text = self.group(name)?;
        parse(text).map_err(|e| e.at(name, self.line).into())
    }

    fn opt_parse_group<T>(
        &self,
        name: &str,
        parse: fn(&str) -> Result<T, FieldParseError>,
    ) -> Result<Option<T>, ExtractError> {
        match self.opt_group(name) {
            Some(text) => parse(text)
                .map(Some)
                .map_err(|e| e.at(name, self.line).into()),
            None => Ok(None),
        }
    }

    pub fn short_date(&self, name: &str) -> Result<Date, ExtractError> {
        self.parse_group(name, fields::parse_short_date)
    }

    pub fn long_date(&self, name: &str) -> Result<Date, ExtractError> {
        self.parse_group(name, fields::parse_long_date)
    }

    pub fn amount(&self, name: &str) -> Result<Decimal, ExtractError> {
        self.parse_group(name, fields::parse_amount)
    }

    pub fn opt_amount(&self, name: &str) -> Result<Option<Decimal>, ExtractError> {
        self.opt_parse_group(name, fields::parse_amount)
    }

    pub fn shares(&self, name: &str) -> Result<Decimal, ExtractError> {
        self.parse_group(name, fields::parse_shares)
    }

    pub fn percentage(&self, name: &str) -> Result<Decimal, ExtractError> {
        self.parse_group(name, fields::parse_percentage)
    }
}
