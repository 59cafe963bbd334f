use std::fmt::Display;

use super::Currency;

/// A tradeable instrument. Created once per identifier by the security
/// catalog and shared (as an Arc) by every transaction referencing it.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize)]
pub struct Security {
    pub name: String,
    pub isin: Option<String>,
    /// WKN, or the CUSIP for US listings.
    pub wkn: Option<String>,
    pub ticker_symbol: Option<String>,
    pub currency: Currency,
}

impl Security {
    /// The most specific identifier available, for display.
    pub fn display_id(&self) -> &str {
        self.isin
            .as_deref()
            .or(self.wkn.as_deref())
            .or(self.ticker_symbol.as_deref())
            .unwrap_or(&self.name)
    }
}

impl Display for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.ticker_symbol {
            Some(t) => write!(f, "{} ({})", self.name, t),
            None => write!(f, "{}", self.name),
        }
    }
}

/// What a statement says about a security. Resolved into a Security
/// through a SecurityLookup.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SecurityProto {
    pub name: String,
    pub isin: Option<String>,
    pub wkn: Option<String>,
    pub ticker_symbol: Option<String>,
    pub currency: Currency,
}

impl SecurityProto {
    pub fn new(name: &str, currency: Currency) -> Self {
        SecurityProto {
            name: name.trim().to_string(),
            currency,
            ..Default::default()
        }
    }

    pub fn with_isin(mut self, isin: &str) -> Self {
        self.isin = Some(isin.to_string());
        self
    }

    pub fn with_wkn(mut self, wkn: &str) -> Self {
        self.wkn = Some(wkn.to_string());
        self
    }

    pub fn with_ticker(mut self, ticker: &str) -> Self {
        self.ticker_symbol = Some(ticker.to_string());
        self
    }

    pub fn has_identifier(&self) -> bool {
        self.isin.is_some() || self.wkn.is_some() || self.ticker_symbol.is_some()
    }
}

impl From<SecurityProto> for Security {
    fn from(p: SecurityProto) -> Self {
        Security {
            name: p.name,
            isin: p.isin,
            wkn: p.wkn,
            ticker_symbol: p.ticker_symbol,
            currency: p.currency,
        }
    }
}
