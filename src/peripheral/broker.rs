use lazy_static::lazy_static;

use crate::extract::doctype::Extractor;

// Individual brokers
pub mod etrade;
pub mod tastytrade;

lazy_static! {
    static ref TASTYTRADE: tastytrade::Tastytrade = tastytrade::Tastytrade::new();
    static ref ETRADE: etrade::Etrade = etrade::Etrade::new();
}

/// Every supported broker, in registration order. Registration order breaks
/// ties between layouts matching equally well.
pub fn default_extractors() -> Vec<&'static dyn Extractor> {
    vec![&*TASTYTRADE, &*ETRADE]
}
