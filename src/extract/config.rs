use crate::{
    gezdec, model::Currency, pdec,
    util::decimal::{GreaterEqualZeroDecimal, PosDecimal},
};

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfig {
    /// The currency of the account receiving the imported items.
    pub currency: Currency,
    /// Allowed difference between a stated and a recomputed amount.
    pub tolerance: GreaterEqualZeroDecimal,
    /// Shares per option contract.
    pub option_multiplier: PosDecimal,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            currency: Currency::usd(),
            tolerance: gezdec!(0.01),
            option_multiplier: pdec!(100),
        }
    }
}

impl ExtractConfig {
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}
