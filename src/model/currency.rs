use std::fmt::Display;

#[derive(Clone, Debug)]
enum CurrImpl {
    Static(&'static str),
    Dyn(String),
}

/// An ISO currency code. Always upper-case.
#[derive(Clone, Debug)]
pub struct Currency(CurrImpl);

impl Currency {
    pub fn new(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "" => Currency::default(),
            "USD" => Currency::usd(),
            "EUR" => Currency::eur(),
            "CAD" => Currency::cad(),
            other => Currency(CurrImpl::Dyn(other.to_string())),
        }
    }

    pub fn usd() -> Self {
        Currency(CurrImpl::Static("USD"))
    }

    pub fn eur() -> Self {
        Currency(CurrImpl::Static("EUR"))
    }

    pub fn cad() -> Self {
        Currency(CurrImpl::Static("CAD"))
    }

    pub fn as_str(&self) -> &str {
        match &self.0 {
            CurrImpl::Static(s) => s,
            CurrImpl::Dyn(s) => s.as_str(),
        }
    }
}

// Broker statements handled here are all US accounts.
impl Default for Currency {
    fn default() -> Self {
        Currency::usd()
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Currency {}

impl std::hash::Hash for Currency {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

// Auto-implements to_string()
impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for Currency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
