use std::sync::{Arc, Mutex};

use crate::model::{Security, SecurityProto};

/// Resolves the security described on a statement to a single shared
/// instance, creating it when nothing matches.
pub trait SecurityLookup {
    /// Returns the security, and whether it was newly created.
    fn lookup_or_create(&mut self, proto: SecurityProto) -> (Arc<Security>, bool);
}

/// Securities known to the import, matched by ISIN, then WKN, then ticker.
/// Securities without any identifier are matched by name.
#[derive(Default, Debug)]
pub struct SecurityCatalog {
    securities: Vec<Arc<Security>>,
}

fn same(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

impl SecurityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Securities which already exist. These are matched, but never emitted.
    pub fn with_securities(securities: Vec<Arc<Security>>) -> Self {
        SecurityCatalog { securities }
    }

    pub fn securities(&self) -> &[Arc<Security>] {
        &self.securities
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    fn find_by(
        &self,
        id: fn(&Security) -> &Option<String>,
        v: &Option<String>,
    ) -> Option<Arc<Security>> {
        self.securities.iter().find(|s| same(id(s), v)).cloned()
    }

    pub fn find(&self, proto: &SecurityProto) -> Option<Arc<Security>> {
        if let Some(s) = self.find_by(|s| &s.isin, &proto.isin) {
            return Some(s);
        }
        if let Some(s) = self.find_by(|s| &s.wkn, &proto.wkn) {
            return Some(s);
        }
        if let Some(s) = self.find_by(|s| &s.ticker_symbol, &proto.ticker_symbol) {
            return Some(s);
        }
        if !proto.has_identifier() {
            return self.securities.iter().find(|s| s.name == proto.name).cloned();
        }
        None
    }
}

impl SecurityLookup for SecurityCatalog {
    fn lookup_or_create(&mut self, proto: SecurityProto) -> (Arc<Security>, bool) {
        if let Some(s) = self.find(&proto) {
            tracing::trace!("SecurityCatalog: matched {}", s.display_id());
            return (s, false);
        }
        let s = Arc::new(Security::from(proto));
        tracing::debug!("SecurityCatalog: new security {}", s);
        self.securities.push(s.clone());
        (s, true)
    }
}

/// A catalog shared by documents extracted concurrently. Clones refer to
/// the same catalog.
#[derive(Clone, Default, Debug)]
pub struct SharedCatalog(Arc<Mutex<SecurityCatalog>>);

impl SharedCatalog {
    pub fn new(catalog: SecurityCatalog) -> Self {
        SharedCatalog(Arc::new(Mutex::new(catalog)))
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecurityLookup for SharedCatalog {
    fn lookup_or_create(&mut self, proto: SecurityProto) -> (Arc<Security>, bool) {
        let mut catalog = self.0.lock().unwrap_or_else(|e| e.into_inner());
        catalog.lookup_or_create(proto)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{SecurityCatalog, SecurityLookup, SharedCatalog};
    use crate::model::{Currency, Security, SecurityProto};

    fn proto(name: &str) -> SecurityProto {
        SecurityProto::new(name, Currency::usd())
    }

    #[test]
    fn test_match_order() {
        let mut cat = SecurityCatalog::new();
        let (nvda, created) =
            cat.lookup_or_create(proto("NVIDIA CORP").with_wkn("67066G104").with_ticker("NVDA"));
        assert!(created);

        // Same CUSIP, different name
        let (s, created) = cat.lookup_or_create(proto("NVIDIA").with_wkn("67066G104"));
        assert!(!created);
        assert!(Arc::ptr_eq(&s, &nvda));

        // Ticker only
        let (s, created) = cat.lookup_or_create(proto("Nvidia Corporation").with_ticker("NVDA"));
        assert!(!created);
        assert!(Arc::ptr_eq(&s, &nvda));

        // A different identifier is a different security, even with the same name
        let (_, created) = cat.lookup_or_create(proto("NVIDIA CORP").with_wkn("000000000"));
        assert!(created);
        assert_eq!(cat.len(), 2);
    }

    #[test]
    fn test_name_match_without_identifiers() {
        let mut cat = SecurityCatalog::new();
        let (a, created) = cat.lookup_or_create(proto("SPDR SERIES TRUST"));
        assert!(created);
        let (b, created) = cat.lookup_or_create(proto("SPDR SERIES TRUST"));
        assert!(!created);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_isin_first() {
        let existing: Arc<Security> = Arc::new(
            proto("SAP SE").with_isin("DE0007164600").with_wkn("716460").into());
        let mut cat = SecurityCatalog::with_securities(vec![existing.clone()]);
        let (s, created) = cat.lookup_or_create(proto("SAP").with_isin("DE0007164600"));
        assert!(!created);
        assert!(Arc::ptr_eq(&s, &existing));
    }

    #[test]
    fn test_shared() {
        let shared = SharedCatalog::new(SecurityCatalog::new());
        let mut a = shared.clone();
        let mut b = shared.clone();
        let (_, created) = a.lookup_or_create(proto("TESLA INC").with_ticker("TSLA"));
        assert!(created);
        let (_, created) = b.lookup_or_create(proto("TESLA INC").with_ticker("TSLA"));
        assert!(!created);
        assert_eq!(shared.len(), 1);
    }
}
