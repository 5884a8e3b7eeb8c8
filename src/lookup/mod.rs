//! External country detail lookup
//!
//! The game never blocks on these: a failed or empty answer just means
//! "no trivia available".

pub mod client;
pub mod detail;

pub use client::RestCountriesClient;
pub use detail::{CountryDetail, Currency, Trivia};

use ahash::AHashMap;
use std::future::Future;

use crate::catalog::CountryCatalog;
use crate::core::error::{GeoError, Result};

/// Resolve an ISO code to country detail
///
/// `Ok(None)` means the service answered but had no matching country.
pub trait DetailLookup: Send + Sync + 'static {
    fn lookup(&self, code: &str) -> impl Future<Output = Result<Option<CountryDetail>>> + Send;
}

/// Fixed in-memory answers, keyed by upper-case code
///
/// Used for offline play and tests. Codes listed as failing answer with
/// a lookup error instead of `None`.
#[derive(Debug, Default, Clone)]
pub struct StaticLookup {
    details: AHashMap<String, CountryDetail>,
    failing: Vec<String>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name-only detail for every catalog country that has a code
    pub fn from_catalog(catalog: &CountryCatalog) -> Self {
        let mut lookup = Self::new();
        for country in catalog.iter() {
            let iso = &country.iso;
            let detail = match (iso.primary.as_deref(), iso.alternate.as_deref()) {
                (Some(primary), alternate) => basic_detail(primary, alternate, &country.display_name),
                (None, Some(alternate)) => basic_detail(alternate, None, &country.display_name),
                (None, None) => continue,
            };
            lookup.insert(detail);
        }
        lookup
    }

    pub fn with_detail(mut self, detail: CountryDetail) -> Self {
        self.insert(detail);
        self
    }

    pub fn with_failure(mut self, code: &str) -> Self {
        self.failing.push(code.to_ascii_uppercase());
        self
    }

    /// Index a detail under both of its codes
    pub fn insert(&mut self, detail: CountryDetail) {
        if let Some(cca3) = &detail.cca3 {
            self.details.insert(cca3.to_ascii_uppercase(), detail.clone());
        }
        self.details.insert(detail.cca2.to_ascii_uppercase(), detail);
    }

    pub fn get(&self, code: &str) -> Result<Option<CountryDetail>> {
        let key = code.trim().to_ascii_uppercase();
        if self.failing.contains(&key) {
            return Err(GeoError::Lookup(format!("lookup for {} failed", key)));
        }
        Ok(self.details.get(&key).cloned())
    }
}

impl DetailLookup for StaticLookup {
    async fn lookup(&self, code: &str) -> Result<Option<CountryDetail>> {
        self.get(code)
    }
}

/// Minimal detail record, handy for offline catalogs and tests
pub fn basic_detail(cca2: &str, cca3: Option<&str>, name: &str) -> CountryDetail {
    CountryDetail {
        common_name: name.to_string(),
        cca2: cca2.to_ascii_uppercase(),
        cca3: cca3.map(|c| c.to_ascii_uppercase()),
        capital: Vec::new(),
        population: 0,
        languages: Vec::new(),
        currencies: Vec::new(),
        flag_png: format!("https://flagcdn.com/w320/{}.png", cca2.to_ascii_lowercase()),
        flag_alt: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_lookup_by_either_code() {
        let lookup = StaticLookup::new().with_detail(basic_detail("fr", Some("fra"), "France"));
        assert_eq!(lookup.get("FR").unwrap().unwrap().common_name, "France");
        assert_eq!(lookup.get("fra").unwrap().unwrap().cca2, "FR");
        assert_eq!(lookup.get("DE").unwrap(), None);
    }

    #[test]
    fn test_static_lookup_failure() {
        let lookup = StaticLookup::new().with_failure("xx");
        assert!(matches!(lookup.get("XX"), Err(GeoError::Lookup(_))));
    }

    #[test]
    fn test_from_catalog_covers_both_codes() {
        let catalog = crate::catalog::fixtures::catalog(3);
        let lookup = StaticLookup::from_catalog(&catalog);
        assert_eq!(lookup.get("C2").unwrap().unwrap().common_name, "Country 2");
        assert_eq!(lookup.get("cc0").unwrap().unwrap().common_name, "Country 0");
    }

    #[tokio::test]
    async fn test_static_lookup_async() {
        let lookup = StaticLookup::new().with_detail(basic_detail("jp", Some("jpn"), "Japan"));
        let detail = lookup.lookup("jp").await.unwrap();
        assert_eq!(detail.map(|d| d.common_name), Some("Japan".to_string()));
    }
}
