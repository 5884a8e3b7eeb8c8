//! Read-only catalog of guessable countries

pub mod country;
pub mod loader;

pub use country::{Country, IsoCodes};
pub use loader::{load_from_file, load_from_json};

use crate::core::error::{GeoError, Result};
use crate::core::types::CountryId;

/// The fixed list of countries a session draws from
#[derive(Debug, Clone)]
pub struct CountryCatalog {
    countries: Vec<Country>,
}

impl CountryCatalog {
    /// Build a catalog; ids must match positions and the list must not be empty
    pub fn new(countries: Vec<Country>) -> Result<Self> {
        if countries.is_empty() {
            return Err(GeoError::CatalogLoad("catalog is empty".into()));
        }
        if let Some((pos, c)) = countries
            .iter()
            .enumerate()
            .find(|(pos, c)| c.id.index() != *pos)
        {
            return Err(GeoError::CatalogLoad(format!(
                "country '{}' has id {} at position {}",
                c.display_name, c.id, pos
            )));
        }
        Ok(Self { countries })
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn get(&self, id: CountryId) -> Option<&Country> {
        self.countries.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(CountryCatalog::new(Vec::new()).is_err());
    }

    #[test]
    fn test_get_by_id() {
        let catalog = fixtures::catalog(3);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(CountryId(2)).map(|c| c.display_name.as_str()), Some("Country 2"));
        assert!(catalog.get(CountryId(3)).is_none());
    }
}
