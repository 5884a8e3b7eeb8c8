//! Immutable country records

use serde::{Deserialize, Serialize};

use crate::core::types::{Coords, CountryId};

/// ISO codes attached to a catalog entry; either may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsoCodes {
    pub primary: Option<String>,
    pub alternate: Option<String>,
}

impl IsoCodes {
    pub fn new(primary: Option<&str>, alternate: Option<&str>) -> Self {
        Self {
            primary: primary.and_then(normalize_code),
            alternate: alternate.and_then(normalize_code),
        }
    }

    /// Code used for detail lookups: the primary, else the alternate
    pub fn lookup_code(&self) -> Option<&str> {
        self.primary.as_deref().or(self.alternate.as_deref())
    }
}

/// Natural Earth uses "-99" for "no code"
fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() || code == "-99" {
        None
    } else {
        Some(code.to_ascii_uppercase())
    }
}

/// A guessable country
///
/// The boundary geometry is opaque to the game; it is kept only so the
/// rendering side can draw the region it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub display_name: String,
    pub centroid: Coords,
    pub iso: IsoCodes,
    #[serde(default)]
    pub geometry: serde_json::Value,
}

impl Country {
    pub fn new(id: CountryId, display_name: impl Into<String>, centroid: Coords, iso: IsoCodes) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            centroid,
            iso,
            geometry: serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_codes_normalized() {
        let iso = IsoCodes::new(Some("-99"), Some("fra"));
        assert_eq!(iso.primary, None);
        assert_eq!(iso.lookup_code(), Some("FRA"));
    }

    #[test]
    fn test_lookup_prefers_primary() {
        let iso = IsoCodes::new(Some("fr"), Some("FRA"));
        assert_eq!(iso.lookup_code(), Some("FR"));
    }

    #[test]
    fn test_no_codes() {
        let iso = IsoCodes::new(None, Some(""));
        assert_eq!(iso.lookup_code(), None);
        assert_eq!(iso.alternate, None);
    }
}
