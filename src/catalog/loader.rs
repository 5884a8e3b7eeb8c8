//! Load the country catalog from a GeoJSON feature collection
//!
//! Only the properties the game needs are read: the English display name,
//! the two ISO codes and the label point used as centroid. Geometry is
//! carried through untouched.

use serde::Deserialize;
use std::path::Path;

use crate::catalog::country::{Country, IsoCodes};
use crate::catalog::CountryCatalog;
use crate::core::error::{GeoError, Result};
use crate::core::types::{Coords, CountryId};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
    #[serde(default)]
    geometry: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    name_en: Option<String>,
    #[serde(default)]
    name: Option<String>,
    iso_a2_eh: Option<String>,
    adm0_iso: Option<String>,
    label_x: Option<f64>,
    label_y: Option<f64>,
}

/// Parse a GeoJSON document into a catalog
pub fn load_from_json(json: &str) -> Result<CountryCatalog> {
    let collection: FeatureCollection =
        serde_json::from_str(json).map_err(|e| GeoError::CatalogLoad(e.to_string()))?;

    let mut countries = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let props = feature.properties;
        let display_name = props
            .name_en
            .or(props.name)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| GeoError::CatalogLoad(format!("feature {} has no name", index)))?;

        let centroid = match (props.label_y, props.label_x) {
            (Some(lat), Some(lng)) => Coords::new(lat, lng),
            _ => {
                return Err(GeoError::CatalogLoad(format!(
                    "feature '{}' has no label point",
                    display_name
                )))
            }
        };

        let iso = IsoCodes::new(props.iso_a2_eh.as_deref(), props.adm0_iso.as_deref());
        let mut country = Country::new(CountryId(countries.len() as u32), display_name, centroid, iso);
        country.geometry = feature.geometry;
        countries.push(country);
    }

    let catalog = CountryCatalog::new(countries)?;
    tracing::info!("Loaded {} countries", catalog.len());
    Ok(catalog)
}

/// Load a catalog from a GeoJSON file on disk
pub fn load_from_file(path: &Path) -> Result<CountryCatalog> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| GeoError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
    load_from_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name_en": "France", "iso_a2_eh": "FR", "adm0_iso": "FRA", "label_x": 2.5, "label_y": 46.7},
                "geometry": {"type": "Polygon", "coordinates": []}
            },
            {
                "type": "Feature",
                "properties": {"name_en": "Kosovo", "iso_a2_eh": "-99", "adm0_iso": "KOS", "label_x": 20.8, "label_y": 42.5},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn test_load_sample() {
        let catalog = load_from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);

        let france = catalog.get(CountryId(0)).unwrap();
        assert_eq!(france.display_name, "France");
        assert_eq!(france.centroid, Coords::new(46.7, 2.5));
        assert_eq!(france.iso.lookup_code(), Some("FR"));
        assert!(france.geometry.is_object());

        let kosovo = catalog.get(CountryId(1)).unwrap();
        assert_eq!(kosovo.iso.lookup_code(), Some("KOS"));
    }

    #[test]
    fn test_missing_name_is_fatal() {
        let json = r#"{"features": [{"properties": {"label_x": 1.0, "label_y": 2.0}}]}"#;
        assert!(matches!(load_from_json(json), Err(GeoError::CatalogLoad(_))));
    }

    #[test]
    fn test_garbage_is_fatal() {
        assert!(matches!(load_from_json("not json"), Err(GeoError::CatalogLoad(_))));
    }
}
