use crate::location::{Coordinates, LocationResolver};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ZipEntry {
    #[serde(rename = "LAT")]
    lat: f64,
    #[serde(rename = "LNG")]
    lng: f64,
}

/// In-memory zip code table, loaded from `{"10001": {"LAT": .., "LNG": ..}, ..}`.
#[derive(Debug, Clone, Default)]
pub struct ZipTable {
    entries: HashMap<String, Coordinates>,
}

impl ZipTable {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read zip table {}", path.display()))?;
        let table = Self::from_json_str(&text)
            .with_context(|| format!("invalid zip table {}", path.display()))?;
        tracing::info!(path = %path.display(), zips = table.len(), "loaded zip table");
        Ok(table)
    }

    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let raw = serde_json::from_str::<HashMap<String, ZipEntry>>(text)?;
        Ok(raw
            .into_iter()
            .map(|(zip, e)| {
                (
                    zip,
                    Coordinates {
                        latitude: e.lat,
                        longitude: e.lng,
                    },
                )
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Coordinates)> for ZipTable {
    fn from_iter<I: IntoIterator<Item = (String, Coordinates)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(zip, c)| (normalize(&zip).to_string(), c))
                .collect(),
        }
    }
}

impl LocationResolver for ZipTable {
    fn resolve(&self, postal_code: &str) -> Option<Coordinates> {
        self.entries.get(normalize(postal_code)).copied()
    }
}

// ZIP+4 codes ("12345-6789") resolve by their first five digits.
fn normalize(postal_code: &str) -> &str {
    let trimmed = postal_code.trim();
    match trimmed.split_once('-') {
        Some((head, _)) => head,
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{
        "10001": {"LAT": 40.7506, "LNG": -73.9972},
        "02108": {"LAT": 42.3576, "LNG": -71.0684}
    }"#;

    #[test]
    fn resolves_known_zip() {
        let table = ZipTable::from_json_str(TABLE).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.resolve("10001"),
            Some(Coordinates {
                latitude: 40.7506,
                longitude: -73.9972
            })
        );
        assert!(table.resolve("02108").is_some());
    }

    #[test]
    fn resolves_zip_plus_four_and_whitespace() {
        let table = ZipTable::from_json_str(TABLE).unwrap();
        assert_eq!(table.resolve(" 10001-1234 "), table.resolve("10001"));
    }

    #[test]
    fn unknown_zip_is_not_found() {
        let table = ZipTable::from_json_str(TABLE).unwrap();
        assert_eq!(table.resolve("99999"), None);
        assert_eq!(table.resolve(""), None);
    }

    #[test]
    fn rejects_entries_without_coordinates() {
        assert!(ZipTable::from_json_str(r#"{"10001": {"LAT": 40.0}}"#).is_err());
        assert!(ZipTable::from_json_str("[]").is_err());
    }

    #[test]
    fn shipped_table_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/zip_lat_long.json");
        let table = ZipTable::load(path).unwrap();
        assert!(!table.is_empty());
        assert!(table.resolve("10001").is_some());
    }
}
