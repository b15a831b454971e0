//! Postal-code to district resolution for address-derived filters.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").expect("valid zip regex"));

/// Last 5-digit postal code in a free-text address.
///
/// The last match wins because street numbers precede the postal code.
pub fn extract_zip(address: &str) -> Option<&str> {
    ZIP_PATTERN
        .captures_iter(address)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZipDistrictTable {
    zips: BTreeMap<String, String>,
}

impl ZipDistrictTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, zip: impl Into<String>, district: impl Into<String>) {
        self.zips.insert(zip.into(), district.into());
    }

    pub fn district_for_zip(&self, zip: &str) -> Option<&str> {
        self.zips.get(zip.trim()).map(String::as_str)
    }

    /// District code for an address, `None` when no known zip is present.
    pub fn district_for_address(&self, address: &str) -> Option<&str> {
        extract_zip(address).and_then(|zip| self.district_for_zip(zip))
    }

    /// `(zip, district)` pairs in zip order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.zips.iter().map(|(z, d)| (z.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.zips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zips.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ZipDistrictTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            zips: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_zip_prefers_trailing_code() {
        assert_eq!(extract_zip("12345 Main St, Springfield 94110"), Some("94110"));
        assert_eq!(extract_zip("1 Main St, 94110-1234"), Some("94110"));
        assert_eq!(extract_zip("1 Main St"), None);
        assert_eq!(extract_zip("941100"), None);
    }

    #[test]
    fn test_district_for_address() {
        let table: ZipDistrictTable = [("94110", "9"), ("94103", "6")].into_iter().collect();

        assert_eq!(table.district_for_address("500 Valencia St 94110"), Some("9"));
        assert_eq!(table.district_for_address("Somewhere 10001"), None);
        assert_eq!(table.district_for_address("no zip here"), None);
    }
}
