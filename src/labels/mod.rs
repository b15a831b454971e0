//! Static code-to-label lookup tables.
//!
//! Tables are configuration assets loaded once from the dashboard definition
//! and shared immutably by every chart.

pub mod zip;

pub use zip::{extract_zip, ZipDistrictTable};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::core::GeoLevel;

/// All static lookup assets a dashboard needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTables {
    /// Answer labels per question code
    #[serde(default)]
    pub labels: LabelTable,
    /// Postal code to district code
    #[serde(default)]
    pub zips: ZipDistrictTable,
    /// Named geography buckets per level, used by cross-tabs
    #[serde(default)]
    pub geo: BTreeMap<GeoLevel, CategoryTable>,
}

/// One answer option of a categorical question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub label: String,
}

impl Category {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// Ordered category set for one question; doubles as the question's domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(code, label)| Category::new(code, label))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Position of an in-domain code, `None` for out-of-domain values.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.position(code).is_some()
    }
}

/// Question code -> (answer code -> label).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    questions: BTreeMap<String, BTreeMap<String, String>>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        question: impl Into<String>,
        code: impl Into<String>,
        label: impl Into<String>,
    ) {
        self.questions
            .entry(question.into())
            .or_default()
            .insert(code.into(), label.into());
    }

    pub fn has_question(&self, question: &str) -> bool {
        self.questions.contains_key(question)
    }

    /// Human readable label for a coded answer.
    ///
    /// Falls back to the raw value when no (non-empty) mapping exists.
    pub fn resolve(&self, question: &str, raw: &str) -> String {
        let key = raw.trim();
        self.questions
            .get(question)
            .and_then(|codes| codes.get(key))
            .filter(|label| !label.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }

    /// Category table for a question, codes in natural order (`2` before `10`).
    pub fn categories(&self, question: &str) -> CategoryTable {
        let Some(codes) = self.questions.get(question) else {
            return CategoryTable::default();
        };
        let mut categories: Vec<Category> = codes
            .iter()
            .map(|(code, label)| {
                let label = if label.trim().is_empty() { code } else { label };
                Category::new(code.clone(), label.clone())
            })
            .collect();
        categories.sort_by(|a, b| natural_cmp(&a.code, &b.code));
        CategoryTable::new(categories)
    }
}

/// Numeric-aware ordering for answer codes.
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender_table() -> LabelTable {
        let mut table = LabelTable::new();
        table.insert("GENDER", "1", "Male");
        table.insert("GENDER", "2", "Female");
        table.insert("GENDER", "3", "");
        table
    }

    #[test]
    fn test_resolve_known_code() {
        assert_eq!(gender_table().resolve("GENDER", "2"), "Female");
        assert_eq!(gender_table().resolve("GENDER", " 1 "), "Male");
    }

    #[test]
    fn test_resolve_falls_back_to_raw() {
        let table = gender_table();
        assert_eq!(table.resolve("GENDER", "9"), "9");
        assert_eq!(table.resolve("UNKNOWN", "4"), "4");
        // An empty label never replaces a non-empty input
        assert_eq!(table.resolve("GENDER", "3"), "3");
    }

    #[test]
    fn test_categories_use_natural_order() {
        let mut table = LabelTable::new();
        table.insert("Q", "10", "Ten");
        table.insert("Q", "2", "Two");
        table.insert("Q", "other", "Other");

        let codes: Vec<_> = table.categories("Q").iter().map(|c| c.code.clone()).collect();
        assert_eq!(codes, vec!["2", "10", "other"]);
        assert!(table.categories("MISSING").is_empty());
    }

    #[test]
    fn test_label_table_from_toml() {
        let table: LabelTable = toml::from_str(
            r#"
            [GENDER]
            1 = "Male"
            2 = "Female"
            "#,
        )
        .unwrap();
        assert_eq!(table.resolve("GENDER", "1"), "Male");
        assert_eq!(table.categories("GENDER").len(), 2);
    }
}
