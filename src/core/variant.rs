//! Survey variants and their per-variant profiles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::types::ResponseRecord;
use crate::filter::FilterKey;

/// Survey instrument selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SurveyVariant {
    Formal,
    Public,
    #[default]
    Merged,
}

impl SurveyVariant {
    pub const ALL: [SurveyVariant; 3] = [
        SurveyVariant::Formal,
        SurveyVariant::Public,
        SurveyVariant::Merged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyVariant::Formal => "formal",
            SurveyVariant::Public => "public",
            SurveyVariant::Merged => "merged",
        }
    }

    /// Whether a record belongs to this variant's record set.
    pub fn includes(&self, record: &ResponseRecord) -> bool {
        match self {
            SurveyVariant::Merged => true,
            variant => record.instrument == Some(*variant),
        }
    }
}

impl fmt::Display for SurveyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurveyVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "formal" => Ok(Self::Formal),
            "public" => Ok(Self::Public),
            "merged" => Ok(Self::Merged),
            other => Err(format!(
                "unknown survey variant '{other}' (expected formal, public or merged)"
            )),
        }
    }
}

/// Which filters and questions are valid under a variant.
///
/// `None` means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantProfile {
    #[serde(default)]
    pub allowed_filters: Option<BTreeSet<FilterKey>>,
    #[serde(default)]
    pub questions: Option<BTreeSet<String>>,
}

impl VariantProfile {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn with_filters<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FilterKey>,
    {
        Self {
            allowed_filters: Some(keys.into_iter().map(Into::into).collect()),
            questions: None,
        }
    }

    pub fn allows_filter(&self, key: &FilterKey) -> bool {
        self.allowed_filters
            .as_ref()
            .is_none_or(|allowed| allowed.contains(key))
    }

    pub fn allows_question(&self, code: &str) -> bool {
        self.questions
            .as_ref()
            .is_none_or(|allowed| allowed.contains(code))
    }

    /// Copy of `record` with non-whitelisted answers removed.
    pub fn project(&self, record: &ResponseRecord) -> ResponseRecord {
        match &self.questions {
            None => record.clone(),
            Some(allowed) => {
                let mut projected = record.clone();
                projected.restrict_questions(allowed.iter());
                projected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeoLevel;

    #[test]
    fn test_merged_includes_every_record() {
        let untagged = ResponseRecord::new("a");
        let public = ResponseRecord::new("b").with_instrument(SurveyVariant::Public);

        assert!(SurveyVariant::Merged.includes(&untagged));
        assert!(SurveyVariant::Merged.includes(&public));
        assert!(SurveyVariant::Public.includes(&public));
        assert!(!SurveyVariant::Formal.includes(&public));
        assert!(!SurveyVariant::Formal.includes(&untagged));
    }

    #[test]
    fn test_profile_filters_and_questions() {
        let mut profile = VariantProfile::with_filters([
            FilterKey::question("AGE"),
            FilterKey::Geo(GeoLevel::District),
        ]);
        profile.questions = Some(["AGE".to_string()].into_iter().collect());

        assert!(profile.allows_filter(&FilterKey::question("AGE")));
        assert!(!profile.allows_filter(&FilterKey::Geo(GeoLevel::Region)));
        assert!(!profile.allows_question("GENDER"));

        let record = ResponseRecord::new("r")
            .with_answer("AGE", 30.0)
            .with_answer("GENDER", "1");
        let projected = profile.project(&record);
        assert_eq!(projected.code("AGE"), Some("30".to_string()));
        assert_eq!(projected.code("GENDER"), None);
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("Public".parse::<SurveyVariant>(), Ok(SurveyVariant::Public));
        assert!("other".parse::<SurveyVariant>().is_err());
    }
}
