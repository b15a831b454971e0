use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::display::DisplayConfig;
use crate::core::{GeoLevel, SurveyVariant, VariantProfile};
use crate::errors::{Error, Result};
use crate::export::PageLayout;
use crate::filter::FilterKey;
use crate::geocode::{SuggestionGate, MIN_DEBOUNCE, MIN_QUERY_LEN};

/// Root configuration structure for surveydash
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveydashConfig {
    /// Per-variant filter and question profiles
    #[serde(default)]
    pub variants: BTreeMap<SurveyVariant, VariantProfile>,

    /// Data source paging
    #[serde(default)]
    pub source: SourceConfig,

    /// Address autocomplete limits
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Export page geometry
    #[serde(default)]
    pub export: PageLayout,

    /// Output formatting
    #[serde(default)]
    pub display: DisplayConfig,
}

impl SurveydashConfig {
    /// Profile for `variant`, falling back to the built-in one.
    ///
    /// # Examples
    ///
    /// ```
    /// use surveydash::config::SurveydashConfig;
    /// use surveydash::core::SurveyVariant;
    /// use surveydash::filter::FilterKey;
    ///
    /// let config = SurveydashConfig::default();
    /// let public = config.profile(SurveyVariant::Public);
    /// assert!(public.allows_filter(&FilterKey::question("AGE")));
    /// assert!(!public.allows_filter(&FilterKey::question("ETHNICITY")));
    /// ```
    pub fn profile(&self, variant: SurveyVariant) -> VariantProfile {
        self.variants
            .get(&variant)
            .cloned()
            .unwrap_or_else(|| default_profile(variant))
    }

    /// Profiles for every variant, explicit entries overriding defaults.
    pub fn profiles(&self) -> BTreeMap<SurveyVariant, VariantProfile> {
        SurveyVariant::ALL
            .iter()
            .map(|v| (*v, self.profile(*v)))
            .collect()
    }

    pub fn suggestion_gate(&self) -> SuggestionGate {
        SuggestionGate::new(
            Duration::from_millis(self.geocode.debounce_ms),
            self.geocode.min_query_len,
        )
    }

    /// Clamp soft limits and reject values nothing can work with.
    pub fn validate(mut self) -> Result<Self> {
        if self.source.page_size == 0 || self.source.batch_size == 0 {
            return Err(Error::configuration(
                "source.page_size and source.batch_size must be positive",
                None,
            ));
        }

        let min_debounce = MIN_DEBOUNCE.as_millis() as u64;
        if self.geocode.debounce_ms < min_debounce {
            log::warn!(
                "geocode.debounce_ms = {} is below {}; clamping",
                self.geocode.debounce_ms,
                min_debounce
            );
            self.geocode.debounce_ms = min_debounce;
        }
        if self.geocode.min_query_len < MIN_QUERY_LEN {
            log::warn!(
                "geocode.min_query_len = {} is below {}; clamping",
                self.geocode.min_query_len,
                MIN_QUERY_LEN
            );
            self.geocode.min_query_len = MIN_QUERY_LEN;
        }

        let layout = &self.export;
        if layout.page_height <= 2.0 * layout.margin || layout.margin < 0.0 || layout.gap < 0.0 {
            return Err(Error::configuration(
                format!(
                    "export page_height ({}) must exceed twice the margin ({}) and gap must be non-negative",
                    layout.page_height, layout.margin
                ),
                None,
            ));
        }

        Ok(self)
    }
}

/// Built-in profile: formal respondents answered every question, the
/// public and merged sets only carry demographics and geography.
pub fn default_profile(variant: SurveyVariant) -> VariantProfile {
    match variant {
        SurveyVariant::Formal => VariantProfile::unrestricted(),
        SurveyVariant::Public | SurveyVariant::Merged => VariantProfile::with_filters([
            FilterKey::question("AGE"),
            FilterKey::question("GENDER"),
            FilterKey::Geo(GeoLevel::District),
            FilterKey::Address,
        ]),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_page_size() -> usize {
    50
}

fn default_batch_size() -> usize {
    1000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_profile_overrides_default() {
        let mut config = SurveydashConfig::default();
        config.variants.insert(
            SurveyVariant::Public,
            VariantProfile::with_filters([FilterKey::question("AGE")]),
        );

        let public = config.profile(SurveyVariant::Public);
        assert!(!public.allows_filter(&FilterKey::question("GENDER")));
        assert!(config
            .profile(SurveyVariant::Merged)
            .allows_filter(&FilterKey::question("GENDER")));
        assert_eq!(config.profiles().len(), 3);
    }

    #[test]
    fn test_validate_clamps_geocode_limits() {
        let mut config = SurveydashConfig::default();
        config.geocode.debounce_ms = 50;
        config.geocode.min_query_len = 1;

        let config = config.validate().unwrap();
        assert_eq!(config.geocode.debounce_ms, 300);
        assert_eq!(config.geocode.min_query_len, 3);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = SurveydashConfig::default();
        config.source.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_degenerate_page() {
        let mut config = SurveydashConfig::default();
        config.export.margin = 600.0;
        assert!(config.validate().is_err());
    }
}
