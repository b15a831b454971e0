//! Dashboard pipeline.
//!
//! The survey variant and filter selections live in an explicit
//! [`DashboardContext`] passed to [`run_dashboard`]. On every change the
//! runner re-derives each chart from the snapshot: variant selection,
//! question projection, filtering, then per-chart aggregation and render
//! spec building. Charts share nothing between runs.

pub mod definition;
pub mod runner;

pub use definition::{ChartDefinition, DashboardDefinition};
pub use runner::{
    fetch_snapshot, register_exports, run_dashboard, run_snapshot, ChartOutput, DashboardReport,
    Snapshot,
};

use std::collections::BTreeMap;

use crate::config::{default_profile, SurveydashConfig};
use crate::core::{ResponseRecord, SurveyVariant, VariantProfile};
use crate::errors::{Error, Result};
use crate::filter::{FilterKey, FilterState, FilterValue};

/// Variant and filter selections for one dashboard session.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardContext {
    variant: SurveyVariant,
    filters: FilterState,
    profiles: BTreeMap<SurveyVariant, VariantProfile>,
}

impl Default for DashboardContext {
    fn default() -> Self {
        Self::new(
            SurveyVariant::ALL
                .iter()
                .map(|v| (*v, default_profile(*v)))
                .collect(),
        )
    }
}

impl DashboardContext {
    pub fn new(profiles: BTreeMap<SurveyVariant, VariantProfile>) -> Self {
        Self {
            variant: SurveyVariant::default(),
            filters: FilterState::new(),
            profiles,
        }
    }

    pub fn from_config(config: &SurveydashConfig) -> Self {
        Self::new(config.profiles())
    }

    pub fn variant(&self) -> SurveyVariant {
        self.variant
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Direct access for staged editing; keys are checked on commit.
    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    pub fn profile(&self) -> VariantProfile {
        self.profiles
            .get(&self.variant)
            .cloned()
            .unwrap_or_else(|| default_profile(self.variant))
    }

    /// Switch variant and clear filters the new variant does not allow.
    ///
    /// Returns the cleared keys.
    pub fn set_variant(&mut self, variant: SurveyVariant) -> Vec<FilterKey> {
        if variant == self.variant {
            return Vec::new();
        }
        self.variant = variant;
        let cleared = self.filters.retain_allowed(&self.profile());
        if cleared.is_empty() {
            log::info!("Switched to {} variant", variant);
        } else {
            let names: Vec<String> = cleared.iter().map(ToString::to_string).collect();
            log::info!(
                "Switched to {} variant; cleared filters: {}",
                variant,
                names.join(", ")
            );
        }
        cleared
    }

    /// Apply one filter immediately.
    pub fn apply_filter(&mut self, key: FilterKey, value: FilterValue) -> Result<()> {
        if !self.profile().allows_filter(&key) {
            return Err(Error::Validation(format!(
                "filter '{}' is not available for the {} variant",
                key, self.variant
            )));
        }
        self.filters.apply(key, value);
        Ok(())
    }

    /// Commit staged edits, dropping any the current variant disallows.
    pub fn commit_filters(&mut self) -> bool {
        let committed = self.filters.commit();
        let dropped = self.filters.retain_allowed(&self.profile());
        for key in dropped {
            log::warn!("Ignoring filter '{}' for the {} variant", key, self.variant);
        }
        committed
    }

    /// Records in the current variant, with non-whitelisted answers removed.
    pub fn select(&self, records: &[ResponseRecord]) -> Vec<ResponseRecord> {
        let profile = self.profile();
        records
            .iter()
            .filter(|r| self.variant.includes(r))
            .map(|r| profile.project(r))
            .collect()
    }
}
