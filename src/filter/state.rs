//! Filter state lifecycle: pending edits, atomic commit, per-key removal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{FilterKey, FilterValue};
use crate::core::VariantProfile;

/// Pending and committed filter selections.
///
/// Edits are staged into a pending copy while a filter panel is open and
/// become active all at once on [`FilterState::commit`]. Selecting one
/// geographic granularity clears the others in whichever map it lands in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    active: BTreeMap<FilterKey, FilterValue>,
    #[serde(skip)]
    pending: Option<BTreeMap<FilterKey, FilterValue>>,
}

fn insert_exclusive(
    map: &mut BTreeMap<FilterKey, FilterValue>,
    key: FilterKey,
    value: FilterValue,
) {
    if value.is_vacuous() {
        map.remove(&key);
        return;
    }
    if key.is_geographic() {
        map.retain(|existing, _| !existing.is_geographic() || *existing == key);
    }
    map.insert(key, value);
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &BTreeMap<FilterKey, FilterValue> {
        &self.active
    }

    pub fn pending(&self) -> Option<&BTreeMap<FilterKey, FilterValue>> {
        self.pending.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_editing(&self) -> bool {
        self.pending.is_some()
    }

    pub fn get(&self, key: &FilterKey) -> Option<&FilterValue> {
        self.active.get(key)
    }

    /// Start editing from a copy of the active filters.
    pub fn begin_edit(&mut self) {
        self.pending = Some(self.active.clone());
    }

    /// Stage a selection; starts an edit if none is open.
    pub fn stage(&mut self, key: FilterKey, value: FilterValue) {
        let pending = self.pending.get_or_insert_with(|| self.active.clone());
        insert_exclusive(pending, key, value);
    }

    pub fn unstage(&mut self, key: &FilterKey) {
        if let Some(pending) = self.pending.as_mut() {
            pending.remove(key);
        }
    }

    /// Replace the active filters with the pending ones.
    ///
    /// Returns `false` when there was nothing to commit.
    pub fn commit(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                log::debug!("Committing {} filter(s)", pending.len());
                self.active = pending;
                true
            }
            None => false,
        }
    }

    pub fn discard(&mut self) {
        self.pending = None;
    }

    /// Stage and commit a single selection in one step.
    pub fn apply(&mut self, key: FilterKey, value: FilterValue) {
        self.stage(key, value);
        self.commit();
    }

    pub fn remove(&mut self, key: &FilterKey) -> Option<FilterValue> {
        self.active.remove(key)
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.pending = None;
    }

    /// Drop every active and pending filter the profile does not allow.
    ///
    /// Returns the keys removed from the active set.
    pub fn retain_allowed(&mut self, profile: &VariantProfile) -> Vec<FilterKey> {
        let removed: Vec<FilterKey> = self
            .active
            .keys()
            .filter(|key| !profile.allows_filter(key))
            .cloned()
            .collect();
        for key in &removed {
            self.active.remove(key);
        }
        if let Some(pending) = self.pending.as_mut() {
            pending.retain(|key, _| profile.allows_filter(key));
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeoLevel;

    #[test]
    fn test_pending_changes_are_invisible_until_commit() {
        let mut state = FilterState::new();
        state.begin_edit();
        state.stage(FilterKey::question("GENDER"), FilterValue::set(["1"]));

        assert!(state.is_empty());
        assert!(state.commit());
        assert_eq!(
            state.get(&FilterKey::question("GENDER")),
            Some(&FilterValue::set(["1"]))
        );
        assert!(!state.commit());
    }

    #[test]
    fn test_discard_keeps_active() {
        let mut state = FilterState::new();
        state.apply(FilterKey::question("AGE"), FilterValue::range(18.0, 34.0));
        state.stage(FilterKey::question("AGE"), FilterValue::range(35.0, 64.0));
        state.discard();

        assert_eq!(
            state.get(&FilterKey::question("AGE")),
            Some(&FilterValue::range(18.0, 34.0))
        );
        assert!(!state.is_editing());
    }

    #[test]
    fn test_geographic_filters_are_exclusive() {
        let mut state = FilterState::new();
        state.apply(FilterKey::question("GENDER"), FilterValue::scalar("1"));
        state.apply(FilterKey::Geo(GeoLevel::District), FilterValue::scalar("3"));
        state.apply(FilterKey::Geo(GeoLevel::Neighborhood), FilterValue::set(["12"]));

        assert!(state.get(&FilterKey::Geo(GeoLevel::District)).is_none());
        assert!(state.get(&FilterKey::Geo(GeoLevel::Neighborhood)).is_some());
        assert!(state.get(&FilterKey::question("GENDER")).is_some());

        state.apply(FilterKey::Address, FilterValue::scalar("1 Main St 94110"));
        let geo_keys: Vec<_> = state.active().keys().filter(|k| k.is_geographic()).collect();
        assert_eq!(geo_keys, vec![&FilterKey::Address]);
    }

    #[test]
    fn test_vacuous_selection_removes_key() {
        let mut state = FilterState::new();
        state.apply(FilterKey::question("GENDER"), FilterValue::set(["1"]));
        state.apply(FilterKey::question("GENDER"), FilterValue::set(Vec::<String>::new()));
        assert!(state.is_empty());
    }

    #[test]
    fn test_remove_single_key() {
        let mut state = FilterState::new();
        state.apply(FilterKey::question("GENDER"), FilterValue::scalar("1"));
        state.apply(FilterKey::question("AGE"), FilterValue::range(18.0, 30.0));

        assert!(state.remove(&FilterKey::question("AGE")).is_some());
        assert_eq!(state.active().len(), 1);
    }

    #[test]
    fn test_retain_allowed_clears_disallowed_keys() {
        let mut state = FilterState::new();
        state.apply(FilterKey::question("ETHNICITY"), FilterValue::set(["2"]));
        state.apply(FilterKey::question("AGE"), FilterValue::range(18.0, 30.0));
        state.stage(FilterKey::Geo(GeoLevel::Region), FilterValue::scalar("1"));

        let profile = VariantProfile::with_filters([FilterKey::question("AGE")]);
        let removed = state.retain_allowed(&profile);

        assert_eq!(removed, vec![FilterKey::question("ETHNICITY")]);
        assert_eq!(state.active().len(), 1);
        assert_eq!(state.pending().map(|p| p.len()), Some(1));
    }
}
