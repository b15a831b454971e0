//! Address autocomplete.
//!
//! Lookups go to an external geocoding service that is rate-sensitive, so
//! callers route keystrokes through a [`SuggestionGate`]: input shorter than
//! the minimum length is ignored, a query is only issued once typing has
//! paused for the debounce interval, and results for anything but the most
//! recent input are discarded.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::errors::Result;
use crate::labels::{extract_zip, ZipDistrictTable};

pub const MIN_DEBOUNCE: Duration = Duration::from_millis(300);
pub const MIN_QUERY_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSuggestion {
    pub display_name: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

pub trait AddressSuggester {
    fn suggest(&self, partial_address: &str) -> Result<Vec<AddressSuggestion>>;
}

/// Identifies one issued lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub ticket: Ticket,
    pub query: String,
}

#[derive(Debug, Clone)]
struct PendingInput {
    query: String,
    typed_at: Instant,
}

/// Debounce and last-request-wins bookkeeping for one input field.
#[derive(Debug, Clone)]
pub struct SuggestionGate {
    debounce: Duration,
    min_len: usize,
    generation: u64,
    pending: Option<PendingInput>,
}

impl Default for SuggestionGate {
    fn default() -> Self {
        Self::new(MIN_DEBOUNCE, MIN_QUERY_LEN)
    }
}

impl SuggestionGate {
    /// Values below the service limits are raised to them.
    pub fn new(debounce: Duration, min_len: usize) -> Self {
        Self {
            debounce: debounce.max(MIN_DEBOUNCE),
            min_len: min_len.max(MIN_QUERY_LEN),
            generation: 0,
            pending: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Record a keystroke. Any lookup already in flight becomes stale.
    pub fn input(&mut self, query: &str, now: Instant) {
        self.generation += 1;
        let query = query.trim();
        self.pending = if query.chars().count() >= self.min_len {
            Some(PendingInput {
                query: query.to_string(),
                typed_at: now,
            })
        } else {
            None
        };
    }

    /// The lookup to issue now, if typing has paused long enough.
    pub fn poll(&mut self, now: Instant) -> Option<SuggestionRequest> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.typed_at) >= self.debounce);
        if !ready {
            return None;
        }
        self.pending.take().map(|p| SuggestionRequest {
            ticket: Ticket(self.generation),
            query: p.query,
        })
    }

    /// Whether results for `ticket` still reflect the latest input.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Keep results only if no newer input arrived since they were requested.
    pub fn accept(
        &self,
        ticket: Ticket,
        results: Vec<AddressSuggestion>,
    ) -> Option<Vec<AddressSuggestion>> {
        if self.is_current(ticket) {
            Some(results)
        } else {
            log::debug!(
                "Discarding stale suggestions (ticket {}, current {})",
                ticket.0,
                self.generation
            );
            None
        }
    }
}

/// Offline suggester over the zip -> district table.
///
/// Matches postal codes that start with the digits typed so far.
#[derive(Debug, Clone)]
pub struct ZipSuggester<'a> {
    zips: &'a ZipDistrictTable,
    limit: usize,
}

impl<'a> ZipSuggester<'a> {
    pub fn new(zips: &'a ZipDistrictTable, limit: usize) -> Self {
        Self { zips, limit }
    }
}

impl AddressSuggester for ZipSuggester<'_> {
    fn suggest(&self, partial_address: &str) -> Result<Vec<AddressSuggestion>> {
        let prefix: String = match extract_zip(partial_address) {
            Some(zip) => zip.to_string(),
            None => partial_address
                .split_whitespace()
                .last()
                .unwrap_or("")
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect(),
        };
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .zips
            .iter()
            .filter(|(zip, _)| zip.starts_with(&prefix))
            .take(self.limit)
            .map(|(zip, district)| AddressSuggestion {
                display_name: format!("{zip} (district {district})"),
                postal_code: Some(zip.to_string()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_limits_are_clamped() {
        let gate = SuggestionGate::new(ms(50), 1);
        assert_eq!(gate.debounce(), MIN_DEBOUNCE);
        assert_eq!(gate.min_len(), MIN_QUERY_LEN);
    }

    #[test]
    fn test_short_input_is_ignored() {
        let start = Instant::now();
        let mut gate = SuggestionGate::default();
        gate.input("12", start);
        assert_eq!(gate.poll(start + ms(1000)), None);
    }

    #[test]
    fn test_waits_for_typing_pause() {
        let start = Instant::now();
        let mut gate = SuggestionGate::default();
        gate.input("941", start);
        gate.input("9411", start + ms(200));

        assert_eq!(gate.poll(start + ms(400)), None);

        let request = gate.poll(start + ms(500)).unwrap();
        assert_eq!(request.query, "9411");
        // Issued once only.
        assert_eq!(gate.poll(start + ms(900)), None);
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let start = Instant::now();
        let mut gate = SuggestionGate::default();
        gate.input("941", start);
        let first = gate.poll(start + ms(300)).unwrap();

        gate.input("9410", start + ms(350));
        let second = gate.poll(start + ms(700)).unwrap();

        let hit = vec![AddressSuggestion {
            display_name: "x".into(),
            postal_code: None,
        }];
        assert_eq!(gate.accept(first.ticket, hit.clone()), None);
        assert_eq!(gate.accept(second.ticket, hit.clone()), Some(hit));
    }

    #[test]
    fn test_zip_suggester_prefix_match() {
        let zips: ZipDistrictTable = [("94110", "9"), ("94103", "6"), ("10001", "1")]
            .into_iter()
            .collect();
        let suggester = ZipSuggester::new(&zips, 10);

        let found = suggester.suggest("Main St 941").unwrap();
        let codes: Vec<_> = found.iter().filter_map(|s| s.postal_code.as_deref()).collect();
        assert_eq!(codes, vec!["94103", "94110"]);
        assert_eq!(found[1].display_name, "94110 (district 9)");

        assert!(suggester.suggest("Main St").unwrap().is_empty());
    }
}
