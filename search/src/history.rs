use crate::debounce::Debouncer;
use crate::filters::FilterState;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::trace;

pub const SUMMARY_SEPARATOR: &str = " · ";
pub const GENERAL_SEARCH_LABEL: &str = "Búsqueda general";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub timestamp: OffsetDateTime,
    pub filters: FilterState,
    pub result_count: usize,
    pub summary: String,
}

/// Records settled searches: a snapshot is only written once the filters have
/// stayed unchanged for the whole quiet period.
pub struct HistoryTracker {
    channel: Debouncer<FilterState>,
    entries: Vec<SearchHistoryEntry>,
}

impl HistoryTracker {
    pub fn new(delay: Duration) -> Self {
        Self {
            channel: Debouncer::new(delay),
            entries: Vec::new(),
        }
    }

    /// Feeds the latest committed state. A state without search criteria
    /// cancels any pending snapshot. Returns whether a snapshot is now armed.
    pub fn observe(&mut self, state: &FilterState, now: Instant) -> bool {
        if !state.has_search_criteria() {
            self.channel.cancel();
            return false;
        }
        self.channel.schedule(state.clone(), now);
        true
    }

    /// Appends the pending snapshot once its quiet period has elapsed.
    /// `result_count` is the size of the filtered list at commit time.
    pub fn poll(&mut self, now: Instant, result_count: usize) -> Option<&SearchHistoryEntry> {
        let filters = self.channel.poll(now)?;
        let entry = SearchHistoryEntry {
            timestamp: OffsetDateTime::now_utc(),
            summary: summarize(&filters),
            filters,
            result_count,
        };
        trace!(summary = %entry.summary, "recorded search history entry");
        self.entries.push(entry);
        self.entries.last()
    }

    pub fn cancel(&mut self) -> bool {
        self.channel.cancel().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.channel.is_pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.channel.deadline()
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &SearchHistoryEntry> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&SearchHistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Human-readable description of a filter state, most significant facet
/// first. Positions and the favorites toggle are not described.
pub fn summarize(state: &FilterState) -> String {
    let mut parts: Vec<String> = Vec::new();
    for value in [
        &state.search_query,
        &state.selected_brand,
        &state.selected_model,
        &state.selected_year,
    ] {
        if let Some(value) = non_empty(value) {
            parts.push(value.to_string());
        }
    }
    if let Some(oem) = non_empty(&state.oem_reference) {
        parts.push(format!("OEM: {oem}"));
    }
    if let Some(fmsi) = non_empty(&state.fmsi_reference) {
        parts.push(format!("FMSI: {fmsi}"));
    }
    let width = state.width.trim();
    let height = state.height.trim();
    if !width.is_empty() || !height.is_empty() {
        parts.push(format!("{width}x{height}"));
    }
    if parts.is_empty() {
        return GENERAL_SEARCH_LABEL.to_string();
    }
    parts.join(SUMMARY_SEPARATOR)
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;
    use pretty_assertions::assert_eq;

    const DELAY: Duration = Duration::from_millis(1500);

    fn brand(value: &str) -> FilterState {
        FilterState {
            selected_brand: value.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn restarts_produce_exactly_one_entry() {
        let mut tracker = HistoryTracker::new(DELAY);
        let start = Instant::now();
        assert!(tracker.observe(&brand("f"), start));
        tracker.observe(&brand("fo"), start + Duration::from_millis(1000));
        tracker.observe(&brand("ford"), start + Duration::from_millis(1400));

        assert!(tracker.poll(start + Duration::from_millis(2000), 3).is_none());
        let entry = tracker
            .poll(start + Duration::from_millis(2900), 3)
            .expect("settled entry")
            .clone();
        assert_eq!(entry.summary, "ford");
        assert_eq!(entry.result_count, 3);
        assert_eq!(entry.filters, brand("ford"));
        assert!(tracker.poll(start + Duration::from_secs(10), 3).is_none());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn empty_criteria_cancel_pending_snapshot() {
        let mut tracker = HistoryTracker::new(DELAY);
        let start = Instant::now();
        tracker.observe(&brand("ford"), start);
        let favorites_only = FilterState {
            show_favorites_only: true,
            ..Default::default()
        };
        assert!(!tracker.observe(&favorites_only, start + Duration::from_millis(500)));
        assert!(!tracker.is_pending());
        assert!(tracker.poll(start + DELAY * 2, 1).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn entries_are_newest_first() {
        let mut tracker = HistoryTracker::new(DELAY);
        let start = Instant::now();
        tracker.observe(&brand("ford"), start);
        tracker.poll(start + DELAY, 1);
        tracker.observe(&brand("kia"), start + DELAY);
        tracker.poll(start + DELAY * 2, 2);
        let summaries: Vec<&str> = tracker.entries().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, vec!["kia", "ford"]);
        assert_eq!(tracker.latest().map(|e| e.result_count), Some(2));
    }

    #[test]
    fn summary_orders_facets_and_labels_references() {
        let state = FilterState {
            search_query: "pastilla".to_string(),
            selected_brand: "Toyota".to_string(),
            selected_model: "Yaris".to_string(),
            selected_year: "2008".to_string(),
            oem_reference: "04465".to_string(),
            fmsi_reference: "D1210".to_string(),
            width: "100".to_string(),
            height: "45".to_string(),
            selected_positions: vec![Position::Front],
            show_favorites_only: true,
        };
        assert_eq!(
            summarize(&state),
            "pastilla · Toyota · Yaris · 2008 · OEM: 04465 · FMSI: D1210 · 100x45"
        );
    }

    #[test]
    fn summary_falls_back_to_general_label() {
        let positions_only = FilterState {
            selected_positions: vec![Position::Rear],
            ..Default::default()
        };
        assert_eq!(summarize(&positions_only), GENERAL_SEARCH_LABEL);
        let width_only = FilterState {
            width: "98".to_string(),
            ..Default::default()
        };
        assert_eq!(summarize(&width_only), "98x");
    }

    #[test]
    fn entry_serializes_with_camel_case_keys() {
        let mut tracker = HistoryTracker::new(DELAY);
        let start = Instant::now();
        tracker.observe(&brand("ford"), start);
        let entry = tracker.poll(start + DELAY, 4).expect("entry").clone();
        let value = serde_json::to_value(&entry).expect("serialize entry");
        assert_eq!(value["resultCount"], 4);
        assert_eq!(value["filters"]["selectedBrand"], "ford");
        assert_eq!(value["summary"], "ford");
    }
}
