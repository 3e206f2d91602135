//! Filterable, sortable in-memory collection with generation-tagged refreshes.
//!
//! `source` is the last accepted fetch (kept in the current sort order); the visible
//! subset is always re-derived from it, never from a previous visible subset.

use crate::domain::DomainError;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::fmt;

/// A row the catalog can search, bound by dates, and sort.
pub trait CatalogRecord {
    type SortKey: Copy + Eq + fmt::Debug;

    /// True when any searchable field contains `needle` (already lower-cased).
    fn matches(&self, needle: &str) -> bool;

    fn start(&self) -> DateTime<Utc>;

    fn end(&self) -> DateTime<Utc>;

    /// Field-native ascending order for `key`.
    fn compare(&self, other: &Self, key: Self::SortKey) -> Ordering;
}

/// Case-insensitive substring test used by `CatalogRecord::matches` impls.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
}

/// Current search term and inclusive calendar-day bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub start_bound: Option<NaiveDate>,
    pub end_bound: Option<NaiveDate>,
}

impl FilterState {
    fn accepts<R: CatalogRecord>(&self, record: &R, needle: &str) -> bool {
        let matches_search = needle.is_empty() || record.matches(needle);
        let after_start = self
            .start_bound
            .is_none_or(|day| record.start() >= day_start(day));
        let before_end = self
            .end_bound
            .is_none_or(|day| record.end() <= day_start(day));
        matches_search && after_start && before_end
    }
}

/// A calendar day as the UTC-midnight instant.
fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

/// Proof that a refresh was dispatched; answers are accepted only for the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a refresh ticket must be completed or aborted"]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Collection with a frozen source and a derived visible subset.
#[derive(Debug)]
pub struct Catalog<R: CatalogRecord> {
    name: &'static str,
    source: Vec<R>,
    visible: Vec<usize>,
    filter: FilterState,
    sort: Option<SortState<R::SortKey>>,
    generation: u64,
    in_flight: Option<u64>,
    stale: bool,
}

impl<R: CatalogRecord> Catalog<R> {
    /// An empty catalog that needs its first fetch. `name` is used in logs and errors.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            source: Vec::new(),
            visible: Vec::new(),
            filter: FilterState::default(),
            sort: None,
            generation: 0,
            in_flight: None,
            stale: true,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Records in current sort order, ignoring filters.
    pub fn source(&self) -> &[R] {
        &self.source
    }

    /// Records passing the current filters, in current sort order.
    pub fn visible(&self) -> Vec<&R> {
        self.visible.iter().map(|&i| &self.source[i]).collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort_state(&self) -> Option<SortState<R::SortKey>> {
        self.sort
    }

    /// True until a fetch lands, and again after `mark_stale`.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Replace all filter criteria and recompute the visible subset from the source.
    pub fn apply_filters(
        &mut self,
        search: &str,
        start_bound: Option<NaiveDate>,
        end_bound: Option<NaiveDate>,
    ) -> Vec<&R> {
        self.filter = FilterState {
            search: search.to_string(),
            start_bound,
            end_bound,
        };
        self.rederive();
        self.visible()
    }

    /// Change only the search term.
    pub fn set_search(&mut self, search: &str) -> Vec<&R> {
        let (start, end) = (self.filter.start_bound, self.filter.end_bound);
        self.apply_filters(search, start, end)
    }

    /// Change only the date bounds.
    pub fn set_date_bounds(
        &mut self,
        start_bound: Option<NaiveDate>,
        end_bound: Option<NaiveDate>,
    ) -> Vec<&R> {
        let search = std::mem::take(&mut self.filter.search);
        self.apply_filters(&search, start_bound, end_bound)
    }

    /// Sort the whole source by `key`. The same key again flips the direction;
    /// a different key starts ascending. The visible subset is re-derived.
    pub fn sort_by(&mut self, key: R::SortKey) -> SortState<R::SortKey> {
        let state = match self.sort {
            Some(current) if current.key == key => {
                // Reversing keeps the flip an exact mirror, ties included.
                self.source.reverse();
                SortState {
                    key,
                    direction: current.direction.toggled(),
                }
            }
            _ => {
                self.source.sort_by(|a, b| a.compare(b, key));
                SortState {
                    key,
                    direction: SortDirection::Ascending,
                }
            }
        };
        self.sort = Some(state);
        self.rederive();
        state
    }

    /// Start a refresh. Only one may be in flight per catalog.
    pub fn begin_refresh(&mut self) -> Result<RefreshTicket, DomainError> {
        if self.in_flight.is_some() {
            return Err(DomainError::Busy(self.name));
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        Ok(RefreshTicket {
            generation: self.generation,
        })
    }

    /// Apply a fetch result if `ticket` is still current. Returns false when the
    /// answer was stale and discarded.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, records: Vec<R>) -> bool {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }
        if ticket.generation != self.generation {
            tracing::debug!(
                catalog = self.name,
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale refresh"
            );
            return false;
        }
        self.replace_source(records);
        self.stale = false;
        true
    }

    /// Release the in-flight slot after a failed fetch. Data is left untouched.
    pub fn abort_refresh(&mut self, ticket: RefreshTicket) {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }
    }

    /// Flag the data as outdated. Outstanding tickets become stale.
    pub fn mark_stale(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.stale = true;
    }

    fn replace_source(&mut self, mut records: Vec<R>) {
        if let Some(SortState { key, direction }) = self.sort {
            records.sort_by(|a, b| a.compare(b, key));
            if direction == SortDirection::Descending {
                records.reverse();
            }
        }
        self.source = records;
        self.rederive();
    }

    fn rederive(&mut self) {
        let needle = self.filter.search.trim().to_lowercase();
        self.visible = self
            .source
            .iter()
            .enumerate()
            .filter(|(_, r)| self.filter.accepts(*r, &needle))
            .map(|(i, _)| i)
            .collect();
    }
}
