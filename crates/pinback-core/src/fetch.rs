//! Last-request-wins bookkeeping for the result and suggestion fetchers.
//!
//! Neither fetcher performs I/O. They hand out [`Ticket`]s for requests that
//! must be issued and accept completions tagged with the ticket's generation;
//! anything that is not the latest generation is discarded.

use crate::catalog::FetchError;
use crate::query::Query;
use crate::record::ImageRecord;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub type Generation = u64;

/// Monotonic request counter.
#[derive(Debug, Default, Clone)]
pub struct RequestTracker {
    latest: Generation,
}

impl RequestTracker {
    pub fn issue(&mut self) -> Generation {
        self.latest += 1;
        self.latest
    }

    /// Make every outstanding generation stale without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.latest
    }

    pub fn latest(&self) -> Generation {
        self.latest
    }
}

/// A request the caller must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub generation: Generation,
    pub key: K,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The completion replaced the held data.
    Applied,
    /// A newer request was issued since; the completion was dropped.
    Stale,
    /// The latest request failed; the held data is unchanged.
    Failed,
}

#[derive(Debug, Default)]
pub struct ResultFetcher {
    tracker: RequestTracker,
    issued: Option<Query>,
    in_flight: bool,
    records: Vec<ImageRecord>,
    loaded: bool,
    last_error: Option<FetchError>,
}

impl ResultFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for `query` unless it is the query last issued.
    pub fn request(&mut self, query: &Query) -> Option<Ticket<Query>> {
        if self.issued.as_ref() == Some(query) {
            return None;
        }
        Some(self.force(query))
    }

    /// Ticket for `query` even if it equals the last one.
    pub fn force(&mut self, query: &Query) -> Ticket<Query> {
        let generation = self.tracker.issue();
        self.issued = Some(query.clone());
        self.in_flight = true;
        Ticket {
            generation,
            key: query.clone(),
        }
    }

    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<Vec<ImageRecord>, FetchError>,
    ) -> Outcome {
        if !self.tracker.is_current(generation) {
            debug!(generation, latest = self.tracker.latest(), "discarding stale image response");
            return Outcome::Stale;
        }
        self.in_flight = false;
        match result {
            Ok(records) => {
                debug!(generation, count = records.len(), "image response applied");
                self.records = records;
                self.loaded = true;
                self.last_error = None;
                Outcome::Applied
            }
            Err(e) => {
                warn!(generation, error = %e, "error fetching images");
                self.last_error = Some(e);
                Outcome::Failed
            }
        }
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    /// True once any response has been applied.
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }
}

#[derive(Debug)]
pub struct SuggestionFetcher {
    tracker: RequestTracker,
    items: Vec<String>,
    debounce: Duration,
    blur_grace: Duration,
    pending: Option<(String, Instant)>,
    clear_at: Option<Instant>,
    in_flight: bool,
    last_error: Option<FetchError>,
}

impl Default for SuggestionFetcher {
    fn default() -> Self {
        Self::new(Duration::ZERO, Duration::from_millis(150))
    }
}

impl SuggestionFetcher {
    pub fn new(debounce: Duration, blur_grace: Duration) -> Self {
        Self {
            tracker: RequestTracker::default(),
            items: Vec::new(),
            debounce,
            blur_grace,
            pending: None,
            clear_at: None,
            in_flight: false,
            last_error: None,
        }
    }

    /// Keyword text changed. Empty text clears the list at once.
    pub fn on_keyword_input(&mut self, text: &str, now: Instant) -> Option<Ticket<String>> {
        self.clear_at = None;
        let text = text.trim();
        if text.is_empty() {
            self.clear();
            return None;
        }
        if self.debounce.is_zero() {
            self.pending = None;
            return Some(self.issue(text.to_string()));
        }
        self.pending = Some((text.to_string(), now + self.debounce));
        None
    }

    /// Take the suggestion at `index`; the list is cleared.
    pub fn accept(&mut self, index: usize) -> Option<String> {
        let choice = self.items.get(index).cloned()?;
        self.clear();
        Some(choice)
    }

    /// Input lost focus; clear after the grace delay.
    pub fn blur(&mut self, now: Instant) {
        self.clear_at = Some(now + self.blur_grace);
    }

    pub fn focus(&mut self) {
        self.clear_at = None;
    }

    /// Run whatever is due at `now`: a blur-clear or a debounced request.
    pub fn tick(&mut self, now: Instant) -> Option<Ticket<String>> {
        if self.clear_at.is_some_and(|at| at <= now) {
            self.clear();
            return None;
        }
        match self.pending.take() {
            Some((text, due)) if due <= now => Some(self.issue(text)),
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let pending = self.pending.as_ref().map(|(_, due)| *due);
        match (pending, self.clear_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<Vec<String>, FetchError>,
    ) -> Outcome {
        if !self.tracker.is_current(generation) {
            debug!(generation, latest = self.tracker.latest(), "discarding stale suggestions");
            return Outcome::Stale;
        }
        self.in_flight = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.last_error = None;
                Outcome::Applied
            }
            Err(e) => {
                warn!(generation, error = %e, "error fetching suggestions");
                self.last_error = Some(e);
                Outcome::Failed
            }
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// True while the latest request is unanswered or a debounced one is queued.
    pub fn in_flight(&self) -> bool {
        self.in_flight || self.pending.is_some()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    fn issue(&mut self, text: String) -> Ticket<String> {
        self.in_flight = true;
        Ticket {
            generation: self.tracker.issue(),
            key: text,
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.pending = None;
        self.clear_at = None;
        self.in_flight = false;
        self.tracker.invalidate();
    }
}
