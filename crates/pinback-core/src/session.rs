//! Owns the filter state and both fetchers, and runs catalog requests off
//! the UI thread.
//!
//! The UI calls [`Session::apply`] (or one of the keyword helpers) on every
//! input event and [`Session::poll`] once per loop iteration. Requests run on
//! a tokio blocking pool; completions come back over a channel and are only
//! applied from `poll`/`wait`, so all state changes happen on the caller's
//! thread.

use crate::catalog::{Catalog, FetchError};
use crate::fetch::{Generation, Outcome, ResultFetcher, SuggestionFetcher, Ticket};
use crate::filter::{FilterAction, FilterState};
use crate::layout::{layout, Layout};
use crate::query::{compose_query, Query};
use crate::record::ImageRecord;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Delay between the last keystroke and the suggestion request.
    pub suggest_debounce: Duration,
    /// How long suggestions survive after the keyword field loses focus.
    pub blur_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            suggest_debounce: Duration::ZERO,
            blur_grace: Duration::from_millis(150),
        }
    }
}

#[derive(Debug)]
pub enum Completion {
    Images {
        generation: Generation,
        result: Result<Vec<ImageRecord>, FetchError>,
    },
    Suggestions {
        generation: Generation,
        result: Result<Vec<String>, FetchError>,
    },
}

pub struct Session {
    catalog: Arc<dyn Catalog>,
    runtime: Option<tokio::runtime::Runtime>,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    filters: FilterState,
    query: Query,
    results: ResultFetcher,
    suggestions: SuggestionFetcher,
}

impl Session {
    /// Start a session; the first image request goes out immediately.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        filters: FilterState,
        config: SessionConfig,
    ) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("pinback-fetch")
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::channel();
        let query = compose_query(&filters);
        let mut session = Self {
            catalog,
            runtime: Some(runtime),
            tx,
            rx,
            filters,
            query,
            results: ResultFetcher::new(),
            suggestions: SuggestionFetcher::new(config.suggest_debounce, config.blur_grace),
        };
        let ticket = session.results.force(&session.query);
        session.dispatch_images(ticket);
        Ok(session)
    }

    /// Apply one filter action; re-fetches only if the query changed.
    /// A keyword that becomes blank also drops the suggestion list.
    pub fn apply(&mut self, action: FilterAction) {
        let keyword_edit = matches!(action, FilterAction::SetKeyword(_));
        self.update_filters(action);
        if keyword_edit && self.filters.keyword().trim().is_empty() {
            self.suggestions.on_keyword_input("", Instant::now());
        }
    }

    /// Keyword typed into the search field.
    pub fn input_keyword(&mut self, text: &str) {
        self.update_filters(FilterAction::SetKeyword(text.to_string()));
        if let Some(ticket) = self.suggestions.on_keyword_input(text, Instant::now()) {
            self.dispatch_suggestions(ticket);
        }
    }

    /// Accept the suggestion at `index` as the keyword.
    pub fn accept_suggestion(&mut self, index: usize) -> Option<String> {
        let choice = self.suggestions.accept(index)?;
        self.update_filters(FilterAction::SetKeyword(choice.clone()));
        Some(choice)
    }

    pub fn focus_keyword(&mut self) {
        self.suggestions.focus();
    }

    pub fn blur_keyword(&mut self) {
        self.suggestions.blur(Instant::now());
    }

    /// Re-issue the current query even though it has not changed.
    pub fn refresh(&mut self) {
        let ticket = self.results.force(&self.query);
        self.dispatch_images(ticket);
    }

    /// Apply every completion that has arrived and run due timers.
    /// Returns true when visible state may have changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.tick();
        while let Ok(c) = self.rx.try_recv() {
            changed |= self.deliver(c) != Outcome::Stale;
        }
        changed
    }

    /// Block up to `timeout` for one completion and apply it. Timers that
    /// fall due meanwhile (debounced requests, blur clears) still run.
    pub fn wait(&mut self, timeout: Duration) -> Option<Outcome> {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick();
            let now = Instant::now();
            let mut slice = deadline.saturating_duration_since(now);
            if let Some(at) = self.next_deadline() {
                slice = slice.min(at.saturating_duration_since(now));
            }
            match self.rx.recv_timeout(slice) {
                Ok(c) => return Some(self.deliver(c)),
                Err(RecvTimeoutError::Timeout) if Instant::now() < deadline => {}
                Err(_) => return None,
            }
        }
    }

    /// Wait until the latest image and suggestion requests have resolved.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.results.in_flight() || self.suggestions.in_flight() {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return false;
            }
            self.wait(left);
        }
        true
    }

    /// Earliest instant a timer needs servicing.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.suggestions.next_deadline()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Debug rendering of the current request.
    pub fn request_description(&self) -> String {
        self.catalog.describe(&self.query)
    }

    pub fn records(&self) -> &[ImageRecord] {
        self.results.records()
    }

    pub fn loaded(&self) -> bool {
        self.results.loaded()
    }

    pub fn is_loading(&self) -> bool {
        self.results.in_flight()
    }

    pub fn suggestions(&self) -> &[String] {
        self.suggestions.items()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.results.last_error()
    }

    /// Failure of the latest suggestion request, if it failed.
    pub fn suggestion_error(&self) -> Option<&FetchError> {
        self.suggestions.last_error()
    }

    pub fn layout(&self) -> Layout<'_> {
        layout(
            self.results.records(),
            self.filters.render_mode(),
            self.filters.grid_size(),
            self.filters.real_life_scale(),
        )
    }

    fn update_filters(&mut self, action: FilterAction) {
        self.filters = self.filters.apply(action);
        self.query = compose_query(&self.filters);
        if let Some(ticket) = self.results.request(&self.query) {
            self.dispatch_images(ticket);
        }
    }

    fn tick(&mut self) -> bool {
        let had = self.suggestions.items().len();
        if let Some(ticket) = self.suggestions.tick(Instant::now()) {
            self.dispatch_suggestions(ticket);
        }
        had != self.suggestions.items().len()
    }

    fn deliver(&mut self, completion: Completion) -> Outcome {
        match completion {
            Completion::Images { generation, result } => self.results.complete(generation, result),
            Completion::Suggestions { generation, result } => {
                self.suggestions.complete(generation, result)
            }
        }
    }

    fn dispatch_images(&self, ticket: Ticket<Query>) {
        let Some(runtime) = &self.runtime else { return };
        debug!(generation = ticket.generation, request = %self.catalog.describe(&ticket.key), "fetching images");
        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        runtime.spawn_blocking(move || {
            let result = catalog.images(&ticket.key);
            let _ = tx.send(Completion::Images {
                generation: ticket.generation,
                result,
            });
        });
    }

    fn dispatch_suggestions(&self, ticket: Ticket<String>) {
        let Some(runtime) = &self.runtime else { return };
        debug!(generation = ticket.generation, prefix = %ticket.key, "fetching suggestions");
        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        runtime.spawn_blocking(move || {
            let result = catalog.suggestions(&ticket.key);
            let _ = tx.send(Completion::Suggestions {
                generation: ticket.generation,
                result,
            });
        });
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // A hung request must not keep the process alive.
        if let Some(rt) = self.runtime.take() {
            rt.shutdown_background();
        }
    }
}
