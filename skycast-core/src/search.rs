//! Debounced location-search controller.
//!
//! The controller is a plain state machine driven by caller-supplied
//! instants, so the debounce and staleness rules can be tested without
//! a timer. `settle` supplies real time for interactive use.

use std::time::{Duration, Instant};

use crate::{model::Location, provider::Geocoder};

/// Quiet period required after the last keystroke before a lookup is
/// issued.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Debouncing,
    Resolved,
}

/// A lookup issued for the text present when a debounce window
/// elapsed. The ticket orders lookups so a slow earlier response can be
/// recognized as stale.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub query: String,
    ticket: u64,
}

#[derive(Debug)]
pub struct SearchBox {
    query: String,
    phase: SearchPhase,
    open: bool,
    results: Vec<Location>,
    deadline: Option<Instant>,
    last_ticket: u64,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBox {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            phase: SearchPhase::Idle,
            open: false,
            results: Vec::new(),
            deadline: None,
            last_ticket: 0,
        }
    }

    /// Record a keystroke. Non-blank text (re)arms the debounce window;
    /// blank text clears results and closes the dropdown without ever
    /// reaching the network.
    pub fn input(&mut self, text: &str, now: Instant) {
        self.query = text.to_string();

        if self.query.trim().is_empty() {
            self.results.clear();
            self.open = false;
            self.phase = SearchPhase::Idle;
            self.deadline = None;
            return;
        }

        self.phase = SearchPhase::Debouncing;
        self.deadline = Some(now + DEBOUNCE_WINDOW);
    }

    /// Issue the pending lookup once the window has elapsed with no
    /// further input. At most one lookup per pause in typing.
    pub fn poll(&mut self, now: Instant) -> Option<Lookup> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }

        self.deadline = None;
        self.last_ticket += 1;
        Some(Lookup {
            query: self.query.clone(),
            ticket: self.last_ticket,
        })
    }

    /// Apply a lookup's results. Stale responses are discarded: the
    /// lookup must be the latest issued and its text must still match
    /// the current query. Returns whether the results were applied.
    pub fn apply_results(&mut self, lookup: &Lookup, results: Vec<Location>) -> bool {
        if lookup.ticket != self.last_ticket || lookup.query != self.query {
            tracing::debug!("discarding stale search results for '{}'", lookup.query);
            return false;
        }

        self.results = results;
        self.phase = SearchPhase::Resolved;
        self.open = true;
        true
    }

    /// Close the dropdown (outside interaction), keeping the query and
    /// results.
    pub fn dismiss(&mut self) {
        self.open = false;
    }

    /// Take the chosen candidate, clearing the query and closing the
    /// dropdown.
    pub fn select(&mut self, index: usize) -> Option<Location> {
        let chosen = self.results.get(index).cloned()?;
        self.query.clear();
        self.results.clear();
        self.open = false;
        self.phase = SearchPhase::Idle;
        self.deadline = None;
        Some(chosen)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn results(&self) -> &[Location] {
        &self.results
    }

    pub fn has_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Wait out the pending window, then run the lookup through the
    /// geocoder and apply it.
    pub async fn settle(&mut self, geocoder: &dyn Geocoder) {
        while let Some(deadline) = self.deadline {
            let now = Instant::now();
            if now < deadline {
                tokio::time::sleep(deadline - now).await;
                continue;
            }

            if let Some(lookup) = self.poll(now) {
                let results = geocoder.search_locations(&lookup.query).await;
                self.apply_results(&lookup, results);
            }
        }
    }
}
