use std::time::{Duration, Instant};

use anyhow::Result;

use crate::model::{CatalogMeta, Course, FALLBACK_GENED_OPTIONS, SearchParams, SearchResponse};

use super::state::FilterState;
use super::view_model::{ExplorerViewModel, ScrollMetrics};

/// A search fetch the caller should execute. Carries the request generation
/// captured at dispatch time so a completion that arrives after the filters
/// have moved on can be recognized as stale and discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchPlan {
    pub generation: u64,
    pub params: SearchParams,
}

#[derive(Clone, Debug)]
struct PendingQuery {
    text: String,
    due: Instant,
}

/// Owns the filter/pagination state machine. Event entry points return
/// `Option<SearchPlan>`; `None` means the trigger was absorbed (no-op,
/// debounced, or dropped because a fetch is already in flight).
pub struct ExplorerController {
    state: FilterState,
    courses: Vec<Course>,
    generation: u64,
    // A filter change landed while a fetch was in flight; refetch once the
    // stale completion comes back.
    pending_refetch: bool,
    scroll_loading: bool,
    load_failed: bool,
    debounce: Duration,
    pending_query: Option<PendingQuery>,
    departments: Vec<String>,
    gened_options: Vec<String>,
}

impl ExplorerController {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: FilterState::default(),
            courses: Vec::new(),
            generation: 0,
            pending_refetch: false,
            scroll_loading: false,
            load_failed: false,
            debounce,
            pending_query: None,
            departments: Vec::new(),
            gened_options: FALLBACK_GENED_OPTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn scroll_loading(&self) -> bool {
        self.scroll_loading
    }

    /// Departments for the major selector, "all" sentinel first.
    pub fn major_options(&self) -> Vec<String> {
        let mut options = vec!["all".to_string()];
        options.extend(self.departments.iter().cloned());
        options
    }

    pub fn gened_options(&self) -> &[String] {
        &self.gened_options
    }

    fn begin_fetch(&mut self) -> SearchPlan {
        self.state.set_loading(true);
        SearchPlan {
            generation: self.generation,
            params: self.state.snapshot_params(),
        }
    }

    // Shared tail of every filter mutation: window reset, generation bump,
    // then fetch now or coalesce behind the in-flight request.
    fn filter_changed(&mut self) -> Option<SearchPlan> {
        self.state.reset_window();
        self.generation += 1;
        if self.state.is_loading() {
            self.pending_refetch = true;
            return None;
        }
        Some(self.begin_fetch())
    }

    /// First fetch at startup, dispatched after the metadata fetch settles.
    pub fn initial_search(&mut self) -> Option<SearchPlan> {
        if self.state.is_loading() {
            return None;
        }
        Some(self.begin_fetch())
    }

    pub fn set_major(&mut self, major: &str) -> Option<SearchPlan> {
        if !self.state.set_major(major) {
            return None;
        }
        self.filter_changed()
    }

    pub fn add_gened(&mut self, value: &str) -> Option<SearchPlan> {
        if !self.state.add_gened(value) {
            return None;
        }
        self.filter_changed()
    }

    pub fn remove_gened(&mut self, value: &str) -> Option<SearchPlan> {
        if !self.state.remove_gened(value) {
            return None;
        }
        self.filter_changed()
    }

    /// Applies a query edit immediately, bypassing the debounce stage.
    pub fn set_query(&mut self, query: &str) -> Option<SearchPlan> {
        if !self.state.set_query(query) {
            return None;
        }
        self.filter_changed()
    }

    /// Free-text edits pass through a debounce stage; with a zero interval
    /// every keystroke dispatches immediately.
    pub fn query_edited(&mut self, text: &str, now: Instant) -> Option<SearchPlan> {
        if self.debounce.is_zero() {
            return self.set_query(text);
        }
        self.pending_query = Some(PendingQuery {
            text: text.to_string(),
            due: now + self.debounce,
        });
        None
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.pending_query.as_ref().map(|p| p.due)
    }

    /// Called on event-loop ticks; emits at most one plan per edit burst.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<SearchPlan> {
        let due = self.pending_query.as_ref()?.due;
        if now < due {
            return None;
        }
        let pending = self.pending_query.take()?;
        self.set_query(&pending.text)
    }

    /// Load-more control: grows the window by one page step, capped. No-op
    /// while loading, after a failure, or once everything is shown.
    pub fn load_more(&mut self) -> Option<SearchPlan> {
        if self.state.is_loading()
            || self.load_failed
            || !self.state.more_available(self.courses.len())
        {
            return None;
        }
        self.state.grow_window();
        Some(self.begin_fetch())
    }

    /// Scroll-threshold trigger. Dropped (not queued) while a fetch is in
    /// flight; otherwise behaves like load-more and raises the distinct
    /// scroll-loading indicator.
    pub fn scroll_near_end(&mut self, metrics: &ScrollMetrics) -> Option<SearchPlan> {
        if self.state.is_loading() || self.load_failed {
            return None;
        }
        if !metrics.near_end(super::NEAR_END_THRESHOLD) {
            return None;
        }
        if !self.state.more_available(self.courses.len()) {
            return None;
        }
        self.scroll_loading = true;
        self.state.grow_window();
        Some(self.begin_fetch())
    }

    /// Completion of a search fetch. A stale generation leaves the rendered
    /// window untouched; the return value is the coalesced follow-up fetch to
    /// dispatch, if a filter change arrived while this one was in flight.
    pub fn apply_search_outcome(
        &mut self,
        generation: u64,
        outcome: Result<SearchResponse>,
    ) -> Option<SearchPlan> {
        self.state.set_loading(false);
        self.scroll_loading = false;

        if generation != self.generation {
            log::debug!(
                "discarding stale search window (generation {} < {})",
                generation,
                self.generation
            );
            if self.pending_refetch {
                self.pending_refetch = false;
                return Some(self.begin_fetch());
            }
            return None;
        }
        self.pending_refetch = false;

        match outcome {
            Ok(resp) => {
                self.load_failed = false;
                self.state.set_total_matches(resp.matches);
                self.courses = resp.results;
            }
            Err(err) => {
                log::warn!("course search failed: {err:#}");
                self.load_failed = true;
                self.courses.clear();
            }
        }
        None
    }

    /// Metadata completion. Failure keeps the static fallback options.
    pub fn apply_meta_outcome(&mut self, outcome: Result<CatalogMeta>) {
        match outcome {
            Ok(meta) => {
                self.departments = meta.departments;
                if !meta.geneds.is_empty() {
                    self.gened_options = meta.geneds;
                }
            }
            Err(err) => log::warn!("catalog meta fetch failed: {err:#}"),
        }
    }

    pub fn view_model(&self, scroll: &ScrollMetrics) -> ExplorerViewModel {
        super::view_model(
            &self.state,
            &self.courses,
            self.load_failed,
            self.scroll_loading,
            scroll,
        )
    }
}
