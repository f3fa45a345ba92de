use crate::model::SearchParams;

/// Fixed increment by which the result window grows per load-more action.
pub const PAGE_STEP: usize = 30;

/// Hard ceiling on the requested window size.
pub const LIMIT_CAP: usize = 120;

/// Scroll-position proximity to the end of the card strip (in scroll units)
/// that triggers automatic pagination.
pub const NEAR_END_THRESHOLD: usize = 200;

/// Filter and pagination state for the course explorer. Single instance,
/// owned by [`super::ExplorerController`]; every mutation goes through one of
/// the named entry points below and reports whether anything changed.
#[derive(Clone, Debug)]
pub struct FilterState {
    major: String,
    selected_geneds: Vec<String>,
    query: String,
    limit: usize,
    total_matches: usize,
    is_loading: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            major: "all".to_string(),
            selected_geneds: Vec::new(),
            query: String::new(),
            limit: PAGE_STEP,
            total_matches: 0,
            is_loading: false,
        }
    }
}

impl FilterState {
    pub fn major(&self) -> &str {
        &self.major
    }

    pub fn selected_geneds(&self) -> &[String] {
        &self.selected_geneds
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn more_available(&self, shown: usize) -> bool {
        self.total_matches > shown
    }

    pub(super) fn set_major(&mut self, major: &str) -> bool {
        let major = major.trim();
        let major = if major.is_empty() { "all" } else { major };
        if self.major == major {
            return false;
        }
        self.major = major.to_string();
        true
    }

    /// Appends in insertion order; duplicates are forbidden, so re-adding a
    /// selected value reports no change.
    pub(super) fn add_gened(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.selected_geneds.iter().any(|g| g == value) {
            return false;
        }
        self.selected_geneds.push(value.to_string());
        true
    }

    /// Removing a value that is not selected is a no-op.
    pub(super) fn remove_gened(&mut self, value: &str) -> bool {
        let before = self.selected_geneds.len();
        self.selected_geneds.retain(|g| g != value);
        self.selected_geneds.len() != before
    }

    pub(super) fn set_query(&mut self, query: &str) -> bool {
        let query = query.trim();
        if self.query == query {
            return false;
        }
        self.query = query.to_string();
        true
    }

    pub(super) fn reset_window(&mut self) {
        self.limit = PAGE_STEP;
    }

    pub(super) fn grow_window(&mut self) {
        self.limit = (self.limit + PAGE_STEP).min(LIMIT_CAP);
    }

    pub(super) fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub(super) fn set_total_matches(&mut self, total: usize) {
        self.total_matches = total;
    }

    /// Request parameters for the current filter set. The "all" sentinel,
    /// empty gen-ed set, and blank query are omitted rather than sent.
    pub fn snapshot_params(&self) -> SearchParams {
        SearchParams {
            major: (self.major != "all" && !self.major.is_empty()).then(|| self.major.clone()),
            geneds: (!self.selected_geneds.is_empty()).then(|| self.selected_geneds.join(",")),
            q: (!self.query.is_empty()).then(|| self.query.clone()),
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_unfiltered_first_page() {
        let state = FilterState::default();
        assert_eq!(state.major(), "all");
        assert_eq!(state.limit(), PAGE_STEP);
        assert!(!state.is_loading());
        let params = state.snapshot_params();
        assert_eq!(params.major, None);
        assert_eq!(params.geneds, None);
        assert_eq!(params.q, None);
        assert_eq!(params.limit, PAGE_STEP);
    }

    #[test]
    fn window_grows_by_step_and_caps() {
        let mut state = FilterState::default();
        state.grow_window();
        assert_eq!(state.limit(), 60);
        state.grow_window();
        state.grow_window();
        assert_eq!(state.limit(), LIMIT_CAP);
        state.grow_window();
        assert_eq!(state.limit(), LIMIT_CAP);
        state.reset_window();
        assert_eq!(state.limit(), PAGE_STEP);
    }

    #[test]
    fn gened_selection_preserves_order_and_forbids_duplicates() {
        let mut state = FilterState::default();
        assert!(state.add_gened("QR"));
        assert!(state.add_gened("Humanities"));
        assert!(!state.add_gened("QR"));
        assert_eq!(state.selected_geneds(), ["QR", "Humanities"]);

        assert!(state.remove_gened("QR"));
        assert!(!state.remove_gened("QR"));
        assert_eq!(state.selected_geneds(), ["Humanities"]);
    }

    #[test]
    fn snapshot_joins_geneds_and_trims_query() {
        let mut state = FilterState::default();
        state.set_major("CS");
        state.add_gened("QR");
        state.add_gened("Humanities");
        state.set_query("  data structures ");
        let params = state.snapshot_params();
        assert_eq!(params.major.as_deref(), Some("CS"));
        assert_eq!(params.geneds.as_deref(), Some("QR,Humanities"));
        assert_eq!(params.q.as_deref(), Some("data structures"));
    }

    #[test]
    fn blank_major_falls_back_to_the_sentinel() {
        let mut state = FilterState::default();
        assert!(state.set_major("CS"));
        assert!(state.set_major("  "));
        assert_eq!(state.major(), "all");
        assert!(state.snapshot_params().major.is_none());
    }
}
