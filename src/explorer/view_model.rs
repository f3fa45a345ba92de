use crate::model::Course;

use super::state::FilterState;

pub const EMPTY_STATE_MESSAGE: &str =
    "No courses match those filters yet. Try broadening your search.";
pub const LOAD_ERROR_MESSAGE: &str =
    "We hit a snag loading courses. Refresh or adjust filters to retry.";
pub const LOADING_SUMMARY: &str = "Loading explorer data...";
pub const FAILURE_SUMMARY: &str = "Unable to load courses right now. Please try again soon.";

pub const LOAD_MORE_IDLE: &str = "Load more courses";
pub const LOAD_MORE_LOADING: &str = "Loading\u{2026}";
pub const LOAD_MORE_EXHAUSTED: &str = "All results loaded";

/// Horizontal scroll position of the card strip, in scroll units. Supplied by
/// the presentation layer; the core only reasons about offsets.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollMetrics {
    pub offset: usize,
    pub viewport: usize,
    pub content: usize,
}

impl ScrollMetrics {
    pub fn max_offset(&self) -> usize {
        self.content.saturating_sub(self.viewport)
    }

    pub fn near_end(&self, threshold: usize) -> bool {
        self.offset + self.viewport + threshold >= self.content
    }
}

/// One rendered course card, in server-returned order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCard {
    pub code: String,
    pub name: String,
    pub department: String,
    pub credit_label: String,
    pub gen_ed_tags: Vec<String>,
    pub blurb: String,
    pub detail_path: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadMoreControl {
    pub enabled: bool,
    pub label: String,
}

/// Everything the presentation layer needs to paint the explorer; computed as
/// a pure function of state, data, and scroll metrics.
#[derive(Clone, Debug)]
pub struct ExplorerViewModel {
    pub cards: Vec<CourseCard>,
    pub empty_state: Option<String>,
    pub summary: String,
    pub load_more: LoadMoreControl,
    pub gened_button_label: String,
    pub scroll_left_enabled: bool,
    pub scroll_right_enabled: bool,
    pub scroll_loading_visible: bool,
}

pub fn view_model(
    state: &FilterState,
    courses: &[Course],
    load_failed: bool,
    scroll_loading: bool,
    scroll: &ScrollMetrics,
) -> ExplorerViewModel {
    let cards: Vec<CourseCard> = courses.iter().map(card).collect();
    let shown = cards.len();

    let (summary, empty_state, load_more) = if state.is_loading() {
        // Non-destructive: keep the current cards visible while loading.
        (
            LOADING_SUMMARY.to_string(),
            None,
            LoadMoreControl {
                enabled: false,
                label: LOAD_MORE_LOADING.to_string(),
            },
        )
    } else if load_failed {
        (
            FAILURE_SUMMARY.to_string(),
            Some(LOAD_ERROR_MESSAGE.to_string()),
            LoadMoreControl {
                enabled: false,
                label: LOAD_MORE_IDLE.to_string(),
            },
        )
    } else {
        let empty = (shown == 0).then(|| EMPTY_STATE_MESSAGE.to_string());
        (
            summary_text(state, shown),
            empty,
            load_more_control(state, shown),
        )
    };

    ExplorerViewModel {
        cards,
        empty_state,
        summary,
        load_more,
        gened_button_label: gened_button_label(state.selected_geneds().len()),
        scroll_left_enabled: scroll.offset > 0,
        scroll_right_enabled: scroll.offset < scroll.max_offset(),
        scroll_loading_visible: scroll_loading,
    }
}

fn card(course: &Course) -> CourseCard {
    CourseCard {
        code: course.course_code.clone(),
        name: course.course_name.clone(),
        department: course.department.clone(),
        credit_label: course.credit_label(),
        gen_ed_tags: course.gen_ed_tags(),
        blurb: course.blurb(),
        detail_path: course.detail_path(),
    }
}

fn load_more_control(state: &FilterState, shown: usize) -> LoadMoreControl {
    if state.total_matches() == 0 {
        return LoadMoreControl {
            enabled: false,
            label: LOAD_MORE_IDLE.to_string(),
        };
    }
    let more = state.more_available(shown);
    LoadMoreControl {
        enabled: more,
        label: if more { LOAD_MORE_IDLE } else { LOAD_MORE_EXHAUSTED }.to_string(),
    }
}

/// Human-readable clause listing the active filters, then one of three
/// sentences depending on how the total relates to what is shown.
fn summary_text(state: &FilterState, shown: usize) -> String {
    let mut filters = Vec::new();
    if !state.major().is_empty() && state.major() != "all" {
        filters.push(format!("{} major", state.major()));
    }
    if !state.selected_geneds().is_empty() {
        let names = state.selected_geneds().join(", ");
        let plural = if state.selected_geneds().len() > 1 { "s" } else { "" };
        filters.push(format!("{names} gen ed{plural}"));
    }
    if !state.query().is_empty() {
        filters.push(format!("\"{}\"", state.query()));
    }

    let clause = if filters.is_empty() {
        String::new()
    } else {
        format!(" matching {}", filters.join(" + "))
    };

    let total = state.total_matches();
    if total == 0 {
        format!("No courses{clause} found. Try adjusting your filters.")
    } else if total <= shown {
        let plural = if shown == 1 { "" } else { "s" };
        format!("Showing {shown} course{plural}{clause} (all results).")
    } else {
        format!("Showing {shown} of {total} courses{clause}.")
    }
}

pub fn gened_button_label(selected: usize) -> String {
    match selected {
        0 => "Add gen ed requirement".to_string(),
        1 => "1 gen ed selected".to_string(),
        n => format!("{n} gen eds selected"),
    }
}
