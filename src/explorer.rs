//! Course explorer core: filter state, fetch planning, and pure view-model
//! rendering. Everything here is free of I/O; fetch work is expressed as
//! [`SearchPlan`] values the caller executes and feeds back through
//! `apply_search_outcome`.

mod controller;
mod state;
mod view_model;

pub use controller::{ExplorerController, SearchPlan};
pub use state::{FilterState, LIMIT_CAP, NEAR_END_THRESHOLD, PAGE_STEP};
pub use view_model::{
    CourseCard, ExplorerViewModel, LoadMoreControl, ScrollMetrics, gened_button_label, view_model,
};
