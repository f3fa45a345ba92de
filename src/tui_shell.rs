//! Thin presentation layer: projects the explorer and assistant view-models
//! onto a ratatui terminal. All state lives in the core modules; this layer
//! only maps key events to controller entry points and paints the results.

use anyhow::Result;

mod app;
mod input;
mod render;
mod worker;

pub fn run(opts: crate::tui::TuiRunOptions) -> Result<()> {
    app::run(opts)
}
