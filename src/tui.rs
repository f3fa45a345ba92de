use std::time::Duration;

use anyhow::Result;

#[derive(Clone, Debug)]
pub struct TuiRunOptions {
    pub base_url: String,
    /// Quiet period between free-text edits and the search dispatch; zero
    /// reproduces fetch-per-keystroke behavior.
    pub debounce: Duration,
}

impl Default for TuiRunOptions {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            debounce: Duration::from_millis(250),
        }
    }
}

pub fn run_with_options(opts: TuiRunOptions) -> Result<()> {
    crate::tui_shell::run(opts)
}
