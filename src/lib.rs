pub mod assistant;
pub mod explorer;
pub mod model;
pub mod remote;
pub mod tui;
pub mod tui_shell;
