use std::io::{self, IsTerminal};
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::assistant::RecommendationPanel;
use crate::explorer::{ExplorerController, ScrollMetrics};
use crate::remote::CatalogClient;
use crate::tui::TuiRunOptions;

use super::input::Input;
use super::worker::{self, Job, Outcome};

pub(super) const CARD_WIDTH: u16 = 34;
pub(super) const CARD_GAP: u16 = 2;
/// One card width plus gap, the unit both scroll buttons move by.
pub(super) const CARD_STEP: usize = (CARD_WIDTH + CARD_GAP) as usize;

/// Checkbox options for the recommendation form's priority group.
pub(super) const PRIORITY_OPTIONS: &[&str] = &[
    "Light workload",
    "Highly rated professors",
    "Fulfills gen eds",
    "Career preparation",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Focus {
    Major,
    GenEds,
    Search,
    Cards,
    Assistant,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Major => Focus::GenEds,
            Focus::GenEds => Focus::Search,
            Focus::Search => Focus::Cards,
            Focus::Cards => Focus::Assistant,
            Focus::Assistant => Focus::Major,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Major => Focus::Assistant,
            Focus::GenEds => Focus::Major,
            Focus::Search => Focus::GenEds,
            Focus::Cards => Focus::Search,
            Focus::Assistant => Focus::Cards,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum FormRow {
    Major,
    Goals,
    Priorities,
    Submit,
}

pub(super) fn run(opts: TuiRunOptions) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("TUI requires an interactive terminal (TTY)");
    }

    let client = CatalogClient::new(&opts.base_url)?;

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut app = App::new(client, opts.debounce);
    let res = run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

pub(super) struct App {
    pub(super) controller: ExplorerController,
    pub(super) panel: RecommendationPanel,

    pub(super) base_url: String,

    jobs: Sender<Job>,
    outcomes: Receiver<Outcome>,

    pub(super) focus: Focus,

    pub(super) gened_panel_open: bool,
    pub(super) gened_cursor: usize,
    pub(super) chip_cursor: usize,

    pub(super) search_input: Input,

    pub(super) form_row: FormRow,
    pub(super) form_major_index: usize,
    pub(super) goals_input: Input,
    pub(super) priority_cursor: usize,
    pub(super) priorities_selected: Vec<bool>,

    pub(super) scroll_offset: usize,
    // Card-strip viewport width in scroll units, recorded on each draw.
    pub(super) strip_viewport: usize,

    quit: bool,
}

impl App {
    fn new(client: CatalogClient, debounce: Duration) -> Self {
        let base_url = client.base_url().to_string();
        let (jobs, outcomes) = worker::spawn(client);
        // Metadata first; the initial search is chained off its completion.
        jobs.send(Job::Meta).ok();

        Self {
            controller: ExplorerController::new(debounce),
            panel: RecommendationPanel::default(),
            base_url,
            jobs,
            outcomes,
            focus: Focus::Major,
            gened_panel_open: false,
            gened_cursor: 0,
            chip_cursor: 0,
            search_input: Input::default(),
            form_row: FormRow::Major,
            form_major_index: 0,
            goals_input: Input::default(),
            priority_cursor: 0,
            priorities_selected: vec![false; PRIORITY_OPTIONS.len()],
            scroll_offset: 0,
            strip_viewport: 0,
            quit: false,
        }
    }

    pub(super) fn scroll_metrics(&self) -> ScrollMetrics {
        let cards = self.controller.courses().len();
        let content = (cards * CARD_STEP).saturating_sub(CARD_GAP as usize);
        ScrollMetrics {
            offset: self.scroll_offset,
            viewport: self.strip_viewport,
            content,
        }
    }

    fn send_search(&mut self, plan: crate::explorer::SearchPlan) {
        if self.jobs.send(Job::Search(plan)).is_err() {
            log::warn!("fetch worker is gone; search dropped");
        }
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.scroll_metrics().max_offset());
    }

    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            match outcome {
                Outcome::Meta(result) => {
                    self.controller.apply_meta_outcome(result);
                    if let Some(plan) = self.controller.initial_search() {
                        self.send_search(plan);
                    }
                }
                Outcome::Search { generation, result } => {
                    if let Some(follow) = self.controller.apply_search_outcome(generation, result) {
                        self.send_search(follow);
                    }
                    self.clamp_scroll();
                }
                Outcome::Recommendation(result) => self.panel.apply_outcome(result),
            }
        }
    }

    fn typing(&self) -> bool {
        self.focus == Focus::Search
            || (self.focus == Focus::Assistant && self.form_row == FormRow::Goals)
    }
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.drain_outcomes();
        if let Some(plan) = app.controller.poll_debounce(Instant::now()) {
            app.send_search(plan);
        }

        terminal
            .draw(|f| super::render::draw(f, app))
            .context("draw")?;
        if app.quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(50)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => handle_key(app, k),
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => {
            if app.gened_panel_open {
                // Close without side effects.
                app.gened_panel_open = false;
            } else if app.panel.is_active() {
                app.panel.dismiss();
            } else {
                app.quit = true;
            }
            return;
        }
        KeyCode::Tab => {
            app.gened_panel_open = false;
            app.focus = app.focus.next();
            return;
        }
        KeyCode::BackTab => {
            app.gened_panel_open = false;
            app.focus = app.focus.prev();
            return;
        }
        KeyCode::Char('q') if !app.typing() => {
            app.quit = true;
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::Major => handle_major_key(app, key),
        Focus::GenEds => handle_gened_key(app, key),
        Focus::Search => handle_search_key(app, key),
        Focus::Cards => handle_cards_key(app, key),
        Focus::Assistant => handle_assistant_key(app, key),
    }
}

fn handle_major_key(app: &mut App, key: KeyEvent) {
    let step: isize = match key.code {
        KeyCode::Left | KeyCode::Up => -1,
        KeyCode::Right | KeyCode::Down => 1,
        _ => return,
    };
    let options = app.controller.major_options();
    let current = options
        .iter()
        .position(|m| m == app.controller.state().major())
        .unwrap_or(0);
    let len = options.len() as isize;
    let next = ((current as isize + step).rem_euclid(len)) as usize;
    if let Some(plan) = app.controller.set_major(&options[next]) {
        app.send_search(plan);
    }
}

fn handle_gened_key(app: &mut App, key: KeyEvent) {
    if app.gened_panel_open {
        let options = app.controller.gened_options().to_vec();
        match key.code {
            KeyCode::Up => app.gened_cursor = app.gened_cursor.saturating_sub(1),
            KeyCode::Down => {
                app.gened_cursor = (app.gened_cursor + 1).min(options.len().saturating_sub(1));
            }
            KeyCode::Enter => {
                let Some(value) = options.get(app.gened_cursor) else {
                    return;
                };
                let selected = app
                    .controller
                    .state()
                    .selected_geneds()
                    .iter()
                    .any(|g| g == value);
                let plan = if selected {
                    // Remove affordance: the panel stays open.
                    app.controller.remove_gened(value)
                } else {
                    app.gened_panel_open = false;
                    app.controller.add_gened(value)
                };
                if let Some(plan) = plan {
                    app.send_search(plan);
                }
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => {
            app.gened_panel_open = true;
            app.gened_cursor = 0;
        }
        KeyCode::Left => app.chip_cursor = app.chip_cursor.saturating_sub(1),
        KeyCode::Right => {
            let chips = app.controller.state().selected_geneds().len();
            app.chip_cursor = (app.chip_cursor + 1).min(chips.saturating_sub(1));
        }
        KeyCode::Backspace | KeyCode::Delete | KeyCode::Char('x') => {
            let chips = app.controller.state().selected_geneds();
            let Some(value) = chips.get(app.chip_cursor).cloned() else {
                return;
            };
            if let Some(plan) = app.controller.remove_gened(&value) {
                app.send_search(plan);
            }
            let remaining = app.controller.state().selected_geneds().len();
            app.chip_cursor = app.chip_cursor.min(remaining.saturating_sub(1));
        }
        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_input.insert_char(c);
        }
        KeyCode::Backspace => app.search_input.backspace(),
        KeyCode::Delete => app.search_input.delete(),
        KeyCode::Left => {
            app.search_input.move_left();
            return;
        }
        KeyCode::Right => {
            app.search_input.move_right();
            return;
        }
        _ => return,
    }
    let text = app.search_input.buf.clone();
    if let Some(plan) = app.controller.query_edited(&text, Instant::now()) {
        app.send_search(plan);
    }
}

fn handle_cards_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left => {
            app.scroll_offset = app.scroll_offset.saturating_sub(CARD_STEP);
        }
        KeyCode::Right => {
            let max = app.scroll_metrics().max_offset();
            app.scroll_offset = (app.scroll_offset + CARD_STEP).min(max);
        }
        KeyCode::Enter => {
            // The load-more control.
            if let Some(plan) = app.controller.load_more() {
                app.send_search(plan);
            }
            return;
        }
        _ => return,
    }
    // Scroll moved: near-end proximity may trigger automatic pagination.
    let metrics = app.scroll_metrics();
    if let Some(plan) = app.controller.scroll_near_end(&metrics) {
        app.send_search(plan);
    }
}

fn handle_assistant_key(app: &mut App, key: KeyEvent) {
    if app.panel.is_active() && key.code == KeyCode::Char('x') && app.form_row != FormRow::Goals {
        app.panel.dismiss();
        return;
    }

    match key.code {
        KeyCode::Up => {
            app.form_row = match app.form_row {
                FormRow::Major => FormRow::Major,
                FormRow::Goals => FormRow::Major,
                FormRow::Priorities => FormRow::Goals,
                FormRow::Submit => FormRow::Priorities,
            };
            return;
        }
        KeyCode::Down => {
            app.form_row = match app.form_row {
                FormRow::Major => FormRow::Goals,
                FormRow::Goals => FormRow::Priorities,
                FormRow::Priorities => FormRow::Submit,
                FormRow::Submit => FormRow::Submit,
            };
            return;
        }
        _ => {}
    }

    match app.form_row {
        FormRow::Major => {
            let step: isize = match key.code {
                KeyCode::Left => -1,
                KeyCode::Right => 1,
                _ => return,
            };
            let len = app.controller.major_options().len() as isize;
            app.form_major_index =
                ((app.form_major_index as isize + step).rem_euclid(len)) as usize;
        }
        FormRow::Goals => match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.goals_input.insert_char(c);
            }
            KeyCode::Backspace => app.goals_input.backspace(),
            KeyCode::Delete => app.goals_input.delete(),
            KeyCode::Left => app.goals_input.move_left(),
            KeyCode::Right => app.goals_input.move_right(),
            _ => {}
        },
        FormRow::Priorities => match key.code {
            KeyCode::Left => app.priority_cursor = app.priority_cursor.saturating_sub(1),
            KeyCode::Right => {
                app.priority_cursor = (app.priority_cursor + 1).min(PRIORITY_OPTIONS.len() - 1);
            }
            KeyCode::Char(' ') => {
                if let Some(flag) = app.priorities_selected.get_mut(app.priority_cursor) {
                    *flag = !*flag;
                }
            }
            _ => {}
        },
        FormRow::Submit => {
            if key.code != KeyCode::Enter {
                return;
            }
            let options = app.controller.major_options();
            let major = options
                .get(app.form_major_index)
                .cloned()
                .unwrap_or_else(|| "all".to_string());
            // Checkbox order is display order.
            let priorities: Vec<String> = PRIORITY_OPTIONS
                .iter()
                .zip(&app.priorities_selected)
                .filter(|(_, on)| **on)
                .map(|(name, _)| name.to_string())
                .collect();
            let request = app
                .panel
                .submit(&major, app.goals_input.buf.trim(), &priorities);
            if app.jobs.send(Job::Recommend(request)).is_err() {
                log::warn!("fetch worker is gone; recommendation dropped");
            }
        }
    }
}
