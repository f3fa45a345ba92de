use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::assistant::{self, PanelState, RecommendationOutcome};
use crate::explorer::ExplorerViewModel;

use super::app::{App, CARD_STEP, CARD_WIDTH, Focus, FormRow, PRIORITY_OPTIONS};

pub(super) fn draw(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(10),
            Constraint::Length(1),
        ])
        .split(f.area());

    // The strip viewport feeds the scroll metrics the core reasons about.
    app.strip_viewport = rows[1].width.saturating_sub(2) as usize;
    let metrics = app.scroll_metrics();
    let vm = app.controller.view_model(&metrics);

    draw_filter_bar(f, rows[0], app, &vm);
    draw_card_strip(f, rows[1], app, &vm);
    f.render_widget(
        Paragraph::new(vm.summary.clone()).style(Style::default().fg(Color::Gray)),
        rows[2],
    );
    draw_load_more_row(f, rows[3], app, &vm);
    draw_assistant(f, rows[4], app);
    draw_status(f, rows[5], app);

    if app.gened_panel_open {
        draw_gened_panel(f, rows[1], app);
    }
}

fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw_filter_bar(f: &mut Frame, area: Rect, app: &App, vm: &ExplorerViewModel) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(45),
            Constraint::Percentage(30),
        ])
        .split(area);

    let major = Paragraph::new(format!("\u{2039} {} \u{203a}", app.controller.state().major()))
        .block(focus_block("Major", app.focus == Focus::Major));
    f.render_widget(major, cols[0]);

    let mut spans = vec![Span::raw(vm.gened_button_label.clone())];
    let chips = app.controller.state().selected_geneds();
    if !chips.is_empty() {
        spans.push(Span::raw("  "));
        for (i, chip) in chips.iter().enumerate() {
            let style = if app.focus == Focus::GenEds && !app.gened_panel_open && i == app.chip_cursor
            {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::Cyan)
            };
            spans.push(Span::styled(format!(" {chip} \u{2715} "), style));
        }
    }
    let geneds = Paragraph::new(Line::from(spans))
        .block(focus_block("Gen eds", app.focus == Focus::GenEds));
    f.render_widget(geneds, cols[1]);

    let search = Paragraph::new(app.search_input.buf.clone())
        .block(focus_block("Search", app.focus == Focus::Search));
    f.render_widget(search, cols[2]);
}

fn draw_card_strip(f: &mut Frame, area: Rect, app: &App, vm: &ExplorerViewModel) {
    let outer = focus_block("Courses", app.focus == Focus::Cards);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    if let Some(message) = &vm.empty_state {
        let empty = Paragraph::new(message.clone())
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true });
        f.render_widget(empty, inner);
        return;
    }

    for (i, card) in vm.cards.iter().enumerate() {
        let x = (i * CARD_STEP) as isize - app.scroll_offset as isize;
        if x < 0 || x + CARD_WIDTH as isize > inner.width as isize {
            continue;
        }
        let slot = Rect {
            x: inner.x + x as u16,
            y: inner.y,
            width: CARD_WIDTH,
            height: inner.height,
        };

        let mut lines = vec![
            Line::from(Span::styled(
                card.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("{} \u{00b7} {} hrs", card.department, card.credit_label)),
        ];
        if !card.gen_ed_tags.is_empty() {
            lines.push(Line::from(Span::styled(
                card.gen_ed_tags.join(", "),
                Style::default().fg(Color::Cyan),
            )));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            card.blurb.clone(),
            Style::default().fg(Color::Gray),
        )));

        let body = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(card.code.clone()))
            .wrap(Wrap { trim: true });
        f.render_widget(body, slot);
    }
}

fn draw_load_more_row(f: &mut Frame, area: Rect, app: &App, vm: &ExplorerViewModel) {
    let arrow = |enabled: bool, glyph: &str| {
        Span::styled(
            glyph.to_string(),
            if enabled {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        )
    };

    let label_style = if vm.load_more.enabled {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
        arrow(vm.scroll_left_enabled, "\u{2039}\u{2039}"),
        Span::raw("  "),
        Span::styled(format!("[ {} ]", vm.load_more.label), label_style),
        Span::raw("  "),
        arrow(vm.scroll_right_enabled, "\u{203a}\u{203a}"),
    ];
    if vm.scroll_loading_visible {
        spans.push(Span::styled(
            "  loading more courses\u{2026}",
            Style::default().fg(Color::Gray),
        ));
    }
    if app.focus == Focus::Cards {
        spans.push(Span::styled(
            "  (\u{2190}/\u{2192} scroll, Enter load more)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn form_row_style(app: &App, row: FormRow) -> Style {
    if app.focus == Focus::Assistant && app.form_row == row {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_assistant(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let options = app.controller.major_options();
    let form_major = options
        .get(app.form_major_index)
        .map(String::as_str)
        .unwrap_or("all");

    let mut priority_spans = vec![Span::raw("Priorities: ")];
    for (i, name) in PRIORITY_OPTIONS.iter().enumerate() {
        let mark = if app.priorities_selected[i] { "[x]" } else { "[ ]" };
        let mut style = Style::default();
        if app.focus == Focus::Assistant
            && app.form_row == FormRow::Priorities
            && i == app.priority_cursor
        {
            style = Style::default().fg(Color::Yellow);
        }
        priority_spans.push(Span::styled(format!("{mark} {name}  "), style));
    }

    let lines = vec![
        Line::from(Span::styled(
            format!("Major: \u{2039} {form_major} \u{203a}"),
            form_row_style(app, FormRow::Major),
        )),
        Line::from(Span::styled(
            format!("Goals: {}", app.goals_input.buf),
            form_row_style(app, FormRow::Goals),
        )),
        Line::from(priority_spans),
        Line::raw(""),
        Line::from(Span::styled(
            "[ Get recommendations ]",
            form_row_style(app, FormRow::Submit),
        )),
    ];
    let form = Paragraph::new(lines)
        .block(focus_block("AI Assistant", app.focus == Focus::Assistant))
        .wrap(Wrap { trim: true });
    f.render_widget(form, cols[0]);

    draw_assistant_output(f, cols[1], app);
}

fn draw_assistant_output(f: &mut Frame, area: Rect, app: &App) {
    let (title, mut lines, style) = match app.panel.state() {
        PanelState::Hidden => (
            "Recommendations",
            vec![Line::from(Span::styled(
                "Submit the form for personalized course suggestions.",
                Style::default().fg(Color::DarkGray),
            ))],
            Style::default(),
        ),
        PanelState::Loading => (
            "Recommendations",
            vec![Line::raw(assistant::LOADING_MESSAGE)],
            Style::default().fg(Color::Gray),
        ),
        PanelState::Ready(RecommendationOutcome::Structured(advice)) => {
            let mut lines = Vec::new();
            for item in advice {
                lines.push(Line::from(vec![
                    Span::styled(
                        item.course.clone(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(": "),
                    Span::raw(item.reason.clone()),
                ]));
                lines.push(Line::from(Span::styled(
                    format!("  {}", item.detail_path),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            (assistant::PANEL_TITLE, lines, Style::default())
        }
        PanelState::Ready(RecommendationOutcome::Opaque(text)) => (
            assistant::PANEL_TITLE,
            vec![Line::raw(text.clone())],
            Style::default(),
        ),
        PanelState::Failed(message) => (
            assistant::FAILURE_TITLE,
            vec![Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red),
            ))],
            Style::default(),
        ),
    };

    if app.panel.is_active() && !matches!(app.panel.state(), PanelState::Loading) {
        lines.push(Line::from(Span::styled(
            "x: close",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let output = Paragraph::new(lines)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    f.render_widget(output, area);
}

fn draw_gened_panel(f: &mut Frame, strip: Rect, app: &App) {
    let options = app.controller.gened_options();
    let width = strip.width.min(44).max(20);
    let height = (options.len() as u16 + 2).min(strip.height);
    let panel = Rect {
        x: strip.x + 1,
        y: strip.y,
        width,
        height,
    };
    f.render_widget(Clear, panel);

    let selected = app.controller.state().selected_geneds();
    let items: Vec<ListItem> = options
        .iter()
        .map(|option| {
            let mark = if selected.iter().any(|g| g == option) {
                "\u{2713}"
            } else {
                " "
            };
            ListItem::new(format!("{mark} {option}"))
        })
        .collect();

    let mut state = ListState::default();
    if !options.is_empty() {
        state.select(Some(app.gened_cursor.min(options.len() - 1)));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title("Add gen ed requirement"),
        )
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow));
    f.render_stateful_widget(list, panel, &mut state);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let clock = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::styled(
            " coursedeck ",
            Style::default().fg(Color::Black).bg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(app.base_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw("  Tab: next pane  q: quit  "),
        Span::styled(clock, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
