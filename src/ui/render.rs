use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use chrono::{Datelike, NaiveDate};

use crate::models::session::Fulfillment;
use crate::session::draft::{SessionDraft, TimeChoice, TIME_PRESETS};
use crate::session::history::{self, CalendarCell, HeatLevel};
use crate::session::lifecycle::{FocusRun, HistoryView, Phase, ReflectionForm};
use crate::ui::app::{App, ReflectionField, SetupField};
use crate::ui::format::{fulfillment_color, format_countdown, format_minutes, heat_color, session_count_label};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn draw(app: &App, f: &mut Frame) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(1)].as_ref())
        .split(size);

    let (status, keys) = match app.controller.phase() {
        Phase::Setup(_) => (
            "Set your intention".to_string(),
            "[Tab/↑↓] Field  [←→] Choose  [Enter] Next/Begin  [F2] History  [Esc] Quit",
        ),
        Phase::Focus(run) => (
            format!(
                "{} - {} left",
                if run.running { "Focusing" } else { "Paused" },
                format_countdown(app.controller.time_left_secs().unwrap_or(0))
            ),
            "[Space/p] Pause/Resume  [e] End session  [Ctrl+C] Quit",
        ),
        Phase::Reflection(_) => (
            "Reflect on the session".to_string(),
            "[Tab/↑↓] Field  [1-4/←→] Fulfillment  [Enter] Next/Save",
        ),
        Phase::History { view, .. } => (
            match view.selected_date {
                Some(date) => format!("History - {}", date.format("%B %-d, %Y")),
                None => format!("History - {}", view.month.label()),
            },
            "[←→↑↓] Day  [PgUp/PgDn] Month  [Enter] Open day  [Esc] Back",
        ),
    };
    let status = match app.logs.last() {
        Some(last) => format!("{} | {}", status, last),
        None => status,
    };

    let status_widget = Paragraph::new(status)
        .block(Block::default().borders(Borders::ALL).title("Purpose Anchor"));
    f.render_widget(status_widget, chunks[0]);

    match app.controller.phase() {
        Phase::Setup(draft) => draw_setup(app, draft, f, chunks[1]),
        Phase::Focus(run) => draw_focus(run, f, chunks[1]),
        Phase::Reflection(form) => draw_reflection(app, form, f, chunks[1]),
        Phase::History { view, .. } => draw_history(app, view, f, chunks[1]),
    }

    let help = Paragraph::new(keys).style(Style::default().fg(Color::Gray));
    f.render_widget(help, chunks[2]);
}

fn field_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn text_input(value: &str, placeholder: &str, active: bool) -> Line<'static> {
    let mut spans = vec![Span::raw("    ")];
    if value.is_empty() && !active {
        spans.push(Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray)));
    } else {
        spans.push(Span::styled(value.to_string(), Style::default().fg(Color::White)));
    }
    if active {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn label(text: &str, active: bool) -> Line<'static> {
    let prefix = if active { "→ " } else { "  " };
    Line::from(format!("{}{}", prefix, text)).style(field_style(active))
}

fn preset_label(minutes: u32) -> String {
    match minutes {
        60 => "1 hour".to_string(),
        m if m % 60 == 0 => format!("{} hours", m / 60),
        m => format!("{} min", m),
    }
}

fn draw_setup(app: &App, draft: &SessionDraft, f: &mut Frame, area: Rect) {
    let field = app.setup_field;
    let mut lines = vec![Line::from("")];

    lines.push(label("Session length", field == SetupField::Duration));
    let mut choices: Vec<(String, TimeChoice)> = TIME_PRESETS
        .iter()
        .map(|m| (preset_label(*m), TimeChoice::Preset(*m)))
        .collect();
    choices.push(("Custom".to_string(), TimeChoice::Custom));
    let mut spans = vec![Span::raw("    ")];
    for (text, choice) in choices {
        let style = if draft.time_choice == choice {
            Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", text), style));
        spans.push(Span::raw(" "));
    }
    lines.push(Line::from(spans));

    if draft.time_choice == TimeChoice::Custom {
        let active = field == SetupField::CustomTime;
        lines.push(label("Custom minutes", active));
        lines.push(text_input(&draft.custom_time, "Minutes", active));
    }
    lines.push(Line::from(""));

    let active = field == SetupField::SessionType;
    lines.push(label("Session type", active));
    let type_text = draft
        .session_type
        .map(|t| t.label().to_string())
        .unwrap_or_else(|| "Select session type...".to_string());
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled(format!("◀ {} ▶", type_text), field_style(active)),
    ]));
    lines.push(Line::from(""));

    let active = field == SetupField::Focus;
    lines.push(label("What are you working on?", active));
    lines.push(text_input(&draft.session_focus, "Describe what you'll be working on...", active));
    lines.push(Line::from(""));

    let active = field == SetupField::Purpose;
    lines.push(label("Why does this work matter beyond me?", active));
    lines.push(text_input(
        &draft.purpose,
        "Connect this to your team, customers, family, faith, or long-term goals...",
        active,
    ));
    lines.push(Line::from(""));

    let active = field == SetupField::Outcome;
    lines.push(label("If you accomplish just one thing this session, what should it be?", active));
    lines.push(text_input(&draft.outcome, "Be specific and concrete...", active));
    lines.push(Line::from(""));

    let begin_style = if draft.can_start() {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let prefix = if field == SetupField::Begin { "→ " } else { "  " };
    lines.push(Line::from(vec![
        Span::styled(prefix, field_style(field == SetupField::Begin)),
        Span::styled("  Begin Session  ", begin_style),
    ]));

    let sessions = app.controller.sessions();
    if !sessions.is_empty() {
        let summary = history::summarize(sessions, app.controller.today());
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "  {} completed · {} day streak · [F2] History",
            session_count_label(summary.total_sessions),
            summary.current_streak
        )).style(Style::default().fg(Color::Cyan)));
    }

    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("🎯 New Focus Session"))
        .wrap(Wrap { trim: false });
    f.render_widget(form, area);
}

fn draw_focus(run: &FocusRun, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(3), Constraint::Min(1)].as_ref())
        .split(area);

    let clock_style = if run.running {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let mut clock_lines = vec![
        Line::from(""),
        Line::from(format_countdown(run.time_left_secs)).style(clock_style),
    ];
    if !run.running {
        clock_lines.push(Line::from("paused").style(Style::default().fg(Color::Gray)));
    }
    let clock = Paragraph::new(clock_lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("⏳ Focus"));
    f.render_widget(clock, chunks[0]);

    let total = u64::from(run.plan.planned_minutes) * 60;
    let elapsed = total.saturating_sub(u64::from(run.time_left_secs));
    let ratio = if total == 0 { 0.0 } else { (elapsed as f64 / total as f64).clamp(0.0, 1.0) };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Blue))
        .ratio(ratio)
        .label(format!("{} of {}", format_minutes((elapsed / 60) as u32), format_minutes(run.plan.planned_minutes)));
    f.render_widget(gauge, chunks[1]);

    let details = vec![
        Line::from(vec![
            Span::styled("Type:    ", Style::default().fg(Color::Gray)),
            Span::raw(run.plan.session_type.label()),
        ]),
        Line::from(vec![
            Span::styled("Focus:   ", Style::default().fg(Color::Gray)),
            Span::raw(run.plan.session_focus.clone()),
        ]),
        Line::from(vec![
            Span::styled("Outcome: ", Style::default().fg(Color::Gray)),
            Span::raw(run.plan.outcome.clone()),
        ]),
        Line::from(vec![
            Span::styled("Purpose: ", Style::default().fg(Color::Gray)),
            Span::raw(run.plan.purpose.clone()),
        ]),
        Line::from(""),
        Line::from("\"This hour is an act of worship, craft, and contribution.\"")
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
    ];
    let details = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title("Intention"))
        .wrap(Wrap { trim: true });
    f.render_widget(details, chunks[2]);
}

fn draw_reflection(app: &App, form: &ReflectionForm, f: &mut Frame, area: Rect) {
    let field = app.reflection_field;
    let mut lines = vec![
        Line::from(""),
        Line::from(format!(
            "  You focused for {} of {} on: {}",
            format_minutes(form.completed_minutes()),
            format_minutes(form.plan.planned_minutes),
            form.plan.outcome
        )),
        Line::from(""),
    ];

    let active = field == ReflectionField::Fulfilled;
    lines.push(label("Did you fulfill your intended outcome?", active));
    for (idx, option) in Fulfillment::ALL.iter().enumerate() {
        let selected = form.fulfilled == Some(*option);
        let marker = if selected { "(•)" } else { "( )" };
        let mut style = Style::default().fg(fulfillment_color(*option));
        if active && idx == app.fulfillment_cursor {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        lines.push(Line::from(vec![
            Span::raw(format!("    {} {} ", idx + 1, marker)),
            Span::styled(option.label(), style),
        ]));
    }
    lines.push(Line::from(""));

    let active = field == ReflectionField::Reflection;
    lines.push(label("How did this session move you toward your long-term direction?", active));
    lines.push(text_input(
        &form.reflection,
        "What did you learn? How will you adjust course for next time?",
        active,
    ));
    lines.push(Line::from(""));

    let save_style = if form.fulfilled.is_some() {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let active = field == ReflectionField::Save;
    lines.push(Line::from(vec![
        Span::styled(if active { "→ " } else { "  " }, field_style(active)),
        Span::styled("  Complete & Start New Session  ", save_style),
    ]));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("🪞 Reflection"))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn draw_history(app: &App, view: &HistoryView, f: &mut Frame, area: Rect) {
    if let Some(date) = view.selected_date {
        draw_day_detail(app, date, f, area);
        return;
    }

    let sessions = app.controller.sessions();
    if sessions.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("No sessions yet. Start your first purposeful session!"),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("📅 History"));
        f.render_widget(empty, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)].as_ref())
        .split(area);

    draw_calendar(app, view, f, chunks[0]);
    draw_recent_sessions(app, f, chunks[1]);
}

fn draw_calendar(app: &App, view: &HistoryView, f: &mut Frame, area: Rect) {
    let sessions = app.controller.sessions();
    let today = app.controller.today();
    let summary = history::summarize(sessions, today);

    let mut lines = vec![
        Line::from(format!("◀ {} ▶", view.month.label())).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(format!(
            "{} · {} focused · {} days · {} day streak",
            session_count_label(summary.total_sessions),
            format_minutes(u32::try_from(summary.total_focus_minutes).unwrap_or(u32::MAX)),
            summary.active_days,
            summary.current_streak
        ))
        .style(Style::default().fg(Color::Cyan)),
        Line::from(""),
        Line::from(WEEKDAYS.iter().map(|d| format!("{:>4}", &d[..2])).collect::<String>())
            .style(Style::default().fg(Color::Gray)),
    ];

    let cells = history::calendar_days(view.month.year, view.month.month);
    for week in cells.chunks(7) {
        let spans: Vec<Span> = week
            .iter()
            .map(|cell| match cell {
                CalendarCell::Blank => Span::raw("    "),
                CalendarCell::Day(date) => {
                    let count = history::session_count_for_date(sessions, *date);
                    let level = history::heat_level(count);
                    let fg = if level == HeatLevel::Empty { Color::Gray } else { Color::White };
                    let mut style = Style::default().fg(fg).bg(heat_color(level));
                    if view.cursor_date() == Some(*date) {
                        style = style.bg(Color::Yellow).fg(Color::Black).add_modifier(Modifier::BOLD);
                    }
                    if *date == today {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    Span::styled(format!("{:>3} ", date.day()), style)
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    let mut legend = vec![Span::raw("Less ")];
    for level in [HeatLevel::Empty, HeatLevel::Low, HeatLevel::Medium, HeatLevel::High, HeatLevel::Max] {
        legend.push(Span::styled("  ", Style::default().bg(heat_color(level))));
        legend.push(Span::raw(" "));
    }
    legend.push(Span::raw("More"));
    lines.push(Line::from(legend));

    let calendar = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("📅 Calendar"));
    f.render_widget(calendar, area);
}

fn draw_recent_sessions(app: &App, f: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = history::recent_sessions(app.controller.sessions())
        .iter()
        .map(|session| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} ", session.timestamp.format("%b %-d")),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(
                        format!("[{}] ", session.session_type.label()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(format!(
                        "{}/{} ",
                        format_minutes(session.duration),
                        format_minutes(session.planned_duration)
                    )),
                    Span::styled(session.fulfilled.label(), Style::default().fg(fulfillment_color(session.fulfilled))),
                ]),
                Line::from(format!("   {}", session.outcome)),
                Line::from(format!("   {}", session.session_focus)).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("🕘 Recent Sessions"));
    f.render_widget(list, area);
}

fn draw_day_detail(app: &App, date: NaiveDate, f: &mut Frame, area: Rect) {
    let sessions = history::sessions_for_date(app.controller.sessions(), date);
    let title = format!(
        "{} - {}",
        date.format("%A, %B %-d, %Y"),
        session_count_label(sessions.len())
    );

    if sessions.is_empty() {
        let empty = Paragraph::new(vec![Line::from(""), Line::from("No sessions on this day")])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = sessions
        .iter()
        .map(|session| {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} ", session.start_time.format("%H:%M")),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("[{}] ", session.session_type.label()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(format!(
                        "{} of {} ",
                        format_minutes(session.duration),
                        format_minutes(session.planned_duration)
                    )),
                    Span::styled(session.fulfilled.label(), Style::default().fg(fulfillment_color(session.fulfilled))),
                ]),
                Line::from(format!("   Focus:   {}", session.session_focus)),
                Line::from(format!("   Outcome: {}", session.outcome)),
                Line::from(format!("   Purpose: {}", session.purpose)).style(Style::default().fg(Color::Gray)),
            ];
            if let Some(reflection) = session.reflection.as_deref().filter(|r| !r.is_empty()) {
                lines.push(
                    Line::from(format!("   \"{}\"", reflection))
                        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)),
                );
            }
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::CountingChime;
    use crate::clock::testing::FixedClock;
    use crate::session::lifecycle::SessionController;
    use crate::store::MemoryStore;
    use chrono::{Local, TimeZone};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    fn app() -> App {
        let clock = FixedClock::at(Local.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap());
        let controller = SessionController::new(
            Box::new(MemoryStore::new()),
            Box::new(CountingChime::default()),
            Box::new(clock),
        );
        App::new(controller)
    }

    #[test]
    fn test_setup_screen_renders_prompts() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("New Focus Session"));
        assert!(text.contains("Why does this work matter beyond me?"));
        assert!(text.contains("Begin Session"));
    }

    #[test]
    fn test_empty_history_renders_hint() {
        let mut app = app();
        app.controller.open_history();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("History - October 2026"));
        assert!(text.contains("No sessions yet"));
    }

    #[test]
    fn test_preset_labels() {
        assert_eq!(preset_label(15), "15 min");
        assert_eq!(preset_label(60), "1 hour");
        assert_eq!(preset_label(120), "2 hours");
    }
}
