use ratatui::{prelude::*, widgets::*};
use std::time::Instant;

use crate::app::{App, CustomField, HistoryRange, SettingsField, View};
use crate::session_log::format_minutes;
use crate::timer::{Status, TimerKind};

// ============================================================================
// UI Rendering
// ============================================================================

pub fn render_ui(f: &mut Frame, app: &App, now: Instant) {
    match app.view {
        View::Timer => render_timer(f, app, now),
        View::Settings => render_settings(f, app),
        View::History => render_history(f, app),
        View::Help => render_help(f),
    }
}

fn render_timer(f: &mut Frame, app: &App, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    let header = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " 🍅 POMO ",
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(header, chunks[0]);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(2), Constraint::Length(1),
            Constraint::Length(5), Constraint::Length(1),
            Constraint::Length(2), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(2), Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Percentage(10),
        ])
        .split(chunks[1]);

    // Phase
    f.render_widget(
        Paragraph::new(app.engine.kind().name())
            .style(Style::default().fg(kind_color(app.engine.kind())).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[1],
    );

    // Countdown
    let (mins, secs) = app.engine.display(now);
    f.render_widget(
        Paragraph::new(format!("{mins:02}:{secs:02}"))
            .style(Style::default().fg(kind_color(app.engine.kind())).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[3],
    );

    // Status
    let (status, color) = match app.engine.status() {
        Status::Running => ("▶ RUNNING", Color::Green),
        Status::Paused => ("⏸ PAUSED", Color::Yellow),
        Status::Idle => ("■ READY", Color::Gray),
    };
    f.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[5],
    );

    // Progress
    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(kind_color(app.engine.kind())).bg(Color::Black))
            .percent((app.engine.progress(now) * 100.0) as u16),
        sections[7],
    );

    // Type presets
    let presets: Vec<Span> = TimerKind::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, kind)| {
            let selected = *kind == app.engine.kind();
            let style = if selected {
                Style::default().fg(kind_color(*kind)).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            vec![
                Span::styled(format!("[{}] {}", i + 1, kind.label()), style),
                Span::raw("   "),
            ]
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(presets)).alignment(Alignment::Center),
        sections[9],
    );

    // Status line
    if let Some(msg) = &app.status {
        f.render_widget(
            Paragraph::new(msg.as_str())
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center),
            sections[11],
        );
    }

    // Controls
    let controls = Line::from(vec![
        key_span("Space"), Span::raw(" Start/Pause  •  "),
        key_span("X"), Span::raw(" Stop  •  "),
        key_span("1-4"), Span::raw(" Type  •  "),
        key_span("S"), Span::raw(" History  •  "),
        key_span("D"), Span::raw(" Settings  •  "),
        key_span("H"), Span::raw(" Help  •  "),
        key_span("Q"), Span::raw(" Quit"),
    ]);
    f.render_widget(
        Paragraph::new(controls)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn render_settings(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 85, f.size());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⚙️  SETTINGS",
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  ↑↓/jk: Navigate  •  Enter: Edit  •  ←→/hl: Alarm  •  s: Save  •  Esc: Discard",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
    ];

    let duration_fields = [
        (SettingsField::FocusShort, "🎯 Focus-Short"),
        (SettingsField::FocusLong, "🎯 Focus-Long"),
        (SettingsField::BreakShort, "☕ Break-Short"),
        (SettingsField::BreakLong, "🌴 Break-Long"),
    ];

    for (i, (field, label)) in duration_fields.iter().enumerate() {
        let selected = app.settings.field == *field;
        let editing = selected && app.settings.editing;
        lines.push(Line::from(""));
        lines.push(field_line(label, selected));
        if editing {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    app.settings.inputs[i].as_str(),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", Style::default().fg(Color::Green)),
            ]));
        } else {
            lines.push(value_line(format!("{} min", app.settings.inputs[i]), selected));
        }
    }

    let selected = app.settings.field == SettingsField::Alarm;
    lines.push(Line::from(""));
    lines.push(field_line("🔔 Alarm Sound", selected));
    let alarm = match app.settings.alarm_choices.get(app.settings.alarm_index) {
        Some(name) => format!("< {name} >"),
        None => "(no sound files found)".into(),
    };
    lines.push(value_line(alarm, selected));

    lines.push(Line::from(""));
    if let Some(err) = &app.settings.error {
        lines.push(Line::from(Span::styled(
            format!("  ✗ {err}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).block(view_block(" Settings ")),
        area,
    );
}

fn render_history(f: &mut Frame, app: &App) {
    let area = centered_rect(85, 90, f.size());
    let block = view_block(" History ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(inner);

    // Range selector
    let range_label = |range, label: &str| {
        if app.history.range == range {
            Span::styled(
                format!("[{label}]"),
                Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {label} "), Style::default().fg(Color::DarkGray))
        }
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            range_label(HistoryRange::Last7, "W: Last 7 days"),
            Span::raw("  "),
            range_label(HistoryRange::Last30, "M: Last 30 days"),
            Span::raw("  "),
            range_label(HistoryRange::Custom, "C: Custom"),
            Span::raw("   "),
            Span::styled("Esc: Back", Style::default().fg(Color::DarkGray)),
        ]))
        .alignment(Alignment::Center),
        chunks[0],
    );

    // Custom range editors
    if app.history.range == HistoryRange::Custom {
        let field = |label: &str, value: &str, active: bool| {
            let style = if active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            vec![
                Span::styled(label.to_string(), Style::default().fg(Color::Gray)),
                Span::styled(value.to_string(), style),
                Span::raw(if active { "█" } else { " " }),
            ]
        };
        let mut spans = field(
            "Start: ",
            &app.history.start_input,
            app.history.custom_field == CustomField::Start,
        );
        spans.push(Span::raw("   "));
        spans.extend(field(
            "End: ",
            &app.history.end_input,
            app.history.custom_field == CustomField::End,
        ));
        spans.push(Span::styled(
            "   Tab: Switch  •  Enter: Refresh",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            chunks[1],
        );
    }

    if let Some(err) = &app.history.error {
        f.render_widget(
            Paragraph::new(format!("✗ {err}"))
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center),
            chunks[2],
        );
        return;
    }

    // Per-day bar chart
    let labels: Vec<String> = app
        .history
        .summary
        .days
        .iter()
        .map(|d| d.date.format("%d/%m").to_string())
        .collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(&app.history.summary.days)
        .map(|(label, day)| (label.as_str(), day.minutes))
        .collect();

    if data.is_empty() {
        f.render_widget(
            Paragraph::new("No days in range")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            chunks[2],
        );
    } else {
        let bar_width = (chunks[2].width / data.len().max(1) as u16).clamp(3, 8);
        f.render_widget(
            BarChart::default()
                .data(&data)
                .bar_width(bar_width)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::LightRed))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
                .label_style(Style::default().fg(Color::Gray)),
            chunks[2],
        );
    }

    // Totals
    let totals = vec![
        Line::from(Span::styled(
            format_minutes("Total", app.history.summary.total_minutes),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_minutes("Average", app.history.summary.average_minutes),
            Style::default().fg(Color::Gray),
        )),
    ];
    f.render_widget(
        Paragraph::new(totals).alignment(Alignment::Center),
        chunks[3],
    );
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(70, 80, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⌨️  KEYBOARD SHORTCUTS",
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  Timer:"),
        help_line("Space", "Start / pause / resume"),
        help_line("X", "Stop and reset"),
        help_line("1-4", "Select timer type (while stopped)"),
        Line::from(""),
        Line::from("  Views:"),
        help_line("S", "Session history"),
        help_line("D", "Settings"),
        help_line("H / ?", "This help"),
        Line::from(""),
        Line::from("  History:"),
        help_line("W / M / C", "Last 7 days / last 30 days / custom range"),
        Line::from(""),
        Line::from("  General:"),
        help_line("Q / Esc", "Quit / go back"),
        help_line("Ctrl+C", "Force quit"),
        Line::from(""),
        Line::from(Span::styled(
            "💡 Completed focus sessions are logged; breaks are not.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(
        Paragraph::new(help_text)
            .alignment(Alignment::Left)
            .block(view_block(" Help ")),
        area,
    );
}

// ============================================================================
// Helpers
// ============================================================================

fn kind_color(kind: TimerKind) -> Color {
    match kind {
        TimerKind::FocusShort | TimerKind::FocusLong => Color::Rgb(100, 181, 246),
        TimerKind::BreakShort => Color::Rgb(0, 255, 150),
        TimerKind::BreakLong => Color::Rgb(255, 170, 0),
    }
}

fn key_span(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD))
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

fn field_line(label: &str, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(if selected { "  > " } else { "    " }.to_string(), style),
        Span::styled(label.to_string(), style),
    ])
}

fn value_line(value: String, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(vec![Span::raw("    "), Span::styled(value, style)])
}

fn view_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}
