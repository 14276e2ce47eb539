use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Points},
        *,
    },
};
use std::f64::consts::TAU;

use crate::{
    app::{AppState, View},
    controller::{Field, TimerState},
    time_model::{format_clock, format_datetime_local, format_total_duration, RemainingTime, TimeWindow},
};

const COMPACT_MAX_WIDTH: u16 = 60;
const COMPACT_MAX_HEIGHT: u16 = 28;
const RING_RADIUS: f64 = 1.0;
const RING_THICKNESS: f64 = 0.06;
const PLACEHOLDER: &str = "YYYY-MM-DDTHH:MM";

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum LayoutMode {
    Compact,
    Wide,
}

pub fn layout_mode(area: Rect) -> LayoutMode {
    if area.width < COMPACT_MAX_WIDTH || area.height < COMPACT_MAX_HEIGHT {
        LayoutMode::Compact
    } else {
        LayoutMode::Wide
    }
}

// ============================================================================
// UI Rendering
// ============================================================================

pub fn render_ui(f: &mut Frame, app: &AppState) {
    match app.current_view {
        View::Timer => render_timer(f, app),
        View::Help => render_help(f, app),
    }

    if let Some(message) = &app.alert {
        render_alert(f, app, message);
    }
}

fn render_timer(f: &mut Frame, app: &AppState) {
    let mode = layout_mode(f.size());
    let footer_height = if mode == LayoutMode::Wide { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(footer_height),
        ])
        .split(f.size());

    render_header(f, app, chunks[0]);

    let ctl = &app.controller;
    let quick_height = if ctl.is_running() { 0 } else { 2 };
    let inputs_height = if mode == LayoutMode::Wide { 3 } else { 6 };
    let stats_height = if ctl.is_running() { 1 } else { 0 };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(quick_height),
            Constraint::Length(inputs_height),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(stats_height),
        ])
        .split(chunks[1]);

    render_quick_set(f, app, sections[0]);
    render_inputs(f, app, sections[1], mode);
    render_button(f, app, sections[2]);

    match ctl.state() {
        TimerState::Idle => {}
        TimerState::Running { remaining, .. } => match mode {
            LayoutMode::Wide => render_ring(f, app, remaining, sections[4]),
            LayoutMode::Compact => render_gauge(f, app, remaining, sections[4]),
        },
        TimerState::Completed { window, .. } => render_completion(f, app, window, sections[4]),
    }

    if let TimerState::Running { remaining, .. } = ctl.state() {
        render_stats(f, remaining, sections[5]);
    }

    if mode == LayoutMode::Wide {
        render_controls(f, app, chunks[2]);
    }
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let ctl = &app.controller;
    let (status, color) = if ctl.is_running() {
        let dot = if app.animation_frame < 10 { "●" } else { "○" };
        (format!("{} RUNNING", dot), app.theme.running_color)
    } else if ctl.is_completed() {
        ("✓ COMPLETED".to_string(), app.theme.completed_color)
    } else {
        ("IDLE".to_string(), Color::Gray)
    };

    let header = Paragraph::new(Span::styled(status, Style::default().fg(color).add_modifier(Modifier::BOLD)))
        .alignment(Alignment::Center)
        .block(Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(app.theme.border_color))
            .title(Span::styled(" 🏆 HACKATHON TIMER ", Style::default()
                .fg(app.theme.accent_color).add_modifier(Modifier::BOLD))));
    f.render_widget(header, area);
}

fn render_quick_set(f: &mut Frame, app: &AppState, area: Rect) {
    if area.height == 0 {
        return;
    }

    let mut spans = vec![Span::styled("Quick set: ", Style::default().fg(Color::Gray))];
    for (i, hours) in app.quick_hours.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(span_key(format!("F{}", i + 1), app));
        spans.push(Span::raw(format!(" +{}h", hours)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn render_inputs(f: &mut Frame, app: &AppState, area: Rect, mode: LayoutMode) {
    let direction = match mode {
        LayoutMode::Wide => Direction::Horizontal,
        LayoutMode::Compact => Direction::Vertical,
    };
    let boxes = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_field(f, app, Field::Start, boxes[0]);
    render_field(f, app, Field::End, boxes[1]);
}

fn render_field(f: &mut Frame, app: &AppState, field: Field, area: Rect) {
    let locked = app.controller.is_locked();
    let focused = app.focus == field && !locked;
    let text = app.controller.input(field);

    let border = if focused {
        Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.border_color)
    };

    let mut spans = Vec::new();
    if text.is_empty() && !focused {
        spans.push(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)));
    } else {
        let style = if locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };
        spans.push(Span::styled(text, style));
    }
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Green)));
    }

    let title = if locked {
        format!(" {} 🔒 ", field.label())
    } else {
        format!(" {} ", field.label())
    };

    f.render_widget(
        Paragraph::new(Line::from(spans))
            .block(Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border)),
        area,
    );
}

fn render_button(f: &mut Frame, app: &AppState, area: Rect) {
    let (label, color) = if app.controller.is_running() {
        ("[ ■ Stop timer ]", Color::Yellow)
    } else {
        ("[ ▶ Start timer ]", Color::Green)
    };

    f.render_widget(
        Paragraph::new(label)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        area,
    );
}

fn render_ring(f: &mut Frame, app: &AppState, remaining: &RemainingTime, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let progress = remaining.progress_percent();
    // Terminal cells are roughly twice as tall as they are wide
    let aspect = f64::from(area.width) / (2.0 * f64::from(area.height));
    let bound = RING_RADIUS + RING_THICKNESS * 2.0;
    let arc = progress_arc(progress, RING_RADIUS, RING_THICKNESS);
    let track = app.theme.track_color;
    let fill = app.status_color();

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-bound * aspect, bound * aspect])
        .y_bounds([-bound, bound])
        .paint(|ctx| {
            for r in [RING_RADIUS - RING_THICKNESS, RING_RADIUS, RING_RADIUS + RING_THICKNESS] {
                ctx.draw(&Circle { x: 0.0, y: 0.0, radius: r, color: track });
            }
            ctx.draw(&Points { coords: &arc, color: fill });
        });
    f.render_widget(canvas, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}%", progress.round() as u64),
            Style::default().fg(fill).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_clock(remaining),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
    ];
    if remaining.days > 0 {
        lines.push(Line::from(Span::styled(
            days_label(remaining.days),
            Style::default().fg(Color::Gray),
        )));
    }

    let text_area = centered_box(20, lines.len() as u16, area);
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), text_area);
}

fn render_gauge(f: &mut Frame, app: &AppState, remaining: &RemainingTime, area: Rect) {
    let progress = remaining.progress_percent();
    let mut label = format!("{}% • {}", progress.round() as u64, format_clock(remaining));
    if remaining.days > 0 {
        label.push_str(&format!(" • {}", days_label(remaining.days)));
    }

    let gauge_area = Rect { height: area.height.min(3), ..area };
    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(app.status_color()).bg(Color::Black))
            .percent(progress.round().clamp(0.0, 100.0) as u16)
            .label(label),
        gauge_area,
    );
}

fn render_completion(f: &mut Frame, app: &AppState, window: &TimeWindow, area: Rect) {
    let color = app.theme.completed_color;
    let span = format!(
        "{} → {}",
        format_datetime_local(&window.start),
        format_datetime_local(&window.end)
    );
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(app.completion_title(), Style::default().fg(color).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(app.completion_body(), Style::default().fg(Color::White))),
        Line::from(Span::styled(span, Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled("Press Enter to run again • Esc to dismiss", Style::default()
            .fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    let banner_area = centered_box(area.width.min(50), area.height.min(9), area);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))),
        banner_area,
    );
}

fn render_stats(f: &mut Frame, remaining: &RemainingTime, area: Rect) {
    let line = Line::from(vec![
        Span::styled("Total duration: ", Style::default().fg(Color::Gray)),
        Span::styled(format_total_duration(remaining.total_duration_seconds), Style::default()
            .fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("  •  "),
        Span::styled("Remaining: ", Style::default().fg(Color::Gray)),
        Span::styled(format!("{}s", remaining.total_seconds_remaining), Style::default()
            .fg(Color::White).add_modifier(Modifier::BOLD)),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(f: &mut Frame, app: &AppState, area: Rect) {
    let controls = Line::from(vec![
        span_key("Enter", app), Span::raw(" Start/Stop  •  "),
        span_key("Esc", app), Span::raw(" Stop  •  "),
        span_key("Tab", app), Span::raw(" Switch field  •  "),
        span_key("?", app), Span::raw(" Help  •  "),
        span_key("Q", app), Span::raw(" Quit"),
    ]);
    f.render_widget(
        Paragraph::new(controls)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(app.theme.border_color))),
        area,
    );
}

fn span_key<'a>(text: impl Into<std::borrow::Cow<'a, str>>, app: &AppState) -> Span<'a> {
    Span::styled(text, Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))
}

fn render_help(f: &mut Frame, app: &AppState) {
    let area = centered_pct(70, 85, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("⌨️  KEYBOARD SHORTCUTS", Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Timer:"),
        help_line("Enter / Ctrl+Enter", "Start or stop the countdown"),
        help_line("Esc", "Stop the countdown / dismiss completion"),
        help_line("F1..F12", "Quick-set a window starting now"),
        Line::from(""),
        Line::from("  Editing:"),
        help_line("Tab / ↑↓", "Switch between start and end field"),
        help_line("Backspace", "Delete last character"),
        help_line("Ctrl+U / Del", "Clear field"),
        Line::from(""),
        Line::from("  General:"),
        help_line("?", "Toggle help"),
        help_line("Q / Ctrl+C", "Quit"),
        Line::from(""),
        Line::from(Span::styled(format!("  Theme: {}", app.theme_name),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    f.render_widget(
        Paragraph::new(help_text)
            .alignment(Alignment::Left)
            .block(Block::default()
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(app.theme.border_color))),
        area
    );
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

fn render_alert(f: &mut Frame, app: &AppState, message: &str) {
    let area = centered_box(f.size().width.min(56), 7, f.size());
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Press Enter to dismiss", Style::default()
            .fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default()
                .title(" ⚠️  Invalid input ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .style(Style::default().fg(app.theme.accent_color))),
        area,
    );
}

// ============================================================================
// Geometry
// ============================================================================

fn days_label(days: u64) -> String {
    if days == 1 {
        "1 day remaining".into()
    } else {
        format!("{} days remaining", days)
    }
}

/// Points of a clockwise arc starting at twelve o'clock covering `progress`
/// percent of a full turn, drawn as three concentric bands.
pub fn progress_arc(progress: f64, radius: f64, thickness: f64) -> Vec<(f64, f64)> {
    const STEPS_PER_TURN: f64 = 360.0;

    let fraction = (progress / 100.0).clamp(0.0, 1.0);
    let steps = (STEPS_PER_TURN * fraction).round() as usize;
    if steps == 0 {
        return Vec::new();
    }

    let mut points = Vec::with_capacity((steps + 1) * 3);
    for r in [radius - thickness, radius, radius + thickness] {
        for i in 0..=steps {
            let theta = i as f64 / STEPS_PER_TURN * TAU;
            points.push((r * theta.sin(), r * theta.cos()));
        }
    }
    points
}

/// A `w` x `h` rect centred in `r`, clipped to it.
fn centered_box(w: u16, h: u16, r: Rect) -> Rect {
    let w = w.min(r.width);
    let h = h.min(r.height);
    Rect {
        x: r.x + (r.width - w) / 2,
        y: r.y + (r.height - h) / 2,
        width: w,
        height: h,
    }
}

/// `centered_box` sized as a percentage of `r`.
fn centered_pct(pct_w: u16, pct_h: u16, r: Rect) -> Rect {
    let scale = |len: u16, pct: u16| (u32::from(len) * u32::from(pct.min(100)) / 100) as u16;
    centered_box(scale(r.width, pct_w), scale(r.height, pct_h), r)
}
