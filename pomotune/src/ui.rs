use crate::app::{App, AppMode};
use crate::config::Theme;
use crate::playback::NowPlaying;
use crate::setup::Field;
use pomotune_core::{IntervalKind, TimerState};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use tachyonfx::Duration as TachyonDuration;

/// Timer screen arrangement, picked from the terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// One status line.
    Mini,
    /// Countdown plus a track line.
    Compact,
    /// Countdown, session markers and a track panel.
    Medium,
    Full,
}

impl LayoutMode {
    pub fn for_size(width: u16, height: u16) -> Self {
        if height <= 3 {
            LayoutMode::Mini
        } else if height <= 8 || width <= 40 {
            LayoutMode::Compact
        } else if height <= 16 || width <= 80 {
            LayoutMode::Medium
        } else {
            LayoutMode::Full
        }
    }
}

/// `M:SS`, minutes unpadded.
pub fn format_time(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn format_track_time(ms: u64) -> String {
    format_time(ms / 1000)
}

fn progress_percent(state: &TimerState) -> u16 {
    let Some(interval) = state.current_interval() else {
        return 0;
    };
    if interval.duration_secs == 0 {
        return 100;
    }
    let percent = state.elapsed_in_interval() * 100 / interval.duration_secs;
    percent.min(100) as u16
}

fn interval_title(kind: IntervalKind) -> &'static str {
    match kind {
        IntervalKind::Focus => "Focus Session",
        IntervalKind::ShortBreak | IntervalKind::LongBreak => "Break Time",
    }
}

fn kind_color(theme: &Theme, kind: IntervalKind) -> Color {
    match kind {
        IntervalKind::Focus => theme.focus,
        IntervalKind::ShortBreak | IntervalKind::LongBreak => theme.rest,
    }
}

pub fn draw(f: &mut Frame, app: &mut App, frame_time: Duration) {
    match app.mode {
        AppMode::Setup => draw_setup(f, app),
        AppMode::Timer => draw_timer(f, app),
    }

    let area = f.area();
    let millis = u32::try_from(frame_time.as_millis()).unwrap_or(u32::MAX);
    app.effect_manager
        .process_effects(TachyonDuration::from_millis(millis), f.buffer_mut(), area);
}

fn draw_setup(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(7),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_counters(f, chunks[1], app);

    let spotify = if app.spotify_connected() {
        Span::styled(
            format!(" {} Spotify connected", app.config.icons.music),
            Style::default().fg(app.config.theme.green),
        )
    } else {
        Span::styled(
            " Spotify not connected (set SPOTIFY_ACCESS_TOKEN)",
            Style::default().fg(app.config.theme.gray),
        )
    };
    f.render_widget(Paragraph::new(Line::from(spotify)), chunks[2]);
    draw_status_bar(
        f,
        chunks[3],
        app,
        ("SETUP", app.config.theme.yellow),
        "↑/↓:select │ ←/→ -/+:adjust │ enter:start │ q:quit",
    );
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let text = Line::from(vec![
        Span::raw(icons.header_left.clone()),
        Span::styled(
            "POMOTUNE",
            Style::default().fg(theme.focus).add_modifier(Modifier::BOLD),
        ),
        Span::raw(icons.header_right.clone()),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.black)),
        ),
        area,
    );
}

fn draw_counters(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let selected = app.setup.selected_field();

    let items: Vec<ListItem> = Field::ALL
        .iter()
        .map(|&field| {
            let value = app
                .setup
                .value(field)
                .map_or_else(|| "--".to_string(), |v| format!("{:02}", v));
            let is_selected = field == selected;
            let marker = if is_selected {
                Span::styled(format!("{} ", icons.select), Style::default().fg(theme.selection))
            } else {
                Span::raw("  ")
            };
            let label_style = if is_selected {
                Style::default().fg(theme.selection).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.foreground)
            };
            ListItem::new(Line::from(vec![
                marker,
                Span::styled(format!("{:<18}", field.label()), label_style),
                Span::styled("- ", Style::default().fg(theme.gray)),
                Span::styled(
                    format!("{} {}", value, field.unit()),
                    Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" +", Style::default().fg(theme.gray)),
            ]))
        })
        .collect();

    f.render_widget(
        List::new(items).block(
            Block::default()
                .title(Span::styled(" Session ", Style::default().fg(theme.gray)))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.focus)),
        ),
        area,
    );
}

fn draw_timer(f: &mut Frame, app: &App) {
    let Some(state) = app.timer.as_ref() else {
        return;
    };
    let now_playing = app.now_playing();
    let area = f.area();

    match LayoutMode::for_size(area.width, area.height) {
        LayoutMode::Mini => draw_mini(f, area, app, state, now_playing.as_ref()),
        LayoutMode::Compact => draw_compact(f, area, app, state, now_playing.as_ref()),
        LayoutMode::Medium => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(3), Constraint::Length(1)])
                .split(area);
            draw_countdown(f, chunks[0], app, state);
            draw_track_line(f, chunks[1], app, now_playing.as_ref(), true);
            draw_timer_status(f, chunks[2], app, state);
        }
        LayoutMode::Full => {
            // Without a track the whole body goes to the countdown.
            let track_height = if now_playing.is_some() { 6 } else { 0 };
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(7),
                    Constraint::Length(track_height),
                    Constraint::Length(1),
                ])
                .split(area);
            draw_header(f, chunks[0], app);
            draw_countdown(f, chunks[1], app, state);
            if let Some(now_playing) = now_playing.as_ref() {
                draw_track_panel(f, chunks[2], app, now_playing);
            }
            draw_timer_status(f, chunks[3], app, state);
        }
    }
}

fn draw_mini(f: &mut Frame, area: Rect, app: &App, state: &TimerState, now: Option<&NowPlaying>) {
    let theme = &app.config.theme;
    let status_color = if state.is_running { theme.green } else { theme.gray };
    let mut spans = vec![
        Span::styled(
            format_time(state.time_left),
            Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(&app.config.icons.marker_filled, Style::default().fg(status_color)),
    ];
    if let Some(track) = now.and_then(NowPlaying::track) {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(track.name.clone(), Style::default().fg(theme.gray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_compact(
    f: &mut Frame,
    area: Rect,
    app: &App,
    state: &TimerState,
    now: Option<&NowPlaying>,
) {
    let theme = &app.config.theme;
    let kind = state.current_interval().map_or(IntervalKind::Focus, |i| i.kind);
    let color = kind_color(theme, kind);
    let label = if kind == IntervalKind::Focus { "Focus" } else { "Break" };
    let action = if state.is_running { "Pause" } else { "Start" };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format_time(state.time_left),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(label, Style::default().fg(theme.foreground)),
            Span::styled(format!("  [space] {}", action), Style::default().fg(theme.gray)),
        ]),
        Line::from(Span::styled(
            progress_bar(app, progress_percent(state), 20),
            Style::default().fg(color),
        )),
    ];
    if let Some(track) = now.and_then(NowPlaying::track) {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", app.config.icons.music), Style::default().fg(theme.green)),
            Span::styled(track.name.clone(), Style::default().fg(theme.foreground)),
            Span::styled(
                track
                    .first_artist()
                    .map(|artist| format!(" · {}", artist))
                    .unwrap_or_default(),
                Style::default().fg(theme.gray),
            ),
        ]));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn progress_bar(app: &App, percent: u16, width: usize) -> String {
    let filled = (usize::from(percent) * width / 100).min(width);
    format!(
        "{}{}",
        app.config.icons.progress_filled.repeat(filled),
        app.config.icons.progress_empty.repeat(width - filled)
    )
}

fn draw_countdown(f: &mut Frame, area: Rect, app: &App, state: &TimerState) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let kind = state.current_interval().map_or(IntervalKind::Focus, |i| i.kind);
    let color = kind_color(theme, kind);

    let title = if state.session.completed {
        "Session Complete".to_string()
    } else {
        format!("{} · {}", interval_title(kind), kind.label())
    };
    let block = Block::default()
        .title(Span::styled(format!(" {} ", title), Style::default().fg(theme.gray)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner_area);

    let state_icon = if state.is_running { &icons.play } else { &icons.pause };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", state_icon), Style::default().fg(theme.gray)),
            Span::styled(
                format_time(state.time_left),
                Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center),
        rows[0],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color).bg(theme.black))
            .percent(progress_percent(state)),
        rows[1],
    );

    let markers: Vec<Span> = (0..state.session.config.total_sessions)
        .map(|index| {
            if index < state.session.session_count {
                Span::styled(format!("{} ", icons.marker_filled), Style::default().fg(color))
            } else {
                Span::styled(format!("{} ", icons.marker_empty), Style::default().fg(theme.gray))
            }
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(markers)).alignment(Alignment::Center),
        rows[2],
    );
}

fn draw_track_line(f: &mut Frame, area: Rect, app: &App, now: Option<&NowPlaying>, bordered: bool) {
    let theme = &app.config.theme;
    let line = match now.and_then(NowPlaying::track) {
        Some(track) => {
            let state_icon = if now.is_some_and(NowPlaying::is_playing) {
                &app.config.icons.play
            } else {
                &app.config.icons.pause
            };
            Line::from(vec![
                Span::styled(format!("{} ", state_icon), Style::default().fg(theme.green)),
                Span::styled(track.name.clone(), Style::default().fg(theme.foreground)),
                Span::styled(
                    track
                        .first_artist()
                        .map(|artist| format!(" · {}", artist))
                        .unwrap_or_default(),
                    Style::default().fg(theme.gray),
                ),
            ])
        }
        None if app.spotify_connected() => {
            Line::from(Span::styled("Nothing playing", Style::default().fg(theme.gray)))
        }
        None => Line::from(Span::styled(
            "Spotify not connected",
            Style::default().fg(theme.gray),
        )),
    };

    let mut paragraph = Paragraph::new(line);
    if bordered {
        paragraph = paragraph.block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.black)),
        );
    }
    f.render_widget(paragraph, area);
}

fn draw_track_panel(f: &mut Frame, area: Rect, app: &App, now_playing: &NowPlaying) {
    let theme = &app.config.theme;
    let block = Block::default()
        .title(Span::styled(
            format!(" {} Now Playing ", app.config.icons.music),
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.green));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner_area);

    draw_track_line(f, rows[0], app, Some(now_playing), false);

    if let Some(track) = now_playing.track() {
        let mut details: Vec<String> = track
            .album
            .iter()
            .map(|album| album.name.clone())
            .collect();
        if let Some(device) = now_playing.state.device.as_ref() {
            match device.volume_percent {
                Some(volume) => details.push(format!("{} ({}%)", device.name, volume)),
                None => details.push(device.name.clone()),
            }
        }
        let separator = format!(" {} ", app.config.icons.separator);
        f.render_widget(
            Paragraph::new(Span::styled(
                details.join(separator.as_str()),
                Style::default().fg(theme.gray),
            )),
            rows[1],
        );

        let progress = now_playing.progress_ms_at(Instant::now());
        let ratio = if track.duration_ms == 0 {
            0.0
        } else {
            progress as f64 / track.duration_ms as f64
        };
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(theme.green).bg(theme.black))
                .ratio(ratio.clamp(0.0, 1.0))
                .label(format!(
                    "{} / {}",
                    format_track_time(progress),
                    format_track_time(track.duration_ms)
                )),
            rows[2],
        );
    }
}

fn draw_timer_status(f: &mut Frame, area: Rect, app: &App, state: &TimerState) {
    let theme = &app.config.theme;
    let mode = if state.session.completed {
        ("DONE", theme.green)
    } else if state.is_running {
        ("RUNNING", theme.focus)
    } else {
        ("PAUSED", theme.yellow)
    };
    draw_status_bar(
        f,
        area,
        app,
        mode,
        TIMER_HELP,
    );
}

const TIMER_HELP: &str =
    "space:start/pause │ P:play/pause │ n/b:next/prev │ esc:setup │ q:quit";

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App, mode: (&str, Color), help: &str) {
    let theme = &app.config.theme;
    let (mode_text, mode_color) = mode;
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.background)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(help.to_string()),
        ]))
        .block(Block::default().style(Style::default().bg(theme.black).fg(theme.gray))),
        area,
    );
}
