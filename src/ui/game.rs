//! Game screen: movie card, countdown, action button, toasts

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use super::countdown::{button_label, format_time, progress_percent};
use super::Theme;
use crate::app::{App, Toast};
use crate::models::Movie;
use crate::session::TimerPhase;

const CARD_WIDTH: u16 = 64;
const TOAST_WIDTH: u16 = 46;
const TOAST_HEIGHT: u16 = 4;

/// Render the whole screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default().style(ratatui::style::Style::default().bg(Theme::BACKGROUND)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Card
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0]);
    render_card(frame, centered_column(chunks[1], CARD_WIDTH), app);
    render_status_bar(frame, chunks[2], app);
    render_toasts(frame, area, &app.toasts);
}

fn centered_column(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled("HINDI MOVIE ", Theme::title()),
        Span::styled("TIMER", Theme::keybind()),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border()),
    );
    frame.render_widget(title, area);
}

fn render_card(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .style(Theme::card());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);

    match app.session.current() {
        Some(movie) => render_movie(frame, chunks[0], app, movie),
        None => render_placeholder(frame, chunks[0]),
    }
    render_button(frame, chunks[1], app);
}

fn render_placeholder(frame: &mut Frame, area: Rect) {
    let placeholder = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("🎬", Theme::dimmed())),
        Line::from(""),
        Line::from(Span::styled(
            "Press g to get a movie and start the game",
            Theme::dimmed(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Plain)
            .border_style(Theme::dimmed()),
    );
    frame.render_widget(placeholder, area);
}

fn render_movie(frame: &mut Frame, area: Rect, app: &App, movie: &Movie) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Poster
            Constraint::Length(2), // Title
            Constraint::Length(1), // Time remaining
            Constraint::Length(1), // Gauge
            Constraint::Length(2), // Controls
        ])
        .split(area);

    render_poster(frame, chunks[0], movie);

    let title = Paragraph::new(Line::from(Span::styled(
        movie.title.as_str(),
        Theme::movie_title(),
    )))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(title, chunks[1]);

    let remaining = app.session.remaining();
    let running = app.session.is_timer_running();
    let clock = Paragraph::new(Line::from(vec![
        Span::styled("Time Remaining: ", Theme::text()),
        Span::styled(format_time(remaining), Theme::clock(running)),
    ]));
    frame.render_widget(clock, chunks[2]);

    let percent = progress_percent(remaining);
    let gauge = Gauge::default()
        .gauge_style(Theme::progress_bar(percent))
        .ratio(percent / 100.0)
        .label("");
    frame.render_widget(gauge, chunks[3]);

    let toggle = match app.session.timer_phase() {
        TimerPhase::Running => "Pause",
        TimerPhase::Idle => "Resume",
        TimerPhase::Expired => "Time's up",
    };
    let controls = Paragraph::new(Line::from(vec![
        Span::styled(" SPACE ", Theme::keybind()),
        Span::styled(format!("{}  ", toggle), Theme::dimmed()),
        Span::styled(" s ", Theme::keybind()),
        Span::styled("Skip", Theme::dimmed()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(controls, chunks[4]);
}

/// Poster URL, or the title on a banner when there is none
fn render_poster(frame: &mut Frame, area: Rect, movie: &Movie) {
    let paragraph = match movie.poster_url() {
        Some(url) => Paragraph::new(vec![
            Line::from(Span::styled("Poster", Theme::dimmed())),
            Line::from(Span::styled(url, Theme::text())),
        ])
        .wrap(Wrap { trim: true }),
        None => Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(movie.title.as_str(), Theme::banner())),
        ])
        .style(Theme::banner()),
    };
    frame.render_widget(paragraph.alignment(Alignment::Center), area);
}

fn render_button(frame: &mut Frame, area: Rect, app: &App) {
    let loading = app.session.is_loading();
    let label = button_label(loading, app.session.current().is_some());
    let text = if loading {
        Span::styled(format!("⟳ {}", label), Theme::loading())
    } else {
        Span::styled(format!("↵ {}", label), Theme::button(true))
    };

    let button = Paragraph::new(Line::from(text))
        .alignment(Alignment::Center)
        .style(Theme::button(!loading))
        .block(Block::default().borders(Borders::TOP).border_style(Theme::border()));
    frame.render_widget(button, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let store = app.session.store();
    let status = Line::from(vec![
        Span::styled(
            format!(" pool {} · shown {} ", store.pool().len(), store.used().len()),
            Theme::dimmed(),
        ),
        Span::raw(" │ "),
        Span::styled(
            " g:get  s:skip  space:pause  esc:dismiss  q:quit ",
            Theme::dimmed(),
        ),
    ]);
    frame.render_widget(Paragraph::new(status).style(Theme::status_bar()), area);
}

/// Stack toasts in the top-right corner, newest on top
fn render_toasts(frame: &mut Frame, area: Rect, toasts: &[Toast]) {
    let width = TOAST_WIDTH.min(area.width);
    for (i, toast) in toasts.iter().rev().enumerate() {
        let y = area.y + 1 + i as u16 * TOAST_HEIGHT;
        if y + TOAST_HEIGHT > area.y + area.height {
            break;
        }
        let rect = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height: TOAST_HEIGHT,
        };

        let style = Theme::toast(toast.notification.severity);
        let body = Paragraph::new(Span::styled(
            toast.notification.description.as_str(),
            Theme::text(),
        ))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style)
                .title(Span::styled(format!(" {} ", toast.notification.title), style))
                .style(Theme::card()),
        );

        frame.render_widget(Clear, rect);
        frame.render_widget(body, rect);
    }
}
