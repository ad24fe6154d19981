use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph},
};

use super::app::App;
use crate::internal::models::FetchState;
use crate::internal::notification::NotificationType;
use crate::utils::datetime::format_published_at;

pub fn draw(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_top_bar(app, f, chunks[0]);

    match app.controller.state() {
        FetchState::Idle | FetchState::Loading => render_skeletons(app, f, chunks[1]),
        FetchState::Loaded => render_cards(app, f, chunks[1]),
        FetchState::Failed => render_error_panel(app, f, chunks[1]),
    }

    render_pagination_bar(app, f, chunks[2]);
    render_status_bar(app, f, chunks[3]);

    if app.show_help {
        render_help_overlay(app, f);
    }
}

fn render_top_bar(app: &App, f: &mut Frame, area: Rect) {
    let query = app.controller.query();

    let left = match app.controller.state() {
        FetchState::Loading => format!(" Ideas  {} loading...", app.get_spinner_char()),
        FetchState::Failed => " Ideas".to_string(),
        _ => match app.controller.showing_range() {
            Some((start, end)) => format!(
                " Ideas  Showing {} - {} of {}",
                start,
                end,
                app.controller.total()
            ),
            None => " Ideas  No results".to_string(),
        },
    };

    let right = Line::from(format!(
        "{} per page · {} first  v{} ",
        query.page_size, query.sort, app.app_version
    ));

    // Display width, not byte length; the separator is multi-byte
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right.width() as u16)])
        .split(area);

    f.render_widget(
        Paragraph::new(left).style(Style::default().add_modifier(Modifier::BOLD)),
        halves[0],
    );
    f.render_widget(
        Paragraph::new(right).style(Style::default().fg(Color::DarkGray)),
        halves[1],
    );
}

fn render_cards(app: &mut App, f: &mut Frame, area: Rect) {
    let wrap_width = area.width.saturating_sub(6).max(20) as usize;

    let items: Vec<ListItem> = app
        .controller
        .items()
        .iter()
        .map(|idea| {
            let mut lines: Vec<Line> = textwrap::wrap(&idea.title, wrap_width)
                .into_iter()
                .map(|part| {
                    Line::from(Span::styled(
                        part.into_owned(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ))
                })
                .collect();

            let mut meta = vec![Span::styled(
                format_published_at(&idea.published_at),
                Style::default().fg(Color::DarkGray),
            )];
            if let Some(url) = idea.image_url() {
                meta.push(Span::raw("  "));
                meta.push(Span::styled(
                    url.to_string(),
                    Style::default().fg(Color::Blue),
                ));
            }
            lines.push(Line::from(meta));
            lines.push(Line::from(""));

            ListItem::new(lines)
        })
        .collect();

    if items.is_empty() {
        f.render_widget(
            Paragraph::new("No ideas on this page.")
                .alignment(Alignment::Center)
                .block(Block::default().padding(Padding::vertical(2))),
            area,
        );
        return;
    }

    let list = List::new(items)
        .block(Block::default().padding(Padding::horizontal(1)))
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    f.render_stateful_widget(list, area, &mut app.list_state);
}

/// Placeholder rows while a fetch is in flight: one per expected item.
fn render_skeletons(app: &App, f: &mut Frame, area: Rect) {
    let bar_width = (area.width.saturating_sub(6).max(20) as usize).min(48);
    let rows = app.controller.query().page_size as usize;

    let items: Vec<ListItem> = (0..rows)
        .map(|_| {
            let lines = vec![
                Line::from(Span::styled(
                    "░".repeat(bar_width),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    "░".repeat(bar_width / 2),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
                )),
                Line::from(""),
            ];
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items).block(Block::default().padding(Padding::horizontal(1)));
    f.render_widget(list, area);
}

/// Blocking failure view. The only way out is the manual reload key.
fn render_error_panel(app: &App, f: &mut Frame, area: Rect) {
    let message = app.controller.error().unwrap_or("An error occurred");

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Error loading ideas",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to retry",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Error ")),
        area,
    );
}

fn render_pagination_bar(app: &App, f: &mut Frame, area: Rect) {
    let page_count = app.controller.page_count();
    if page_count <= 1 {
        return;
    }

    let page = app.controller.query().page;
    let loading = app.controller.is_loading();

    let active = Style::default();
    let disabled = Style::default().add_modifier(Modifier::DIM);
    let current = Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED);
    // While loading, every control renders disabled, matching the boundaries
    let style_for = |enabled: bool| match enabled && !loading {
        true => active,
        false => disabled,
    };

    let mut spans: Vec<Span> = vec![
        Span::styled("«« ", style_for(app.controller.can_prev())),
        Span::styled("« ", style_for(app.controller.can_prev())),
    ];

    for p in app.controller.page_window() {
        match p == page {
            true => spans.push(Span::styled(format!(" {} ", p), current)),
            false => spans.push(Span::styled(format!(" {} ", p), style_for(!loading))),
        }
    }

    spans.push(Span::styled(" »", style_for(app.controller.can_next())));
    spans.push(Span::styled(" »»", style_for(app.controller.can_next())));

    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn render_status_bar(app: &App, f: &mut Frame, area: Rect) {
    match &app.notification {
        Some(notification) => {
            let style = match notification.notification_type {
                NotificationType::Info => Style::default().fg(Color::Cyan),
                NotificationType::Error => Style::default().fg(Color::Red),
            };
            f.render_widget(
                Paragraph::new(format!(" {}", notification.message)).style(style),
                area,
            );
        }
        None => {
            let hints =
                " q quit · ←/→ page · g/G first/last · c size · s sort · r reload · b/f history · o image · ? help";
            f.render_widget(
                Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
                area,
            );
        }
    }
}

fn render_help_overlay(app: &App, f: &mut Frame) {
    let area = f.area();
    let popup_width = 52.min(area.width.saturating_sub(4));
    let popup_height = 16.min(area.height.saturating_sub(2));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    let lines = vec![
        Line::from(""),
        help_line("←/h  →/l", "previous / next page"),
        help_line("g  G", "first / last page"),
        help_line("j  k", "move card selection"),
        help_line("c", "cycle page size (10/20/50)"),
        help_line("s", "toggle sort (newest/oldest)"),
        help_line("r", "reload current page"),
        help_line("b  f", "history back / forward"),
        help_line("o", "open selected idea's image"),
        help_line("?", "toggle this help"),
        help_line("q", "quit"),
        Line::from(""),
        Line::from(Span::styled(
            format!("  tui-ideas-app v{}", app.app_version),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1));

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(lines).block(block), popup_area);
}

fn help_line(keys: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {:<10}", keys),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(desc.to_string()),
    ])
}
