//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! Layout, top to bottom: channel filter tabs, the scrollable post list, a
//! one-line status bar.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Frame,
};

use crate::app::{caption_preview, App};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame, now: DateTime<Utc>) {
    let [tabs_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_channel_tabs(app, frame, tabs_area);
    draw_post_list(app, frame, main_area, now);
    draw_status_bar(app, frame, status_area);
}

/// Human-friendly age of a post, e.g. `3h ago` or `Mar 5`.
pub fn relative_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - timestamp;
    let days = diff.num_days();

    if days <= 0 {
        let hours = diff.num_hours();
        if hours <= 0 {
            let minutes = diff.num_minutes();
            return if minutes <= 0 {
                "just now".into()
            } else {
                format!("{minutes}m ago")
            };
        }
        return format!("{hours}h ago");
    }
    match days {
        1 => "yesterday".into(),
        2..=6 => format!("{days}d ago"),
        7..=29 => format!("{}w ago", days / 7),
        _ => timestamp.format("%b %-d").to_string(),
    }
}

/// Render the channel filter: "All" followed by one tab per channel.
fn draw_channel_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let titles = std::iter::once("All".to_string())
        .chain(app.channels.iter().map(|c| format!("@{c}")));

    let tabs = Tabs::new(titles)
        .select(app.channel_filter.map_or(0, |i| i + 1))
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Render the scrollable post list, or a hint when it is empty.
fn draw_post_list(app: &mut App, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
    let block = Block::default().title(" Posts ").borders(Borders::ALL);
    let selected = app.list_state.selected();

    let list_items: Vec<ListItem> = app
        .visible_posts()
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let header = Line::from(vec![
                Span::styled(
                    format!("{:<10}", relative_age(post.timestamp, now)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(
                    post.display_name.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(format!("@{}", post.username), Style::default().fg(Color::Cyan)),
            ]);

            let expanded = app.expanded && selected == Some(i);
            let caption = Line::from(Span::raw(format!(
                "           {}",
                caption_preview(&post.caption, expanded)
            )));

            ListItem::new(vec![header, caption])
        })
        .collect();

    if list_items.is_empty() {
        let hint = Paragraph::new("No posts yet. Press r to fetch the latest posts.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let updated = app
        .last_updated
        .map(|t| format!("updated {}", t.format("%H:%M")))
        .unwrap_or_default();

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} posts", app.visible_posts().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(updated, Style::default().fg(Color::DarkGray)),
        Span::raw("  q: quit  r: refresh  Tab: channel  Enter: expand"),
    ]));
    frame.render_widget(status, area);
}
