//! Overlay rendering (suggestions dropdown, notices, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::model::{NoticeLevel, UiState};
use super::utils::truncate_string;

/// Live suggestions, hanging below the search box
pub fn render_suggestions(frame: &mut Frame, search_area: Rect, ui_state: &UiState) {
    let area = frame.area();
    let width = search_area.width.saturating_sub(18).max(20).min(area.width);
    let height = (ui_state.suggestions.len() as u16 + 2)
        .min(area.height.saturating_sub(search_area.bottom()));
    if height < 3 {
        return;
    }

    let popup_area = Rect {
        x: search_area.x,
        y: search_area.bottom(),
        width,
        height,
    };
    frame.render_widget(Clear, popup_area);

    let inner_width = width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = ui_state
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let text = truncate_string(&format!("{} · {}", track.title, track.artist), inner_width);
            let style = if ui_state.suggestion_selected == Some(i) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Suggestions (↓ Enter) ")
            .style(Style::default().bg(Color::Black)),
    );

    let mut list_state = ListState::default();
    list_state.select(ui_state.suggestion_selected);

    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

/// Transient notice in the top-right corner
pub fn render_notice(frame: &mut Frame, ui_state: &UiState) {
    let Some(notice) = &ui_state.notice else {
        return;
    };
    let area = frame.area();

    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;
    let line_count = notice.message.chars().count().div_ceil(inner_width) as u16;
    let popup_height = (2 + line_count.max(1)).min(area.height.saturating_sub(2));

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width + 2),
        y: 1,
        width: popup_width,
        height: popup_height,
    };

    let (color, title) = match notice.level {
        NoticeLevel::Info => (Color::Cyan, " Info "),
        NoticeLevel::Warning => (Color::Yellow, " Notice "),
        NoticeLevel::Error => (Color::Red, " Error "),
    };

    frame.render_widget(Clear, popup_area);

    let widget = Paragraph::new(notice.message.clone())
        .style(Style::default().fg(color))
        .wrap(ratatui::widgets::Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = [
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓", "Move selection"),
        ("/ or Esc", "Focus search"),
        ("", ""),
        ("", "── Search ──"),
        ("Type", "Live suggestions"),
        ("Enter", "Search / use suggestion"),
        ("Esc", "Clear search"),
        ("", ""),
        ("", "── Results & Playlist ──"),
        ("Enter (results)", "Add to playlist"),
        ("Enter (playlist)", "Play track"),
        ("Delete", "Remove from playlist"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("N / P", "Next / Previous"),
        ("S", "Stop"),
        ("← / →", "Seek -5s / +5s"),
        ("+ / -", "Volume up / down"),
        ("M", "Mute"),
        ("", ""),
        ("", "── General ──"),
        ("H", "Toggle this help"),
        ("Q / Ctrl+Q", "Quit"),
    ];

    let popup_width = 62.min(area.width);
    let popup_height = (keybindings.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (H or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
