//! Top bar rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::model::{count_label, ActiveSection, ResultsStatus, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, playlist_len: usize) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(18), // Playlist count
        ])
        .split(area);

    // Search input
    let focused = ui_state.active_section == ActiveSection::Search;
    let search_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    // Placeholder until something is typed; cursor only while focused
    let search_text = if ui_state.search_query.is_empty() {
        "Search for songs, artists, albums...".to_string()
    } else if focused {
        format!("{}▏", ui_state.search_query)
    } else {
        ui_state.search_query.clone()
    };

    let title = if ui_state.results_status == ResultsStatus::Searching {
        " Search (searching...) "
    } else {
        " Search "
    };

    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1))
            .border_style(if focused {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(search, chunks[0]);

    // Playlist count
    let count = Paragraph::new(count_label(playlist_len))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Playlist "));
    frame.render_widget(count, chunks[1]);
}
