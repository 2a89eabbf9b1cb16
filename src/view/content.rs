//! Results and playlist panes

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{
    count_label, format_time, ActiveSection, PlaybackInfo, PlaybackStatus, ResultsStatus, Track,
    UiState,
};
use super::utils::{render_scrollable_list, track_column_widths, truncate_string};

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn track_row(
    index: usize,
    track: &Track,
    widths: (usize, usize, usize, usize),
    marker: &str,
    style: Style,
) -> ListItem<'static> {
    let (num_width, title_width, artist_width, duration_width) = widths;
    let preview = if track.is_playable() { "" } else { " (no preview)" };
    let line = format!(
        "{}{:>num_width$}  {}  {}  {:>duration_width$}",
        marker,
        index + 1,
        truncate_string(&format!("{}{}", track.title, preview), title_width),
        truncate_string(&track.artist, artist_width),
        format_time(f64::from(track.duration_secs)),
    );
    ListItem::new(line).style(style)
}

pub fn render_results(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let is_focused = ui_state.active_section == ActiveSection::Results;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Results ")
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));

    let placeholder = match &ui_state.results_status {
        ResultsStatus::Searching => Some(("Searching...".to_string(), Color::Yellow)),
        ResultsStatus::NoResults => Some((
            "No results found. Try a different search term.".to_string(),
            Color::DarkGray,
        )),
        ResultsStatus::Failed(message) => Some((message.clone(), Color::Red)),
        ResultsStatus::Idle if ui_state.results.is_empty() => Some((
            "Type in search and press Enter to find music\n\nTab moves between sections\nEnter on a result adds it to the playlist".to_string(),
            Color::DarkGray,
        )),
        ResultsStatus::Idle => None,
    };

    if let Some((text, color)) = placeholder {
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(color))
            .wrap(ratatui::widgets::Wrap { trim: false })
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let widths = track_column_widths(content_width, ui_state.results.len());
    let items: Vec<ListItem> = ui_state
        .results
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let style = if i == ui_state.results_selected && is_focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if i == ui_state.results_selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            track_row(i, track, widths, " ", style)
        })
        .collect();

    render_scrollable_list(frame, area, items, ui_state.results_selected, block);
}

pub fn render_playlist(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    playlist: &[Track],
    playback: &PlaybackInfo,
) {
    let is_focused = ui_state.active_section == ActiveSection::Playlist;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Playlist · {} ", count_label(playlist.len())))
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));

    if playlist.is_empty() {
        let empty = Paragraph::new("Your playlist is empty.\nAdd songs from the results.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let widths = track_column_widths(content_width.saturating_sub(1), playlist.len());
    let active = playback.status != PlaybackStatus::Empty;

    let items: Vec<ListItem> = playlist
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_current = active && i == playback.index;
            let marker = match (is_current, playback.status) {
                (true, PlaybackStatus::Playing) => "▶",
                (true, PlaybackStatus::Paused) => "⏸",
                (true, _) => "■",
                _ => " ",
            };
            let style = if i == ui_state.playlist_selected && is_focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default().fg(Color::Cyan)
            } else if i == ui_state.playlist_selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            track_row(i, track, widths, marker, style)
        })
        .collect();

    render_scrollable_list(frame, area, items, ui_state.playlist_selected, block);
}
