//! View module - UI rendering
//!
//! - `utils`: Shared helpers (scrollable lists, truncation)
//! - `layout`: Top bar with the search box
//! - `content`: Results and playlist panes
//! - `progress`: Now-playing gauge
//! - `overlays`: Suggestions dropdown, notices, help

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{PlaybackInfo, Track, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState, playlist: &[Track]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + playlist count
                Constraint::Min(0),    // Results + playlist
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        // Top bar: Search + playlist count
        layout::render_top_bar(frame, chunks[0], ui_state, playlist.len());

        // Middle: Search results and the playlist side by side
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(55), // Search results
                Constraint::Percentage(45), // Playlist
            ])
            .split(chunks[1]);

        // Results pane
        content::render_results(frame, main_chunks[0], ui_state);
        // Playlist pane with the now-playing marker
        content::render_playlist(frame, main_chunks[1], ui_state, playlist, playback);

        // Bottom: Progress bar with track info and controls
        progress::render_progress_bar(frame, chunks[2], playback);

        // Suggestions dropdown under the search box (while typing)
        if !ui_state.suggestions.is_empty() {
            overlays::render_suggestions(frame, chunks[0], ui_state);
        }

        // Notice overlay (if there's a notice)
        if ui_state.notice.is_some() {
            overlays::render_notice(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
