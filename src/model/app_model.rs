//! Main application model with state management
//!
//! This is the render side: it holds what the view draws and is only ever
//! updated from player events, search outcomes and key input.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::playback::{PlaybackInfo, PlaybackStatus};
use super::track::Track;
use super::types::{ActiveSection, Notice, ResultsStatus, UiState, NOTICE_TTL};

pub struct AppModel {
    playback: Arc<Mutex<PlaybackInfo>>,
    playlist: Arc<Mutex<Vec<Track>>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            playback: Arc::new(Mutex::new(PlaybackInfo::default())),
            playlist: Arc::new(Mutex::new(Vec::new())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // Playback State
    // ========================================================================

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        self.playback.lock().await.clone()
    }

    pub async fn set_playback_status(&self, status: PlaybackStatus) {
        let mut playback = self.playback.lock().await;
        playback.status = status;
        if status == PlaybackStatus::Empty {
            playback.track = None;
            playback.index = 0;
            playback.elapsed_secs = 0.0;
            playback.duration_secs = 0.0;
        }
    }

    pub async fn set_current_track(&self, index: usize, track: Track) {
        let mut playback = self.playback.lock().await;
        playback.duration_secs = f64::from(track.duration_secs);
        playback.elapsed_secs = 0.0;
        playback.index = index;
        playback.track = Some(track);
    }

    pub async fn update_progress(&self, elapsed: f64, duration: f64) {
        let mut playback = self.playback.lock().await;
        playback.elapsed_secs = elapsed;
        playback.duration_secs = duration;
    }

    pub async fn set_volume(&self, volume: u8, muted: bool) {
        let mut playback = self.playback.lock().await;
        playback.volume = volume;
        playback.muted = muted;
    }

    // ========================================================================
    // Playlist
    // ========================================================================

    pub async fn get_playlist(&self) -> Vec<Track> {
        self.playlist.lock().await.clone()
    }

    /// Replace the playlist snapshot, keeping the cursor in range.
    pub async fn set_playlist(&self, tracks: Vec<Track>) {
        let len = tracks.len();
        *self.playlist.lock().await = tracks;
        let mut state = self.ui_state.lock().await;
        state.playlist_selected = state.playlist_selected.min(len.saturating_sub(1));
    }

    pub async fn selected_playlist_index(&self) -> Option<usize> {
        let len = self.playlist.lock().await.len();
        let selected = self.ui_state.lock().await.playlist_selected;
        (selected < len).then_some(selected)
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
        state.suggestion_selected = None;
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
        state.suggestion_selected = None;
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Search => {
                state.suggestion_selected = match state.suggestion_selected {
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
            }
            ActiveSection::Results => {
                state.results_selected = state.results_selected.saturating_sub(1);
            }
            ActiveSection::Playlist => {
                state.playlist_selected = state.playlist_selected.saturating_sub(1);
            }
        }
    }

    pub async fn move_selection_down(&self) {
        let playlist_len = self.playlist.lock().await.len();
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Search => {
                if state.suggestions.is_empty() {
                    return;
                }
                let last = state.suggestions.len() - 1;
                state.suggestion_selected = Some(match state.suggestion_selected {
                    None => 0,
                    Some(i) => (i + 1).min(last),
                });
            }
            ActiveSection::Results => {
                if state.results_selected + 1 < state.results.len() {
                    state.results_selected += 1;
                }
            }
            ActiveSection::Playlist => {
                if state.playlist_selected + 1 < playlist_len {
                    state.playlist_selected += 1;
                }
            }
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Append to the query and return the new text.
    pub async fn append_to_search(&self, c: char) -> String {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
        state.suggestion_selected = None;
        state.search_query.clone()
    }

    /// Delete the last character and return the new text.
    pub async fn backspace_search(&self) -> String {
        let mut state = self.ui_state.lock().await;
        state.search_query.pop();
        state.suggestion_selected = None;
        state.search_query.clone()
    }

    pub async fn update_search_query(&self, query: String) {
        let mut state = self.ui_state.lock().await;
        state.search_query = query;
        state.suggestion_selected = None;
    }

    /// Record `query` as the latest live search. Returns false when it
    /// repeats the previous one.
    pub async fn mark_live_query(&self, query: &str) -> bool {
        let mut state = self.ui_state.lock().await;
        if state.last_live_query == query {
            return false;
        }
        state.last_live_query = query.to_string();
        true
    }

    /// Hide the dropdown and forget the last live query.
    pub async fn clear_suggestions(&self) {
        let mut state = self.ui_state.lock().await;
        state.suggestions.clear();
        state.suggestion_selected = None;
        state.last_live_query.clear();
    }

    pub async fn set_suggestions(&self, tracks: Vec<Track>) {
        let mut state = self.ui_state.lock().await;
        state.suggestions = tracks;
        state.suggestion_selected = None;
    }

    pub async fn selected_suggestion(&self) -> Option<Track> {
        let state = self.ui_state.lock().await;
        state
            .suggestion_selected
            .and_then(|i| state.suggestions.get(i).cloned())
    }

    /// An explicit search is about to run.
    pub async fn begin_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.suggestions.clear();
        state.suggestion_selected = None;
        state.results_status = ResultsStatus::Searching;
    }

    pub async fn set_results(&self, tracks: Vec<Track>) {
        let mut state = self.ui_state.lock().await;
        state.results = tracks;
        state.results_selected = 0;
        state.results_status = ResultsStatus::Idle;
    }

    pub async fn set_results_status(&self, status: ResultsStatus) {
        let mut state = self.ui_state.lock().await;
        if status == ResultsStatus::NoResults {
            state.results.clear();
            state.results_selected = 0;
        }
        state.results_status = status;
    }

    pub async fn selected_result(&self) -> Option<Track> {
        let state = self.ui_state.lock().await;
        state.results.get(state.results_selected).cloned()
    }

    // ========================================================================
    // Notices & Popups
    // ========================================================================

    pub async fn show_notice(&self, notice: Notice) {
        self.ui_state.lock().await.notice = Some(notice);
    }

    pub async fn auto_clear_old_notice(&self) {
        let mut state = self.ui_state.lock().await;
        if state.notice.as_ref().is_some_and(|n| n.is_expired(NOTICE_TTL)) {
            state.notice = None;
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::track::fixtures::track;

    #[tokio::test]
    async fn repeated_live_query_is_skipped() {
        let model = AppModel::new();
        assert!(model.mark_live_query("daft").await);
        assert!(!model.mark_live_query("daft").await);
        assert!(model.mark_live_query("daft p").await);

        model.clear_suggestions().await;
        assert!(model.mark_live_query("daft p").await);
    }

    #[tokio::test]
    async fn suggestion_cursor_stays_in_range() {
        let model = AppModel::new();
        model.set_suggestions(vec![track("a", 30), track("b", 30)]).await;

        model.move_selection_down().await;
        model.move_selection_down().await;
        model.move_selection_down().await;
        assert_eq!(model.selected_suggestion().await.unwrap().id.as_str(), "b");

        model.move_selection_up().await;
        model.move_selection_up().await;
        assert!(model.selected_suggestion().await.is_none());
    }

    #[tokio::test]
    async fn shrinking_playlist_clamps_cursor() {
        let model = AppModel::new();
        model.set_active_section(ActiveSection::Playlist).await;
        model.set_playlist(vec![track("a", 30), track("b", 30), track("c", 30)]).await;
        model.move_selection_down().await;
        model.move_selection_down().await;
        assert_eq!(model.selected_playlist_index().await, Some(2));

        model.set_playlist(vec![track("a", 30)]).await;
        assert_eq!(model.selected_playlist_index().await, Some(0));

        model.set_playlist(Vec::new()).await;
        assert_eq!(model.selected_playlist_index().await, None);
    }

    #[tokio::test]
    async fn no_results_clears_previous_results() {
        let model = AppModel::new();
        model.set_results(vec![track("a", 30)]).await;
        model.set_results_status(ResultsStatus::NoResults).await;

        let state = model.get_ui_state().await;
        assert!(state.results.is_empty());
        assert_eq!(state.results_status, ResultsStatus::NoResults);
    }

    #[tokio::test]
    async fn empty_status_clears_now_playing() {
        let model = AppModel::new();
        model.set_current_track(2, track("c", 30)).await;
        model.update_progress(12.0, 30.0).await;
        model.set_playback_status(PlaybackStatus::Empty).await;

        let info = model.get_playback_info().await;
        assert!(info.track.is_none());
        assert_eq!(info.index, 0);
        assert_eq!(info.elapsed_secs, 0.0);
    }
}
