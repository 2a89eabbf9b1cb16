//! Playlist and transport commands

use crate::player::SEEK_STEP_SECS;

use super::AppController;

const VOLUME_STEP: u8 = 5;

impl AppController {
    /// Add the highlighted search result to the playlist.
    pub async fn add_selected_result(&self) {
        let selected = self.model.lock().await.selected_result().await;
        if let Some(track) = selected {
            // Duplicates are reported by the player as a notice
            let _ = self.player.lock().await.add(track);
        }
    }

    /// Play the highlighted playlist entry.
    pub async fn play_selected(&self) {
        let selected = self.model.lock().await.selected_playlist_index().await;
        if let Some(index) = selected {
            self.player.lock().await.play(index);
        }
    }

    pub async fn remove_selected(&self) {
        let selected = self.model.lock().await.selected_playlist_index().await;
        if let Some(index) = selected {
            self.player.lock().await.remove(index);
        }
    }

    pub async fn toggle_playback(&self) {
        self.player.lock().await.toggle();
    }

    pub async fn next_track(&self) {
        self.player.lock().await.next();
    }

    pub async fn previous_track(&self) {
        self.player.lock().await.previous();
    }

    pub async fn stop_playback(&self) {
        self.player.lock().await.stop();
    }

    pub async fn seek_forward(&self) {
        self.player.lock().await.seek_relative(SEEK_STEP_SECS);
    }

    pub async fn seek_backward(&self) {
        self.player.lock().await.seek_relative(-SEEK_STEP_SECS);
    }

    pub async fn volume_up(&self) {
        let mut player = self.player.lock().await;
        let volume = player.volume().saturating_add(VOLUME_STEP).min(100);
        player.set_volume(volume);
    }

    pub async fn volume_down(&self) {
        let mut player = self.player.lock().await;
        let volume = player.volume().saturating_sub(VOLUME_STEP);
        player.set_volume(volume);
    }

    pub async fn toggle_mute(&self) {
        self.player.lock().await.toggle_mute();
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::fixture;
    use crate::model::fixtures::track;
    use crate::model::{ActiveSection, PlaybackStatus};

    #[tokio::test]
    async fn adding_a_result_updates_playlist_view() {
        let mut fx = fixture();
        fx.controller.model.lock().await.set_results(vec![track("a", 30)]).await;

        fx.controller.add_selected_result().await;
        fx.controller.add_selected_result().await;
        fx.settle().await;

        let model = fx.controller.model.lock().await;
        assert_eq!(model.get_playlist().await.len(), 1);
        assert_eq!(model.get_playback_info().await.status, PlaybackStatus::Stopped);
        let notice = model.get_ui_state().await.notice.unwrap();
        assert_eq!(notice.message, "Song already in playlist!");
    }

    #[tokio::test]
    async fn removing_the_last_track_empties_the_view() {
        let mut fx = fixture();
        fx.controller.model.lock().await.set_results(vec![track("a", 30)]).await;
        fx.controller.add_selected_result().await;
        fx.settle().await;

        fx.controller
            .model
            .lock()
            .await
            .set_active_section(ActiveSection::Playlist)
            .await;
        fx.controller.remove_selected().await;
        fx.settle().await;

        let model = fx.controller.model.lock().await;
        assert!(model.get_playlist().await.is_empty());
        let info = model.get_playback_info().await;
        assert_eq!(info.status, PlaybackStatus::Empty);
        assert!(info.track.is_none());
    }

    #[tokio::test]
    async fn volume_steps_are_bounded() {
        let mut fx = fixture();
        for _ in 0..10 {
            fx.controller.volume_up().await;
        }
        fx.settle().await;
        assert_eq!(fx.controller.model.lock().await.get_playback_info().await.volume, 100);

        fx.controller.toggle_mute().await;
        fx.settle().await;
        let info = fx.controller.model.lock().await.get_playback_info().await;
        assert!(info.muted);
        assert_eq!(info.volume, 0);
    }
}
