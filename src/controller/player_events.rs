//! Player event listener

use tokio::sync::mpsc::UnboundedReceiver;

use crate::player::PlayerEvent;
use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut events: UnboundedReceiver<PlayerEvent>) {
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if controller.model.lock().await.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }
                controller.apply_player_event(event).await;
            }
        });
    }

    pub(crate) async fn apply_player_event(&self, event: PlayerEvent) {
        let model = self.model.lock().await;
        match event {
            PlayerEvent::PlaylistChanged { tracks } => {
                tracing::debug!(len = tracks.len(), "PlayerEvent::PlaylistChanged");
                model.set_playlist(tracks).await;
            }
            PlayerEvent::TrackChanged { index, track } => {
                tracing::debug!(index, title = %track.title, "PlayerEvent::TrackChanged");
                model.set_current_track(index, track).await;
            }
            PlayerEvent::StatusChanged(status) => {
                tracing::debug!(?status, "PlayerEvent::StatusChanged");
                model.set_playback_status(status).await;
            }
            PlayerEvent::Progress { elapsed, duration } => {
                tracing::trace!(elapsed, duration, "PlayerEvent::Progress");
                model.update_progress(elapsed, duration).await;
            }
            PlayerEvent::VolumeChanged { volume, muted } => {
                model.set_volume(volume, muted).await;
            }
            PlayerEvent::Notice(notice) => {
                tracing::debug!(message = %notice.message, "PlayerEvent::Notice");
                model.show_notice(notice).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::fixture;
    use super::*;
    use crate::model::fixtures::track;
    use crate::model::PlaybackStatus;

    #[tokio::test]
    async fn events_fold_into_now_playing() {
        let fx = fixture();
        let c = &fx.controller;
        c.apply_player_event(PlayerEvent::TrackChanged { index: 1, track: track("b", 40) }).await;
        c.apply_player_event(PlayerEvent::StatusChanged(PlaybackStatus::Playing)).await;
        c.apply_player_event(PlayerEvent::Progress { elapsed: 10.0, duration: 30.0 }).await;

        let info = c.model.lock().await.get_playback_info().await;
        assert_eq!(info.index, 1);
        assert_eq!(info.status, PlaybackStatus::Playing);
        assert_eq!(info.duration_secs, 30.0);
        assert_eq!(crate::model::format_time(info.elapsed_secs), "0:10");
    }
}
