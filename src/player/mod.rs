//! Playback controller
//!
//! `Player` owns the playlist, the "now playing" pointer and the audio sink.
//! All mutation happens through `&mut self` on the application's event loop,
//! so playlist edits and progress ticks are serialized. Every observable
//! change is published as a [`PlayerEvent`].

mod scheduler;
mod sink;

pub use scheduler::{
    IntervalScheduler, SessionId, TickScheduler, DEFAULT_TICK_INTERVAL, MAX_TICK_INTERVAL,
};
pub use sink::AudioSink;

use tokio::sync::mpsc::UnboundedSender;

use crate::model::{
    Notice, PlaybackInfo, PlaybackStatus, Playlist, PlaylistError, Track, DEFAULT_VOLUME_PERCENT,
};

/// Advance once the position is this close to the end
pub const END_MARGIN_SECS: f64 = 0.5;

/// Tracks longer than this are only heard as a preview
pub const PREVIEW_LENGTH_SECS: u32 = 30;

/// Seek step for the transport keys
pub const SEEK_STEP_SECS: f64 = 5.0;

const UNAVAILABLE: &str = "Audio preview not available for this song.";
const LOAD_FAILED: &str = "Preview not available. Some songs only have 30-second previews.";
const PREVIEW_ONLY: &str = "Playing 30-second preview. Full tracks require premium API access.";
const NOTHING_PLAYABLE: &str = "No playable previews in this playlist.";

#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    PlaylistChanged { tracks: Vec<Track> },
    TrackChanged { index: usize, track: Track },
    StatusChanged(PlaybackStatus),
    Progress { elapsed: f64, duration: f64 },
    VolumeChanged { volume: u8, muted: bool },
    Notice(Notice),
}

pub struct Player {
    playlist: Playlist,
    current: usize,
    status: PlaybackStatus,
    session: SessionId,
    advanced_session: Option<SessionId>,
    unplayable: bool,
    skip_streak: usize,
    volume: u8,
    muted: bool,
    sink: Box<dyn AudioSink>,
    scheduler: Box<dyn TickScheduler>,
    events: UnboundedSender<PlayerEvent>,
}

impl Player {
    pub fn new(
        sink: Box<dyn AudioSink>,
        scheduler: Box<dyn TickScheduler>,
        events: UnboundedSender<PlayerEvent>,
    ) -> Self {
        let mut player = Self {
            playlist: Playlist::new(),
            current: 0,
            status: PlaybackStatus::Empty,
            session: 0,
            advanced_session: None,
            unplayable: false,
            skip_streak: 0,
            volume: DEFAULT_VOLUME_PERCENT,
            muted: false,
            sink,
            scheduler,
            events,
        };
        player.sink.set_volume(f32::from(player.volume) / 100.0);
        player
    }

    pub fn with_volume(mut self, volume: u8) -> Self {
        self.set_volume(volume);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.current)
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn snapshot(&self) -> PlaybackInfo {
        let elapsed_secs = match self.status {
            PlaybackStatus::Playing | PlaybackStatus::Paused if !self.unplayable => {
                self.sink.current_time()
            }
            _ => 0.0,
        };
        PlaybackInfo {
            track: self.current_track().cloned(),
            index: self.current,
            status: self.status,
            elapsed_secs,
            duration_secs: self.effective_duration(),
            volume: self.volume,
            muted: self.muted,
        }
    }

    // ========================================================================
    // Playlist edits
    // ========================================================================

    /// Append a track. Duplicates (same id) are rejected with a notice.
    pub fn add(&mut self, track: Track) -> Result<usize, PlaylistError> {
        let title = track.title.clone();
        match self.playlist.add(track) {
            Ok(index) => {
                tracing::info!(index, title = %title, "Added track to playlist");
                if self.status == PlaybackStatus::Empty {
                    self.current = 0;
                    self.set_status(PlaybackStatus::Stopped);
                    if let Some(track) = self.playlist.get(0).cloned() {
                        self.emit(PlayerEvent::TrackChanged { index: 0, track });
                    }
                }
                self.emit_playlist();
                self.notify(Notice::info(format!("Added \"{}\" to playlist!", title)));
                Ok(index)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected playlist add");
                self.notify(Notice::warning("Song already in playlist!"));
                Err(e)
            }
        }
    }

    /// Remove the track at `index`. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        let removed = self.playlist.remove_at(index)?;
        self.skip_streak = 0;
        tracing::info!(index, title = %removed.title, "Removed track from playlist");

        if self.playlist.is_empty() {
            self.halt();
            self.current = 0;
            self.set_status(PlaybackStatus::Empty);
        } else if index < self.current {
            self.current -= 1;
            self.emit_current();
        } else if index == self.current {
            self.halt();
            self.current = self.current.min(self.playlist.len() - 1);
            self.set_status(PlaybackStatus::Stopped);
            self.emit_current();
        }

        self.emit_playlist();
        Some(removed)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Load and start the track at `index`, wrapping past the end.
    pub fn play(&mut self, index: usize) {
        self.skip_streak = 0;
        self.play_wrapped(index);
    }

    pub fn pause(&mut self) {
        if !self.status.is_playing() {
            return;
        }
        self.sink.pause();
        self.scheduler.cancel();
        self.set_status(PlaybackStatus::Paused);
    }

    pub fn resume(&mut self) {
        if self.status != PlaybackStatus::Paused {
            return;
        }
        if !self.unplayable {
            self.sink.play();
        }
        self.set_status(PlaybackStatus::Playing);
        self.scheduler.start(self.session);
    }

    /// Play/pause. From Stopped this plays the current track.
    pub fn toggle(&mut self) {
        match self.status {
            PlaybackStatus::Empty => {}
            PlaybackStatus::Stopped => self.play(self.current),
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Paused => self.resume(),
        }
    }

    pub fn next(&mut self) {
        self.skip_streak = 0;
        self.advance();
    }

    pub fn previous(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        let len = self.playlist.len();
        self.play((self.current + len - 1) % len);
    }

    /// Halt playback and rewind to the start of the current track.
    pub fn stop(&mut self) {
        self.skip_streak = 0;
        if self.status == PlaybackStatus::Empty {
            return;
        }
        self.halt();
        self.set_status(PlaybackStatus::Stopped);
    }

    /// Seek within the loaded preview, clamped to its length.
    pub fn seek(&mut self, seconds: f64) {
        if !matches!(self.status, PlaybackStatus::Playing | PlaybackStatus::Paused)
            || self.unplayable
        {
            return;
        }
        let duration = self.effective_duration();
        let target = if seconds.is_finite() { seconds.clamp(0.0, duration.max(0.0)) } else { 0.0 };
        tracing::debug!(target, "Seeking");
        self.sink.seek(target);
        self.emit(PlayerEvent::Progress { elapsed: target, duration });
    }

    pub fn seek_relative(&mut self, delta: f64) {
        let position = self.sink.current_time();
        self.seek(position + delta);
    }

    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.volume = volume;
        self.muted = volume == 0;
        self.sink.set_volume(f32::from(volume) / 100.0);
        self.emit(PlayerEvent::VolumeChanged { volume, muted: self.muted });
    }

    /// Mute, or restore the default level when already silent.
    pub fn toggle_mute(&mut self) {
        if self.muted || self.volume == 0 {
            self.set_volume(DEFAULT_VOLUME_PERCENT);
        } else {
            self.set_volume(0);
        }
    }

    // ========================================================================
    // Progress
    // ========================================================================

    /// Handle one progress tick. Ticks from any session but the live one are
    /// ignored, and each session advances at most once.
    pub fn on_tick(&mut self, session: SessionId) {
        if session != self.session
            || self.status != PlaybackStatus::Playing
            || self.advanced_session == Some(session)
        {
            return;
        }

        if let Some(error) = self.sink.take_error() {
            tracing::warn!(session, error = %error, "Preview failed to play");
            self.sink.pause();
            self.unplayable = true;
            self.notify(Notice::warning(LOAD_FAILED));
            return;
        }

        if self.unplayable {
            self.skip_streak += 1;
            if self.skip_streak >= self.playlist.len() {
                tracing::warn!(skipped = self.skip_streak, "Nothing playable, stopping");
                self.stop();
                self.notify(Notice::warning(NOTHING_PLAYABLE));
                return;
            }
            self.advanced_session = Some(session);
            tracing::debug!(session, index = self.current, "Skipping unplayable track");
            self.advance();
            return;
        }

        self.skip_streak = 0;
        let elapsed = self.sink.current_time();
        let duration = self.effective_duration();
        self.emit(PlayerEvent::Progress { elapsed, duration });

        let reached_end =
            self.sink.has_ended() || (duration > 0.0 && elapsed >= duration - END_MARGIN_SECS);
        if reached_end {
            self.advanced_session = Some(session);
            tracing::debug!(session, elapsed, duration, "Track finished, advancing");
            self.advance();
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Move to the following entry without touching the skip streak.
    fn advance(&mut self) {
        self.play_wrapped(self.current + 1);
    }

    fn play_wrapped(&mut self, index: usize) {
        if self.playlist.is_empty() {
            return;
        }
        self.start_session(index % self.playlist.len());
    }

    fn start_session(&mut self, index: usize) {
        self.scheduler.cancel();
        self.session += 1;
        self.current = index;
        self.unplayable = false;

        let Some(track) = self.playlist.get(index).cloned() else {
            return;
        };
        tracing::info!(session = self.session, index, track = %track.display_name(), "Starting track");
        self.emit(PlayerEvent::TrackChanged { index, track: track.clone() });

        match track.preview_url.as_deref() {
            Some(url) => match self.sink.load(url) {
                Ok(()) => {
                    self.sink.play();
                    if track.duration_secs > PREVIEW_LENGTH_SECS {
                        self.notify(Notice::info(PREVIEW_ONLY));
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, url, "Failed to load preview");
                    self.sink.pause();
                    self.unplayable = true;
                    self.notify(Notice::warning(LOAD_FAILED));
                }
            },
            None => {
                self.sink.pause();
                self.unplayable = true;
                self.notify(Notice::warning(UNAVAILABLE));
            }
        }

        self.set_status(PlaybackStatus::Playing);
        let duration = self.effective_duration();
        self.emit(PlayerEvent::Progress { elapsed: 0.0, duration });
        self.scheduler.start(self.session);
    }

    /// Silence the sink, rewind, and stop the progress loop.
    fn halt(&mut self) {
        self.scheduler.cancel();
        if matches!(self.status, PlaybackStatus::Playing | PlaybackStatus::Paused) {
            self.sink.pause();
            if !self.unplayable {
                self.sink.seek(0.0);
            }
        }
        let duration = self.effective_duration();
        self.emit(PlayerEvent::Progress { elapsed: 0.0, duration });
    }

    /// The sink's own length when known, else the track's nominal duration
    fn effective_duration(&self) -> f64 {
        let loaded = matches!(self.status, PlaybackStatus::Playing | PlaybackStatus::Paused)
            && !self.unplayable;
        let reported = if loaded { self.sink.duration() } else { None };
        reported
            .filter(|d| d.is_finite() && *d > 0.0)
            .or_else(|| self.current_track().map(|t| f64::from(t.duration_secs)))
            .unwrap_or(0.0)
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            tracing::debug!(from = ?self.status, to = ?status, "Playback status changed");
            self.status = status;
            self.emit(PlayerEvent::StatusChanged(status));
        }
    }

    fn emit_current(&mut self) {
        if let Some(track) = self.current_track().cloned() {
            self.emit(PlayerEvent::TrackChanged { index: self.current, track });
        }
    }

    fn emit_playlist(&mut self) {
        let tracks = self.playlist.tracks().to_vec();
        self.emit(PlayerEvent::PlaylistChanged { tracks });
    }

    fn notify(&mut self, notice: Notice) {
        self.emit(PlayerEvent::Notice(notice));
    }

    fn emit(&mut self, event: PlayerEvent) {
        // The receiver only goes away during shutdown
        let _ = self.events.send(event);
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.scheduler.cancel();
    }
}
