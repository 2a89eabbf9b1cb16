//! Playback-related types shared between the player and the view

use super::track::Track;

pub const DEFAULT_VOLUME_PERCENT: u8 = 70;

/// Lifecycle of the "now playing" pointer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// The playlist has no tracks
    #[default]
    Empty,
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn is_playing(self) -> bool {
        self == PlaybackStatus::Playing
    }
}

/// Format seconds as `m:ss`. Negative, NaN and infinite input render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Complete playback information for rendering the UI
#[derive(Clone, Debug)]
pub struct PlaybackInfo {
    pub track: Option<Track>,
    pub index: usize,
    pub status: PlaybackStatus,
    pub elapsed_secs: f64,
    pub duration_secs: f64,
    pub volume: u8,
    pub muted: bool,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            track: None,
            index: 0,
            status: PlaybackStatus::Empty,
            elapsed_secs: 0.0,
            duration_secs: 0.0,
            volume: DEFAULT_VOLUME_PERCENT,
            muted: false,
        }
    }
}

impl PlaybackInfo {
    pub fn progress_ratio(&self) -> f64 {
        if self.duration_secs > 0.0 {
            (self.elapsed_secs / self.duration_secs).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn remaining_secs(&self) -> f64 {
        (self.duration_secs - self.elapsed_secs).max(0.0)
    }
}
