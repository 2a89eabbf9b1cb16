//! The audio output the player drives

use anyhow::Result;

/// An audio output capable of playing one preview at a time.
///
/// Only the `Player` holds one, so position changes never race.
pub trait AudioSink: Send {
    /// Replace the current source. Loading may finish in the background;
    /// failures discovered later are reported through [`AudioSink::take_error`].
    fn load(&mut self, url: &str) -> Result<()>;

    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64);

    /// Playback position of the loaded source, in seconds
    fn current_time(&self) -> f64;

    /// Length of the loaded source if the decoder knows it
    fn duration(&self) -> Option<f64>;

    /// True once the loaded source has played to its end
    fn has_ended(&self) -> bool;

    /// 0.0 is silent, 1.0 is full volume
    fn set_volume(&mut self, volume: f32);

    /// A load or playback failure since the last call, if any
    fn take_error(&mut self) -> Option<String> {
        None
    }
}
