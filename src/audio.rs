//! Audio output backed by rodio
//!
//! The output stream lives on its own thread for the life of the backend.
//! Preview bytes are downloaded and decoded on that thread too, so `load`
//! returns immediately and the event loop never blocks on the network.

use std::io::Cursor;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rodio::{Decoder, OutputStreamBuilder, Sink, Source};

use crate::player::AudioSink;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

enum Command {
    Load { url: String, generation: u64 },
}

#[derive(Default)]
struct Shared {
    generation: u64,
    loaded: bool,
    duration: Option<f64>,
    error: Option<String>,
}

pub struct AudioBackend {
    sink: Arc<Sink>,
    shared: Arc<Mutex<Shared>>,
    commands: Sender<Command>,
}

impl AudioBackend {
    /// Open the default output device.
    pub fn new() -> Result<Self> {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let (commands, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let thread_shared = shared.clone();
        thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || audio_thread(command_rx, ready_tx, thread_shared))
            .context("Failed to spawn audio thread")?;

        let sink = ready_rx
            .recv()
            .map_err(|_| anyhow!("Audio thread exited during start-up"))??;

        tracing::info!("Audio output ready");
        Ok(Self { sink, shared, commands })
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        // Poisoning only means the audio thread panicked mid-update
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn audio_thread(
    commands: Receiver<Command>,
    ready: mpsc::SyncSender<Result<Arc<Sink>>>,
    shared: Arc<Mutex<Shared>>,
) {
    let opened = OutputStreamBuilder::from_default_device()
        .and_then(|builder| builder.open_stream_or_fallback());
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(anyhow!("Failed to open audio output: {}", e)));
            return;
        }
    };
    // The terminal is in raw mode; nothing may be printed on drop
    stream.log_on_drop(false);
    let sink = Arc::new(Sink::connect_new(stream.mixer()));
    if ready.send(Ok(sink.clone())).is_err() {
        return;
    }

    let client = match reqwest::blocking::Client::builder().timeout(FETCH_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build preview client");
            return;
        }
    };

    // Ends when the backend is dropped
    while let Ok(Command::Load { url, generation }) = commands.recv() {
        let result = fetch_source(&client, &url);

        let mut state = shared.lock().unwrap_or_else(|e| e.into_inner());
        if state.generation != generation {
            tracing::debug!(generation, "Discarding superseded preview");
            continue;
        }
        match result {
            Ok(source) => {
                state.duration = source
                    .total_duration()
                    .map(|d| d.as_secs_f64())
                    .filter(|d| *d > 0.0);
                sink.append(source);
                state.loaded = true;
                tracing::debug!(generation, duration = ?state.duration, "Preview loaded");
            }
            Err(e) => {
                tracing::warn!(generation, url = %url, error = %e, "Preview load failed");
                state.error = Some(e.to_string());
            }
        }
    }

    drop(stream);
}

fn fetch_source(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Decoder<Cursor<Vec<u8>>>> {
    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .with_context(|| format!("Failed to download {}", url))?;
    Decoder::new(Cursor::new(bytes.to_vec())).context("Unsupported preview format")
}

impl AudioSink for AudioBackend {
    fn load(&mut self, url: &str) -> Result<()> {
        let generation = {
            let mut state = self.shared();
            state.generation += 1;
            state.loaded = false;
            state.duration = None;
            state.error = None;
            state.generation
        };
        self.sink.clear();
        self.commands
            .send(Command::Load { url: url.to_string(), generation })
            .map_err(|_| anyhow!("Audio thread is not running"))
    }

    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek(&mut self, seconds: f64) {
        if !self.shared().loaded {
            return;
        }
        if let Err(e) = self.sink.try_seek(Duration::from_secs_f64(seconds.max(0.0))) {
            tracing::warn!(seconds, error = %e, "Seek failed");
        }
    }

    fn current_time(&self) -> f64 {
        if self.shared().loaded {
            self.sink.get_pos().as_secs_f64()
        } else {
            0.0
        }
    }

    fn duration(&self) -> Option<f64> {
        self.shared().duration
    }

    fn has_ended(&self) -> bool {
        self.shared().loaded && self.sink.empty()
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn take_error(&mut self) -> Option<String> {
        self.shared().error.take()
    }
}

/// Used when no output device is available. Every load fails, so the
/// player reports previews as unavailable instead of pretending to play.
#[derive(Debug, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn load(&mut self, _url: &str) -> Result<()> {
        Err(anyhow!("No audio output device"))
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn seek(&mut self, _seconds: f64) {}

    fn current_time(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn has_ended(&self) -> bool {
        false
    }

    fn set_volume(&mut self, _volume: f32) {}
}
