use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::Mutex;

use preview_player::audio::{AudioBackend, SilentSink};
use preview_player::config::{Config, ProviderKind};
use preview_player::controller::{AppController, AppMessage};
use preview_player::logging;
use preview_player::model::AppModel;
use preview_player::player::{AudioSink, IntervalScheduler, Player};
use preview_player::search::{
    Deezer, DirectTransport, ProxyTransport, SearchController, SearchProvider, Spotify, Transport,
};
use preview_player::view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Preview Player Starting ===");

    let config = Config::load()?;
    let search = build_search(&config)?;
    tracing::info!(
        provider = search.provider_name(),
        proxy = config.proxy_url.as_ref().map(|u| u.as_str()).unwrap_or("disabled"),
        "Search configured"
    );

    let (message_tx, message_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let sink: Box<dyn AudioSink> = match AudioBackend::new() {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            tracing::warn!(error = %e, "No audio output, previews will be unavailable");
            Box::new(SilentSink)
        }
    };
    let scheduler = IntervalScheduler::new(config.tick_interval, message_tx.clone(), AppMessage::Tick);
    let player = Player::new(sink, Box::new(scheduler), event_tx).with_volume(config.volume);

    let model = Arc::new(Mutex::new(AppModel::new()));
    let controller = AppController::new(
        model.clone(),
        Arc::new(Mutex::new(player)),
        Arc::new(search),
        message_tx,
    );
    controller.start_player_event_listener(event_rx);

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller, message_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Preview Player shutting down");
    Ok(())
}

fn build_search(config: &Config) -> Result<SearchController> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("preview-player/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let provider: Arc<dyn SearchProvider> = match &config.provider {
        ProviderKind::Deezer => Arc::new(Deezer),
        ProviderKind::Spotify { access_token } => Arc::new(Spotify::new(access_token.clone())),
    };
    let fallback = config
        .proxy_url
        .clone()
        .map(|url| Arc::new(ProxyTransport::new(client.clone(), url)) as Arc<dyn Transport>);

    Ok(SearchController::new(
        provider,
        Arc::new(DirectTransport::new(client)),
        fallback,
        config.search.clone(),
    ))
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
    mut messages: UnboundedReceiver<AppMessage>,
) -> io::Result<()> {
    loop {
        // Ticks and finished searches
        while let Ok(message) = messages.try_recv() {
            controller.handle_message(message).await;
        }

        let (playback, ui_state, playlist, should_quit) = {
            let model_guard = model.lock().await;
            model_guard.auto_clear_old_notice().await;
            (
                model_guard.get_playback_info().await,
                model_guard.get_ui_state().await,
                model_guard.get_playlist().await,
                model_guard.should_quit().await,
            )
        };

        if should_quit {
            break;
        }

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &playlist);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
