//! Controller module - Application logic and event handling
//!
//! - `input`: Key event handling
//! - `search`: Live and explicit search orchestration
//! - `playback`: Playlist and transport commands
//! - `player_events`: Folds player events into the model

mod input;
mod playback;
mod player_events;
mod search;

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

use crate::model::{AppModel, SearchTrigger};
use crate::player::{Player, SessionId};
use crate::search::{SearchController, SearchError, SearchOutcome};

/// Work that finishes off the event loop and reports back to it
#[derive(Debug)]
pub enum AppMessage {
    SearchFinished {
        query: String,
        trigger: SearchTrigger,
        result: Result<SearchOutcome, SearchError>,
    },
    Tick(SessionId),
}

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) player: Arc<Mutex<Player>>,
    pub(crate) search: Arc<SearchController>,
    messages: UnboundedSender<AppMessage>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        player: Arc<Mutex<Player>>,
        search: Arc<SearchController>,
        messages: UnboundedSender<AppMessage>,
    ) -> Self {
        Self {
            model,
            player,
            search,
            messages,
        }
    }

    pub async fn handle_message(&self, message: AppMessage) {
        match message {
            AppMessage::Tick(session) => {
                self.player.lock().await.on_tick(session);
            }
            AppMessage::SearchFinished {
                query,
                trigger,
                result,
            } => {
                crate::log_search_result!(query, trigger, result);
                self.apply_search_result(trigger, result).await;
            }
        }
    }
}
