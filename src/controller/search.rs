//! Live and explicit search orchestration

use crate::model::{ResultsStatus, SearchTrigger, Track};
use crate::search::{SearchError, SearchOutcome, MIN_LIVE_QUERY_CHARS};

use super::{AppController, AppMessage};

impl AppController {
    /// The search box changed. Long enough, new queries get live suggestions;
    /// anything shorter hides them and abandons the pending search.
    pub async fn on_query_edited(&self, query: &str) {
        let query = query.trim();
        let model = self.model.lock().await;

        if query.chars().count() < MIN_LIVE_QUERY_CHARS {
            model.clear_suggestions().await;
            drop(model);
            self.search.cancel();
            return;
        }

        if !model.mark_live_query(query).await {
            return;
        }
        // Suggestions for the old text are stale now
        model.set_suggestions(Vec::new()).await;
        drop(model);
        self.spawn_search(query.to_string(), SearchTrigger::Live);
    }

    /// Enter in the search box: search the highlighted suggestion if any,
    /// else the typed query.
    pub async fn submit_search(&self) {
        let model = self.model.lock().await;
        let query = match model.selected_suggestion().await {
            Some(track) => {
                let query = suggestion_query(&track);
                model.update_search_query(query.clone()).await;
                query
            }
            None => model.get_ui_state().await.search_query,
        };

        if query.trim().is_empty() {
            return;
        }
        model.begin_search().await;
        drop(model);
        self.spawn_search(query, SearchTrigger::Explicit);
    }

    /// Esc in the search box
    pub async fn clear_search(&self) {
        let model = self.model.lock().await;
        model.update_search_query(String::new()).await;
        model.clear_suggestions().await;
        drop(model);
        self.search.cancel();
    }

    fn spawn_search(&self, query: String, trigger: SearchTrigger) {
        // Supersede on this task so spawned searches keep call order
        let ticket = self.search.begin();
        let search = self.search.clone();
        let messages = self.messages.clone();
        tracing::debug!(query = %query, ?trigger, "Dispatching search");

        tokio::spawn(async move {
            let result = search.run(ticket, &query, trigger).await;
            let _ = messages.send(AppMessage::SearchFinished { query, trigger, result });
        });
    }

    pub(crate) async fn apply_search_result(
        &self,
        trigger: SearchTrigger,
        result: Result<SearchOutcome, SearchError>,
    ) {
        let model = self.model.lock().await;

        let notice = match &result {
            Ok(outcome) => outcome.notice(trigger),
            Err(e) => e.notice(trigger),
        };

        match (trigger, result) {
            // Superseded searches leave no trace
            (_, Err(SearchError::Cancelled { timed_out: false })) => return,
            (SearchTrigger::Live, Ok(SearchOutcome::Found { tracks, .. })) => {
                model.set_suggestions(tracks).await;
            }
            // Nothing found or a failure while typing: no UI change
            (SearchTrigger::Live, _) => {}
            (SearchTrigger::Explicit, Ok(SearchOutcome::Found { tracks, .. })) => {
                model.set_results(tracks).await;
            }
            (SearchTrigger::Explicit, Ok(SearchOutcome::NoResults)) => {
                model.set_results_status(ResultsStatus::NoResults).await;
            }
            (SearchTrigger::Explicit, Ok(SearchOutcome::Blank)) => {
                model.set_results_status(ResultsStatus::Idle).await;
            }
            (SearchTrigger::Explicit, Err(_)) => {
                let message = notice
                    .as_ref()
                    .map(|n| n.message.clone())
                    .unwrap_or_else(|| "Search failed".to_string());
                model.set_results_status(ResultsStatus::Failed(message)).await;
            }
        }

        if let Some(notice) = notice {
            model.show_notice(notice).await;
        }
    }
}

/// Selecting a suggestion searches for its title and artist together.
fn suggestion_query(track: &Track) -> String {
    format!("{} {}", track.title, track.artist)
}
