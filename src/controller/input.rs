//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Ctrl-Q quits from anywhere, including the search box
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
            && key.modifiers.contains(KeyModifiers::CONTROL)
        {
            model.set_should_quit(true).await;
            return Ok(());
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        match key.code {
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_section_backward().await;
                } else {
                    model.cycle_section_forward().await;
                }
                return Ok(());
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
                return Ok(());
            }
            KeyCode::Up => {
                model.move_selection_up().await;
                return Ok(());
            }
            KeyCode::Down => {
                model.move_selection_down().await;
                return Ok(());
            }
            _ => {}
        }

        // The search box takes every printable key
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Enter => {
                    drop(model);
                    self.submit_search().await;
                }
                KeyCode::Esc => {
                    drop(model);
                    self.clear_search().await;
                }
                KeyCode::Backspace => {
                    let query = model.backspace_search().await;
                    drop(model);
                    self.on_query_edited(&query).await;
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    let query = model.append_to_search(c).await;
                    drop(model);
                    self.on_query_edited(&query).await;
                }
                _ => {}
            }
            return Ok(());
        }

        match (ui_state.active_section, key.code) {
            (ActiveSection::Results, KeyCode::Enter) => {
                drop(model);
                self.add_selected_result().await;
                return Ok(());
            }
            (ActiveSection::Playlist, KeyCode::Enter) => {
                drop(model);
                self.play_selected().await;
                return Ok(());
            }
            (ActiveSection::Playlist, KeyCode::Delete | KeyCode::Backspace) => {
                drop(model);
                self.remove_selected().await;
                return Ok(());
            }
            _ => {}
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Char('/') | KeyCode::Esc => {
                model.set_active_section(ActiveSection::Search).await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_track().await;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_track().await;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                drop(model);
                self.stop_playback().await;
            }
            KeyCode::Right => {
                drop(model);
                self.seek_forward().await;
            }
            KeyCode::Left => {
                drop(model);
                self.seek_backward().await;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.volume_up().await;
            }
            KeyCode::Char('-') => {
                drop(model);
                self.volume_down().await;
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                drop(model);
                self.toggle_mute().await;
            }
            _ => {}
        }
        Ok(())
    }
}
