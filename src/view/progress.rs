//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{format_time, PlaybackInfo, PlaybackStatus};

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let status_text = match (&playback.track, playback.status) {
        (None, _) | (_, PlaybackStatus::Empty) => " No track selected".to_string(),
        (Some(track), PlaybackStatus::Playing) => format!(" ▶ {} | {} ({})", track.title, track.artist, track.album),
        (Some(track), PlaybackStatus::Paused) => format!(" ⏸ {} | {} ({})", track.title, track.artist, track.album),
        (Some(track), PlaybackStatus::Stopped) => format!(" ■ {} | {} ({})", track.title, track.artist, track.album),
    };

    let volume_text = if playback.muted {
        "Vol: muted".to_string()
    } else {
        format!("Vol: {}%", playback.volume)
    };

    let time_str = time_label(playback);

    let title = format!("{} ", status_text);
    let controls_info = format!(" {} | h: help ", volume_text);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(playback.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}

/// "elapsed / duration", plus the time left while playing
fn time_label(playback: &PlaybackInfo) -> String {
    let mut label = format!(
        "{} / {}",
        format_time(playback.elapsed_secs),
        format_time(playback.duration_secs)
    );
    if playback.status.is_playing() && playback.duration_secs > 0.0 {
        label.push_str(&format!(" (-{})", format_time(playback.remaining_secs())));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playing_label_shows_time_left() {
        let mut playback = PlaybackInfo {
            status: PlaybackStatus::Playing,
            elapsed_secs: 12.0,
            duration_secs: 30.0,
            ..Default::default()
        };
        assert_eq!(time_label(&playback), "0:12 / 0:30 (-0:18)");

        playback.status = PlaybackStatus::Paused;
        assert_eq!(time_label(&playback), "0:12 / 0:30");
    }
}
