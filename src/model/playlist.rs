//! Ordered, duplicate-free playlist

use thiserror::Error;

use super::track::{Track, TrackId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("\"{title}\" is already in the playlist")]
    Duplicate { title: String, index: usize },
}

/// Tracks in play order. Indices are always dense and ids unique.
#[derive(Clone, Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track, returning its index.
    pub fn add(&mut self, track: Track) -> Result<usize, PlaylistError> {
        if let Some(index) = self.index_of(&track.id) {
            return Err(PlaylistError::Duplicate {
                title: track.title,
                index,
            });
        }
        self.tracks.push(track);
        Ok(self.tracks.len() - 1)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Track> {
        if index < self.tracks.len() {
            Some(self.tracks.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn count_label(&self) -> String {
        count_label(self.tracks.len())
    }
}

/// "1 Song", "3 Songs"
pub fn count_label(len: usize) -> String {
    match len {
        1 => "1 Song".to_string(),
        n => format!("{} Songs", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::track::fixtures::track;

    #[test]
    fn add_appends_and_reports_index() {
        let mut playlist = Playlist::new();
        assert_eq!(playlist.add(track("a", 30)), Ok(0));
        assert_eq!(playlist.add(track("b", 30)), Ok(1));
        assert_eq!(playlist.index_of(&TrackId::from("b")), Some(1));
    }

    #[test]
    fn duplicate_add_leaves_playlist_unchanged() {
        let mut playlist = Playlist::new();
        playlist.add(track("a", 30)).unwrap();
        playlist.add(track("b", 30)).unwrap();

        let err = playlist.add(track("a", 30)).unwrap_err();
        assert_eq!(
            err,
            PlaylistError::Duplicate {
                title: "Song a".into(),
                index: 0
            }
        );
        assert_eq!(playlist.len(), 2);
    }

    #[test]
    fn remove_keeps_indices_dense() {
        let mut playlist = Playlist::new();
        for id in ["a", "b", "c"] {
            playlist.add(track(id, 30)).unwrap();
        }

        assert_eq!(playlist.remove_at(5), None);
        assert_eq!(playlist.remove_at(1).map(|t| t.id), Some(TrackId::from("b")));
        assert_eq!(playlist.get(1).map(|t| t.id.as_str()), Some("c"));
        assert_eq!(playlist.len(), 2);
    }

    #[test]
    fn count_label_pluralizes() {
        let mut playlist = Playlist::new();
        assert_eq!(playlist.count_label(), "0 Songs");
        playlist.add(track("a", 30)).unwrap();
        assert_eq!(playlist.count_label(), "1 Song");
    }
}
