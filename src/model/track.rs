//! Track metadata as returned by a search provider

use std::fmt;

/// Provider-scoped track identifier.
///
/// Providers that use numeric ids have them stored in their decimal form so
/// that ids from every provider compare the same way.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for TrackId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Cover art at the resolutions a provider happens to offer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Covers {
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
}

impl Covers {
    /// Medium is what a list row wants; fall back to whatever exists.
    pub fn best(&self) -> Option<&str> {
        self.medium
            .as_deref()
            .or(self.large.as_deref())
            .or(self.small.as_deref())
    }
}

/// A search result. Never mutated after the provider response is decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub covers: Covers,
    pub duration_secs: u32,
    pub preview_url: Option<String>,
    pub link: Option<String>,
}

impl Track {
    pub fn is_playable(&self) -> bool {
        self.preview_url.is_some()
    }

    /// "Title - Artist", used by notices and the log.
    pub fn display_name(&self) -> String {
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artist)
        }
    }
}

/// Treat empty strings in a payload the same as a missing field.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
