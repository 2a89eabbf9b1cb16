//! Core type definitions for the application

use std::time::{Duration, Instant};

use super::track::Track;

/// How long a transient notice stays on screen
pub const NOTICE_TTL: Duration = Duration::from_secs(2);

/// Which kind of result list a search produces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Few results, used for autocomplete while typing
    Suggestions,
    /// The full result list shown after submitting
    Full,
}

/// What started a search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchTrigger {
    /// Debounced search issued while the user is typing
    Live,
    /// Enter / selecting a suggestion
    Explicit,
}

impl SearchTrigger {
    pub fn mode(self) -> SearchMode {
        match self {
            SearchTrigger::Live => SearchMode::Suggestions,
            SearchTrigger::Explicit => SearchMode::Full,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient, user-visible message
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: Instant,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Results,
    Playlist,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Results,
            ActiveSection::Results => ActiveSection::Playlist,
            ActiveSection::Playlist => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Playlist,
            ActiveSection::Results => ActiveSection::Search,
            ActiveSection::Playlist => ActiveSection::Results,
        }
    }
}

/// What the results pane is currently showing
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ResultsStatus {
    #[default]
    Idle,
    Searching,
    NoResults,
    Failed(String),
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    /// Last query a live search was issued for, to skip repeats
    pub last_live_query: String,
    pub suggestions: Vec<Track>,
    /// Highlighted suggestion, if the cursor is in the dropdown
    pub suggestion_selected: Option<usize>,
    pub results: Vec<Track>,
    pub results_status: ResultsStatus,
    pub results_selected: usize,
    pub playlist_selected: usize,
    pub notice: Option<Notice>,
    pub show_help_popup: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Search,
            search_query: String::new(),
            last_live_query: String::new(),
            suggestions: Vec::new(),
            suggestion_selected: None,
            results: Vec::new(),
            results_status: ResultsStatus::Idle,
            results_selected: 0,
            playlist_selected: 0,
            notice: None,
            show_help_popup: false,
        }
    }
}
