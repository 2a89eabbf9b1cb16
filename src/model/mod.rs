//! Model module - Application state and data types
//!
//! - `types`: UI state, notices and search modes
//! - `track`: Track metadata shared by every provider
//! - `cache`: Bounded cache of search results
//! - `playlist`: The ordered, duplicate-free playlist
//! - `playback`: Playback status and time formatting
//! - `app_model`: Render state the view draws from

mod types;
mod track;
mod cache;
mod playlist;
mod playback;
mod app_model;

pub use types::{
    ActiveSection, Notice, NoticeLevel, ResultsStatus, SearchMode, SearchTrigger, UiState,
    NOTICE_TTL,
};

pub use track::{Covers, Track, TrackId};
pub(crate) use track::non_empty;
#[cfg(test)]
pub(crate) use track::fixtures;

pub use cache::{CacheKey, SearchCache, SEARCH_CACHE_CAPACITY};

pub use playlist::{count_label, Playlist, PlaylistError};

pub use playback::{format_time, PlaybackInfo, PlaybackStatus, DEFAULT_VOLUME_PERCENT};

pub use app_model::AppModel;
