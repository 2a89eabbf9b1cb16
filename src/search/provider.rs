//! Search providers: request building and response decoding
//!
//! Only the handful of fields the player needs are read from each payload.

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use super::error::{PayloadError, TransportError};
use super::transport::ProviderRequest;
use crate::model::{Covers, Track, TrackId};
use crate::model::non_empty;

pub const DEEZER_SEARCH_URL: &str = "https://api.deezer.com/search";
pub const SPOTIFY_SEARCH_URL: &str = "https://api.spotify.com/v1/search";

pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn request(&self, query: &str, limit: usize) -> Result<ProviderRequest, TransportError>;

    /// Decode a response body. An error-shaped body is a `PayloadError`.
    fn decode(&self, body: Value) -> Result<Vec<Track>, PayloadError>;
}

/// Ids arrive as numbers from some providers and strings from others
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl From<RawId> for TrackId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => TrackId::from(n),
            RawId::Text(s) => TrackId::new(s),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn build_url(base: &str, params: &[(&str, String)]) -> Result<Url, TransportError> {
    Url::parse_with_params(base, params).map_err(|e| TransportError::InvalidUrl(e.to_string()))
}

fn payload_error(error: ErrorBody) -> PayloadError {
    PayloadError(error.message.unwrap_or_else(|| "API error".to_string()))
}

// ============================================================================
// Deezer
// ============================================================================

#[derive(Debug, Deserialize)]
struct DeezerResponse {
    #[serde(default)]
    data: Option<Vec<DeezerTrack>>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    id: RawId,
    title: String,
    #[serde(default)]
    duration: u32,
    #[serde(default)]
    preview: Option<String>,
    #[serde(default)]
    link: Option<String>,
    artist: DeezerArtist,
    album: DeezerAlbum,
}

#[derive(Debug, Deserialize)]
struct DeezerArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DeezerAlbum {
    #[serde(default)]
    title: String,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    cover_small: Option<String>,
    #[serde(default)]
    cover_medium: Option<String>,
    #[serde(default)]
    cover_big: Option<String>,
}

impl From<DeezerTrack> for Track {
    fn from(t: DeezerTrack) -> Self {
        Track {
            id: t.id.into(),
            title: t.title,
            artist: t.artist.name,
            album: t.album.title,
            covers: Covers {
                small: non_empty(t.album.cover_small),
                medium: non_empty(t.album.cover_medium),
                large: non_empty(t.album.cover_big).or(non_empty(t.album.cover)),
            },
            duration_secs: t.duration,
            preview_url: non_empty(t.preview),
            link: non_empty(t.link),
        }
    }
}

/// Deezer's public search API. No credentials needed.
#[derive(Clone, Debug, Default)]
pub struct Deezer;

impl SearchProvider for Deezer {
    fn name(&self) -> &'static str {
        "deezer"
    }

    fn request(&self, query: &str, limit: usize) -> Result<ProviderRequest, TransportError> {
        let url = build_url(
            DEEZER_SEARCH_URL,
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )?;
        Ok(ProviderRequest::new(url))
    }

    fn decode(&self, body: Value) -> Result<Vec<Track>, PayloadError> {
        let response: DeezerResponse = serde_json::from_value(body)
            .map_err(|e| PayloadError(format!("unexpected response: {}", e)))?;

        if let Some(error) = response.error {
            return Err(payload_error(error));
        }
        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(Track::from)
            .collect())
    }
}

// ============================================================================
// Spotify
// ============================================================================

#[derive(Debug, Deserialize)]
struct SpotifyResponse {
    #[serde(default)]
    tracks: Option<SpotifyPage>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct SpotifyPage {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: Option<String>,
    name: String,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: SpotifyAlbum,
    #[serde(default)]
    external_urls: Option<SpotifyExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    #[serde(default)]
    name: String,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

impl SpotifyTrack {
    /// Local files have no id and can't be previewed.
    fn into_track(self) -> Option<Track> {
        let id = self.id?;
        let artist = self
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        // Images come largest first: 640, 300, 64
        let mut images = self.album.images.into_iter().map(|i| i.url);
        let large = images.next();
        let medium = images.next();
        let small = images.next();

        Some(Track {
            id: TrackId::new(id),
            title: self.name,
            artist,
            album: self.album.name,
            covers: Covers { small, medium, large },
            duration_secs: (self.duration_ms / 1000) as u32,
            preview_url: non_empty(self.preview_url),
            link: self.external_urls.and_then(|u| non_empty(u.spotify)),
        })
    }
}

/// Spotify Web API search. The access token is obtained elsewhere.
#[derive(Clone)]
pub struct Spotify {
    access_token: String,
}

impl Spotify {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

impl std::fmt::Debug for Spotify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spotify").finish_non_exhaustive()
    }
}

impl SearchProvider for Spotify {
    fn name(&self) -> &'static str {
        "spotify"
    }

    fn request(&self, query: &str, limit: usize) -> Result<ProviderRequest, TransportError> {
        let url = build_url(
            SPOTIFY_SEARCH_URL,
            &[
                ("q", query.to_string()),
                ("type", "track".to_string()),
                ("limit", limit.min(50).to_string()),
            ],
        )?;
        Ok(ProviderRequest::new(url).with_bearer(self.access_token.clone()))
    }

    fn decode(&self, body: Value) -> Result<Vec<Track>, PayloadError> {
        let response: SpotifyResponse = serde_json::from_value(body)
            .map_err(|e| PayloadError(format!("unexpected response: {}", e)))?;

        if let Some(error) = response.error {
            return Err(payload_error(error));
        }
        Ok(response
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(SpotifyTrack::into_track)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deezer_request_carries_query_and_limit() {
        let request = Deezer.request("daft punk", 5).unwrap();
        let pairs: Vec<_> = request.url.query_pairs().collect();
        assert_eq!(pairs[0].1, "daft punk");
        assert_eq!(pairs[1].1, "5");
        assert!(request.bearer.is_none());
    }

    #[test]
    fn deezer_tracks_are_decoded() {
        let body = json!({
            "data": [{
                "id": 3135556,
                "title": "Harder, Better, Faster, Stronger",
                "duration": 224,
                "preview": "https://cdns-preview.test/1.mp3",
                "link": "https://www.deezer.com/track/3135556",
                "artist": { "name": "Daft Punk" },
                "album": {
                    "title": "Discovery",
                    "cover": "https://img.test/cover.jpg",
                    "cover_small": "https://img.test/56.jpg",
                    "cover_medium": "https://img.test/250.jpg"
                }
            }],
            "total": 1
        });

        let tracks = Deezer.decode(body).unwrap();
        assert_eq!(tracks.len(), 1);
        let track = &tracks[0];
        assert_eq!(track.id.as_str(), "3135556");
        assert_eq!(track.artist, "Daft Punk");
        assert_eq!(track.album, "Discovery");
        assert_eq!(track.duration_secs, 224);
        assert_eq!(track.covers.best(), Some("https://img.test/250.jpg"));
        assert_eq!(track.covers.large.as_deref(), Some("https://img.test/cover.jpg"));
        assert!(track.is_playable());
    }

    #[test]
    fn deezer_empty_preview_is_unplayable() {
        let body = json!({
            "data": [{
                "id": "7", "title": "Quiet", "preview": "",
                "artist": { "name": "Nobody" }, "album": { "title": "Silence" }
            }]
        });
        let tracks = Deezer.decode(body).unwrap();
        assert!(!tracks[0].is_playable());
        assert_eq!(tracks[0].duration_secs, 0);
    }

    #[test]
    fn deezer_error_body_is_a_payload_error() {
        let body = json!({ "error": { "type": "Exception", "message": "Quota limit exceeded", "code": 4 } });
        assert_eq!(
            Deezer.decode(body),
            Err(PayloadError("Quota limit exceeded".into()))
        );
    }

    #[test]
    fn missing_data_means_no_results() {
        assert_eq!(Deezer.decode(json!({ "total": 0 })), Ok(vec![]));
    }

    #[test]
    fn unexpected_shape_is_a_payload_error() {
        assert!(Deezer.decode(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn spotify_request_is_authorized() {
        let request = Spotify::new("token-123").request("muse", 80).unwrap();
        assert_eq!(request.bearer.as_deref(), Some("token-123"));
        assert!(request.url.as_str().contains("type=track"));
        assert!(request.url.as_str().contains("limit=50"));
    }

    #[test]
    fn spotify_tracks_are_decoded() {
        let body = json!({
            "tracks": {
                "items": [
                    {
                        "id": "4uLU6hMCjMI75M1A2tKUQC",
                        "name": "Starlight",
                        "duration_ms": 240960,
                        "preview_url": null,
                        "artists": [{ "name": "Muse" }, { "name": "Guest" }],
                        "album": {
                            "name": "Black Holes and Revelations",
                            "images": [
                                { "url": "https://i.test/640" },
                                { "url": "https://i.test/300" },
                                { "url": "https://i.test/64" }
                            ]
                        },
                        "external_urls": { "spotify": "https://open.spotify.com/track/x" }
                    },
                    {
                        "id": null,
                        "name": "Local file",
                        "album": { "name": "" }
                    }
                ]
            }
        });

        let tracks = Spotify::new("t").decode(body).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].artist, "Muse, Guest");
        assert_eq!(tracks[0].duration_secs, 240);
        assert_eq!(tracks[0].covers.best(), Some("https://i.test/300"));
        assert!(!tracks[0].is_playable());
        assert_eq!(tracks[0].link.as_deref(), Some("https://open.spotify.com/track/x"));
    }

    #[test]
    fn spotify_error_body_is_a_payload_error() {
        let body = json!({ "error": { "status": 401, "message": "The access token expired" } });
        assert_eq!(
            Spotify::new("t").decode(body),
            Err(PayloadError("The access token expired".into()))
        );
    }
}
