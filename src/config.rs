//! Runtime configuration
//!
//! Values come from the process environment, after an optional `.env` in the
//! working directory has been merged in. Every key is optional.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;

use crate::model::DEFAULT_VOLUME_PERCENT;
use crate::player::{DEFAULT_TICK_INTERVAL, MAX_TICK_INTERVAL};
use crate::search::{SearchConfig, DEFAULT_DEBOUNCE, DEFAULT_SEARCH_TIMEOUT};

pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/raw";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Deezer,
    Spotify { access_token: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub provider: ProviderKind,
    /// `None` disables the proxy fallback
    pub proxy_url: Option<Url>,
    pub search: SearchConfig,
    pub tick_interval: Duration,
    pub volume: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Deezer,
            proxy_url: Url::parse(DEFAULT_PROXY_URL).ok(),
            search: SearchConfig::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            volume: DEFAULT_VOLUME_PERCENT,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self> {
        match dotenv::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env"),
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let provider = match get("PLAYER_PROVIDER").as_deref() {
            None | Some("") | Some("deezer") => ProviderKind::Deezer,
            Some("spotify") => {
                let access_token = get("SPOTIFY_ACCESS_TOKEN")
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| anyhow!("SPOTIFY_ACCESS_TOKEN is required for the spotify provider"))?;
                ProviderKind::Spotify { access_token }
            }
            Some(other) => bail!("PLAYER_PROVIDER: unknown provider '{}'", other),
        };

        let proxy_url = match get("PLAYER_PROXY_URL") {
            None => defaults.proxy_url,
            Some(v) if v.is_empty() => None,
            Some(v) => Some(Url::parse(&v).with_context(|| format!("PLAYER_PROXY_URL: '{}'", v))?),
        };

        let millis = |key: &str, default: Duration| -> Result<Duration> {
            Ok(parse_number::<u64>(&get, key)?
                .map(Duration::from_millis)
                .unwrap_or(default))
        };

        let search = SearchConfig {
            debounce: millis("PLAYER_DEBOUNCE_MS", DEFAULT_DEBOUNCE)?,
            timeout: millis("PLAYER_SEARCH_TIMEOUT_MS", DEFAULT_SEARCH_TIMEOUT)?,
            suggestion_limit: parse_number(&get, "PLAYER_SUGGESTION_LIMIT")?
                .unwrap_or(defaults.search.suggestion_limit),
            result_limit: parse_number(&get, "PLAYER_RESULT_LIMIT")?
                .unwrap_or(defaults.search.result_limit),
        };
        if search.suggestion_limit == 0 || search.result_limit == 0 {
            bail!("PLAYER_SUGGESTION_LIMIT and PLAYER_RESULT_LIMIT must be at least 1");
        }

        let tick_interval = millis("PLAYER_TICK_MS", DEFAULT_TICK_INTERVAL)?
            .clamp(Duration::from_millis(10), MAX_TICK_INTERVAL);

        let volume = parse_number::<u8>(&get, "PLAYER_VOLUME")?
            .unwrap_or(defaults.volume)
            .min(100);

        Ok(Self { provider, proxy_url, search, tick_interval, volume })
    }
}

fn parse_number<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|e| anyhow!("{}: invalid number '{}': {}", key, v, e)),
    }
}
