//! Search failure taxonomy

use thiserror::Error;

use crate::model::{Notice, SearchTrigger};

/// Failure to get a usable HTTP response out of a transport.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("unreadable response: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else if err.is_decode() || err.is_body() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// The provider answered, but with an error body or a shape we can't read.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct PayloadError(pub String);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Superseded by a newer search, or out of time.
    #[error("search cancelled")]
    Cancelled { timed_out: bool },
    #[error("unable to connect to search service ({0})")]
    Transport(#[source] TransportError),
    #[error("search service error: {0}")]
    Payload(#[from] PayloadError),
}

impl SearchError {
    /// The message to show for this failure, if any.
    ///
    /// Live searches never show errors. Explicit searches stay silent when
    /// superseded but report timeouts and service failures.
    pub fn notice(&self, trigger: SearchTrigger) -> Option<Notice> {
        if trigger == SearchTrigger::Live {
            return None;
        }
        match self {
            SearchError::Cancelled { timed_out: false } => None,
            SearchError::Cancelled { timed_out: true } => {
                Some(Notice::error("Search failed: the search service did not respond. Please try again."))
            }
            other => Some(Notice::error(format!("Error: {}. Please try again.", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_failures_are_silent() {
        let errors = [
            SearchError::Cancelled { timed_out: true },
            SearchError::Transport(TransportError::Status(502)),
            SearchError::Payload(PayloadError("quota".into())),
        ];
        for err in errors {
            assert!(err.notice(SearchTrigger::Live).is_none(), "{err}");
        }
    }

    #[test]
    fn explicit_supersession_is_silent_but_timeout_is_not() {
        let superseded = SearchError::Cancelled { timed_out: false };
        assert!(superseded.notice(SearchTrigger::Explicit).is_none());

        let timed_out = SearchError::Cancelled { timed_out: true };
        let notice = timed_out.notice(SearchTrigger::Explicit).expect("timeout is reported");
        assert!(notice.message.starts_with("Search failed"));
    }

    #[test]
    fn explicit_transport_failure_mentions_cause() {
        let err = SearchError::Transport(TransportError::Status(503));
        let notice = err.notice(SearchTrigger::Explicit).unwrap();
        assert!(notice.message.contains("HTTP 503"));
    }
}
