//! HTTP transports used to reach a search provider
//!
//! The direct transport talks to the provider itself. The proxy transport goes
//! through a generic passthrough service (`<proxy>?url=<encoded target>`),
//! which is the fallback when the direct route fails.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::Value;

use super::error::TransportError;

/// A fully-built provider request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRequest {
    pub url: Url,
    pub bearer: Option<String>,
}

impl ProviderRequest {
    pub fn new(url: Url) -> Self {
        Self { url, bearer: None }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Perform the request and return the provider's JSON body.
    async fn fetch(&self, request: &ProviderRequest) -> Result<Value, TransportError>;
}

/// Calls the provider directly
#[derive(Clone, Debug, Default)]
pub struct DirectTransport {
    client: Client,
}

impl DirectTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, request: &ProviderRequest) -> Result<Value, TransportError> {
        let mut builder = self
            .client
            .get(request.url.clone())
            .header(ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

/// Reaches the provider through a passthrough proxy.
///
/// The proxy cannot forward credentials, so bearer tokens are not sent.
#[derive(Clone, Debug)]
pub struct ProxyTransport {
    client: Client,
    base: Url,
}

impl ProxyTransport {
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    pub fn proxied_url(&self, target: &Url) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("url", target.as_str());
        url
    }
}

#[async_trait]
impl Transport for ProxyTransport {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn fetch(&self, request: &ProviderRequest) -> Result<Value, TransportError> {
        let url = self.proxied_url(&request.url);
        tracing::debug!(proxy = %self.base, "Fetching through proxy");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;
        let body = response.json::<Value>().await?;
        unwrap_envelope(body)
    }
}

/// Strip a passthrough envelope.
///
/// `{"contents": "<json text>"}` is decoded; any other body (including a
/// provider's own `{"data": [...]}`) is returned untouched.
pub fn unwrap_envelope(body: Value) -> Result<Value, TransportError> {
    match body {
        Value::Object(mut map) if map.contains_key("contents") => {
            match map.remove("contents") {
                Some(Value::String(text)) => serde_json::from_str(&text)
                    .map_err(|e| TransportError::Body(format!("proxy contents: {}", e))),
                Some(Value::Null) | None => Ok(Value::Object(map)),
                Some(inner) => Ok(inner),
            }
        }
        other => Ok(other),
    }
}
