//! Backend exchange that turns a pending navigation into a one-time SSO payload.
//!
//! The portal backend exposes `GET <exchange>?destinationUrl=<href>` and answers
//! with an opaque token in the response body. The body is consumed verbatim.

use crate::{gate::navigation::NavigationEvent, APP_USER_AGENT};
use reqwest::{header::COOKIE, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::{
    fmt,
    future::Future,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub const DESTINATION_PARAM: &str = "destinationUrl";

// Cache buster, same name jQuery uses for `cache: false`.
pub const CACHE_BUSTER_PARAM: &str = "_";

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("exchange request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("exchange endpoint returned {0}")]
    Status(StatusCode),
    #[error("exchange endpoint returned an empty payload")]
    EmptyPayload,
}

/// Opaque, server-issued token. Never printed.
#[derive(Clone)]
pub struct Payload(SecretString);

impl Payload {
    /// Wrap an exchange response body.
    /// # Errors
    /// Returns `ExchangeError::EmptyPayload` if the body is empty or only whitespace.
    pub fn new(body: impl Into<String>) -> Result<Self, ExchangeError> {
        let body = body.into();

        if body.trim().is_empty() {
            return Err(ExchangeError::EmptyPayload);
        }

        Ok(Self(SecretString::from(body)))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Payload([REDACTED])")
    }
}

/// Source of SSO payloads.
pub trait Exchange: Send + Sync {
    fn exchange(
        &self,
        event: &NavigationEvent,
    ) -> impl Future<Output = Result<Payload, ExchangeError>> + Send;
}

/// [`Exchange`] against the portal backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpExchange {
    client: Client,
    endpoint: Url,
}

impl HttpExchange {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, destination: &Url) -> Url {
        let mut url = self.endpoint.clone();

        url.query_pairs_mut()
            .append_pair(DESTINATION_PARAM, destination.as_str())
            .append_pair(CACHE_BUSTER_PARAM, &cache_buster());

        url
    }
}

impl Exchange for HttpExchange {
    #[instrument(skip(self, event), fields(destination = %event.href()))]
    async fn exchange(&self, event: &NavigationEvent) -> Result<Payload, ExchangeError> {
        let url = self.request_url(event.href());

        let mut request = self.client.get(url);

        if let Some(cookie) = event.cookie() {
            request = request.header(COOKIE, cookie.expose_secret());
        }

        let response = request.send().await?;

        let status = response.status();

        if !status.is_success() {
            return Err(ExchangeError::Status(status));
        }

        let body = response.text().await?;

        debug!("exchange returned {} bytes", body.len());

        Payload::new(body)
    }
}

fn cache_buster() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
        .to_string()
}
