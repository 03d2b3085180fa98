//! SSO redirect gate.
//!
//! Every navigation resolves to a [`Decision`]. Links that take part in SSO go
//! through one backend exchange first: a payload turns the navigation into a
//! POST to the SSO URL, any failure lets the original navigation continue.

pub mod exchange;
pub mod form;
pub mod navigation;

pub use self::exchange::{Exchange, ExchangeError, HttpExchange, Payload};
pub use self::form::RedirectForm;
pub use self::navigation::NavigationEvent;

use std::{collections::BTreeSet, time::Duration};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const DEFAULT_EXCHANGE_PATH: &str = "/ssoout";
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GateError {
    #[error("invalid {name} URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{name} URL must use http or https: {url}")]
    UnsupportedScheme { name: &'static str, url: String },
    #[error("{name} URL has no host: {url}")]
    MissingHost { name: &'static str, url: String },
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Gate configuration, the SSO URL replaces any page-global lookup.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub sso_url: Url,
    pub portal_url: Url,
    pub exchange_path: String,
    pub exchange_timeout: Duration,
    pub detect_sso_host: bool,
    /// Destination hosts (`host[:port]`) the gate may send a browser to, the
    /// SSO host is always allowed.
    pub allowed_hosts: BTreeSet<String>,
}

impl GateConfig {
    /// # Errors
    /// Returns an error if either URL is not an absolute http(s) URL with a host.
    pub fn new(sso_url: &str, portal_url: &str) -> Result<Self, GateError> {
        Ok(Self {
            sso_url: parse_http_url("sso", sso_url)?,
            portal_url: parse_http_url("portal", portal_url)?,
            exchange_path: DEFAULT_EXCHANGE_PATH.to_string(),
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
            detect_sso_host: false,
            allowed_hosts: BTreeSet::new(),
        })
    }

    #[must_use]
    pub fn with_exchange_path(mut self, path: impl Into<String>) -> Self {
        self.exchange_path = path.into();
        self
    }

    #[must_use]
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_detect_sso_host(mut self, detect: bool) -> Self {
        self.detect_sso_host = detect;
        self
    }

    #[must_use]
    pub fn with_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_hosts.extend(
            hosts
                .into_iter()
                .map(|host| host.as_ref().trim().to_ascii_lowercase())
                .filter(|host| !host.is_empty()),
        );
        self
    }

    /// Exchange endpoint, `exchange_path` resolved against the portal URL.
    /// # Errors
    /// Returns an error if the path does not form a valid URL.
    pub fn exchange_url(&self) -> Result<Url, GateError> {
        self.portal_url
            .join(&self.exchange_path)
            .map_err(|source| GateError::InvalidUrl {
                name: "exchange",
                source,
            })
    }
}

/// Parse an absolute `http`/`https` URL with a host.
/// # Errors
/// Returns an error naming `name` if the URL is invalid.
pub fn parse_http_url(name: &'static str, value: &str) -> Result<Url, GateError> {
    let url = Url::parse(value).map_err(|source| GateError::InvalidUrl { name, source })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(GateError::UnsupportedScheme {
            name,
            url: url.to_string(),
        });
    }

    if url.host_str().is_none() {
        return Err(GateError::MissingHost {
            name,
            url: url.to_string(),
        });
    }

    Ok(url)
}

/// Why a navigation does or does not go through the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participation {
    /// The link was explicitly tagged for SSO.
    Tagged,
    /// Untagged link pointing at the SSO host, host detection enabled.
    SsoHost,
    NotRequired,
}

impl Participation {
    #[must_use]
    pub fn requires_exchange(self) -> bool {
        !matches!(self, Self::NotRequired)
    }
}

/// Outcome of a navigation.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Continue to the original link.
    Passthrough { href: Url },
    /// Cancel the original navigation and submit the form instead.
    Redirect(RedirectForm),
}

impl Decision {
    /// `true` when the original navigation must not happen.
    #[must_use]
    pub fn cancels_navigation(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    #[must_use]
    pub fn form(&self) -> Option<&RedirectForm> {
        match self {
            Self::Redirect(form) => Some(form),
            Self::Passthrough { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct SsoGate<E> {
    exchange: E,
    sso_url: Url,
    sso_host: String,
    detect_sso_host: bool,
    allowed_hosts: BTreeSet<String>,
}

impl SsoGate<HttpExchange> {
    /// Build a gate backed by the portal's HTTP exchange endpoint.
    /// # Errors
    /// Returns an error if the exchange URL or the HTTP client cannot be built.
    pub fn from_config(config: &GateConfig) -> Result<Self, GateError> {
        let exchange = HttpExchange::new(config.exchange_url()?, config.exchange_timeout)?;

        Self::new(config, exchange)
    }
}

impl<E: Exchange> SsoGate<E> {
    /// # Errors
    /// Returns an error if the SSO URL has no host.
    pub fn new(config: &GateConfig, exchange: E) -> Result<Self, GateError> {
        let sso_host =
            navigation::host_with_port(&config.sso_url).ok_or_else(|| GateError::MissingHost {
                name: "sso",
                url: config.sso_url.to_string(),
            })?;

        let mut allowed_hosts = config.allowed_hosts.clone();
        allowed_hosts.insert(sso_host.clone());

        Ok(Self {
            exchange,
            sso_url: config.sso_url.clone(),
            allowed_hosts,
            sso_host,
            detect_sso_host: config.detect_sso_host,
        })
    }

    #[must_use]
    pub fn sso_url(&self) -> &Url {
        &self.sso_url
    }

    /// `true` if `href` points at an allowed destination host.
    #[must_use]
    pub fn allows(&self, href: &Url) -> bool {
        navigation::host_with_port(href).is_some_and(|host| self.allowed_hosts.contains(&host))
    }

    #[must_use]
    pub fn participation(&self, event: &NavigationEvent) -> Participation {
        match event.sso() {
            Some(true) => Participation::Tagged,
            Some(false) => Participation::NotRequired,
            None if self.detect_sso_host
                && event.host().as_deref() == Some(self.sso_host.as_str()) =>
            {
                Participation::SsoHost
            }
            None => Participation::NotRequired,
        }
    }

    /// Resolve a navigation. Exchange failures are never fatal, they resolve to
    /// [`Decision::Passthrough`].
    #[instrument(skip(self, event), fields(href = %event.href()))]
    pub async fn resolve(&self, event: &NavigationEvent) -> Decision {
        let participation = self.participation(event);

        if !participation.requires_exchange() {
            debug!("no SSO required");

            return Decision::Passthrough {
                href: event.href().clone(),
            };
        }

        match self.exchange.exchange(event).await {
            Ok(payload) => {
                info!(?participation, sso_url = %self.sso_url, "redirecting through SSO");

                Decision::Redirect(RedirectForm::new(self.sso_url.clone(), payload))
            }

            Err(e) => {
                warn!("SSO exchange failed, continuing to original link: {}", e);

                Decision::Passthrough {
                    href: event.href().clone(),
                }
            }
        }
    }
}
