use secrecy::SecretString;
use url::Url;

/// A user-initiated link activation.
#[derive(Debug, Clone)]
pub struct NavigationEvent {
    href: Url,
    sso: Option<bool>,
    cookie: Option<SecretString>,
}

impl NavigationEvent {
    #[must_use]
    pub fn new(href: Url) -> Self {
        Self {
            href,
            sso: None,
            cookie: None,
        }
    }

    /// Explicit SSO participation flag as tagged on the link, `None` when the
    /// link carries no tag.
    #[must_use]
    pub fn with_sso(mut self, sso: Option<bool>) -> Self {
        self.sso = sso;
        self
    }

    /// `Cookie` header of the originating request, forwarded to the exchange.
    #[must_use]
    pub fn with_cookie(mut self, cookie: Option<SecretString>) -> Self {
        self.cookie = cookie;
        self
    }

    #[must_use]
    pub fn href(&self) -> &Url {
        &self.href
    }

    #[must_use]
    pub fn host(&self) -> Option<String> {
        host_with_port(&self.href)
    }

    #[must_use]
    pub fn sso(&self) -> Option<bool> {
        self.sso
    }

    #[must_use]
    pub fn cookie(&self) -> Option<&SecretString> {
        self.cookie.as_ref()
    }
}

/// `host[:port]` as an anchor element reports it, default ports are omitted.
pub(crate) fn host_with_port(url: &Url) -> Option<String> {
    let host = url.host_str()?;

    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
