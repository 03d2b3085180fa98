pub mod health;
pub use self::health::health;

pub mod navigate;
pub use self::navigate::navigate;

pub mod decision;
pub use self::decision::decision;

// common functions for the handlers
use crate::gate::{parse_http_url, Exchange, NavigationEvent, SsoGate};
use axum::http::{header::COOKIE, HeaderMap, StatusCode};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

/// Query string shared by `/navigate` and `/decision`.
#[derive(Deserialize, Debug)]
pub struct NavigationQuery {
    href: String,
    #[serde(default)]
    sso: Option<bool>,
}

/// Build the navigation event for a request. Only absolute http(s) links to an
/// allowed destination host are accepted, the gate must never redirect or mint
/// a payload for an arbitrary site.
pub fn navigation_event<E: Exchange>(
    gate: &SsoGate<E>,
    query: NavigationQuery,
    headers: &HeaderMap,
) -> Result<NavigationEvent, (StatusCode, String)> {
    let href = parse_http_url("link", &query.href).map_err(|e| {
        debug!("rejected navigation: {}", e);

        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    if !gate.allows(&href) {
        debug!("rejected navigation to host not allowed: {}", href);

        return Err((
            StatusCode::BAD_REQUEST,
            format!("link host is not allowed: {}", href.host_str().unwrap_or("")),
        ));
    }

    let cookie = headers.get(COOKIE).and_then(|value| match value.to_str() {
        Ok(value) => Some(SecretString::from(value.to_string())),
        Err(_) => {
            debug!("dropping Cookie header with non-visible ASCII bytes");
            None
        }
    });

    Ok(NavigationEvent::new(href)
        .with_sso(query.sso)
        .with_cookie(cookie))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{GateConfig, HttpExchange};
    use anyhow::Result;
    use axum::http::HeaderValue;

    fn gate() -> Result<SsoGate<HttpExchange>> {
        let config = GateConfig::new("https://sso.example/ssoin", "https://portal.example/")?
            .with_allowed_hosts(["service.example"]);
        Ok(SsoGate::from_config(&config)?)
    }

    fn query(href: &str, sso: Option<bool>) -> NavigationQuery {
        NavigationQuery {
            href: href.to_string(),
            sso,
        }
    }

    #[test]
    fn test_navigation_event() -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("PLAY_SESSION=abc"));

        let event = navigation_event(
            &gate()?,
            query("https://service.example/page", Some(true)),
            &headers,
        );
        assert!(event.is_ok());

        if let Ok(event) = event {
            assert_eq!(event.href().as_str(), "https://service.example/page");
            assert_eq!(event.sso(), Some(true));
            assert!(event.cookie().is_some());
        }
        Ok(())
    }

    #[test]
    fn test_navigation_event_allows_sso_host() -> Result<()> {
        let event = navigation_event(
            &gate()?,
            query("https://sso.example/account", None),
            &HeaderMap::new(),
        );
        assert!(event.is_ok());
        Ok(())
    }

    #[test]
    fn test_navigation_event_rejects_foreign_host() -> Result<()> {
        let result = navigation_event(
            &gate()?,
            query("https://evil.attacker/phish", Some(true)),
            &HeaderMap::new(),
        );
        assert!(matches!(result, Err((StatusCode::BAD_REQUEST, _))));
        Ok(())
    }

    #[test]
    fn test_navigation_event_rejects_relative_href() -> Result<()> {
        let result = navigation_event(&gate()?, query("/page", None), &HeaderMap::new());
        assert!(matches!(result, Err((StatusCode::BAD_REQUEST, _))));
        Ok(())
    }

    #[test]
    fn test_navigation_event_rejects_script_href() -> Result<()> {
        let result = navigation_event(
            &gate()?,
            query("javascript:alert(1)", None),
            &HeaderMap::new(),
        );
        assert!(matches!(result, Err((StatusCode::BAD_REQUEST, _))));
        Ok(())
    }

    #[test]
    fn test_navigation_event_drops_non_ascii_cookie() -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_bytes(b"PLAY_SESSION=\xff")?);

        let event = navigation_event(
            &gate()?,
            query("https://service.example/page", Some(true)),
            &headers,
        );
        assert!(event.is_ok());

        if let Ok(event) = event {
            assert!(event.cookie().is_none());
        }
        Ok(())
    }
}
