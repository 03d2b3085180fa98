//! # SSO Gate
//!
//! `sso-gate` sits between portal pages and outbound links that need a
//! single-sign-on handoff. For every navigation it decides whether the target
//! takes part in SSO:
//!
//! - **Passthrough:** the link is not an SSO link (or the exchange failed), the
//!   browser simply continues to the original `href`.
//! - **Redirect:** the portal backend mints a one-time payload for the
//!   destination (`GET /ssoout?destinationUrl=...`) and the browser is handed an
//!   auto-submitting form that POSTs `payload=<token>` to the SSO URL.
//!
//! The decision is always known before anything is written back to the client,
//! the exchange is awaited instead of blocking the caller.

pub mod api;
pub mod cli;
pub mod gate;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
