use crate::{
    api,
    gate::{GateConfig, SsoGate},
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub sso_url: String,
    pub portal_url: String,
    pub exchange_path: String,
    pub exchange_timeout: u64,
    pub detect_sso_host: bool,
    pub allowed_hosts: Vec<String>,
}

impl Args {
    /// # Errors
    /// Returns an error if the URLs are not valid http(s) URLs.
    pub fn gate_config(&self) -> Result<GateConfig> {
        let config = GateConfig::new(&self.sso_url, &self.portal_url)
            .context("Invalid gate configuration")?
            .with_exchange_path(self.exchange_path.clone())
            .with_exchange_timeout(Duration::from_secs(self.exchange_timeout))
            .with_detect_sso_host(self.detect_sso_host)
            .with_allowed_hosts(&self.allowed_hosts);

        Ok(config)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the gate cannot be configured or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let config = args.gate_config()?;

    let exchange_url = config
        .exchange_url()
        .context("Invalid exchange endpoint")?;

    log_startup_args(&args, exchange_url.as_str());

    let gate = SsoGate::from_config(&config).context("Could not build SSO gate")?;

    debug!("Gate config: {:?}", config);

    api::new(args.port, Arc::new(gate)).await
}

fn log_startup_args(args: &Args, exchange_url: &str) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("sso_url", args.sso_url.clone()),
        ("exchange_url", exchange_url.to_string()),
        ("exchange_timeout", format!("{}s", args.exchange_timeout)),
        ("detect_sso_host", args.detect_sso_host.to_string()),
        ("allowed_hosts", args.allowed_hosts.join(",")),
    ];

    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    let mut message = format!(
        "{} - {} - {}\n\n{title}:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );

    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }

    info!("{message}");
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}
