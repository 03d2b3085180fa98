use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let sso_url = matches
        .get_one::<String>("sso-url")
        .cloned()
        .context("missing required argument: --sso-url")?;

    let portal_url = matches
        .get_one::<String>("portal-url")
        .cloned()
        .context("missing required argument: --portal-url")?;

    let exchange_path = matches
        .get_one::<String>("exchange-path")
        .cloned()
        .unwrap_or_else(|| crate::gate::DEFAULT_EXCHANGE_PATH.to_string());

    let exchange_timeout = matches
        .get_one::<u64>("exchange-timeout")
        .copied()
        .unwrap_or(crate::gate::DEFAULT_EXCHANGE_TIMEOUT.as_secs());

    let allowed_hosts = matches
        .get_many::<String>("allowed-host")
        .map(|hosts| hosts.cloned().collect())
        .unwrap_or_default();

    Ok(Action::Server(Args {
        port,
        sso_url,
        portal_url,
        exchange_path,
        exchange_timeout,
        detect_sso_host: matches.get_flag("detect-sso-host"),
        allowed_hosts,
    }))
}
