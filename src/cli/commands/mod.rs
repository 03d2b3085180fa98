use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("sso-gate")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("SSO_GATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("sso-url")
                .long("sso-url")
                .help("SSO endpoint receiving the payload, example: https://sso.tld/ssoin")
                .env("SSO_GATE_SSO_URL")
                .required(true),
        )
        .arg(
            Arg::new("portal-url")
                .long("portal-url")
                .help("Portal base URL hosting the exchange endpoint")
                .env("SSO_GATE_PORTAL_URL")
                .required(true),
        )
        .arg(
            Arg::new("exchange-path")
                .long("exchange-path")
                .help("Exchange endpoint path, relative to the portal URL")
                .default_value("/ssoout")
                .env("SSO_GATE_EXCHANGE_PATH"),
        )
        .arg(
            Arg::new("exchange-timeout")
                .long("exchange-timeout")
                .help("Exchange request timeout in seconds")
                .default_value("10")
                .env("SSO_GATE_EXCHANGE_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("allowed-host")
                .long("allowed-host")
                .help("Destination host[:port] links may point at, repeatable (the SSO host is always allowed)")
                .env("SSO_GATE_ALLOWED_HOSTS")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("detect-sso-host")
                .long("detect-sso-host")
                .help("Gate untagged links that point at the SSO host")
                .env("SSO_GATE_DETECT_SSO_HOST")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("SSO_GATE_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED_ENV: [(&str, Option<&str>); 2] = [
        ("SSO_GATE_SSO_URL", Some("https://sso.tld/ssoin")),
        ("SSO_GATE_PORTAL_URL", Some("https://portal.tld")),
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "sso-gate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_args() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "sso-gate",
            "--port",
            "8081",
            "--sso-url",
            "https://sso.tld/ssoin",
            "--portal-url",
            "https://portal.tld",
            "--exchange-path",
            "/sso/out",
            "--exchange-timeout",
            "3",
            "--detect-sso-host",
            "--allowed-host",
            "service.tld",
            "--allowed-host",
            "other.tld:8443",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8081));
        assert_eq!(
            matches
                .get_many::<String>("allowed-host")
                .map(|hosts| hosts.cloned().collect::<Vec<_>>()),
            Some(vec!["service.tld".to_string(), "other.tld:8443".to_string()])
        );
        assert_eq!(
            matches.get_one::<String>("sso-url").cloned(),
            Some("https://sso.tld/ssoin".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("portal-url").cloned(),
            Some("https://portal.tld".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("exchange-path").cloned(),
            Some("/sso/out".to_string())
        );
        assert_eq!(matches.get_one::<u64>("exchange-timeout").copied(), Some(3));
        assert!(matches.get_flag("detect-sso-host"));
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("SSO_GATE_PORT", None::<&str>),
                ("SSO_GATE_EXCHANGE_PATH", None),
                ("SSO_GATE_EXCHANGE_TIMEOUT", None),
                ("SSO_GATE_DETECT_SSO_HOST", None),
                ("SSO_GATE_ALLOWED_HOSTS", None),
                ("SSO_GATE_LOG_LEVEL", None),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "sso-gate",
                    "--sso-url",
                    "https://sso.tld/ssoin",
                    "--portal-url",
                    "https://portal.tld",
                ]);

                assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
                assert_eq!(
                    matches.get_one::<String>("exchange-path").cloned(),
                    Some("/ssoout".to_string())
                );
                assert_eq!(
                    matches.get_one::<u64>("exchange-timeout").copied(),
                    Some(10)
                );
                assert!(!matches.get_flag("detect-sso-host"));
                assert!(matches.get_many::<String>("allowed-host").is_none());
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("SSO_GATE_SSO_URL", Some("https://sso.tld/ssoin")),
                ("SSO_GATE_PORTAL_URL", Some("https://portal.tld")),
                ("SSO_GATE_PORT", Some("443")),
                ("SSO_GATE_EXCHANGE_TIMEOUT", Some("5")),
                ("SSO_GATE_DETECT_SSO_HOST", Some("true")),
                ("SSO_GATE_ALLOWED_HOSTS", Some("service.tld,other.tld")),
                ("SSO_GATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["sso-gate"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>("sso-url").cloned(),
                    Some("https://sso.tld/ssoin".to_string())
                );
                assert_eq!(matches.get_one::<u64>("exchange-timeout").copied(), Some(5));
                assert!(matches.get_flag("detect-sso-host"));
                assert_eq!(
                    matches
                        .get_many::<String>("allowed-host")
                        .map(|hosts| hosts.cloned().collect::<Vec<_>>()),
                    Some(vec!["service.tld".to_string(), "other.tld".to_string()])
                );
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_missing_sso_url() {
        temp_env::with_vars(
            [
                ("SSO_GATE_SSO_URL", None::<&str>),
                ("SSO_GATE_PORTAL_URL", Some("https://portal.tld")),
            ],
            || {
                let result = new().try_get_matches_from(vec!["sso-gate"]);
                assert!(result.is_err());
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            let mut vars = REQUIRED_ENV.to_vec();
            vars.push(("SSO_GATE_LOG_LEVEL", Some(level)));

            temp_env::with_vars(vars, || {
                let command = new();
                let matches = command.get_matches_from(vec!["sso-gate"]);
                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(u8::try_from(index).unwrap_or_default())
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("SSO_GATE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "sso-gate".to_string(),
                    "--sso-url".to_string(),
                    "https://sso.tld/ssoin".to_string(),
                    "--portal-url".to_string(),
                    "https://portal.tld".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(u8::try_from(index).unwrap_or_default())
                );
            });
        }
    }
}
