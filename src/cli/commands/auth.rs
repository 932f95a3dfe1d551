use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use regex::Regex;
use secrecy::SecretString;

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_ADMIN_EMAIL: &str = "admin-email";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";
pub const ARG_SEED_DEMO: &str = "seed-demo";

#[derive(Debug, Clone)]
pub struct Options {
    pub frontend_base_url: String,
    pub session_ttl_seconds: u64,
    pub admin_email: String,
    pub admin_password: SecretString,
    pub seed_demo: bool,
}

impl Options {
    /// Parse auth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is absent or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty());
        let frontend_base_url = match frontend_base_url {
            Some(value) => value,
            None => anyhow::bail!("missing required argument: --{ARG_FRONTEND_BASE_URL}"),
        };

        let session_ttl_seconds = matches
            .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(86_400);

        let admin_email = matches
            .get_one::<String>(ARG_ADMIN_EMAIL)
            .cloned()
            .filter(|v| !v.trim().is_empty());
        let admin_email = match admin_email {
            Some(value) => value,
            None => anyhow::bail!("missing required argument: --{ARG_ADMIN_EMAIL}"),
        };

        let admin_password = matches
            .get_one::<String>(ARG_ADMIN_PASSWORD)
            .cloned()
            .filter(|v| !v.is_empty());
        let admin_password = match admin_password {
            Some(value) => SecretString::from(value),
            None => anyhow::bail!("missing required argument: --{ARG_ADMIN_PASSWORD}"),
        };

        Ok(Self {
            frontend_base_url,
            session_ttl_seconds,
            admin_email,
            admin_password,
            seed_demo: matches.get_flag(ARG_SEED_DEMO),
        })
    }
}

#[must_use]
pub fn validator_email() -> ValueParser {
    ValueParser::from(move |email: &str| -> std::result::Result<String, String> {
        if Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email)) {
            Ok(email.to_string())
        } else {
            Err("invalid email address".to_string())
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend origin allowed by CORS, also decides cookie security")
                .env("LULUS_FRONTEND_BASE_URL")
                .default_value("http://localhost:5173"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("LULUS_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_ADMIN_EMAIL)
                .long(ARG_ADMIN_EMAIL)
                .help("Email for the administrator account created on first start")
                .env("LULUS_ADMIN_EMAIL")
                .default_value("admin@smkn2godean.sch.id")
                .value_parser(validator_email()),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Password for the administrator account created on first start")
                .env("LULUS_ADMIN_PASSWORD")
                .default_value("admin123"),
        )
        .arg(
            Arg::new(ARG_SEED_DEMO)
                .long(ARG_SEED_DEMO)
                .help("Seed a pair of demo students for local development")
                .env("LULUS_SEED_DEMO")
                .action(clap::ArgAction::SetTrue),
        )
}
