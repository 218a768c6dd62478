use crate::cli::{
    actions::{Action, server, session},
    commands::{
        ARG_API_URL, ARG_TIMEOUT,
        server::{ARG_COOKIE_SECURE, ARG_PORT, ARG_SESSION_TTL_SECONDS},
        session::{ARG_EMAIL, ARG_PASSWORD, ARG_TOKEN_FILE},
    },
    globals::GlobalArgs,
};
use crate::client::api::parse_base_url;
use anyhow::{Context, Result, anyhow};
use secrecy::SecretString;
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_TOKEN_DIR: &str = ".authgate";
const DEFAULT_TOKEN_FILE: &str = "token";

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = global_args(matches)?;

    match matches.subcommand() {
        Some(("server", sub_m)) => Ok(Action::Server(server::Args {
            port: sub_m.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000),
            globals,
            cookie_secure: sub_m.get_flag(ARG_COOKIE_SECURE),
            session_ttl_seconds: sub_m
                .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(crate::web::state::DEFAULT_SESSION_TTL_SECONDS),
        })),
        Some((name, sub_m)) => {
            let command = match name {
                "login" => session::Command::Login(credentials(sub_m)?),
                "register" => session::Command::Register(credentials(sub_m)?),
                "logout" => session::Command::Logout,
                "whoami" => session::Command::Whoami,
                "status" => session::Command::Status,
                other => return Err(anyhow!("unknown subcommand: {other}")),
            };
            Ok(Action::Session(session::Args {
                globals,
                token_file: token_file(sub_m)?,
                command,
            }))
        }
        None => Err(anyhow!("missing subcommand")),
    }
}

fn global_args(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .context("missing required argument: --api-url")?;
    let api_url = parse_base_url(api_url).context("invalid AUTHGATE_API_URL")?;
    let timeout = matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(10);

    Ok(GlobalArgs::new(api_url, Duration::from_secs(timeout)))
}

fn credentials(matches: &clap::ArgMatches) -> Result<session::Credentials> {
    let email = matches
        .get_one::<String>(ARG_EMAIL)
        .cloned()
        .context("missing required argument: --email")?;
    let password = matches
        .get_one::<String>(ARG_PASSWORD)
        .cloned()
        .context("missing required argument: --password")?;

    Ok(session::Credentials {
        email,
        password: SecretString::from(password),
    })
}

fn token_file(matches: &clap::ArgMatches) -> Result<PathBuf> {
    if let Some(path) = matches.get_one::<String>(ARG_TOKEN_FILE) {
        return Ok(PathBuf::from(path));
    }

    let home = env::var_os("HOME").context("HOME is not set; pass --token-file")?;
    Ok(PathBuf::from(home)
        .join(DEFAULT_TOKEN_DIR)
        .join(DEFAULT_TOKEN_FILE))
}
