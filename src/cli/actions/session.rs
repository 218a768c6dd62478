//! Client subcommands. The session token lives in a file between runs.

use crate::cli::globals::GlobalArgs;
use crate::client::{
    ApiClient, AuthClient, FileTokenStore, LoginCredentials, RegisterCredentials,
};
use anyhow::{Context, Result, bail};
use secrecy::{ExposeSecret, SecretString};
use std::{path::PathBuf, sync::Arc};

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub enum Command {
    Login(Credentials),
    Register(Credentials),
    Logout,
    Whoami,
    Status,
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub token_file: PathBuf,
    pub command: Command,
}

/// Execute a client subcommand and print its outcome.
/// # Errors
/// Returns an error if the backend call or the token file fails.
pub async fn execute(args: Args) -> Result<()> {
    let message = run(args).await?;
    println!("{message}");
    Ok(())
}

async fn run(args: Args) -> Result<String> {
    let store = Arc::new(FileTokenStore::new(&args.token_file));
    let api = ApiClient::new(args.globals.api_url.clone(), args.globals.timeout, store)
        .context("Failed to build API client")?;
    let auth = AuthClient::new(api);

    match args.command {
        Command::Login(credentials) => {
            let credentials = LoginCredentials::new(
                credentials.email,
                credentials.password.expose_secret(),
            );
            let response = auth.login(&credentials).await.context("Login failed")?;
            if response.token().is_none() {
                bail!("Login response did not include a token");
            }
            Ok(format!(
                "Logged in as {} (token saved to {})",
                credentials.email,
                args.token_file.display()
            ))
        }
        Command::Register(credentials) => {
            let user_data = RegisterCredentials::new(
                credentials.email,
                credentials.password.expose_secret(),
            );
            auth.register(&user_data)
                .await
                .context("Registration failed")?;
            Ok(format!(
                "Registered {}. Run `authgate login` to sign in.",
                user_data.email
            ))
        }
        Command::Logout => {
            auth.logout().await.context("Failed to clear the session token")?;
            Ok("Logged out".to_string())
        }
        Command::Whoami => {
            if !auth.is_authenticated() {
                bail!("Not logged in");
            }
            match auth.current_user().await {
                Some(user) => Ok(format!("{} (id {})", user.email, user.id)),
                None => bail!("Could not load the current user"),
            }
        }
        Command::Status => Ok(if auth.is_authenticated() {
            "Logged in".to_string()
        } else {
            "Not logged in".to_string()
        }),
    }
}
