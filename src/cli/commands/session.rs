use clap::{Arg, Command};

pub const ARG_TOKEN_FILE: &str = "token-file";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";

fn token_file_arg() -> Arg {
    Arg::new(ARG_TOKEN_FILE)
        .long("token-file")
        .help("Where the session token is kept (default: $HOME/.authgate/token)")
        .env("AUTHGATE_TOKEN_FILE")
}

fn credential_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long("email")
                .help("Account email")
                .env("AUTHGATE_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long("password")
                .help("Account password")
                .env("AUTHGATE_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        credential_args(Command::new("login").about("Log in and store the session token"))
            .arg(token_file_arg()),
        credential_args(Command::new("register").about("Create an account"))
            .arg(token_file_arg()),
        Command::new("logout")
            .about("Forget the stored session token")
            .arg(token_file_arg()),
        Command::new("whoami")
            .about("Show the signed-in user")
            .arg(token_file_arg()),
        Command::new("status")
            .about("Report whether a session token is stored")
            .arg(token_file_arg()),
    ]
}
