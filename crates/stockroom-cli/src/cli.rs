use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(
        short = 's',
        long = "stdout",
        action,
        help = "Controls if it logs to stdout/stderr instead of to a file"
    )]
    pub is_to_std_out: bool,

    #[arg(
        long,
        default_value = "configuration",
        help = "Folder containing base.toml and the per environment files"
    )]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Log in and store the session on this device
    ///
    /// The password is taken from `APP_LOGIN_PASSWORD` if set, otherwise it is
    /// prompted for without echo
    Login { username: String },
    /// Remove the session from this device
    Logout,
    /// Show the stored session, role and what it allows
    Status,
    /// Send a request to the API using the stored session
    Request {
        #[arg(value_parser = parse_method)]
        method: reqwest::Method,
        path: String,
        #[arg(long, help = "JSON body (sent as the query string for GET)")]
        body: Option<String>,
    },
}

fn parse_method(value: &str) -> Result<reqwest::Method, String> {
    reqwest::Method::from_bytes(value.to_uppercase().as_bytes())
        .map_err(|e| format!("invalid method {value:?}: {e}"))
}
