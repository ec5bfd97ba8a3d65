#![warn(unused_crate_dependencies)]

use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;
use stockroom_client_core::{
    permissions::init_global, Client, FileStore, KvStore, LoginOutcome, PermissionEngine,
};
use stockroom_shared::{req_args::LoginReqArgs, uac::Capability};
use strum::IntoEnumIterator as _;
use ::tracing::{debug, info};

pub mod cli;
pub mod configuration;
pub mod runtime;
pub mod tracing;

use cli::Command;
use configuration::Settings;

/// Environment variable checked for the password before prompting
pub const LOGIN_PASSWORD_ENV: &str = "APP_LOGIN_PASSWORD";

/// Uses `from_env` if given, otherwise asks on the terminal
pub fn login_password(from_env: Option<String>) -> anyhow::Result<SecretString> {
    let password = match from_env {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").context("failed to read password")?,
    };
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty.");
    }
    Ok(SecretString::from(password))
}

/// Builds the client over the store in `settings` and registers its engine as
/// the process wide one
pub async fn connect(settings: &Settings) -> Client {
    let store: Arc<dyn KvStore> = Arc::new(FileStore::new(&settings.storage_path));
    let engine = PermissionEngine::new(Arc::clone(&store));
    let engine = match init_global(engine.clone()) {
        Ok(()) => engine,
        Err(engine) => {
            debug!("global permission engine already set, using a local one");
            engine
        }
    };
    engine.load().await;
    Client::with_engine(settings.server_address.clone(), store, engine)
}

/// Runs one command and returns what should be shown to the user
pub async fn run(command: Command, settings: Settings) -> anyhow::Result<String> {
    let client = connect(&settings).await;
    let _subscription = client
        .permissions()
        .subscribe(|snapshot| debug!(?snapshot, "permissions changed"));

    match command {
        Command::Login { username } => {
            let password = login_password(std::env::var(LOGIN_PASSWORD_ENV).ok())?;
            let args = LoginReqArgs::new(username, password);
            let outcome = client
                .login(args, || {})
                .await
                .context("login did not complete")??;
            info!(?outcome, "login finished");
            let mut output = match outcome {
                LoginOutcome::Success => "Logged in".to_string(),
                LoginOutcome::SuccessWithoutRole => {
                    "Logged in but the role sent by the server is not recognized".to_string()
                }
            };
            output.push('\n');
            output.push_str(&status_report(&client).await);
            Ok(output)
        }
        Command::Logout => {
            client.logout().await;
            Ok("Logged out".to_string())
        }
        Command::Status => Ok(status_report(&client).await),
        Command::Request { method, path, body } => {
            let body = body
                .map(|x| serde_json::from_str::<serde_json::Value>(&x))
                .transpose()
                .context("body is not valid JSON")?;
            let response = client.request(method, &path, body).await?;
            let data = serde_json::to_string_pretty(&response.data)
                .context("failed to format response body")?;
            Ok(format!("{}\n{data}", response.status))
        }
    }
}

/// Describes the stored session and what the current role allows
pub async fn status_report(client: &Client) -> String {
    let Some(session) = client.session_store().session().await else {
        return "Not logged in".to_string();
    };
    let mut result = match &session.user {
        Some(user) if !user.username.is_empty() => {
            format!("User: {} (id {})\n", user.username, user.user_id)
        }
        Some(user) => format!("User id: {}\n", user.user_id),
        None => "User: unknown\n".to_string(),
    };
    let role = client
        .permissions()
        .role()
        .map_or("none", |role| role.as_str());
    result.push_str(&format!("Role: {role}"));
    for capability in Capability::iter() {
        let decision = client.check_access(capability).await;
        result.push_str(&format!("\n  {capability}: {decision:?}"));
    }
    result
}
