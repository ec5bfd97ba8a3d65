use std::{
    convert::{TryFrom, TryInto},
    path::{Path, PathBuf},
};

use stockroom_shared::const_config::client::CLIENT_DEFAULT_SERVER_ADDRESS;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub server_address: String,
    /// File used as the device key-value store
    pub storage_path: PathBuf,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_filter: String,
}

/// Loads `base.toml`, then the file for the current environment, then any
/// `APP_` environment variables
pub fn get_configuration(configuration_directory: &Path) -> Result<Settings, config::ConfigError> {
    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.toml", environment.as_str());
    let settings = config::Config::builder()
        .set_default("server_address", CLIENT_DEFAULT_SERVER_ADDRESS)?
        .add_source(config::File::from(
            configuration_directory.join("base.toml"),
        ))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename))
                .required(false),
        )
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_SERVER_ADDRESS=http://10.0.0.2:3000` would set `Settings.server_address`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
#[derive(Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
