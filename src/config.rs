//! Configuration file handling for outlay.
//!
//! The configuration file is stored at `$OUTLAY_HOME/config.json` and contains settings for
//! the outlay application including the API base URL, the request timeout and the
//! registration policy. Session state lives next to it under `$OUTLAY_HOME/.secrets`.

use crate::session::SessionStore;
use crate::storage::Storage;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "outlay";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CONFIG_JSON: &str = "config.json";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// The `Config` object represents the configuration of the app. You instantiate it by
/// providing the path to `$OUTLAY_HOME` and from there it loads `$OUTLAY_HOME/config.json`.
/// It provides paths to the other items expected inside the outlay home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and its subdirectories, and writes an initial
    /// `config.json` pointing at `api_url` with default settings.
    ///
    /// # Errors
    /// Returns an error if `api_url` is not a valid URL or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str) -> Result<Self> {
        // Reject a bad URL now instead of on the first request.
        let _ = Url::parse(api_url).with_context(|| format!("Invalid API URL '{api_url}'"))?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the outlay home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            auto_login_after_register: false,
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets: secrets_dir,
            config_path,
            config_file,
        })
    }

    /// Validates that the outlay home and its config file exist, loads the config file, and
    /// returns the loaded configuration object.
    pub async fn load(outlay_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = outlay_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The outlay home directory is missing. Run 'outlay init' first.")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}'. Run 'outlay init' first.",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn api_url(&self) -> &str {
        &self.config_file.api_url
    }

    /// The bound on every remote request.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.timeout_seconds)
    }

    /// Whether `auth register` should also log the new account in.
    pub fn auto_login_after_register(&self) -> bool {
        self.config_file.auto_login_after_register
    }

    /// Creates the session store backed by this configuration's secrets directory.
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(Storage::new(self.secrets.clone()))
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "outlay",
///   "config_version": 1,
///   "api_url": "http://localhost:8080/expense_tracker/api",
///   "timeout_seconds": 10,
///   "auto_login_after_register": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "outlay"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the expense tracker API
    api_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,

    /// Whether a successful registration also logs the new account in
    #[serde(default)]
    auto_login_after_register: bool,
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        // Validate app_name
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
