// src/config/config.rs
use crate::utils::error::BotError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 20;
const DEFAULT_API_BASE_URL: &str = "https://api.hashvault.pro/v3/monero";
const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// Resolved runtime configuration
///
/// Built from, in increasing precedence: defaults, an optional TOML file,
/// and the process environment. CLI flags are applied on top by `main`.
#[derive(Clone, PartialEq)]
pub struct Config {
    /// Discord bot token
    pub token: String,
    /// Channel the status message is posted in
    pub channel_id: String,
    /// Wallet whose pool stats are shown
    pub wallet_address: String,
    /// Port for the liveness endpoint
    pub port: u16,
    /// Seconds between cycle starts
    pub poll_interval_secs: u64,
    /// Pool API root
    pub api_base_url: String,
    /// Discord REST API root
    pub discord_api_url: String,
    /// Post a notice to the channel when a cycle fails
    pub report_errors: bool,
    /// Post a new status message if the old one was deleted
    pub recreate_missing_message: bool,
    /// Serve the liveness endpoint
    pub health_enabled: bool,
    /// Include the last-share column in the worker table
    pub show_last_share: bool,
}

// Hand-written so the token never ends up in logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("wallet_address", &self.wallet_address)
            .field("port", &self.port)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("api_base_url", &self.api_base_url)
            .field("discord_api_url", &self.discord_api_url)
            .field("report_errors", &self.report_errors)
            .field("recreate_missing_message", &self.recreate_missing_message)
            .field("health_enabled", &self.health_enabled)
            .field("show_last_share", &self.show_last_share)
            .finish()
    }
}

/// Settings as they appear in the TOML file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// See [`Config::token`]
    pub token: Option<String>,
    /// See [`Config::channel_id`]
    pub channel_id: Option<String>,
    /// See [`Config::wallet_address`]
    pub wallet_address: Option<String>,
    /// See [`Config::port`]
    pub port: Option<u16>,
    /// See [`Config::poll_interval_secs`]
    pub poll_interval_secs: Option<u64>,
    /// See [`Config::api_base_url`]
    pub api_base_url: Option<String>,
    /// See [`Config::discord_api_url`]
    pub discord_api_url: Option<String>,
    /// See [`Config::report_errors`]
    pub report_errors: Option<bool>,
    /// See [`Config::recreate_missing_message`]
    pub recreate_missing_message: Option<bool>,
    /// See [`Config::health_enabled`]
    pub health_enabled: Option<bool>,
    /// See [`Config::show_last_share`]
    pub show_last_share: Option<bool>,
}

impl FileConfig {
    /// Reads a TOML settings file
    ///
    /// # Errors
    /// Returns `BotError::Config` if the file can't be read or parsed
    pub fn load(path: &Path) -> Result<Self, BotError> {
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            BotError::Config(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&config_str)
            .map_err(|e| BotError::Config(format!("Invalid config format: {}", e)))
    }
}

impl Config {
    /// Loads configuration from an optional file and the process environment
    ///
    /// # Errors
    /// Returns `BotError::Config` if a required value is missing or any
    /// value fails to parse
    pub fn load(path: Option<&Path>) -> Result<Self, BotError> {
        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merges file settings with values from `lookup` (usually the environment)
    ///
    /// Empty environment values count as unset.
    pub fn resolve<F>(file: FileConfig, lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            token: required("TOKEN", env("TOKEN").or(file.token))?,
            channel_id: required("CHANNEL_ID", env("CHANNEL_ID").or(file.channel_id))?,
            wallet_address: required(
                "WALLET_ADDRESS",
                env("WALLET_ADDRESS").or(file.wallet_address),
            )?,
            port: parse_env("PORT", env("PORT"))?
                .or(file.port)
                .unwrap_or(DEFAULT_PORT),
            poll_interval_secs: parse_env("POLL_INTERVAL_SECS", env("POLL_INTERVAL_SECS"))?
                .or(file.poll_interval_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            api_base_url: env("API_BASE_URL")
                .or(file.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.into()),
            discord_api_url: env("DISCORD_API_URL")
                .or(file.discord_api_url)
                .unwrap_or_else(|| DEFAULT_DISCORD_API_URL.into()),
            report_errors: bool_env("REPORT_ERRORS", env("REPORT_ERRORS"))?
                .or(file.report_errors)
                .unwrap_or(false),
            recreate_missing_message: bool_env(
                "RECREATE_MISSING_MESSAGE",
                env("RECREATE_MISSING_MESSAGE"),
            )?
            .or(file.recreate_missing_message)
            .unwrap_or(false),
            health_enabled: bool_env("HEALTH_ENABLED", env("HEALTH_ENABLED"))?
                .or(file.health_enabled)
                .unwrap_or(true),
            show_last_share: bool_env("SHOW_LAST_SHARE", env("SHOW_LAST_SHARE"))?
                .or(file.show_last_share)
                .unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints
    pub fn validate(&self) -> Result<(), BotError> {
        if self.poll_interval_secs == 0 {
            return Err(BotError::Config(
                "poll_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Time between cycle starts
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Generates a commented TOML template
    ///
    /// Every key can also be supplied through the environment variable
    /// named in the comment above it.
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# HashVault stats bot configuration\n");
        template.push_str("# Environment variables override values in this file.\n\n");
        template.push_str("# Discord bot token (TOKEN)\n");
        template.push_str("token = \"your_bot_token\"\n");
        template.push_str("# Channel to post the status message in (CHANNEL_ID)\n");
        template.push_str("channel_id = \"123456789012345678\"\n");
        template.push_str("# Wallet whose pool stats are shown (WALLET_ADDRESS)\n");
        template.push_str("wallet_address = \"your_wallet_address\"\n\n");
        template.push_str("# Liveness endpoint port (PORT)\n");
        template.push_str(&format!("port = {}\n", DEFAULT_PORT));
        template.push_str("# Serve the liveness endpoint (HEALTH_ENABLED)\n");
        template.push_str("health_enabled = true\n");
        template.push_str("# Seconds between updates (POLL_INTERVAL_SECS)\n");
        template.push_str(&format!(
            "poll_interval_secs = {}\n",
            DEFAULT_POLL_INTERVAL_SECS
        ));
        template.push_str("# Post failures to the channel (REPORT_ERRORS)\n");
        template.push_str("report_errors = false\n");
        template.push_str("# Post a new message if the old one was deleted (RECREATE_MISSING_MESSAGE)\n");
        template.push_str("recreate_missing_message = false\n");
        template.push_str("# Show time since each worker's last share (SHOW_LAST_SHARE)\n");
        template.push_str("show_last_share = true\n\n");
        template.push_str("# API endpoints (API_BASE_URL, DISCORD_API_URL)\n");
        template.push_str(&format!("api_base_url = \"{}\"\n", DEFAULT_API_BASE_URL));
        template.push_str(&format!(
            "discord_api_url = \"{}\"\n",
            DEFAULT_DISCORD_API_URL
        ));

        template
    }
}

fn required(key: &str, value: Option<String>) -> Result<String, BotError> {
    value.ok_or_else(|| BotError::Config(format!("{} is not set", key)))
}

fn parse_env<T>(key: &str, value: Option<String>) -> Result<Option<T>, BotError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|e| BotError::Config(format!("Invalid {} '{}': {}", key, v, e)))
        })
        .transpose()
}

fn bool_env(key: &str, value: Option<String>) -> Result<Option<bool>, BotError> {
    value
        .map(|v| match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(BotError::Config(format!("Invalid {} '{}'", key, v))),
        })
        .transpose()
}
