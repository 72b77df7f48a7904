use std::env;
use std::time::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password_reset: PasswordResetConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Deadline applied to every account flow, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_session_minutes")]
    pub expiration_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordResetConfig {
    #[serde(default = "default_reset_minutes")]
    pub expiration_minutes: i64,
    /// Link template; `{token}` is replaced with the plaintext reset token.
    pub reset_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// When disabled, reset mails are only logged.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Upgrade the SMTP connection with STARTTLS. Disable only for local relays.
    #[serde(default = "default_starttls")]
    pub starttls: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from: String,
}

/// Upper bound for session and reset token lifetimes (one year).
const MAX_EXPIRATION_MINUTES: i64 = 366 * 24 * 60;

fn default_max_connections() -> u32 {
    5
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_session_minutes() -> i64 {
    24 * 60
}

fn default_reset_minutes() -> i64 {
    30
}

fn default_smtp_port() -> u16 {
    587
}

fn default_starttls() -> bool {
    true
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: PASSWORD_RESET__EXPIRATION_MINUTES=15 overrides password_reset.expiration_minutes
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values the service cannot run with.
    ///
    /// # Errors
    /// * `Message` - A secret is too short or a lifetime is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < 32 {
            return Err(ConfigError::Message(
                "jwt.secret must be at least 32 bytes".to_string(),
            ));
        }
        check_expiration("jwt.expiration_minutes", self.jwt.expiration_minutes)?;
        check_expiration(
            "password_reset.expiration_minutes",
            self.password_reset.expiration_minutes,
        )?;
        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "server.request_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_expiration(key: &str, minutes: i64) -> Result<(), ConfigError> {
    if (1..=MAX_EXPIRATION_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(ConfigError::Message(format!(
            "{} must be between 1 and {}, got {}",
            key, MAX_EXPIRATION_MINUTES, minutes
        )))
    }
}
