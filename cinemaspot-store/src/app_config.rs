use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Public base URL used to build links in outgoing emails.
    pub app_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_session_hours")]
    pub session_token_hours: i64,
    #[serde(default = "default_email_hours")]
    pub email_token_hours: i64,
    #[serde(default = "default_reset_hours")]
    pub reset_token_hours: i64,
}

fn default_session_hours() -> i64 { 24 }
fn default_email_hours() -> i64 { 2 }
fn default_reset_hours() -> i64 { 1 }

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    Log,
    Resend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Capacity of showtimes whose room has no seats registered.
    #[serde(default = "default_capacity")]
    pub default_showtime_capacity: i64,
}

fn default_capacity() -> i64 { 20 }

impl Default for BusinessRules {
    fn default() -> Self {
        Self { default_showtime_capacity: default_capacity() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `CINEMASPOT__DATABASE__URL=postgres://...` sets `database.url`
            .add_source(config::Environment::with_prefix("CINEMASPOT").prefix_separator("__").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
