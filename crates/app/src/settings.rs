//! Handles settings for the application.
//!
//! Sources, lowest priority first: built-in defaults, `config/settings.toml`
//! (or the file named by `CASHBOOK_CONFIG`), `CASHBOOK__SECTION__KEY`
//! environment variables and finally `DATABASE_URL`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/settings";

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var("CASHBOOK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::build(
            Config::builder()
                .add_source(File::with_name(&path).required(false))
                .add_source(Environment::with_prefix("CASHBOOK").separator("__"))
                .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?,
        )
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:./cashbook.db?mode=rwc")?
            .set_default("database.max_connections", 90)?
            .set_default("database.min_connections", 10)?
            .set_default("database.max_lifetime_secs", 3600)?
            .set_default("database.connect_timeout_secs", 8)?
            .build()?
            .try_deserialize()
    }
}
