use config::ConfigError;
use domain::{Severity, WordFilter};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    #[serde(default)]
    pub moderation: ModerationSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    /// Salts anonymous session fingerprints.
    pub identity_salt: String,
    /// HMAC key for bearer tokens.
    pub auth_secret: String,
}

/// Deployment additions to the built-in banned-word list.
#[derive(Deserialize, Clone, Default)]
pub struct ModerationSettings {
    #[serde(default)]
    pub extra_words: Vec<WordEntry>,
}

#[derive(Deserialize, Clone)]
pub struct WordEntry {
    pub pattern: String,
    pub severity: String,
    pub replacement: Option<String>,
}

impl WordEntry {
    pub fn to_filter(&self) -> WordFilter {
        let severity = match self.severity.as_str() {
            "severe" => Severity::Severe,
            "moderate" => Severity::Moderate,
            _ => Severity::Mild,
        };
        WordFilter {
            pattern: self.pattern.clone(),
            severity,
            replacement: self.replacement.clone(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars();

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.url", "sqlite://data/raqib.db")?
            .set_default("security.identity_salt", "change_me_please")?
            .set_default("security.auth_secret", "auth_secret_change_me")?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(
                &serde_json::to_string(&env_map)
                    .expect("Environment variables should serialize to JSON"),
                config::FileFormat::Json,
            ))
            .build()?;

        s.try_deserialize()
    }
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("RAQIB_"))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches("RAQIB_")
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
