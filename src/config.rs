// src/config.rs
use crate::fetch::api::OrderApiConfig;
use std::env;

/// All runtime configuration, resolved once at startup.
/// Nothing else in the app reads the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub db_path: String,
    /// The single shared operator password for the login gate.
    pub app_password: String,
    pub api: OrderApiConfig,
    /// When true, regenerating a snapshot for an already-annotated month
    /// merges message_sent/message_by back by customer id instead of
    /// discarding them. Defaults to the source behavior (discard).
    pub preserve_annotations: bool,
}

impl AppConfig {
    /// Load from the environment. `config/.env` is read first if present.
    pub fn from_env() -> Result<Self, String> {
        // Missing .env is fine; real env vars may already be set.
        let _ = dotenvy::from_path("config/.env");

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            db_path: env::var("DB_PATH").unwrap_or_else(|_| "rfv.sqlite3".to_string()),
            app_password: required("APP_PASSWORD")?,
            api: OrderApiConfig {
                base_url: env::var("ORDER_API_URL")
                    .unwrap_or_else(|_| "https://mire.omnni.com.br/api".to_string()),
                username: required("ORDER_API_USERNAME")?,
                password: required("ORDER_API_PASSWORD")?,
                seller_id: required("ORDER_API_SELLER_ID")?,
            },
            preserve_annotations: env::var("PRESERVE_ANNOTATIONS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

fn required(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{name} environment variable not set"))
}
