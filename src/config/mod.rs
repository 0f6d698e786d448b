//! Configuration module for the storefront backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Categories used when `STOREFRONT_CATEGORIES` is not set.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Maquillage",
    "Soins Visage",
    "Soins Corps",
    "Parfums",
    "Accessoires Beauté",
    "Cheveux",
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key that grants admin access
    pub admin_psk: Option<String>,
    /// Administrator provisioned at startup when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory holding uploaded blobs
    pub storage_dir: PathBuf,
    /// Directory holding persisted carts
    pub carts_dir: PathBuf,
    /// Base URL used when issuing public blob URLs
    pub public_base_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// `json` or `pretty`
    pub log_format: String,
    /// Shop name used as fallback and for provisioning the settings row
    pub shop_name: String,
    /// WhatsApp number used when provisioning the settings row
    pub whatsapp_number: Option<String>,
    /// Tenant category labels
    pub categories: Vec<String>,
    /// Currency label appended to formatted prices
    pub currency: String,
    /// Upstream oEmbed endpoint
    pub oembed_endpoint: String,
    pub products_ttl: Duration,
    pub categories_ttl: Duration,
    pub settings_ttl: Duration,
    /// Lifetime of a signed-in session
    pub session_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = var("STOREFRONT_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                key: "STOREFRONT_BIND_ADDR",
                value: bind_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let categories = match var("STOREFRONT_CATEGORIES") {
            Some(raw) => raw
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            None => DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        };

        let log_format = var("STOREFRONT_LOG_FORMAT").unwrap_or_else(|| "pretty".to_string());
        if log_format != "json" && log_format != "pretty" {
            return Err(ConfigError::Invalid {
                key: "STOREFRONT_LOG_FORMAT",
                value: log_format,
                reason: "expected `json` or `pretty`".to_string(),
            });
        }

        Ok(Self {
            admin_psk: var("STOREFRONT_ADMIN_PSK"),
            admin_email: var("STOREFRONT_ADMIN_EMAIL"),
            admin_password: var("STOREFRONT_ADMIN_PASSWORD"),
            db_path: var("STOREFRONT_DB_PATH")
                .unwrap_or_else(|| "./data/storefront.sqlite".to_string())
                .into(),
            storage_dir: var("STOREFRONT_STORAGE_DIR")
                .unwrap_or_else(|| "./data/storage".to_string())
                .into(),
            carts_dir: var("STOREFRONT_CARTS_DIR")
                .unwrap_or_else(|| "./data/carts".to_string())
                .into(),
            public_base_url: var("STOREFRONT_PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://{}", bind_addr))
                .trim_end_matches('/')
                .to_string(),
            bind_addr,
            log_level: var("STOREFRONT_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
            shop_name: var("STOREFRONT_SHOP_NAME").unwrap_or_else(|| "Ma Boutique".to_string()),
            whatsapp_number: var("STOREFRONT_WHATSAPP_NUMBER"),
            categories,
            currency: var("STOREFRONT_CURRENCY").unwrap_or_else(|| "FCFA".to_string()),
            oembed_endpoint: var("STOREFRONT_OEMBED_ENDPOINT")
                .unwrap_or_else(|| "https://www.tiktok.com/oembed".to_string()),
            products_ttl: secs(&var, "STOREFRONT_PRODUCTS_TTL_SECS", 30)?,
            categories_ttl: secs(&var, "STOREFRONT_CATEGORIES_TTL_SECS", 600)?,
            settings_ttl: secs(&var, "STOREFRONT_SETTINGS_TTL_SECS", 300)?,
            session_ttl: secs(&var, "STOREFRONT_SESSION_TTL_SECS", 86_400)?,
        })
    }

    /// Settings are provisioned at startup only when a WhatsApp number is configured.
    pub fn provisions_settings(&self) -> bool {
        self.whatsapp_number.is_some()
    }
}

fn secs<F>(var: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
