//! # API Configuration
//!
//! Settings for the HTTP server, the database, the business calendar and
//! the optional ERP connection.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TIENDA_PORT=8080                                                   │
//! │     ODOO_URL=https://erp.example.pe                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $TIENDA_CONFIG, or                                                 │
//! │     ~/.config/tienda-pos/tienda.toml (Linux)                           │
//! │     ~/Library/Application Support/pe.tienda.pos/tienda.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     0.0.0.0:8000, ./tienda.db, UTC-5, ERP disabled                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # tienda.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8000
//!
//! [database]
//! path = "tienda.db"
//! max_connections = 5
//!
//! [business]
//! utc_offset_minutes = -300  # Lima
//!
//! [erp]
//! url = "https://erp.example.pe"
//! database = "tienda_prod"
//! username = "pos@example.pe"
//! password = "********"
//! timeout_secs = 8
//! invoice_partner_id = 1
//! ```
//!
//! The ERP stays disabled unless url, database, username and password are
//! all present.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use tienda_erp::ErpConfig;

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TIENDA_CONFIG";

// =============================================================================
// Config Error
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: PathBuf::from("tienda.db"),
            max_connections: 5,
        }
    }
}

/// Business calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    /// Fixed offset of the serving timezone. "Today" is computed in it.
    pub utc_offset_minutes: i32,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        BusinessConfig {
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

/// Lima (UTC-5, no daylight saving).
fn default_utc_offset_minutes() -> i32 {
    -300
}

/// ERP connection. Every credential is optional; see [`AppConfig::erp_config`].
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErpSection {
    pub url: Option<String>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
    pub invoice_partner_id: i64,
}

impl Default for ErpSection {
    fn default() -> Self {
        ErpSection {
            url: None,
            database: None,
            username: None,
            password: None,
            timeout_secs: 8,
            invoice_partner_id: 1,
        }
    }
}

impl std::fmt::Debug for ErpSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpSection")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("invoice_partner_id", &self.invoice_partner_id)
            .finish()
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub business: BusinessConfig,
    pub erp: ErpSection,
}

impl AppConfig {
    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from config file (if exists)
    /// 3. Override with environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(ref path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_file(path)?
            }
            Some(ref path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides_from(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file. Missing sections and keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies overrides from `lookup`, which maps an env var name to its value.
    ///
    /// Values that fail to parse are rejected rather than ignored, so a typo
    /// in `TIENDA_PORT` doesn't silently start the server on the default.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("TIENDA_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = lookup("TIENDA_PORT") {
            self.server.port = parse_var("TIENDA_PORT", &port)?;
        }
        if let Some(path) = lookup("TIENDA_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("TIENDA_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("TIENDA_DB_MAX_CONNECTIONS", &max)?;
        }
        if let Some(offset) = lookup("TIENDA_UTC_OFFSET_MINUTES") {
            self.business.utc_offset_minutes = parse_var("TIENDA_UTC_OFFSET_MINUTES", &offset)?;
        }

        // ERP credentials (never logged)
        if let Some(url) = lookup("ODOO_URL") {
            self.erp.url = Some(url);
        }
        if let Some(db) = lookup("ODOO_DB") {
            self.erp.database = Some(db);
        }
        if let Some(user) = lookup("ODOO_USERNAME") {
            self.erp.username = Some(user);
        }
        if let Some(password) = lookup("ODOO_PASSWORD") {
            self.erp.password = Some(password);
        }
        if let Some(secs) = lookup("ODOO_TIMEOUT_SECS") {
            self.erp.timeout_secs = parse_var("ODOO_TIMEOUT_SECS", &secs)?;
        }
        if let Some(partner) = lookup("ODOO_PARTNER_ID") {
            self.erp.invoice_partner_id = parse_var("ODOO_PARTNER_ID", &partner)?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("database.path".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        self.utc_offset()?;

        if let Some(erp) = self.erp_config() {
            erp.validate()
                .map_err(|e| ConfigError::InvalidValue(format!("erp: {}", e)))?;
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("pe", "tienda", "pos")
            .map(|dirs| dirs.config_dir().join("tienda.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Address the HTTP server listens on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.server.bind_addr.parse().map_err(|_| {
            ConfigError::InvalidValue(format!("server.bind_addr '{}'", self.server.bind_addr))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// The serving timezone as a fixed offset.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.business
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "business.utc_offset_minutes {} is out of range",
                    self.business.utc_offset_minutes
                ))
            })
    }

    /// ERP settings, or `None` when any credential is missing.
    pub fn erp_config(&self) -> Option<ErpConfig> {
        let erp = &self.erp;
        match (&erp.url, &erp.database, &erp.username, &erp.password) {
            (Some(url), Some(db), Some(user), Some(password)) => Some(
                ErpConfig::new(url, db, user, password)
                    .with_timeout(self.erp_timeout())
                    .with_invoice_partner_id(erp.invoice_partner_id),
            ),
            _ => None,
        }
    }

    /// Bound applied around every ERP call made by the services.
    pub fn erp_timeout(&self) -> Duration {
        Duration::from_secs(self.erp.timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("{}='{}'", key, value)))
}

// =============================================================================
// Unit Tests
// =============================================================================
