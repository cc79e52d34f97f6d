//! # ERP Configuration
//!
//! Connection settings for the Odoo instance. Loaded by the API from its
//! `[erp]` config section and the `ODOO_*` environment variables.
//!
//! ## Example
//! ```toml
//! [erp]
//! url = "https://erp.example.pe"
//! database = "tienda_prod"
//! username = "pos@example.pe"
//! password = "********"
//! timeout_secs = 8
//! invoice_partner_id = 1
//! ```

use std::fmt;
use std::time::Duration;

use crate::error::{ErpError, ErpResult};

/// Default bound on a single ERP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Counterparty used on every invoice (a generic "walk-in customer").
pub const DEFAULT_INVOICE_PARTNER_ID: i64 = 1;

/// Settings for [`crate::OdooGateway`].
#[derive(Clone)]
pub struct ErpConfig {
    /// Base URL, e.g. `https://erp.example.pe` (no `/xmlrpc` suffix).
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    pub invoice_partner_id: i64,
}

impl ErpConfig {
    pub fn new(
        url: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        ErpConfig {
            url: url.into(),
            database: database.into(),
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
            invoice_partner_id: DEFAULT_INVOICE_PARTNER_ID,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the invoice counterparty.
    pub fn with_invoice_partner_id(mut self, partner_id: i64) -> Self {
        self.invoice_partner_id = partner_id;
        self
    }

    /// Checks the settings before any connection is attempted.
    pub fn validate(&self) -> ErpResult<()> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| ErpError::InvalidConfig(format!("url '{}': {}", self.url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ErpError::InvalidConfig(format!(
                "url scheme must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        for (field, value) in [
            ("database", &self.database),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(ErpError::InvalidConfig(format!("{} is empty", field)));
            }
        }

        if self.timeout.is_zero() {
            return Err(ErpError::InvalidConfig("timeout must be positive".to_string()));
        }

        if self.invoice_partner_id <= 0 {
            return Err(ErpError::InvalidConfig(
                "invoice_partner_id must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// `{url}/xmlrpc/2/{service}`
    pub fn endpoint(&self, service: &str) -> String {
        format!("{}/xmlrpc/2/{}", self.url.trim_end_matches('/'), service)
    }
}

// Keeps the password out of logs.
impl fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErpConfig")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .field("invoice_partner_id", &self.invoice_partner_id)
            .finish()
    }
}
