//! # ERP Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Configuration      Transport           Remote            Local         │
//! │  ─────────────      ─────────           ──────            ─────         │
//! │  InvalidConfig      Unavailable         Fault             Disabled      │
//! │                     Timeout             Protocol          EmptyInvoice  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers never surface these to HTTP clients as failures. They become an
//! `erp_sync: failed` outcome with the error text logged at `warn`.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for ERP operations.
pub type ErpResult<T> = Result<T, ErpError>;

/// Odoo's XML-RPC fault code for `AccessDenied`.
pub const ACCESS_DENIED_FAULT: i64 = 3;

#[derive(Debug, Error)]
pub enum ErpError {
    /// No ERP is configured.
    #[error("ERP integration is disabled")]
    Disabled,

    /// Incomplete or malformed ERP settings.
    #[error("Invalid ERP configuration: {0}")]
    InvalidConfig(String),

    /// Connection refused, DNS failure, non-2xx status, or the server
    /// rejected the credentials.
    #[error("ERP unavailable: {0}")]
    Unavailable(String),

    /// The HTTP request did not finish in time.
    #[error("ERP request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with an XML-RPC fault.
    #[error("ERP fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// The response was not valid XML-RPC, or not the shape expected.
    #[error("ERP protocol error: {0}")]
    Protocol(String),

    /// An invoice must have at least one line.
    #[error("Invoice has no lines")]
    EmptyInvoice,
}

impl ErpError {
    /// True when the session is no longer valid and must be re-established.
    pub fn is_access_denied(&self) -> bool {
        match self {
            ErpError::Fault { code, message } => {
                *code == ACCESS_DENIED_FAULT || message.contains("AccessDenied")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_detection() {
        assert!(ErpError::Fault {
            code: 3,
            message: "Access Denied".to_string()
        }
        .is_access_denied());
        assert!(ErpError::Fault {
            code: 1,
            message: "odoo.exceptions.AccessDenied: wrong login".to_string()
        }
        .is_access_denied());
        assert!(!ErpError::Fault {
            code: 2,
            message: "ValidationError".to_string()
        }
        .is_access_denied());
        assert!(!ErpError::Disabled.is_access_denied());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ErpError::Timeout(Duration::from_secs(8)).to_string(),
            "ERP request timed out after 8s"
        );
        assert_eq!(ErpError::Disabled.to_string(), "ERP integration is disabled");
    }
}
