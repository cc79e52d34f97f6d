//! Shared application state handed to every handler.

use chrono::FixedOffset;
use std::sync::Arc;
use std::time::Duration;

use tienda_db::Database;
use tienda_erp::ErpGateway;

/// Cheap to clone: the pool and the gateway are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub erp: Arc<dyn ErpGateway>,
    /// Serving timezone; "today" is a calendar day in it.
    pub utc_offset: FixedOffset,
    /// Bound on each best-effort ERP call.
    pub erp_timeout: Duration,
}

impl AppState {
    pub fn new(
        db: Database,
        erp: Arc<dyn ErpGateway>,
        utc_offset: FixedOffset,
        erp_timeout: Duration,
    ) -> Self {
        AppState {
            db,
            erp,
            utc_offset,
            erp_timeout,
        }
    }
}
