//! Service layer.
//!
//! Handlers parse the request and call into these functions; services own
//! the orchestration between the database and the ERP gateway. Every
//! function that stamps or scopes by time takes `now` explicitly.

pub mod assistant_service;
pub mod catalog_service;
pub mod company_service;
pub mod erp_sync;
pub mod report_service;
pub mod sale_service;
