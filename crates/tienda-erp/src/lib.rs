//! # tienda-erp: ERP Gateway
//!
//! Best-effort synchronization of products and invoices to Odoo.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ERP Integration                                 │
//! │                                                                         │
//! │  tienda-api services                                                    │
//! │       │  Arc<dyn ErpGateway>                                           │
//! │       ▼                                                                 │
//! │  ┌──────────────────────┐        ┌──────────────────────┐              │
//! │  │    OdooGateway       │        │   DisabledGateway    │              │
//! │  │  ──────────────────  │        │  ──────────────────  │              │
//! │  │  uid: RwLock<Option> │        │  is_enabled = false  │              │
//! │  │  reqwest::Client     │        │  every call → Err    │              │
//! │  └─────────┬────────────┘        └──────────────────────┘              │
//! │            │ XML-RPC (quick-xml)                                        │
//! │            ▼                                                            │
//! │  POST {url}/xmlrpc/2/common   authenticate(db, user, pwd, {})          │
//! │  POST {url}/xmlrpc/2/object   execute_kw(db, uid, pwd, model, method)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate retries or queues. A failed call is reported to the
//! caller, which records it as the sale's or product's `erp_sync` outcome.

pub mod config;
pub mod error;
pub mod gateway;
pub mod odoo;
pub mod xmlrpc;

pub use config::ErpConfig;
pub use error::{ErpError, ErpResult};
pub use gateway::{DisabledGateway, ErpGateway, ErpProduct, InvoiceDraft, InvoiceLine};
pub use odoo::OdooGateway;
