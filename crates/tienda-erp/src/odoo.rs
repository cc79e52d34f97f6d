//! # Odoo Gateway
//!
//! [`ErpGateway`] over Odoo's XML-RPC API.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   uid = None ──── first call ────► common.authenticate ──► uid = Some  │
//! │       ▲                                  │                      │       │
//! │       │                         false / fault                   │       │
//! │       │                                  ▼                      ▼       │
//! │       │                          Err(Unavailable)      object.execute_kw│
//! │       │                                                         │       │
//! │       └──────────── AccessDenied fault clears uid ◄─────────────┘       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The uid lives in an async `RwLock` owned by the gateway. Concurrent first
//! calls authenticate once: the write lock is re-checked after acquisition.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::ErpConfig;
use crate::error::{ErpError, ErpResult};
use crate::gateway::{ErpGateway, ErpProduct, InvoiceDraft};
use crate::xmlrpc::{self, Value};

/// Odoo XML-RPC client.
pub struct OdooGateway {
    config: ErpConfig,
    http: Client,
    uid: RwLock<Option<i64>>,
}

impl OdooGateway {
    /// Validates the config and builds the HTTP client. Does not connect.
    pub fn new(config: ErpConfig) -> ErpResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ErpError::InvalidConfig(e.to_string()))?;

        info!(url = %config.url, database = %config.database, "Odoo gateway configured");

        Ok(OdooGateway {
            config,
            http,
            uid: RwLock::new(None),
        })
    }

    /// Whether a session uid is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.uid.read().await.is_some()
    }

    /// Returns the cached uid, authenticating if there is none.
    async fn session(&self) -> ErpResult<i64> {
        if let Some(uid) = *self.uid.read().await {
            return Ok(uid);
        }

        let mut guard = self.uid.write().await;

        // Double-check after acquiring write lock
        if let Some(uid) = *guard {
            return Ok(uid);
        }

        let uid = self.authenticate().await?;
        info!(uid, "Authenticated with Odoo");
        *guard = Some(uid);
        Ok(uid)
    }

    async fn authenticate(&self) -> ErpResult<i64> {
        let result = self
            .call(
                "common",
                "authenticate",
                vec![
                    Value::from(self.config.database.as_str()),
                    Value::from(self.config.username.as_str()),
                    Value::from(self.config.password.as_str()),
                    Value::Struct(BTreeMap::new()),
                ],
            )
            .await?;

        match result {
            Value::Int(uid) if uid > 0 => Ok(uid),
            _ => Err(ErpError::Unavailable(
                "authentication rejected by ERP".to_string(),
            )),
        }
    }

    /// `object.execute_kw(db, uid, password, model, method, args)`.
    async fn execute_kw(&self, model: &str, method: &str, args: Vec<Value>) -> ErpResult<Value> {
        let uid = self.session().await?;

        let result = self
            .call(
                "object",
                "execute_kw",
                vec![
                    Value::from(self.config.database.as_str()),
                    Value::Int(uid),
                    Value::from(self.config.password.as_str()),
                    Value::from(model),
                    Value::from(method),
                    Value::Array(args),
                ],
            )
            .await;

        if let Err(e) = &result {
            if e.is_access_denied() {
                warn!(model, method, "ERP session rejected, will re-authenticate");
                *self.uid.write().await = None;
            }
        }

        result
    }

    /// One XML-RPC round trip.
    async fn call(&self, service: &str, method: &str, params: Vec<Value>) -> ErpResult<Value> {
        let body = xmlrpc::encode_call(method, &params)?;
        let endpoint = self.config.endpoint(service);

        debug!(endpoint = %endpoint, method, "XML-RPC call");

        let response = self
            .http
            .post(&endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErpError::Unavailable(format!("HTTP {}", status)));
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        xmlrpc::decode_response(&text)
    }

    fn transport_error(&self, err: reqwest::Error) -> ErpError {
        if err.is_timeout() {
            ErpError::Timeout(self.config.timeout)
        } else {
            ErpError::Unavailable(err.to_string())
        }
    }
}

/// `create` returns the new id, either bare or as a one-element list.
fn expect_id(value: Value) -> ErpResult<i64> {
    match value {
        Value::Int(id) => Ok(id),
        Value::Array(items) => match items.as_slice() {
            [Value::Int(id)] => Ok(*id),
            _ => Err(ErpError::Protocol("expected a single record id".to_string())),
        },
        other => Err(ErpError::Protocol(format!(
            "expected a record id, got {:?}",
            other
        ))),
    }
}

#[async_trait]
impl ErpGateway for OdooGateway {
    async fn create_product(&self, product: &ErpProduct) -> ErpResult<i64> {
        let record = Value::structure([
            ("name", Value::from(product.name.as_str())),
            ("list_price", Value::Double(product.sale_price.to_f64_lossy())),
            ("standard_price", Value::Double(product.unit_cost.to_f64_lossy())),
            ("type", Value::from("consu")),
        ]);

        let id = expect_id(
            self.execute_kw("product.product", "create", vec![record])
                .await?,
        )?;

        info!(erp_id = id, name = %product.name, "Product created in ERP");
        Ok(id)
    }

    async fn create_invoice(&self, invoice: &InvoiceDraft) -> ErpResult<i64> {
        if invoice.lines.is_empty() {
            return Err(ErpError::EmptyInvoice);
        }

        // Odoo's (0, 0, values) command creates a child record
        let lines = invoice
            .lines
            .iter()
            .map(|line| {
                Value::Array(vec![
                    Value::Int(0),
                    Value::Int(0),
                    Value::structure([
                        ("product_id", Value::Int(line.erp_product_id)),
                        ("quantity", Value::Int(line.quantity)),
                        ("price_unit", Value::Double(line.unit_price.to_f64_lossy())),
                    ]),
                ])
            })
            .collect();

        let record = Value::structure([
            ("move_type", Value::from("out_invoice")),
            ("partner_id", Value::Int(self.config.invoice_partner_id)),
            (
                "invoice_date",
                Value::from(invoice.invoice_date.format("%Y-%m-%d").to_string()),
            ),
            ("invoice_line_ids", Value::Array(lines)),
        ]);

        let id = expect_id(self.execute_kw("account.move", "create", vec![record]).await?)?;

        info!(invoice_id = id, lines = invoice.lines.len(), "Draft invoice created in ERP");
        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
