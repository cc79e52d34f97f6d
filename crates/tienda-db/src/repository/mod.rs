//! # Repository Module
//!
//! Database repository implementations for Tienda POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler / service                                                │
//! │       │                                                                 │
//! │       │  db.sales().record_sale(&new_sale)                             │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── record_sale(&self, new_sale)   ← one transaction                  │
//! │  ├── list_recent(&self, limit)                                         │
//! │  └── sales_between(&self, start, end)                                  │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD, name search, low-stock queries
//! - [`sale::SaleRepository`] - Atomic sale registration and the sale ledger
//! - [`company::CompanyRepository`] - The single company profile row

pub mod company;
pub mod product;
pub mod sale;
