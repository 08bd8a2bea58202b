//! Core library for turning invoices and bills into structured records.
//!
//! This crate provides:
//! - Text acquisition from PDFs and images through an ordered strategy chain
//! - Whitespace normalization that keeps column gaps
//! - Labeled field extraction driven by configurable alias rules
//! - Line-item and expense table parsing by header signature
//! - A stable JSON record that always carries the alias vocabulary

pub mod acquisition;
pub mod error;
pub mod invoice;
pub mod models;
pub mod normalize;
pub mod ocr;
pub mod pdf;

pub use acquisition::{AcquiredText, ExtractionAttempt, Strategy, TextAcquirer, TextProvider};
#[cfg(feature = "native")]
pub use acquisition::LocalTextProvider;
pub use error::{BillscanError, Result};
pub use invoice::rules::{default_field_rules, default_table_specs, FieldRule, TableKind, TableSpec, ValuePattern};
pub use invoice::{InvoicePipeline, TextStructurer};
pub use models::config::BillscanConfig;
pub use models::document::{DocumentFormat, RawDocument};
pub use models::invoice::{InvoiceDocument, StructuredInvoice};
