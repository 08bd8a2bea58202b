//! End-to-end document processing.

use std::time::Instant;

use tracing::{debug, info};

use crate::acquisition::{TextAcquirer, TextProvider};
use crate::error::Result;
use crate::models::config::ExtractionConfig;
use crate::models::document::RawDocument;
use crate::models::invoice::InvoiceDocument;
use crate::normalize::normalize;

use super::fields::FieldExtractor;
use super::rules::{FieldRule, TableSpec};
use super::schema::SchemaBuilder;
use super::table::TableExtractor;

/// Normalization, field and table extraction, and record assembly.
///
/// Works on text alone, so it is usable where no acquisition backend exists.
pub struct TextStructurer {
    fields: FieldExtractor,
    tables: TableExtractor,
    schema: SchemaBuilder,
}

impl TextStructurer {
    /// Compile the configured rules.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let fields = FieldExtractor::new(config.fields.clone())?;
        let tables = TableExtractor::new(config.tables.clone())?;
        let schema = SchemaBuilder::new(tables.specs());
        Ok(Self { fields, tables, schema })
    }

    pub fn field_rules(&self) -> impl Iterator<Item = &FieldRule> {
        self.fields.rules()
    }

    pub fn table_specs(&self) -> impl Iterator<Item = &TableSpec> {
        self.tables.specs()
    }

    /// Structure already-acquired text. Never fails: missing values are null.
    pub fn structure(&self, text: &str) -> InvoiceDocument {
        let normalized = normalize(text);
        let headers = self.tables.header_lines(&normalized.lines);
        let fields = self.fields.extract_outside(&normalized.lines, &headers);
        let rows = self.tables.extract(&normalized.lines);
        let document = self.schema.build(fields, rows, &normalized);

        let data = &document.structured_data;
        debug!(
            "Structured {} fields, {} items, {} expenses",
            data.found_field_count(),
            data.items.len(),
            data.expenses.len()
        );
        document
    }
}

/// Turns a raw document into a structured invoice.
pub struct InvoicePipeline<P> {
    acquirer: TextAcquirer<P>,
    structurer: TextStructurer,
}

impl<P: TextProvider> InvoicePipeline<P> {
    pub fn new(provider: P, extraction: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            acquirer: TextAcquirer::new(provider),
            structurer: TextStructurer::new(extraction)?,
        })
    }

    pub fn structurer(&self) -> &TextStructurer {
        &self.structurer
    }

    /// Acquire text from the document and structure it.
    ///
    /// Fails only when no acquisition strategy yields text.
    pub fn process(&self, document: &RawDocument) -> Result<InvoiceDocument> {
        let start = Instant::now();
        let acquired = self.acquirer.acquire(document)?;
        let result = self.structurer.structure(&acquired.text);

        info!(
            "Processed {} document via {} in {}ms",
            document.format(),
            acquired.strategy,
            start.elapsed().as_millis()
        );
        Ok(result)
    }

    /// Structure plain text, skipping acquisition.
    pub fn process_text(&self, text: &str) -> InvoiceDocument {
        self.structurer.structure(text)
    }
}

#[cfg(feature = "native")]
impl InvoicePipeline<crate::acquisition::LocalTextProvider> {
    /// Build a pipeline with local collaborators from configuration.
    pub fn from_config(config: &crate::models::config::BillscanConfig) -> Result<Self> {
        let provider = crate::acquisition::LocalTextProvider::from_config(&config.acquisition)?;
        Self::new(provider, &config.extraction)
    }
}
