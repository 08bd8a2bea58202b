//! Invoice structuring: field rules, table parsing and record assembly.

pub mod fields;
mod pipeline;
pub mod rules;
pub mod schema;
pub mod table;

pub use fields::{ExtractedField, FieldExtractor};
pub use pipeline::{InvoicePipeline, TextStructurer};
pub use schema::SchemaBuilder;
pub use table::{TableExtractor, TableRow};
