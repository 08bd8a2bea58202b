//! Data models: configuration, input documents and structured output.

pub mod config;
pub mod document;
pub mod invoice;
