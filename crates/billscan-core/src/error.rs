//! Error types for the billscan-core library.

use thiserror::Error;

use crate::acquisition::Strategy;

/// Main error type for the billscan library.
#[derive(Error, Debug)]
pub enum BillscanError {
    /// The declared document format is not handled by any strategy.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Every applicable acquisition strategy produced empty text.
    #[error(
        "no text could be acquired from {format} document (tried {}); the input may be corrupted or unsupported",
        display_strategies(.attempted)
    )]
    AcquisitionExhausted {
        format: String,
        attempted: Vec<Strategy>,
    },

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Extraction rule error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

fn display_strategies(strategies: &[Strategy]) -> String {
    if strategies.is_empty() {
        return "no strategies".to_string();
    }
    strategies
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract or render page images.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to text recognition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// A required external program is not installed.
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// I/O error while staging files for an external program.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the configured extraction rules.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A field rule could not be compiled into a matcher.
    #[error("invalid rule for {field}: {reason}")]
    InvalidRule { field: String, reason: String },

    /// A table signature could not be compiled into a matcher.
    #[error("invalid table signature for {table}: {reason}")]
    InvalidSignature { table: String, reason: String },
}

/// Result type for the billscan library.
pub type Result<T> = std::result::Result<T, BillscanError>;
