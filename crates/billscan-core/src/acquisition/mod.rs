//! Text acquisition through an ordered chain of strategies.
//!
//! Documents differ: some PDFs carry a clean text layer, some are scans that
//! need recognition, some uploads are plain images. Each strategy is tried in
//! a fixed order for the declared format and the first one that yields
//! non-whitespace text wins. Strategy failures are logged and treated as
//! empty output; only running out of strategies is an error.

#[cfg(feature = "native")]
mod provider;

#[cfg(feature = "native")]
pub use provider::LocalTextProvider;

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BillscanError, Result};
use crate::models::document::{DocumentFormat, RawDocument};

/// One way of turning a document into plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Read the embedded text layer.
    EmbeddedText,
    /// Render every page to an image and recognize each one.
    RasterRecognize,
    /// Recognize a single raster image directly.
    ImageRecognize,
}

impl Strategy {
    /// Strategies applicable to a format, in priority order.
    pub fn chain_for(format: DocumentFormat) -> &'static [Strategy] {
        match format {
            DocumentFormat::Pdf => &[Strategy::EmbeddedText, Strategy::RasterRecognize],
            DocumentFormat::Png | DocumentFormat::Jpg | DocumentFormat::Jpeg => &[Strategy::ImageRecognize],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::EmbeddedText => "embedded_text",
            Strategy::RasterRecognize => "raster_recognize",
            Strategy::ImageRecognize => "image_recognize",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single strategy. Strategies report failure as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionAttempt {
    /// Text produced by the strategy, possibly empty.
    Text(String),
    /// The strategy could not run.
    Failure(String),
}

impl ExtractionAttempt {
    /// Collapse a fallible collaborator call into an attempt.
    pub fn from_result<E: fmt::Display>(result: std::result::Result<String, E>) -> Self {
        match result {
            Ok(text) => ExtractionAttempt::Text(text),
            Err(e) => ExtractionAttempt::Failure(e.to_string()),
        }
    }

    /// The usable text, if the attempt produced any non-whitespace output.
    fn usable_text(self) -> Option<String> {
        match self {
            ExtractionAttempt::Text(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

/// The first non-empty text produced for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredText {
    pub text: String,
    /// Strategy that produced the text.
    pub strategy: Strategy,
}

/// Collaborator that runs one acquisition strategy against a document.
pub trait TextProvider {
    fn acquire(&self, document: &RawDocument, strategy: Strategy) -> ExtractionAttempt;
}

impl<P: TextProvider + ?Sized> TextProvider for &P {
    fn acquire(&self, document: &RawDocument, strategy: Strategy) -> ExtractionAttempt {
        (**self).acquire(document, strategy)
    }
}

impl<P: TextProvider + ?Sized> TextProvider for Box<P> {
    fn acquire(&self, document: &RawDocument, strategy: Strategy) -> ExtractionAttempt {
        (**self).acquire(document, strategy)
    }
}

/// Runs the strategy chain for a document against a provider.
pub struct TextAcquirer<P> {
    provider: P,
}

impl<P: TextProvider> TextAcquirer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Acquire text, returning the first non-empty strategy output.
    pub fn acquire(&self, document: &RawDocument) -> Result<AcquiredText> {
        let format = document.format();
        let chain = Strategy::chain_for(format);
        let mut attempted = Vec::with_capacity(chain.len());

        info!("Acquiring text from {} document ({} bytes)", format, document.len());

        for &strategy in chain {
            attempted.push(strategy);
            let start = Instant::now();

            let attempt = catch_unwind(AssertUnwindSafe(|| self.provider.acquire(document, strategy)))
                .unwrap_or_else(|_| ExtractionAttempt::Failure("strategy panicked".to_string()));

            if let ExtractionAttempt::Failure(reason) = &attempt {
                warn!("Strategy {} failed: {}", strategy, reason);
            }

            match attempt.usable_text() {
                Some(text) => {
                    info!(
                        "Strategy {} produced {} chars in {}ms",
                        strategy,
                        text.len(),
                        start.elapsed().as_millis()
                    );
                    return Ok(AcquiredText { text, strategy });
                }
                None => debug!("Strategy {} produced no text, trying next", strategy),
            }
        }

        Err(BillscanError::AcquisitionExhausted {
            format: format.to_string(),
            attempted,
        })
    }
}
