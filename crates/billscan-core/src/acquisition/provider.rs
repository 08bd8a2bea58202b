//! Provider running strategies against local collaborators.

use tracing::{debug, warn};

use super::{ExtractionAttempt, Strategy, TextProvider};
use crate::error::{BillscanError, OcrError, Result};
use crate::models::config::{AcquisitionConfig, RasterizerKind, RecognizerKind};
use crate::models::document::RawDocument;
use crate::ocr::{
    EmbeddedImageRasterizer, OnnxRecognizer, PageRasterizer, PdftoppmRasterizer, Recognizer, TesseractRecognizer,
};
use crate::pdf::PdfDocument;

/// Acquires text with lopdf/pdf-extract, a page rasterizer and a recognizer.
pub struct LocalTextProvider {
    rasterizer: Box<dyn PageRasterizer>,
    recognizer: Box<dyn Recognizer>,
    max_pages: usize,
}

impl LocalTextProvider {
    pub fn new(rasterizer: Box<dyn PageRasterizer>, recognizer: Box<dyn Recognizer>, max_pages: usize) -> Self {
        Self {
            rasterizer,
            recognizer,
            max_pages,
        }
    }

    /// Build the collaborators named in the configuration.
    ///
    /// Fails only when the ONNX recognizer is selected and its models cannot
    /// be loaded; missing external programs surface later as strategy
    /// failures.
    pub fn from_config(config: &AcquisitionConfig) -> Result<Self> {
        let rasterizer: Box<dyn PageRasterizer> = match config.rasterizer {
            RasterizerKind::Pdftoppm => Box::new(PdftoppmRasterizer::new(&config.pdftoppm_cmd, config.render_dpi)),
            RasterizerKind::Embedded => Box::new(EmbeddedImageRasterizer),
        };
        let recognizer: Box<dyn Recognizer> = match config.recognizer {
            RecognizerKind::Tesseract => Box::new(TesseractRecognizer::new(&config.tesseract_cmd, &config.language)),
            RecognizerKind::Onnx => Box::new(OnnxRecognizer::from_dir(&config.model_dir)?),
        };

        debug!(
            "Text provider: {} rasterizer, {} recognizer, max {} pages",
            rasterizer.name(),
            recognizer.name(),
            config.max_pages
        );
        Ok(Self::new(rasterizer, recognizer, config.max_pages))
    }

    fn embedded_text(&self, document: &RawDocument) -> Result<String> {
        if document.format().is_image() {
            return Err(BillscanError::UnsupportedFormat(format!(
                "{} has no text layer",
                document.format()
            )));
        }
        let pdf = PdfDocument::load(document.data())?;
        Ok(pdf.extract_text()?)
    }

    fn raster_recognize(&self, document: &RawDocument) -> Result<String> {
        let pages = self.rasterizer.rasterize(document.data(), self.max_pages)?;
        debug!("Recognizing {} rendered pages", pages.len());

        let mut texts = Vec::with_capacity(pages.len());
        let mut first_error: Option<OcrError> = None;
        for (index, page) in pages.iter().enumerate() {
            match self.recognizer.recognize(page) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!("Page {} recognition failed: {}", index + 1, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if texts.is_empty() => Err(e.into()),
            _ => Ok(texts.join("\n")),
        }
    }

    fn image_recognize(&self, document: &RawDocument) -> Result<String> {
        let image = image::load_from_memory(document.data())?;
        Ok(self.recognizer.recognize(&image)?)
    }
}

impl TextProvider for LocalTextProvider {
    fn acquire(&self, document: &RawDocument, strategy: Strategy) -> ExtractionAttempt {
        let result = match strategy {
            Strategy::EmbeddedText => self.embedded_text(document),
            Strategy::RasterRecognize => self.raster_recognize(document),
            Strategy::ImageRecognize => self.image_recognize(document),
        };
        ExtractionAttempt::from_result(result)
    }
}
