//! Page rasterization and text recognition collaborators.
//!
//! The acquisition layer only sees the two traits below. Implementations
//! that shell out to external programs or load model files are gated
//! behind the `native` feature.

mod raster;

#[cfg(feature = "native")]
mod command;
#[cfg(feature = "native")]
mod pure_engine;
#[cfg(feature = "native")]
mod tesseract;

pub use raster::EmbeddedImageRasterizer;

#[cfg(feature = "native")]
pub use pure_engine::OnnxRecognizer;
#[cfg(feature = "native")]
pub use raster::PdftoppmRasterizer;
#[cfg(feature = "native")]
pub use tesseract::TesseractRecognizer;

use image::DynamicImage;

use crate::error::{OcrError, PdfError};

/// Turns a raster image into text.
pub trait Recognizer {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Renders the pages of a PDF into raster images, in page order.
pub trait PageRasterizer {
    fn name(&self) -> &'static str;

    /// Render at most `max_pages` pages (0 = all).
    fn rasterize(&self, pdf: &[u8], max_pages: usize) -> Result<Vec<DynamicImage>, PdfError>;
}

impl<R: Recognizer + ?Sized> Recognizer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

impl<R: PageRasterizer + ?Sized> PageRasterizer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn rasterize(&self, pdf: &[u8], max_pages: usize) -> Result<Vec<DynamicImage>, PdfError> {
        (**self).rasterize(pdf, max_pages)
    }
}

/// Number of pages to process given a document length and a cap.
pub(crate) fn page_limit(total: usize, max_pages: usize) -> usize {
    if max_pages == 0 { total } else { total.min(max_pages) }
}
