//! PDF page rasterizers.

use image::DynamicImage;
use tracing::{debug, trace};

use super::{page_limit, PageRasterizer};
use crate::error::PdfError;
use crate::pdf::PdfDocument;

/// Uses the first decodable image embedded on each page.
///
/// Scanners usually produce PDFs with exactly one full-page image per page,
/// so no renderer is needed for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedImageRasterizer;

impl PageRasterizer for EmbeddedImageRasterizer {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn rasterize(&self, pdf: &[u8], max_pages: usize) -> Result<Vec<DynamicImage>, PdfError> {
        let document = PdfDocument::load(pdf)?;
        let pages = page_limit(document.page_count() as usize, max_pages);

        let mut images = Vec::with_capacity(pages);
        for page in 1..=pages as u32 {
            match document.page_images(page)?.into_iter().next() {
                Some(image) => images.push(image),
                None => trace!("Page {} has no decodable image", page),
            }
        }

        debug!("Collected {} embedded page images", images.len());
        Ok(images)
    }
}

#[cfg(feature = "native")]
pub use self::pdftoppm::PdftoppmRasterizer;

#[cfg(feature = "native")]
mod pdftoppm {
    use std::path::PathBuf;
    use std::process::Command;

    use image::DynamicImage;
    use tempfile::TempDir;
    use tracing::debug;

    use crate::ocr::PageRasterizer;
    use crate::error::{OcrError, PdfError};
    use crate::ocr::command::command_stdout;

    /// Renders pages with poppler's `pdftoppm`.
    pub struct PdftoppmRasterizer {
        command: String,
        dpi: u32,
    }

    impl PdftoppmRasterizer {
        pub fn new(command: impl Into<String>, dpi: u32) -> Self {
            Self {
                command: command.into(),
                dpi,
            }
        }
    }

    impl Default for PdftoppmRasterizer {
        fn default() -> Self {
            Self::new("pdftoppm", 300)
        }
    }

    impl PageRasterizer for PdftoppmRasterizer {
        fn name(&self) -> &'static str {
            "pdftoppm"
        }

        fn rasterize(&self, pdf: &[u8], max_pages: usize) -> Result<Vec<DynamicImage>, PdfError> {
            let staging = TempDir::new().map_err(|e| PdfError::ImageExtraction(e.to_string()))?;
            let input = staging.path().join("input.pdf");
            std::fs::write(&input, pdf).map_err(|e| PdfError::ImageExtraction(e.to_string()))?;

            let mut command = Command::new(&self.command);
            command.args(["-png", "-r", &self.dpi.to_string()]);
            if max_pages > 0 {
                command.args(["-l", &max_pages.to_string()]);
            }
            command.arg(&input).arg(staging.path().join("page"));

            command_stdout(command.output(), &self.command, "install poppler-utils")
                .map_err(|e: OcrError| PdfError::ImageExtraction(e.to_string()))?;

            // pdftoppm pads page numbers to a common width, so names sort in page order.
            let mut pages: Vec<PathBuf> = std::fs::read_dir(staging.path())
                .map_err(|e| PdfError::ImageExtraction(e.to_string()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
                .collect();
            pages.sort();

            if pages.is_empty() {
                return Err(PdfError::ImageExtraction("pdftoppm produced no pages".to_string()));
            }

            let images = pages
                .iter()
                .map(|path| image::open(path).map_err(|e| PdfError::ImageExtraction(e.to_string())))
                .collect::<Result<Vec<_>, _>>()?;

            debug!("Rendered {} pages at {} DPI", images.len(), self.dpi);
            Ok(images)
        }
    }
}
