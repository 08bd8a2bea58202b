//! Tesseract command-line recognizer.

use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tempfile::TempDir;
use tracing::debug;

use super::command::command_stdout;
use super::Recognizer;
use crate::error::OcrError;

/// Runs `tesseract <image> stdout -l <language>` on a staged PNG.
pub struct TesseractRecognizer {
    command: String,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl Recognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage("empty image".to_string()));
        }

        // Fresh directory per call; nothing here derives from caller input.
        let staging = TempDir::new()?;
        let image_path = staging.path().join("page.png");
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let start = Instant::now();
        let output = Command::new(&self.command)
            .arg(&image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();
        let text = command_stdout(output, &self.command, "install tesseract-ocr")?;

        debug!(
            "tesseract recognized {} chars from {}x{} image in {}ms",
            text.len(),
            width,
            height,
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_reported() {
        let recognizer = TesseractRecognizer::new("billscan-missing-tesseract", "eng");
        let image = DynamicImage::new_luma8(8, 8);
        let err = recognizer.recognize(&image).unwrap_err();
        assert!(matches!(err, OcrError::BackendNotAvailable(_)));
    }

    #[test]
    fn test_empty_image_rejected() {
        let err = TesseractRecognizer::default()
            .recognize(&DynamicImage::new_luma8(0, 0))
            .unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }
}
