//! Configuration for the billscan pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BillscanError, Result};
use crate::invoice::rules::{default_field_rules, default_table_specs, FieldRule, TableSpec};

/// Main configuration for the billscan pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillscanConfig {
    /// Text acquisition settings.
    pub acquisition: AcquisitionConfig,

    /// Field rules and table signatures.
    pub extraction: ExtractionConfig,
}

/// Which rasterizer renders scanned PDF pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterizerKind {
    /// Poppler's `pdftoppm`.
    #[default]
    Pdftoppm,
    /// Images embedded in the PDF, no external renderer.
    Embedded,
}

/// Which recognizer turns page images into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerKind {
    /// The `tesseract` command-line program.
    #[default]
    Tesseract,
    /// `pure-onnx-ocr` with models from `model_dir`.
    Onnx,
}

/// Text acquisition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Maximum pages to rasterize (0 = unlimited).
    pub max_pages: usize,

    /// Recognition language (tesseract language code).
    pub language: String,

    pub rasterizer: RasterizerKind,

    pub recognizer: RecognizerKind,

    /// Directory containing det.onnx, latin_rec.onnx and latin_dict.txt.
    pub model_dir: PathBuf,

    /// Tesseract executable.
    pub tesseract_cmd: String,

    /// pdftoppm executable.
    pub pdftoppm_cmd: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            max_pages: 10,
            language: "eng".to_string(),
            rasterizer: RasterizerKind::default(),
            recognizer: RecognizerKind::default(),
            model_dir: PathBuf::from("models"),
            tesseract_cmd: "tesseract".to_string(),
            pdftoppm_cmd: "pdftoppm".to_string(),
        }
    }
}

/// Extraction rules, kept as data so they can be edited without rebuilding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Labeled field rules, applied in order.
    pub fields: Vec<FieldRule>,

    /// Table header signatures.
    pub tables: Vec<TableSpec>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fields: default_field_rules(),
            tables: default_table_specs(),
        }
    }
}

impl BillscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| BillscanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save configuration to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| BillscanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = BillscanConfig::default();
        assert_eq!(config.acquisition.render_dpi, 300);
        assert_eq!(config.acquisition.max_pages, 10);
        assert_eq!(config.acquisition.recognizer, RecognizerKind::Tesseract);
        assert_eq!(config.extraction.fields.len(), 4);
        assert_eq!(config.extraction.tables.len(), 2);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = BillscanConfig::from_json(r#"{"acquisition": {"max_pages": 2, "recognizer": "onnx"}}"#).unwrap();
        assert_eq!(config.acquisition.max_pages, 2);
        assert_eq!(config.acquisition.recognizer, RecognizerKind::Onnx);
        assert_eq!(config.acquisition.language, "eng");
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("billscan-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");

        let mut config = BillscanConfig::default();
        config.acquisition.rasterizer = RasterizerKind::Embedded;
        config.save(&path).unwrap();

        let loaded = BillscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = std::env::temp_dir().join(format!("billscan-bad-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = BillscanConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, BillscanError::Config(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
