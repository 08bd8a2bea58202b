//! Raw documents as delivered by the upload boundary.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BillscanError, Result};

/// Declared format of a raw document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Png,
    Jpg,
    Jpeg,
}

impl DocumentFormat {
    /// Parse a format tag such as `pdf` or `.JPEG`.
    pub fn from_tag(tag: &str) -> Result<Self> {
        let normalized = tag.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "jpg" => Ok(Self::Jpg),
            "jpeg" => Ok(Self::Jpeg),
            _ => Err(BillscanError::UnsupportedFormat(tag.to_string())),
        }
    }

    /// Detect the format from the leading bytes of the content.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        let kind = infer::get(data)?;
        match kind.mime_type() {
            "application/pdf" => Some(Self::Pdf),
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Whether the document is a single raster image.
    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }

    /// Canonical tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFormat {
    type Err = BillscanError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}

/// Document bytes plus their declared format. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct RawDocument {
    data: Vec<u8>,
    format: DocumentFormat,
}

impl RawDocument {
    pub fn new(data: Vec<u8>, format: DocumentFormat) -> Self {
        Self { data, format }
    }

    /// Build a document from bytes and a client-supplied format tag.
    pub fn from_tagged(data: Vec<u8>, tag: &str) -> Result<Self> {
        Ok(Self::new(data, DocumentFormat::from_tag(tag)?))
    }

    /// Read a document from disk, taking the format from the file extension
    /// and falling back to content sniffing when there is none.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => DocumentFormat::from_tag(ext)?,
            None => DocumentFormat::sniff(&data).ok_or_else(|| {
                BillscanError::UnsupportedFormat(format!("{} (unrecognized content)", path.display()))
            })?,
        };
        Ok(Self::new(data, format))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
