//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::Result;
use crate::error::PdfError;

/// A loaded PDF, decrypted when it only carries an empty user password.
pub struct PdfDocument {
    document: Document,
    /// Bytes handed to pdf-extract (the decrypted copy for encrypted files).
    raw_data: Vec<u8>,
}

impl PdfDocument {
    /// Parse a PDF from memory.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", document.get_pages().len());
        Ok(Self { document, raw_data })
    }

    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Text of the embedded text layer for the whole document.
    pub fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data).map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Decodable image XObjects placed on a page (1-indexed).
    pub fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let pages = self.document.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        let Some(resources) = self.page_resources(*page_id) else {
            return Ok(images);
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Ok(images);
        };
        if let Ok((_, Object::Dictionary(xobjects))) = self.document.dereference(xobjects) {
            for (_name, reference) in xobjects.iter() {
                if let Ok((_, object)) = self.document.dereference(reference) {
                    if let Some(image) = self.decode_image(object) {
                        images.push(image);
                    }
                }
            }
        }

        trace!("Page {}: {} decodable images", page, images.len());
        Ok(images)
    }

    /// Resources of a page, following `Parent` links for inherited entries.
    fn page_resources(&self, node: ObjectId) -> Option<Dictionary> {
        let Ok(Object::Dictionary(dict)) = self.document.get_object(node) else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(resources))) = self.document.dereference(resources) {
                return Some(resources.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => self.page_resources(*parent),
            _ => None,
        }
    }

    fn decode_image(&self, object: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = object else {
            return None;
        };
        let dict = &stream.dict;
        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

        let filter = dict.get(b"Filter").ok().and_then(|f| match f {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(filters) => filters.first().and_then(|o| o.as_name().ok()),
            _ => None,
        });

        match filter {
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg).ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Skipping image with unsupported filter");
                return None;
            }
            _ => {}
        }

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        if bits != 8 {
            trace!("Skipping image with {} bits per component", bits);
            return None;
        }

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.clone()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()).map(<[u8]>::to_vec),
                Object::Reference(r) => self
                    .document
                    .get_object(*r)
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(<[u8]>::to_vec),
                _ => None,
            })
            .unwrap_or_else(|| b"DeviceRGB".to_vec());

        let data = stream.decompressed_content().unwrap_or_else(|_| stream.content.clone());
        raw_to_image(&data, width, height, &color_space)
    }
}

/// Build an image from uncompressed 8-bit samples.
fn raw_to_image(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    match color_space {
        b"DeviceRGB" | b"RGB" => {
            let samples = data.get(..pixels.checked_mul(3)?)?.to_vec();
            RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" => {
            let samples = data.get(..pixels)?.to_vec();
            GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!("Unsupported color space {:?}", String::from_utf8_lossy(color_space));
            None
        }
    }
}
