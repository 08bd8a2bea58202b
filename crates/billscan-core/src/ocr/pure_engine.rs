//! Recognizer backed by `pure-onnx-ocr` (pure Rust, no external runtime).

use std::cmp::Ordering;
use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::Recognizer;
use crate::error::OcrError;

/// Detection model file name inside the model directory.
pub const DETECTION_MODEL: &str = "det.onnx";
/// Recognition model file name inside the model directory.
pub const RECOGNITION_MODEL: &str = "latin_rec.onnx";
/// Character dictionary file name inside the model directory.
pub const DICTIONARY: &str = "latin_dict.txt";

/// Lines closer than this many pixels vertically are read left to right.
const LINE_BAND: f64 = 20.0;

/// A recognized region reduced to its reading-order anchor.
struct Region {
    top: f64,
    left: f64,
    text: String,
}

pub struct OnnxRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl OnnxRecognizer {
    /// Load the detection and recognition models from a directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        for file in [DETECTION_MODEL, RECOGNITION_MODEL, DICTIONARY] {
            if !model_dir.join(file).is_file() {
                return Err(OcrError::ModelLoad(format!(
                    "{} not found in {}",
                    file,
                    model_dir.display()
                )));
            }
        }

        let det_path = model_dir.join(DETECTION_MODEL);
        let rec_path = model_dir.join(RECOGNITION_MODEL);
        let dict_path = model_dir.join(DICTIONARY);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr models from {}", model_dir.display());
        Ok(Self { engine })
    }
}

impl Recognizer for OnnxRecognizer {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut regions: Vec<Region> = results
            .iter()
            .map(|r| {
                let (left, top) = top_left(&r.bounding_box);
                Region {
                    top,
                    left,
                    text: r.text.replace("[UNK]", " "),
                }
            })
            .collect();
        regions.sort_by(reading_order);

        debug!(
            "pure-onnx-ocr found {} regions in {}x{} image in {}ms",
            regions.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(join_lines(&regions))
    }
}

fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}

fn reading_order(a: &Region, b: &Region) -> Ordering {
    let band_a = (a.top / LINE_BAND) as i64;
    let band_b = (b.top / LINE_BAND) as i64;
    band_a
        .cmp(&band_b)
        .then_with(|| a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal))
}

/// Regions in one band share a line, separated by a column gap.
fn join_lines(regions: &[Region]) -> String {
    let mut out = String::new();
    let mut current_band = None;
    for region in regions {
        let band = (region.top / LINE_BAND) as i64;
        match current_band {
            Some(b) if b == band => out.push_str("  "),
            Some(_) => out.push('\n'),
            None => {}
        }
        current_band = Some(band);
        out.push_str(region.text.trim());
    }
    out
}
