//! OCR results: raw engine output, positioned text boxes, and row grouping.
//!
//! The OCR engine itself runs outside this crate. Engines hand back a
//! loosely shaped document (PaddleOCR's `rec_texts` / `rec_boxes` layout);
//! [`OcrOutput::text_boxes`] flattens it into [`TextBox`] values that the
//! [`RowGrouper`] clusters into table rows.

mod engine;
mod rows;

pub use engine::{create_engine, CommandEngine, OcrEngine, SidecarEngine};
pub use rows::{Row, RowGrouper};

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OcrError;

/// A recognized text fragment with the center of its bounding box.
///
/// Coordinates are image pixels, origin top-left, y growing downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Vertical center of the bounding box.
    pub y_center: f32,

    /// Horizontal center of the bounding box.
    pub x_center: f32,

    /// Recognized text, trimmed.
    pub text: String,
}

impl TextBox {
    /// Create a text box from its center (y first, then x) and its text.
    pub fn new(y_center: f32, x_center: f32, text: impl Into<String>) -> Self {
        Self {
            y_center,
            x_center,
            text: text.into(),
        }
    }
}

/// A bounding box as reported by the OCR engine.
///
/// Engines report either a flat list of alternating x/y values
/// (`[x1, y1, x2, y2]`) or a polygon of points (`[[x, y], ...]`).
/// Anything else is kept as [`RawBox::Unrecognized`] so a single bad box
/// does not discard the rest of its region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawBox {
    /// Alternating x/y values.
    Flat(Vec<f32>),
    /// Polygon points.
    Polygon(Vec<[f32; 2]>),
    /// Unusable box value.
    Unrecognized(serde_json::Value),
}

impl RawBox {
    /// Center of the box as `(x, y)`.
    ///
    /// The center is the mean of the x values (even positions) and the mean
    /// of the y values (odd positions), so any number of sampled points is
    /// accepted. Returns `None` when either axis has no values or the
    /// result is not finite.
    pub fn center(&self) -> Option<(f32, f32)> {
        match self {
            RawBox::Flat(values) => mean_center(values.iter().copied()),
            RawBox::Polygon(points) => {
                mean_center(points.iter().flat_map(|[x, y]| [*x, *y]))
            }
            RawBox::Unrecognized(_) => None,
        }
    }
}

fn mean_center(values: impl Iterator<Item = f32>) -> Option<(f32, f32)> {
    let (mut sum_x, mut count_x) = (0.0f32, 0usize);
    let (mut sum_y, mut count_y) = (0.0f32, 0usize);

    for (i, value) in values.enumerate() {
        if i % 2 == 0 {
            sum_x += value;
            count_x += 1;
        } else {
            sum_y += value;
            count_y += 1;
        }
    }

    if count_x == 0 || count_y == 0 {
        return None;
    }

    let x = sum_x / count_x as f32;
    let y = sum_y / count_y as f32;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// One region of OCR output.
///
/// Both lists are optional; `rec_boxes[i]` is the box of `rec_texts[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrRegion {
    /// Recognized text strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec_texts: Option<Vec<String>>,

    /// Bounding boxes parallel to `rec_texts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec_boxes: Option<Vec<RawBox>>,
}

impl OcrRegion {
    pub fn new(rec_texts: Vec<String>, rec_boxes: Vec<RawBox>) -> Self {
        Self {
            rec_texts: Some(rec_texts),
            rec_boxes: Some(rec_boxes),
        }
    }
}

/// Raw OCR output for one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    /// Region entries in engine order; `None` marks an entry that was not
    /// region-shaped.
    pub regions: Vec<Option<OcrRegion>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Regions(Vec<RawEntry>),
    Wrapped { res: OcrRegion },
    Single(OcrRegion),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Wrapped { res: OcrRegion },
    Region(OcrRegion),
    Other(serde_json::Value),
}

impl OcrOutput {
    /// Create output from already-shaped regions.
    pub fn from_regions(regions: impl IntoIterator<Item = OcrRegion>) -> Self {
        Self {
            regions: regions.into_iter().map(Some).collect(),
        }
    }

    /// Parse an OCR result document.
    ///
    /// Accepts a list of regions, a single region object, or a region
    /// wrapped under `"res"`. List entries that are not region-shaped are
    /// kept as `None`.
    pub fn from_json_str(json: &str) -> Result<Self, OcrError> {
        let document: RawDocument =
            serde_json::from_str(json).map_err(|e| OcrError::Malformed(e.to_string()))?;

        let regions = match document {
            RawDocument::Regions(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    RawEntry::Wrapped { res } | RawEntry::Region(res) => Some(res),
                    RawEntry::Other(_) => None,
                })
                .collect(),
            RawDocument::Wrapped { res } | RawDocument::Single(res) => vec![Some(res)],
        };

        Ok(Self { regions })
    }

    /// Read and parse an OCR result document from a file.
    pub fn from_json_file(path: &Path) -> Result<Self, OcrError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OcrError::MissingOutput {
                path: path.to_path_buf(),
            },
            _ => OcrError::Engine(format!("failed to read {}: {}", path.display(), e)),
        })?;
        Self::from_json_str(&content)
    }

    /// Flatten all regions into text boxes.
    ///
    /// A text without a usable box at the same index is skipped.
    pub fn text_boxes(&self) -> Vec<TextBox> {
        let mut boxes = Vec::new();
        let mut skipped = 0usize;

        for region in self.regions.iter().flatten() {
            let Some(texts) = &region.rec_texts else {
                continue;
            };
            let raw_boxes = region.rec_boxes.as_deref().unwrap_or(&[]);

            for (idx, text) in texts.iter().enumerate() {
                match raw_boxes.get(idx).and_then(RawBox::center) {
                    Some((x, y)) => boxes.push(TextBox::new(y, x, text.trim())),
                    None => skipped += 1,
                }
            }
        }

        if skipped > 0 {
            debug!("Skipped {} recognized texts without a usable bounding box", skipped);
        }
        debug!("Extracted {} text boxes", boxes.len());

        boxes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flat_box_center() {
        let raw = RawBox::Flat(vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(raw.center(), Some((20.0, 30.0)));
    }

    #[test]
    fn test_polygon_center() {
        let raw = RawBox::Polygon(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 6.0], [0.0, 6.0]]);
        assert_eq!(raw.center(), Some((5.0, 3.0)));
    }

    #[test]
    fn test_arbitrary_length_box() {
        let raw = RawBox::Flat(vec![0.0, 3.0, 6.0, 9.0, 12.0, 15.0]);
        assert_eq!(raw.center(), Some((6.0, 9.0)));
    }

    #[test]
    fn test_unusable_boxes() {
        assert_eq!(RawBox::Flat(vec![]).center(), None);
        assert_eq!(RawBox::Flat(vec![4.0]).center(), None);
        assert_eq!(RawBox::Unrecognized(serde_json::json!("x")).center(), None);
    }

    #[test]
    fn test_text_boxes_trims_and_skips_missing_boxes() {
        let output = OcrOutput::from_regions([OcrRegion::new(
            vec!["  Widget A ".to_string(), "10,00".to_string(), "orphan".to_string()],
            vec![
                RawBox::Flat(vec![0.0, 100.0, 40.0, 120.0]),
                RawBox::Flat(vec![200.0, 100.0, 240.0, 120.0]),
            ],
        )]);

        let boxes = output.text_boxes();
        assert_eq!(
            boxes,
            vec![
                TextBox::new(110.0, 20.0, "Widget A"),
                TextBox::new(110.0, 220.0, "10,00"),
            ]
        );
    }

    #[test]
    fn test_empty_output() {
        assert!(OcrOutput::default().text_boxes().is_empty());
        let output = OcrOutput::from_json_str("[]").unwrap();
        assert!(output.regions.is_empty());
        assert!(output.text_boxes().is_empty());
    }

    #[test]
    fn test_region_without_boxes_yields_nothing() {
        let output = OcrOutput::from_json_str(r#"[{"rec_texts": ["a", "b"]}]"#).unwrap();
        assert!(output.text_boxes().is_empty());
    }

    #[test]
    fn test_parse_list_skips_non_regions() {
        let json = r#"[
            null,
            42,
            {"rec_texts": ["Widget"], "rec_boxes": [[0, 10, 20, 30]]},
            {"res": {"rec_texts": ["Gadget"], "rec_boxes": [[[0, 50], [20, 50], [20, 70], [0, 70]]]}}
        ]"#;

        let output = OcrOutput::from_json_str(json).unwrap();
        assert_eq!(output.regions.len(), 4);
        assert!(output.regions[0].is_none());
        assert!(output.regions[1].is_none());

        let boxes = output.text_boxes();
        assert_eq!(
            boxes,
            vec![TextBox::new(20.0, 10.0, "Widget"), TextBox::new(60.0, 10.0, "Gadget")]
        );
    }

    #[test]
    fn test_parse_single_and_wrapped_documents() {
        let single = OcrOutput::from_json_str(
            r#"{"input_path": "a.png", "rec_texts": ["x"], "rec_boxes": [[1, 2, 3, 4]]}"#,
        )
        .unwrap();
        assert_eq!(single.text_boxes(), vec![TextBox::new(3.0, 2.0, "x")]);

        let wrapped =
            OcrOutput::from_json_str(r#"{"res": {"rec_texts": ["y"], "rec_boxes": [[1, 2, 3, 4]]}}"#)
                .unwrap();
        assert_eq!(wrapped.text_boxes(), vec![TextBox::new(3.0, 2.0, "y")]);
    }

    #[test]
    fn test_bad_box_only_skips_its_text() {
        let json = r#"[{"rec_texts": ["a", "b"], "rec_boxes": ["oops", [0, 0, 10, 10]]}]"#;
        let output = OcrOutput::from_json_str(json).unwrap();
        assert_eq!(output.text_boxes(), vec![TextBox::new(5.0, 5.0, "b")]);
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            OcrOutput::from_json_str("not json"),
            Err(OcrError::Malformed(_))
        ));
        assert!(matches!(OcrOutput::from_json_str("12"), Err(OcrError::Malformed(_))));
    }
}
