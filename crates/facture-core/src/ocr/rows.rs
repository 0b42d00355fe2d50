//! Row reconstruction from positioned text boxes.

use std::cmp::Ordering;

use tracing::debug;

use crate::models::config::DEFAULT_Y_THRESHOLD;

use super::TextBox;

/// A visual table row: text boxes ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    anchor_y: f32,
    boxes: Vec<TextBox>,
}

impl Row {
    /// Vertical center of the box that opened this row.
    pub fn anchor_y(&self) -> f32 {
        self.anchor_y
    }

    /// Boxes in ascending x order.
    pub fn boxes(&self) -> &[TextBox] {
        &self.boxes
    }

    /// Texts in ascending x order.
    pub fn texts(&self) -> Vec<&str> {
        self.boxes.iter().map(|b| b.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn into_boxes(self) -> Vec<TextBox> {
        self.boxes
    }
}

/// Groups text boxes into rows by vertical proximity.
///
/// Boxes are swept top to bottom. A box joins the current row when its
/// vertical center is within `y_threshold` of the box that opened the row;
/// the anchor is not moved by later boxes, so a row cannot creep downward.
#[derive(Debug, Clone)]
pub struct RowGrouper {
    y_threshold: f32,
}

impl RowGrouper {
    /// Create a grouper with the default threshold (15 px).
    pub fn new() -> Self {
        Self {
            y_threshold: DEFAULT_Y_THRESHOLD,
        }
    }

    /// Set the maximum vertical distance from a row's opening box.
    pub fn with_y_threshold(mut self, y_threshold: f32) -> Self {
        self.y_threshold = y_threshold;
        self
    }

    pub fn y_threshold(&self) -> f32 {
        self.y_threshold
    }

    /// Cluster boxes into rows, ordered top to bottom.
    pub fn group(&self, mut boxes: Vec<TextBox>) -> Vec<Row> {
        boxes.sort_by(reading_order);

        let mut rows = Vec::new();
        let mut current: Vec<TextBox> = Vec::new();
        let mut last_y: Option<f32> = None;

        for text_box in boxes {
            let opens_row = match last_y {
                None => true,
                Some(anchor) => (text_box.y_center - anchor).abs() > self.y_threshold,
            };

            if opens_row {
                if let Some(anchor) = last_y {
                    rows.push(close_row(anchor, std::mem::take(&mut current)));
                }
                last_y = Some(text_box.y_center);
            }

            current.push(text_box);
        }

        if let Some(anchor) = last_y {
            rows.push(close_row(anchor, current));
        }

        debug!("Grouped boxes into {} rows (threshold {})", rows.len(), self.y_threshold);

        rows
    }
}

impl Default for RowGrouper {
    fn default() -> Self {
        Self::new()
    }
}

/// Total order on `(y, x)`, with text as the last tie-break so identical
/// positions still sort the same way regardless of input order.
fn reading_order(a: &TextBox, b: &TextBox) -> Ordering {
    a.y_center
        .total_cmp(&b.y_center)
        .then_with(|| a.x_center.total_cmp(&b.x_center))
        .then_with(|| a.text.cmp(&b.text))
}

fn close_row(anchor_y: f32, mut boxes: Vec<TextBox>) -> Row {
    boxes.sort_by(|a, b| a.x_center.total_cmp(&b.x_center));
    Row { anchor_y, boxes }
}
