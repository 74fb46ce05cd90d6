//! Measure command: width and boxes of a character range.

use std::fmt;

use anyhow::{bail, Result};
use scriptline::prelude::*;
use serde::Serialize;

use super::Rect;

#[derive(Debug, Serialize)]
pub struct MeasureReport {
    pub from: usize,
    pub len: usize,
    pub width: f32,
    pub bounding_box: Rect,
    pub tight_bounding_box: Rect,
}

pub fn run(mut engine: TextEngine, from: usize, len: Option<usize>) -> Result<MeasureReport> {
    let total = engine.text_chars().len();
    if from > total {
        bail!("range starts at {from} but the text has {total} characters");
    }
    let len = len.unwrap_or(total - from).min(total - from);

    let width = engine.width(from, len);
    let bounding_box = engine.bounding_box(from, len);
    let tight_bounding_box = engine.tight_bounding_box(from, len);
    if engine.is_layout_failed() {
        bail!("layout failed");
    }
    Ok(MeasureReport {
        from,
        len,
        width: width.to_f32(),
        bounding_box: bounding_box.into(),
        tight_bounding_box: tight_bounding_box.into(),
    })
}

impl fmt::Display for MeasureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "range {}+{}", self.from, self.len)?;
        writeln!(f, "width {}", self.width)?;
        writeln!(f, "box   {}", self.bounding_box)?;
        writeln!(f, "ink   {}", self.tight_bounding_box)
    }
}
