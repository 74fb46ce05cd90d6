//! Subcommand implementations. Each builds a report that prints as text
//! or as JSON.

pub mod cursor;
pub mod elide;
pub mod itemize;
pub mod justify;
pub mod measure;

use std::fmt::Display;

use anyhow::Result;
use serde::Serialize;

/// Writes `report` to stdout.
pub fn emit<R: Serialize + Display>(report: &R, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

/// A box in pixels.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<scriptline::prelude::GlyphMetrics> for Rect {
    fn from(gm: scriptline::prelude::GlyphMetrics) -> Self {
        Self {
            x: gm.x.to_f32(),
            y: gm.y.to_f32(),
            width: gm.width.to_f32(),
            height: gm.height.to_f32(),
        }
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x {} y {} w {} h {}", self.x, self.y, self.width, self.height)
    }
}
