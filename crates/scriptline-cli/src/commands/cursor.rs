//! Cursor command: logical and visual stops around a position.

use std::fmt;

use anyhow::{bail, Result};
use scriptline::prelude::*;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CursorReport {
    pub pos: usize,
    pub previous: usize,
    pub next: usize,
    pub left: usize,
    pub right: usize,
    /// Cursor positions of the line from left to right.
    pub insertion_points: Vec<usize>,
}

pub fn run(mut engine: TextEngine, pos: usize) -> Result<CursorReport> {
    let len = engine.text_chars().len();
    if pos > len {
        bail!("position {pos} is past the end of the text ({len} characters)");
    }
    let line = engine.measure_line(0, len, Fixed::MAX);
    let index = engine.add_line(line);

    Ok(CursorReport {
        pos,
        previous: engine.previous_logical_position(pos),
        next: engine.next_logical_position(pos),
        left: engine.position_after_visual_movement(pos, MoveOperation::Left),
        right: engine.position_after_visual_movement(pos, MoveOperation::Right),
        insertion_points: engine.insertion_points_for_line(index),
    })
}

impl fmt::Display for CursorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "position {}", self.pos)?;
        writeln!(f, "logical  {} <- -> {}", self.previous, self.next)?;
        writeln!(f, "visual   {} <- -> {}", self.left, self.right)?;
        let points: Vec<String> = self.insertion_points.iter().map(ToString::to_string).collect();
        writeln!(f, "stops    {}", points.join(" "))
    }
}
