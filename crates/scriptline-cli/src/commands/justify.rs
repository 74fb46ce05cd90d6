//! Justify command: greedy line breaking at whitespace, then alignment.

use std::fmt;

use anyhow::{ensure, Result};
use scriptline::prelude::*;
use serde::Serialize;

use crate::cli::Align;

#[derive(Debug, Serialize)]
pub struct LineRow {
    pub from: usize,
    pub length: usize,
    pub trailing_spaces: usize,
    pub text: String,
    /// Left edge after alignment.
    pub x: f32,
    pub natural_width: f32,
    /// Width after justification.
    pub width: f32,
    pub justified: bool,
}

#[derive(Debug, Serialize)]
pub struct JustifyReport {
    pub width: f32,
    pub lines: Vec<LineRow>,
}

/// Ends of the lines of a paragraph broken greedily after whitespace. A
/// word wider than `width` gets a line of its own.
fn break_lines(engine: &mut TextEngine, width: Fixed) -> Vec<ScriptLine> {
    let attributes = engine.attributes().to_vec();
    let len = attributes.len();
    let breaks: Vec<usize> = (1..=len)
        .filter(|&end| end == len || (attributes[end - 1].white_space && !attributes[end].white_space))
        .collect();

    let mut lines = Vec::new();
    let mut from = 0;
    while from < len {
        let mut chosen: Option<ScriptLine> = None;
        for &end in breaks.iter().filter(|&&end| end > from) {
            let line = engine.measure_line(from, end - from, width);
            if line.text_width > width && chosen.is_some() {
                break;
            }
            chosen = Some(line);
            if line.text_width > width {
                break;
            }
        }
        let Some(line) = chosen else {
            break;
        };
        from = line.end();
        lines.push(line);
    }
    lines
}

pub fn run(mut engine: TextEngine, width: f32, align: Align, force: bool) -> Result<JustifyReport> {
    ensure!(width.is_finite() && width > 0.0, "width must be positive, got {width}");
    let alignment = match align {
        Align::Left => Alignment::Left,
        Align::Right => Alignment::Right,
        Align::Center => Alignment::Center,
        Align::Justify => Alignment::Justify,
    };
    let option = engine.option().clone().with_alignment(alignment);
    engine.set_option(option);
    engine.set_force_justification(force);

    let width = Fixed::from_f32(width);
    let chars = engine.text_chars().to_vec();
    let mut lines = Vec::new();
    for line in break_lines(&mut engine, width) {
        let index = engine.add_line(line);
        let x = engine.align_line(index);
        let justified = engine.line(index).is_some_and(|l| l.justified);
        lines.push(LineRow {
            from: line.from,
            length: line.length,
            trailing_spaces: line.trailing_spaces,
            text: chars[line.from..line.from + line.length].iter().collect(),
            x: x.to_f32(),
            natural_width: line.text_width.to_f32(),
            width: engine.justified_width(line.from, line.length).to_f32(),
            justified,
        });
    }
    log::debug!("{} lines at width {}", lines.len(), width);
    Ok(JustifyReport {
        width: width.to_f32(),
        lines,
    })
}

impl fmt::Display for JustifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(
                f,
                "{:>4} x {:>7} w {:>7} -> {:>7}{}  {:?}",
                line.from,
                line.x,
                line.natural_width,
                line.width,
                if line.justified { " justified" } else { "" },
                line.text
            )?;
        }
        Ok(())
    }
}
