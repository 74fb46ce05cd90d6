//! Elide command: a text shortened to a width.

use std::fmt;

use anyhow::{ensure, Result};
use scriptline::prelude::*;
use serde::Serialize;

use crate::cli::Mode;

#[derive(Debug, Serialize)]
pub struct ElideReport {
    pub elided: String,
    pub width: f32,
    pub available: f32,
}

pub fn run(mut engine: TextEngine, width: f32, mode: Mode, mnemonic: bool) -> Result<ElideReport> {
    ensure!(width.is_finite(), "width must be a number, got {width}");
    let mode = match mode {
        Mode::Left => ElideMode::Left,
        Mode::Right => ElideMode::Right,
        Mode::Middle => ElideMode::Middle,
        Mode::None => ElideMode::None,
    };
    let flags = TextOptionFlags {
        show_mnemonic: mnemonic,
        ..TextOptionFlags::default()
    };
    let available = Fixed::from_f32(width);
    let elided = engine.elided_text(mode, available, flags);

    let mut measured = TextEngine::new(&elided, engine.font().clone()).with_option(engine.option().clone());
    let len = elided.chars().count();
    Ok(ElideReport {
        width: measured.width(0, len).to_f32(),
        elided,
        available: available.to_f32(),
    })
}

impl fmt::Display for ElideReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.elided)
    }
}
