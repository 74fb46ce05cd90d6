//! Font and session setup shared by every command.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use scriptline::engine_box::BoxEngine;
use scriptline::engine_multi::MultiEngine;
use scriptline::engine_sfnt::SfntEngine;
use scriptline::prelude::*;

use crate::cli::{Direction, FontArgs};

/// The font the commands lay out with. A font file is backed by box glyphs
/// for the characters it lacks.
pub fn load(args: &FontArgs) -> Result<Font> {
    if args.font_size <= 0 {
        bail!("font size must be positive, got {}", args.font_size);
    }
    let size = Fixed::from_int(args.font_size);
    let boxes: Arc<dyn FontEngine> = Arc::new(BoxEngine::with_size(size));

    let Some(path) = &args.font_file else {
        log::debug!("no font file, using {}px box glyphs", args.font_size);
        return Ok(Font::new(boxes));
    };

    let data = std::fs::read(path).with_context(|| format!("Failed to read font file {}", path.display()))?;
    let sfnt = SfntEngine::from_data(data, args.face_index, size)
        .with_context(|| format!("Failed to load face {} of {}", args.face_index, path.display()))?;
    log::info!("loaded {} ({} units per em)", path.display(), sfnt.units_per_em());

    let multi = MultiEngine::new(Arc::new(sfnt), vec![boxes])?;
    Ok(Font::new(Arc::new(multi)))
}

pub fn session(text: &str, font: Font, direction: Direction) -> TextEngine {
    let direction = match direction {
        Direction::Auto => TextDirection::Auto,
        Direction::Ltr => TextDirection::LeftToRight,
        Direction::Rtl => TextDirection::RightToLeft,
    };
    TextEngine::new(text, font).with_option(TextOption::default().with_direction(direction))
}
