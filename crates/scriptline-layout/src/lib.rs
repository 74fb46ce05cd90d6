// this_file: crates/scriptline-layout/src/lib.rs

//! Paragraph layout: from characters to measured, justified lines.
//!
//! A [`TextEngine`] carries one paragraph through these steps, each run on
//! demand and cached until the text, font or options change:
//!
//! 1. **Itemize** - bidi levels, scripts and special characters cut the
//!    text into [`ScriptItem`](scriptline_core::ScriptItem)s
//! 2. **Shape** - each item's font engine fills the shared glyph buffer
//! 3. **Measure** - widths and boxes of any character range, tabs included
//! 4. **Lines** - callers measure and add lines, then justify and align them
//! 5. **Query** - cursor movement, selections and elided text
//!
//! ## Measuring a string
//!
//! ```rust
//! use std::sync::Arc;
//! use scriptline_core::Fixed;
//! use scriptline_engine_box::BoxEngine;
//! use scriptline_layout::{ElideMode, Font, TextEngine, TextOptionFlags};
//!
//! let font = Font::new(Arc::new(BoxEngine::new(10)));
//! let mut engine = TextEngine::new("hello world", font);
//! assert_eq!(engine.width(0, 11), Fixed::from_int(110));
//!
//! let elided = engine.elided_text(ElideMode::Right, Fixed::from_int(50), TextOptionFlags::default());
//! assert_eq!(elided, "hell\u{2026}");
//! ```

pub mod cursor;
pub mod elide;
pub mod engine;
pub mod itemizer;
pub mod justify;
pub mod layout_data;
pub mod line;
pub mod metrics;
pub mod options;
pub mod shaping;

pub use engine::TextEngine;
pub use itemizer::{analyze, Analysis, Itemizer, MAX_ITEM_LENGTH, VISIBLE_LINE_SEPARATOR};
pub use layout_data::{LayoutData, LayoutState};
pub use line::{LineItem, ScriptLine};
pub use options::{
    Alignment, Capitalization, CharFormat, ElideMode, Font, FormatRange, LetterSpacing, MoveOperation, Tab, TabKind,
    TextDirection, TextOption, TextOptionFlags, DEFAULT_TAB_STOP,
};

#[cfg(test)]
mod proptests;
