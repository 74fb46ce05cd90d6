//! scriptline - paragraph layout for complex scripts
//!
//! One [`TextEngine`] lays out one paragraph: it splits the text into
//! script items by bidi level, script and special characters, shapes each
//! item through a [`FontEngine`], and answers measurement, justification,
//! cursor and elision queries over the result.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "engine-box")]
//! # {
//! use std::sync::Arc;
//! use scriptline::prelude::*;
//! use scriptline::engine_box::BoxEngine;
//!
//! let font = Font::new(Arc::new(BoxEngine::new(10)));
//! let mut engine = TextEngine::new("ab \u{05d0}\u{05d1}", font);
//! assert!(engine.has_bidi());
//! assert_eq!(engine.width(0, 5), Fixed::from_int(50));
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `engine-box`: square-glyph engine needing no font data (default)
//! - `engine-multi`: fallback chains over several engines (default)
//! - `engine-sfnt`: OpenType fonts, shaped with harfrust
//! - `full`: all engines

pub use scriptline_core::{error, traits, Fixed, FontEngine, Result};
pub use scriptline_layout::{LineItem, ScriptLine, TextEngine};

pub use scriptline_layout as layout;
pub use scriptline_unicode as unicode;

#[cfg(feature = "engine-box")]
pub use scriptline_engine_box as engine_box;

#[cfg(feature = "engine-multi")]
pub use scriptline_engine_multi as engine_multi;

#[cfg(feature = "engine-sfnt")]
pub use scriptline_engine_sfnt as engine_sfnt;

/// Common imports for typical usage
pub mod prelude {
    pub use scriptline_core::{
        error::{LayoutError, Result},
        Fixed, FontCache, FontEngine, FontKey, GlyphMetrics, Script,
    };
    pub use scriptline_layout::{
        Alignment, Capitalization, CharFormat, ElideMode, Font, FormatRange, LetterSpacing, LineItem, MoveOperation,
        ScriptLine, Tab, TabKind, TextDirection, TextEngine, TextOption, TextOptionFlags,
    };
}
