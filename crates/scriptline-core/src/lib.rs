//! scriptline core: the data model every layout stage shares
//!
//! Text comes in as characters and leaves as positioned glyphs. Between the
//! two sits a small set of types this crate owns:
//!
//! 1. **[`Fixed`]** - 26.6 fixed-point, the unit of every advance and width
//! 2. **[`ScriptAnalysis`] / [`ScriptItem`]** - what the itemizer decides
//!    about each run of characters
//! 3. **[`GlyphBuffer`]** - one struct-of-arrays arena holding the glyphs of
//!    every item
//! 4. **[`FontEngine`]** - the capability that turns characters into glyphs
//!    and answers metric questions
//! 5. **[`FontCache`]** - engines shared between sessions, with cost-based
//!    decay
//!
//! ## A font engine in a few lines
//!
//! ```rust
//! use scriptline_core::{Fixed, FontEngine, GlyphLayoutMut, GlyphMetrics, Result, ShaperFlags};
//! use scriptline_core::error::ShapingError;
//!
//! struct Monospace;
//!
//! impl FontEngine for Monospace {
//!     fn name(&self) -> &str { "monospace" }
//!
//!     fn string_to_cmap(&self, text: &[char], glyphs: &mut GlyphLayoutMut<'_>, _: ShaperFlags) -> Result<usize> {
//!         if glyphs.len() < text.len() {
//!             return Err(ShapingError::BufferTooSmall { needed: text.len() }.into());
//!         }
//!         for (i, &ch) in text.iter().enumerate() {
//!             glyphs.glyphs[i] = ch as u32;
//!             glyphs.advances_x[i] = Fixed::from_int(8);
//!         }
//!         Ok(text.len())
//!     }
//!
//!     fn recalc_advances(&self, glyphs: &mut GlyphLayoutMut<'_>, _: ShaperFlags) {
//!         glyphs.advances_x.fill(Fixed::from_int(8));
//!     }
//!
//!     fn ascent(&self) -> Fixed { Fixed::from_int(12) }
//!     fn descent(&self) -> Fixed { Fixed::from_int(4) }
//!     fn leading(&self) -> Fixed { Fixed::ZERO }
//!
//!     fn glyph_metrics(&self, _glyph: u32) -> GlyphMetrics {
//!         GlyphMetrics::new(Fixed::ZERO, Fixed::from_int(-12), Fixed::from_int(8), Fixed::from_int(16), Fixed::from_int(8), Fixed::ZERO)
//!     }
//!
//!     fn can_render(&self, _text: &[char]) -> bool { true }
//! }
//! ```

pub mod config;
pub mod error;
pub mod fixed;
pub mod font_cache;
pub mod glyph;
pub mod item;
pub mod shaping;
pub mod traits;

pub use config::FontCacheConfig;
pub use error::{FontLoadError, LayoutError, Result, ShapingError};
pub use fixed::{Fixed, FixedPoint};
pub use font_cache::{Clock, FontCache, FontKey, ManualClock, SharedFontCache, SystemClock};
pub use glyph::{
    GlyphAttributes, GlyphBuffer, GlyphJustification, GlyphLayout, GlyphLayoutMut, JustificationClass,
    JustificationKind,
};
pub use icu_properties::props::Script;
pub use item::{AnalysisFlags, GlyphMetrics, ScriptAnalysis, ScriptItem, ShaperFlags};
pub use traits::{FontEngine, ShapedRun, ShapingRequest};

#[cfg(test)]
mod proptests;
