// this_file: crates/scriptline-unicode/src/lib.rs

//! Unicode services for the layout engine.
//!
//! Everything here works on `&[char]` so that character indices line up
//! with the indices the layout session stores:
//!
//! - [`props`]: bidi category, script, joining type and general category
//!   lookups on ICU compiled data
//! - [`bidi`]: embedding-level resolution and visual reordering
//! - [`segment`]: grapheme stops, word boundaries and the
//!   [`WordBoundaryFinder`] seam
//! - [`mirror`]: mirrored glyph substitution for right-to-left runs

pub mod bidi;
pub mod mirror;
pub mod props;
pub mod segment;

pub use bidi::{bidi_itemize, first_strong_is_rtl, reorder_levels, BidiControl, MAX_BIDI_LEVEL};
pub use icu_properties::props::{GeneralCategory, Script};
pub use mirror::mirrored;
pub use props::{bidi_category, BidiCategory, Joining};
pub use segment::{char_attributes, CharAttributes, IcuWordBoundaryFinder, WordBoundaryFinder};

/// First code point that can carry right-to-left or complex-script
/// behaviour. Text entirely below it resolves to level 0 in a
/// left-to-right paragraph.
pub const FIRST_COMPLEX_CODE_POINT: char = '\u{0590}';

/// True when every character is below [`FIRST_COMPLEX_CODE_POINT`].
pub fn is_simple_ltr(text: &[char]) -> bool {
    text.iter().all(|&ch| ch < FIRST_COMPLEX_CODE_POINT)
}


#[cfg(test)]
mod proptests;
