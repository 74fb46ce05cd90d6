//! Box engine - every glyph a square the size of the font
//!
//! The engine needs no font data: a character maps to a glyph whose index
//! is its code point, every glyph advances by the pixel size and draws a
//! `size x size` box sitting on the baseline. That makes it the fallback of
//! last resort and the reference engine for layout tests, where widths are
//! simple multiples of the size.

use std::collections::BTreeSet;

use scriptline_core::{
    error::{Result, ShapingError},
    Fixed, FontEngine, GlyphLayoutMut, GlyphMetrics, ShaperFlags,
};
use scriptline_unicode::mirrored;

/// Font engine drawing every glyph as a square box.
#[derive(Debug, Clone)]
pub struct BoxEngine {
    size: Fixed,
    missing: BTreeSet<char>,
}

impl BoxEngine {
    /// Create a box engine for `pixel_size`
    pub fn new(pixel_size: i32) -> Self {
        Self::with_size(Fixed::from_int(pixel_size))
    }

    pub fn with_size(size: Fixed) -> Self {
        Self {
            size,
            missing: BTreeSet::new(),
        }
    }

    /// Characters the engine pretends not to cover; they map to glyph 0
    /// and make [`FontEngine::can_render`] fail.
    pub fn with_missing(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.missing.extend(chars);
        self
    }

    pub fn size(&self) -> Fixed {
        self.size
    }

    fn glyph_for(&self, ch: char) -> u32 {
        if self.missing.contains(&ch) {
            log::trace!("box engine: no glyph for U+{:04X}", ch as u32);
            0
        } else {
            ch as u32
        }
    }
}

impl Default for BoxEngine {
    fn default() -> Self {
        Self::new(12)
    }
}

impl FontEngine for BoxEngine {
    fn name(&self) -> &str {
        "box"
    }

    fn string_to_cmap(&self, text: &[char], glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags) -> Result<usize> {
        if glyphs.len() < text.len() {
            return Err(ShapingError::BufferTooSmall { needed: text.len() }.into());
        }

        for (i, &ch) in text.iter().enumerate() {
            let ch = if flags.right_to_left { mirrored(ch) } else { ch };
            glyphs.glyphs[i] = self.glyph_for(ch);
        }
        if !flags.glyph_indices_only {
            let mut run = glyphs.mid(0, text.len());
            self.recalc_advances(&mut run, flags);
        }
        Ok(text.len())
    }

    fn recalc_advances(&self, glyphs: &mut GlyphLayoutMut<'_>, _flags: ShaperFlags) {
        glyphs.advances_x.fill(self.size);
        glyphs.advances_y.fill(Fixed::ZERO);
    }

    fn ascent(&self) -> Fixed {
        self.size
    }

    fn descent(&self) -> Fixed {
        Fixed::ZERO
    }

    fn leading(&self) -> Fixed {
        (self.size * 15 / 100).ceil()
    }

    fn glyph_metrics(&self, _glyph: u32) -> GlyphMetrics {
        GlyphMetrics::new(Fixed::ZERO, -self.size, self.size, self.size, self.size, Fixed::ZERO)
    }

    fn can_render(&self, text: &[char]) -> bool {
        text.iter().all(|ch| !self.missing.contains(ch))
    }

    fn cache_cost(&self) -> usize {
        std::mem::size_of::<Self>() + self.missing.len() * std::mem::size_of::<char>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptline_core::{GlyphBuffer, Script, ShapingRequest};

    #[test]
    fn maps_code_points_with_uniform_advances() {
        let engine = BoxEngine::new(10);
        let text: Vec<char> = "ab".chars().collect();
        let mut buffer = GlyphBuffer::with_len(2).unwrap();
        let mut layout = buffer.layout_mut(0, 2);
        let n = engine.string_to_cmap(&text, &mut layout, ShaperFlags::default()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(layout.glyphs[0], 'a' as u32);
        assert_eq!(layout.advances_x[1], Fixed::from_int(10));
    }

    #[test]
    fn too_small_buffer_reports_the_need() {
        let engine = BoxEngine::new(10);
        let text: Vec<char> = "abc".chars().collect();
        let mut buffer = GlyphBuffer::with_len(1).unwrap();
        let mut layout = buffer.layout_mut(0, 1);
        let err = engine
            .string_to_cmap(&text, &mut layout, ShaperFlags::default())
            .unwrap_err();
        assert_eq!(err.needed_glyphs(), Some(3));
    }

    #[test]
    fn rtl_runs_are_mirrored() {
        let engine = BoxEngine::new(10);
        let mut buffer = GlyphBuffer::with_len(1).unwrap();
        let mut layout = buffer.layout_mut(0, 1);
        engine.string_to_cmap(&['('], &mut layout, ShaperFlags::rtl()).unwrap();
        assert_eq!(layout.glyphs[0], ')' as u32);
    }

    #[test]
    fn missing_characters_map_to_notdef() {
        let engine = BoxEngine::new(10).with_missing(['\u{2026}']);
        assert!(!engine.can_render(&['\u{2026}']));
        assert!(engine.can_render(&['.']));
        let mut buffer = GlyphBuffer::with_len(1).unwrap();
        let mut layout = buffer.layout_mut(0, 1);
        engine.string_to_cmap(&['\u{2026}'], &mut layout, ShaperFlags::default()).unwrap();
        assert_eq!(layout.glyphs[0], 0);
    }

    #[test]
    fn metrics() {
        let engine = BoxEngine::new(20);
        assert_eq!(engine.ascent(), Fixed::from_int(20));
        assert_eq!(engine.descent(), Fixed::ZERO);
        assert_eq!(engine.leading(), Fixed::from_int(3));
        let bb = engine.glyph_metrics('x' as u32);
        assert_eq!(bb.y, Fixed::from_int(-20));
        assert_eq!(bb.xoff, Fixed::from_int(20));
    }

    #[test]
    fn default_shaping_and_run_bounding_box() {
        let engine = BoxEngine::new(10);
        let text: Vec<char> = "abc".chars().collect();
        let mut buffer = GlyphBuffer::with_len(3).unwrap();
        let mut clusters = vec![0; 3];
        {
            let mut layout = buffer.layout_mut(0, 3);
            let request = ShapingRequest::new(&text, Script::Latin, 0);
            let run = engine.shape(&request, &mut layout, &mut clusters).unwrap();
            assert_eq!(run.num_glyphs, 3);
            assert!(!run.kerning_applied);
        }
        assert_eq!(clusters, vec![0, 1, 2]);
        let layout = buffer.layout(0, 3);
        assert!(layout.attributes.iter().all(|a| a.cluster_start));
        let bb = engine.bounding_box(&layout);
        assert_eq!(bb.x, Fixed::ZERO);
        assert_eq!(bb.y, Fixed::from_int(-10));
        assert_eq!(bb.width, Fixed::from_int(30));
        assert_eq!(bb.height, Fixed::from_int(10));
        assert_eq!(bb.xoff, Fixed::from_int(30));
    }
}
