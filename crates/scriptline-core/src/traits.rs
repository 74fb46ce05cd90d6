//! The font-engine capability the layout session shapes through.
//!
//! A [`FontEngine`] maps characters to glyphs and answers metric
//! questions. Only character mapping and the per-glyph metrics are
//! required; shaping defaults to a one-glyph-per-character mapping with
//! heuristic glyph attributes, and the run-level bounding boxes aggregate
//! the per-glyph ones.
//!
//! Composite engines (fallback chains) expose their members through
//! [`FontEngine::sub_engine`] and tag every glyph index with the member's
//! position in the high byte, see [`ENGINE_INDEX_SHIFT`].

use std::sync::Arc;

use icu_properties::props::Script;

use crate::error::{Result, ShapingError};
use crate::fixed::Fixed;
use crate::glyph::{GlyphLayout, GlyphLayoutMut};
use crate::item::{GlyphMetrics, ShaperFlags};
use crate::shaping::heuristic_set_glyph_attributes;

/// Glyph indices of composite engines carry the member index in the bits
/// above this shift.
pub const ENGINE_INDEX_SHIFT: u32 = 24;

/// Mask for the glyph index proper, without the member index.
pub const GLYPH_INDEX_MASK: u32 = (1 << ENGINE_INDEX_SHIFT) - 1;

/// Splits a composite glyph index into `(engine, glyph)`.
pub fn split_glyph_index(glyph: u32) -> (usize, u32) {
    ((glyph >> ENGINE_INDEX_SHIFT) as usize, glyph & GLYPH_INDEX_MASK)
}

/// Tags `glyph` with the member index `engine`.
pub fn tag_glyph_index(engine: usize, glyph: u32) -> u32 {
    ((engine as u32) << ENGINE_INDEX_SHIFT) | (glyph & GLYPH_INDEX_MASK)
}

/// One item's worth of text handed to [`FontEngine::shape`].
#[derive(Debug, Clone, Copy)]
pub struct ShapingRequest<'a> {
    pub text: &'a [char],
    pub script: Script,
    pub bidi_level: u8,
    pub flags: ShaperFlags,
    /// Pair kerning is wanted.
    pub kerning: bool,
}

impl<'a> ShapingRequest<'a> {
    pub fn new(text: &'a [char], script: Script, bidi_level: u8) -> Self {
        Self {
            text,
            script,
            bidi_level,
            flags: ShaperFlags {
                right_to_left: bidi_level % 2 == 1,
                ..ShaperFlags::default()
            },
            kerning: false,
        }
    }
}

/// What an engine produced for a [`ShapingRequest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapedRun {
    pub num_glyphs: usize,
    /// Kerning was already applied; the session must not kern again.
    pub kerning_applied: bool,
}

/// Character-to-glyph mapping and metrics for one font at one size.
pub trait FontEngine: Send + Sync {
    /// Identify yourself in logs
    fn name(&self) -> &str;

    /// Maps `text` to glyphs, one glyph per character, and fills the
    /// advances unless [`ShaperFlags::glyph_indices_only`] is set.
    ///
    /// Characters are mirrored first when the run is right-to-left. Fails
    /// with [`ShapingError::BufferTooSmall`] when `glyphs` holds fewer
    /// slots than `text` has characters. Returns the glyph count.
    fn string_to_cmap(&self, text: &[char], glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags) -> Result<usize>;

    /// Recomputes the advances of glyphs already in `glyphs`.
    fn recalc_advances(&self, glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags);

    /// Adjusts advances for pair kerning. No-op by default.
    fn do_kerning(&self, _glyphs: &mut GlyphLayoutMut<'_>, _flags: ShaperFlags) {}

    fn ascent(&self) -> Fixed;

    fn descent(&self) -> Fixed;

    fn leading(&self) -> Fixed;

    /// Logical box of a single glyph; `xoff` is its advance.
    fn glyph_metrics(&self, glyph: u32) -> GlyphMetrics;

    /// Ink box of a single glyph. Defaults to [`FontEngine::glyph_metrics`].
    fn glyph_tight_metrics(&self, glyph: u32) -> GlyphMetrics {
        self.glyph_metrics(glyph)
    }

    /// Whether every character of `text` maps to a real glyph.
    fn can_render(&self, text: &[char]) -> bool;

    /// Shapes one item.
    ///
    /// The default maps characters through [`FontEngine::string_to_cmap`],
    /// assigns one log cluster per character and derives cluster, mark and
    /// justification attributes heuristically from character properties.
    fn shape(
        &self,
        request: &ShapingRequest<'_>,
        glyphs: &mut GlyphLayoutMut<'_>,
        log_clusters: &mut [usize],
    ) -> Result<ShapedRun> {
        shape_with_cmap(self, request, glyphs, log_clusters)
    }

    /// Logical box of a glyph run, pen positions following the run's
    /// advances (justification included).
    fn bounding_box(&self, glyphs: &GlyphLayout<'_>) -> GlyphMetrics {
        aggregate_bounding_box(glyphs, |glyph| self.glyph_metrics(glyph))
    }

    /// Ink box of a glyph run.
    fn tight_bounding_box(&self, glyphs: &GlyphLayout<'_>) -> GlyphMetrics {
        aggregate_bounding_box(glyphs, |glyph| self.glyph_tight_metrics(glyph))
    }

    /// Members of a composite engine; zero for plain engines.
    fn sub_engine_count(&self) -> usize {
        0
    }

    fn sub_engine(&self, _index: usize) -> Option<Arc<dyn FontEngine>> {
        None
    }

    /// Approximate memory held by the engine, in bytes.
    fn cache_cost(&self) -> usize {
        0
    }
}

/// One glyph per character through [`FontEngine::string_to_cmap`], one log
/// cluster per character, heuristic attributes. What [`FontEngine::shape`]
/// does unless an engine brings its own shaper.
pub fn shape_with_cmap<E: FontEngine + ?Sized>(
    engine: &E,
    request: &ShapingRequest<'_>,
    glyphs: &mut GlyphLayoutMut<'_>,
    log_clusters: &mut [usize],
) -> Result<ShapedRun> {
    if log_clusters.len() < request.text.len() {
        return Err(ShapingError::EngineFailure(format!(
            "{} log cluster slots for {} characters",
            log_clusters.len(),
            request.text.len()
        ))
        .into());
    }
    let num_glyphs = engine.string_to_cmap(request.text, glyphs, request.flags)?;
    for (i, cluster) in log_clusters.iter_mut().take(request.text.len()).enumerate() {
        *cluster = i;
    }
    let mut shaped = glyphs.mid(0, num_glyphs);
    heuristic_set_glyph_attributes(request.text, &mut shaped, log_clusters, request.script);
    Ok(ShapedRun {
        num_glyphs,
        kerning_applied: false,
    })
}

/// Unions per-glyph boxes placed at successive pen positions.
pub fn aggregate_bounding_box(glyphs: &GlyphLayout<'_>, metrics: impl Fn(u32) -> GlyphMetrics) -> GlyphMetrics {
    let mut overall = GlyphMetrics::default();
    if glyphs.is_empty() {
        return overall;
    }

    let mut min_x: Option<Fixed> = None;
    let mut min_y: Option<Fixed> = None;
    let mut max_x = Fixed::ZERO;
    let mut max_y = Fixed::ZERO;
    for i in 0..glyphs.len() {
        let bb = metrics(glyphs.glyphs[i]);
        let x = overall.xoff + glyphs.offsets[i].x + bb.x;
        let y = overall.yoff + glyphs.offsets[i].y + bb.y;
        min_x = Some(min_x.map_or(x, |m| m.min(x)));
        min_y = Some(min_y.map_or(y, |m| m.min(y)));
        max_x = max_x.max(x + bb.width);
        max_y = max_y.max(y + bb.height);
        overall.xoff += glyphs.effective_advance(i);
        overall.yoff += glyphs.advances_y[i];
    }
    overall.x = min_x.unwrap_or_default();
    overall.y = min_y.unwrap_or_default();
    overall.width = max_x - overall.x;
    overall.height = max_y - overall.y;
    overall
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_index_tagging_round_trips() {
        let tagged = tag_glyph_index(3, 0x1234);
        assert_eq!(tagged >> ENGINE_INDEX_SHIFT, 3);
        assert_eq!(split_glyph_index(tagged), (3, 0x1234));
        assert_eq!(split_glyph_index(0x41), (0, 0x41));
    }

    #[test]
    fn rtl_requests_set_the_shaper_flag() {
        let text = ['a'];
        assert!(ShapingRequest::new(&text, Script::Latin, 1).flags.right_to_left);
        assert!(!ShapingRequest::new(&text, Script::Latin, 2).flags.right_to_left);
    }
}
