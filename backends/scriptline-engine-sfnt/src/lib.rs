//! OpenType engine: real font files behind the `FontEngine` trait
//!
//! Font tables are read with `read-fonts` (cmap, hmtx, head, OS/2, hhea),
//! scaled ink bounds come from `skrifa`, and when shaping is enabled whole
//! items go through `harfrust`, so ligatures, marks and kerning come out the
//! way the font intends. Without the shaper the engine falls back to one
//! glyph per character with heuristic attributes.
//!
//! The engine owns the font bytes and parses table views on demand, which
//! keeps it `Send + Sync` without self-referencing structs.

use std::fs;
use std::path::Path;

use harfrust::{
    Direction as HrDirection, Feature, FontRef as HrFontRef, Script as HrScript, ShaperData, Tag, UnicodeBuffer,
};
use read_fonts::{types::GlyphId, FontRef as ReadFontRef, TableProvider};
use skrifa::instance::{LocationRef, Size};
use skrifa::MetadataProvider;

use scriptline_core::{
    error::{FontLoadError, Result, ShapingError},
    shaping::arabic_justification_class,
    traits::shape_with_cmap,
    Fixed, FixedPoint, FontEngine, GlyphAttributes, GlyphJustification, GlyphLayoutMut, GlyphMetrics,
    JustificationClass, Script, ShapedRun, ShaperFlags, ShapingRequest,
};
use scriptline_unicode::{mirrored, props};

/// Units per em assumed when the `head` table is unreadable.
const FALLBACK_UNITS_PER_EM: u16 = 1000;

/// The harfrust script for an item; `None` leaves it to the buffer's guess.
fn hr_script(script: Script) -> Option<HrScript> {
    let tag = props::iso15924_tag(script)?;
    HrScript::from_iso15924_tag(Tag::new(&tag))
}

/// Font engine for one face of an OpenType/TrueType file at one pixel size.
pub struct SfntEngine {
    data: Vec<u8>,
    face_index: u32,
    size: Fixed,
    units_per_em: u16,
    ascent: Fixed,
    descent: Fixed,
    leading: Fixed,
    use_shaper: bool,
    name: String,
}

impl SfntEngine {
    /// Opens a font file from disk
    pub fn from_file(path: impl AsRef<Path>, pixel_size: Fixed) -> Result<Self> {
        let data = fs::read(path.as_ref())
            .map_err(|_| FontLoadError::FileNotFound(path.as_ref().display().to_string()))?;
        Self::from_data(data, 0, pixel_size)
    }

    /// Wraps font bytes; `face_index` selects the face of a collection.
    pub fn from_data(data: Vec<u8>, face_index: u32, pixel_size: Fixed) -> Result<Self> {
        let font = ReadFontRef::from_index(&data, face_index).map_err(|_| FontLoadError::InvalidData)?;

        let units_per_em = font
            .head()
            .map(|head| head.units_per_em())
            .ok()
            .filter(|&upem| upem != 0)
            .unwrap_or(FALLBACK_UNITS_PER_EM);

        let (ascent, descent, line_gap) = font
            .os2()
            .ok()
            .map(|os2| (os2.s_typo_ascender(), os2.s_typo_descender(), os2.s_typo_line_gap()))
            .or_else(|| {
                font.hhea()
                    .ok()
                    .map(|hhea| (hhea.ascender().to_i16(), hhea.descender().to_i16(), hhea.line_gap().to_i16()))
            })
            .unwrap_or_else(|| {
                let upem = units_per_em as i32;
                ((upem * 4 / 5) as i16, -((upem / 5) as i16), 0)
            });

        let mut engine = Self {
            data,
            face_index,
            size: pixel_size,
            units_per_em,
            ascent: Fixed::ZERO,
            descent: Fixed::ZERO,
            leading: Fixed::ZERO,
            use_shaper: true,
            name: format!("sfnt#{}", face_index),
        };
        engine.ascent = engine.scale(i32::from(ascent));
        engine.descent = engine.scale(-i32::from(descent));
        engine.leading = engine.scale(i32::from(line_gap)).max(Fixed::ZERO);
        log::debug!(
            "loaded face {} ({} bytes, {} upem) at {}px",
            face_index,
            engine.data.len(),
            units_per_em,
            pixel_size
        );
        Ok(engine)
    }

    /// Turns the harfrust shaper off; items are then mapped one glyph per
    /// character through the cmap.
    pub fn without_shaper(mut self) -> Self {
        self.use_shaper = false;
        self
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn pixel_size(&self) -> Fixed {
        self.size
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn glyph_count(&self) -> Option<u32> {
        self.font_ref()
            .and_then(|font| font.maxp().ok().map(|maxp| u32::from(maxp.num_glyphs())))
    }

    fn font_ref(&self) -> Option<ReadFontRef<'_>> {
        ReadFontRef::from_index(&self.data, self.face_index).ok()
    }

    /// Font units to pixels at the engine's size, rounded to the nearest
    /// 1/64.
    fn scale(&self, units: i32) -> Fixed {
        let upem = i64::from(self.units_per_em);
        let scaled = i64::from(units) * i64::from(self.size.raw());
        let rounded = if scaled >= 0 {
            (scaled + upem / 2) / upem
        } else {
            (scaled - upem / 2) / upem
        };
        Fixed::from_raw(rounded as i32)
    }

    fn glyph_id(&self, ch: char) -> u32 {
        self.font_ref()
            .and_then(|font| font.cmap().ok()?.map_codepoint(ch).map(|gid| gid.to_u32()))
            .unwrap_or(0)
    }

    fn advance(&self, glyph: u32) -> Fixed {
        let units = self
            .font_ref()
            .and_then(|font| font.hmtx().ok()?.advance(GlyphId::new(glyph)))
            .unwrap_or(0);
        self.scale(i32::from(units))
    }

    fn shape_with_harfrust(
        &self,
        request: &ShapingRequest<'_>,
        glyphs: &mut GlyphLayoutMut<'_>,
        log_clusters: &mut [usize],
    ) -> Result<ShapedRun> {
        let text = request.text;
        if log_clusters.len() < text.len() {
            return Err(ShapingError::EngineFailure(format!(
                "{} log cluster slots for {} characters",
                log_clusters.len(),
                text.len()
            ))
            .into());
        }

        let font = HrFontRef::new(&self.data).map_err(|_| FontLoadError::InvalidData)?;
        let shaper_data = ShaperData::new(&font);
        let shaper = shaper_data
            .shaper(&font)
            .point_size(Some(self.size.to_f32()))
            .build();

        let string: String = text.iter().collect();
        // byte offset of every character, for mapping clusters back
        let char_starts: Vec<usize> = string.char_indices().map(|(byte, _)| byte).collect();

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(&string);
        buffer.set_direction(if request.flags.right_to_left {
            HrDirection::RightToLeft
        } else {
            HrDirection::LeftToRight
        });
        if let Some(script) = hr_script(request.script) {
            buffer.set_script(script);
        }

        let features = [Feature {
            tag: Tag::new(b"kern"),
            value: u32::from(request.kerning),
            start: 0,
            end: u32::MAX,
        }];
        let output = shaper.shape(buffer, &features);

        let infos = output.glyph_infos();
        let positions = output.glyph_positions();
        let num_glyphs = infos.len();
        if num_glyphs > glyphs.len() {
            return Err(ShapingError::BufferTooSmall { needed: num_glyphs }.into());
        }

        // harfrust hands right-to-left runs back in visual order
        let mut order: Vec<usize> = (0..num_glyphs).collect();
        if request.flags.right_to_left {
            order.reverse();
        }

        let char_of = |cluster: u32| -> usize {
            char_starts
                .partition_point(|&byte| byte <= cluster as usize)
                .saturating_sub(1)
        };

        let mut first_glyph_of_char = vec![usize::MAX; text.len()];
        let mut previous_char = None;
        for (g, &source) in order.iter().enumerate() {
            let info = &infos[source];
            let pos = &positions[source];
            let ch_index = char_of(info.cluster).min(text.len().saturating_sub(1));
            let ch = text[ch_index];
            let cluster_start = previous_char != Some(ch_index);
            previous_char = Some(ch_index);
            if first_glyph_of_char[ch_index] == usize::MAX {
                first_glyph_of_char[ch_index] = g;
            }

            glyphs.glyphs[g] = info.glyph_id;
            glyphs.advances_x[g] = self.scale(pos.x_advance);
            glyphs.advances_y[g] = self.scale(pos.y_advance);
            glyphs.offsets[g] = FixedPoint::new(self.scale(pos.x_offset), -self.scale(pos.y_offset));
            glyphs.justifications[g] = GlyphJustification::default();

            let justification = if !cluster_start {
                JustificationClass::None
            } else if request.script == Script::Arabic {
                arabic_justification_class(ch)
            } else if props::is_space_separator(ch) {
                JustificationClass::Space
            } else {
                JustificationClass::Character
            };
            glyphs.attributes[g] = GlyphAttributes {
                cluster_start,
                mark: !cluster_start && pos.x_advance == 0,
                justification,
                dont_print: ch == props::SOFT_HYPHEN || props::is_control(ch),
            };
        }

        // characters without a glyph of their own belong to the cluster before
        let mut last = 0;
        for (slot, first) in log_clusters.iter_mut().zip(first_glyph_of_char) {
            if first != usize::MAX {
                last = first;
            }
            *slot = last;
        }

        Ok(ShapedRun {
            num_glyphs,
            kerning_applied: true,
        })
    }
}

impl std::fmt::Debug for SfntEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SfntEngine")
            .field("face_index", &self.face_index)
            .field("size", &self.size)
            .field("units_per_em", &self.units_per_em)
            .field("use_shaper", &self.use_shaper)
            .finish()
    }
}

impl FontEngine for SfntEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn string_to_cmap(&self, text: &[char], glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags) -> Result<usize> {
        if glyphs.len() < text.len() {
            return Err(ShapingError::BufferTooSmall { needed: text.len() }.into());
        }

        for (i, &ch) in text.iter().enumerate() {
            let ch = if flags.right_to_left { mirrored(ch) } else { ch };
            glyphs.glyphs[i] = self.glyph_id(ch);
        }
        if !flags.glyph_indices_only {
            let mut run = glyphs.mid(0, text.len());
            self.recalc_advances(&mut run, flags);
        }
        Ok(text.len())
    }

    fn recalc_advances(&self, glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags) {
        for i in 0..glyphs.len() {
            let advance = self.advance(glyphs.glyphs[i]);
            glyphs.advances_x[i] = if flags.design_metrics { advance } else { advance.round() };
            glyphs.advances_y[i] = Fixed::ZERO;
        }
    }

    fn ascent(&self) -> Fixed {
        self.ascent
    }

    fn descent(&self) -> Fixed {
        self.descent
    }

    fn leading(&self) -> Fixed {
        self.leading
    }

    fn glyph_metrics(&self, glyph: u32) -> GlyphMetrics {
        let advance = self.advance(glyph);
        GlyphMetrics::new(
            Fixed::ZERO,
            -self.ascent,
            advance,
            self.ascent + self.descent,
            advance,
            Fixed::ZERO,
        )
    }

    fn glyph_tight_metrics(&self, glyph: u32) -> GlyphMetrics {
        let Ok(font) = skrifa::FontRef::from_index(&self.data, self.face_index) else {
            return GlyphMetrics::default();
        };
        let metrics = font.glyph_metrics(Size::new(self.size.to_f32()), LocationRef::default());
        let gid = skrifa::GlyphId::new(glyph);
        let advance = Fixed::from_f32(metrics.advance_width(gid).unwrap_or(0.0));
        match metrics.bounds(gid) {
            Some(bounds) => GlyphMetrics::new(
                Fixed::from_f32(bounds.x_min),
                Fixed::from_f32(-bounds.y_max),
                Fixed::from_f32(bounds.x_max - bounds.x_min),
                Fixed::from_f32(bounds.y_max - bounds.y_min),
                advance,
                Fixed::ZERO,
            ),
            // empty glyph, e.g. space
            None => GlyphMetrics::new(Fixed::ZERO, Fixed::ZERO, Fixed::ZERO, Fixed::ZERO, advance, Fixed::ZERO),
        }
    }

    fn can_render(&self, text: &[char]) -> bool {
        text.iter().all(|&ch| self.glyph_id(ch) != 0)
    }

    fn shape(
        &self,
        request: &ShapingRequest<'_>,
        glyphs: &mut GlyphLayoutMut<'_>,
        log_clusters: &mut [usize],
    ) -> Result<ShapedRun> {
        // harfrust is only handed plain fonts; faces of a collection use the cmap
        if !self.use_shaper || self.face_index != 0 || request.text.is_empty() {
            return shape_with_cmap(self, request, glyphs, log_clusters);
        }
        self.shape_with_harfrust(request, glyphs, log_clusters)
    }

    fn cache_cost(&self) -> usize {
        self.data.len()
    }
}
