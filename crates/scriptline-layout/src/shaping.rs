//! Turning items into glyphs.
//!
//! Items are shaped lazily and at most once. Composite engines are split:
//! the whole item is mapped through the composite cmap first, then every
//! run of characters served by the same member is shaped by that member
//! and its glyphs re-tagged with the member index.

use std::sync::Arc;

use scriptline_core::traits::{split_glyph_index, tag_glyph_index};
use scriptline_core::{AnalysisFlags, Fixed, FontEngine, JustificationClass, ShapedRun, ShaperFlags, ShapingRequest};

use crate::engine::TextEngine;
use crate::options::LetterSpacing;

/// A run of an item's characters served by one engine.
struct EngineRun {
    start: usize,
    end: usize,
    /// Member index for composite engines.
    member: Option<usize>,
}

/// Maps a character through a case transform, keeping it when the mapping
/// is not a single character.
fn map_case(ch: char, flags: AnalysisFlags) -> char {
    fn single(mut mapped: impl Iterator<Item = char>) -> Option<char> {
        let first = mapped.next()?;
        mapped.next().is_none().then_some(first)
    }
    let mapped = match flags {
        AnalysisFlags::Lowercase => single(ch.to_lowercase()),
        AnalysisFlags::Uppercase | AnalysisFlags::SmallCaps => single(ch.to_uppercase()),
        _ => None,
    };
    mapped.unwrap_or(ch)
}

impl TextEngine {
    /// Shapes item `item` unless it already is. Tab items only pick up
    /// the line metrics of their engine; object items get a glyph slot.
    pub fn shape(&mut self, item: usize) {
        self.itemize();
        if self.layout.is_failed() || item >= self.layout.items.len() {
            return;
        }
        match self.layout.items[item].analysis.flags {
            AnalysisFlags::Object => {
                self.layout.ensure_space(1);
            },
            AnalysisFlags::Tab => {
                if let Some(engine) = self.engine_for_item(item) {
                    let si = &mut self.layout.items[item];
                    si.ascent = engine.ascent();
                    si.descent = engine.descent();
                    si.leading = engine.leading();
                }
            },
            _ => self.shape_text(item),
        }
    }

    fn shape_text(&mut self, item: usize) {
        let si = self.layout.items[item];
        if si.num_glyphs != 0 {
            return;
        }
        let Some(engine) = self.engine_for_item(item) else {
            return;
        };
        let length = self.layout.item_length(item);
        if length == 0 {
            return;
        }

        let font = self.font_for_position(si.position);
        let letter_spacing = font.letter_spacing;
        let word_spacing = font.word_spacing;
        let kerning = font.kerning;

        let source = &self.layout.string[si.position..si.position + length];
        let text: Vec<char> = if si.analysis.flags.is_case_transform() {
            source.iter().map(|&ch| map_case(ch, si.analysis.flags)).collect()
        } else {
            source.to_vec()
        };

        let flags = ShaperFlags {
            right_to_left: si.analysis.is_right_to_left(),
            glyph_indices_only: false,
            design_metrics: self.option.flags.design_metrics,
        };

        {
            let si = &mut self.layout.items[item];
            si.glyph_data_offset = self.layout.used;
            si.ascent = engine.ascent();
            si.descent = engine.descent();
            si.leading = engine.leading();
        }

        let Some(runs) = self.engine_runs(engine.as_ref(), &text, flags) else {
            return;
        };

        let mut glyph_pos = 0usize;
        for run in runs {
            let member: Arc<dyn FontEngine> = match run.member {
                Some(index) => engine.sub_engine(index).unwrap_or_else(|| engine.clone()),
                None => engine.clone(),
            };
            {
                let si = &mut self.layout.items[item];
                si.ascent = si.ascent.max(member.ascent());
                si.descent = si.descent.max(member.descent());
                si.leading = si.leading.max(member.leading());
            }

            let request = ShapingRequest {
                text: &text[run.start..run.end],
                script: si.analysis.script,
                bidi_level: si.analysis.bidi_level,
                flags,
                kerning,
            };
            let Some(shaped) = self.shape_run(member.as_ref(), &request, glyph_pos, si.position + run.start) else {
                return;
            };

            let start = self.layout.used + glyph_pos;
            let mut glyphs = self.layout.glyphs.layout_mut(start, shaped.num_glyphs);
            if kerning && !shaped.kerning_applied {
                member.do_kerning(&mut glyphs, flags);
            }
            if let Some(index) = run.member {
                for glyph in glyphs.glyphs.iter_mut() {
                    *glyph = tag_glyph_index(index, *glyph);
                }
            }
            let clusters = &mut self.layout.log_clusters[si.position + run.start..si.position + run.end];
            for cluster in clusters {
                *cluster += glyph_pos;
            }
            glyph_pos += shaped.num_glyphs;
        }

        self.layout.items[item].num_glyphs = glyph_pos;
        self.layout.used += glyph_pos;
        self.apply_spacing(item, letter_spacing, word_spacing);

        let glyphs = self.layout.shaped_glyphs(item);
        let width: Fixed = (0..glyphs.len())
            .filter(|&i| !glyphs.attributes[i].dont_print)
            .map(|i| glyphs.advances_x[i])
            .sum();
        self.layout.items[item].width = width;

        log::debug!(
            "shaped item {} ({:?}, level {}): {} chars -> {} glyphs, width {}",
            item,
            si.analysis.script,
            si.analysis.bidi_level,
            length,
            glyph_pos,
            width
        );
    }

    /// Splits `text` at member changes of a composite engine. Plain
    /// engines get one run covering everything.
    fn engine_runs(&mut self, engine: &dyn FontEngine, text: &[char], flags: ShaperFlags) -> Option<Vec<EngineRun>> {
        if engine.sub_engine_count() == 0 {
            return Some(vec![EngineRun {
                start: 0,
                end: text.len(),
                member: None,
            }]);
        }

        if !self.layout.ensure_space(text.len()) {
            return None;
        }
        let cmap_flags = ShaperFlags {
            glyph_indices_only: true,
            ..flags
        };
        let used = self.layout.used;
        let available = self.layout.glyphs.len() - used;
        let mut glyphs = self.layout.glyphs.layout_mut(used, available);
        let count = match engine.string_to_cmap(text, &mut glyphs, cmap_flags) {
            Ok(count) => count.min(text.len()),
            Err(err) => {
                log::warn!("{}: character mapping failed: {}", engine.name(), err);
                return None;
            },
        };

        let mut runs = Vec::new();
        let mut start = 0;
        let mut current = split_glyph_index(glyphs.glyphs.first().copied().unwrap_or(0)).0;
        for i in 1..count {
            let member = split_glyph_index(glyphs.glyphs[i]).0;
            if member != current {
                runs.push(EngineRun {
                    start,
                    end: i,
                    member: Some(current),
                });
                start = i;
                current = member;
            }
        }
        runs.push(EngineRun {
            start,
            end: text.len(),
            member: Some(current),
        });
        Some(runs)
    }

    /// Shapes one run at `glyph_pos` past the used glyphs, growing the
    /// buffer and retrying once when the engine asks for more room.
    fn shape_run(
        &mut self,
        engine: &dyn FontEngine,
        request: &ShapingRequest<'_>,
        glyph_pos: usize,
        first_char: usize,
    ) -> Option<ShapedRun> {
        let length = request.text.len();
        let mut needed = glyph_pos + length;
        for attempt in 0..2 {
            if !self.layout.ensure_space(needed) {
                return None;
            }
            let start = self.layout.used + glyph_pos;
            let available = self.layout.glyphs.len() - start;
            let mut glyphs = self.layout.glyphs.layout_mut(start, available);
            glyphs.mid(0, length).clear_from(0);
            let clusters = &mut self.layout.log_clusters[first_char..first_char + length];

            match engine.shape(request, &mut glyphs, clusters) {
                Ok(run) => return Some(run),
                Err(err) => match err.needed_glyphs() {
                    Some(more) if attempt == 0 => {
                        log::debug!("{}: growing glyph buffer to {} glyphs", engine.name(), more);
                        needed = glyph_pos + more;
                    },
                    _ => {
                        log::warn!("{}: shaping {} characters failed: {}", engine.name(), length, err);
                        return None;
                    },
                },
            }
        }
        log::warn!("{}: glyph buffer still too small after growing", engine.name());
        None
    }

    fn apply_spacing(&mut self, item: usize, letter_spacing: LetterSpacing, word_spacing: Fixed) {
        let si = self.layout.items[item];
        let n = si.num_glyphs;
        if n == 0 {
            return;
        }
        let glyphs = self.layout.glyphs.layout_mut(si.glyph_data_offset, n);

        if !letter_spacing.is_neutral() {
            let hundred = Fixed::from_int(100);
            let spaced = |advance: Fixed| match letter_spacing {
                LetterSpacing::Absolute(value) => advance + value,
                LetterSpacing::Percentage(percent) => advance + (percent - hundred) * advance / 100,
            };
            for i in 1..n {
                if glyphs.attributes[i].cluster_start {
                    glyphs.advances_x[i - 1] = spaced(glyphs.advances_x[i - 1]);
                }
            }
            glyphs.advances_x[n - 1] = spaced(glyphs.advances_x[n - 1]);
        }

        if !word_spacing.is_zero() {
            let is_space = |class: JustificationClass| {
                matches!(class, JustificationClass::Space | JustificationClass::ArabicSpace)
            };
            for i in 0..n {
                // once per run of spaces
                if is_space(glyphs.attributes[i].justification)
                    && (i + 1 == n || !is_space(glyphs.attributes[i + 1].justification))
                {
                    glyphs.advances_x[i] += word_spacing;
                }
            }
        }
    }
}
