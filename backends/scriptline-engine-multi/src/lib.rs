//! Multi engine - a primary font with fallbacks
//!
//! Characters go to the primary engine first. Whatever it maps to glyph 0
//! is offered to each fallback in order, and the first engine that knows
//! the character wins. The winning engine's position is stored in the high
//! byte of the glyph index, so later metric queries (and the layout
//! session's shaping split) can route each glyph back to its engine.

use std::sync::Arc;

use scriptline_core::{
    error::{Result, ShapingError},
    traits::{split_glyph_index, tag_glyph_index, ENGINE_INDEX_SHIFT},
    Fixed, FontEngine, GlyphLayoutMut, GlyphMetrics, ShaperFlags,
};

/// Highest number of members the glyph high byte can address.
pub const MAX_ENGINES: usize = 1 << (32 - ENGINE_INDEX_SHIFT);

/// Fallback chain of font engines.
pub struct MultiEngine {
    engines: Vec<Arc<dyn FontEngine>>,
    name: String,
}

impl MultiEngine {
    /// Build a chain from a primary engine and its fallbacks
    pub fn new(primary: Arc<dyn FontEngine>, fallbacks: Vec<Arc<dyn FontEngine>>) -> Result<Self> {
        let mut engines = Vec::with_capacity(fallbacks.len() + 1);
        engines.push(primary);
        engines.extend(fallbacks);
        if engines.len() > MAX_ENGINES {
            return Err(ShapingError::EngineFailure(format!(
                "{} engines exceed the limit of {}",
                engines.len(),
                MAX_ENGINES
            ))
            .into());
        }
        let name = engines.iter().map(|e| e.name()).collect::<Vec<_>>().join("+");
        log::debug!("fallback chain {} with {} members", name, engines.len());
        Ok(Self { engines, name })
    }

    pub fn engines(&self) -> &[Arc<dyn FontEngine>] {
        &self.engines
    }

    fn engine_for(&self, glyph: u32) -> (&Arc<dyn FontEngine>, u32) {
        let (index, local) = split_glyph_index(glyph);
        match self.engines.get(index) {
            Some(engine) => (engine, local),
            None => (&self.engines[0], local),
        }
    }

    /// Applies `f` to every maximal run of glyphs from the same member, with
    /// the member index stripped from the glyphs while `f` runs.
    fn for_each_engine_run(&self, glyphs: &mut GlyphLayoutMut<'_>, mut f: impl FnMut(&dyn FontEngine, &mut GlyphLayoutMut<'_>)) {
        let mut start = 0;
        while start < glyphs.len() {
            let (engine_index, _) = split_glyph_index(glyphs.glyphs[start]);
            let mut end = start + 1;
            while end < glyphs.len() && split_glyph_index(glyphs.glyphs[end]).0 == engine_index {
                end += 1;
            }
            let engine = self.engines.get(engine_index).unwrap_or(&self.engines[0]);
            let mut run = glyphs.mid(start, end - start);
            for glyph in run.glyphs.iter_mut() {
                *glyph = split_glyph_index(*glyph).1;
            }
            f(engine.as_ref(), &mut run);
            for glyph in run.glyphs.iter_mut() {
                *glyph = tag_glyph_index(engine_index, *glyph);
            }
            start = end;
        }
    }
}

impl FontEngine for MultiEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn string_to_cmap(&self, text: &[char], glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags) -> Result<usize> {
        let count = self.engines[0].string_to_cmap(text, glyphs, flags)?;

        for (i, &ch) in text.iter().enumerate().take(count) {
            if glyphs.glyphs[i] != 0 || ch == '\u{2028}' {
                continue;
            }
            let primary_advance_x = glyphs.advances_x[i];
            let primary_advance_y = glyphs.advances_y[i];
            for (x, engine) in self.engines.iter().enumerate().skip(1) {
                let mut slot = glyphs.mid(i, 1);
                slot.advances_x[0] = Fixed::ZERO;
                slot.advances_y[0] = Fixed::ZERO;
                slot.offsets[0] = Default::default();
                engine.string_to_cmap(&text[i..=i], &mut slot, flags)?;
                if slot.glyphs[0] != 0 {
                    slot.glyphs[0] = tag_glyph_index(x, slot.glyphs[0]);
                    break;
                }
            }
            if glyphs.glyphs[i] == 0 {
                // nobody has it: keep the primary engine's notdef metrics
                glyphs.advances_x[i] = primary_advance_x;
                glyphs.advances_y[i] = primary_advance_y;
            }
        }
        Ok(count)
    }

    fn recalc_advances(&self, glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags) {
        self.for_each_engine_run(glyphs, |engine, run| engine.recalc_advances(run, flags));
    }

    fn do_kerning(&self, glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags) {
        self.for_each_engine_run(glyphs, |engine, run| engine.do_kerning(run, flags));
    }

    fn ascent(&self) -> Fixed {
        self.engines[0].ascent()
    }

    fn descent(&self) -> Fixed {
        self.engines[0].descent()
    }

    fn leading(&self) -> Fixed {
        self.engines[0].leading()
    }

    fn glyph_metrics(&self, glyph: u32) -> GlyphMetrics {
        let (engine, local) = self.engine_for(glyph);
        engine.glyph_metrics(local)
    }

    fn glyph_tight_metrics(&self, glyph: u32) -> GlyphMetrics {
        let (engine, local) = self.engine_for(glyph);
        engine.glyph_tight_metrics(local)
    }

    fn can_render(&self, text: &[char]) -> bool {
        text.iter()
            .all(|ch| self.engines.iter().any(|engine| engine.can_render(std::slice::from_ref(ch))))
    }

    fn sub_engine_count(&self) -> usize {
        self.engines.len()
    }

    fn sub_engine(&self, index: usize) -> Option<Arc<dyn FontEngine>> {
        self.engines.get(index).cloned()
    }

    fn cache_cost(&self) -> usize {
        self.engines.iter().map(|e| e.cache_cost()).sum()
    }
}
