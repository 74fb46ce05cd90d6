//! Font engines with shaping behaviour the box engine cannot show.

#![allow(dead_code)]

use std::sync::Arc;

use scriptline_core::error::{Result, ShapingError};
use scriptline_core::{
    Fixed, FontEngine, GlyphLayoutMut, GlyphMetrics, JustificationClass, ShapedRun, ShaperFlags, ShapingRequest,
};
use scriptline_engine_box::BoxEngine;
use scriptline_layout::{Font, TextEngine};

/// Glyph the "fi" ligature maps to.
pub const FI_LIGATURE: u32 = 0xfb01;

macro_rules! box_metrics {
    () => {
        fn string_to_cmap(&self, text: &[char], glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags) -> Result<usize> {
            self.inner.string_to_cmap(text, glyphs, flags)
        }

        fn recalc_advances(&self, glyphs: &mut GlyphLayoutMut<'_>, flags: ShaperFlags) {
            self.inner.recalc_advances(glyphs, flags)
        }

        fn ascent(&self) -> Fixed {
            self.inner.ascent()
        }

        fn descent(&self) -> Fixed {
            self.inner.descent()
        }

        fn leading(&self) -> Fixed {
            self.inner.leading()
        }

        fn glyph_metrics(&self, glyph: u32) -> GlyphMetrics {
            self.inner.glyph_metrics(glyph)
        }

        fn can_render(&self, text: &[char]) -> bool {
            self.inner.can_render(text)
        }
    };
}

/// Box glyphs of 10px, except "fi" which becomes one 20px ligature.
pub struct LigatureEngine {
    inner: BoxEngine,
}

impl LigatureEngine {
    pub fn new() -> Self {
        Self { inner: BoxEngine::new(10) }
    }
}

impl FontEngine for LigatureEngine {
    fn name(&self) -> &str {
        "ligature"
    }

    box_metrics!();

    fn shape(&self, request: &ShapingRequest<'_>, glyphs: &mut GlyphLayoutMut<'_>, log_clusters: &mut [usize]) -> Result<ShapedRun> {
        let text = request.text;
        let ligatures = text.windows(2).filter(|pair| pair == &['f', 'i']).count();
        let needed = text.len() - ligatures;
        if glyphs.len() < needed {
            return Err(ShapingError::BufferTooSmall { needed }.into());
        }

        let mut n = 0;
        let mut i = 0;
        while i < text.len() {
            if text[i] == 'f' && text.get(i + 1) == Some(&'i') {
                glyphs.glyphs[n] = FI_LIGATURE;
                glyphs.advances_x[n] = Fixed::from_int(20);
                log_clusters[i] = n;
                log_clusters[i + 1] = n;
                i += 2;
            } else {
                glyphs.glyphs[n] = text[i] as u32;
                glyphs.advances_x[n] = Fixed::from_int(10);
                log_clusters[i] = n;
                i += 1;
            }
            glyphs.attributes[n].cluster_start = true;
            glyphs.attributes[n].justification = JustificationClass::Character;
            n += 1;
        }
        Ok(ShapedRun {
            num_glyphs: n,
            kerning_applied: false,
        })
    }
}

/// Two 5px glyphs per character, the second a mark. Needs twice as many
/// glyph slots as characters.
pub struct DoubleEngine {
    inner: BoxEngine,
}

impl DoubleEngine {
    pub fn new() -> Self {
        Self { inner: BoxEngine::new(10) }
    }
}

impl FontEngine for DoubleEngine {
    fn name(&self) -> &str {
        "double"
    }

    box_metrics!();

    fn shape(&self, request: &ShapingRequest<'_>, glyphs: &mut GlyphLayoutMut<'_>, log_clusters: &mut [usize]) -> Result<ShapedRun> {
        let needed = request.text.len() * 2;
        if glyphs.len() < needed {
            return Err(ShapingError::BufferTooSmall { needed }.into());
        }
        for (i, &ch) in request.text.iter().enumerate() {
            let base = 2 * i;
            log_clusters[i] = base;
            glyphs.glyphs[base] = ch as u32;
            glyphs.glyphs[base + 1] = 0x0301;
            glyphs.advances_x[base] = Fixed::from_int(5);
            glyphs.advances_x[base + 1] = Fixed::from_int(5);
            glyphs.attributes[base].cluster_start = true;
            glyphs.attributes[base + 1].mark = true;
            glyphs.attributes[base + 1].justification = JustificationClass::Character;
        }
        Ok(ShapedRun {
            num_glyphs: needed,
            kerning_applied: true,
        })
    }
}

/// Fails every shaping request outright.
pub struct FailingEngine {
    inner: BoxEngine,
}

impl FailingEngine {
    pub fn new() -> Self {
        Self { inner: BoxEngine::new(10) }
    }
}

impl FontEngine for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    box_metrics!();

    fn shape(&self, _request: &ShapingRequest<'_>, _glyphs: &mut GlyphLayoutMut<'_>, _log_clusters: &mut [usize]) -> Result<ShapedRun> {
        Err(ShapingError::EngineFailure("no shaper".into()).into())
    }
}

/// Asks for `extra` more glyph slots than it is given, every time.
pub struct GreedyEngine {
    inner: BoxEngine,
    extra: usize,
}

impl GreedyEngine {
    pub fn new(extra: usize) -> Self {
        Self {
            inner: BoxEngine::new(10),
            extra,
        }
    }
}

impl FontEngine for GreedyEngine {
    fn name(&self) -> &str {
        "greedy"
    }

    box_metrics!();

    fn shape(&self, _request: &ShapingRequest<'_>, glyphs: &mut GlyphLayoutMut<'_>, _log_clusters: &mut [usize]) -> Result<ShapedRun> {
        Err(ShapingError::BufferTooSmall {
            needed: glyphs.len().saturating_add(self.extra),
        }
        .into())
    }
}

pub fn box_font(size: i32) -> Font {
    Font::new(Arc::new(BoxEngine::new(size)))
}

pub fn session(text: &str, engine: impl FontEngine + 'static) -> TextEngine {
    TextEngine::new(text, Font::new(Arc::new(engine)))
}
