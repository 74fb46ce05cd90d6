//! Widths and boxes of character ranges, tab stops and line alignment.
//!
//! Ranges are cluster granular: a range starting inside a cluster skips
//! it, a range ending inside one takes all of it.

use std::ops::Range;

use scriptline_core::{AnalysisFlags, Fixed, GlyphMetrics};

use crate::engine::TextEngine;
use crate::options::{Alignment, TabKind, DEFAULT_TAB_STOP};

impl TextEngine {
    /// Glyphs of shaped item `item` covering the characters
    /// `from..from + len`, snapped to whole clusters.
    pub(crate) fn cluster_glyph_range(&self, item: usize, from: usize, len: usize) -> Option<Range<usize>> {
        let si = self.layout.items.get(item)?;
        let ilen = self.layout.item_length(item);
        let clusters = self.layout.log_clusters(item);
        if len == 0 || ilen == 0 || clusters.len() < ilen {
            return None;
        }

        let mut char_from = from.saturating_sub(si.position);
        if char_from >= ilen {
            return None;
        }
        let glyph_start = clusters[char_from];
        if char_from > 0 && clusters[char_from - 1] == glyph_start {
            while char_from < ilen && clusters[char_from] == glyph_start {
                char_from += 1;
            }
        }
        if char_from >= ilen {
            return None;
        }
        let glyph_start = clusters[char_from];

        let mut char_end = (from + len - 1).checked_sub(si.position)?.min(ilen - 1);
        let end_cluster = clusters[char_end];
        while char_end < ilen && clusters[char_end] == end_cluster {
            char_end += 1;
        }
        let glyph_end = if char_end == ilen {
            si.num_glyphs
        } else {
            clusters[char_end]
        };
        let glyph_end = glyph_end.min(si.num_glyphs);
        Some(glyph_start.min(glyph_end)..glyph_end)
    }

    /// Advance width of `len` characters from `from` as shaped. Space
    /// added by [`TextEngine::justify`] is not counted.
    pub fn width(&mut self, from: usize, len: usize) -> Fixed {
        self.range_advance(from, len, false)
    }

    /// [`TextEngine::width`] with the justification space included.
    pub fn justified_width(&mut self, from: usize, len: usize) -> Fixed {
        self.range_advance(from, len, true)
    }

    fn range_advance(&mut self, from: usize, len: usize, justified: bool) -> Fixed {
        self.itemize();
        let mut w = Fixed::ZERO;
        if len == 0 || self.layout.is_failed() {
            return w;
        }
        let end = from.saturating_add(len);

        for i in 0..self.layout.items.len() {
            let pos = self.layout.items[i].position;
            let ilen = self.layout.item_length(i);
            if pos >= end {
                break;
            }
            if pos + ilen <= from {
                continue;
            }
            self.shape(i);

            match self.layout.items[i].analysis.flags {
                AnalysisFlags::Object => {
                    w += self.layout.items[i].width;
                    continue;
                },
                AnalysisFlags::Tab => {
                    w += self.calculate_tab_width(i, w);
                    continue;
                },
                _ => {},
            }

            if let Some(range) = self.cluster_glyph_range(i, from, end - from) {
                let glyphs = self.layout.shaped_glyphs(i);
                for g in range {
                    w += if justified {
                        glyphs.effective_advance(g)
                    } else {
                        glyphs.natural_advance(g)
                    };
                }
            }
        }
        w
    }

    /// Logical box of `len` characters from `from`.
    pub fn bounding_box(&mut self, from: usize, len: usize) -> GlyphMetrics {
        self.range_box(from, len, false)
    }

    /// Ink box of `len` characters from `from`.
    pub fn tight_bounding_box(&mut self, from: usize, len: usize) -> GlyphMetrics {
        self.range_box(from, len, true)
    }

    fn range_box(&mut self, from: usize, len: usize, tight: bool) -> GlyphMetrics {
        self.itemize();
        let mut gm = GlyphMetrics::default();
        if len == 0 || self.layout.is_failed() {
            return gm;
        }
        let end = from.saturating_add(len);

        for i in 0..self.layout.items.len() {
            let pos = self.layout.items[i].position;
            let ilen = self.layout.item_length(i);
            if pos >= end {
                break;
            }
            if pos + ilen <= from {
                continue;
            }
            self.shape(i);

            let advance = match self.layout.items[i].analysis.flags {
                AnalysisFlags::Object => Some(self.layout.items[i].width),
                AnalysisFlags::Tab => Some(self.calculate_tab_width(i, gm.xoff)),
                _ => None,
            };
            if let Some(advance) = advance {
                gm.width += advance;
                gm.xoff += advance;
                continue;
            }

            let Some(range) = self.cluster_glyph_range(i, from, end - from) else {
                continue;
            };
            let Some(engine) = self.engine_for_item(i) else {
                continue;
            };
            let glyphs = self.layout.shaped_glyphs(i).mid(range.start, range.len());
            let m = if tight {
                engine.tight_bounding_box(&glyphs)
            } else {
                engine.bounding_box(&glyphs)
            };
            gm.x = gm.x.min(m.x + gm.xoff);
            gm.y = gm.y.min(m.y + gm.yoff);
            gm.width = gm.width.max(m.width + gm.xoff);
            gm.height = gm.height.max(m.height + gm.yoff);
            gm.xoff += m.xoff;
            gm.yoff += m.yoff;
        }
        gm
    }

    /// Width of tab item `item` when its pen position is `x`.
    ///
    /// Explicit tab stops are tried first, the first one past `x` wins.
    /// Right, center and delimiter stops pull the text after the tab back
    /// so that it ends, centers or puts its delimiter on the stop. Past the
    /// explicit stops the tab runs to the next multiple of the tab distance.
    pub fn calculate_tab_width(&mut self, item: usize, x: Fixed) -> Fixed {
        let Some(si) = self.layout.items.get(item).copied() else {
            return Fixed::ZERO;
        };
        let dpi_scale = self.option.dpi_scale;

        if !self.option.tabs.is_empty() {
            let rtl = self.is_right_to_left();
            let tabs = self.option.tabs.clone();
            for tab in tabs {
                let tab_pos = tab.position * dpi_scale;
                if tab_pos <= x {
                    continue;
                }
                let kind = match (rtl, tab.kind) {
                    (true, TabKind::Left) => TabKind::Right,
                    (true, TabKind::Right) => TabKind::Left,
                    (_, kind) => kind,
                };

                let section_end = match kind {
                    TabKind::Left => si.position,
                    TabKind::Right | TabKind::Center => self.layout.items[item + 1..]
                        .iter()
                        .find(|next| next.analysis.flags == AnalysisFlags::Tab)
                        .map_or(self.layout.string.len(), |next| next.position),
                    TabKind::Delimiter => self.layout.string[si.position..]
                        .iter()
                        .position(|&ch| ch == tab.delimiter)
                        .map_or(si.position, |offset| si.position + offset + 1),
                };

                if section_end > si.position {
                    let mut length = self.width(si.position + 1, section_end - si.position - 1);
                    match kind {
                        TabKind::Delimiter if section_end > si.position + 1 => {
                            length -= self.width(section_end - 1, 1) / 2;
                        },
                        TabKind::Center => length = length / 2,
                        _ => {},
                    }
                    let target = tab_pos - length;
                    if target < Fixed::ZERO {
                        return Fixed::ZERO;
                    }
                    return (target - x).max(Fixed::ZERO);
                }
                return tab_pos - x;
            }
        }

        let mut tab = self.option.tab_stop;
        if tab <= Fixed::ZERO {
            tab = Fixed::from_int(DEFAULT_TAB_STOP);
        }
        let tab = tab * dpi_scale;
        if tab <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        tab * ((x / tab).truncate() + 1) - x
    }

    /// Width of the trailing spaces of an unjustified right-to-left line;
    /// they are laid out on its left side.
    pub fn leading_space_width(&mut self, line: &crate::line::ScriptLine) -> Fixed {
        if !line.has_trailing_spaces || self.option.flags.include_trailing_spaces || !self.is_right_to_left() {
            return Fixed::ZERO;
        }
        self.width(line.from + line.length, line.trailing_spaces)
    }

    /// Horizontal offset of line `line_index` for the paragraph alignment.
    /// Justifies the line first when the alignment asks for it.
    pub fn align_line(&mut self, line_index: usize) -> Fixed {
        self.justify(line_index);
        let Some(line) = self.lines.get(line_index).copied() else {
            return Fixed::ZERO;
        };
        if line.justified || line.width == Fixed::MAX {
            return Fixed::ZERO;
        }

        let leading = self.leading_space_width(&line);
        let mut alignment = self.option.alignment;
        if alignment == Alignment::Justify && self.is_right_to_left() {
            alignment = Alignment::Right;
        }
        match alignment {
            Alignment::Left => -leading,
            Alignment::Right => line.width - (line.text_advance + leading),
            Alignment::Center => (line.width - line.text_advance) / 2 - leading,
            Alignment::Justify => Fixed::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Font, Tab, TextOption};
    use scriptline_engine_box::BoxEngine;
    use std::sync::Arc;

    fn engine(text: &str) -> TextEngine {
        TextEngine::new(text, Font::new(Arc::new(BoxEngine::new(10))))
    }

    #[test]
    fn width_sums_printable_advances() {
        let mut engine = engine("ab cd");
        assert_eq!(engine.width(0, 5), Fixed::from_int(50));
        assert_eq!(engine.width(1, 3), Fixed::from_int(30));
        assert_eq!(engine.width(0, 0), Fixed::ZERO);
        assert_eq!(engine.width(5, 3), Fixed::ZERO);
    }

    #[test]
    fn width_ignores_prior_shaping() {
        let mut fresh = engine("hello world");
        let expected = fresh.width(0, 11);
        let mut shaped = engine("hello world");
        for item in 0..shaped.item_count() {
            shaped.shape(item);
        }
        assert_eq!(shaped.width(0, 11), expected);
    }

    #[test]
    fn default_tabs_run_to_the_next_stop() {
        let mut engine = engine("ab\tc");
        assert_eq!(engine.width(0, 3), Fixed::from_int(80));
        assert_eq!(engine.width(0, 4), Fixed::from_int(90));
        let tab = engine.find_item(2).unwrap_or_default();
        assert_eq!(engine.calculate_tab_width(tab, Fixed::from_int(80)), Fixed::from_int(80));
    }

    #[test]
    fn right_tab_ends_the_section_on_the_stop() {
        let option = TextOption::default().with_tabs(vec![Tab::new(Fixed::from_int(100), TabKind::Right)]);
        let mut engine = engine("a\tbcd").with_option(option);
        let tab = engine.find_item(1).unwrap_or_default();
        // 100 - 30 for "bcd", from x = 10
        assert_eq!(engine.calculate_tab_width(tab, Fixed::from_int(10)), Fixed::from_int(60));
    }

    #[test]
    fn center_and_delimiter_tabs() {
        let center = TextOption::default().with_tabs(vec![Tab::new(Fixed::from_int(100), TabKind::Center)]);
        let mut engine = engine("a\tbcd").with_option(center);
        let tab = engine.find_item(1).unwrap_or_default();
        assert_eq!(engine.calculate_tab_width(tab, Fixed::from_int(10)), Fixed::from_int(75));

        let delimiter = TextOption::default().with_tabs(vec![Tab::delimiter(Fixed::from_int(100), '.')]);
        let mut engine = self::engine("a\t12.5").with_option(delimiter);
        let tab = engine.find_item(1).unwrap_or_default();
        // "12" plus half of "."
        assert_eq!(engine.calculate_tab_width(tab, Fixed::from_int(10)), Fixed::from_int(65));
    }

    #[test]
    fn overlong_sections_give_empty_tabs() {
        let option = TextOption::default().with_tabs(vec![Tab::new(Fixed::from_int(20), TabKind::Right)]);
        let mut engine = engine("a\tbcd").with_option(option);
        let tab = engine.find_item(1).unwrap_or_default();
        assert_eq!(engine.calculate_tab_width(tab, Fixed::from_int(10)), Fixed::ZERO);
    }

    #[test]
    fn bounding_box_spans_the_range() {
        let mut engine = engine("abc");
        let bb = engine.bounding_box(0, 3);
        assert_eq!(bb.xoff, Fixed::from_int(30));
        assert_eq!(bb.width, Fixed::from_int(30));
        assert_eq!(bb.y, Fixed::from_int(-10));
        assert_eq!(bb.height, Fixed::from_int(10));
        assert_eq!(engine.tight_bounding_box(0, 3), bb);
    }

    #[test]
    fn alignment_offsets() {
        for (alignment, expected) in [
            (Alignment::Left, 0),
            (Alignment::Right, 70),
            (Alignment::Center, 35),
        ] {
            let option = TextOption::default().with_alignment(alignment);
            let mut engine = engine("abc").with_option(option);
            let line = engine.measure_line(0, 3, Fixed::from_int(100));
            let index = engine.add_line(line);
            assert_eq!(engine.align_line(index), Fixed::from_int(expected), "{:?}", alignment);
        }
    }

    #[test]
    fn unbounded_lines_stay_left() {
        let option = TextOption::default().with_alignment(Alignment::Right);
        let mut engine = engine("abc").with_option(option);
        let line = engine.measure_line(0, 3, Fixed::MAX);
        let index = engine.add_line(line);
        assert_eq!(engine.align_line(index), Fixed::ZERO);
    }
}
