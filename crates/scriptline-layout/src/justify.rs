//! Full justification of a line.
//!
//! Extra space goes into the justification slot of chosen glyphs, never
//! into their advances, so justifying again starts from the shaped widths.
//! Arabic text is stretched with kashidas first, by insertion class from
//! the best one down; what is left is spread evenly over the spaces, then
//! over character boundaries.

use scriptline_core::traits::split_glyph_index;
use scriptline_core::{
    AnalysisFlags, Fixed, FontEngine, GlyphBuffer, GlyphJustification, JustificationClass, JustificationKind,
    ShaperFlags,
};
use scriptline_unicode::props::KASHIDA;

use crate::engine::TextEngine;
use crate::options::Alignment;

#[derive(Debug, Clone, Copy)]
struct JustificationPoint {
    class: JustificationClass,
    /// Absolute index into the glyph buffer.
    glyph: usize,
    kashida_width: Fixed,
}

/// Advance of the engine's kashida glyph; zero when it has none.
fn kashida_width(engine: &dyn FontEngine) -> Fixed {
    let Ok(mut buffer) = GlyphBuffer::with_len(1) else {
        return Fixed::ZERO;
    };
    let mut glyphs = buffer.layout_mut(0, 1);
    match engine.string_to_cmap(&[KASHIDA], &mut glyphs, ShaperFlags::default()) {
        Ok(n) if n > 0 && split_glyph_index(glyphs.glyphs[0]).1 != 0 => glyphs.advances_x[0],
        _ => Fixed::ZERO,
    }
}

impl TextEngine {
    /// Stretches line `line_index` to its width when the paragraph is
    /// justified.
    ///
    /// Lines that end the paragraph or end in a line separator are left
    /// alone unless justification is forced. A line wider than its width
    /// is marked justified without touching any glyph.
    pub fn justify(&mut self, line_index: usize) {
        let Some(line) = self.lines.get(line_index).copied() else {
            return;
        };
        if line.gridfitted && line.justified {
            return;
        }
        self.lines[line_index].gridfitted = true;
        if self.option.alignment != Alignment::Justify {
            return;
        }

        self.itemize();
        if self.layout.is_failed() {
            return;
        }
        if !self.force_justification {
            let end = line.end();
            if end >= self.layout.string.len() {
                return;
            }
            if end > 0 {
                let last = self.layout.find_item(end - 1);
                if last.is_some_and(|i| self.layout.items[i].analysis.flags == AnalysisFlags::LineOrParagraphSeparator) {
                    return;
                }
            }
        }

        self.ensure_attributes();
        let mut length = line.length;
        while length > 0 && self.attribute(line.from + length - 1).white_space {
            length -= 1;
        }
        // nothing goes after the last character
        if length <= 1 {
            return;
        }
        length -= 1;

        let leading = self.leading_space_width(&line);
        let mut need = line.width - line.text_width - leading;

        let (Some(first), Some(last)) = (self.layout.find_item(line.from), self.layout.find_item(line.from + length - 1))
        else {
            return;
        };
        // shaping may move the glyph buffer, finish it before collecting
        for item in first..=last {
            self.shape(item);
        }

        let mut points: Vec<JustificationPoint> = Vec::new();
        let mut max_class = JustificationClass::None;
        let mut min_kashida = Fixed::from_raw(0x100000);

        for item in first..=last {
            let si = self.layout.items[item];
            if !si.is_shaped() {
                continue;
            }
            let item_length = self.layout.item_length(item);
            let start = line.from.saturating_sub(si.position);
            let end = (line.from + length).saturating_sub(si.position).min(item_length);
            let clusters = self.layout.log_clusters(item);
            let Some(&gs) = clusters.get(start) else {
                continue;
            };
            let ge = if end == item_length {
                si.num_glyphs
            } else {
                clusters.get(end).copied().unwrap_or(si.num_glyphs)
            };
            let Some(engine) = self.engine_for_item(item) else {
                continue;
            };
            let item_kashida = kashida_width(engine.as_ref());

            let mut kashida: Option<(usize, JustificationClass)> = None;
            let flush = |kashida: &mut Option<(usize, JustificationClass)>,
                         points: &mut Vec<JustificationPoint>,
                         max_class: &mut JustificationClass,
                         min_kashida: &mut Fixed| {
                if let Some((glyph, class)) = kashida.take() {
                    if item_kashida > Fixed::ZERO {
                        *min_kashida = (*min_kashida).min(item_kashida);
                        *max_class = (*max_class).max(class);
                        points.push(JustificationPoint {
                            class,
                            glyph,
                            kashida_width: item_kashida,
                        });
                    }
                }
            };

            let glyphs = self.layout.glyphs.layout_mut(si.glyph_data_offset, si.num_glyphs);
            for g in gs..ge.min(glyphs.len()) {
                glyphs.justifications[g] = GlyphJustification::default();
                let class = glyphs.attributes[g].justification;
                match class {
                    JustificationClass::None => {},
                    JustificationClass::Space | JustificationClass::ArabicSpace | JustificationClass::Character => {
                        if class != JustificationClass::Character {
                            flush(&mut kashida, &mut points, &mut max_class, &mut min_kashida);
                        }
                        points.push(JustificationPoint {
                            class,
                            glyph: si.glyph_data_offset + g,
                            kashida_width: Fixed::ZERO,
                        });
                        max_class = max_class.max(class);
                    },
                    _ => {
                        let best = kashida.map_or(JustificationClass::ArabicNormal, |(_, c)| c);
                        if class >= best {
                            kashida = Some((si.glyph_data_offset + g, class));
                        }
                    },
                }
            }
            flush(&mut kashida, &mut points, &mut max_class, &mut min_kashida);
        }

        // the slots are cleared, an overfull line keeps its shaped widths
        if need < Fixed::ZERO {
            self.lines[line_index].justified = true;
            return;
        }

        log::debug!(
            "justifying line {}: need {}, {} points, best class {:?}",
            line_index,
            need,
            points.len(),
            max_class
        );

        if max_class.is_arabic_kashida_point() {
            while need >= min_kashida {
                let mut added = false;
                let mut class = Some(max_class);
                while let Some(c) = class.filter(|c| c.is_arabic_kashida_point()) {
                    for point in points.iter().filter(|p| p.class == c) {
                        if need < min_kashida {
                            break;
                        }
                        if point.kashida_width <= need {
                            let glyphs = self.layout.glyphs.layout_mut(point.glyph, 1);
                            let slot = &mut glyphs.justifications[0];
                            slot.kind = JustificationKind::Kashida;
                            slot.n_kashidas += 1;
                            slot.space_18d6 += point.kashida_width.raw();
                            need -= point.kashida_width;
                            added = true;
                        }
                    }
                    class = c.lower();
                }
                if !added {
                    break;
                }
            }
        }

        let mut class = Some(max_class.min(JustificationClass::Space));
        while let Some(c) = class.filter(|c| *c != JustificationClass::None) {
            if need.is_zero() {
                break;
            }
            let mut n = points.iter().filter(|p| p.class == c).count() as i32;
            if n > 0 {
                for point in points.iter().filter(|p| p.class == c) {
                    let add = need / n;
                    let glyphs = self.layout.glyphs.layout_mut(point.glyph, 1);
                    let slot = &mut glyphs.justifications[0];
                    slot.kind = JustificationKind::Space;
                    slot.space_18d6 = add.raw();
                    need -= add;
                    n -= 1;
                }
            }
            class = c.lower();
        }

        self.lines[line_index].justified = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Font, TextOption};
    use scriptline_engine_box::BoxEngine;
    use std::sync::Arc;

    fn justified(text: &str, font: Font) -> TextEngine {
        TextEngine::new(text, font).with_option(TextOption::default().with_alignment(Alignment::Justify))
    }

    fn box_font() -> Font {
        Font::new(Arc::new(BoxEngine::new(10)))
    }

    fn extra(engine: &TextEngine) -> Vec<Fixed> {
        let used = engine.layout_data().used;
        let glyphs = engine.layout_data().glyphs.layout(0, used);
        glyphs.justifications.iter().map(|j| j.extra_space()).collect()
    }

    #[test]
    fn spaces_take_the_extra_width() {
        let mut engine = justified("ab cd ef gh", box_font());
        // first line "ab cd " of a longer paragraph
        let line = engine.measure_line(0, 6, Fixed::from_int(80));
        let index = engine.add_line(line);
        engine.justify(index);
        assert!(engine.lines()[index].justified);

        let total: Fixed = extra(&engine).into_iter().sum();
        assert_eq!(total, Fixed::from_int(30));
        // only the inner space stretches
        let space = engine.find_item(2).unwrap_or_default();
        assert_eq!(engine.shaped_glyphs(space).justifications[0].extra_space(), Fixed::from_int(30));
        assert_eq!(engine.align_line(index), Fixed::ZERO);
    }

    #[test]
    fn characters_stretch_without_spaces() {
        let mut engine = justified("abcd efgh", box_font());
        let line = engine.measure_line(0, 4, Fixed::from_int(43));
        let index = engine.add_line(line);
        engine.justify(index);
        let extra = extra(&engine);
        // three gaps between four letters share 3px
        assert_eq!(extra[..4], [Fixed::ONE, Fixed::ONE, Fixed::ONE, Fixed::ZERO]);
    }

    #[test]
    fn last_line_of_a_paragraph_is_left_alone() {
        let mut engine = justified("ab cd", box_font());
        let line = engine.measure_line(0, 5, Fixed::from_int(100));
        let index = engine.add_line(line);
        engine.justify(index);
        assert!(!engine.lines()[index].justified);
        assert!(engine.lines()[index].gridfitted);
        assert!(extra(&engine).iter().all(|e| e.is_zero()));

        engine.set_force_justification(true);
        engine.justify(index);
        assert!(engine.lines()[index].justified);
    }

    #[test]
    fn overfull_lines_are_marked_without_changes() {
        let mut engine = justified("abcdef gh", box_font());
        let line = engine.measure_line(0, 6, Fixed::from_int(30));
        let index = engine.add_line(line);
        engine.justify(index);
        assert!(engine.lines()[index].justified);
        assert!(extra(&engine).iter().all(|e| e.is_zero()));
    }

    #[test]
    fn justified_space_stays_out_of_the_width() {
        let mut engine = justified("aa bb cc dd ee", box_font());
        let line = engine.measure_line(0, 6, Fixed::from_int(60));
        let index = engine.add_line(line);
        engine.justify(index);
        assert_eq!(engine.width(0, 5), Fixed::from_int(50));
        assert_eq!(engine.justified_width(0, 5), Fixed::from_int(60));

        // laying the line out again finds the same slack
        let again = engine.measure_line(0, 6, Fixed::from_int(60));
        assert_eq!(again.text_width, Fixed::from_int(50));
        engine.lines_mut()[index] = again;
        engine.justify(index);
        assert!(engine.lines()[index].justified);
        let total: Fixed = extra(&engine).into_iter().sum();
        assert_eq!(total, Fixed::from_int(10));
    }

    #[test]
    fn narrowed_lines_drop_earlier_justification() {
        let mut engine = justified("aa bb cc dd ee", box_font());
        let line = engine.measure_line(0, 6, Fixed::from_int(60));
        let index = engine.add_line(line);
        engine.justify(index);
        assert_eq!(extra(&engine).into_iter().sum::<Fixed>(), Fixed::from_int(10));

        let narrower = engine.measure_line(0, 6, Fixed::from_int(40));
        engine.lines_mut()[index] = narrower;
        engine.justify(index);
        assert!(engine.lines()[index].justified);
        assert!(extra(&engine).iter().all(|e| e.is_zero()));
        assert_eq!(engine.justified_width(0, 5), Fixed::from_int(50));
    }

    #[test]
    fn other_alignments_only_gridfit() {
        let mut engine = TextEngine::new("ab cd ef", box_font());
        let line = engine.measure_line(0, 3, Fixed::from_int(80));
        let index = engine.add_line(line);
        engine.justify(index);
        assert!(!engine.lines()[index].justified);
        assert!(engine.lines()[index].gridfitted);
    }

    #[test]
    fn kashidas_go_to_the_best_arabic_point() {
        // seen (U+0633) outranks the other letters of the word
        let text = "\u{0628}\u{0633}\u{0645} \u{0628}\u{0627}\u{0628}";
        let mut engine = justified(text, box_font());
        // 60 - 30 for the word - 10 for the trailing space laid out on the left
        let line = engine.measure_line(0, 4, Fixed::from_int(60));
        let index = engine.add_line(line);
        engine.justify(index);
        assert!(engine.lines()[index].justified);

        let used = engine.layout_data().used;
        let glyphs = engine.layout_data().glyphs.layout(0, used);
        let kashidas: u32 = glyphs.justifications.iter().map(|j| j.n_kashidas).sum();
        assert_eq!(kashidas, 2);
        let total: Fixed = glyphs.justifications.iter().map(|j| j.extra_space()).sum();
        assert_eq!(total, Fixed::from_int(20));
    }
}
