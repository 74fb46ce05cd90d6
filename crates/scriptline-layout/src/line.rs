//! Lines of a paragraph and the visual walk over their items.

use scriptline_core::{AnalysisFlags, Fixed, FontEngine, Script};
use scriptline_unicode::props::SOFT_HYPHEN;
use scriptline_unicode::reorder_levels;

use crate::engine::TextEngine;

/// One laid-out line. Positions are character indices into the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptLine {
    pub from: usize,
    /// Characters on the line, trailing whitespace excluded.
    pub length: usize,
    pub trailing_spaces: usize,
    pub ascent: Fixed,
    pub descent: Fixed,
    pub leading: Fixed,
    /// Width available to the line; [`Fixed::MAX`] lays it out unbounded
    /// and left aligned.
    pub width: Fixed,
    pub text_width: Fixed,
    pub text_advance: Fixed,
    pub x: Fixed,
    pub y: Fixed,
    pub justified: bool,
    pub gridfitted: bool,
    pub has_trailing_spaces: bool,
}

impl ScriptLine {
    pub fn new(from: usize, length: usize, width: Fixed) -> Self {
        Self {
            from,
            length,
            width,
            ..Self::default()
        }
    }

    /// First character past the line, trailing whitespace included.
    pub fn end(&self) -> usize {
        self.from + self.length + self.trailing_spaces
    }

    pub fn height(&self) -> Fixed {
        self.ascent + self.descent
    }

    /// Raises the metrics to at least those of `engine`, keeping the
    /// distance from the top of the line to the next line's top.
    pub fn set_default_height(&mut self, engine: &dyn FontEngine) {
        let other_ascent = engine.ascent();
        let other_descent = engine.descent();
        let other_leading = engine.leading();
        self.leading = (self.leading + self.ascent).max(other_leading + other_ascent) - self.ascent.max(other_ascent);
        self.ascent = self.ascent.max(other_ascent);
        self.descent = self.descent.max(other_descent);
    }
}

/// An item as it appears on one line, in visual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub item: usize,
    /// Characters of the item on this line.
    pub item_start: usize,
    pub item_end: usize,
    /// Glyphs of the item on this line, relative to the item.
    pub glyphs_start: usize,
    pub glyphs_end: usize,
    /// Left edge, alignment included.
    pub x: Fixed,
    pub width: Fixed,
    pub is_right_to_left: bool,
}

impl TextEngine {
    /// Measures `length` characters from `from` as one line of at most
    /// `width`.
    pub fn measure_line(&mut self, from: usize, length: usize, width: Fixed) -> ScriptLine {
        self.itemize();
        self.ensure_attributes();

        let string_len = self.layout.string.len();
        let from = from.min(string_len);
        let length = length.min(string_len - from);
        let mut line = ScriptLine::new(from, length, width);

        let mut content = length;
        while content > 0 && self.attribute(from + content - 1).white_space {
            content -= 1;
        }
        line.length = content;
        line.trailing_spaces = length - content;
        line.has_trailing_spaces = line.trailing_spaces > 0;

        let mut measured = content;
        if measured > 0 {
            let last = self.layout.find_item(from + measured - 1);
            if last.is_some_and(|i| self.layout.items[i].analysis.flags == AnalysisFlags::LineOrParagraphSeparator) {
                measured -= 1;
            }
        }
        line.text_width = self.width(from, measured);
        if self.option.flags.include_trailing_spaces {
            line.text_width += self.width(from + content, line.trailing_spaces);
        }
        line.text_advance = line.text_width;

        let mut found = false;
        if length > 0 {
            if let (Some(first), Some(last)) = (self.layout.find_item(from), self.layout.find_item(from + length - 1)) {
                for i in first..=last {
                    self.shape(i);
                    let si = &self.layout.items[i];
                    line.ascent = line.ascent.max(si.ascent);
                    line.descent = line.descent.max(si.descent);
                    line.leading = line.leading.max(si.leading);
                    found = true;
                }
            }
        }
        if !found {
            self.set_default_height(&mut line);
        }
        line
    }

    /// [`ScriptLine::set_default_height`] with the engine the session font
    /// uses for common-script text.
    pub fn set_default_height(&self, line: &mut ScriptLine) {
        let engine = self.font.engine_for_script(Script::Common);
        line.set_default_height(engine.as_ref());
    }

    /// Appends a line and returns its index.
    pub fn add_line(&mut self, line: ScriptLine) -> usize {
        self.lines.push(line);
        self.lines.len() - 1
    }

    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [ScriptLine] {
        &mut self.lines
    }

    pub fn line(&self, index: usize) -> Option<&ScriptLine> {
        self.lines.get(index)
    }

    pub fn clear_lines(&mut self) {
        self.lines.clear();
    }

    /// Shapes every item of a line and sizes its tabs from their pen
    /// position.
    pub fn shape_line(&mut self, line_index: usize) {
        self.itemize();
        let Some(line) = self.lines.get(line_index).copied() else {
            return;
        };
        if line.length == 0 {
            return;
        }
        let (Some(first), Some(last)) = (self.layout.find_item(line.from), self.layout.find_item(line.from + line.length - 1))
        else {
            return;
        };

        let mut x = Fixed::ZERO;
        for item in first..=last {
            if self.layout.items[item].analysis.flags == AnalysisFlags::Tab {
                self.layout.ensure_space(1);
                let width = self.calculate_tab_width(item, x);
                self.layout.items[item].width = width;
            } else {
                self.shape(item);
            }

            let si = self.layout.items[item];
            if item == first && si.position < line.from && si.is_shaped() {
                // the line starts inside the item
                let clusters = self.layout.log_clusters(item);
                let glyph = clusters.get(line.from - si.position).copied().unwrap_or(si.num_glyphs);
                let glyphs = self.layout.shaped_glyphs(item);
                for g in 0..glyph.min(glyphs.len()) {
                    x -= glyphs.effective_advance(g);
                }
            }
            x += si.width;
        }
    }

    /// Items of line `line_index` in visual order, with their glyph ranges
    /// and pen positions.
    pub fn line_items(&mut self, line_index: usize) -> Vec<LineItem> {
        self.itemize();
        let Some(line) = self.lines.get(line_index).copied() else {
            return Vec::new();
        };
        let line_end = line.end().min(self.layout.string.len());
        if line_end <= line.from {
            return Vec::new();
        }
        let (Some(first), Some(last)) = (self.layout.find_item(line.from), self.layout.find_item(line_end - 1)) else {
            return Vec::new();
        };

        let mut x = line.x + self.align_line(line_index);
        self.shape_line(line_index);

        let levels: Vec<u8> = self.layout.items[first..=last]
            .iter()
            .map(|si| si.analysis.bidi_level)
            .collect();
        let visual_order = reorder_levels(&levels);

        let mut result = Vec::with_capacity(visual_order.len());
        for logical in visual_order {
            let item = first + logical;
            self.shape(item);
            let si = self.layout.items[item];
            let item_length = self.layout.item_length(item);
            let item_start = line.from.max(si.position);
            let item_end = line_end.min(si.position + item_length);

            let (glyphs_start, glyphs_end, width) = if si.analysis.flags.is_tab_or_object() {
                (0, si.num_glyphs, si.width)
            } else {
                let clusters = self.layout.log_clusters(item);
                let glyphs_start = clusters.get(item_start - si.position).copied().unwrap_or(si.num_glyphs);
                let glyphs_end = if item_end < si.position + item_length {
                    clusters.get(item_end - si.position).copied().unwrap_or(si.num_glyphs)
                } else {
                    si.num_glyphs
                };

                if si.position + item_length >= line_end
                    && glyphs_end > 0
                    && self.layout.string.get(line_end - 1) == Some(&SOFT_HYPHEN)
                {
                    // a hyphen at the break is drawn
                    let glyphs = self.layout.glyphs.layout_mut(si.glyph_data_offset, si.num_glyphs);
                    glyphs.attributes[glyphs_end - 1].dont_print = false;
                }

                let glyphs = self.layout.shaped_glyphs(item);
                let width: Fixed = (glyphs_start..glyphs_end).map(|g| glyphs.effective_advance(g)).sum();
                (glyphs_start, glyphs_end, width)
            };

            result.push(LineItem {
                item,
                item_start,
                item_end,
                glyphs_start,
                glyphs_end,
                x,
                width,
                is_right_to_left: si.analysis.is_right_to_left(),
            });
            x += width;
        }
        result
    }

    /// Horizontal extent `(x, width)` of the characters `start..start + length`
    /// inside `item`, or `None` when they do not meet it.
    pub fn selection_bounds(&self, item: &LineItem, start: usize, length: usize) -> Option<(Fixed, Fixed)> {
        let si = self.layout.items.get(item.item)?;
        let end = start.saturating_add(length);

        if si.analysis.flags.is_tab_or_object() {
            let item_length = self.layout.item_length(item.item);
            if si.position >= end || si.position + item_length <= start {
                return None;
            }
            return Some((item.x, item.width));
        }

        let from = item.item_start.max(start).checked_sub(si.position)?;
        let to = item.item_end.min(end).checked_sub(si.position)?;
        if from >= to {
            return None;
        }

        let item_length = self.layout.item_length(item.item);
        let clusters = self.layout.log_clusters(item.item);
        let glyphs = self.layout.shaped_glyphs(item.item);
        let start_glyph = clusters.get(from).copied()?;
        let end_glyph = if to == item_length {
            si.num_glyphs
        } else {
            clusters.get(to).copied()?
        };

        let (offset, width): (Fixed, Fixed) = if si.analysis.is_right_to_left() {
            (
                (end_glyph..item.glyphs_end).map(|g| glyphs.effective_advance(g)).sum(),
                (start_glyph..end_glyph).map(|g| glyphs.effective_advance(g)).sum(),
            )
        } else {
            (
                (item.glyphs_start..start_glyph).map(|g| glyphs.effective_advance(g)).sum(),
                (start_glyph..end_glyph).map(|g| glyphs.effective_advance(g)).sum(),
            )
        };

        // a selection starting or ending inside a ligature covers part of it
        let left = self.offset_in_ligature(item.item, from, to, start_glyph);
        let right = self.offset_in_ligature(item.item, to, item_length, end_glyph);
        Some((item.x + offset + left, width - left + right))
    }
}
