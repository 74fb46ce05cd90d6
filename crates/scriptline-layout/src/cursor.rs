//! Cursor positions: logical steps over grapheme boundaries, visual steps
//! over the insertion points of a line, and positions inside ligatures.

use scriptline_core::{Fixed, Script};

use crate::engine::TextEngine;
use crate::options::MoveOperation;

/// Scripts whose ligatures are split evenly between their characters.
fn interpolates_ligatures(script: Script) -> bool {
    script == Script::Common || script == Script::Latin || script == Script::Greek || script == Script::Cyrillic
}

impl TextEngine {
    /// Distance from the start of glyph `glyph_pos` to character `pos` of
    /// item `item` when the character sits inside a multi-character
    /// cluster, zero otherwise. `max` bounds the cluster scan.
    pub fn offset_in_ligature(&self, item: usize, pos: usize, max: usize, glyph_pos: usize) -> Fixed {
        let clusters = self.layout.log_clusters(item);
        let glyphs = self.layout.shaped_glyphs(item);
        if glyph_pos >= glyphs.len() {
            return Fixed::ZERO;
        }

        let offset = clusters[..pos.min(clusters.len())]
            .iter()
            .rev()
            .take_while(|&&g| g == glyph_pos)
            .count();
        if offset == 0 {
            return Fixed::ZERO;
        }
        let cluster_length = clusters
            .get(pos - offset..max.min(clusters.len()))
            .unwrap_or(&[])
            .iter()
            .take_while(|&&g| g == glyph_pos)
            .count();
        if cluster_length == 0 {
            return Fixed::ZERO;
        }
        glyphs.advances_x[glyph_pos] * offset as i32 / cluster_length as i32
    }

    /// Character position for pen position `x` inside glyph `glyph_pos` of
    /// item `item`, whose edge is at `edge`. Only the first `end`
    /// characters of the item are considered.
    ///
    /// Without a glyph the position is taken from the last character. With
    /// `cursor_on_character` the character under `x` is returned rather
    /// than the nearest boundary.
    pub fn position_in_ligature(
        &mut self,
        item: usize,
        end: usize,
        x: Fixed,
        edge: Fixed,
        glyph_pos: Option<usize>,
        cursor_on_character: bool,
    ) -> usize {
        self.ensure_attributes();
        let Some(si) = self.layout.items.get(item).copied() else {
            return end;
        };
        let clusters = self.layout.log_clusters(item);
        let end = end.min(clusters.len());

        if !interpolates_ligatures(si.analysis.script) {
            return match glyph_pos {
                None => si.position + end,
                Some(glyph) => si.position + clusters[..end].iter().position(|&g| g == glyph).unwrap_or(end),
            };
        }

        let glyph = match glyph_pos {
            None if end > 0 => clusters[end - 1],
            None => return si.position + end,
            Some(glyph) if x <= edge => match glyph.checked_sub(1) {
                Some(glyph) => glyph,
                None => return si.position + end,
            },
            Some(glyph) => glyph,
        };

        let mut cluster_start = None;
        let mut cluster_length = 0usize;
        for (i, &g) in clusters[..end].iter().enumerate() {
            if g == glyph && self.attribute(si.position + i).char_stop {
                cluster_start.get_or_insert(i);
                cluster_length += 1;
            } else if cluster_length > 0 {
                break;
            }
        }
        let Some(cluster_start) = cluster_start else {
            return si.position + end;
        };

        let glyphs = self.layout.shaped_glyphs(item);
        if glyph >= glyphs.len() {
            return si.position + cluster_start;
        }
        let glyph_width = glyphs.effective_advance(glyph);
        let per_item = glyph_width / cluster_length as i32;
        if per_item <= Fixed::ZERO {
            return si.position + cluster_start;
        }
        let left = if x > edge { edge } else { edge - glyph_width };
        let n = ((x - left) / per_item).floor().to_int();
        let dist = x - left - per_item * n;
        let mut closest = if dist > per_item / 2 { n + 1 } else { n };
        if cursor_on_character && closest > 0 {
            closest -= 1;
        }

        let mut pos = si.position + cluster_start + closest.max(0) as usize;
        let limit = si.position + end;
        while pos < limit && !self.attribute(pos).char_stop {
            pos += 1;
        }
        pos
    }

    /// The character stop before `pos`.
    pub fn previous_logical_position(&mut self, pos: usize) -> usize {
        self.ensure_attributes();
        if pos == 0 {
            return 0;
        }
        let mut pos = pos.min(self.layout.string.len()) - 1;
        while pos > 0 && !self.attribute(pos).char_stop {
            pos -= 1;
        }
        pos
    }

    /// The character stop after `pos`; the text length at the end.
    pub fn next_logical_position(&mut self, pos: usize) -> usize {
        self.ensure_attributes();
        let len = self.layout.string.len();
        if pos >= len {
            return pos;
        }
        let mut pos = pos + 1;
        while pos < len && !self.attribute(pos).char_stop {
            pos += 1;
        }
        pos
    }

    /// Line holding character `pos`; the text end belongs to the last line.
    pub fn line_number_for_text_position(&mut self, pos: usize) -> Option<usize> {
        self.itemize();
        if pos == self.layout.string.len() && !self.lines.is_empty() {
            return Some(self.lines.len() - 1);
        }
        self.lines.iter().position(|line| line.end() > pos)
    }

    /// Cursor positions of a line from left to right. The last line also
    /// gets the position past its last character.
    pub fn insertion_points_for_line(&mut self, line_index: usize) -> Vec<usize> {
        let items = self.line_items(line_index);
        let rtl = self.is_right_to_left();
        let last_line = line_index + 1 >= self.lines.len();

        let mut points = Vec::new();
        for (visual, item) in items.iter().enumerate() {
            let at_edge = if rtl { visual == 0 } else { visual + 1 == items.len() };
            let extra = usize::from(last_line && at_edge);
            if item.is_right_to_left {
                points.extend((item.item_start..item.item_end + extra).rev());
            } else {
                points.extend(item.item_start..item.item_end + extra);
            }
        }
        points
    }

    pub fn beginning_of_line(&mut self, line_index: usize) -> usize {
        self.insertion_points_for_line(line_index).first().copied().unwrap_or(0)
    }

    pub fn end_of_line(&mut self, line_index: usize) -> usize {
        self.insertion_points_for_line(line_index).last().copied().unwrap_or(0)
    }

    /// Where the cursor lands when moved one step left or right on screen.
    ///
    /// Without bidi text this is a logical step. Otherwise the insertion
    /// points of the cursor's line are walked, crossing into the next or
    /// previous line at the ends.
    pub fn position_after_visual_movement(&mut self, pos: usize, op: MoveOperation) -> usize {
        self.itemize();
        let move_right = op == MoveOperation::Right;
        let align_right = self.is_right_to_left();
        if !self.layout.has_bidi {
            return if move_right ^ align_right {
                self.next_logical_position(pos)
            } else {
                self.previous_logical_position(pos)
            };
        }

        let Some(line) = self.line_number_for_text_position(pos) else {
            return pos;
        };
        let points = self.insertion_points_for_line(line);
        let Some(i) = points.iter().position(|&p| p == pos) else {
            return pos;
        };

        if move_right {
            if let Some(&next) = points.get(i + 1) {
                return next;
            }
        } else if i > 0 {
            return points[i - 1];
        }

        if move_right ^ align_right {
            if line + 1 < self.lines.len() {
                return if align_right {
                    self.end_of_line(line + 1)
                } else {
                    self.beginning_of_line(line + 1)
                };
            }
        } else if line > 0 {
            return if align_right {
                self.beginning_of_line(line - 1)
            } else {
                self.end_of_line(line - 1)
            };
        }
        pos
    }
}
