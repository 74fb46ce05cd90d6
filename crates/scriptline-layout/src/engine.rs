//! The layout session.
//!
//! A [`TextEngine`] owns one paragraph of text together with the font and
//! options it is laid out with. Nothing is computed up front: the first
//! query itemizes the text, and items are shaped the first time a query
//! needs their glyphs. All derived state lives in [`LayoutData`] and is
//! dropped by [`TextEngine::invalidate`].
//!
//! The query families live in their own modules as further `impl` blocks:
//! shaping, justification, metrics, cursor movement, lines and elision.

use std::sync::Arc;

use scriptline_core::{AnalysisFlags, Fixed, FontEngine, GlyphLayout, ScriptItem};
use scriptline_unicode::{char_attributes, first_strong_is_rtl, CharAttributes, IcuWordBoundaryFinder, WordBoundaryFinder};

use crate::itemizer::{analyze, Itemizer};
use crate::layout_data::LayoutData;
use crate::line::ScriptLine;
use crate::options::{Capitalization, Font, FormatRange, TextDirection, TextOption};

/// Layout session over one paragraph.
pub struct TextEngine {
    pub(crate) text: Vec<char>,
    pub(crate) font: Font,
    pub(crate) option: TextOption,
    pub(crate) formats: Vec<FormatRange>,
    pub(crate) layout: LayoutData,
    pub(crate) itemized: bool,
    pub(crate) lines: Vec<ScriptLine>,
    pub(crate) force_justification: bool,
    pub(crate) ignore_bidi: bool,
    pub(crate) word_finder: Box<dyn WordBoundaryFinder>,
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("text", &self.text.iter().collect::<String>())
            .field("font", &self.font)
            .field("option", &self.option)
            .field("items", &self.layout.items.len())
            .field("lines", &self.lines.len())
            .finish()
    }
}

impl TextEngine {
    pub fn new(text: &str, font: Font) -> Self {
        let text: Vec<char> = text.chars().collect();
        let layout = LayoutData::new(&text);
        Self {
            text,
            font,
            option: TextOption::default(),
            formats: Vec::new(),
            layout,
            itemized: false,
            lines: Vec::new(),
            force_justification: false,
            ignore_bidi: false,
            word_finder: Box::new(IcuWordBoundaryFinder),
        }
    }

    pub fn with_option(mut self, option: TextOption) -> Self {
        self.set_option(option);
        self
    }

    pub fn with_formats(mut self, formats: Vec<FormatRange>) -> Self {
        self.set_formats(formats);
        self
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn text_chars(&self) -> &[char] {
        &self.text
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn option(&self) -> &TextOption {
        &self.option
    }

    pub fn formats(&self) -> &[FormatRange] {
        &self.formats
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.chars().collect();
        self.lines.clear();
        self.invalidate();
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = font;
        self.invalidate();
    }

    pub fn set_option(&mut self, option: TextOption) {
        self.option = option;
        self.invalidate();
    }

    /// Character formats laid over the text. Range edges become item
    /// boundaries.
    pub fn set_formats(&mut self, formats: Vec<FormatRange>) {
        self.formats = formats;
        self.invalidate();
    }

    pub fn set_force_justification(&mut self, force: bool) {
        self.force_justification = force;
    }

    /// Skips the bidi pass; every level is the paragraph level.
    pub fn set_ignore_bidi(&mut self, ignore: bool) {
        self.ignore_bidi = ignore;
        self.invalidate();
    }

    pub fn set_word_boundary_finder(&mut self, finder: Box<dyn WordBoundaryFinder>) {
        self.word_finder = finder;
        self.invalidate();
    }

    /// Drops items, glyphs and attributes. Lines are kept but lose their
    /// justification.
    pub fn invalidate(&mut self) {
        self.layout = LayoutData::new(&self.text);
        self.itemized = false;
        for line in &mut self.lines {
            line.justified = false;
            line.gridfitted = false;
        }
    }

    pub fn is_right_to_left(&self) -> bool {
        match self.option.direction {
            TextDirection::LeftToRight => false,
            TextDirection::RightToLeft => true,
            TextDirection::Auto => first_strong_is_rtl(&self.text),
        }
    }

    /// Splits the text into script items. Runs once per layout.
    pub fn itemize(&mut self) {
        if self.itemized {
            return;
        }
        self.itemized = true;
        if self.layout.string.is_empty() {
            return;
        }

        let rtl = self.is_right_to_left();
        let forced_rtl = self.option.direction == TextDirection::RightToLeft;
        let analysis = analyze(
            &mut self.layout.string,
            rtl,
            forced_rtl,
            self.ignore_bidi,
            &self.option.flags,
        );
        self.layout.has_bidi = analysis.has_bidi;

        let spans = self.capitalization_spans();
        {
            let mut itemizer = Itemizer::new(
                &self.layout.string,
                &analysis.chars,
                &mut self.layout.items,
                self.word_finder.as_ref(),
            );
            for (start, length, caps) in spans {
                itemizer.generate(start, length, caps);
            }
        }

        let edges: Vec<usize> = self.formats.iter().flat_map(|r| [r.start, r.end()]).collect();
        for edge in edges {
            self.set_boundary(edge);
        }

        log::debug!(
            "itemized {} characters into {} items (bidi: {})",
            self.layout.string.len(),
            self.layout.items.len(),
            self.layout.has_bidi
        );
    }

    /// `(start, length, mode)` spans covering the text, one per format
    /// range that overrides the capitalization.
    fn capitalization_spans(&self) -> Vec<(usize, usize, Capitalization)> {
        let length = self.layout.string.len();
        let default = self.font.capitalization;

        let mut overrides: Vec<(usize, usize, Capitalization)> = self
            .formats
            .iter()
            .filter_map(|r| r.format.capitalization.map(|caps| (r.start, r.end().min(length), caps)))
            .filter(|(start, end, _)| start < end)
            .collect();
        overrides.sort_by_key(|(start, _, _)| *start);

        let mut spans = Vec::new();
        let mut last = 0;
        for (start, end, caps) in overrides {
            if start < last {
                continue;
            }
            if start > last {
                spans.push((last, start - last, default));
            }
            spans.push((start, end - start, caps));
            last = end;
        }
        if last < length {
            spans.push((last, length - last, default));
        }
        spans
    }

    /// Makes `pos` an item boundary.
    pub fn set_boundary(&mut self, pos: usize) {
        self.itemize();
        if pos == 0 || pos >= self.layout.string.len() {
            return;
        }
        let Some(item) = self.layout.find_item(pos) else {
            return;
        };
        let position = self.layout.items[item].position;
        if position == pos {
            return;
        }
        self.split_item(item, pos - position);
    }

    /// Splits item `item` `pos` characters in. A shaped item keeps its
    /// glyphs: the tail takes the glyphs from the cluster of its first
    /// character on, its clusters re-based to start at zero.
    pub fn split_item(&mut self, item: usize, pos: usize) {
        if pos == 0 || item >= self.layout.items.len() || pos >= self.layout.item_length(item) {
            return;
        }
        let old = self.layout.items[item];
        let tail_length = self.layout.item_length(item) - pos;
        let mut new = old;
        new.position += pos;

        let mut head = old;
        if old.num_glyphs != 0 {
            let break_glyph = self.layout.log_clusters[old.position + pos].min(old.num_glyphs);
            new.num_glyphs = old.num_glyphs - break_glyph;
            head.num_glyphs = break_glyph;
            new.glyph_data_offset = old.glyph_data_offset + break_glyph;

            for cluster in &mut self.layout.log_clusters[new.position..new.position + tail_length] {
                *cluster = cluster.saturating_sub(break_glyph);
            }

            let glyphs = self.layout.glyphs.layout(old.glyph_data_offset, break_glyph);
            let width: Fixed = (0..glyphs.len())
                .filter(|&j| !glyphs.attributes[j].dont_print)
                .map(|j| glyphs.advances_x[j])
                .sum();
            new.width = old.width - width;
            head.width = width;
        }

        self.layout.items[item] = head;
        self.layout.items.insert(item + 1, new);
    }

    pub fn items(&mut self) -> &[ScriptItem] {
        self.itemize();
        &self.layout.items
    }

    pub fn item_count(&mut self) -> usize {
        self.itemize();
        self.layout.items.len()
    }

    pub fn item_length(&mut self, item: usize) -> usize {
        self.itemize();
        self.layout.item_length(item)
    }

    pub fn find_item(&mut self, pos: usize) -> Option<usize> {
        self.itemize();
        self.layout.find_item(pos)
    }

    /// Characters as laid out, after separator substitution.
    pub fn layout_string(&mut self) -> &[char] {
        self.itemize();
        &self.layout.string
    }

    pub fn layout_data(&self) -> &LayoutData {
        &self.layout
    }

    pub fn has_bidi(&mut self) -> bool {
        self.itemize();
        self.layout.has_bidi
    }

    pub fn is_layout_failed(&self) -> bool {
        self.layout.is_failed()
    }

    /// Grapheme, word and whitespace attributes per character.
    pub fn attributes(&mut self) -> &[CharAttributes] {
        self.itemize();
        let string = &self.layout.string;
        self.layout.attributes.get_or_insert_with(|| char_attributes(string))
    }

    pub(crate) fn ensure_attributes(&mut self) {
        let _ = self.attributes();
    }

    pub(crate) fn attribute(&self, pos: usize) -> CharAttributes {
        self.layout
            .attributes
            .as_ref()
            .and_then(|attrs| attrs.get(pos).copied())
            .unwrap_or_default()
    }

    pub fn log_clusters(&mut self, item: usize) -> &[usize] {
        self.itemize();
        self.layout.log_clusters(item)
    }

    pub fn shaped_glyphs(&self, item: usize) -> GlyphLayout<'_> {
        self.layout.shaped_glyphs(item)
    }

    /// Size of an inline object item, decided by the caller.
    pub fn set_object_metrics(&mut self, item: usize, width: Fixed, ascent: Fixed, descent: Fixed) {
        self.itemize();
        if let Some(si) = self.layout.items.get_mut(item) {
            if si.analysis.flags == AnalysisFlags::Object {
                si.width = width;
                si.ascent = ascent;
                si.descent = descent;
            }
        }
    }

    /// Font an item is shaped with: the last format range covering it that
    /// sets a font, or the session font.
    pub(crate) fn font_for_position(&self, position: usize) -> &Font {
        self.formats
            .iter()
            .rev()
            .filter(|r| r.contains(position))
            .find_map(|r| r.format.font.as_ref())
            .unwrap_or(&self.font)
    }

    /// Engine for item `item`; small-caps items use the font's small-caps
    /// engine when it has one.
    pub(crate) fn engine_for_item(&self, item: usize) -> Option<Arc<dyn FontEngine>> {
        let si = self.layout.items.get(item)?;
        let font = self.font_for_position(si.position);
        if si.analysis.flags == AnalysisFlags::SmallCaps {
            if let Some(engine) = font.small_caps_engine() {
                return Some(engine.clone());
            }
        }
        Some(font.engine_for_script(si.analysis.script).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CharFormat;
    use scriptline_engine_box::BoxEngine;

    fn engine(text: &str) -> TextEngine {
        TextEngine::new(text, Font::new(Arc::new(BoxEngine::new(10))))
    }

    #[test]
    fn empty_text_has_no_items() {
        let mut engine = engine("");
        assert_eq!(engine.item_count(), 0);
        assert_eq!(engine.find_item(0), None);
    }

    #[test]
    fn format_edges_become_boundaries() {
        let mut engine = engine("abcdef").with_formats(vec![FormatRange::new(2, 2, CharFormat::default())]);
        let positions: Vec<usize> = engine.items().iter().map(|si| si.position).collect();
        assert_eq!(positions, vec![0, 2, 4]);
    }

    #[test]
    fn format_capitalization_is_itemized_separately() {
        let format = CharFormat::default().with_capitalization(Capitalization::AllUppercase);
        let mut engine = engine("abcdef").with_formats(vec![FormatRange::new(3, 3, format)]);
        let flags: Vec<AnalysisFlags> = engine.items().iter().map(|si| si.analysis.flags).collect();
        assert_eq!(flags, vec![AnalysisFlags::None, AnalysisFlags::Uppercase]);
    }

    #[test]
    fn direction_follows_the_first_strong_character() {
        assert!(engine("\u{05d0}bc").is_right_to_left());
        assert!(!engine("abc").is_right_to_left());
        let forced = engine("abc").with_option(TextOption::default().with_direction(TextDirection::RightToLeft));
        assert!(forced.is_right_to_left());
    }

    #[test]
    fn unshaped_split_only_moves_the_position() {
        let mut engine = engine("abcdef");
        engine.itemize();
        engine.split_item(0, 4);
        let items = engine.items().to_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].position, 4);
        assert!(!items[1].is_shaped());
        // out of range splits are ignored
        engine.split_item(1, 5);
        assert_eq!(engine.item_count(), 2);
    }

    #[test]
    fn invalidate_drops_the_layout() {
        let mut engine = engine("abc");
        engine.itemize();
        assert_eq!(engine.item_count(), 1);
        engine.set_text("ab cd");
        assert_eq!(engine.item_count(), 3);
        assert_eq!(engine.text(), "ab cd");
    }
}
