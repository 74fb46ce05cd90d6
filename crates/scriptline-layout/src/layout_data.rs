//! Per-session layout state: the items, the shared glyph arena and the
//! per-character log clusters.

use scriptline_core::{GlyphBuffer, GlyphLayout, ScriptItem};
use scriptline_unicode::CharAttributes;

/// Whether the session can still lay out text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutState {
    #[default]
    Empty,
    /// Glyph storage hit its size limit. Permanent until the session is
    /// invalidated; every later query answers with empty metrics.
    Failed,
}

/// Everything derived from the text of one session.
#[derive(Debug, Clone, Default)]
pub struct LayoutData {
    /// Characters as shaped; line separators may have been replaced by a
    /// visible glyph.
    pub string: Vec<char>,
    pub items: Vec<ScriptItem>,
    pub glyphs: GlyphBuffer,
    /// Glyph slots handed out to shaped items so far.
    pub used: usize,
    /// One entry per character: its glyph, relative to the item's first glyph.
    pub log_clusters: Vec<usize>,
    pub attributes: Option<Vec<CharAttributes>>,
    pub has_bidi: bool,
    pub state: LayoutState,
}

impl LayoutData {
    pub fn new(text: &[char]) -> Self {
        Self {
            string: text.to_vec(),
            log_clusters: vec![0; text.len()],
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.state == LayoutState::Failed
    }

    /// Makes room for `num_glyphs` glyphs past the used ones.
    ///
    /// Grows by half again plus slack, rounded to 16 glyphs. Returns
    /// `false` and switches to [`LayoutState::Failed`] when the buffer
    /// would exceed its size limit.
    pub fn ensure_space(&mut self, num_glyphs: usize) -> bool {
        if self.is_failed() {
            return false;
        }
        if self.glyphs.len().saturating_sub(self.used) >= num_glyphs {
            return true;
        }
        let new_len = self
            .used
            .checked_add(num_glyphs)
            .and_then(|n| n.checked_mul(3))
            .map(|n| n / 2)
            .and_then(|n| n.checked_add(15))
            .map(|n| (n >> 4) << 4);
        let grown = match new_len {
            Some(len) => self.glyphs.reallocate(len).is_ok(),
            None => false,
        };
        if !grown {
            log::warn!(
                "layout failed: {} glyphs requested with {} in use",
                num_glyphs,
                self.used
            );
            self.state = LayoutState::Failed;
        }
        grown
    }

    /// Length in characters of item `item`.
    pub fn item_length(&self, item: usize) -> usize {
        let Some(si) = self.items.get(item) else {
            return 0;
        };
        let end = self
            .items
            .get(item + 1)
            .map_or(self.string.len(), |next| next.position);
        end.saturating_sub(si.position)
    }

    /// Index of the item holding character `pos`; the last item for
    /// positions past the end. `None` without items.
    pub fn find_item(&self, pos: usize) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.items.partition_point(|si| si.position <= pos).saturating_sub(1))
    }

    /// Log clusters of item `item`, one per character.
    pub fn log_clusters(&self, item: usize) -> &[usize] {
        let Some(si) = self.items.get(item) else {
            return &[];
        };
        let start = si.position.min(self.log_clusters.len());
        let end = (si.position + self.item_length(item)).min(self.log_clusters.len());
        &self.log_clusters[start..end]
    }

    /// Glyphs of a shaped item.
    pub fn shaped_glyphs(&self, item: usize) -> GlyphLayout<'_> {
        match self.items.get(item) {
            Some(si) => self.glyphs.layout(si.glyph_data_offset, si.num_glyphs),
            None => self.glyphs.layout(0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptline_core::ScriptAnalysis;

    fn data(text: &str, starts: &[usize]) -> LayoutData {
        let chars: Vec<char> = text.chars().collect();
        let mut data = LayoutData::new(&chars);
        data.items = starts
            .iter()
            .map(|&pos| ScriptItem::new(pos, ScriptAnalysis::default()))
            .collect();
        data
    }

    #[test]
    fn growth_rounds_to_sixteen() {
        let mut data = LayoutData::new(&[]);
        assert!(data.ensure_space(5));
        assert_eq!(data.glyphs.len(), 16);
        data.used = 16;
        assert!(data.ensure_space(20));
        assert_eq!(data.glyphs.len(), 64);
        // enough room already
        assert!(data.ensure_space(48));
        assert_eq!(data.glyphs.len(), 64);
    }

    #[test]
    fn oversized_request_fails_without_allocating() {
        let mut data = LayoutData::new(&[]);
        assert!(!data.ensure_space(usize::MAX / 2));
        assert!(data.is_failed());
        assert!(data.glyphs.is_empty());
        // failure is sticky
        assert!(!data.ensure_space(1));
    }

    #[test]
    fn items_are_found_by_position() {
        let data = data("hello world", &[0, 5, 6]);
        assert_eq!(data.find_item(0), Some(0));
        assert_eq!(data.find_item(4), Some(0));
        assert_eq!(data.find_item(5), Some(1));
        assert_eq!(data.find_item(10), Some(2));
        assert_eq!(data.find_item(99), Some(2));
        assert_eq!(data.item_length(0), 5);
        assert_eq!(data.item_length(1), 1);
        assert_eq!(data.item_length(2), 5);
        assert_eq!(data.item_length(3), 0);
        assert_eq!(LayoutData::new(&[]).find_item(0), None);
    }
}
