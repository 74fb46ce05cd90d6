//! Per-character analysis and the items the itemizer produces.

use crate::fixed::Fixed;
use icu_properties::props::Script;

/// Special handling a run of characters needs.
///
/// The order is significant: everything at or above [`AnalysisFlags::Space`]
/// is a space, tab or object, everything at or above [`AnalysisFlags::Tab`]
/// is a tab or object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnalysisFlags {
    #[default]
    None,
    Lowercase,
    Uppercase,
    SmallCaps,
    LineOrParagraphSeparator,
    Space,
    Tab,
    Object,
}

impl AnalysisFlags {
    pub fn is_space_tab_or_object(self) -> bool {
        self >= AnalysisFlags::Space
    }

    pub fn is_tab_or_object(self) -> bool {
        self >= AnalysisFlags::Tab
    }

    /// Case transforms applied to the text before it is shaped.
    pub fn is_case_transform(self) -> bool {
        matches!(
            self,
            AnalysisFlags::Lowercase | AnalysisFlags::Uppercase | AnalysisFlags::SmallCaps
        )
    }
}

/// Script, embedding level and flags of one character or one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptAnalysis {
    pub script: Script,
    pub bidi_level: u8,
    pub flags: AnalysisFlags,
}

impl Default for ScriptAnalysis {
    fn default() -> Self {
        Self {
            script: Script::Common,
            bidi_level: 0,
            flags: AnalysisFlags::None,
        }
    }
}

impl ScriptAnalysis {
    pub fn is_right_to_left(&self) -> bool {
        self.bidi_level % 2 == 1
    }
}

/// A maximal run of characters sharing one analysis.
///
/// The glyph fields stay zero until the item is shaped; an item with
/// `num_glyphs == 0` is unshaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptItem {
    /// Index of the first character.
    pub position: usize,
    pub analysis: ScriptAnalysis,
    pub num_glyphs: usize,
    pub ascent: Fixed,
    pub descent: Fixed,
    pub leading: Fixed,
    pub width: Fixed,
    /// Index of the first glyph in the session's glyph buffer.
    pub glyph_data_offset: usize,
}

impl ScriptItem {
    pub fn new(position: usize, analysis: ScriptAnalysis) -> Self {
        Self {
            position,
            analysis,
            ..Self::default()
        }
    }

    pub fn is_shaped(&self) -> bool {
        self.num_glyphs != 0
    }

    /// Height of the item's line box.
    pub fn height(&self) -> Fixed {
        self.ascent + self.descent
    }
}

/// Bounding box of a glyph or glyph run relative to the pen position.
///
/// `width` is the ink width, `xoff` the advance the run moves the pen by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub x: Fixed,
    pub y: Fixed,
    pub width: Fixed,
    pub height: Fixed,
    pub xoff: Fixed,
    pub yoff: Fixed,
}

impl GlyphMetrics {
    pub fn new(x: Fixed, y: Fixed, width: Fixed, height: Fixed, xoff: Fixed, yoff: Fixed) -> Self {
        Self {
            x,
            y,
            width,
            height,
            xoff,
            yoff,
        }
    }

    pub fn right(&self) -> Fixed {
        self.x + self.width
    }

    pub fn bottom(&self) -> Fixed {
        self.y + self.height
    }
}

/// Options passed from the layout session to a font engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShaperFlags {
    /// The run is right-to-left; mirrorable characters are mirrored.
    pub right_to_left: bool,
    /// Only glyph indices are wanted; advances may be left untouched.
    pub glyph_indices_only: bool,
    /// Use unhinted design metrics for advances.
    pub design_metrics: bool,
}

impl ShaperFlags {
    pub fn rtl() -> Self {
        Self {
            right_to_left: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_order_groups_spaces_tabs_and_objects() {
        assert!(AnalysisFlags::Space.is_space_tab_or_object());
        assert!(AnalysisFlags::Tab.is_space_tab_or_object());
        assert!(AnalysisFlags::Object.is_tab_or_object());
        assert!(!AnalysisFlags::Space.is_tab_or_object());
        assert!(!AnalysisFlags::LineOrParagraphSeparator.is_space_tab_or_object());
        assert!(AnalysisFlags::SmallCaps.is_case_transform());
        assert!(!AnalysisFlags::None.is_case_transform());
    }

    #[test]
    fn new_items_are_unshaped() {
        let item = ScriptItem::new(4, ScriptAnalysis::default());
        assert_eq!(item.position, 4);
        assert!(!item.is_shaped());
        assert!(!item.analysis.is_right_to_left());
    }
}
