//! What a layout session is asked to do: the font it shapes with, the
//! paragraph options and the character formats laid over the text.

use std::fmt;
use std::sync::Arc;

use scriptline_core::{Fixed, FontEngine, Script};

/// Horizontal alignment of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// Paragraph direction. `Auto` follows the first strong character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextDirection {
    #[default]
    Auto,
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOptionFlags {
    /// Spaces become items of their own at the base level.
    pub show_tabs_and_spaces: bool,
    /// Line separators are drawn as U+21B5 and the last character is
    /// excluded from the width.
    pub show_line_and_paragraph_separators: bool,
    /// Trailing spaces count towards a line's text width.
    pub include_trailing_spaces: bool,
    /// `&` marks the next character as a mnemonic and is hidden when eliding.
    pub show_mnemonic: bool,
    /// Engines are asked for unhinted advances.
    pub design_metrics: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TabKind {
    #[default]
    Left,
    Right,
    Center,
    /// Aligns the delimiter character on the tab position.
    Delimiter,
}

/// An explicit tab stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    pub position: Fixed,
    pub kind: TabKind,
    pub delimiter: char,
}

impl Tab {
    pub fn new(position: Fixed, kind: TabKind) -> Self {
        Self {
            position,
            kind,
            delimiter: '\0',
        }
    }

    pub fn delimiter(position: Fixed, delimiter: char) -> Self {
        Self {
            position,
            kind: TabKind::Delimiter,
            delimiter,
        }
    }
}

/// Default distance between tab stops, in pixels.
pub const DEFAULT_TAB_STOP: i32 = 80;

/// Paragraph-level options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOption {
    pub alignment: Alignment,
    pub direction: TextDirection,
    pub flags: TextOptionFlags,
    /// Distance between default tab stops; zero or less means 80px.
    pub tab_stop: Fixed,
    /// Explicit tab stops, ascending by position.
    pub tabs: Vec<Tab>,
    /// Device scale applied to tab positions.
    pub dpi_scale: Fixed,
}

impl Default for TextOption {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            direction: TextDirection::Auto,
            flags: TextOptionFlags::default(),
            tab_stop: Fixed::from_int(DEFAULT_TAB_STOP),
            tabs: Vec::new(),
            dpi_scale: Fixed::ONE,
        }
    }
}

impl TextOption {
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_flags(mut self, flags: TextOptionFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_tab_stop(mut self, tab_stop: Fixed) -> Self {
        self.tab_stop = tab_stop;
        self
    }

    pub fn with_tabs(mut self, tabs: Vec<Tab>) -> Self {
        self.tabs = tabs;
        self
    }
}

/// Case transform applied while itemizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Capitalization {
    #[default]
    MixedCase,
    AllUppercase,
    AllLowercase,
    SmallCaps,
    Capitalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterSpacing {
    /// Added to the advance of every cluster.
    Absolute(Fixed),
    /// Percentage of the advance; 100 leaves glyphs unchanged.
    Percentage(Fixed),
}

impl Default for LetterSpacing {
    fn default() -> Self {
        LetterSpacing::Percentage(Fixed::from_int(100))
    }
}

impl LetterSpacing {
    /// Whether applying the spacing changes anything.
    pub fn is_neutral(&self) -> bool {
        match *self {
            LetterSpacing::Absolute(value) => value.is_zero(),
            LetterSpacing::Percentage(value) => value == Fixed::from_int(100),
        }
    }
}

/// The engines and spacing a session shapes with.
#[derive(Clone)]
pub struct Font {
    engine: Arc<dyn FontEngine>,
    script_engines: Vec<(Script, Arc<dyn FontEngine>)>,
    small_caps: Option<Arc<dyn FontEngine>>,
    pub letter_spacing: LetterSpacing,
    pub word_spacing: Fixed,
    pub capitalization: Capitalization,
    pub kerning: bool,
}

impl Font {
    pub fn new(engine: Arc<dyn FontEngine>) -> Self {
        Self {
            engine,
            script_engines: Vec::new(),
            small_caps: None,
            letter_spacing: LetterSpacing::default(),
            word_spacing: Fixed::ZERO,
            capitalization: Capitalization::MixedCase,
            kerning: true,
        }
    }

    /// Uses `engine` for items of `script` instead of the default engine.
    pub fn with_script_engine(mut self, script: Script, engine: Arc<dyn FontEngine>) -> Self {
        self.script_engines.retain(|(s, _)| *s != script);
        self.script_engines.push((script, engine));
        self
    }

    /// Engine for lowercase runs of small-caps text, usually a smaller size
    /// of the same face.
    pub fn with_small_caps_engine(mut self, engine: Arc<dyn FontEngine>) -> Self {
        self.small_caps = Some(engine);
        self
    }

    pub fn with_letter_spacing(mut self, spacing: LetterSpacing) -> Self {
        self.letter_spacing = spacing;
        self
    }

    pub fn with_word_spacing(mut self, spacing: Fixed) -> Self {
        self.word_spacing = spacing;
        self
    }

    pub fn with_capitalization(mut self, capitalization: Capitalization) -> Self {
        self.capitalization = capitalization;
        self
    }

    pub fn with_kerning(mut self, kerning: bool) -> Self {
        self.kerning = kerning;
        self
    }

    pub fn engine(&self) -> &Arc<dyn FontEngine> {
        &self.engine
    }

    pub fn engine_for_script(&self, script: Script) -> &Arc<dyn FontEngine> {
        self.script_engines
            .iter()
            .find(|(s, _)| *s == script)
            .map(|(_, engine)| engine)
            .unwrap_or(&self.engine)
    }

    pub fn small_caps_engine(&self) -> Option<&Arc<dyn FontEngine>> {
        self.small_caps.as_ref()
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("engine", &self.engine.name())
            .field("script_engines", &self.script_engines.len())
            .field("small_caps", &self.small_caps.as_ref().map(|e| e.name().to_string()))
            .field("letter_spacing", &self.letter_spacing)
            .field("word_spacing", &self.word_spacing)
            .field("capitalization", &self.capitalization)
            .field("kerning", &self.kerning)
            .finish()
    }
}

/// Character-level overrides for a range of text.
#[derive(Debug, Clone, Default)]
pub struct CharFormat {
    pub font: Option<Font>,
    pub capitalization: Option<Capitalization>,
}

impl CharFormat {
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_capitalization(mut self, capitalization: Capitalization) -> Self {
        self.capitalization = Some(capitalization);
        self
    }
}

/// A [`CharFormat`] applied to `length` characters from `start`. Both
/// edges become item boundaries.
#[derive(Debug, Clone)]
pub struct FormatRange {
    pub start: usize,
    pub length: usize,
    pub format: CharFormat,
}

impl FormatRange {
    pub fn new(start: usize, length: usize, format: CharFormat) -> Self {
        Self { start, length, format }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end()
    }
}

/// Where [`crate::TextEngine::elided_text`] cuts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ElideMode {
    Left,
    #[default]
    Right,
    Middle,
    None,
}

/// Visual cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOperation {
    Left,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let option = TextOption::default();
        assert_eq!(option.tab_stop, Fixed::from_int(80));
        assert_eq!(option.dpi_scale, Fixed::ONE);
        assert!(LetterSpacing::default().is_neutral());
        assert!(!LetterSpacing::Absolute(Fixed::ONE).is_neutral());
    }

    #[test]
    fn format_range_edges() {
        let range = FormatRange::new(2, 3, CharFormat::default());
        assert_eq!(range.end(), 5);
        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }
}
