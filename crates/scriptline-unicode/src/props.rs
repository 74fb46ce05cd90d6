// this_file: crates/scriptline-unicode/src/props.rs

//! Character property lookups backed by ICU's compiled data.
//!
//! The layout engine reasons about characters in terms of a handful of
//! coarse classes (bidi category, joining behaviour, a few general
//! categories). These helpers collapse ICU's richer property values into
//! those classes so the rest of the workspace never touches ICU directly.

use icu_properties::props::{BidiClass, GeneralCategory, JoiningType, Script};
use icu_properties::{CodePointMapData, PropertyNamesShort};

/// Bidirectional character type as consumed by the run resolver.
///
/// Isolate controls (LRI, RLI, FSI, PDI) are reported as [`BidiCategory::On`]:
/// the resolver only implements embeddings and overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BidiCategory {
    /// Strong left-to-right
    L,
    /// Strong right-to-left
    R,
    /// Arabic letter
    Al,
    /// European number
    En,
    /// European number separator
    Es,
    /// European number terminator
    Et,
    /// Arabic number
    An,
    /// Common number separator
    Cs,
    /// Paragraph separator
    B,
    /// Segment separator
    S,
    /// Whitespace
    Ws,
    /// Other neutral
    On,
    /// Left-to-right embedding
    Lre,
    /// Left-to-right override
    Lro,
    /// Right-to-left embedding
    Rle,
    /// Right-to-left override
    Rlo,
    /// Pop directional format
    Pdf,
    /// Nonspacing mark
    Nsm,
    /// Boundary neutral
    Bn,
}

impl BidiCategory {
    /// True for the strong types L, R and AL.
    pub fn is_strong(self) -> bool {
        matches!(self, BidiCategory::L | BidiCategory::R | BidiCategory::Al)
    }
}

/// Cursive joining behaviour, reduced to what elision needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joining {
    None,
    Dual,
    Right,
    Left,
    Causing,
}

pub fn bidi_category(ch: char) -> BidiCategory {
    match CodePointMapData::<BidiClass>::new().get(ch) {
        BidiClass::LeftToRight => BidiCategory::L,
        BidiClass::RightToLeft => BidiCategory::R,
        BidiClass::ArabicLetter => BidiCategory::Al,
        BidiClass::EuropeanNumber => BidiCategory::En,
        BidiClass::EuropeanSeparator => BidiCategory::Es,
        BidiClass::EuropeanTerminator => BidiCategory::Et,
        BidiClass::ArabicNumber => BidiCategory::An,
        BidiClass::CommonSeparator => BidiCategory::Cs,
        BidiClass::ParagraphSeparator => BidiCategory::B,
        BidiClass::SegmentSeparator => BidiCategory::S,
        BidiClass::WhiteSpace => BidiCategory::Ws,
        BidiClass::LeftToRightEmbedding => BidiCategory::Lre,
        BidiClass::LeftToRightOverride => BidiCategory::Lro,
        BidiClass::RightToLeftEmbedding => BidiCategory::Rle,
        BidiClass::RightToLeftOverride => BidiCategory::Rlo,
        BidiClass::PopDirectionalFormat => BidiCategory::Pdf,
        BidiClass::NonspacingMark => BidiCategory::Nsm,
        BidiClass::BoundaryNeutral => BidiCategory::Bn,
        _ => BidiCategory::On,
    }
}

pub fn general_category(ch: char) -> GeneralCategory {
    CodePointMapData::<GeneralCategory>::new().get(ch)
}

pub fn script(ch: char) -> Script {
    CodePointMapData::<Script>::new().get(ch)
}

/// ISO 15924 tag of `script`, for handing to a shaper. `None` for
/// Common, Inherited and Unknown, which carry no shaping rules of their own.
pub fn iso15924_tag(script: Script) -> Option<[u8; 4]> {
    if matches!(script, Script::Common | Script::Inherited | Script::Unknown) {
        return None;
    }
    let name = PropertyNamesShort::<Script>::new().get(script)?;
    name.as_bytes().try_into().ok()
}

pub fn joining(ch: char) -> Joining {
    match CodePointMapData::<JoiningType>::new().get(ch) {
        JoiningType::DualJoining => Joining::Dual,
        JoiningType::RightJoining => Joining::Right,
        JoiningType::LeftJoining => Joining::Left,
        JoiningType::JoinCausing => Joining::Causing,
        _ => Joining::None,
    }
}

pub fn is_nonspacing_mark(ch: char) -> bool {
    general_category(ch) == GeneralCategory::NonspacingMark
}

pub fn is_lowercase_letter(ch: char) -> bool {
    general_category(ch) == GeneralCategory::LowercaseLetter
}

pub fn is_space_separator(ch: char) -> bool {
    general_category(ch) == GeneralCategory::SpaceSeparator
}

/// Zero-width and directional format characters that never produce ink:
/// ZWSP/ZWNJ/ZWJ/LRM/RLM, the separators and embedding controls in
/// U+2028..=U+202F, and the deprecated shaping controls U+206A..=U+206F.
pub fn is_control(ch: char) -> bool {
    let cp = ch as u32;
    (0x200b..=0x200f).contains(&cp)
        || (0x2028..=0x202f).contains(&cp)
        || (0x206a..=0x206f).contains(&cp)
}

/// Soft hyphen; hidden unless it ends a line.
pub const SOFT_HYPHEN: char = '\u{00ad}';
/// Placeholder for inline objects.
pub const OBJECT_REPLACEMENT: char = '\u{fffc}';
pub const LINE_SEPARATOR: char = '\u{2028}';
pub const NBSP: char = '\u{00a0}';
pub const ZWJ: char = '\u{200d}';
pub const ELLIPSIS: char = '\u{2026}';
pub const KASHIDA: char = '\u{0640}';
