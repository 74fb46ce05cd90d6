// this_file: crates/scriptline-unicode/src/segment.rs

//! Grapheme and word boundaries, reported per character.

use icu_segmenter::{options::WordBreakInvariantOptions, GraphemeClusterSegmenter, WordSegmenter};

/// Per-character break attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharAttributes {
    /// The character is whitespace.
    pub white_space: bool,
    /// A cursor may stop before this character (grapheme cluster start).
    pub char_stop: bool,
    /// A word boundary lies before this character.
    pub word_boundary: bool,
}

/// Maps byte offsets reported by ICU onto character indices.
fn char_index_of_bytes(text: &str) -> Vec<usize> {
    let mut map = vec![0usize; text.len() + 1];
    let mut index = 0;
    for (byte, ch) in text.char_indices() {
        for slot in &mut map[byte..byte + ch.len_utf8()] {
            *slot = index;
        }
        index += 1;
    }
    map[text.len()] = index;
    map
}

/// Computes [`CharAttributes`] for every character of `text`.
pub fn char_attributes(text: &[char]) -> Vec<CharAttributes> {
    let mut attributes: Vec<CharAttributes> = text
        .iter()
        .map(|ch| CharAttributes {
            white_space: ch.is_whitespace(),
            ..CharAttributes::default()
        })
        .collect();
    if text.is_empty() {
        return attributes;
    }

    let string: String = text.iter().collect();
    let byte_to_char = char_index_of_bytes(&string);

    for offset in GraphemeClusterSegmenter::new().segment_str(&string) {
        let index = byte_to_char[offset];
        if let Some(attr) = attributes.get_mut(index) {
            attr.char_stop = true;
        }
    }
    for offset in WordSegmenter::new_auto(WordBreakInvariantOptions::default()).segment_str(&string) {
        let index = byte_to_char[offset];
        if let Some(attr) = attributes.get_mut(index) {
            attr.word_boundary = true;
        }
    }

    attributes
}

/// Reports where words start, used for title-casing.
pub trait WordBoundaryFinder: Send + Sync {
    /// Indices of word-initial characters, ascending.
    fn word_starts(&self, text: &[char]) -> Vec<usize>;
}

/// [`WordBoundaryFinder`] on the ICU word segmenter. A boundary counts as a
/// word start when the character after it is alphanumeric.
#[derive(Debug, Default, Clone, Copy)]
pub struct IcuWordBoundaryFinder;

impl WordBoundaryFinder for IcuWordBoundaryFinder {
    fn word_starts(&self, text: &[char]) -> Vec<usize> {
        if text.is_empty() {
            return Vec::new();
        }
        let string: String = text.iter().collect();
        let byte_to_char = char_index_of_bytes(&string);
        let mut starts: Vec<usize> = WordSegmenter::new_auto(WordBreakInvariantOptions::default())
            .segment_str(&string)
            .map(|offset| byte_to_char[offset])
            .filter(|&index| text.get(index).is_some_and(|ch| ch.is_alphanumeric()))
            .collect();
        starts.dedup();
        starts
    }
}
