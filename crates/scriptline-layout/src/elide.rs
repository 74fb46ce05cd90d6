//! Shortening text to a width with an ellipsis.

use scriptline_core::{Fixed, GlyphBuffer, Script, ShaperFlags};
use scriptline_unicode::props::{self, is_nonspacing_mark, Joining, ELLIPSIS, ZWJ};

use crate::engine::TextEngine;
use crate::options::{ElideMode, TextOptionFlags};

const THREE_DOTS: [char; 3] = ['.', '.', '.'];

/// Whether the first character at or after `pos`, marks skipped, joins
/// to its neighbours.
fn next_char_joins(string: &[char], mut pos: usize) -> bool {
    while pos < string.len() && is_nonspacing_mark(string[pos]) {
        pos += 1;
    }
    pos < string.len() && props::joining(string[pos]) != Joining::None
}

/// Whether the last character before `pos`, marks skipped, joins to the
/// character after it.
fn prev_char_joins(string: &[char], mut pos: usize) -> bool {
    while pos > 0 && is_nonspacing_mark(string[pos - 1]) {
        pos -= 1;
    }
    pos > 0 && matches!(props::joining(string[pos - 1]), Joining::Dual | Joining::Causing)
}

impl TextEngine {
    /// Hides `&` mnemonic markers: the marker stops printing and the
    /// character it marks is no longer a cursor stop or whitespace. `&&`
    /// is a literal ampersand.
    fn hide_mnemonics(&mut self) {
        self.ensure_attributes();
        let len = self.layout.string.len();
        let mut i = 0;
        while i + 1 < len {
            if self.layout.string[i] == '&' {
                if let Some(item) = self.layout.find_item(i) {
                    self.shape(item);
                    let si = self.layout.items[item];
                    let glyph = self.layout.log_clusters[i];
                    if si.is_shaped() && glyph < si.num_glyphs {
                        let glyphs = self.layout.glyphs.layout_mut(si.glyph_data_offset, si.num_glyphs);
                        glyphs.attributes[glyph].dont_print = true;
                    }
                }
                if let Some(attr) = self.layout.attributes.as_mut().and_then(|a| a.get_mut(i + 1)) {
                    attr.char_stop = false;
                    attr.white_space = false;
                }
                if self.layout.string[i + 1] == '&' {
                    i += 1;
                }
            }
            i += 1;
        }
    }

    fn next_char_stop(&self, pos: usize) -> usize {
        let len = self.layout.string.len();
        let mut next = pos + 1;
        while next < len && !self.attribute(next).char_stop {
            next += 1;
        }
        next.min(len)
    }

    fn previous_char_stop(&self, pos: usize) -> usize {
        let mut previous = pos.saturating_sub(1);
        while previous > 0 && !self.attribute(previous).char_stop {
            previous -= 1;
        }
        previous
    }

    /// The ellipsis and its width, from the engine used for common-script
    /// text. Falls back to three dots when U+2026 has no glyph.
    fn ellipsis(&self) -> Option<(Vec<char>, Fixed)> {
        let engine = self.font.engine_for_script(Script::Common).clone();
        let primary = if engine.sub_engine_count() > 0 {
            engine.sub_engine(0).unwrap_or_else(|| engine.clone())
        } else {
            engine.clone()
        };

        let mut buffer = GlyphBuffer::with_len(THREE_DOTS.len()).ok()?;
        if primary.can_render(&[ELLIPSIS]) {
            let mut glyphs = buffer.layout_mut(0, 1);
            if let Ok(1) = primary.string_to_cmap(&[ELLIPSIS], &mut glyphs, ShaperFlags::default()) {
                if glyphs.glyphs[0] != 0 {
                    return Some((vec![ELLIPSIS], glyphs.advances_x[0]));
                }
            }
        }

        let mut glyphs = buffer.layout_mut(0, THREE_DOTS.len());
        let n = engine.string_to_cmap(&THREE_DOTS, &mut glyphs, ShaperFlags::default()).ok()?;
        let width = glyphs.advances_x[..n.min(THREE_DOTS.len())].iter().copied().sum();
        Some((THREE_DOTS.to_vec(), width))
    }

    /// The text shortened to fit `width`, an ellipsis standing in for what
    /// was cut. Cuts fall on character stops and a segment is kept as long
    /// as the kept text and the ellipsis stay within `width`.
    ///
    /// Returns the text unchanged when it fits, is at most one character
    /// long or `mode` is [`ElideMode::None`], and an empty string when not
    /// even the ellipsis fits.
    pub fn elided_text(&mut self, mode: ElideMode, width: Fixed, flags: TextOptionFlags) -> String {
        self.itemize();
        if flags.show_mnemonic {
            self.hide_mnemonics();
        }
        self.ensure_attributes();

        let len = self.layout.string.len();
        if mode == ElideMode::None || len <= 1 || self.width(0, len) <= width {
            return self.layout.string.iter().collect();
        }

        let Some((mut ellipsis, ellipsis_width)) = self.ellipsis() else {
            return self.layout.string.iter().collect();
        };
        let available = width - ellipsis_width;
        if available < Fixed::ZERO {
            return String::new();
        }

        let string = self.layout.string.clone();
        let result: Vec<char> = match mode {
            ElideMode::Right => {
                let mut current = Fixed::ZERO;
                let mut pos = 0;
                while pos < len {
                    let next = self.next_char_stop(pos);
                    let segment = self.width(pos, next - pos);
                    if current + segment > available {
                        break;
                    }
                    current += segment;
                    pos = next;
                }
                if next_char_joins(&string, pos) {
                    ellipsis.insert(0, ZWJ);
                }
                string[..pos].iter().chain(&ellipsis).copied().collect()
            },
            ElideMode::Left => {
                let mut current = Fixed::ZERO;
                let mut pos = len;
                while pos > 0 {
                    let previous = self.previous_char_stop(pos);
                    let segment = self.width(previous, pos - previous);
                    if current + segment > available {
                        break;
                    }
                    current += segment;
                    pos = previous;
                }
                if prev_char_joins(&string, pos) {
                    ellipsis.push(ZWJ);
                }
                ellipsis.iter().chain(&string[pos..]).copied().collect()
            },
            ElideMode::Middle => {
                let mut current = Fixed::ZERO;
                let mut left_pos = 0;
                let mut right_pos = len;
                while left_pos < right_pos {
                    let next_left = self.next_char_stop(left_pos);
                    let next_right = self.previous_char_stop(right_pos);
                    if next_left > next_right {
                        break;
                    }
                    let segments = self.width(left_pos, next_left - left_pos) + self.width(next_right, right_pos - next_right);
                    if current + segments > available {
                        break;
                    }
                    current += segments;
                    left_pos = next_left;
                    right_pos = next_right;
                }
                if next_char_joins(&string, left_pos) {
                    ellipsis.insert(0, ZWJ);
                }
                if prev_char_joins(&string, right_pos) {
                    ellipsis.push(ZWJ);
                }
                string[..left_pos]
                    .iter()
                    .chain(&ellipsis)
                    .chain(&string[right_pos..])
                    .copied()
                    .collect()
            },
            ElideMode::None => string.clone(),
        };

        log::debug!("elided {} characters to {} ({:?})", len, result.len(), mode);
        result.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Font;
    use scriptline_engine_box::BoxEngine;
    use std::sync::Arc;

    fn engine(text: &str) -> TextEngine {
        TextEngine::new(text, Font::new(Arc::new(BoxEngine::new(10))))
    }

    fn elide(text: &str, mode: ElideMode, width: i32) -> String {
        engine(text).elided_text(mode, Fixed::from_int(width), TextOptionFlags::default())
    }

    #[test]
    fn right_elision_keeps_the_head() {
        assert_eq!(elide("abcdefghij", ElideMode::Right, 40), "abc\u{2026}");
    }

    #[test]
    fn left_and_middle_elision() {
        assert_eq!(elide("abcdefghij", ElideMode::Left, 40), "\u{2026}hij");
        assert_eq!(elide("abcdefghij", ElideMode::Middle, 50), "ab\u{2026}ij");
    }

    #[test]
    fn fitting_or_trivial_text_is_unchanged() {
        assert_eq!(elide("abc", ElideMode::Right, 30), "abc");
        assert_eq!(elide("abcdef", ElideMode::None, 10), "abcdef");
        assert_eq!(elide("a", ElideMode::Right, 1), "a");
    }

    #[test]
    fn no_room_for_the_ellipsis() {
        assert_eq!(elide("abcdef", ElideMode::Right, 5), "");
    }

    #[test]
    fn three_dots_without_an_ellipsis_glyph() {
        let font = Font::new(Arc::new(BoxEngine::new(10).with_missing([ELLIPSIS])));
        let mut engine = TextEngine::new("abcdefghij", font);
        let elided = engine.elided_text(ElideMode::Right, Fixed::from_int(60), TextOptionFlags::default());
        assert_eq!(elided, "abc...");
    }

    #[test]
    fn mnemonic_markers_take_no_space() {
        let flags = TextOptionFlags {
            show_mnemonic: true,
            ..TextOptionFlags::default()
        };
        let mut engine = engine("&File");
        // four visible characters fit in 40
        assert_eq!(engine.elided_text(ElideMode::Right, Fixed::from_int(40), flags), "&File");
    }

    #[test]
    fn joining_neighbours() {
        let beh = '\u{0628}';
        assert!(next_char_joins(&[beh], 0));
        assert!(!next_char_joins(&['a'], 0));
        assert!(prev_char_joins(&[beh, '\u{064e}'], 2));
        assert!(!prev_char_joins(&['\u{0627}'], 1));
        assert!(!prev_char_joins(&[], 0));
    }
}
