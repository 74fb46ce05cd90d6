// this_file: crates/scriptline-unicode/src/mirror.rs

//! Mirrored glyph substitution for right-to-left runs.

/// Returns the mirrored counterpart of `ch`, or `ch` itself.
///
/// Covers paired brackets, comparison operators and the guillemets, the
/// characters whose glyphs read wrong when a run is drawn right to left.
pub fn mirrored(ch: char) -> char {
    match ch {
        '(' => ')',
        ')' => '(',
        '<' => '>',
        '>' => '<',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '\u{00ab}' => '\u{00bb}',
        '\u{00bb}' => '\u{00ab}',
        '\u{2039}' => '\u{203a}',
        '\u{203a}' => '\u{2039}',
        '\u{2045}' => '\u{2046}',
        '\u{2046}' => '\u{2045}',
        '\u{207d}' => '\u{207e}',
        '\u{207e}' => '\u{207d}',
        '\u{208d}' => '\u{208e}',
        '\u{208e}' => '\u{208d}',
        '\u{2264}' => '\u{2265}',
        '\u{2265}' => '\u{2264}',
        '\u{2208}' => '\u{220b}',
        '\u{220b}' => '\u{2208}',
        '\u{27e8}' => '\u{27e9}',
        '\u{27e9}' => '\u{27e8}',
        '\u{27ea}' => '\u{27eb}',
        '\u{27eb}' => '\u{27ea}',
        '\u{27ec}' => '\u{27ed}',
        '\u{27ed}' => '\u{27ec}',
        '\u{27ee}' => '\u{27ef}',
        '\u{27ef}' => '\u{27ee}',
        '\u{3008}' => '\u{3009}',
        '\u{3009}' => '\u{3008}',
        '\u{300a}' => '\u{300b}',
        '\u{300b}' => '\u{300a}',
        '\u{300c}' => '\u{300d}',
        '\u{300d}' => '\u{300c}',
        '\u{300e}' => '\u{300f}',
        '\u{300f}' => '\u{300e}',
        '\u{3010}' => '\u{3011}',
        '\u{3011}' => '\u{3010}',
        '\u{ff08}' => '\u{ff09}',
        '\u{ff09}' => '\u{ff08}',
        '\u{ff3b}' => '\u{ff3d}',
        '\u{ff3d}' => '\u{ff3b}',
        '\u{ff5b}' => '\u{ff5d}',
        '\u{ff5d}' => '\u{ff5b}',
        _ => ch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_swap() {
        assert_eq!(mirrored('('), ')');
        assert_eq!(mirrored(']'), '[');
        assert_eq!(mirrored('\u{00ab}'), '\u{00bb}');
    }

    #[test]
    fn mirroring_is_an_involution() {
        for ch in ['(', '<', '{', '\u{2264}', '\u{300c}', 'a', '1'] {
            assert_eq!(mirrored(mirrored(ch)), ch);
        }
    }
}
