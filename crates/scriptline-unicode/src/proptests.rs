// this_file: crates/scriptline-unicode/src/proptests.rs

use super::*;
use proptest::prelude::*;
use unicode_bidi::{BidiInfo, Level};

fn levels_for(text: &[char], rtl: bool) -> Vec<u8> {
    let mut levels = vec![0u8; text.len()];
    bidi_itemize(text, rtl, &mut levels);
    levels
}

fn strong_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::sample::select(vec!['a', 'b', 'x', 'Z']),
        prop::sample::select(vec!['\u{05d0}', '\u{05d1}', '\u{05e9}']),
        prop::sample::select(vec!['\u{0627}', '\u{0628}']),
    ]
}

// Property: printable ASCII in a left-to-right paragraph never leaves level 0
proptest! {
    #[test]
    fn prop_ascii_is_level_zero(s in "[ -~]{0,64}") {
        let text: Vec<char> = s.chars().collect();
        let mut levels = vec![0u8; text.len()];
        let has_bidi = bidi_itemize(&text, false, &mut levels);
        prop_assert!(!has_bidi);
        prop_assert!(levels.iter().all(|&l| l == 0));
    }
}

// Property: resolution is total and levels stay within the base..=max+1 band
proptest! {
    #[test]
    fn prop_levels_are_bounded(s in "\\PC{0,64}", rtl in any::<bool>()) {
        let text: Vec<char> = s.chars().collect();
        let levels = levels_for(&text, rtl);
        prop_assert_eq!(levels.len(), text.len());
        for &level in &levels {
            prop_assert!(level <= MAX_BIDI_LEVEL + 2);
        }
        if rtl {
            prop_assert!(levels.iter().all(|&l| l >= 1));
        }
    }
}

// Property: reordering is a permutation of the logical indices
proptest! {
    #[test]
    fn prop_reorder_is_permutation(levels in prop::collection::vec(0u8..6, 0..48)) {
        let mut order = reorder_levels(&levels);
        order.sort_unstable();
        prop_assert_eq!(order, (0..levels.len()).collect::<Vec<_>>());
    }
}

// Property: uniform even levels keep logical order, uniform odd levels reverse it
proptest! {
    #[test]
    fn prop_uniform_levels(len in 1usize..32, level in 0u8..4) {
        let order = reorder_levels(&vec![level; len]);
        let mut expected: Vec<usize> = (0..len).collect();
        if level % 2 == 1 {
            expected.reverse();
        }
        prop_assert_eq!(order, expected);
    }
}

// Property: strong-only text agrees with the reference implementation
proptest! {
    #[test]
    fn prop_strong_text_matches_reference(
        text in prop::collection::vec(strong_char(), 1..24),
        rtl in any::<bool>(),
    ) {
        let levels = levels_for(&text, rtl);
        let s: String = text.iter().collect();
        let base = if rtl { Level::rtl() } else { Level::ltr() };
        let info = BidiInfo::new(&s, Some(base));
        let reference: Vec<u8> = s.char_indices().map(|(byte, _)| info.levels[byte].number()).collect();
        prop_assert_eq!(levels, reference);
    }
}
