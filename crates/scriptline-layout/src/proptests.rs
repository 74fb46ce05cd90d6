// this_file: crates/scriptline-layout/src/proptests.rs

use super::*;
use proptest::prelude::*;
use scriptline_core::Fixed;
use scriptline_engine_box::BoxEngine;
use std::sync::Arc;

fn session(text: &str) -> TextEngine {
    TextEngine::new(text, Font::new(Arc::new(BoxEngine::new(10))))
}

fn mixed_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!['a', 'b', ' ', '\t', '.', '1', '\u{05d0}', '\u{0628}', '\u{0301}', '\u{00ad}']),
        0..48,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

// Property: items tile the text in order and never exceed the run cap
proptest! {
    #[test]
    fn prop_items_tile_the_text(text in mixed_text()) {
        let mut engine = session(&text);
        let len = text.chars().count();
        let items = engine.items().to_vec();
        if len == 0 {
            prop_assert!(items.is_empty());
        } else {
            prop_assert_eq!(items[0].position, 0);
            for pair in items.windows(2) {
                prop_assert!(pair[0].position < pair[1].position);
            }
            for i in 0..items.len() {
                let length = engine.item_length(i);
                prop_assert!(length > 0 && length <= MAX_ITEM_LENGTH);
            }
        }
    }
}

// Property: a width never depends on which items were shaped before
proptest! {
    #[test]
    fn prop_width_ignores_shaping_order(text in mixed_text(), from in 0usize..48, len in 0usize..48) {
        let mut fresh = session(&text);
        let expected = fresh.width(from, len);

        let mut shaped = session(&text);
        let count = shaped.item_count();
        for item in (0..count).rev() {
            shaped.shape(item);
        }
        prop_assert_eq!(shaped.width(from, len), expected);
    }
}

// Property: splitting a shaped item conserves glyphs and width and re-bases
// the tail's clusters
proptest! {
    #[test]
    fn prop_split_conserves_glyphs(word in "[a-z]{2,24}", at in 1usize..24) {
        let mut engine = session(&word);
        engine.shape(0);
        let before = engine.items()[0];
        let at = at.min(word.len() - 1);

        engine.split_item(0, at);
        let items = engine.items().to_vec();
        prop_assert_eq!(items.len(), 2);
        prop_assert_eq!(items[0].num_glyphs + items[1].num_glyphs, before.num_glyphs);
        prop_assert_eq!(items[0].width + items[1].width, before.width);
        prop_assert_eq!(engine.log_clusters(1)[0], 0);
    }
}

// Property: justification hands out exactly the missing width, only inside
// the line
proptest! {
    #[test]
    fn prop_justification_fills_the_line(words in prop::collection::vec("[a-z]{1,6}", 3..8), slack in 0i32..200) {
        let text = words.join(" ");
        let first_line = words[0].len() + 1 + words[1].len() + 1;
        let option = TextOption::default().with_alignment(Alignment::Justify);
        let mut engine = session(&text).with_option(option);

        let natural = engine.measure_line(0, first_line, Fixed::MAX).text_width;
        let line = engine.measure_line(0, first_line, natural + Fixed::from_int(slack));
        let index = engine.add_line(line);
        engine.justify(index);
        prop_assert!(engine.lines()[index].justified);

        let used = engine.layout_data().used;
        let glyphs = engine.layout_data().glyphs.layout(0, used);
        let added: Fixed = glyphs.justifications.iter().map(|j| j.extra_space()).sum();
        prop_assert_eq!(added, Fixed::from_int(slack));

        let outside: Fixed = (0..engine.item_count())
            .filter(|&i| engine.layout_data().items[i].position >= first_line)
            .map(|i| engine.shaped_glyphs(i).justifications.iter().map(|j| j.extra_space()).sum::<Fixed>())
            .sum();
        prop_assert_eq!(outside, Fixed::ZERO);
    }
}
