//! Shaping against a real font when one is available on the machine.
//!
//! Set `SCRIPTLINE_TEST_FONT` to a .ttf/.otf path, otherwise a few common
//! system locations are tried. Without any font the tests return early.

use std::path::PathBuf;

use scriptline_core::{Fixed, FontEngine, GlyphBuffer, Script, ShaperFlags, ShapingRequest};
use scriptline_engine_sfnt::SfntEngine;

const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn test_font() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SCRIPTLINE_TEST_FONT") {
        return Some(PathBuf::from(path));
    }
    CANDIDATES.iter().map(PathBuf::from).find(|path| path.exists())
}

fn engine() -> Option<SfntEngine> {
    let path = test_font()?;
    SfntEngine::from_file(&path, Fixed::from_int(16)).ok()
}

#[test]
fn metrics_are_positive() {
    let Some(engine) = engine() else {
        return;
    };
    assert!(engine.ascent() > Fixed::ZERO);
    assert!(engine.descent() >= Fixed::ZERO);
    assert!(engine.units_per_em() > 0);
    assert!(engine.cache_cost() > 0);
    assert!(engine.can_render(&['a', 'b']));
}

#[test]
fn cmap_and_shaper_agree_on_simple_latin() {
    let Some(engine) = engine() else {
        return;
    };
    let text: Vec<char> = "Hello".chars().collect();

    let mut mapped = GlyphBuffer::with_len(text.len()).unwrap();
    let n = engine
        .string_to_cmap(&text, &mut mapped.layout_mut(0, text.len()), ShaperFlags::default())
        .unwrap();
    assert_eq!(n, text.len());
    assert!(mapped.layout(0, n).glyphs.iter().all(|&g| g != 0));

    let mut shaped = GlyphBuffer::with_len(text.len() * 2).unwrap();
    let mut clusters = vec![0; text.len()];
    let request = ShapingRequest::new(&text, Script::Latin, 0);
    let run = engine
        .shape(&request, &mut shaped.layout_mut(0, text.len() * 2), &mut clusters)
        .unwrap();
    assert_eq!(run.num_glyphs, text.len());
    assert_eq!(clusters, vec![0, 1, 2, 3, 4]);
    let layout = shaped.layout(0, run.num_glyphs);
    assert!(layout.attributes.iter().all(|a| a.cluster_start));
    assert!(layout.total_advance() > Fixed::ZERO);
}

#[test]
fn rtl_output_is_stored_in_logical_order() {
    let Some(engine) = engine() else {
        return;
    };
    let text: Vec<char> = "abc".chars().collect();
    let mut buffer = GlyphBuffer::with_len(8).unwrap();
    let mut clusters = vec![0; 3];
    let request = ShapingRequest::new(&text, Script::Latin, 1);
    let run = engine.shape(&request, &mut buffer.layout_mut(0, 8), &mut clusters).unwrap();
    assert_eq!(run.num_glyphs, 3);
    assert!(clusters.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn tiny_buffer_reports_the_need() {
    let Some(engine) = engine() else {
        return;
    };
    let text: Vec<char> = "Hello".chars().collect();
    let mut buffer = GlyphBuffer::with_len(2).unwrap();
    let mut clusters = vec![0; text.len()];
    let request = ShapingRequest::new(&text, Script::Latin, 0);
    let err = engine
        .shape(&request, &mut buffer.layout_mut(0, 2), &mut clusters)
        .unwrap_err();
    assert_eq!(err.needed_glyphs(), Some(5));
}
