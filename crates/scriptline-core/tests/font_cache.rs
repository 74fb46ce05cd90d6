//! Decay behaviour of the font cache under a manual clock.

use std::sync::Arc;
use std::time::Duration;

use scriptline_core::{
    Fixed, FontCache, FontCacheConfig, FontEngine, FontKey, GlyphLayoutMut, GlyphMetrics, ManualClock, Result, Script,
    ShaperFlags,
};

/// Engine that only exists to occupy cache space.
struct Weighted {
    bytes: usize,
}

impl FontEngine for Weighted {
    fn name(&self) -> &str {
        "weighted"
    }

    fn string_to_cmap(&self, text: &[char], _glyphs: &mut GlyphLayoutMut<'_>, _flags: ShaperFlags) -> Result<usize> {
        Ok(text.len())
    }

    fn recalc_advances(&self, _glyphs: &mut GlyphLayoutMut<'_>, _flags: ShaperFlags) {}

    fn ascent(&self) -> Fixed {
        Fixed::ZERO
    }

    fn descent(&self) -> Fixed {
        Fixed::ZERO
    }

    fn leading(&self) -> Fixed {
        Fixed::ZERO
    }

    fn glyph_metrics(&self, _glyph: u32) -> GlyphMetrics {
        GlyphMetrics::default()
    }

    fn can_render(&self, _text: &[char]) -> bool {
        true
    }

    fn cache_cost(&self) -> usize {
        self.bytes
    }
}

fn key(family: &str) -> FontKey {
    FontKey {
        family: family.to_string(),
        pixel_size: Fixed::from_int(12).raw(),
        weight: 400,
        italic: false,
        script: Script::Latin,
    }
}

fn config() -> FontCacheConfig {
    FontCacheConfig {
        min_cost_kb: 4,
        fast_interval: Duration::from_secs(10),
        slow_interval: Duration::from_secs(300),
    }
}

fn cache_with_clock() -> (FontCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let cache = FontCache::with_clock(config(), Box::new(Arc::clone(&clock)));
    (cache, clock)
}

fn engine(kb: usize) -> Arc<dyn FontEngine> {
    Arc::new(Weighted { bytes: kb * 1024 })
}

#[test]
fn find_counts_hits_and_returns_the_engine() {
    let (mut cache, _clock) = cache_with_clock();
    cache.insert(key("a"), engine(1));
    assert!(cache.find(&key("a")).is_some());
    assert!(cache.find(&key("missing")).is_none());
    assert_eq!(cache.len(), 1);
}

#[test]
fn cost_is_rounded_to_kilobytes_with_a_floor_of_one() {
    assert_eq!(scriptline_core::font_cache::cost_in_kb(0), 1);
    assert_eq!(scriptline_core::font_cache::cost_in_kb(511), 1);
    assert_eq!(scriptline_core::font_cache::cost_in_kb(1536), 2);
    assert_eq!(scriptline_core::font_cache::cost_in_kb(4096), 4);
}

#[test]
fn insert_past_the_budget_raises_it_and_arms_the_fast_timer() {
    let (mut cache, _clock) = cache_with_clock();
    cache.insert(key("a"), engine(4));
    assert_eq!(cache.max_cost_kb(), 4);
    assert_eq!(cache.timer_is_fast(), None);

    cache.insert(key("b"), engine(4));
    assert_eq!(cache.total_cost_kb(), 8);
    assert_eq!(cache.max_cost_kb(), 8);
    assert_eq!(cache.timer_is_fast(), Some(true));
}

#[test]
fn replacing_an_entry_does_not_double_count() {
    let (mut cache, _clock) = cache_with_clock();
    cache.insert(key("a"), engine(4));
    cache.insert(key("a"), engine(2));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.total_cost_kb(), 2);
}

#[test]
fn decay_evicts_unused_oldest_first_and_then_stops() {
    let (mut cache, clock) = cache_with_clock();
    cache.insert(key("a"), engine(4));
    cache.insert(key("b"), engine(4));
    cache.insert(key("c"), engine(4));
    assert_eq!(cache.max_cost_kb(), 12);

    // keep "a" alive outside the cache
    let held = cache.find(&key("a"));
    assert!(held.is_some());

    assert!(!cache.maintain());
    clock.advance(Duration::from_secs(10));
    assert!(cache.maintain());
    assert_eq!(cache.max_cost_kb(), 6);
    assert_eq!(cache.total_cost_kb(), 4);
    assert_eq!(cache.len(), 1);
    assert!(cache.find(&key("a")).is_some());

    clock.advance(Duration::from_secs(10));
    assert!(cache.maintain());
    assert_eq!(cache.max_cost_kb(), 4);
    assert_eq!(cache.timer_is_fast(), Some(true));

    clock.advance(Duration::from_secs(10));
    assert!(cache.maintain());
    assert_eq!(cache.timer_is_fast(), None);
    assert_eq!(cache.len(), 1);
    drop(held);
}

#[test]
fn budget_that_cannot_shrink_slows_the_timer() {
    let (mut cache, clock) = cache_with_clock();
    cache.insert(key("a"), engine(4));
    cache.insert(key("b"), engine(4));
    let _a = cache.find(&key("a"));
    let _b = cache.find(&key("b"));

    clock.advance(Duration::from_secs(10));
    assert!(cache.maintain());
    assert_eq!(cache.max_cost_kb(), 8);
    assert_eq!(cache.timer_is_fast(), Some(false));
    assert_eq!(cache.len(), 2);

    // the slow timer is not due after another fast interval
    clock.advance(Duration::from_secs(10));
    assert!(!cache.maintain());
}

#[test]
fn shared_cache_locks() {
    let cache = FontCache::with_config(config()).shared();
    cache.lock().insert(key("a"), engine(1));
    assert_eq!(cache.lock().len(), 1);
    cache.lock().clear();
    assert!(cache.lock().is_empty());
}
