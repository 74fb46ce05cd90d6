//! Layout performance - itemizing, shaping and justifying paragraphs
//!
//! Each benchmark starts from a fresh session so the lazy caches of the
//! previous iteration do not hide the work being measured.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use scriptline_core::Fixed;
use scriptline_engine_box::BoxEngine;
use scriptline_layout::{Alignment, Font, TextEngine, TextOption};

fn font() -> Font {
    Font::new(Arc::new(BoxEngine::new(12)))
}

fn paragraphs() -> Vec<(&'static str, String)> {
    vec![
        ("latin", "The quick brown fox jumps over the lazy dog. ".repeat(20)),
        ("mixed", "Hello \u{05e9}\u{05dc}\u{05d5}\u{05dd} world 123 ".repeat(20)),
        ("arabic", "\u{0645}\u{0631}\u{062d}\u{0628}\u{0627} \u{0628}\u{0627}\u{0644}\u{0639}\u{0627}\u{0644}\u{0645} ".repeat(20)),
    ]
}

fn bench_itemize(c: &mut Criterion) {
    let mut group = c.benchmark_group("itemize");
    for (name, text) in paragraphs() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| {
                let mut engine = TextEngine::new(black_box(text), font());
                engine.item_count()
            })
        });
    }
    group.finish();
}

fn bench_shape(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape");
    for (name, text) in paragraphs() {
        let len = text.chars().count();
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| {
                let mut engine = TextEngine::new(black_box(text), font());
                engine.width(0, len)
            })
        });
    }
    group.finish();
}

/// Breaks at every fortieth character and justifies each line.
fn bench_justify(c: &mut Criterion) {
    let option = TextOption::default().with_alignment(Alignment::Justify);
    let mut group = c.benchmark_group("justify");
    for (name, text) in paragraphs() {
        let len = text.chars().count();
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| {
                let mut engine = TextEngine::new(black_box(text), font()).with_option(option.clone());
                let mut from = 0;
                while from < len {
                    let line = engine.measure_line(from, 40, Fixed::from_int(600));
                    from = line.end().max(from + 1);
                    let index = engine.add_line(line);
                    engine.justify(index);
                }
                engine.lines().len()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_itemize, bench_shape, bench_justify);
criterion_main!(benches);
