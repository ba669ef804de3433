//! Benchmarks for the font-size bisection.
//!
//! Run with: cargo bench -p vitrine-core

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vitrine_core::fit::{FitProfile, FitRange, search_font_size};

/// Synthetic measure: proportional advance plus a little kerning noise.
fn measure(glyphs: f64) -> impl Fn(f64) -> f64 {
    move |size| glyphs * 0.56 * size + (size * 0.013).sin().abs()
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit/search");
    for (name, range) in [("headline", FitRange::HEADLINE), ("subhead", FitRange::SUBHEAD)] {
        for width in [320.0, 1280.0, 2560.0] {
            group.bench_with_input(BenchmarkId::new(name, width as u32), &width, |b, &width| {
                let m = measure(12.0);
                b.iter(|| search_font_size(black_box(range), black_box(width), &m));
            });
        }
    }
    group.finish();
}

fn bench_profiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit/profile_range");
    for profile in [FitProfile::Headline, FitProfile::Subhead] {
        group.bench_function(format!("{profile:?}"), |b| {
            let m = measure(30.0);
            b.iter(|| search_font_size(black_box(profile.range()), 900.0, &m));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search, bench_profiles);
criterion_main!(benches);
