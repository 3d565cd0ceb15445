//! Benchmarks for delimiter matching.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use matchlight_buffer::{SearchOptions, Searcher, TextBuffer};
use matchlight_syntax::{compute_highlights, highlight_tokens, Matcher, TagStrategy, Theme};

/// Generates `lines` lines of nested calls wrapped in one outer block.
fn generate_nested_code(lines: usize) -> String {
    let mut text = String::from("def outer(\n");
    for i in 0..lines {
        text.push_str(&format!("    call_{i}(a[{i}], {{'k': (x, y)}})\n"));
    }
    text.push_str(")\n");
    text
}

/// Generates a flat HTML list with `items` entries inside one `<ul>`.
fn generate_markup(items: usize) -> String {
    let mut text = String::from("<ul class=\"list\">\n");
    for i in 0..items {
        text.push_str(&format!("  <li><div><span>{i}</span></div></li>\n"));
    }
    text.push_str("</ul>\n");
    text
}

/// Matching the outermost bracket scans the whole document.
fn bench_outer_bracket(c: &mut Criterion) {
    let mut group = c.benchmark_group("outer_bracket");

    for size in [100, 1000, 10000].iter() {
        let buffer = TextBuffer::from(generate_nested_code(*size).as_str());
        // cursor right after the opening `(` of `outer(`
        let cursor = 10;

        group.bench_with_input(BenchmarkId::new("python", size), &buffer, |b, buffer| {
            b.iter(|| {
                compute_highlights(black_box(buffer), black_box(cursor), ".py", Theme::Dark)
                    .unwrap()
            })
        });
    }

    group.finish();
}

/// Local matches should not depend on document size.
fn bench_local_bracket(c: &mut Criterion) {
    let buffer = TextBuffer::from(generate_nested_code(10000).as_str());
    let cursor = buffer.line_to_char(5000).unwrap() + 10;

    c.bench_function("local_bracket", |b| {
        b.iter(|| {
            compute_highlights(black_box(&buffer), black_box(cursor), ".py", Theme::Dark).unwrap()
        })
    });
}

/// Tag matching with both counterpart strategies.
///
/// Counterpart search runs over the whole document text, which is copied
/// out of the rope on each call when the rope spans several chunks.
fn bench_tags(c: &mut Criterion) {
    let mut group = c.benchmark_group("tags");
    let buffer = TextBuffer::from(generate_markup(5000).as_str());

    for strategy in [TagStrategy::Nearest, TagStrategy::Nested] {
        let matcher = Matcher::new().with_tag_strategy(strategy);
        group.bench_function(format!("{strategy:?}"), |b| {
            b.iter(|| {
                matcher
                    .find_match(black_box(&buffer), black_box(2), ".html")
                    .unwrap()
            })
        });
    }

    group.finish();
}

/// Token colouring walks every line of the buffer.
fn bench_tokens(c: &mut Criterion) {
    let buffer = TextBuffer::from(generate_nested_code(1000).as_str());

    c.bench_function("tokens", |b| {
        b.iter(|| highlight_tokens(black_box(&buffer), Theme::Dark).unwrap())
    });
}

/// Benchmarks search operations.
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let buffer = TextBuffer::from(generate_nested_code(10000).as_str());

    let searcher = Searcher::new("call_9999", SearchOptions::default()).unwrap();
    group.bench_function("find_next", |b| {
        b.iter(|| searcher.find_next(black_box(&buffer), 0).unwrap())
    });

    let whole_word = Searcher::new(
        "x",
        SearchOptions {
            whole_word: true,
            ..SearchOptions::default()
        },
    )
    .unwrap();
    group.bench_function("find_all_whole_word", |b| {
        b.iter(|| whole_word.find_all(black_box(&buffer)).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_outer_bracket,
    bench_local_bracket,
    bench_tags,
    bench_tokens,
    bench_search,
);

criterion_main!(benches);
