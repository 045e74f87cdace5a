//! Focus decision and layout benchmarks.
//!
//! The tracker runs on every scroll frame, so it has to stay cheap for
//! long feeds and many visible entries.
//!
//! Run with: cargo bench --bench focus_benchmark

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use feedplay::feed::FeedLayout;
use feedplay::model::{FeedItem, ItemId, MediaLocator};
use feedplay::tracker::compute_focused_item;

fn items(count: usize) -> Vec<FeedItem> {
    (0..count)
        .map(|i| {
            FeedItem::new(
                ItemId::new(format!("item-{i}")).unwrap(),
                MediaLocator::new(format!("https://cdn.example.com/{i}.mp4")).unwrap(),
            )
        })
        .collect()
}

fn bench_compute_focused_item(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_focused_item");

    for &card in &[40u32, 300] {
        let feed = items(10_000);
        let layout = FeedLayout::uniform(feed.len(), card);
        let scroll = layout.max_scroll(900) / 2;
        let snapshot = layout.snapshot(scroll, 900);

        group.bench_with_input(
            BenchmarkId::new("visible_entries", snapshot.entries().len()),
            &snapshot,
            |b, snapshot| b.iter(|| compute_focused_item(black_box(snapshot), black_box(&feed))),
        );
    }

    group.finish();
}

fn bench_layout_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_snapshot");

    for &count in &[1_000usize, 100_000] {
        let layout = FeedLayout::new((0..count).map(|i| 200 + (i % 7) as u32 * 40));
        let scroll = layout.max_scroll(900) / 2;

        group.bench_with_input(BenchmarkId::new("items", count), &layout, |b, layout| {
            b.iter(|| layout.snapshot(black_box(scroll), 900))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compute_focused_item, bench_layout_snapshot);
criterion_main!(benches);
