//! Benchmarks for the reload decision path.
//!
//! Covers the work done per file change once the file has been read:
//! parsing, the three-way diff against the accepted snapshot, and the
//! lock-free publish to readers.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hotswap_props::core::{ChangeSet, ConfigurationSink, KeyPolicy, LiveProperties, ReloadableKeySet};
use hotswap_props::prelude::PropertySnapshot;
use hotswap_props::sources::properties;
use std::fmt::Write;

fn snapshot(size: usize, rotated: usize) -> PropertySnapshot {
    (0..size)
        .map(|i| {
            let value = if i < rotated { format!("rotated-{}", i) } else { format!("value-{}", i) };
            (format!("key.{}", i), value)
        })
        .collect()
}

fn policy(reloadable: usize) -> KeyPolicy {
    KeyPolicy::new(
        |key: &str| key.starts_with("key."),
        ReloadableKeySet::new((0..reloadable).map(|i| format!("key.{}", i))),
    )
}

fn properties_text(size: usize) -> String {
    let mut text = String::from("# generated\n");
    for i in 0..size {
        let _ = writeln!(text, "key.{} = value-{}", i, i);
    }
    text
}

/// Diff cost for growing files with a handful of rotated keys
fn benchmark_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    for size in [10, 100, 500] {
        let accepted = snapshot(size, 0);
        let incoming = snapshot(size, 5);
        let policy = policy(5);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let changes = ChangeSet::between(black_box(&accepted), black_box(&incoming), &policy);
                black_box(changes.has_changes());
            });
        });
    }

    group.finish();
}

/// Cosmetic rewrites stop at the equality check
fn benchmark_unchanged(c: &mut Criterion) {
    let accepted = snapshot(500, 0);
    let mut pairs: Vec<(&str, &str)> = accepted.iter().collect();
    pairs.reverse();
    let incoming: PropertySnapshot = pairs.into_iter().collect();

    c.bench_function("unchanged_500", |b| {
        b.iter(|| black_box(black_box(&accepted) == black_box(&incoming)));
    });
}

fn benchmark_parse(c: &mut Criterion) {
    let text = properties_text(500);

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("properties_500", |b| {
        b.iter(|| black_box(properties::parse(black_box(&text)).map(|p| p.len())));
    });
    group.finish();
}

fn benchmark_publish(c: &mut Criterion) {
    let live = LiveProperties::new(snapshot(500, 0));
    let next = snapshot(500, 5);

    c.bench_function("publish_500", |b| {
        b.iter(|| live.reload(black_box(&next)));
    });
}

criterion_group!(
    benches,
    benchmark_diff,
    benchmark_unchanged,
    benchmark_parse,
    benchmark_publish
);
criterion_main!(benches);
