//! Benchmarks for focus-set computation and full open/close cycles.
//!
//! Run with: `cargo bench --package scrim-overlay --bench focus_bench`
//!
//! # Performance Baselines
//!
//! - `FocusableSet::compute` over wide and deep overlay subtrees
//! - One controlled open → settle → close → finalize cycle on a stack

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use scrim_core::{AnimationEvent, Element, ElementId, ElementTree, Event};
use scrim_overlay::{FocusableSet, OverlayOptions, OverlayStack};
use std::hint::black_box;

// ============================================================================
// Tree Generation
// ============================================================================

/// Overlay with `rows` rows of four controls, every fourth one disabled.
fn wide_overlay(rows: usize) -> (ElementTree, ElementId, ElementId) {
    let mut doc = ElementTree::new();
    let backdrop = doc.create(Element::container());
    let root = doc.create_child(backdrop, Element::container()).unwrap();
    for row in 0..rows {
        let line = doc.create_child(root, Element::container()).unwrap();
        doc.create_child(line, Element::button()).unwrap();
        doc.create_child(line, Element::input()).unwrap();
        doc.create_child(line, Element::link(row % 2 == 0)).unwrap();
        doc.create_child(line, Element::button().with_disabled(true))
            .unwrap();
    }
    (doc, backdrop, root)
}

/// Overlay whose only control sits `depth` containers down.
fn deep_overlay(depth: usize) -> (ElementTree, ElementId) {
    let mut doc = ElementTree::new();
    let backdrop = doc.create(Element::container());
    let root = doc.create_child(backdrop, Element::container()).unwrap();
    let mut cursor = root;
    for _ in 0..depth {
        cursor = doc.create_child(cursor, Element::container()).unwrap();
    }
    doc.create_child(cursor, Element::button()).unwrap();
    (doc, root)
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("focusable_set/wide");
    for rows in [10_usize, 100, 1_000] {
        let (doc, _, root) = wide_overlay(rows);
        group.throughput(Throughput::Elements((rows * 5) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| black_box(FocusableSet::compute(&doc, black_box(root))));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("focusable_set/deep");
    for depth in [16_usize, 256, 4_096] {
        let (doc, root) = deep_overlay(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(FocusableSet::compute(&doc, black_box(root))));
        });
    }
    group.finish();
}

fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay_cycle");
    for rows in [10_usize, 100] {
        let (mut doc, backdrop, root) = wide_overlay(rows);
        let trigger = doc.create_child(doc.body(), Element::button()).unwrap();
        scrim_core::Document::focus(&mut doc, trigger).unwrap();
        let mut stack = OverlayStack::new(doc);
        let id = stack.mount(OverlayOptions::new(backdrop, root)).unwrap();
        let end = Event::AnimationEnd(AnimationEvent::new(root));

        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| {
                stack.set_open(id, true).unwrap();
                stack.handle_event(&end).unwrap();
                stack.set_open(id, false).unwrap();
                black_box(stack.handle_event(&end).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compute, bench_cycle);
criterion_main!(benches);
