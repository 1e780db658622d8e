//! Pairwise scan cost for growing numbers of tracked elements

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use enklu_core::{ElementGraph, ElementId, Vec3};
use enklu_proximity::{ProximityChecker, ProximitySettings};

/// Elements on a grid, alternating listeners and triggers
fn populate(count: usize) -> (ElementGraph, ProximityChecker, Vec<ElementId>) {
    let mut graph = ElementGraph::new();
    let mut checker = ProximityChecker::new(ProximitySettings::default());
    let root = graph.root();
    let mut ids = Vec::with_capacity(count);

    for i in 0..count {
        let id = graph
            .create(root, format!("element-{}", i), "asset")
            .expect("create element");
        let (x, z) = ((i % 16) as f32 * 0.8, (i / 16) as f32 * 0.8);
        graph.get_mut(id).expect("element").position = Vec3::new(x, 0.0, z);
        checker.set_element_state(id, i % 2 == 0, i % 2 == 1);
        ids.push(id);
    }
    checker.on_enter(|_, _| {});
    checker.on_stay(|_, _| {});
    checker.on_exit(|_, _| {});

    (graph, checker, ids)
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("proximity_update");
    for count in [8usize, 32, 128] {
        let (graph, mut checker, _) = populate(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| checker.update(black_box(&graph)))
        });
    }
    group.finish();
}

fn bench_moving_trigger(c: &mut Criterion) {
    let (mut graph, mut checker, ids) = populate(64);
    let mover = ids[1];
    let mut step = 0u32;

    c.bench_function("proximity_moving_trigger", |b| {
        b.iter(|| {
            step = step.wrapping_add(1);
            let x = (step % 40) as f32 * 0.3;
            if let Some(element) = graph.get_mut(mover) {
                element.position = Vec3::new(x, 0.0, 0.0);
            }
            checker.update(black_box(&graph));
        })
    });
}

criterion_group!(benches, bench_update, bench_moving_trigger);
criterion_main!(benches);
