// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use terrace_bounds::{Aabb3D, AabbHierarchy, GridCell};
use terrace_hfield::AabbHeightField;
use terrace_hfield::na::DMatrix;

fn column(cell: GridCell, top: f64) -> Aabb3D<f64> {
    let (x, y) = (cell.col as f64, cell.row as f64);
    Aabb3D::new(x, y, 0.0, x + 1.0, y + 1.0, top)
}

fn wave(n: usize, phase: f64) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |r, c| {
        1.0 + 0.25 * ((r + c) as f64 * 0.1 + phase).sin()
    })
}

fn bench_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy");
    for &n in &[64usize, 256] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("build_n{}", n), |b| {
            b.iter(|| AabbHierarchy::build(n, n, |cell| column(cell, 1.0)));
        });
        group.bench_function(format!("refit_n{}", n), |b| {
            b.iter_batched(
                || AabbHierarchy::build(n, n, |cell| column(cell, 1.0)),
                |mut tree| {
                    tree.refit(|cell| column(cell, 2.0 + cell.col as f64));
                    tree
                },
                BatchSize::LargeInput,
            );
        });
        let tree = AabbHierarchy::build(n, n, |cell| column(cell, cell.row as f64));
        group.bench_function(format!("query_point_n{}", n), |b| {
            let p = [n as f64 / 2.0 + 0.5, n as f64 / 3.0 + 0.5, 0.5];
            b.iter(|| tree.query_point(black_box(p)).count());
        });
    }
    group.finish();
}

fn bench_height_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("height_updates");
    let n = 256;
    let mut hf = AabbHeightField::new(32.0, 32.0, wave(n, 0.0), 0.0).unwrap();
    let frames = [wave(n, 0.5), wave(n, 1.0)];

    group.throughput(Throughput::Elements((n * n) as u64));
    group.bench_function("update_heights_n256", |b| {
        let mut i = 0;
        b.iter(|| {
            i ^= 1;
            hf.update_heights(frames[i].clone()).unwrap();
        });
    });

    // One sample touches at most four cells, so this should stay logarithmic in n.
    group.throughput(Throughput::Elements(1));
    group.bench_function("set_height_n256", |b| {
        let mut k = 0_usize;
        b.iter(|| {
            k = (k + 7919) % (n * n);
            let (row, col) = (k / n, k % n);
            hf.set_height(row, col, 1.0 + (k % 5) as f64 * 0.1).unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_hierarchy, bench_height_updates);
criterion_main!(benches);
