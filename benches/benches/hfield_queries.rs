// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use terrace_bounds::{Aabb3D, BoundingSphere, BoundingVolume};
use terrace_hfield::na::{DMatrix, Isometry3, Vector3};
use terrace_hfield::{CollisionRequest, CollisionResult, HeightField, RequestFlags, Shape};

fn hills(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |r, c| {
        let x = c as f64 / n as f64 * 12.0;
        let y = r as f64 / n as f64 * 9.0;
        1.0 + 0.5 * x.sin() * y.cos()
    })
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Poses scattered over a `dim × dim` footprint, hovering around the surface.
fn gen_poses(count: usize, dim: f64) -> Vec<Isometry3<f64>> {
    let mut rng = Rng::new(0x7E44_ACE5_0BAD_5EED);
    (0..count)
        .map(|_| {
            let x = (rng.next_f64() - 0.5) * dim;
            let y = (rng.next_f64() - 0.5) * dim;
            let z = 1.0 + rng.next_f64();
            let axis = Vector3::new(rng.next_f64(), rng.next_f64(), rng.next_f64());
            Isometry3::new(Vector3::new(x, y, z), axis)
        })
        .collect()
}

fn run_queries<BV: BoundingVolume<f64>>(
    hf: &HeightField<BV>,
    shape: &Shape,
    poses: &[Isometry3<f64>],
    request: &CollisionRequest,
) -> usize {
    let mut result = CollisionResult::new();
    let mut hits = 0;
    for pose in poses {
        result.clear();
        hf.collide(&Isometry3::identity(), shape, pose, request, &mut result);
        hits += result.num_contacts();
    }
    hits
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[32usize, 128, 512] {
        let heights = hills(n);
        group.throughput(Throughput::Elements(((n - 1) * (n - 1)) as u64));
        group.bench_function(format!("aabb_n{}", n), |b| {
            b.iter(|| {
                HeightField::<Aabb3D<f64>>::new(16.0, 16.0, black_box(heights.clone()), 0.0)
                    .unwrap()
            });
        });
        group.bench_function(format!("sphere_n{}", n), |b| {
            b.iter(|| {
                HeightField::<BoundingSphere<f64>>::new(16.0, 16.0, black_box(heights.clone()), 0.0)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("collide");
    let heights = hills(128);
    let boxes = HeightField::<Aabb3D<f64>>::new(16.0, 16.0, heights.clone(), 0.0).unwrap();
    let spheres = HeightField::<BoundingSphere<f64>>::new(16.0, 16.0, heights, 0.0).unwrap();
    let poses = gen_poses(256, 14.0);
    group.throughput(Throughput::Elements(poses.len() as u64));

    let shapes = [
        ("ball", Shape::sphere(0.4).unwrap()),
        ("box", Shape::box_from_sides(0.6, 0.4, 0.3).unwrap()),
    ];
    let first = CollisionRequest::default();
    let all = CollisionRequest::all_contacts(&boxes);
    let boolean = CollisionRequest::default().with_flags(RequestFlags::empty());

    for (name, shape) in &shapes {
        group.bench_function(format!("aabb_{}_first", name), |b| {
            b.iter(|| run_queries(&boxes, shape, black_box(&poses), &first));
        });
        group.bench_function(format!("aabb_{}_all", name), |b| {
            b.iter(|| run_queries(&boxes, shape, black_box(&poses), &all));
        });
        group.bench_function(format!("aabb_{}_boolean", name), |b| {
            b.iter(|| run_queries(&boxes, shape, black_box(&poses), &boolean));
        });
        group.bench_function(format!("sphere_{}_all", name), |b| {
            b.iter(|| run_queries(&spheres, shape, black_box(&poses), &all));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
