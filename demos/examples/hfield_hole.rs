// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A plateau with a circular hole.
//!
//! Lowers a ball into the hole and reports how the security margin changes the answer,
//! once on each bounding volume type.
//!
//! Run:
//! - `cargo run -p terrace_demos --example hfield_hole`

use terrace_bounds::{Aabb3D, BoundingSphere, BoundingVolume};
use terrace_hfield::na::{DMatrix, Isometry3};
use terrace_hfield::{CollisionRequest, CollisionResult, HeightField, Shape};

fn holed_plateau(n: usize) -> DMatrix<f64> {
    let at = |i: usize| -1.0 + 2.0 * i as f64 / (n - 1) as f64;
    DMatrix::from_fn(n, n, |r, c| {
        let (x, y) = (at(c), -at(r));
        if x * x + y * y <= 1.0 { 0.0 } else { 1.0 }
    })
}

fn lower_ball<BV: BoundingVolume<f64>>(label: &str) {
    let hf = HeightField::<BV>::new(2.0, 2.0, holed_plateau(100), -10.0).unwrap();
    let ball = Shape::sphere(0.975).unwrap();
    let pose = Isometry3::translation(0.0, 0.0, 1.0);

    for margin in [-0.005, 0.0, 0.01, 0.025] {
        let request = CollisionRequest::default().with_security_margin(margin);
        let mut result = CollisionResult::new();
        hf.collide(&Isometry3::identity(), &ball, &pose, &request, &mut result);
        println!(
            "{label}: margin {margin:+.3} -> collision {}, lower bound {:.5}, {} bins tested",
            result.is_collision(),
            result.distance_lower_bound,
            result.stats.bin_tests
        );
    }
}

fn main() {
    lower_ball::<Aabb3D<f64>>("aabb");
    lower_ball::<BoundingSphere<f64>>("sphere");
}
