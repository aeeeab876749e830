// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Height field basics.
//!
//! Build a rolling terrain, drop a ball on it, reshape the terrain, and query again.
//!
//! Run:
//! - `cargo run -p terrace_demos --example hfield_basics`

use terrace_bounds::GridCell;
use terrace_hfield::na::{DMatrix, Isometry3};
use terrace_hfield::{AabbHeightField, CollisionRequest, CollisionResult, Shape};

fn main() {
    // 33×33 samples over an 8×8 footprint, floor at -1.
    let heights = DMatrix::from_fn(33, 33, |r, c| {
        0.5 * ((c as f64) * 0.3).sin() * ((r as f64) * 0.2).cos()
    });
    let mut terrain = AabbHeightField::new(8.0, 8.0, heights, -1.0).unwrap();
    println!(
        "terrain: {} nodes, local aabb {:?}",
        terrain.nodes().len(),
        terrain.aabb_local()
    );

    let ball = Shape::sphere(0.4).unwrap();
    let pose = Isometry3::translation(1.0, -0.5, 0.6);
    let request = CollisionRequest::all_contacts(&terrain).with_security_margin(0.05);

    let mut result = CollisionResult::new();
    terrain.collide(&Isometry3::identity(), &ball, &pose, &request, &mut result);
    println!(
        "contacts: {}, distance lower bound {:.4}",
        result.num_contacts(),
        result.distance_lower_bound
    );
    for c in &result.contacts {
        println!(
            "  cell {:?} {:?}: depth {:.4}, normal {:?}",
            c.cell, c.bin, c.penetration_depth, c.normal
        );
    }
    println!("stats: {:?}", result.stats);

    // Dig under the ball: lower every sample around it.
    let row = 16 + 2;
    let col = 16 + 4;
    for r in row - 2..=row + 2 {
        for c in col - 2..=col + 2 {
            terrain.set_height(r, c, -0.8).unwrap();
        }
    }
    assert!(!terrain.local_aabb_is_current());
    terrain.compute_local_aabb();

    result.clear();
    terrain.collide(&Isometry3::identity(), &ball, &pose, &request, &mut result);
    println!("after digging: {} contacts", result.num_contacts());

    let cell = terrain.cell(GridCell::new(row, col)).unwrap();
    println!("dug cell corners: {:?}", cell.corners());
}
