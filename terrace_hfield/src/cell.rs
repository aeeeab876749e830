// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decomposition of a grid cell into two convex bins.
//!
//! A cell spans four samples and is closed below by the floor altitude. It is split along
//! its south-west/north-east diagonal into two triangular prisms ("bins"), each convex, so
//! the generic convex narrow phase applies. Every bin face records its outward normal and
//! whether it belongs to the true surface of the height field: faces shared with the
//! other bin or a neighbouring cell are inactive.

use bitflags::bitflags;
use parry3d_f64::math::Real;
use parry3d_f64::na::{Point3, Vector3};
use parry3d_f64::shape::{ConvexPolyhedron, Shape as ParryShape, Triangle};
use terrace_bounds::{BoundingVolume, GridCell};

bitflags! {
    /// Outer edges of the height field a cell lies on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellBoundary: u8 {
        /// First column (smallest x).
        const WEST  = 0b0000_0001;
        /// Last column (largest x).
        const EAST  = 0b0000_0010;
        /// First row (largest y).
        const NORTH = 0b0000_0100;
        /// Last row (smallest y).
        const SOUTH = 0b0000_1000;
    }
}

/// Which half of the cell a bin covers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinSide {
    /// Triangle SW, NW, NE.
    NorthWest,
    /// Triangle SW, SE, NE.
    SouthEast,
}

/// Role of a bin face.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceKind {
    /// Floor.
    Bottom,
    /// Terrain surface.
    Top,
    /// Side facing -x.
    West,
    /// Side facing +y.
    North,
    /// Side facing +x.
    East,
    /// Side facing -y.
    South,
    /// Side along the cell diagonal.
    Diagonal,
}

/// A triangular face of a bin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Face {
    /// Indices into [`Bin::points`], wound so the right-hand normal points outward.
    pub triangle: [usize; 3],
    /// Unit outward normal.
    pub normal: Vector3<Real>,
    /// Role of the face.
    pub kind: FaceKind,
    /// Whether the face lies on the surface of the height field.
    pub active: bool,
}

/// One convex half of a cell: three floor points below three surface points.
#[derive(Clone, Debug, PartialEq)]
pub struct Bin {
    /// Half of the cell covered.
    pub side: BinSide,
    /// Floor points first, then the surface points above them.
    pub points: [Point3<Real>; 6],
    /// Bottom, top, then three pairs of side triangles.
    pub faces: [Face; 8],
    /// Outer edges of the height field the bin's cell lies on.
    pub boundary: CellBoundary,
}

/// Exact geometry of a bin for the narrow phase.
#[derive(Clone, Debug)]
pub enum BinGeometry {
    /// A prism with volume.
    Solid(ConvexPolyhedron),
    /// A bin squashed onto the floor: only its surface triangle remains.
    Flat(Triangle),
}

impl BinGeometry {
    /// The geometry as a parry shape.
    pub fn as_parry(&self) -> &dyn ParryShape {
        match self {
            Self::Solid(poly) => poly,
            Self::Flat(tri) => tri,
        }
    }

    /// Whether the bin has no volume.
    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Flat(_))
    }
}

impl Bin {
    /// The surface face.
    pub fn top(&self) -> &Face {
        &self.faces[1]
    }

    /// A point on the surface plane.
    pub fn top_point(&self) -> Point3<Real> {
        self.points[self.top().triangle[0]]
    }

    /// Normal computed from the winding of face `i`, not normalized.
    pub fn winding_normal(&self, i: usize) -> Vector3<Real> {
        let [a, b, c] = self.faces[i].triangle.map(|k| self.points[k]);
        (b - a).cross(&(c - a))
    }

    /// The bin as a convex polyhedron, `None` when it has no volume.
    pub fn to_convex(&self) -> Option<ConvexPolyhedron> {
        if self.is_flat() {
            return None;
        }
        let raised = self.points[..3]
            .iter()
            .zip(&self.points[3..])
            .all(|(floor, top)| top.z > floor.z);
        if raised {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Bins have six points."
            )]
            let indices: Vec<[u32; 3]> = self
                .faces
                .iter()
                .map(|f| f.triangle.map(|i| i as u32))
                .collect();
            if let Some(poly) = ConvexPolyhedron::from_convex_mesh(self.points.to_vec(), &indices)
            {
                return Some(poly);
            }
        }
        // Surface points sitting on the floor would duplicate their floor point.
        let mut hull: Vec<Point3<Real>> = self.points[..3].to_vec();
        hull.extend(
            self.points[..3]
                .iter()
                .zip(&self.points[3..])
                .filter(|(floor, top)| top.z > floor.z)
                .map(|(_, top)| *top),
        );
        ConvexPolyhedron::from_convex_hull(&hull)
    }

    /// Whether the bin has no volume (all surface points on the floor).
    pub fn is_flat(&self) -> bool {
        self.points[..3]
            .iter()
            .zip(&self.points[3..])
            .all(|(floor, top)| top.z <= floor.z)
    }

    /// The bin's geometry: its convex prism, or its surface triangle when the prism has
    /// no volume.
    pub fn geometry(&self) -> BinGeometry {
        match self.to_convex() {
            Some(poly) => BinGeometry::Solid(poly),
            None => {
                let [a, b, c] = self.top().triangle.map(|k| self.points[k]);
                BinGeometry::Flat(Triangle::new(a, b, c))
            }
        }
    }

    /// Outward directions along which the bin meets the field's surface: up through its
    /// top, down through the floor, and out through each outer wall of the field its cell
    /// lies on.
    pub fn exposed_directions(&self) -> impl Iterator<Item = Vector3<Real>> + '_ {
        let walls = [
            (CellBoundary::WEST, -Vector3::x()),
            (CellBoundary::EAST, Vector3::x()),
            (CellBoundary::NORTH, Vector3::y()),
            (CellBoundary::SOUTH, -Vector3::y()),
        ];
        [self.top().normal, -Vector3::z()].into_iter().chain(
            walls
                .into_iter()
                .filter(|(flag, _)| self.boundary.contains(*flag))
                .map(|(_, n)| n),
        )
    }

    /// Whether `p`, a point on the bin's boundary, lies on the true surface of the height
    /// field: an active face, or an outer wall of the field.
    ///
    /// Outer walls matter for bins without a face there, like the north-west bin of an
    /// east edge cell, which touches the east wall only along its north-east edge.
    pub fn exposes(&self, p: &Point3<Real>, tol: Real) -> bool {
        let on_face = |f: &Face| (p - self.points[f.triangle[0]]).dot(&f.normal).abs() <= tol;
        if self.faces.iter().any(|f| f.active && on_face(f)) {
            return true;
        }
        let (mut x0, mut x1) = (Real::INFINITY, Real::NEG_INFINITY);
        let (mut y1, mut y0) = (Real::INFINITY, Real::NEG_INFINITY);
        for q in &self.points {
            x0 = x0.min(q.x);
            x1 = x1.max(q.x);
            y1 = y1.min(q.y);
            y0 = y0.max(q.y);
        }
        let b = self.boundary;
        (b.contains(CellBoundary::WEST) && (p.x - x0).abs() <= tol)
            || (b.contains(CellBoundary::EAST) && (p.x - x1).abs() <= tol)
            || (b.contains(CellBoundary::NORTH) && (p.y - y0).abs() <= tol)
            || (b.contains(CellBoundary::SOUTH) && (p.y - y1).abs() <= tol)
    }
}

/// A grid cell with its corner altitudes, rebuilt from the samples on demand.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cell {
    /// Address of the cell.
    pub index: GridCell,
    /// West x.
    pub x0: Real,
    /// East x.
    pub x1: Real,
    /// North y.
    pub y0: Real,
    /// South y.
    pub y1: Real,
    /// North-west altitude.
    pub nw: Real,
    /// North-east altitude.
    pub ne: Real,
    /// South-west altitude.
    pub sw: Real,
    /// South-east altitude.
    pub se: Real,
    /// Floor altitude.
    pub floor: Real,
    /// Outer edges of the height field this cell lies on.
    pub boundary: CellBoundary,
}

impl Cell {
    /// The four floor corners followed by the four surface corners.
    pub fn corners(&self) -> [[Real; 3]; 8] {
        let Self {
            x0,
            x1,
            y0,
            y1,
            floor,
            ..
        } = *self;
        [
            [x0, y0, floor],
            [x1, y0, floor],
            [x0, y1, floor],
            [x1, y1, floor],
            [x0, y0, self.nw],
            [x1, y0, self.ne],
            [x0, y1, self.sw],
            [x1, y1, self.se],
        ]
    }

    /// Volume enclosing the whole cell.
    pub fn bounding_volume<BV: BoundingVolume<Real>>(&self) -> BV {
        let corners = self.corners();
        BV::from_points(&corners).unwrap_or_else(|| BV::from_point(corners[0]))
    }

    /// Both bins, north-west first.
    pub fn bins(&self) -> [Bin; 2] {
        [self.bin(BinSide::NorthWest), self.bin(BinSide::SouthEast)]
    }

    /// One half of the cell.
    pub fn bin(&self, side: BinSide) -> Bin {
        let Self {
            x0,
            x1,
            y0,
            y1,
            floor,
            ..
        } = *self;
        let (dx, dy) = (x1 - x0, y0 - y1);
        let b = self.boundary;
        match side {
            BinSide::NorthWest => {
                let points = [
                    Point3::new(x0, y1, floor),
                    Point3::new(x0, y0, floor),
                    Point3::new(x1, y0, floor),
                    Point3::new(x0, y1, self.sw),
                    Point3::new(x0, y0, self.nw),
                    Point3::new(x1, y0, self.ne),
                ];
                let top = top_normal(&points, [3, 5, 4]);
                let west = -Vector3::x();
                let diagonal = Vector3::new(dy, -dx, 0.0).normalize();
                let north = Vector3::y();
                let west_active = b.contains(CellBoundary::WEST);
                let north_active = b.contains(CellBoundary::NORTH);
                Bin {
                    side,
                    points,
                    faces: [
                        face([0, 1, 2], -Vector3::z(), FaceKind::Bottom, true),
                        face([3, 5, 4], top, FaceKind::Top, true),
                        face([0, 3, 1], west, FaceKind::West, west_active),
                        face([1, 3, 4], west, FaceKind::West, west_active),
                        face([0, 2, 3], diagonal, FaceKind::Diagonal, false),
                        face([2, 5, 3], diagonal, FaceKind::Diagonal, false),
                        face([1, 4, 2], north, FaceKind::North, north_active),
                        face([2, 4, 5], north, FaceKind::North, north_active),
                    ],
                    boundary: b,
                }
            }
            BinSide::SouthEast => {
                let points = [
                    Point3::new(x0, y1, floor),
                    Point3::new(x1, y1, floor),
                    Point3::new(x1, y0, floor),
                    Point3::new(x0, y1, self.sw),
                    Point3::new(x1, y1, self.se),
                    Point3::new(x1, y0, self.ne),
                ];
                let top = top_normal(&points, [3, 4, 5]);
                let south = -Vector3::y();
                let diagonal = Vector3::new(-dy, dx, 0.0).normalize();
                let east = Vector3::x();
                let south_active = b.contains(CellBoundary::SOUTH);
                let east_active = b.contains(CellBoundary::EAST);
                Bin {
                    side,
                    points,
                    faces: [
                        face([0, 2, 1], -Vector3::z(), FaceKind::Bottom, true),
                        face([3, 4, 5], top, FaceKind::Top, true),
                        face([0, 1, 3], south, FaceKind::South, south_active),
                        face([1, 4, 3], south, FaceKind::South, south_active),
                        face([0, 3, 2], diagonal, FaceKind::Diagonal, false),
                        face([2, 3, 5], diagonal, FaceKind::Diagonal, false),
                        face([1, 2, 4], east, FaceKind::East, east_active),
                        face([2, 5, 4], east, FaceKind::East, east_active),
                    ],
                    boundary: b,
                }
            }
        }
    }
}

fn face(triangle: [usize; 3], normal: Vector3<Real>, kind: FaceKind, active: bool) -> Face {
    Face {
        triangle,
        normal,
        kind,
        active,
    }
}

/// Unit normal of the surface triangle; +z when it is degenerate.
fn top_normal(points: &[Point3<Real>; 6], [a, b, c]: [usize; 3]) -> Vector3<Real> {
    let n = (points[b] - points[a]).cross(&(points[c] - points[a]));
    n.try_normalize(Real::EPSILON).unwrap_or_else(Vector3::z)
}
