// Copyright 2025 the Terrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary bounding hierarchy over a regular grid of cells, generic over the volume type.
//!
//! The tree is built by recursively splitting the larger grid dimension at its midpoint
//! until single cells remain, so its shape depends only on the grid size. Cell contents
//! may change over time: [`Hierarchy::refit`] and [`Hierarchy::refit_cell`] recompute
//! volumes in place without restructuring.

use core::fmt::Debug;
use core::marker::PhantomData;

use crate::types::Scalar;
use crate::volume::BoundingVolume;

/// A cell of the grid, addressed by row and column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Row index (along y).
    pub row: usize,
    /// Column index (along x).
    pub col: usize,
}

impl GridCell {
    /// Create a new cell address.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rectangular block of cells covered by a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellSpan {
    /// First column.
    pub col: usize,
    /// First row.
    pub row: usize,
    /// Number of columns.
    pub cols: usize,
    /// Number of rows.
    pub rows: usize,
}

impl CellSpan {
    /// Whether the span covers `cell`.
    pub const fn contains(&self, cell: GridCell) -> bool {
        cell.col >= self.col
            && cell.col < self.col + self.cols
            && cell.row >= self.row
            && cell.row < self.row + self.rows
    }

    /// Number of cells covered.
    pub const fn len(&self) -> usize {
        self.cols * self.rows
    }

    /// Whether the span covers no cell.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split along the larger dimension (columns on ties); `None` for a single cell.
    fn split(&self) -> Option<(Self, Self)> {
        if self.cols >= self.rows && self.cols > 1 {
            let half = self.cols / 2;
            Some((
                Self { cols: half, ..*self },
                Self {
                    col: self.col + half,
                    cols: self.cols - half,
                    ..*self
                },
            ))
        } else if self.rows > 1 {
            let half = self.rows / 2;
            Some((
                Self { rows: half, ..*self },
                Self {
                    row: self.row + half,
                    rows: self.rows - half,
                    ..*self
                },
            ))
        } else {
            None
        }
    }
}

/// Index of a node inside the hierarchy arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    /// Position of the node in [`Hierarchy::nodes`].
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Whether a node is a leaf (one cell) or has two children.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A single cell, given by the node's span origin.
    Leaf,
    /// Two children covering the two halves of the span.
    Internal {
        /// First half (west or north).
        left: NodeIdx,
        /// Second half (east or south).
        right: NodeIdx,
    },
}

/// A node of the hierarchy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Node<BV> {
    /// Volume enclosing every cell of the span.
    pub bv: BV,
    /// Cells covered by this node.
    pub span: CellSpan,
    /// Leaf or internal.
    pub kind: NodeKind,
    /// Parent node, `None` for the root.
    pub parent: Option<NodeIdx>,
}

impl<BV> Node<BV> {
    /// Whether this node is a leaf.
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    /// The cell of a leaf, `None` for internal nodes.
    pub const fn cell(&self) -> Option<GridCell> {
        match self.kind {
            NodeKind::Leaf => Some(GridCell::new(self.span.row, self.span.col)),
            NodeKind::Internal { .. } => None,
        }
    }
}

/// What a [`Hierarchy::traverse`] visitor wants to do after seeing a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Continue into the children of an internal node.
    Descend,
    /// Skip the subtree below this node.
    Prune,
    /// End the traversal.
    Stop,
}

/// Bounding hierarchy over a `cols × rows` grid of cells.
#[derive(Clone, PartialEq)]
pub struct Hierarchy<T: Scalar, BV: BoundingVolume<T>> {
    cols: usize,
    rows: usize,
    arena: Vec<Node<BV>>,
    leaves: Vec<NodeIdx>,
    _t: PhantomData<T>,
}

impl<T: Scalar, BV: BoundingVolume<T>> Hierarchy<T, BV> {
    /// Build the hierarchy for a grid of `cols × rows` cells, fitting each leaf with
    /// `leaf_bv`.
    ///
    /// An empty grid yields an empty hierarchy.
    pub fn build(cols: usize, rows: usize, mut leaf_bv: impl FnMut(GridCell) -> BV) -> Self {
        let mut this = Self {
            cols,
            rows,
            arena: Vec::with_capacity((2 * cols * rows).saturating_sub(1)),
            leaves: vec![NodeIdx::new(0); cols * rows],
            _t: PhantomData,
        };
        if cols > 0 && rows > 0 {
            let root = CellSpan {
                col: 0,
                row: 0,
                cols,
                rows,
            };
            this.build_node(root, None, &mut leaf_bv);
        }
        this
    }

    fn build_node(
        &mut self,
        span: CellSpan,
        parent: Option<NodeIdx>,
        leaf_bv: &mut impl FnMut(GridCell) -> BV,
    ) -> NodeIdx {
        let idx = NodeIdx::new(self.arena.len());
        match span.split() {
            None => {
                let cell = GridCell::new(span.row, span.col);
                self.arena.push(Node {
                    bv: leaf_bv(cell),
                    span,
                    kind: NodeKind::Leaf,
                    parent,
                });
                self.leaves[cell.row * self.cols + cell.col] = idx;
            }
            Some((l, r)) => {
                // Reserve the slot so children land after their parent (pre-order).
                self.arena.push(Node {
                    bv: BV::from_point([T::zero(); 3]),
                    span,
                    kind: NodeKind::Leaf,
                    parent,
                });
                let left = self.build_node(l, Some(idx), leaf_bv);
                let right = self.build_node(r, Some(idx), leaf_bv);
                let bv = self.arena[left.get()].bv.merge(&self.arena[right.get()].bv);
                let node = &mut self.arena[idx.get()];
                node.bv = bv;
                node.kind = NodeKind::Internal { left, right };
            }
        }
        idx
    }

    /// Recompute every volume from `leaf_bv`, bottom-up.
    pub fn refit(&mut self, mut leaf_bv: impl FnMut(GridCell) -> BV) {
        // Children always follow their parent in the arena.
        for i in (0..self.arena.len()).rev() {
            let bv = match self.arena[i].kind {
                NodeKind::Leaf => {
                    let span = self.arena[i].span;
                    leaf_bv(GridCell::new(span.row, span.col))
                }
                NodeKind::Internal { left, right } => {
                    self.arena[left.get()].bv.merge(&self.arena[right.get()].bv)
                }
            };
            self.arena[i].bv = bv;
        }
    }

    /// Replace the volume of one cell and update its ancestors.
    ///
    /// Produces the same volumes as a full [`refit`](Self::refit) with the same leaf
    /// volumes. Does nothing for a cell outside the grid.
    pub fn refit_cell(&mut self, cell: GridCell, bv: BV) {
        let Some(leaf) = self.leaf(cell) else {
            return;
        };
        self.arena[leaf.get()].bv = bv;
        let mut parent = self.arena[leaf.get()].parent;
        while let Some(p) = parent {
            let node = self.arena[p.get()];
            if let NodeKind::Internal { left, right } = node.kind {
                self.arena[p.get()].bv = self.arena[left.get()].bv.merge(&self.arena[right.get()].bv);
            }
            parent = node.parent;
        }
    }

    /// Walk the tree depth-first from the root.
    ///
    /// The visitor sees every reached node; returning [`Visit::Prune`] skips the node's
    /// children and [`Visit::Stop`] ends the walk. For leaves, anything but `Stop`
    /// continues with the next pending node.
    pub fn traverse(&self, mut visit: impl FnMut(NodeIdx, &Node<BV>) -> Visit) {
        let Some(root) = self.root() else {
            return;
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let n = &self.arena[i.get()];
            match (visit(i, n), n.kind) {
                (Visit::Stop, _) => return,
                (Visit::Descend, NodeKind::Internal { left, right }) => {
                    stack.push(right);
                    stack.push(left);
                }
                _ => {}
            }
        }
    }

    /// Cells whose leaf volume overlaps `bv`, produced lazily in traversal order.
    pub fn query_volume(&self, bv: &BV) -> impl Iterator<Item = GridCell> + '_ {
        let bv = *bv;
        self.cells_where(move |v| v.overlaps(&bv))
    }

    /// Cells whose leaf volume contains the point, produced lazily in traversal order.
    pub fn query_point(&self, p: [T; 3]) -> impl Iterator<Item = GridCell> + '_ {
        self.cells_where(move |v| v.contains(p))
    }

    /// Leaves reached by descending only into nodes whose volume passes `hit`.
    fn cells_where<'a>(
        &'a self,
        mut hit: impl FnMut(&BV) -> bool + 'a,
    ) -> impl Iterator<Item = GridCell> + 'a {
        let mut stack: Vec<NodeIdx> = self.root().into_iter().collect();
        core::iter::from_fn(move || {
            while let Some(i) = stack.pop() {
                let n = &self.arena[i.get()];
                if !hit(&n.bv) {
                    continue;
                }
                match n.kind {
                    NodeKind::Leaf => return n.cell(),
                    NodeKind::Internal { left, right } => {
                        stack.push(right);
                        stack.push(left);
                    }
                }
            }
            None
        })
    }

    /// The root node index, `None` for an empty grid.
    pub fn root(&self) -> Option<NodeIdx> {
        (!self.arena.is_empty()).then_some(NodeIdx::new(0))
    }

    /// Volume of the root node.
    pub fn root_bv(&self) -> Option<&BV> {
        self.arena.first().map(|n| &n.bv)
    }

    /// The leaf holding `cell`, `None` outside the grid.
    pub fn leaf(&self, cell: GridCell) -> Option<NodeIdx> {
        if cell.col >= self.cols || cell.row >= self.rows {
            return None;
        }
        self.leaves.get(cell.row * self.cols + cell.col).copied()
    }

    /// The node at `idx`.
    pub fn node(&self, idx: NodeIdx) -> &Node<BV> {
        &self.arena[idx.get()]
    }

    /// All nodes in pre-order; the root comes first.
    pub fn nodes(&self) -> &[Node<BV>] {
        &self.arena
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the hierarchy has no node.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of cell columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cell rows.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl<T: Scalar, BV: BoundingVolume<T>> Debug for Hierarchy<T, BV> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let leaves = self.arena.iter().filter(|n| n.is_leaf()).count();
        f.debug_struct("Hierarchy")
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("arena_nodes", &self.arena.len())
            .field("leaves", &leaves)
            .field("root_bv", &self.root_bv())
            .finish_non_exhaustive()
    }
}

/// Hierarchy of `f64` axis-aligned boxes.
pub type AabbHierarchy = Hierarchy<f64, crate::types::Aabb3D<f64>>;

/// Hierarchy of `f64` bounding spheres.
pub type SphereHierarchy = Hierarchy<f64, crate::sphere::BoundingSphere<f64>>;
