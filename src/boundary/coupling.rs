//! Per-edge coupling between cells after boundary setup.
//!
//! Every mesh edge ends up either **interior** (a cell on both sides) or a
//! **wall** (one cell, boundary flux from the Riemann solver). Periodic
//! edges are interior edges whose missing side is filled by a
//! [`Neighbor`] that views a real cell through a translation: the geometry
//! of `cell` moved by `shift`. Such a side is a ghost: it reads the current
//! state and reconstruction of its parent whenever it is evaluated, and it
//! never receives a flux contribution of its own.

use crate::mesh::EdgeSide;
use crate::types::{CellId, EdgeId, Point2};

/// A cell seen across an edge, possibly translated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub cell: CellId,
    /// Translation from the real cell to its image at this edge.
    pub shift: Option<Point2>,
}

impl Neighbor {
    /// The cell itself.
    pub fn real(cell: CellId) -> Self {
        Self { cell, shift: None }
    }

    /// Image of `cell` translated by `shift`.
    pub fn ghost(cell: CellId, shift: Point2) -> Self {
        Self {
            cell,
            shift: Some(shift),
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.shift.is_some()
    }

    /// Map a point at this edge back into the frame of the real cell.
    #[inline]
    pub fn to_parent_frame(&self, p: Point2) -> Point2 {
        match self.shift {
            Some(s) => p - s,
            None => p,
        }
    }

    /// Map a point of the real cell into the frame of this image.
    #[inline]
    pub fn from_parent_frame(&self, p: Point2) -> Point2 {
        match self.shift {
            Some(s) => p + s,
            None => p,
        }
    }
}

/// Kind of a non-periodic boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallKind {
    /// Impermeable wall (no mass flux, pressure on the normal momentum).
    Solid,
    /// Transmissive boundary (physical flux of the interior state).
    Free,
}

/// How an edge couples its sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeCoupling {
    /// Cells (real or ghost) on both sides.
    Interior {
        positive: Neighbor,
        negative: Neighbor,
    },
    /// A single real cell on `side`.
    Wall {
        cell: CellId,
        side: EdgeSide,
        kind: WallKind,
    },
}

impl EdgeCoupling {
    /// Neighbour on `side` of an interior edge.
    pub fn neighbor(&self, side: EdgeSide) -> Option<Neighbor> {
        match (self, side) {
            (EdgeCoupling::Interior { positive, .. }, EdgeSide::Positive) => Some(*positive),
            (EdgeCoupling::Interior { negative, .. }, EdgeSide::Negative) => Some(*negative),
            _ => None,
        }
    }

    /// Real (non-ghost) cells attached to the edge with their sides.
    pub fn real_sides(&self) -> Vec<(CellId, EdgeSide)> {
        match *self {
            EdgeCoupling::Interior { positive, negative } => {
                let mut out = Vec::with_capacity(2);
                if !positive.is_ghost() {
                    out.push((positive.cell, EdgeSide::Positive));
                }
                if !negative.is_ghost() {
                    out.push((negative.cell, EdgeSide::Negative));
                }
                out
            }
            EdgeCoupling::Wall { cell, side, .. } => vec![(cell, side)],
        }
    }

    /// The side on which `cell` is attached as a real cell.
    pub fn real_side_of(&self, cell: CellId) -> Option<EdgeSide> {
        match *self {
            EdgeCoupling::Interior { positive, negative } => {
                if !positive.is_ghost() && positive.cell == cell {
                    Some(EdgeSide::Positive)
                } else if !negative.is_ghost() && negative.cell == cell {
                    Some(EdgeSide::Negative)
                } else {
                    None
                }
            }
            EdgeCoupling::Wall { cell: c, side, .. } => (c == cell).then_some(side),
        }
    }

    pub fn is_periodic(&self) -> bool {
        match self {
            EdgeCoupling::Interior { positive, negative } => {
                positive.is_ghost() || negative.is_ghost()
            }
            EdgeCoupling::Wall { .. } => false,
        }
    }
}

/// Couplings and reconstruction distances of every mesh edge.
///
/// Produced once by
/// [`BoundaryManager::finalize`](super::BoundaryManager::finalize).
#[derive(Clone, Debug)]
pub struct EdgeCouplings {
    pub(crate) couplings: Vec<EdgeCoupling>,
    pub(crate) distances: Vec<f64>,
}

impl EdgeCouplings {
    pub fn n_edges(&self) -> usize {
        self.couplings.len()
    }

    #[inline]
    pub fn coupling(&self, edge: EdgeId) -> &EdgeCoupling {
        &self.couplings[edge]
    }

    /// Distance between the cell centres on both sides of the edge.
    ///
    /// For walls this is the distance between the cell centre and its
    /// mirror image across the edge.
    #[inline]
    pub fn distance(&self, edge: EdgeId) -> f64 {
        self.distances[edge]
    }

    pub fn couplings(&self) -> &[EdgeCoupling] {
        &self.couplings
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn n_periodic(&self) -> usize {
        self.couplings.iter().filter(|c| c.is_periodic()).count()
    }

    pub fn n_walls(&self) -> usize {
        self.couplings
            .iter()
            .filter(|c| matches!(c, EdgeCoupling::Wall { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_frames() {
        let n = Neighbor::ghost(CellId::new(3), Point2::new(2.0, 0.0));
        let p = Point2::new(1.0, 1.0);
        assert_eq!(n.to_parent_frame(p), Point2::new(-1.0, 1.0));
        assert_eq!(n.from_parent_frame(n.to_parent_frame(p)), p);
        let r = Neighbor::real(CellId::new(3));
        assert_eq!(r.to_parent_frame(p), p);
        assert!(!r.is_ghost());
    }

    #[test]
    fn test_real_sides_skip_ghosts() {
        let c = EdgeCoupling::Interior {
            positive: Neighbor::real(CellId::new(0)),
            negative: Neighbor::ghost(CellId::new(0), Point2::new(0.0, 1.0)),
        };
        assert_eq!(c.real_sides(), vec![(CellId::new(0), EdgeSide::Positive)]);
        assert_eq!(c.real_side_of(CellId::new(0)), Some(EdgeSide::Positive));
        assert!(c.is_periodic());

        let w = EdgeCoupling::Wall {
            cell: CellId::new(5),
            side: EdgeSide::Negative,
            kind: WallKind::Solid,
        };
        assert_eq!(w.real_side_of(CellId::new(5)), Some(EdgeSide::Negative));
        assert_eq!(w.real_side_of(CellId::new(4)), None);
        assert!(w.neighbor(EdgeSide::Positive).is_none());
    }
}
