//! Mesh entities: nodes, edges and triangles.
//!
//! Side convention: a triangle is stored counter-clockwise, and an edge is
//! stored with `head < tail`. The triangle that walks the edge from head to
//! tail is its **positive** side; the other one is its **negative** side.
//! The edge normal points from the positive side into the negative side:
//!
//! ```text
//! n = ((tail.y - head.y) / L, (head.x - tail.x) / L)
//! ```

use crate::types::{CellId, EdgeId, NodeId, Point2};

/// A mesh vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Index used by the mesh source (file index).
    pub label: usize,
    pub position: Point2,
}

/// Which side of an edge a cell sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    Positive,
    Negative,
}

impl EdgeSide {
    /// Sign with which the edge flux (along the edge normal) enters the
    /// cell on this side: -1 for the positive side, +1 for the negative one.
    #[inline]
    pub fn flux_sign(self) -> f64 {
        match self {
            EdgeSide::Positive => -1.0,
            EdgeSide::Negative => 1.0,
        }
    }

    /// 0 for the positive side, 1 for the negative side.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            EdgeSide::Positive => 0,
            EdgeSide::Negative => 1,
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            EdgeSide::Positive => EdgeSide::Negative,
            EdgeSide::Negative => EdgeSide::Positive,
        }
    }
}

/// An undirected mesh edge shared by one or two triangles.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub head: NodeId,
    pub tail: NodeId,
    pub head_position: Point2,
    pub tail_position: Point2,
    pub length: f64,
    pub center: Point2,
    /// Unit normal pointing from the positive into the negative side.
    pub normal: (f64, f64),
    pub positive: Option<CellId>,
    pub negative: Option<CellId>,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, head: &Node, tail: &Node) -> Self {
        let (a, b) = (head.position, tail.position);
        let length = a.distance(b);
        Self {
            id,
            head: head.id,
            tail: tail.id,
            head_position: a,
            tail_position: b,
            length,
            center: a.midpoint(b),
            normal: ((b.y - a.y) / length, (a.x - b.x) / length),
            positive: None,
            negative: None,
        }
    }

    /// True when only one side is attached.
    pub fn is_boundary(&self) -> bool {
        self.positive.is_none() || self.negative.is_none()
    }

    pub fn is_interior(&self) -> bool {
        !self.is_boundary()
    }

    /// Cell attached on `side`.
    pub fn cell(&self, side: EdgeSide) -> Option<CellId> {
        match side {
            EdgeSide::Positive => self.positive,
            EdgeSide::Negative => self.negative,
        }
    }

    /// Side on which `cell` is attached.
    pub fn side_of(&self, cell: CellId) -> Option<EdgeSide> {
        if self.positive == Some(cell) {
            Some(EdgeSide::Positive)
        } else if self.negative == Some(cell) {
            Some(EdgeSide::Negative)
        } else {
            None
        }
    }

    /// The only attached cell of a boundary edge, with its side.
    pub fn boundary_cell(&self) -> Option<(CellId, EdgeSide)> {
        match (self.positive, self.negative) {
            (Some(c), None) => Some((c, EdgeSide::Positive)),
            (None, Some(c)) => Some((c, EdgeSide::Negative)),
            _ => None,
        }
    }

    /// Normal pointing out of the cell on `side`.
    pub fn outward_normal(&self, side: EdgeSide) -> (f64, f64) {
        match side {
            EdgeSide::Positive => self.normal,
            EdgeSide::Negative => (-self.normal.0, -self.normal.1),
        }
    }
}

/// A counter-clockwise triangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    pub id: CellId,
    /// Id used by the mesh source.
    pub label: usize,
    pub nodes: [NodeId; 3],
    /// `edges[i]` joins `nodes[i]` and `nodes[(i + 1) % 3]`.
    pub edges: [EdgeId; 3],
    pub vertices: [Point2; 3],
    pub area: f64,
    pub centroid: Point2,
}

impl Triangle {
    /// Signed area of three points, positive when counter-clockwise.
    pub fn signed_area(a: Point2, b: Point2, c: Point2) -> f64 {
        0.5 * (b - a).cross(c - a)
    }

    /// Triangle area (the measure of the cell).
    pub fn measure(&self) -> f64 {
        self.area
    }

    /// Iterate `(vertex, vertex)` pairs in counter-clockwise order.
    pub fn sides(&self) -> [(Point2, Point2); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}
