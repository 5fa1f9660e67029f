//! 2D triangular mesh with deduplicated edges.
//!
//! The mesh owns nodes, edges and triangles in dense arenas indexed by
//! [`NodeId`], [`EdgeId`] and [`CellId`]. It is built in bulk from node
//! records `(index, x, y)` and cell records `(id, [a, b, c])`:
//!
//! - Edges are created once per undirected node pair; both orientations of
//!   a pair resolve to the same [`EdgeId`].
//! - Clockwise cell records are flipped (second and third vertex swapped),
//!   so every stored triangle is counter-clockwise with positive area.
//! - Each triangle is attached to its three edges as positive or negative
//!   side, see [`element`](super::element).

use std::collections::HashMap;

use thiserror::Error;

use super::element::{Edge, EdgeSide, Node, Triangle};
use crate::types::{CellId, EdgeId, NodeId, Point2};

/// Error type for mesh construction.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    /// A node index was declared twice.
    #[error("duplicate node index {0}")]
    DuplicateNode(usize),

    /// A cell references a node that was never declared.
    #[error("cell {cell} references unknown node index {node}")]
    UnknownNode { cell: usize, node: usize },

    /// A cell with zero area (collinear or repeated vertices).
    #[error("cell {0} is degenerate (zero area)")]
    DegenerateCell(usize),

    /// A second cell claimed an already occupied side of an edge.
    #[error("cell {cell} would occupy the {side:?} side of edge {edge} twice")]
    EdgeSideOccupied {
        cell: usize,
        edge: EdgeId,
        side: EdgeSide,
    },

    /// Invalid generator parameters.
    #[error("invalid mesh parameters: {0}")]
    InvalidParameters(String),
}

/// 2D mesh of counter-clockwise triangles.
#[derive(Clone, Debug, Default)]
pub struct Mesh2D {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    cells: Vec<Triangle>,
    /// Source node index -> dense id.
    node_lookup: HashMap<usize, NodeId>,
    /// Normalized (head, tail) pair -> edge.
    edge_lookup: HashMap<(NodeId, NodeId), EdgeId>,
}

impl Mesh2D {
    /// Empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty mesh with preallocated arenas.
    pub fn with_capacity(n_nodes: usize, n_cells: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n_nodes),
            edges: Vec::with_capacity(n_nodes + n_cells + 1),
            cells: Vec::with_capacity(n_cells),
            node_lookup: HashMap::with_capacity(n_nodes),
            edge_lookup: HashMap::with_capacity(n_nodes + n_cells + 1),
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add a node with source index `index`.
    pub fn emplace_node(&mut self, index: usize, x: f64, y: f64) -> Result<NodeId, MeshError> {
        if self.node_lookup.contains_key(&index) {
            return Err(MeshError::DuplicateNode(index));
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            id,
            label: index,
            position: Point2::new(x, y),
        });
        self.node_lookup.insert(index, id);
        Ok(id)
    }

    /// Normalized key of the undirected pair `a`–`b`.
    #[inline]
    fn edge_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        if a < b { (a, b) } else { (b, a) }
    }

    /// Find the edge joining two nodes, in either order.
    pub fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.edge_lookup.get(&Self::edge_key(a, b)).copied()
    }

    /// Return the edge joining `a` and `b`, creating it if needed.
    ///
    /// The stored edge always has `head < tail`, so `emplace_edge(a, b)` and
    /// `emplace_edge(b, a)` return the same id.
    pub fn emplace_edge(&mut self, a: NodeId, b: NodeId) -> EdgeId {
        let key = Self::edge_key(a, b);
        if let Some(&id) = self.edge_lookup.get(&key) {
            return id;
        }
        let id = EdgeId::new(self.edges.len());
        let edge = Edge::new(id, &self.nodes[key.0], &self.nodes[key.1]);
        self.edges.push(edge);
        self.edge_lookup.insert(key, id);
        id
    }

    /// Add a triangle from three source node indices.
    ///
    /// Clockwise input is flipped to counter-clockwise. The mesh is left
    /// untouched when an error is returned.
    pub fn emplace_cell(&mut self, label: usize, node_indices: [usize; 3]) -> Result<CellId, MeshError> {
        let mut ids = [NodeId::new(0); 3];
        for (slot, &index) in ids.iter_mut().zip(&node_indices) {
            *slot = *self
                .node_lookup
                .get(&index)
                .ok_or(MeshError::UnknownNode {
                    cell: label,
                    node: index,
                })?;
        }

        let mut vertices = ids.map(|id| self.nodes[id].position);
        let signed = Triangle::signed_area(vertices[0], vertices[1], vertices[2]);
        let [a, b, c] = vertices;
        let scale = a.distance(b).max(b.distance(c)).max(c.distance(a));
        if !(signed.abs() > 1e-14 * scale * scale) {
            return Err(MeshError::DegenerateCell(label));
        }
        if signed < 0.0 {
            ids.swap(1, 2);
            vertices.swap(1, 2);
        }

        // Check every side before touching the arenas
        let id = CellId::new(self.cells.len());
        let mut sides = [EdgeSide::Positive; 3];
        for i in 0..3 {
            let (from, to) = (ids[i], ids[(i + 1) % 3]);
            sides[i] = if from < to {
                EdgeSide::Positive
            } else {
                EdgeSide::Negative
            };
            if let Some(edge) = self.find_edge(from, to)
                && self.edges[edge].cell(sides[i]).is_some()
            {
                return Err(MeshError::EdgeSideOccupied {
                    cell: label,
                    edge,
                    side: sides[i],
                });
            }
        }

        let mut edges = [EdgeId::new(0); 3];
        for i in 0..3 {
            let edge_id = self.emplace_edge(ids[i], ids[(i + 1) % 3]);
            let edge = &mut self.edges[edge_id];
            match sides[i] {
                EdgeSide::Positive => edge.positive = Some(id),
                EdgeSide::Negative => edge.negative = Some(id),
            }
            edges[i] = edge_id;
        }

        let centroid = Point2::new(
            (vertices[0].x + vertices[1].x + vertices[2].x) / 3.0,
            (vertices[0].y + vertices[1].y + vertices[2].y) / 3.0,
        );
        self.cells.push(Triangle {
            id,
            label,
            nodes: ids,
            edges,
            vertices,
            area: signed.abs(),
            centroid,
        });
        Ok(id)
    }

    /// Drop every entity.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.cells.clear();
        self.node_lookup.clear();
        self.edge_lookup.clear();
    }

    // =========================================================================
    // Generators
    // =========================================================================

    /// Uniform mesh of `[x0, x1] × [y0, y1]`: `nx × ny` rectangles, each
    /// split along its lower-left to upper-right diagonal.
    pub fn uniform_triangles(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
    ) -> Result<Self, MeshError> {
        if nx == 0 || ny == 0 {
            return Err(MeshError::InvalidParameters(
                "need at least one rectangle in each direction".to_string(),
            ));
        }
        if !(x1 > x0 && y1 > y0) {
            return Err(MeshError::InvalidParameters(format!(
                "invalid domain bounds [{}, {}] x [{}, {}]",
                x0, x1, y0, y1
            )));
        }

        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;
        let mut mesh = Self::with_capacity((nx + 1) * (ny + 1), 2 * nx * ny);

        for j in 0..=ny {
            for i in 0..=nx {
                // Pin the last row/column to the bounds
                let x = if i == nx { x1 } else { x0 + i as f64 * dx };
                let y = if j == ny { y1 } else { y0 + j as f64 * dy };
                mesh.emplace_node(j * (nx + 1) + i, x, y)?;
            }
        }

        let mut label = 0;
        for j in 0..ny {
            for i in 0..nx {
                let v0 = j * (nx + 1) + i; // bottom-left
                let v1 = v0 + 1; // bottom-right
                let v2 = v1 + (nx + 1); // top-right
                let v3 = v0 + (nx + 1); // top-left
                mesh.emplace_cell(label, [v0, v1, v2])?;
                mesh.emplace_cell(label + 1, [v0, v2, v3])?;
                label += 2;
            }
        }
        Ok(mesh)
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn cells(&self) -> &[Triangle] {
        &self.cells
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> &Triangle {
        &self.cells[id]
    }

    /// Dense id of a source node index.
    pub fn node_id(&self, index: usize) -> Option<NodeId> {
        self.node_lookup.get(&index).copied()
    }

    pub fn for_each_node<F: FnMut(&Node)>(&self, f: F) {
        self.nodes.iter().for_each(f);
    }

    pub fn for_each_edge<F: FnMut(&Edge)>(&self, f: F) {
        self.edges.iter().for_each(f);
    }

    pub fn for_each_cell<F: FnMut(&Triangle)>(&self, f: F) {
        self.cells.iter().for_each(f);
    }

    /// Edges with a single attached cell.
    pub fn boundary_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.is_boundary())
    }

    pub fn n_boundary_edges(&self) -> usize {
        self.boundary_edges().count()
    }

    /// Total area of all cells.
    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(|c| c.area).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Mesh2D {
        let mut mesh = Mesh2D::new();
        mesh.emplace_node(0, 0.0, 0.0).unwrap();
        mesh.emplace_node(1, 1.0, 0.0).unwrap();
        mesh.emplace_node(2, 1.0, 1.0).unwrap();
        mesh.emplace_node(3, 0.0, 1.0).unwrap();
        mesh.emplace_cell(0, [0, 1, 2]).unwrap();
        mesh.emplace_cell(1, [0, 2, 3]).unwrap();
        mesh
    }

    fn edge_between(mesh: &Mesh2D, a: usize, b: usize) -> &Edge {
        let id = mesh
            .find_edge(mesh.node_id(a).unwrap(), mesh.node_id(b).unwrap())
            .unwrap();
        mesh.edge(id)
    }

    #[test]
    fn test_unit_square_counts() {
        let mesh = unit_square();
        assert_eq!(mesh.n_nodes(), 4);
        assert_eq!(mesh.n_edges(), 5);
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.n_boundary_edges(), 4);
        for cell in mesh.cells() {
            assert!((cell.area - 0.5).abs() < 1e-15);
        }
    }

    #[test]
    fn test_unit_square_sides() {
        let mesh = unit_square();
        let c0 = Some(CellId::new(0));
        let c1 = Some(CellId::new(1));

        let e01 = edge_between(&mesh, 0, 1);
        assert_eq!((e01.positive, e01.negative), (c0, None));
        let e12 = edge_between(&mesh, 1, 2);
        assert_eq!((e12.positive, e12.negative), (c0, None));
        let e02 = edge_between(&mesh, 0, 2);
        assert_eq!((e02.positive, e02.negative), (c1, c0));
        let e23 = edge_between(&mesh, 2, 3);
        assert_eq!((e23.positive, e23.negative), (c1, None));
        let e03 = edge_between(&mesh, 0, 3);
        assert_eq!((e03.positive, e03.negative), (None, c1));
    }

    #[test]
    fn test_edge_normals_point_from_positive_to_negative() {
        let mesh = unit_square();
        for edge in mesh.edges() {
            let (nx, ny) = edge.normal;
            assert!((nx * nx + ny * ny - 1.0).abs() < 1e-14);
            if let Some(pos) = edge.positive {
                let c = mesh.cell(pos).centroid;
                let outward = (edge.center - c).dot(Point2::new(nx, ny));
                assert!(outward > 0.0, "normal of {} points into its positive side", edge.id);
            }
        }
    }

    #[test]
    fn test_emplace_edge_deduplicates() {
        let mut mesh = unit_square();
        let a = mesh.node_id(1).unwrap();
        let b = mesh.node_id(3).unwrap();
        let n = mesh.n_edges();
        let e1 = mesh.emplace_edge(a, b);
        let e2 = mesh.emplace_edge(b, a);
        assert_eq!(e1, e2);
        assert_eq!(mesh.n_edges(), n + 1);
        let edge = mesh.edge(e1);
        assert!(edge.head < edge.tail);
    }

    #[test]
    fn test_clockwise_input_is_flipped() {
        let mut mesh = Mesh2D::new();
        mesh.emplace_node(10, 0.0, 0.0).unwrap();
        mesh.emplace_node(20, 1.0, 0.0).unwrap();
        mesh.emplace_node(30, 0.0, 1.0).unwrap();
        let id = mesh.emplace_cell(7, [10, 30, 20]).unwrap();
        let cell = mesh.cell(id);
        assert_eq!(cell.label, 7);
        assert!(cell.area > 0.0);
        let [a, b, c] = cell.vertices;
        assert!(Triangle::signed_area(a, b, c) > 0.0);
        assert_eq!(cell.nodes[0], mesh.node_id(10).unwrap());
        assert_eq!(cell.nodes[1], mesh.node_id(20).unwrap());
    }

    #[test]
    fn test_construction_errors() {
        let mut mesh = Mesh2D::new();
        mesh.emplace_node(0, 0.0, 0.0).unwrap();
        mesh.emplace_node(1, 1.0, 0.0).unwrap();
        mesh.emplace_node(2, 2.0, 0.0).unwrap();
        mesh.emplace_node(3, 0.0, 1.0).unwrap();

        assert_eq!(mesh.emplace_node(0, 5.0, 5.0), Err(MeshError::DuplicateNode(0)));
        assert_eq!(
            mesh.emplace_cell(0, [0, 1, 9]),
            Err(MeshError::UnknownNode { cell: 0, node: 9 })
        );
        assert_eq!(
            mesh.emplace_cell(1, [0, 1, 2]),
            Err(MeshError::DegenerateCell(1))
        );

        mesh.emplace_cell(2, [0, 1, 3]).unwrap();
        let edges_before = mesh.n_edges();
        // Same triangle again claims the same sides
        let err = mesh.emplace_cell(3, [1, 3, 0]).unwrap_err();
        assert!(matches!(err, MeshError::EdgeSideOccupied { cell: 3, .. }));
        assert_eq!(mesh.n_cells(), 1);
        assert_eq!(mesh.n_edges(), edges_before);
    }

    #[test]
    fn test_uniform_triangles() {
        let mesh = Mesh2D::uniform_triangles(0.0, 2.0, 0.0, 1.0, 4, 3).unwrap();
        assert_eq!(mesh.n_nodes(), 5 * 4);
        assert_eq!(mesh.n_cells(), 2 * 4 * 3);
        // Euler: E = V + F - 1 for a disc
        assert_eq!(mesh.n_edges(), mesh.n_nodes() + mesh.n_cells() - 1);
        assert_eq!(mesh.n_boundary_edges(), 2 * (4 + 3));
        assert!((mesh.total_area() - 2.0).abs() < 1e-13);
    }

    #[test]
    fn test_clear_and_visitors() {
        let mut mesh = unit_square();
        let mut n = 0;
        mesh.for_each_cell(|_| n += 1);
        assert_eq!(n, 2);
        let mut boundary = 0;
        mesh.for_each_edge(|e| {
            if e.is_boundary() {
                boundary += 1;
            }
        });
        assert_eq!(boundary, 4);
        mesh.clear();
        assert_eq!(mesh.n_nodes(), 0);
        assert_eq!(mesh.n_edges(), 0);
        assert_eq!(mesh.n_cells(), 0);
        assert!(mesh.node_id(0).is_none());
    }

    #[test]
    fn test_invalid_generator_parameters() {
        assert!(Mesh2D::uniform_triangles(0.0, 1.0, 0.0, 1.0, 0, 2).is_err());
        assert!(Mesh2D::uniform_triangles(1.0, 0.0, 0.0, 1.0, 2, 2).is_err());
    }
}
