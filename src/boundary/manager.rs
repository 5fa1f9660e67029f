//! Named boundary partitions and periodic stitching.
//!
//! Usage:
//!
//! ```
//! use vr_fv::boundary::BoundaryManager;
//! use vr_fv::mesh::Mesh2D;
//!
//! let mesh = Mesh2D::uniform_triangles(-1.0, 1.0, 0.0, 0.5, 8, 2).unwrap();
//! let eps = 1e-5;
//! let mut manager = BoundaryManager::new(&mesh);
//! manager.set_boundary_name("left", |e| e.center.x < -1.0 + eps).unwrap();
//! manager.set_boundary_name("right", |e| e.center.x > 1.0 - eps).unwrap();
//! manager.set_boundary_name("bottom", |e| e.center.y < eps).unwrap();
//! manager.set_boundary_name("top", |e| e.center.y > 0.5 - eps).unwrap();
//! manager.set_periodic_boundary("left", "right").unwrap();
//! manager.set_solid_wall("bottom").unwrap();
//! manager.set_free_wall("top").unwrap();
//!
//! let couplings = manager.finalize(&mesh).unwrap();
//! assert_eq!(couplings.n_periodic(), 4);
//! ```

use std::collections::HashMap;

use thiserror::Error;

use super::coupling::{EdgeCoupling, EdgeCouplings, Neighbor, WallKind};
use crate::mesh::{Edge, EdgeSide, Mesh2D};
use crate::types::{CellId, EdgeId, Point2};

/// Relative length mismatch above which periodic partners are reported.
const PERIODIC_LENGTH_TOLERANCE: f64 = 1e-8;

/// Error type for boundary configuration.
#[derive(Debug, Error, PartialEq)]
pub enum BoundaryError {
    /// A boundary name was registered twice.
    #[error("boundary name '{0}' is already defined")]
    DuplicateName(String),

    /// A boundary name was used before `set_boundary_name`.
    #[error("unknown boundary name '{0}'")]
    UnknownName(String),

    /// Periodic partners must have the same number of edges.
    #[error("periodic boundaries '{a}' ({n_a} edges) and '{b}' ({n_b} edges) differ in size")]
    UnequalPeriodicSizes {
        a: String,
        n_a: usize,
        b: String,
        n_b: usize,
    },

    /// A boundary cannot be periodic with itself.
    #[error("boundary '{0}' cannot be periodic with itself")]
    SelfPeriodic(String),

    /// A group already has a condition.
    #[error("boundary '{0}' already has a condition")]
    ConditionAlreadySet(String),

    /// A group was named but never given a condition.
    #[error("boundary '{0}' has no condition (periodic or wall)")]
    MissingCondition(String),

    /// Boundary edges not covered by any group.
    #[error("{count} boundary edges are not assigned to any boundary (first: {first})")]
    UnassignedEdges { count: usize, first: EdgeId },

    /// A boundary edge matched two groups.
    #[error("boundary edge {edge} belongs to both '{first}' and '{second}'")]
    DoubleAssigned {
        edge: EdgeId,
        first: String,
        second: String,
    },

    /// Partition sizes do not add up to the number of boundary edges.
    #[error("boundary partitions hold {assigned} edges but the mesh has {boundary} boundary edges")]
    CountMismatch { assigned: usize, boundary: usize },

    /// The mesh passed to `finalize` is not the one the manager was built on.
    #[error("mesh has {actual} edges, boundary manager was built for {expected}")]
    MeshMismatch { expected: usize, actual: usize },
}

#[derive(Clone, Debug, PartialEq)]
enum Condition {
    Periodic,
    Wall(WallKind),
}

#[derive(Clone, Debug)]
struct BoundaryGroup {
    name: String,
    edges: Vec<EdgeId>,
    condition: Option<Condition>,
}

/// Collects named boundary partitions and their conditions.
///
/// Consumed by [`finalize`](Self::finalize), which validates the
/// configuration once and returns the edge couplings used by the solver.
#[derive(Clone, Debug)]
pub struct BoundaryManager {
    n_edges: usize,
    /// Snapshot of the boundary edges of the mesh.
    boundary_edges: Vec<Edge>,
    /// Position of each boundary edge in `boundary_edges`.
    boundary_index: HashMap<EdgeId, usize>,
    groups: Vec<BoundaryGroup>,
    /// Ghost side filled in for periodic edges.
    ghosts: HashMap<EdgeId, Neighbor>,
}

impl BoundaryManager {
    /// Start a boundary configuration for `mesh`.
    pub fn new(mesh: &Mesh2D) -> Self {
        let boundary_edges: Vec<Edge> = mesh.boundary_edges().cloned().collect();
        let boundary_index = boundary_edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();
        Self {
            n_edges: mesh.n_edges(),
            boundary_edges,
            boundary_index,
            groups: Vec::new(),
            ghosts: HashMap::new(),
        }
    }

    /// Rectangle with both pairs of opposite sides periodic.
    ///
    /// Sides are found from the bounding box of the mesh nodes and named
    /// `left`, `right`, `bottom` and `top`.
    pub fn periodic_box(mesh: &Mesh2D) -> Result<Self, BoundaryError> {
        let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY);
        mesh.for_each_node(|node| {
            x0 = x0.min(node.position.x);
            x1 = x1.max(node.position.x);
            y0 = y0.min(node.position.y);
            y1 = y1.max(node.position.y);
        });
        let eps = 1e-9 * (x1 - x0).max(y1 - y0);

        let mut manager = Self::new(mesh);
        manager.set_boundary_name("left", |e| e.center.x < x0 + eps)?;
        manager.set_boundary_name("right", |e| e.center.x > x1 - eps)?;
        manager.set_boundary_name("bottom", |e| e.center.y < y0 + eps)?;
        manager.set_boundary_name("top", |e| e.center.y > y1 - eps)?;
        manager.set_periodic_boundary("left", "right")?;
        manager.set_periodic_boundary("bottom", "top")?;
        Ok(manager)
    }

    pub fn n_boundary_edges(&self) -> usize {
        self.boundary_edges.len()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Edges of a named group.
    pub fn edges_of(&self, name: &str) -> Option<&[EdgeId]> {
        self.group_index(name).map(|i| self.groups[i].edges.as_slice())
    }

    fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    fn boundary_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.boundary_index.get(&id).map(|&i| &self.boundary_edges[i])
    }

    /// Name every boundary edge for which `predicate` holds.
    ///
    /// Returns the number of matched edges.
    pub fn set_boundary_name<F>(&mut self, name: &str, mut predicate: F) -> Result<usize, BoundaryError>
    where
        F: FnMut(&Edge) -> bool,
    {
        if self.group_index(name).is_some() {
            return Err(BoundaryError::DuplicateName(name.to_string()));
        }
        let edges: Vec<EdgeId> = self
            .boundary_edges
            .iter()
            .filter(|e| predicate(e))
            .map(|e| e.id)
            .collect();
        let count = edges.len();
        log::debug!("boundary '{}' holds {} edges", name, count);
        self.groups.push(BoundaryGroup {
            name: name.to_string(),
            edges,
            condition: None,
        });
        Ok(count)
    }

    fn set_condition(&mut self, name: &str, condition: Condition) -> Result<usize, BoundaryError> {
        let index = self
            .group_index(name)
            .ok_or_else(|| BoundaryError::UnknownName(name.to_string()))?;
        let group = &mut self.groups[index];
        if group.condition.is_some() {
            return Err(BoundaryError::ConditionAlreadySet(name.to_string()));
        }
        group.condition = Some(condition);
        Ok(index)
    }

    /// Impermeable wall on the named boundary.
    pub fn set_solid_wall(&mut self, name: &str) -> Result<(), BoundaryError> {
        self.set_condition(name, Condition::Wall(WallKind::Solid))
            .map(|_| ())
    }

    /// Transmissive boundary on the named boundary.
    pub fn set_free_wall(&mut self, name: &str) -> Result<(), BoundaryError> {
        self.set_condition(name, Condition::Wall(WallKind::Free))
            .map(|_| ())
    }

    /// Pair two named boundaries as periodic.
    ///
    /// Both partitions are sorted by edge centre (y, then x) and edges are
    /// matched index by index. For a matched pair (a, b) with
    /// `ab = center(b) - center(a)`, edge `a` sees the cell of `b` shifted
    /// by `-ab` and edge `b` sees the cell of `a` shifted by `+ab`.
    pub fn set_periodic_boundary(&mut self, name_a: &str, name_b: &str) -> Result<(), BoundaryError> {
        if name_a == name_b {
            return Err(BoundaryError::SelfPeriodic(name_a.to_string()));
        }
        let ia = self
            .group_index(name_a)
            .ok_or_else(|| BoundaryError::UnknownName(name_a.to_string()))?;
        let ib = self
            .group_index(name_b)
            .ok_or_else(|| BoundaryError::UnknownName(name_b.to_string()))?;
        let (n_a, n_b) = (self.groups[ia].edges.len(), self.groups[ib].edges.len());
        if n_a != n_b {
            return Err(BoundaryError::UnequalPeriodicSizes {
                a: name_a.to_string(),
                n_a,
                b: name_b.to_string(),
                n_b,
            });
        }
        for (i, name) in [(ia, name_a), (ib, name_b)] {
            if self.groups[i].condition.is_some() {
                return Err(BoundaryError::ConditionAlreadySet(name.to_string()));
            }
        }

        let sorted_a = self.sorted_edges(ia);
        let sorted_b = self.sorted_edges(ib);
        let mut pairs = Vec::with_capacity(n_a);
        for (a, b) in sorted_a.iter().zip(&sorted_b) {
            let (cell_a, cell_b) = match (a.boundary_cell(), b.boundary_cell()) {
                (Some((ca, _)), Some((cb, _))) => (ca, cb),
                _ => continue,
            };
            let ab = b.center - a.center;
            if (a.length - b.length).abs() > PERIODIC_LENGTH_TOLERANCE * a.length.max(b.length) {
                log::warn!(
                    "periodic edges {} and {} differ in length ({} vs {})",
                    a.id,
                    b.id,
                    a.length,
                    b.length
                );
            }
            pairs.push((a.id, Neighbor::ghost(cell_b, -ab)));
            pairs.push((b.id, Neighbor::ghost(cell_a, ab)));
        }
        self.ghosts.extend(pairs);

        self.groups[ia].condition = Some(Condition::Periodic);
        self.groups[ib].condition = Some(Condition::Periodic);
        log::debug!("stitched '{}' and '{}' ({} edge pairs)", name_a, name_b, n_a);
        Ok(())
    }

    /// Edges of a group sorted by centre, y first.
    fn sorted_edges(&self, group: usize) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self.groups[group]
            .edges
            .iter()
            .filter_map(|&id| self.boundary_edge(id).cloned())
            .collect();
        edges.sort_by(|p, q| {
            p.center
                .y
                .total_cmp(&q.center.y)
                .then(p.center.x.total_cmp(&q.center.x))
        });
        edges
    }

    /// Validate the configuration and build the edge couplings.
    ///
    /// Checks that every boundary edge belongs to exactly one named group,
    /// that group sizes add up to the boundary edge count, and that each
    /// group is periodic or a wall.
    pub fn finalize(self, mesh: &Mesh2D) -> Result<EdgeCouplings, BoundaryError> {
        if mesh.n_edges() != self.n_edges {
            return Err(BoundaryError::MeshMismatch {
                expected: self.n_edges,
                actual: mesh.n_edges(),
            });
        }

        // Owner group of each boundary edge
        let mut owner: HashMap<EdgeId, usize> = HashMap::with_capacity(self.boundary_edges.len());
        let mut assigned = 0;
        for (gi, group) in self.groups.iter().enumerate() {
            if group.condition.is_none() {
                return Err(BoundaryError::MissingCondition(group.name.clone()));
            }
            for &edge in &group.edges {
                if let Some(&first) = owner.get(&edge) {
                    return Err(BoundaryError::DoubleAssigned {
                        edge,
                        first: self.groups[first].name.clone(),
                        second: group.name.clone(),
                    });
                }
                owner.insert(edge, gi);
                assigned += 1;
            }
        }
        let unassigned: Vec<EdgeId> = self
            .boundary_edges
            .iter()
            .map(|e| e.id)
            .filter(|id| !owner.contains_key(id))
            .collect();
        if let Some(&first) = unassigned.first() {
            return Err(BoundaryError::UnassignedEdges {
                count: unassigned.len(),
                first,
            });
        }
        if assigned != self.boundary_edges.len() {
            return Err(BoundaryError::CountMismatch {
                assigned,
                boundary: self.boundary_edges.len(),
            });
        }

        let centroid = |cell: CellId| mesh.cell(cell).centroid;
        let mut couplings = Vec::with_capacity(mesh.n_edges());
        let mut distances = Vec::with_capacity(mesh.n_edges());
        for edge in mesh.edges() {
            let coupling = match (edge.positive, edge.negative) {
                (Some(p), Some(n)) => EdgeCoupling::Interior {
                    positive: Neighbor::real(p),
                    negative: Neighbor::real(n),
                },
                _ => {
                    let (cell, side) = edge.boundary_cell().ok_or(BoundaryError::UnassignedEdges {
                        count: 1,
                        first: edge.id,
                    })?;
                    let group = owner
                        .get(&edge.id)
                        .map(|&gi| &self.groups[gi])
                        .ok_or(BoundaryError::UnassignedEdges {
                            count: 1,
                            first: edge.id,
                        })?;
                    match group.condition {
                        Some(Condition::Wall(kind)) => EdgeCoupling::Wall { cell, side, kind },
                        _ => {
                            let ghost = *self
                                .ghosts
                                .get(&edge.id)
                                .ok_or_else(|| BoundaryError::MissingCondition(group.name.clone()))?;
                            match side {
                                EdgeSide::Positive => EdgeCoupling::Interior {
                                    positive: Neighbor::real(cell),
                                    negative: ghost,
                                },
                                EdgeSide::Negative => EdgeCoupling::Interior {
                                    positive: ghost,
                                    negative: Neighbor::real(cell),
                                },
                            }
                        }
                    }
                }
            };

            let distance = match coupling {
                EdgeCoupling::Interior { positive, negative } => {
                    let cp = positive.from_parent_frame(centroid(positive.cell));
                    let cn = negative.from_parent_frame(centroid(negative.cell));
                    cp.distance(cn)
                }
                EdgeCoupling::Wall { cell, .. } => {
                    let n = Point2::new(edge.normal.0, edge.normal.1);
                    2.0 * (edge.center - centroid(cell)).dot(n).abs()
                }
            };
            couplings.push(coupling);
            distances.push(distance);
        }

        let result = EdgeCouplings {
            couplings,
            distances,
        };
        log::info!(
            "boundary setup: {} edges, {} periodic, {} wall",
            result.n_edges(),
            result.n_periodic(),
            result.n_walls()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-5;

    fn channel() -> Mesh2D {
        Mesh2D::uniform_triangles(0.0, 2.0, 0.0, 1.0, 4, 2).unwrap()
    }

    fn name_sides(manager: &mut BoundaryManager) {
        manager.set_boundary_name("left", |e| e.center.x < EPS).unwrap();
        manager.set_boundary_name("right", |e| e.center.x > 2.0 - EPS).unwrap();
        manager.set_boundary_name("bottom", |e| e.center.y < EPS).unwrap();
        manager.set_boundary_name("top", |e| e.center.y > 1.0 - EPS).unwrap();
    }

    #[test]
    fn test_partition_sizes() {
        let mesh = channel();
        let mut manager = BoundaryManager::new(&mesh);
        name_sides(&mut manager);
        assert_eq!(manager.n_boundary_edges(), 12);
        assert_eq!(manager.edges_of("left").unwrap().len(), 2);
        assert_eq!(manager.edges_of("top").unwrap().len(), 4);
        assert_eq!(
            manager.names().collect::<Vec<_>>(),
            vec!["left", "right", "bottom", "top"]
        );
    }

    #[test]
    fn test_fully_periodic_couplings() {
        let mesh = channel();
        let mut manager = BoundaryManager::new(&mesh);
        name_sides(&mut manager);
        manager.set_periodic_boundary("left", "right").unwrap();
        manager.set_periodic_boundary("bottom", "top").unwrap();
        let couplings = manager.finalize(&mesh).unwrap();

        assert_eq!(couplings.n_periodic(), 12);
        assert_eq!(couplings.n_walls(), 0);
        for edge in mesh.edges() {
            let coupling = couplings.coupling(edge.id);
            assert!(matches!(coupling, EdgeCoupling::Interior { .. }));
            // Uniform spacing: neighbour distances are the same everywhere
            // for edges of the same orientation
            assert!(couplings.distance(edge.id) > 0.0);
        }
    }

    #[test]
    fn test_periodic_distance_matches_translated_centroids() {
        let mesh = channel();
        let mut manager = BoundaryManager::new(&mesh);
        name_sides(&mut manager);
        manager.set_periodic_boundary("left", "right").unwrap();
        manager.set_periodic_boundary("bottom", "top").unwrap();
        let couplings = manager.finalize(&mesh).unwrap();

        // Vertical edges of a uniform split-rectangle mesh: the two cells
        // sharing a vertical edge have centroids dx/3 * (2, -1) ... apart;
        // periodic vertical edges must match interior vertical edges.
        let vertical = |e: &Edge| e.normal.1.abs() < 1e-12;
        let interior_vertical = mesh
            .edges()
            .iter()
            .find(|e| vertical(e) && e.is_interior())
            .unwrap();
        let reference = couplings.distance(interior_vertical.id);
        for edge in mesh.edges().iter().filter(|e| vertical(e) && e.is_boundary()) {
            let d = couplings.distance(edge.id);
            assert!(
                (d - reference).abs() < 1e-12,
                "edge {}: {} vs {}",
                edge.id,
                d,
                reference
            );
        }
    }

    #[test]
    fn test_ghost_shift_is_domain_period() {
        let mesh = channel();
        let mut manager = BoundaryManager::new(&mesh);
        name_sides(&mut manager);
        manager.set_periodic_boundary("left", "right").unwrap();
        manager.set_solid_wall("bottom").unwrap();
        manager.set_free_wall("top").unwrap();
        let couplings = manager.finalize(&mesh).unwrap();

        for edge in mesh.boundary_edges() {
            match *couplings.coupling(edge.id) {
                EdgeCoupling::Interior { positive, negative } => {
                    let ghost = if positive.is_ghost() { positive } else { negative };
                    let shift = ghost.shift.unwrap();
                    assert!((shift.x.abs() - 2.0).abs() < 1e-12);
                    assert!(shift.y.abs() < 1e-12);
                    // Left edges see cells from the right shifted by -2
                    if edge.center.x < EPS {
                        assert!(shift.x < 0.0);
                    }
                }
                EdgeCoupling::Wall { kind, .. } => {
                    if edge.center.y < EPS {
                        assert_eq!(kind, WallKind::Solid);
                    } else {
                        assert_eq!(kind, WallKind::Free);
                    }
                }
            }
        }
    }

    #[test]
    fn test_wall_distance_is_mirror_distance() {
        let mesh = channel();
        let mut manager = BoundaryManager::new(&mesh);
        manager.set_boundary_name("all", |_| true).unwrap();
        manager.set_solid_wall("all").unwrap();
        let couplings = manager.finalize(&mesh).unwrap();
        for edge in mesh.boundary_edges() {
            let (cell, _) = edge.boundary_cell().unwrap();
            let c = mesh.cell(cell).centroid;
            // Axis-aligned boundary: twice the perpendicular distance
            let expected = if edge.normal.0.abs() > 0.5 {
                2.0 * (edge.center.x - c.x).abs()
            } else {
                2.0 * (edge.center.y - c.y).abs()
            };
            assert!((couplings.distance(edge.id) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_configuration_errors() {
        let mesh = channel();
        let mut manager = BoundaryManager::new(&mesh);
        name_sides(&mut manager);
        assert_eq!(
            manager.set_boundary_name("left", |_| false),
            Err(BoundaryError::DuplicateName("left".to_string()))
        );
        assert!(matches!(
            manager.set_periodic_boundary("left", "top"),
            Err(BoundaryError::UnequalPeriodicSizes { n_a: 2, n_b: 4, .. })
        ));
        assert_eq!(
            manager.set_periodic_boundary("left", "nowhere"),
            Err(BoundaryError::UnknownName("nowhere".to_string()))
        );
        assert_eq!(
            manager.set_periodic_boundary("left", "left"),
            Err(BoundaryError::SelfPeriodic("left".to_string()))
        );
        manager.set_solid_wall("top").unwrap();
        assert_eq!(
            manager.set_free_wall("top"),
            Err(BoundaryError::ConditionAlreadySet("top".to_string()))
        );
    }

    #[test]
    fn test_finalize_rejects_incomplete_setup() {
        let mesh = channel();

        // Missing condition
        let mut manager = BoundaryManager::new(&mesh);
        name_sides(&mut manager);
        manager.set_periodic_boundary("left", "right").unwrap();
        manager.set_solid_wall("bottom").unwrap();
        assert_eq!(
            manager.finalize(&mesh).unwrap_err(),
            BoundaryError::MissingCondition("top".to_string())
        );

        // Unassigned edges
        let mut manager = BoundaryManager::new(&mesh);
        manager.set_boundary_name("left", |e| e.center.x < EPS).unwrap();
        manager.set_solid_wall("left").unwrap();
        assert!(matches!(
            manager.finalize(&mesh),
            Err(BoundaryError::UnassignedEdges { count: 10, .. })
        ));

        // Overlapping partitions
        let mut manager = BoundaryManager::new(&mesh);
        manager.set_boundary_name("all", |_| true).unwrap();
        manager.set_boundary_name("bottom", |e| e.center.y < EPS).unwrap();
        manager.set_solid_wall("all").unwrap();
        manager.set_solid_wall("bottom").unwrap();
        assert!(matches!(
            manager.finalize(&mesh),
            Err(BoundaryError::DoubleAssigned { .. })
        ));
    }

    #[test]
    fn test_finalize_rejects_other_mesh() {
        let mesh = channel();
        let other = Mesh2D::uniform_triangles(0.0, 1.0, 0.0, 1.0, 1, 1).unwrap();
        let mut manager = BoundaryManager::new(&mesh);
        manager.set_boundary_name("all", |_| true).unwrap();
        manager.set_free_wall("all").unwrap();
        assert!(matches!(
            manager.finalize(&other),
            Err(BoundaryError::MeshMismatch { .. })
        ));
    }

    #[test]
    fn test_periodic_box() {
        let mesh = Mesh2D::uniform_triangles(-1.0, 1.0, -0.05, 0.05, 10, 2).unwrap();
        let couplings = BoundaryManager::periodic_box(&mesh)
            .unwrap()
            .finalize(&mesh)
            .unwrap();
        assert_eq!(couplings.n_periodic(), 2 * (10 + 2));
        assert_eq!(couplings.n_walls(), 0);
        assert!(couplings.couplings().iter().all(|c| matches!(c, EdgeCoupling::Interior { .. })));
    }

    #[test]
    fn test_periodic_box_on_fine_mesh() {
        let (nx, ny) = (96, 80);
        let mesh = Mesh2D::uniform_triangles(0.0, 1.0, 0.0, 1.0, nx, ny).unwrap();
        let manager = BoundaryManager::periodic_box(&mesh).unwrap();

        assert_eq!(manager.n_boundary_edges(), 2 * (nx + ny));
        for edge in mesh.edges() {
            let found = manager.boundary_edge(edge.id).map(|e| e.id);
            if edge.is_boundary() {
                assert_eq!(found, Some(edge.id));
            } else {
                assert_eq!(found, None);
            }
        }

        let couplings = manager.finalize(&mesh).unwrap();
        assert_eq!(couplings.n_periodic(), 2 * (nx + ny));
        let reach = (1.0 / nx as f64).hypot(1.0 / ny as f64);
        for edge in mesh.boundary_edges() {
            let EdgeCoupling::Interior { positive, negative } = *couplings.coupling(edge.id) else {
                panic!("edge {} is not stitched", edge.id);
            };
            let ghost = if positive.is_ghost() { positive } else { negative };
            let image = ghost.from_parent_frame(mesh.cell(ghost.cell).centroid);
            let inside = image.x > 0.0 && image.x < 1.0 && image.y > 0.0 && image.y < 1.0;
            assert!(!inside, "ghost image {:?} of edge {} is inside", image, edge.id);
            assert!(
                image.distance(edge.center) < reach,
                "ghost image {:?} is far from edge {}",
                image,
                edge.id
            );
        }
    }
}
