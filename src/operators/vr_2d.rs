//! Variational reconstruction operators on a triangular mesh.
//!
//! The reconstruction of cell i minimizes the jump functional
//!
//! J_i = Σ_f ∫_f Σ_k w_k (D_n^k u_i - D_n^k u_j)² ds,
//! w_k = d_f^(2k-1) / (k!)²
//!
//! over the edges f of the cell, where j is the cell across f and d_f the
//! distance between both cell centres. With u = ū + Σ_l c_l φ_l its
//! stationarity condition is
//!
//! A_i c_i = Σ_f (B_ij c_j + b_f^i (ū_j - ū_i))
//!
//! with
//!
//! A_i   = Σ_f ∫_f Σ_k w_k (D^k φ^i)(D^k φ^i)ᵀ
//! B_ij  =     ∫_f Σ_k w_k (D^k φ^i)(D^k φ^j)ᵀ
//! b_f^i =     ∫_f w_0 φ^i
//!
//! Everything here depends on geometry only and is assembled once.
//! B is stored once per edge; the cell on the other side uses its transpose.
//! Wall edges contribute to A only, as a constant mirror neighbour.

use faer::{Mat, linalg::solvers::Solve};
use log::debug;
use thiserror::Error;

use crate::basis::VrBasis2D;
use crate::boundary::{EdgeCoupling, EdgeCouplings};
use crate::mesh::{Edge, EdgeSide, Mesh2D, Triangle};
use crate::polynomial::{LineRule, MAX_DEGREE, factorial, n_coefficients};
use crate::types::{CellId, EdgeId};

/// Largest accepted ‖A·A⁻¹ - I‖ (max norm).
pub const SINGULAR_TOLERANCE: f64 = 1e-6;

// =============================================================================
// Errors and configuration
// =============================================================================

/// Error type for reconstruction setup.
#[derive(Debug, Error, PartialEq)]
pub enum VrError {
    #[error("reconstruction degree {degree} is not supported (maximum {max})")]
    UnsupportedDegree { degree: usize, max: usize },

    /// Zero, negative or non-finite centre distance.
    #[error("edge {edge} has invalid reconstruction distance {distance}")]
    InvalidDistance { edge: EdgeId, distance: f64 },

    /// The reconstruction matrix of a cell could not be inverted.
    #[error("reconstruction matrix of cell {cell} is singular (residual {residual:e})")]
    SingularMatrix { cell: CellId, residual: f64 },

    #[error("edge couplings cover {actual} edges, mesh has {expected}")]
    MeshMismatch { expected: usize, actual: usize },
}

/// Damped Jacobi iteration for the reconstruction coefficients.
///
/// Each sweep sets `c ← previous_weight·c + update_weight·A⁻¹·rhs`.
/// The default is plain Jacobi (`0.0`, `1.0`). Over-relaxed weights such as
/// `(-0.3, 1.3)` diverge on meshes whose dual graph is bipartite, because the
/// Jacobi spectrum is then symmetric about zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxationConfig {
    /// Sweeps per reconstruction.
    pub sweeps: usize,
    /// Weight of the coefficients of the previous sweep.
    pub previous_weight: f64,
    /// Weight of the new Jacobi update.
    pub update_weight: f64,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            sweeps: 5,
            previous_weight: 0.0,
            update_weight: 1.0,
        }
    }
}

impl RelaxationConfig {
    pub fn with_sweeps(mut self, sweeps: usize) -> Self {
        self.sweeps = sweeps;
        self
    }

    pub fn with_weights(mut self, previous_weight: f64, update_weight: f64) -> Self {
        self.previous_weight = previous_weight;
        self.update_weight = update_weight;
        self
    }
}

/// Reconstruction settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VrConfig {
    /// Polynomial degree, 0 to [`MAX_DEGREE`].
    pub degree: usize,
    pub relaxation: RelaxationConfig,
}

impl Default for VrConfig {
    fn default() -> Self {
        Self {
            degree: 1,
            relaxation: RelaxationConfig::default(),
        }
    }
}

impl VrConfig {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            ..Default::default()
        }
    }

    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    pub fn with_relaxation(mut self, relaxation: RelaxationConfig) -> Self {
        self.relaxation = relaxation;
        self
    }
}

// =============================================================================
// Edge matrices
// =============================================================================

/// Coupling matrix and moment vectors of an interior edge.
#[derive(Clone, Debug)]
pub struct EdgeMatrices {
    /// Side whose basis indexes the rows of `b`.
    pub this: EdgeSide,
    /// B with rows on `this` and columns on the other side.
    pub b: Mat<f64>,
    /// Moment vector b_f of each side, indexed by [`EdgeSide::index`].
    pub moments: [Vec<f64>; 2],
}

impl EdgeMatrices {
    /// Entry (l, m) of B_ij as seen from the cell on `side`.
    #[inline]
    pub fn coupling(&self, side: EdgeSide, l: usize, m: usize) -> f64 {
        if side == self.this {
            self.b[(l, m)]
        } else {
            self.b[(m, l)]
        }
    }

    #[inline]
    pub fn moments(&self, side: EdgeSide) -> &[f64] {
        &self.moments[side.index()]
    }
}

/// Weights w_k = d^(2k-1) / (k!)² for k = 0..=degree.
pub fn derivative_weights(distance: f64, degree: usize) -> Vec<f64> {
    (0..=degree)
        .map(|k| {
            let f = factorial(k as u32);
            distance.powi(2 * k as i32 - 1) / (f * f)
        })
        .collect()
}

/// `target += scale · Σ_k w_k left[:, k] right[:, k]ᵀ`
fn accumulate_weighted(target: &mut Mat<f64>, left: &Mat<f64>, right: &Mat<f64>, weights: &[f64], scale: f64) {
    for l in 0..left.nrows() {
        for m in 0..right.nrows() {
            let mut sum = 0.0;
            for (k, w) in weights.iter().enumerate() {
                sum += w * left[(l, k)] * right[(m, k)];
            }
            target[(l, m)] += scale * sum;
        }
    }
}

/// Per-edge output of the assembly before the per-cell reduction.
struct EdgeAssembly {
    /// Gram contribution to A of each real side.
    a_parts: [Option<Mat<f64>>; 2],
    matrices: Option<EdgeMatrices>,
}

fn assemble_edge(
    edge: &Edge,
    coupling: &EdgeCoupling,
    distance: f64,
    bases: &[VrBasis2D],
    degree: usize,
    rule: &LineRule,
) -> EdgeAssembly {
    let n = n_coefficients(degree);
    let weights = derivative_weights(distance, degree);
    let points = rule.segment_points(edge.head_position, edge.tail_position);

    match *coupling {
        EdgeCoupling::Interior { positive, negative } => {
            let this = if positive.cell <= negative.cell {
                EdgeSide::Positive
            } else {
                EdgeSide::Negative
            };
            let mut a_parts = [
                (!positive.is_ghost()).then(|| Mat::zeros(n, n)),
                (!negative.is_ghost()).then(|| Mat::zeros(n, n)),
            ];
            let mut b = Mat::zeros(n, n);
            let mut moments = [vec![0.0; n], vec![0.0; n]];

            for &(p, wq) in &points {
                let tables = [
                    bases[positive.cell.index()].func_table(positive.to_parent_frame(p), edge.normal),
                    bases[negative.cell.index()].func_table(negative.to_parent_frame(p), edge.normal),
                ];
                for (side, part) in a_parts.iter_mut().enumerate() {
                    if let Some(a) = part.as_mut() {
                        accumulate_weighted(a, &tables[side], &tables[side], &weights, wq);
                    }
                }
                accumulate_weighted(
                    &mut b,
                    &tables[this.index()],
                    &tables[this.opposite().index()],
                    &weights,
                    wq,
                );
                for (side, moment) in moments.iter_mut().enumerate() {
                    for (l, value) in moment.iter_mut().enumerate() {
                        *value += wq * weights[0] * tables[side][(l, 0)];
                    }
                }
            }

            EdgeAssembly {
                a_parts,
                matrices: Some(EdgeMatrices { this, b, moments }),
            }
        }
        EdgeCoupling::Wall { cell, side, .. } => {
            let mut a = Mat::zeros(n, n);
            for &(p, wq) in &points {
                let table = bases[cell.index()].func_table(p, edge.normal);
                accumulate_weighted(&mut a, &table, &table, &weights, wq);
            }
            let mut a_parts = [None, None];
            a_parts[side.index()] = Some(a);
            EdgeAssembly {
                a_parts,
                matrices: None,
            }
        }
    }
}

/// Side of each edge of a counter-clockwise triangle.
fn cell_faces(cell: &Triangle, mesh: &Mesh2D) -> [(EdgeId, EdgeSide); 3] {
    std::array::from_fn(|i| {
        let edge = cell.edges[i];
        let side = if mesh.edge(edge).head == cell.nodes[i] {
            EdgeSide::Positive
        } else {
            EdgeSide::Negative
        };
        (edge, side)
    })
}

/// Sum the Gram contributions of a cell and invert.
fn invert_cell(
    cell: CellId,
    faces: &[(EdgeId, EdgeSide); 3],
    edges: &[EdgeAssembly],
    n: usize,
) -> Result<Mat<f64>, VrError> {
    let mut a = Mat::zeros(n, n);
    for &(edge, side) in faces {
        if let Some(part) = edges[edge.index()].a_parts[side.index()].as_ref() {
            for i in 0..n {
                for j in 0..n {
                    a[(i, j)] += part[(i, j)];
                }
            }
        }
    }
    invert_checked(cell, &a)
}

/// Inverse via full-pivot LU, rejected when ‖A·A⁻¹ - I‖ is too large.
fn invert_checked(cell: CellId, a: &Mat<f64>) -> Result<Mat<f64>, VrError> {
    let n = a.nrows();
    let lu = a.as_ref().full_piv_lu();
    let mut a_inv = Mat::zeros(n, n);

    // Solve A * A_inv = I column by column
    for col in 0..n {
        let mut rhs = Mat::zeros(n, 1);
        rhs[(col, 0)] = 1.0;
        let solution = lu.solve(&rhs);
        for row in 0..n {
            a_inv[(row, col)] = solution[(row, 0)];
        }
    }

    let mut residual = 0.0_f64;
    for i in 0..n {
        for j in 0..n {
            let mut product = 0.0;
            for k in 0..n {
                product += a[(i, k)] * a_inv[(k, j)];
            }
            let expected = if i == j { 1.0 } else { 0.0 };
            let r = (product - expected).abs();
            residual = if r.is_finite() { residual.max(r) } else { f64::INFINITY };
        }
    }
    if residual > SINGULAR_TOLERANCE {
        return Err(VrError::SingularMatrix { cell, residual });
    }
    Ok(a_inv)
}

// =============================================================================
// Operators
// =============================================================================

/// Static reconstruction operators of a mesh.
#[derive(Clone, Debug)]
pub struct VrOperators2D {
    degree: usize,
    n_coefficients: usize,
    bases: Vec<VrBasis2D>,
    a_inv: Vec<Mat<f64>>,
    edges: Vec<Option<EdgeMatrices>>,
    faces: Vec<[(EdgeId, EdgeSide); 3]>,
    flux_rule: LineRule,
}

impl VrOperators2D {
    fn check_inputs(mesh: &Mesh2D, couplings: &EdgeCouplings, degree: usize) -> Result<(), VrError> {
        if degree > MAX_DEGREE {
            return Err(VrError::UnsupportedDegree {
                degree,
                max: MAX_DEGREE,
            });
        }
        if couplings.n_edges() != mesh.n_edges() {
            return Err(VrError::MeshMismatch {
                expected: mesh.n_edges(),
                actual: couplings.n_edges(),
            });
        }
        if let Some((i, &distance)) = couplings
            .distances()
            .iter()
            .enumerate()
            .find(|&(_, &d)| !(d.is_finite() && d > 0.0))
        {
            return Err(VrError::InvalidDistance {
                edge: EdgeId::new(i),
                distance,
            });
        }
        Ok(())
    }

    /// Assemble bases, A⁻¹, B-matrices and moment vectors.
    pub fn assemble(mesh: &Mesh2D, couplings: &EdgeCouplings, config: &VrConfig) -> Result<Self, VrError> {
        let degree = config.degree;
        Self::check_inputs(mesh, couplings, degree)?;
        let n = n_coefficients(degree);
        let rule = LineRule::for_degree(2 * degree);

        let bases: Vec<VrBasis2D> = mesh
            .cells()
            .iter()
            .map(|c| VrBasis2D::new(degree, c.vertices, c.centroid))
            .collect();
        let faces: Vec<_> = mesh.cells().iter().map(|c| cell_faces(c, mesh)).collect();

        let assembled: Vec<EdgeAssembly> = mesh
            .edges()
            .iter()
            .map(|e| {
                assemble_edge(
                    e,
                    couplings.coupling(e.id),
                    couplings.distance(e.id),
                    &bases,
                    degree,
                    &rule,
                )
            })
            .collect();

        let a_inv = faces
            .iter()
            .enumerate()
            .map(|(i, f)| invert_cell(CellId::new(i), f, &assembled, n))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_parts(degree, bases, a_inv, assembled, faces))
    }

    /// Parallel version of [`assemble`](Self::assemble).
    #[cfg(feature = "parallel")]
    pub fn assemble_parallel(
        mesh: &Mesh2D,
        couplings: &EdgeCouplings,
        config: &VrConfig,
    ) -> Result<Self, VrError> {
        use rayon::prelude::*;

        let degree = config.degree;
        Self::check_inputs(mesh, couplings, degree)?;
        let n = n_coefficients(degree);
        let rule = LineRule::for_degree(2 * degree);

        let bases: Vec<VrBasis2D> = mesh
            .cells()
            .par_iter()
            .map(|c| VrBasis2D::new(degree, c.vertices, c.centroid))
            .collect();
        let faces: Vec<_> = mesh.cells().par_iter().map(|c| cell_faces(c, mesh)).collect();

        let assembled: Vec<EdgeAssembly> = mesh
            .edges()
            .par_iter()
            .map(|e| {
                assemble_edge(
                    e,
                    couplings.coupling(e.id),
                    couplings.distance(e.id),
                    &bases,
                    degree,
                    &rule,
                )
            })
            .collect();

        let a_inv = faces
            .par_iter()
            .enumerate()
            .map(|(i, f)| invert_cell(CellId::new(i), f, &assembled, n))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_parts(degree, bases, a_inv, assembled, faces))
    }

    fn from_parts(
        degree: usize,
        bases: Vec<VrBasis2D>,
        a_inv: Vec<Mat<f64>>,
        assembled: Vec<EdgeAssembly>,
        faces: Vec<[(EdgeId, EdgeSide); 3]>,
    ) -> Self {
        let edges: Vec<Option<EdgeMatrices>> = assembled.into_iter().map(|e| e.matrices).collect();
        let ops = Self {
            degree,
            n_coefficients: n_coefficients(degree),
            bases,
            a_inv,
            edges,
            faces,
            flux_rule: LineRule::for_degree(degree + 1),
        };
        debug!(
            "VR operators: degree {}, {} coefficients, {} cells, {} coupled edges",
            ops.degree,
            ops.n_coefficients,
            ops.n_cells(),
            ops.edges.iter().filter(|e| e.is_some()).count()
        );
        ops
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Coefficients per cell.
    pub fn n_coefficients(&self) -> usize {
        self.n_coefficients
    }

    pub fn n_cells(&self) -> usize {
        self.bases.len()
    }

    #[inline]
    pub fn basis(&self, cell: CellId) -> &VrBasis2D {
        &self.bases[cell.index()]
    }

    #[inline]
    pub fn a_inv(&self, cell: CellId) -> &Mat<f64> {
        &self.a_inv[cell.index()]
    }

    /// B-matrix and moments of an interior edge, `None` for walls.
    #[inline]
    pub fn edge_matrices(&self, edge: EdgeId) -> Option<&EdgeMatrices> {
        self.edges[edge.index()].as_ref()
    }

    /// Edges of a cell with the side the cell sits on.
    #[inline]
    pub fn faces(&self, cell: CellId) -> &[(EdgeId, EdgeSide); 3] {
        &self.faces[cell.index()]
    }

    /// Line rule used for edge fluxes.
    pub fn flux_rule(&self) -> &LineRule {
        &self.flux_rule
    }
}
