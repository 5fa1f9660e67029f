//! Cell averages and reconstruction coefficients on a triangular mesh.
//!
//! Cell averages are kept once per RK stage (`u_stages[0..3]`). Stage 0
//! holds the solution between time steps; stages 1 and 2 are scratch
//! buffers of the SSP-RK3 stage machine. Reconstruction coefficients are
//! stored once and reused as the starting point of the next relaxation.
//!
//! Coefficient layout: `coefficients[cell * n_coefficients + l]`.

use crate::equations::StateVector;
use crate::operators::VrOperators2D;
use crate::types::{CellId, Point2};

/// Number of RK stage buffers.
pub const N_STAGES: usize = 3;

/// Solution of a VR finite-volume scheme.
#[derive(Clone, Debug, PartialEq)]
pub struct VrSolution2D<S: StateVector> {
    /// Cell averages per RK stage.
    pub u_stages: [Vec<S>; N_STAGES],
    /// Reconstruction coefficients of every cell.
    pub coefficients: Vec<S>,
    n_cells: usize,
    n_coefficients: usize,
}

impl<S: StateVector> VrSolution2D<S> {
    /// Zero solution.
    pub fn new(n_cells: usize, n_coefficients: usize) -> Self {
        Self {
            u_stages: std::array::from_fn(|_| vec![S::zero(); n_cells]),
            coefficients: vec![S::zero(); n_cells * n_coefficients],
            n_cells,
            n_coefficients,
        }
    }

    /// Zero solution sized for `ops`.
    pub fn for_operators(ops: &VrOperators2D) -> Self {
        Self::new(ops.n_cells(), ops.n_coefficients())
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Coefficients per cell.
    pub fn n_coefficients(&self) -> usize {
        self.n_coefficients
    }

    /// Current cell averages (stage 0).
    pub fn averages(&self) -> &[S] {
        &self.u_stages[0]
    }

    pub fn averages_mut(&mut self) -> &mut [S] {
        &mut self.u_stages[0]
    }

    #[inline]
    pub fn average(&self, cell: CellId) -> S {
        self.u_stages[0][cell.index()]
    }

    #[inline]
    pub fn set_average(&mut self, cell: CellId, value: S) {
        self.u_stages[0][cell.index()] = value;
    }

    /// Reconstruction coefficients of one cell.
    #[inline]
    pub fn cell_coefficients(&self, cell: CellId) -> &[S] {
        let start = cell.index() * self.n_coefficients;
        &self.coefficients[start..start + self.n_coefficients]
    }

    #[inline]
    pub fn cell_coefficients_mut(&mut self, cell: CellId) -> &mut [S] {
        let start = cell.index() * self.n_coefficients;
        &mut self.coefficients[start..start + self.n_coefficients]
    }

    /// Reset every coefficient to zero.
    pub fn clear_coefficients(&mut self) {
        self.coefficients.fill(S::zero());
    }

    /// Reconstructed value `ū + Σ c_l φ_l(p)` of `cell` at `p`, using the
    /// stage-0 average.
    pub fn evaluate(&self, ops: &VrOperators2D, cell: CellId, p: Point2) -> S {
        reconstruct_value(
            ops,
            self.average(cell),
            self.cell_coefficients(cell),
            cell,
            p,
        )
    }

    /// Whether every average and coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.u_stages[0].iter().all(|u| u.is_finite()) && self.coefficients.iter().all(|c| c.is_finite())
    }
}

/// `average + Σ_l coefficients[l] φ_l(p)` with the basis of `cell`.
#[inline]
pub fn reconstruct_value<S: StateVector>(
    ops: &VrOperators2D,
    average: S,
    coefficients: &[S],
    cell: CellId,
    p: Point2,
) -> S {
    let basis = ops.basis(cell);
    let mut value = average;
    for (l, &c) in coefficients.iter().enumerate() {
        value += c * basis.value(l, p);
    }
    value
}
