//! Right-hand side of the VR finite-volume scheme.
//!
//! For each cell i the semi-discrete update is
//!
//! |T_i| dū_i/dt = R_i = -Σ_f ∮_f F(u⁻, u⁺; n_f^out) ds
//!
//! where u± are the reconstructed values ū + Σ c φ on both sides of the
//! edge. The kernel runs in two passes:
//!
//! 1. Edge pass: every edge integrates its flux along the edge normal
//!    (positive → negative side) with the edge rule of the operators.
//! 2. Cell pass: every cell gathers the fluxes of its three edges, with
//!    sign -1 on the positive and +1 on the negative side.
//!
//! Each edge writes only its own flux and each cell only its own sum, so
//! both passes parallelize without locks. Periodic edges pass their flux to
//! the real side only; the partner edge carries the same flux for the other
//! cell.

use crate::boundary::{EdgeCoupling, EdgeCouplings, Neighbor, WallKind};
use crate::equations::StateVector;
use crate::flux::{FluxContext2D, RiemannSolver2D};
use crate::mesh::{Edge, Mesh2D};
use crate::operators::{RelaxationConfig, VrOperators2D};
use crate::solver::{VrSolution2D, reconstruct_value, relax_coefficients};
use crate::types::{CellId, Point2};

/// Configuration for VR RHS computation.
pub struct VrRhsConfig<'a, R: RiemannSolver2D> {
    /// Edge couplings from the boundary setup
    pub couplings: &'a EdgeCouplings,
    /// Riemann solver for interior and wall fluxes
    pub solver: &'a R,
    /// Coefficient relaxation run before each RHS evaluation
    pub relaxation: RelaxationConfig,
}

impl<'a, R: RiemannSolver2D> VrRhsConfig<'a, R> {
    pub fn new(couplings: &'a EdgeCouplings, solver: &'a R) -> Self {
        Self {
            couplings,
            solver,
            relaxation: RelaxationConfig::default(),
        }
    }

    pub fn with_relaxation(mut self, relaxation: RelaxationConfig) -> Self {
        self.relaxation = relaxation;
        self
    }
}

/// Reconstructed value of a (possibly translated) neighbour at `p`.
#[inline]
fn side_value<S: StateVector>(
    ops: &VrOperators2D,
    averages: &[S],
    coefficients: &[S],
    neighbor: Neighbor,
    p: Point2,
) -> S {
    let n = ops.n_coefficients();
    let i = neighbor.cell.index();
    reconstruct_value(
        ops,
        averages[i],
        &coefficients[i * n..(i + 1) * n],
        neighbor.cell,
        neighbor.to_parent_frame(p),
    )
}

/// Flux through `edge` along its normal, integrated over the edge.
fn edge_flux<R: RiemannSolver2D>(
    edge: &Edge,
    coupling: &EdgeCoupling,
    ops: &VrOperators2D,
    averages: &[R::State],
    coefficients: &[R::State],
    solver: &R,
) -> R::State {
    let mut total = R::State::zero();
    for (p, w) in ops.flux_rule().segment_points(edge.head_position, edge.tail_position) {
        let flux = match *coupling {
            EdgeCoupling::Interior { positive, negative } => {
                let left = side_value(ops, averages, coefficients, positive, p);
                let right = side_value(ops, averages, coefficients, negative, p);
                solver.flux(&left, &right, &FluxContext2D::new(edge.normal))
            }
            EdgeCoupling::Wall { cell, side, kind } => {
                let state = side_value(ops, averages, coefficients, Neighbor::real(cell), p);
                let ctx = FluxContext2D::new(edge.outward_normal(side));
                let outward = match kind {
                    WallKind::Solid => solver.solid_wall_flux(&state, &ctx),
                    WallKind::Free => solver.free_wall_flux(&state, &ctx),
                };
                // Back to the edge normal
                outward * -side.flux_sign()
            }
        };
        total += flux * w;
    }
    total
}

/// Sum of the edge fluxes of one cell.
#[inline]
fn gather_cell<S: StateVector>(ops: &VrOperators2D, fluxes: &[S], cell: CellId) -> S {
    let mut sum = S::zero();
    for &(edge, side) in ops.faces(cell) {
        sum += fluxes[edge.index()] * side.flux_sign();
    }
    sum
}

/// Integrated flux of every edge along its normal.
pub fn compute_edge_fluxes<R: RiemannSolver2D>(
    mesh: &Mesh2D,
    ops: &VrOperators2D,
    averages: &[R::State],
    coefficients: &[R::State],
    config: &VrRhsConfig<R>,
) -> Vec<R::State> {
    mesh.edges()
        .iter()
        .map(|e| {
            edge_flux(
                e,
                config.couplings.coupling(e.id),
                ops,
                averages,
                coefficients,
                config.solver,
            )
        })
        .collect()
}

/// Compute R_i for every cell from the given averages and coefficients.
///
/// The coefficients are used as they are; see [`compute_stage_rhs`] for
/// the variant that relaxes them first.
pub fn compute_rhs_vr_2d<R: RiemannSolver2D>(
    mesh: &Mesh2D,
    ops: &VrOperators2D,
    averages: &[R::State],
    coefficients: &[R::State],
    config: &VrRhsConfig<R>,
) -> Vec<R::State> {
    let fluxes = compute_edge_fluxes(mesh, ops, averages, coefficients, config);
    (0..mesh.n_cells())
        .map(|i| gather_cell(ops, &fluxes, CellId::new(i)))
        .collect()
}

/// Parallel version of [`compute_rhs_vr_2d`].
#[cfg(feature = "parallel")]
pub fn compute_rhs_vr_2d_parallel<R: RiemannSolver2D>(
    mesh: &Mesh2D,
    ops: &VrOperators2D,
    averages: &[R::State],
    coefficients: &[R::State],
    config: &VrRhsConfig<R>,
) -> Vec<R::State> {
    use rayon::prelude::*;

    let fluxes: Vec<R::State> = mesh
        .edges()
        .par_iter()
        .map(|e| {
            edge_flux(
                e,
                config.couplings.coupling(e.id),
                ops,
                averages,
                coefficients,
                config.solver,
            )
        })
        .collect();
    (0..mesh.n_cells())
        .into_par_iter()
        .map(|i| gather_cell(ops, &fluxes, CellId::new(i)))
        .collect()
}

/// Relax the coefficients for the averages of `stage`, then compute R.
pub fn compute_stage_rhs<R: RiemannSolver2D>(
    solution: &mut VrSolution2D<R::State>,
    stage: usize,
    mesh: &Mesh2D,
    ops: &VrOperators2D,
    config: &VrRhsConfig<R>,
) -> Vec<R::State> {
    let averages = &solution.u_stages[stage];
    relax_coefficients(
        ops,
        config.couplings,
        averages,
        &mut solution.coefficients,
        &config.relaxation,
    );
    compute_rhs_vr_2d(mesh, ops, averages, &solution.coefficients, config)
}

/// Parallel version of [`compute_stage_rhs`].
#[cfg(feature = "parallel")]
pub fn compute_stage_rhs_parallel<R: RiemannSolver2D>(
    solution: &mut VrSolution2D<R::State>,
    stage: usize,
    mesh: &Mesh2D,
    ops: &VrOperators2D,
    config: &VrRhsConfig<R>,
) -> Vec<R::State> {
    let averages = &solution.u_stages[stage];
    crate::solver::relax_coefficients_parallel(
        ops,
        config.couplings,
        averages,
        &mut solution.coefficients,
        &config.relaxation,
    );
    compute_rhs_vr_2d_parallel(mesh, ops, averages, &solution.coefficients, config)
}
