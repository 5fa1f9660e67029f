//! Relaxation of the reconstruction coefficients.
//!
//! One sweep updates every cell from the coefficients of the previous sweep
//! (Jacobi), so cells are independent within a sweep:
//!
//! c_i ← α c_i + β A_i⁻¹ Σ_f (B_ij c_j + b_f^i (ū_j - ū_i))
//!
//! Ghost neighbours of periodic edges read their parent's current average
//! and coefficients. Wall edges add nothing to the right-hand side.

use crate::boundary::EdgeCouplings;
use crate::equations::StateVector;
use crate::operators::{RelaxationConfig, VrOperators2D};
use crate::types::CellId;

/// Right-hand side Σ_f (B_ij c_j + b_f^i (ū_j - ū_i)) of one cell.
fn cell_rhs<S: StateVector>(
    ops: &VrOperators2D,
    couplings: &EdgeCouplings,
    averages: &[S],
    coefficients: &[S],
    cell: CellId,
    rhs: &mut [S],
) {
    let n = ops.n_coefficients();
    rhs.fill(S::zero());
    let u_i = averages[cell.index()];

    for &(edge, side) in ops.faces(cell) {
        let Some(matrices) = ops.edge_matrices(edge) else {
            continue;
        };
        let Some(other) = couplings.coupling(edge).neighbor(side.opposite()) else {
            continue;
        };
        let j = other.cell.index();
        let c_j = &coefficients[j * n..(j + 1) * n];
        let jump = averages[j] - u_i;
        let moments = matrices.moments(side);

        for (l, slot) in rhs.iter_mut().enumerate() {
            let mut acc = jump * moments[l];
            for (m, &c) in c_j.iter().enumerate() {
                acc += c * matrices.coupling(side, l, m);
            }
            *slot += acc;
        }
    }
}

/// New coefficients of one cell, written into `out`.
fn sweep_cell<S: StateVector>(
    ops: &VrOperators2D,
    couplings: &EdgeCouplings,
    averages: &[S],
    coefficients: &[S],
    config: &RelaxationConfig,
    cell: CellId,
    out: &mut [S],
) {
    let n = ops.n_coefficients();
    let mut rhs = vec![S::zero(); n];
    cell_rhs(ops, couplings, averages, coefficients, cell, &mut rhs);

    let a_inv = ops.a_inv(cell);
    let start = cell.index() * n;
    let c_i = &coefficients[start..start + n];
    for (l, slot) in out.iter_mut().enumerate() {
        let mut update = S::zero();
        for (m, &r) in rhs.iter().enumerate() {
            update += r * a_inv[(l, m)];
        }
        *slot = c_i[l] * config.previous_weight + update * config.update_weight;
    }
}

/// Run `config.sweeps` relaxation sweeps for the given cell averages.
///
/// `coefficients` is both the starting guess and the result.
pub fn relax_coefficients<S: StateVector>(
    ops: &VrOperators2D,
    couplings: &EdgeCouplings,
    averages: &[S],
    coefficients: &mut Vec<S>,
    config: &RelaxationConfig,
) {
    let n = ops.n_coefficients();
    if n == 0 || config.sweeps == 0 {
        return;
    }
    let mut next = vec![S::zero(); coefficients.len()];
    for _ in 0..config.sweeps {
        for (i, out) in next.chunks_mut(n).enumerate() {
            sweep_cell(ops, couplings, averages, coefficients, config, CellId::new(i), out);
        }
        std::mem::swap(coefficients, &mut next);
    }
}

/// Parallel version of [`relax_coefficients`].
#[cfg(feature = "parallel")]
pub fn relax_coefficients_parallel<S: StateVector>(
    ops: &VrOperators2D,
    couplings: &EdgeCouplings,
    averages: &[S],
    coefficients: &mut Vec<S>,
    config: &RelaxationConfig,
) {
    use rayon::prelude::*;

    let n = ops.n_coefficients();
    if n == 0 || config.sweeps == 0 {
        return;
    }
    let mut next = vec![S::zero(); coefficients.len()];
    for _ in 0..config.sweeps {
        let current: &[S] = coefficients;
        next.par_chunks_mut(n).enumerate().for_each(|(i, out)| {
            sweep_cell(ops, couplings, averages, current, config, CellId::new(i), out);
        });
        std::mem::swap(coefficients, &mut next);
    }
}

/// Distance from the Jacobi fixed point: max |c_i - A_i⁻¹ rhs_i|.
///
/// Zero when the coefficients solve the coupled reconstruction system.
pub fn reconstruction_residual<S: StateVector>(
    ops: &VrOperators2D,
    couplings: &EdgeCouplings,
    averages: &[S],
    coefficients: &[S],
) -> f64 {
    let n = ops.n_coefficients();
    if n == 0 {
        return 0.0;
    }
    let mut rhs = vec![S::zero(); n];
    let mut worst = 0.0_f64;
    for i in 0..ops.n_cells() {
        let cell = CellId::new(i);
        cell_rhs(ops, couplings, averages, coefficients, cell, &mut rhs);
        let a_inv = ops.a_inv(cell);
        let c_i = &coefficients[i * n..(i + 1) * n];
        for l in 0..n {
            let mut target = S::zero();
            for (m, &r) in rhs.iter().enumerate() {
                target += r * a_inv[(l, m)];
            }
            worst = worst.max((c_i[l] - target).max_abs());
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryManager;
    use crate::mesh::Mesh2D;
    use crate::operators::VrConfig;

    fn setup(degree: usize) -> (Mesh2D, EdgeCouplings, VrOperators2D) {
        let mesh = Mesh2D::uniform_triangles(0.0, 1.0, 0.0, 1.0, 6, 6).unwrap();
        let couplings = BoundaryManager::periodic_box(&mesh)
            .unwrap()
            .finalize(&mesh)
            .unwrap();
        let ops = VrOperators2D::assemble(&mesh, &couplings, &VrConfig::new(degree)).unwrap();
        (mesh, couplings, ops)
    }

    #[test]
    fn test_uniform_state_keeps_zero_coefficients() {
        let (mesh, couplings, ops) = setup(2);
        let averages = vec![3.0; mesh.n_cells()];
        let mut coefficients = vec![0.0; mesh.n_cells() * ops.n_coefficients()];
        relax_coefficients(&ops, &couplings, &averages, &mut coefficients, &RelaxationConfig::default());
        assert!(coefficients.iter().all(|&c| c == 0.0));
    }

    fn walled_couplings(mesh: &Mesh2D) -> EdgeCouplings {
        let mut manager = BoundaryManager::new(mesh);
        manager.set_boundary_name("walls", |_| true).unwrap();
        manager.set_free_wall("walls").unwrap();
        manager.finalize(mesh).unwrap()
    }

    fn wave_averages(mesh: &Mesh2D) -> Vec<f64> {
        use std::f64::consts::PI;
        mesh.cells()
            .iter()
            .map(|c| (2.0 * PI * c.centroid.x).sin() * (2.0 * PI * c.centroid.y).cos() + c.centroid.x)
            .collect()
    }

    #[test]
    fn test_sweeps_reduce_residual() {
        for degree in 1..=3 {
            let (mesh, couplings, ops) = setup(degree);
            let averages = wave_averages(&mesh);
            let mut coefficients = vec![0.0; mesh.n_cells() * ops.n_coefficients()];
            let start = reconstruction_residual(&ops, &couplings, &averages, &coefficients);

            let config = RelaxationConfig::default().with_sweeps(40);
            relax_coefficients(&ops, &couplings, &averages, &mut coefficients, &config);
            let end = reconstruction_residual(&ops, &couplings, &averages, &coefficients);
            assert!(end < 0.1 * start, "degree {}: residual {} -> {}", degree, start, end);
        }
    }

    #[test]
    fn test_default_relaxation_converges() {
        let rounds = 16;
        let config = RelaxationConfig::default();
        for n in [4, 8] {
            let mesh = Mesh2D::uniform_triangles(0.0, 1.0, 0.0, 1.0, n, n).unwrap();
            let periodic = BoundaryManager::periodic_box(&mesh)
                .unwrap()
                .finalize(&mesh)
                .unwrap();
            let walled = walled_couplings(&mesh);

            for (label, couplings) in [("periodic", &periodic), ("walled", &walled)] {
                for degree in 1..=3 {
                    let ops = VrOperators2D::assemble(&mesh, couplings, &VrConfig::new(degree)).unwrap();
                    let averages = wave_averages(&mesh);
                    let mut coefficients = vec![0.0; mesh.n_cells() * ops.n_coefficients()];

                    let start = reconstruction_residual(&ops, couplings, &averages, &coefficients);
                    let mut previous = start;
                    for round in 0..rounds {
                        relax_coefficients(&ops, couplings, &averages, &mut coefficients, &config);
                        let residual = reconstruction_residual(&ops, couplings, &averages, &coefficients);
                        assert!(
                            residual.is_finite() && residual < previous,
                            "{} n={} degree {}: round {} residual {} -> {}",
                            label,
                            n,
                            degree,
                            round,
                            previous,
                            residual
                        );
                        previous = residual;
                    }
                    println!(
                        "{} n={} degree {}: residual {:.3e} -> {:.3e}",
                        label, n, degree, start, previous
                    );
                    assert!(
                        previous < 0.05 * start,
                        "{} n={} degree {}: residual {} -> {}",
                        label,
                        n,
                        degree,
                        start,
                        previous
                    );
                }
            }
        }
    }

    #[test]
    fn test_over_relaxed_weights_stay_available() {
        let config = RelaxationConfig::default().with_weights(-0.3, 1.3);
        assert_eq!(config.previous_weight, -0.3);
        assert_eq!(config.update_weight, 1.3);
        assert_eq!(config.sweeps, RelaxationConfig::default().sweeps);

        let plain = RelaxationConfig::default();
        assert_eq!((plain.previous_weight, plain.update_weight), (0.0, 1.0));
    }

    #[test]
    fn test_zero_sweeps_is_noop() {
        let (mesh, couplings, ops) = setup(1);
        let averages: Vec<f64> = (0..mesh.n_cells()).map(|i| i as f64).collect();
        let mut coefficients = vec![0.5; mesh.n_cells() * ops.n_coefficients()];
        let config = RelaxationConfig::default().with_sweeps(0);
        relax_coefficients(&ops, &couplings, &averages, &mut coefficients, &config);
        assert!(coefficients.iter().all(|&c| c == 0.5));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_sweeps_match_serial() {
        let (mesh, couplings, ops) = setup(2);
        let averages: Vec<f64> = mesh
            .cells()
            .iter()
            .map(|c| c.centroid.x * c.centroid.y)
            .collect();
        let mut serial = vec![0.0; mesh.n_cells() * ops.n_coefficients()];
        let mut parallel = serial.clone();
        let config = RelaxationConfig::default();
        relax_coefficients(&ops, &couplings, &averages, &mut serial, &config);
        relax_coefficients_parallel(&ops, &couplings, &averages, &mut parallel, &config);
        assert_eq!(serial, parallel);
    }
}
