//! SSP-RK3 time integration for the VR finite-volume scheme.
//!
//! The three stages live in the stage buffers of [`VrSolution2D`]:
//!
//! u1 = u0 + dt/|T| R(u0)
//! u2 = 3/4 u0 + 1/4 (u1 + dt/|T| R(u1))
//! u0 ← 1/3 u0 + 2/3 (u2 + dt/|T| R(u2))
//!
//! Reconstruction coefficients are relaxed before every stage, starting
//! from the coefficients left behind by the previous stage.

use crate::equations::StateVector;
use crate::flux::RiemannSolver2D;
use crate::mesh::Mesh2D;
use crate::operators::VrOperators2D;
use crate::solver::{VrRhsConfig, VrSolution2D, compute_stage_rhs};

/// Time stepping parameters of a fixed-step run.
#[derive(Clone, Debug, PartialEq)]
pub struct VrTimeConfig {
    /// Simulated time span
    pub duration: f64,
    /// Number of equal time steps
    pub n_steps: usize,
    /// Write a frame every `refresh_rate` steps (0 = never)
    pub refresh_rate: usize,
}

impl Default for VrTimeConfig {
    fn default() -> Self {
        Self {
            duration: 1.0,
            n_steps: 100,
            refresh_rate: 10,
        }
    }
}

impl VrTimeConfig {
    pub fn new(duration: f64, n_steps: usize) -> Self {
        Self {
            duration,
            n_steps,
            ..Default::default()
        }
    }

    pub fn with_refresh_rate(mut self, refresh_rate: usize) -> Self {
        self.refresh_rate = refresh_rate;
        self
    }

    /// Step size `duration / n_steps` (0 when there are no steps).
    pub fn dt(&self) -> f64 {
        if self.n_steps == 0 {
            0.0
        } else {
            self.duration / self.n_steps as f64
        }
    }

    /// Whether a frame is due after `step` steps.
    pub fn is_output_step(&self, step: usize) -> bool {
        self.refresh_rate > 0 && step % self.refresh_rate == 0
    }
}

/// Stage combination `target = a·u0 + b·(source + dt/|T| R)`.
#[allow(clippy::too_many_arguments)]
fn combine<S: StateVector>(
    mesh: &Mesh2D,
    u0: &[S],
    source: &[S],
    rhs: &[S],
    target: &mut [S],
    a: f64,
    b: f64,
    dt: f64,
) {
    for (i, cell) in mesh.cells().iter().enumerate() {
        let stage = source[i] + rhs[i] * (dt / cell.area);
        target[i] = u0[i] * a + stage * b;
    }
}

/// Run the three stages with `stage_rhs(solution, stage)` as the RHS.
fn advance<S, F>(solution: &mut VrSolution2D<S>, mesh: &Mesh2D, dt: f64, mut stage_rhs: F)
where
    S: StateVector,
    F: FnMut(&mut VrSolution2D<S>, usize) -> Vec<S>,
{
    // Stage 1: u1 = u0 + dt/|T| R(u0)
    let rhs = stage_rhs(solution, 0);
    let [u0, u1, _] = &mut solution.u_stages;
    combine(mesh, &u0[..], &u0[..], &rhs, &mut u1[..], 0.0, 1.0, dt);

    // Stage 2: u2 = 3/4 u0 + 1/4 (u1 + dt/|T| R(u1))
    let rhs = stage_rhs(solution, 1);
    let [u0, u1, u2] = &mut solution.u_stages;
    combine(mesh, &u0[..], &u1[..], &rhs, &mut u2[..], 0.75, 0.25, dt);

    // Stage 3: u0 = 1/3 u0 + 2/3 (u2 + dt/|T| R(u2))
    let rhs = stage_rhs(solution, 2);
    let [u0, _, u2] = &mut solution.u_stages;
    for (i, cell) in mesh.cells().iter().enumerate() {
        let stage = u2[i] + rhs[i] * (dt / cell.area);
        u0[i] = u0[i] * (1.0 / 3.0) + stage * (2.0 / 3.0);
    }
}

/// Advance the stage-0 averages of `solution` by one SSP-RK3 step.
pub fn ssp_rk3_vr_step<R: RiemannSolver2D>(
    solution: &mut VrSolution2D<R::State>,
    mesh: &Mesh2D,
    ops: &VrOperators2D,
    config: &VrRhsConfig<R>,
    dt: f64,
) {
    advance(solution, mesh, dt, |q, stage| {
        compute_stage_rhs(q, stage, mesh, ops, config)
    });
}

/// Parallel version of [`ssp_rk3_vr_step`].
#[cfg(feature = "parallel")]
pub fn ssp_rk3_vr_step_parallel<R: RiemannSolver2D>(
    solution: &mut VrSolution2D<R::State>,
    mesh: &Mesh2D,
    ops: &VrOperators2D,
    config: &VrRhsConfig<R>,
    dt: f64,
) {
    advance(solution, mesh, dt, |q, stage| {
        crate::solver::compute_stage_rhs_parallel(q, stage, mesh, ops, config)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundaryManager, EdgeCouplings};
    use crate::flux::LinearUpwind2D;
    use crate::operators::VrConfig;
    use crate::solver::total_integral;
    use approx::assert_relative_eq;

    fn periodic(nx: usize, ny: usize, degree: usize) -> (Mesh2D, EdgeCouplings, VrOperators2D) {
        let mesh = Mesh2D::uniform_triangles(0.0, 1.0, 0.0, 1.0, nx, ny).unwrap();
        let couplings = BoundaryManager::periodic_box(&mesh)
            .unwrap()
            .finalize(&mesh)
            .unwrap();
        let ops = VrOperators2D::assemble(&mesh, &couplings, &VrConfig::new(degree)).unwrap();
        (mesh, couplings, ops)
    }

    fn wave(mesh: &Mesh2D, ops: &VrOperators2D) -> VrSolution2D<f64> {
        let mut q = VrSolution2D::for_operators(ops);
        for cell in mesh.cells() {
            q.u_stages[0][cell.id.index()] = (2.0 * std::f64::consts::PI * cell.centroid.x).sin();
        }
        q
    }

    #[test]
    fn test_time_config() {
        let time = VrTimeConfig::new(2.0, 100).with_refresh_rate(25);
        assert_relative_eq!(time.dt(), 0.02);
        assert!(time.is_output_step(50));
        assert!(!time.is_output_step(51));
        assert_eq!(VrTimeConfig::new(1.0, 0).dt(), 0.0);
        assert!(!VrTimeConfig::new(1.0, 4).with_refresh_rate(0).is_output_step(4));
    }

    #[test]
    fn test_uniform_state_is_steady() {
        let (mesh, couplings, ops) = periodic(4, 4, 2);
        let solver = LinearUpwind2D::new((1.0, 0.3));
        let config = VrRhsConfig::new(&couplings, &solver);
        let mut q = VrSolution2D::for_operators(&ops);
        q.u_stages[0].fill(2.0);
        for _ in 0..5 {
            ssp_rk3_vr_step(&mut q, &mesh, &ops, &config, 0.01);
        }
        for &u in q.averages() {
            assert_relative_eq!(u, 2.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_step_conserves_total() {
        let (mesh, couplings, ops) = periodic(8, 4, 1);
        let solver = LinearUpwind2D::new((1.0, 0.0));
        let config = VrRhsConfig::new(&couplings, &solver);
        let mut q = wave(&mesh, &ops);
        q.u_stages[0].iter_mut().for_each(|u| *u += 1.0);

        let before = total_integral(&mesh, q.averages());
        let time = VrTimeConfig::new(0.1, 10);
        for _ in 0..time.n_steps {
            ssp_rk3_vr_step(&mut q, &mesh, &ops, &config, time.dt());
        }
        let after = total_integral(&mesh, q.averages());

        assert_relative_eq!(before, after, epsilon = 1e-12);
        assert!(q.is_finite());
    }

    #[test]
    fn test_zero_step_is_identity() {
        let (mesh, couplings, ops) = periodic(4, 2, 1);
        let solver = LinearUpwind2D::new((1.0, 0.0));
        let config = VrRhsConfig::new(&couplings, &solver);
        let mut q = wave(&mesh, &ops);
        let before = q.averages().to_vec();
        ssp_rk3_vr_step(&mut q, &mesh, &ops, &config, 0.0);
        for (a, b) in before.iter().zip(q.averages()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-15);
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_step_matches_serial() {
        let (mesh, couplings, ops) = periodic(6, 3, 2);
        let solver = LinearUpwind2D::new((1.0, 0.5));
        let config = VrRhsConfig::new(&couplings, &solver);
        let mut serial = wave(&mesh, &ops);
        let mut parallel = serial.clone();
        for _ in 0..3 {
            ssp_rk3_vr_step(&mut serial, &mesh, &ops, &config, 0.01);
            ssp_rk3_vr_step_parallel(&mut parallel, &mesh, &ops, &config, 0.01);
        }
        assert_eq!(serial, parallel);
    }
}
