//! Runtime diagnostics for VR finite-volume simulations.
//!
//! Provides functions for computing:
//! - Conservation quantities (domain integral of the cell averages)
//! - L2 norms and errors of one component
//! - The largest stable time step for a given CFL number

use crate::equations::StateVector;
use crate::flux::RiemannSolver2D;
use crate::mesh::Mesh2D;
use crate::polynomial::triangle_points;
use crate::types::Point2;

/// Domain integral Σ ū_i |T_i| of the cell averages.
///
/// Conserved exactly by the scheme on periodic meshes and behind solid
/// walls (for the mass and energy components).
pub fn total_integral<S: StateVector>(mesh: &Mesh2D, averages: &[S]) -> S {
    let mut total = S::zero();
    for (cell, &u) in mesh.cells().iter().zip(averages) {
        total += u * cell.area;
    }
    total
}

/// L2 norm of component `component` of the piecewise-constant averages.
pub fn l2_norm<S: StateVector>(mesh: &Mesh2D, averages: &[S], component: usize) -> f64 {
    mesh.cells()
        .iter()
        .zip(averages)
        .map(|(cell, u)| {
            let v = u.component(component);
            v * v * cell.area
        })
        .sum::<f64>()
        .sqrt()
}

/// L2 distance between the averages and an exact solution.
///
/// The exact solution is sampled with the 4-point triangle rule in every
/// cell and compared against the cell's average.
pub fn l2_error<S, F>(mesh: &Mesh2D, averages: &[S], component: usize, exact: F) -> f64
where
    S: StateVector,
    F: Fn(Point2) -> f64,
{
    let mut sum = 0.0;
    for (cell, u) in mesh.cells().iter().zip(averages) {
        let v = u.component(component);
        let [a, b, c] = cell.vertices;
        for (p, w) in triangle_points(a, b, c) {
            let diff = exact(p) - v;
            sum += diff * diff * w;
        }
    }
    sum.sqrt()
}

/// Largest wave speed over all cells.
pub fn max_wave_speed<R: RiemannSolver2D>(solver: &R, averages: &[R::State]) -> f64 {
    averages
        .iter()
        .map(|u| solver.max_wave_speed(u))
        .fold(0.0, f64::max)
}

/// Time step satisfying `dt ≤ cfl · r_i / λ_i` in every cell.
///
/// `r_i = 2|T_i| / perimeter` is the inscribed radius. Returns
/// `f64::INFINITY` when no wave moves.
pub fn max_stable_time_step<R: RiemannSolver2D>(
    mesh: &Mesh2D,
    averages: &[R::State],
    solver: &R,
    cfl: f64,
) -> f64 {
    let mut dt = f64::INFINITY;
    for (cell, u) in mesh.cells().iter().zip(averages) {
        let speed = solver.max_wave_speed(u);
        if speed <= 0.0 {
            continue;
        }
        let perimeter: f64 = cell.sides().iter().map(|&(a, b)| (b - a).norm()).sum();
        let radius = 2.0 * cell.area / perimeter;
        dt = dt.min(cfl * radius / speed);
    }
    dt
}
