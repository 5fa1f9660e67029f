//! Trait-based Riemann solver abstraction.
//!
//! A Riemann solver turns two states on either side of an edge into the
//! numerical flux through that edge, measured along the edge normal. The
//! solver sees only states and the normal; reconstruction and quadrature
//! happen in the caller.
//!
//! # Example
//! ```
//! use vr_fv::flux::{FluxContext2D, LinearUpwind2D, RiemannSolver2D};
//!
//! let solver = LinearUpwind2D::new((1.0, 0.0));
//! let ctx = FluxContext2D::new((1.0, 0.0));
//!
//! // Flow along the normal: the left state is upwind
//! assert_eq!(solver.flux(&2.0, &5.0, &ctx), 2.0);
//!
//! // Using a trait object
//! let dyn_solver: &dyn RiemannSolver2D<State = f64> = &solver;
//! assert_eq!(dyn_solver.name(), "linear-upwind");
//! ```

use crate::equations::StateVector;

// =============================================================================
// Flux Context
// =============================================================================

/// Geometric information passed to a flux evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluxContext2D {
    /// Unit normal pointing from the left into the right state.
    pub normal: (f64, f64),
}

impl FluxContext2D {
    #[inline]
    pub fn new(normal: (f64, f64)) -> Self {
        Self { normal }
    }

    /// Same edge seen from the other side.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: (-self.normal.0, -self.normal.1),
        }
    }
}

// =============================================================================
// Riemann Solver Trait
// =============================================================================

/// Numerical flux for a conservation law in 2D.
///
/// # Implementation Notes
///
/// - Consistency: `flux(u, u, n) == free_wall_flux(u, n)` (the physical flux)
/// - Conservation: `flux(l, r, n) == -flux(r, l, -n)`
/// - Implementations must be pure: the solver may call them from several
///   threads at once
pub trait RiemannSolver2D: Send + Sync {
    /// State (and flux) type.
    type State: StateVector;

    /// Flux through an interior edge, from `left` towards `right`.
    fn flux(&self, left: &Self::State, right: &Self::State, ctx: &FluxContext2D) -> Self::State;

    /// Flux through an impermeable wall; `ctx.normal` points out of the domain.
    fn solid_wall_flux(&self, state: &Self::State, ctx: &FluxContext2D) -> Self::State;

    /// Flux through a transmissive boundary; `ctx.normal` points out of the domain.
    fn free_wall_flux(&self, state: &Self::State, ctx: &FluxContext2D) -> Self::State;

    /// Fastest signal speed of `state` in any direction.
    fn max_wave_speed(&self, state: &Self::State) -> f64;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}
