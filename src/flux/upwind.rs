//! Upwind flux for scalar linear advection in 2D.
//!
//! For ∂u/∂t + a·∇u = 0 the flux through an edge with normal n depends only
//! on a_n = a·n:
//!
//! F^* = a_n u_left   if a_n > 0  (flow from left to right)
//! F^* = a_n u_right  otherwise

use super::traits::{FluxContext2D, RiemannSolver2D};

/// Upwind flux for constant-velocity advection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearUpwind2D {
    /// Advection velocity (a_x, a_y).
    pub velocity: (f64, f64),
}

impl LinearUpwind2D {
    pub fn new(velocity: (f64, f64)) -> Self {
        Self { velocity }
    }

    /// Velocity component along `normal`.
    #[inline]
    pub fn normal_speed(&self, normal: (f64, f64)) -> f64 {
        self.velocity.0 * normal.0 + self.velocity.1 * normal.1
    }
}

impl RiemannSolver2D for LinearUpwind2D {
    type State = f64;

    #[inline]
    fn flux(&self, left: &f64, right: &f64, ctx: &FluxContext2D) -> f64 {
        let a_n = self.normal_speed(ctx.normal);
        if a_n > 0.0 { a_n * left } else { a_n * right }
    }

    fn solid_wall_flux(&self, _state: &f64, _ctx: &FluxContext2D) -> f64 {
        0.0
    }

    fn free_wall_flux(&self, state: &f64, ctx: &FluxContext2D) -> f64 {
        self.normal_speed(ctx.normal) * state
    }

    fn max_wave_speed(&self, _state: &f64) -> f64 {
        self.velocity.0.hypot(self.velocity.1)
    }

    fn name(&self) -> &'static str {
        "linear-upwind"
    }
}
