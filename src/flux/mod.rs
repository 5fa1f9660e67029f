//! Numerical fluxes for finite-volume edges.
//!
//! - [`LinearUpwind2D`]: scalar advection with a constant velocity
//! - [`Ausm2D`]: AUSM splitting for the 2D Euler equations
//!
//! Both implement [`RiemannSolver2D`], which also supplies the wall fluxes
//! used on solid and free boundaries.

mod ausm;
mod traits;
mod upwind;

pub use ausm::Ausm2D;
pub use traits::{FluxContext2D, RiemannSolver2D};
pub use upwind::LinearUpwind2D;
