//! Conserved-variable types.
//!
//! - [`StateVector`]: the vector-space interface shared by cell averages,
//!   reconstruction coefficients and fluxes (implemented for `f64`)
//! - [`EulerState2D`] / [`Primitive2D`] with the [`IdealGas`] closure for
//!   the 2D Euler equations

mod euler_2d;
mod state;

pub use euler_2d::{EulerState2D, IdealGas, Primitive2D};
pub use state::StateVector;
