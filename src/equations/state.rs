//! Generic cell state for scalar equations and systems.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

/// A vector of conserved variables (and of fluxes of those variables).
///
/// Reconstruction coefficients, cell averages, fluxes and right-hand sides
/// all use the same type: the solver only needs vector-space operations, and
/// the Riemann solver returns a flux as a state-shaped quantity.
pub trait StateVector:
    Copy
    + Default
    + Debug
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign<f64>
    + 'static
{
    /// Number of scalar components.
    const N_VARS: usize;

    /// Additive identity.
    #[inline]
    fn zero() -> Self {
        Self::default()
    }

    /// Component `i` (0-based, `i < N_VARS`).
    fn component(&self, i: usize) -> f64;

    /// Overwrite component `i`.
    fn set_component(&mut self, i: usize, value: f64);

    /// Largest absolute component.
    fn max_abs(&self) -> f64 {
        (0..Self::N_VARS)
            .map(|i| self.component(i).abs())
            .fold(0.0, f64::max)
    }

    /// Whether every component is finite.
    fn is_finite(&self) -> bool {
        (0..Self::N_VARS).all(|i| self.component(i).is_finite())
    }
}

impl StateVector for f64 {
    const N_VARS: usize = 1;

    #[inline]
    fn component(&self, _i: usize) -> f64 {
        *self
    }

    #[inline]
    fn set_component(&mut self, _i: usize, value: f64) {
        *self = value;
    }
}
