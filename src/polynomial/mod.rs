//! Quadrature rules and monomial bookkeeping.
//!
//! This module provides:
//! - Gauss-Legendre rules (1-4 points) mapped onto mesh edges
//! - The 4-point cubic-exact triangle rule
//! - Monomial ordering, coefficient counts and factorial helpers used by the
//!   reconstruction basis

mod monomial;
mod quadrature;

pub use monomial::{
    MAX_DEGREE, binomial, factorial, falling_factorial, monomial_exponents, n_coefficients,
};
pub use quadrature::{
    LineRule, MAX_LINE_POINTS, TRIANGLE_BARYCENTRIC, TRIANGLE_WEIGHTS, integrate_triangle,
    triangle_points,
};
