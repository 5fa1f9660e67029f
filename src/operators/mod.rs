//! VR operators: per-cell bases, reconstruction matrices and edge couplings.
//!
//! This module provides:
//! - The inverted cell matrices A_i⁻¹ of the reconstruction functional
//! - The edge coupling matrices B and moment vectors b
//! - Assembly configuration ([`VrConfig`]) and relaxation settings
//!   ([`RelaxationConfig`])

mod vr_2d;

pub use vr_2d::{
    EdgeMatrices, RelaxationConfig, SINGULAR_TOLERANCE, VrConfig, VrError, VrOperators2D,
    derivative_weights,
};
