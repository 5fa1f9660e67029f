//! VR finite-volume solver components.
//!
//! # Submodules
//!
//! - `state_2d`: solution container ([`VrSolution2D`]) with the RK stage
//!   buffers and the reconstruction coefficients
//! - `reconstruction`: Jacobi relaxation of the coefficients
//! - `rhs_vr_2d`: edge fluxes and the semi-discrete right-hand side
//! - [`diagnostics`]: conservation, L2 and time step diagnostics
//!
//! # Stage evaluation
//!
//! Every RK stage runs the same two steps:
//!
//! 1. [`relax_coefficients`] warm-started from the previous coefficients
//! 2. [`compute_rhs_vr_2d`] with the relaxed reconstruction
//!
//! [`compute_stage_rhs`] bundles both.

pub mod diagnostics;
mod reconstruction;
mod rhs_vr_2d;
mod state_2d;

pub use reconstruction::{reconstruction_residual, relax_coefficients};
pub use rhs_vr_2d::{VrRhsConfig, compute_edge_fluxes, compute_rhs_vr_2d, compute_stage_rhs};
pub use state_2d::{N_STAGES, VrSolution2D, reconstruct_value};

pub use diagnostics::{
    l2_error, l2_norm, max_stable_time_step, max_wave_speed, total_integral,
};

#[cfg(feature = "parallel")]
pub use reconstruction::relax_coefficients_parallel;
#[cfg(feature = "parallel")]
pub use rhs_vr_2d::{compute_rhs_vr_2d_parallel, compute_stage_rhs_parallel};
