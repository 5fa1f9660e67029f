//! Polynomial reconstruction basis.
//!
//! Each triangle carries a runtime-degree (0-3) monomial basis in scaled
//! local coordinates, corrected to zero cell mean, together with the
//! normal-derivative tables used to build reconstruction matrices.

mod vr_basis_2d;

pub use vr_basis_2d::VrBasis2D;
