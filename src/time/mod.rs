//! Time integration methods.

mod ssp_rk3_vr;

pub use ssp_rk3_vr::{VrTimeConfig, ssp_rk3_vr_step};

#[cfg(feature = "parallel")]
pub use ssp_rk3_vr::ssp_rk3_vr_step_parallel;
