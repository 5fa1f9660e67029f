//! Simulation driver.
//!
//! [`VrSimulation`] ties together:
//! - Boundary finalization and operator assembly
//! - Initial state (cell means of a point function)
//! - Fixed-step SSP-RK3 time integration
//! - Frame output every `refresh_rate` steps
//!
//! # Example
//! ```ignore
//! use vr_fv::simulation::{OutputConfig, SimulationConfig, VrSimulation};
//!
//! let config = SimulationConfig::new(VrConfig::new(3), VrTimeConfig::new(2.0, 100))
//!     .with_output(OutputConfig::new("result", "wave", OutputFields::scalar("U")?));
//! let mut sim = VrSimulation::new(mesh, boundaries, LinearUpwind2D::new((1.0, 0.0)), config)?;
//! sim.set_initial_state(|p| (4.0 * PI * p.x).sin());
//! let result = sim.calculate()?;
//! ```

mod runner;

pub use runner::{OutputConfig, SimulationConfig, SimulationError, SimulationResult, VrSimulation};
