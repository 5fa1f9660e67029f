//! # vr-fv
//!
//! A variational reconstruction (VR) finite-volume library for hyperbolic
//! conservation laws on unstructured triangular meshes.
//!
//! This crate provides the building blocks of the method:
//! - Mesh topology with deduplicated edges (triangles only)
//! - Periodic and wall boundaries with virtual neighbours
//! - Zero-mean polynomial bases of degree 0 to 3
//! - VR matrices and Jacobi relaxation of the reconstruction coefficients
//! - Riemann solvers (linear upwind, AUSM for the Euler equations)
//! - Time integration (SSP-RK3)
//! - VTK mesh input and frame output
//!
//! # Example
//!
//! ```no_run
//! use vr_fv::{
//!     BoundaryManager, LinearUpwind2D, Mesh2D, SimulationConfig, VrConfig, VrSimulation,
//!     VrTimeConfig,
//! };
//!
//! # fn main() -> Result<(), vr_fv::SimulationError> {
//! let mesh = Mesh2D::uniform_triangles(-1.0, 1.0, -0.05, 0.05, 80, 4)?;
//! let boundaries = BoundaryManager::periodic_box(&mesh)?;
//! let config = SimulationConfig::new(VrConfig::new(3), VrTimeConfig::new(2.0, 400));
//!
//! let mut sim = VrSimulation::new(mesh, boundaries, LinearUpwind2D::new((1.0, 0.0)), config)?;
//! sim.set_initial_state(|p| (4.0 * std::f64::consts::PI * p.x).sin());
//! let result = sim.calculate()?;
//! println!("{} steps in {:.2}s", result.n_steps, result.wall_time);
//! # Ok(())
//! # }
//! ```

pub mod basis;
pub mod boundary;
pub mod equations;
pub mod flux;
pub mod io;
pub mod mesh;
pub mod operators;
pub mod polynomial;
pub mod simulation;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use basis::VrBasis2D;
pub use boundary::{BoundaryError, BoundaryManager, EdgeCoupling, EdgeCouplings, Neighbor, WallKind};
pub use equations::{EulerState2D, IdealGas, Primitive2D, StateVector};
pub use flux::{Ausm2D, FluxContext2D, LinearUpwind2D, RiemannSolver2D};
pub use io::{OutputFields, VtkError, read_vtk_mesh, write_vtk_frame};
pub use mesh::{Edge, EdgeSide, Mesh2D, MeshError, Node, Triangle};
pub use operators::{RelaxationConfig, VrConfig, VrError, VrOperators2D};
pub use simulation::{OutputConfig, SimulationConfig, SimulationError, SimulationResult, VrSimulation};
pub use solver::{
    VrRhsConfig, VrSolution2D, compute_rhs_vr_2d, compute_stage_rhs, relax_coefficients,
};
pub use time::{VrTimeConfig, ssp_rk3_vr_step};
pub use types::{CellId, EdgeId, NodeId, Point2};

#[cfg(feature = "parallel")]
pub use solver::{compute_rhs_vr_2d_parallel, relax_coefficients_parallel};
#[cfg(feature = "parallel")]
pub use time::ssp_rk3_vr_step_parallel;
