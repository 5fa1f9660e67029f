//! Simulation runner implementation.
//!
//! [`VrSimulation`] owns the mesh, the finalized boundary couplings, the
//! assembled operators and the solution, and runs a fixed number of
//! SSP-RK3 steps with periodic frame output.

use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info, warn};
use thiserror::Error;

use crate::boundary::{BoundaryError, BoundaryManager, EdgeCouplings};
use crate::equations::StateVector;
use crate::flux::RiemannSolver2D;
use crate::io::{OutputFields, VtkError, VtkFormat, frame_path, write_vtk_series};
use crate::mesh::{Mesh2D, MeshError, Triangle};
use crate::operators::{VrConfig, VrError, VrOperators2D};
use crate::polynomial::triangle_points;
use crate::solver::{VrRhsConfig, VrSolution2D, max_stable_time_step};
use crate::time::VrTimeConfig;
use crate::types::Point2;

/// Error type for simulation setup and runs.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Operators(#[from] VrError),

    #[error(transparent)]
    Output(#[from] VtkError),

    /// Output directory could not be created.
    #[error("cannot create output directory: {0}")]
    Io(#[from] std::io::Error),

    /// The solution blew up.
    #[error("non-finite solution after step {step} (t = {time})")]
    NonFinite { step: usize, time: f64 },
}

// =============================================================================
// Simulation Configuration
// =============================================================================

/// Where and what to write.
#[derive(Debug)]
pub struct OutputConfig<S> {
    pub directory: PathBuf,
    /// File stem shared by all frames.
    pub model_name: String,
    /// `vtu` or `vtk`.
    pub extension: String,
    pub fields: OutputFields<S>,
}

impl<S> OutputConfig<S> {
    /// `.vtu` output into `directory`.
    pub fn new(directory: impl Into<PathBuf>, model_name: impl Into<String>, fields: OutputFields<S>) -> Self {
        Self {
            directory: directory.into(),
            model_name: model_name.into(),
            extension: "vtu".to_string(),
            fields,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Configuration for a simulation run.
#[derive(Debug)]
pub struct SimulationConfig<S> {
    pub vr: VrConfig,
    pub time: VrTimeConfig,
    /// No frames are written when `None`.
    pub output: Option<OutputConfig<S>>,
}

impl<S> Default for SimulationConfig<S> {
    fn default() -> Self {
        Self {
            vr: VrConfig::default(),
            time: VrTimeConfig::default(),
            output: None,
        }
    }
}

impl<S> SimulationConfig<S> {
    pub fn new(vr: VrConfig, time: VrTimeConfig) -> Self {
        Self {
            vr,
            time,
            output: None,
        }
    }

    pub fn with_output(mut self, output: OutputConfig<S>) -> Self {
        self.output = Some(output);
        self
    }
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationResult {
    /// Number of time steps taken.
    pub n_steps: usize,
    /// Final simulation time reached.
    pub final_time: f64,
    /// Total wall-clock time in seconds.
    pub wall_time: f64,
    /// Frames written, including the initial one.
    pub frames_written: usize,
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// Fixed-step VR finite-volume simulation.
pub struct VrSimulation<R: RiemannSolver2D> {
    mesh: Mesh2D,
    couplings: EdgeCouplings,
    ops: VrOperators2D,
    solver: R,
    solution: VrSolution2D<R::State>,
    config: SimulationConfig<R::State>,
}

impl<R: RiemannSolver2D> VrSimulation<R> {
    /// Finalize the boundaries and assemble the operators.
    ///
    /// The solution starts at zero; see [`set_initial_state`](Self::set_initial_state).
    pub fn new(
        mesh: Mesh2D,
        boundaries: BoundaryManager,
        solver: R,
        config: SimulationConfig<R::State>,
    ) -> Result<Self, SimulationError> {
        if let Some(output) = &config.output {
            let first = frame_path(&output.directory, &output.model_name, 0, &output.extension);
            VtkFormat::from_path(&first)?;
        }

        let couplings = boundaries.finalize(&mesh)?;

        #[cfg(feature = "parallel")]
        let ops = VrOperators2D::assemble_parallel(&mesh, &couplings, &config.vr)?;
        #[cfg(not(feature = "parallel"))]
        let ops = VrOperators2D::assemble(&mesh, &couplings, &config.vr)?;

        info!(
            "VR setup: {} cells, {} edges ({} periodic, {} wall), degree {}, solver {}",
            mesh.n_cells(),
            mesh.n_edges(),
            couplings.n_periodic(),
            couplings.n_walls(),
            ops.degree(),
            solver.name()
        );

        let solution = VrSolution2D::for_operators(&ops);
        Ok(Self {
            mesh,
            couplings,
            ops,
            solver,
            solution,
            config,
        })
    }

    pub fn mesh(&self) -> &Mesh2D {
        &self.mesh
    }

    pub fn couplings(&self) -> &EdgeCouplings {
        &self.couplings
    }

    pub fn operators(&self) -> &VrOperators2D {
        &self.ops
    }

    pub fn solver(&self) -> &R {
        &self.solver
    }

    pub fn config(&self) -> &SimulationConfig<R::State> {
        &self.config
    }

    pub fn solution(&self) -> &VrSolution2D<R::State> {
        &self.solution
    }

    pub fn solution_mut(&mut self) -> &mut VrSolution2D<R::State> {
        &mut self.solution
    }

    /// Set every cell average to the cell mean of `f`.
    ///
    /// The mean is taken with the 4-point triangle rule. Reconstruction
    /// coefficients are reset.
    pub fn set_initial_state<F>(&mut self, f: F)
    where
        F: Fn(Point2) -> R::State,
    {
        self.set_initial_averages(|cell| {
            let [a, b, c] = cell.vertices;
            let mut sum = R::State::zero();
            for (p, w) in triangle_points(a, b, c) {
                sum += f(p) * w;
            }
            sum * (1.0 / cell.area)
        });
    }

    /// Set every cell average from a per-cell function.
    pub fn set_initial_averages<F>(&mut self, f: F)
    where
        F: Fn(&Triangle) -> R::State,
    {
        for (cell, u) in self.mesh.cells().iter().zip(self.solution.averages_mut()) {
            *u = f(cell);
        }
        self.solution.clear_coefficients();
    }

    /// Advance the solution by one SSP-RK3 step.
    pub fn step(&mut self, dt: f64) {
        let rhs_config = VrRhsConfig::new(&self.couplings, &self.solver)
            .with_relaxation(self.config.vr.relaxation);

        #[cfg(feature = "parallel")]
        crate::time::ssp_rk3_vr_step_parallel(&mut self.solution, &self.mesh, &self.ops, &rhs_config, dt);
        #[cfg(not(feature = "parallel"))]
        crate::time::ssp_rk3_vr_step(&mut self.solution, &self.mesh, &self.ops, &rhs_config, dt);
    }

    /// Write frame `step` if output is configured; returns the frame count.
    fn write_frame(&self, step: usize, time: f64) -> Result<usize, SimulationError> {
        let Some(output) = &self.config.output else {
            return Ok(0);
        };
        let path = write_vtk_series(
            &output.directory,
            &output.model_name,
            &output.extension,
            step,
            &self.mesh,
            self.solution.averages(),
            &output.fields,
            time,
        )?;
        debug!("Wrote {}", path.display());
        Ok(1)
    }

    /// Run the configured number of steps.
    ///
    /// Frame 0 is written before the first step and another frame every
    /// `refresh_rate` steps. A failed write or a non-finite solution stops
    /// the run.
    pub fn calculate(&mut self) -> Result<SimulationResult, SimulationError> {
        let start_wall = Instant::now();
        let n_steps = self.config.time.n_steps;
        let dt = self.config.time.dt();

        if let Some(output) = &self.config.output {
            std::fs::create_dir_all(&output.directory)?;
        }

        info!(
            "Starting simulation: {} steps of dt = {:.4e} up to t = {:.4}",
            n_steps, dt, self.config.time.duration
        );

        let dt_limit = max_stable_time_step(&self.mesh, self.solution.averages(), &self.solver, 1.0);
        if dt > dt_limit {
            warn!(
                "Time step {:.4e} exceeds the CFL estimate {:.4e}",
                dt, dt_limit
            );
        }

        let mut frames_written = self.write_frame(0, 0.0)?;
        let mut t = 0.0;
        for step in 1..=n_steps {
            self.step(dt);
            t = step as f64 * dt;

            if !self.solution.is_finite() {
                return Err(SimulationError::NonFinite { step, time: t });
            }
            if self.config.time.is_output_step(step) {
                frames_written += self.write_frame(step, t)?;
                info!("Progress: {}/{}", step, n_steps);
            }
        }

        let wall_time = start_wall.elapsed().as_secs_f64();
        info!(
            "Simulation complete: {} steps, t = {:.4}, {} frames, wall time {:.2}s",
            n_steps, t, frames_written, wall_time
        );

        Ok(SimulationResult {
            n_steps,
            final_time: t,
            wall_time,
            frames_written,
        })
    }
}
