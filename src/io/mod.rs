//! Mesh input and frame output in VTK formats.
//!
//! This module provides:
//! - **Mesh input**: legacy ASCII `.vtk` and ASCII XML `.vtu` unstructured
//!   grids, triangles only
//! - **Frame output**: nodes, triangles and named per-cell fields, written
//!   as `.vtu` or `.vtk` depending on the extension
//! - **Series naming**: `{directory}/{model}.{step}.{extension}`
//!
//! # Example
//!
//! ```no_run
//! use vr_fv::io::{OutputFields, read_vtk_mesh, write_vtk_frame};
//!
//! let mesh = read_vtk_mesh("channel.vtu")?;
//! let values = vec![1.0; mesh.n_cells()];
//! let fields = OutputFields::scalar("U")?;
//! write_vtk_frame("channel.0.vtu", &mesh, &values, &fields, 0.0)?;
//! # Ok::<(), vr_fv::io::VtkError>(())
//! ```

mod vtk;
mod vtk_reader;

pub use vtk::{
    OutputFields, VTK_TRIANGLE, VtkError, VtkFormat, frame_path, write_vtk_frame, write_vtk_mesh,
    write_vtk_series,
};
pub use vtk_reader::{parse_legacy_vtk, parse_vtu, read_vtk_mesh};
