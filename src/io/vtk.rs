//! VTK output for VR finite-volume solutions.
//!
//! Writes one frame per file with the mesh nodes, the triangles and the
//! configured per-cell fields:
//!
//! - `.vtu`: XML UnstructuredGrid (ASCII)
//! - `.vtk`: legacy ASCII UNSTRUCTURED_GRID
//!
//! The simulation time is stored as a `TIME` field in both formats.
//!
//! # Example
//!
//! ```ignore
//! use vr_fv::io::{OutputFields, write_vtk_frame};
//!
//! let fields = OutputFields::<f64>::scalar("U")?;
//! write_vtk_frame("frame.vtu", &mesh, solution.averages(), &fields, time)?;
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::equations::{EulerState2D, IdealGas};
use crate::mesh::{Mesh2D, MeshError};

/// VTK cell type of a linear triangle.
pub const VTK_TRIANGLE: u8 = 5;

/// Error type for VTK operations.
#[derive(Debug, Error)]
pub enum VtkError {
    /// I/O error during file operations.
    #[error("VTK I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed file content.
    #[error("VTK parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Valid VTK, but not a layout this reader handles.
    #[error("unsupported VTK content: {0}")]
    UnsupportedFormat(String),

    /// Neither `.vtk` nor `.vtu`.
    #[error("unknown VTK extension: {}", .0.display())]
    UnknownExtension(PathBuf),

    /// Output fields need a name.
    #[error("empty field name")]
    EmptyFieldName,

    /// Field names are single tokens in legacy files and attribute values
    /// in `.vtu` files.
    #[error("field name {0:?} contains whitespace or XML markup characters")]
    InvalidFieldName(String),

    /// The data passed for output does not match the mesh.
    #[error("expected {expected} cell values, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },

    /// The file describes an invalid mesh.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

// =============================================================================
// Output fields
// =============================================================================

type ScalarFn<S> = Box<dyn Fn(&S) -> f64 + Send + Sync>;
type VectorFn<S> = Box<dyn Fn(&S) -> (f64, f64) + Send + Sync>;

/// Named per-cell quantities written with every frame.
///
/// Scalars are one value per cell; vectors are planar and written with a
/// zero third component.
pub struct OutputFields<S> {
    scalars: Vec<(String, ScalarFn<S>)>,
    vectors: Vec<(String, VectorFn<S>)>,
}

impl<S> Default for OutputFields<S> {
    fn default() -> Self {
        Self {
            scalars: Vec::new(),
            vectors: Vec::new(),
        }
    }
}

impl<S> fmt::Debug for OutputFields<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputFields")
            .field("scalars", &self.scalar_names().collect::<Vec<_>>())
            .field("vectors", &self.vector_names().collect::<Vec<_>>())
            .finish()
    }
}

fn check_name(name: &str) -> Result<(), VtkError> {
    if name.is_empty() {
        return Err(VtkError::EmptyFieldName);
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '&' | '"' | '\''))
    {
        return Err(VtkError::InvalidFieldName(name.to_string()));
    }
    Ok(())
}

impl<S> OutputFields<S> {
    /// No fields: frames contain the mesh only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar field.
    pub fn with_scalar<F>(mut self, name: impl Into<String>, f: F) -> Result<Self, VtkError>
    where
        F: Fn(&S) -> f64 + Send + Sync + 'static,
    {
        let name = name.into();
        check_name(&name)?;
        self.scalars.push((name, Box::new(f)));
        Ok(self)
    }

    /// Add a 2-component vector field.
    pub fn with_vector<F>(mut self, name: impl Into<String>, f: F) -> Result<Self, VtkError>
    where
        F: Fn(&S) -> (f64, f64) + Send + Sync + 'static,
    {
        let name = name.into();
        check_name(&name)?;
        self.vectors.push((name, Box::new(f)));
        Ok(self)
    }

    pub fn n_scalars(&self) -> usize {
        self.scalars.len()
    }

    pub fn n_vectors(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.vectors.is_empty()
    }

    pub fn scalar_names(&self) -> impl Iterator<Item = &str> {
        self.scalars.iter().map(|(name, _)| name.as_str())
    }

    pub fn vector_names(&self) -> impl Iterator<Item = &str> {
        self.vectors.iter().map(|(name, _)| name.as_str())
    }

    /// Values of every scalar field, one `Vec` per field.
    fn scalar_data(&self, values: &[S]) -> Vec<(&str, Vec<f64>)> {
        self.scalars
            .iter()
            .map(|(name, f)| (name.as_str(), values.iter().map(f).collect()))
            .collect()
    }

    /// Values of every vector field as flat `(x, y, 0)` triples.
    fn vector_data(&self, values: &[S]) -> Vec<(&str, Vec<f64>)> {
        self.vectors
            .iter()
            .map(|(name, f)| {
                let data = values
                    .iter()
                    .flat_map(|u| {
                        let (x, y) = f(u);
                        [x, y, 0.0]
                    })
                    .collect();
                (name.as_str(), data)
            })
            .collect()
    }
}

impl OutputFields<f64> {
    /// A single scalar field holding the cell value.
    pub fn scalar(name: impl Into<String>) -> Result<Self, VtkError> {
        Self::new().with_scalar(name, |&u| u)
    }
}

impl OutputFields<EulerState2D> {
    /// Density, pressure, Mach number and velocity of an ideal gas.
    pub fn euler(gas: IdealGas) -> Self {
        let mut fields = Self::new();
        fields.scalars.push(("rho".into(), Box::new(|u: &EulerState2D| u.rho)));
        fields.scalars.push((
            "p".into(),
            Box::new(move |u: &EulerState2D| gas.to_primitive(u).p),
        ));
        fields.scalars.push((
            "mach".into(),
            Box::new(move |u: &EulerState2D| {
                let prim = gas.to_primitive(u);
                prim.u.hypot(prim.v) / gas.speed_of_sound(&prim)
            }),
        ));
        fields.vectors.push((
            "velocity".into(),
            Box::new(move |u: &EulerState2D| {
                let prim = gas.to_primitive(u);
                (prim.u, prim.v)
            }),
        ));
        fields
    }
}

// =============================================================================
// Formats
// =============================================================================

/// File format, chosen by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VtkFormat {
    /// `.vtu`
    Xml,
    /// `.vtk`
    Legacy,
}

impl VtkFormat {
    pub fn from_path(path: &Path) -> Result<Self, VtkError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("vtu") => Ok(Self::Xml),
            Some("vtk") => Ok(Self::Legacy),
            _ => Err(VtkError::UnknownExtension(path.to_path_buf())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xml => "vtu",
            Self::Legacy => "vtk",
        }
    }
}

/// Mesh geometry flattened for output.
struct VtkMesh {
    points: Vec<(f64, f64)>,
    cells: Vec<[usize; 3]>,
}

fn build_vtk_mesh(mesh: &Mesh2D) -> VtkMesh {
    VtkMesh {
        points: mesh
            .nodes()
            .iter()
            .map(|n| (n.position.x, n.position.y))
            .collect(),
        cells: mesh
            .cells()
            .iter()
            .map(|c| c.nodes.map(|id| id.index()))
            .collect(),
    }
}

// =============================================================================
// XML writer
// =============================================================================

/// VTK XML writer helper.
struct VtkWriter<W: Write> {
    writer: BufWriter<W>,
    indent: usize,
}

impl<W: Write> VtkWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            indent: 0,
        }
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        for _ in 0..self.indent {
            write!(self.writer, "  ")?;
        }
        Ok(())
    }

    fn write_header(&mut self) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\"?>")?;
        writeln!(
            self.writer,
            "<VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        self.indent += 1;
        Ok(())
    }

    fn write_footer(&mut self) -> std::io::Result<()> {
        self.indent -= 1;
        writeln!(self.writer, "</VTKFile>")?;
        self.writer.flush()?;
        Ok(())
    }

    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{}", name)?;
        for (key, value) in attrs {
            write!(self.writer, " {}=\"{}\"", key, value)?;
        }
        writeln!(self.writer, ">")?;
        self.indent += 1;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> std::io::Result<()> {
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</{}>", name)?;
        Ok(())
    }

    /// Body of a DataArray, `per_line` values per line.
    fn write_values<T: fmt::Display>(&mut self, data: &[T], per_line: usize) -> std::io::Result<()> {
        self.indent += 1;
        for chunk in data.chunks(per_line) {
            self.write_indent()?;
            for (i, v) in chunk.iter().enumerate() {
                if i > 0 {
                    write!(self.writer, " ")?;
                }
                write!(self.writer, "{}", v)?;
            }
            writeln!(self.writer)?;
        }
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")
    }

    fn write_data_array_f64(
        &mut self,
        name: &str,
        data: &[f64],
        components: usize,
    ) -> std::io::Result<()> {
        self.write_indent()?;
        if components > 1 {
            writeln!(
                self.writer,
                "<DataArray type=\"Float64\" Name=\"{}\" NumberOfComponents=\"{}\" format=\"ascii\">",
                name, components
            )?;
        } else {
            writeln!(
                self.writer,
                "<DataArray type=\"Float64\" Name=\"{}\" format=\"ascii\">",
                name
            )?;
        }
        let formatted: Vec<String> = data.iter().map(|v| format!("{:.16e}", v)).collect();
        self.write_values(&formatted, 6)
    }

    fn write_data_array_i64(&mut self, name: &str, data: &[i64]) -> std::io::Result<()> {
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"Int64\" Name=\"{}\" format=\"ascii\">",
            name
        )?;
        self.write_values(data, 20)
    }

    fn write_data_array_u8(&mut self, name: &str, data: &[u8]) -> std::io::Result<()> {
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"UInt8\" Name=\"{}\" format=\"ascii\">",
            name
        )?;
        self.write_values(data, 20)
    }

    fn write_points(&mut self, points: &[(f64, f64)]) -> std::io::Result<()> {
        self.start_element("Points", &[])?;
        let flat: Vec<f64> = points.iter().flat_map(|&(x, y)| [x, y, 0.0]).collect();
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">"
        )?;
        let formatted: Vec<String> = flat.iter().map(|v| format!("{:.16e}", v)).collect();
        self.write_values(&formatted, 6)?;
        self.end_element("Points")
    }

    fn write_cells(&mut self, cells: &[[usize; 3]]) -> std::io::Result<()> {
        self.start_element("Cells", &[])?;

        let connectivity: Vec<i64> = cells
            .iter()
            .flat_map(|c| c.iter().map(|&v| v as i64))
            .collect();
        self.write_data_array_i64("connectivity", &connectivity)?;

        // Offsets (cumulative vertex count)
        let offsets: Vec<i64> = (1..=cells.len()).map(|i| (i * 3) as i64).collect();
        self.write_data_array_i64("offsets", &offsets)?;

        let types = vec![VTK_TRIANGLE; cells.len()];
        self.write_data_array_u8("types", &types)?;

        self.end_element("Cells")
    }

    fn write_field_data(&mut self, name: &str, value: f64) -> std::io::Result<()> {
        self.start_element("FieldData", &[])?;
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"Float64\" Name=\"{}\" NumberOfTuples=\"1\" format=\"ascii\">",
            name
        )?;
        self.write_values(&[format!("{:.16e}", value)], 1)?;
        self.end_element("FieldData")
    }
}

fn write_vtu<W: Write, S>(
    out: W,
    vtk_mesh: &VtkMesh,
    values: &[S],
    fields: &OutputFields<S>,
    time: f64,
) -> std::io::Result<()> {
    let mut writer = VtkWriter::new(out);
    let n_points = vtk_mesh.points.len().to_string();
    let n_cells = vtk_mesh.cells.len().to_string();

    writer.write_header()?;
    writer.start_element("UnstructuredGrid", &[])?;
    writer.write_field_data("TIME", time)?;
    writer.start_element(
        "Piece",
        &[("NumberOfPoints", &n_points), ("NumberOfCells", &n_cells)],
    )?;

    writer.write_points(&vtk_mesh.points)?;
    writer.write_cells(&vtk_mesh.cells)?;

    if !fields.is_empty() {
        let mut attrs = Vec::new();
        if let Some(first) = fields.scalar_names().next() {
            attrs.push(("Scalars", first));
        }
        if let Some(first) = fields.vector_names().next() {
            attrs.push(("Vectors", first));
        }
        writer.start_element("CellData", &attrs)?;
        for (name, data) in fields.scalar_data(values) {
            writer.write_data_array_f64(name, &data, 1)?;
        }
        for (name, data) in fields.vector_data(values) {
            writer.write_data_array_f64(name, &data, 3)?;
        }
        writer.end_element("CellData")?;
    }

    writer.end_element("Piece")?;
    writer.end_element("UnstructuredGrid")?;
    writer.write_footer()
}

// =============================================================================
// Legacy writer
// =============================================================================

fn write_legacy<W: Write, S>(
    out: W,
    vtk_mesh: &VtkMesh,
    values: &[S],
    fields: &OutputFields<S>,
    time: f64,
) -> std::io::Result<()> {
    let mut w = BufWriter::new(out);
    let n_cells = vtk_mesh.cells.len();

    writeln!(w, "# vtk DataFile Version 3.0")?;
    writeln!(w, "vr-fv frame")?;
    writeln!(w, "ASCII")?;
    writeln!(w, "DATASET UNSTRUCTURED_GRID")?;
    writeln!(w, "FIELD FieldData 1")?;
    writeln!(w, "TIME 1 1 double")?;
    writeln!(w, "{:.16e}", time)?;

    writeln!(w, "POINTS {} double", vtk_mesh.points.len())?;
    for &(x, y) in &vtk_mesh.points {
        writeln!(w, "{:.16e} {:.16e} 0", x, y)?;
    }

    writeln!(w, "CELLS {} {}", n_cells, 4 * n_cells)?;
    for [a, b, c] in &vtk_mesh.cells {
        writeln!(w, "3 {} {} {}", a, b, c)?;
    }
    writeln!(w, "CELL_TYPES {}", n_cells)?;
    for _ in 0..n_cells {
        writeln!(w, "{}", VTK_TRIANGLE)?;
    }

    if !fields.is_empty() {
        writeln!(w, "CELL_DATA {}", n_cells)?;
        for (name, data) in fields.scalar_data(values) {
            writeln!(w, "SCALARS {} double 1", name)?;
            writeln!(w, "LOOKUP_TABLE default")?;
            for v in data {
                writeln!(w, "{:.16e}", v)?;
            }
        }
        for (name, data) in fields.vector_data(values) {
            writeln!(w, "VECTORS {} double", name)?;
            for v in data.chunks(3) {
                writeln!(w, "{:.16e} {:.16e} {:.16e}", v[0], v[1], v[2])?;
            }
        }
    }
    w.flush()
}

// =============================================================================
// Public API
// =============================================================================

/// Write one frame; the format follows the extension of `path`.
pub fn write_vtk_frame<S>(
    path: impl AsRef<Path>,
    mesh: &Mesh2D,
    values: &[S],
    fields: &OutputFields<S>,
    time: f64,
) -> Result<(), VtkError> {
    let path = path.as_ref();
    let format = VtkFormat::from_path(path)?;
    if values.len() != mesh.n_cells() {
        return Err(VtkError::CellCountMismatch {
            expected: mesh.n_cells(),
            actual: values.len(),
        });
    }

    let vtk_mesh = build_vtk_mesh(mesh);
    let file = File::create(path)?;
    match format {
        VtkFormat::Xml => write_vtu(file, &vtk_mesh, values, fields, time)?,
        VtkFormat::Legacy => write_legacy(file, &vtk_mesh, values, fields, time)?,
    }
    Ok(())
}

/// Write the mesh alone.
pub fn write_vtk_mesh(path: impl AsRef<Path>, mesh: &Mesh2D) -> Result<(), VtkError> {
    let values = vec![(); mesh.n_cells()];
    write_vtk_frame(path, mesh, &values, &OutputFields::new(), 0.0)
}

/// Path of frame `step`: `{directory}/{model}.{step}.{extension}`.
pub fn frame_path(directory: &Path, model: &str, step: usize, extension: &str) -> PathBuf {
    directory.join(format!(
        "{}.{}.{}",
        model,
        step,
        extension.trim_start_matches('.')
    ))
}

/// Write frame `step` of a series and return its path.
#[allow(clippy::too_many_arguments)]
pub fn write_vtk_series<S>(
    directory: &Path,
    model: &str,
    extension: &str,
    step: usize,
    mesh: &Mesh2D,
    values: &[S],
    fields: &OutputFields<S>,
    time: f64,
) -> Result<PathBuf, VtkError> {
    let path = frame_path(directory, model, step, extension);
    write_vtk_frame(&path, mesh, values, fields, time)?;
    Ok(path)
}
