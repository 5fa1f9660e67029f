//! VTK mesh input.
//!
//! Reads the nodes and cells of an unstructured grid into a [`Mesh2D`]:
//!
//! - `.vtk`: legacy ASCII `DATASET UNSTRUCTURED_GRID`
//! - `.vtu`: XML UnstructuredGrid with ASCII data arrays
//!
//! Only triangles (VTK cell type 5) become cells; other cell types are
//! skipped with a warning. Point and cell data are ignored. Points get
//! their zero-based position in the file as node index, cells their
//! position as label.

use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};

use super::vtk::{VTK_TRIANGLE, VtkError, VtkFormat};
use crate::mesh::Mesh2D;

/// Read a `.vtk` or `.vtu` file.
pub fn read_vtk_mesh(path: impl AsRef<Path>) -> Result<Mesh2D, VtkError> {
    let path = path.as_ref();
    let format = VtkFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let mesh = match format {
        VtkFormat::Legacy => parse_legacy_vtk(&content)?,
        VtkFormat::Xml => parse_vtu(&content)?,
    };
    debug!(
        "Read {}: {} nodes, {} edges, {} cells",
        path.display(),
        mesh.n_nodes(),
        mesh.n_edges(),
        mesh.n_cells()
    );
    Ok(mesh)
}

/// Cells as `(vtk type, point indices)`.
type RawCell = (u8, Vec<usize>);

/// Emplace points and the triangle cells into a new mesh.
fn build_mesh(points: &[(f64, f64)], cells: &[RawCell]) -> Result<Mesh2D, VtkError> {
    let mut mesh = Mesh2D::with_capacity(points.len(), cells.len());
    for (i, &(x, y)) in points.iter().enumerate() {
        mesh.emplace_node(i, x, y)?;
    }

    let mut skipped = 0;
    for (i, (cell_type, ids)) in cells.iter().enumerate() {
        match (*cell_type, ids.as_slice()) {
            (VTK_TRIANGLE, &[a, b, c]) => {
                mesh.emplace_cell(i, [a, b, c])?;
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("Skipped {} non-triangle cells", skipped);
    }
    Ok(mesh)
}

// =============================================================================
// Legacy format
// =============================================================================

/// Whitespace-separated tokens with their (1-based) line numbers.
struct Tokens<'a> {
    tokens: Vec<(usize, &'a str)>,
    pos: usize,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new<I: Iterator<Item = (usize, &'a str)>>(lines: I) -> Self {
        let mut last_line = 0;
        let tokens = lines
            .flat_map(|(i, line)| {
                last_line = last_line.max(i + 1);
                line.split_whitespace().map(move |t| (i + 1, t))
            })
            .collect();
        Self {
            tokens,
            pos: 0,
            last_line,
        }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    /// Fail unless at least `n` tokens are left.
    fn require(&self, n: usize, what: &str) -> Result<(), VtkError> {
        if n > self.remaining() {
            return Err(VtkError::Parse {
                line: self.last_line,
                message: format!("{} needs {} tokens, {} left", what, n, self.remaining()),
            });
        }
        Ok(())
    }

    /// Parse a count of records with `per_record` tokens each.
    fn count(&mut self, what: &str, per_record: usize) -> Result<usize, VtkError> {
        let (line, token) = self.next(what)?;
        let n: usize = token.parse().map_err(|_| VtkError::Parse {
            line,
            message: format!("invalid {}: {:?}", what, token),
        })?;
        let total = n.checked_mul(per_record).ok_or_else(|| VtkError::Parse {
            line,
            message: format!("{} {} is too large", what, n),
        })?;
        self.require(total, what)?;
        Ok(n)
    }

    fn next(&mut self, what: &str) -> Result<(usize, &'a str), VtkError> {
        let token = self.tokens.get(self.pos).copied().ok_or_else(|| VtkError::Parse {
            line: self.last_line,
            message: format!("unexpected end of file, expected {}", what),
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> Result<T, VtkError> {
        let (line, token) = self.next(what)?;
        token.parse().map_err(|_| VtkError::Parse {
            line,
            message: format!("invalid {}: {:?}", what, token),
        })
    }

    fn skip(&mut self, n: usize, what: &str) -> Result<(), VtkError> {
        for _ in 0..n {
            self.next(what)?;
        }
        Ok(())
    }
}

/// Parse legacy ASCII VTK content.
pub fn parse_legacy_vtk(content: &str) -> Result<Mesh2D, VtkError> {
    let mut lines = content.lines().enumerate();

    match lines.next() {
        Some((_, header)) if header.trim_start().starts_with("# vtk DataFile") => {}
        _ => {
            return Err(VtkError::Parse {
                line: 1,
                message: "missing \"# vtk DataFile\" header".to_string(),
            });
        }
    }
    // Title
    lines.next();
    match lines.next() {
        Some((_, kind)) if kind.trim().eq_ignore_ascii_case("ASCII") => {}
        Some((_, kind)) => return Err(VtkError::UnsupportedFormat(format!("{} legacy file", kind.trim()))),
        None => {
            return Err(VtkError::Parse {
                line: 3,
                message: "missing ASCII/BINARY line".to_string(),
            });
        }
    }

    let mut tokens = Tokens::new(lines);
    let mut points: Vec<(f64, f64)> = Vec::new();
    let mut cell_ids: Vec<Vec<usize>> = Vec::new();
    let mut cell_types: Vec<u8> = Vec::new();

    while !tokens.is_empty() {
        let (line, keyword) = tokens.next("section keyword")?;
        match keyword.to_ascii_uppercase().as_str() {
            "DATASET" => {
                let (_, kind) = tokens.next("dataset type")?;
                if !kind.eq_ignore_ascii_case("UNSTRUCTURED_GRID") {
                    return Err(VtkError::UnsupportedFormat(format!("dataset {}", kind)));
                }
            }
            "FIELD" => {
                tokens.next("field name")?;
                let n_arrays: usize = tokens.parse("field array count")?;
                for _ in 0..n_arrays {
                    let (line, _) = tokens.next("array name")?;
                    let n_components: usize = tokens.parse("component count")?;
                    let n_tuples: usize = tokens.parse("tuple count")?;
                    tokens.next("array type")?;
                    let n_values = n_components.checked_mul(n_tuples).ok_or_else(|| VtkError::Parse {
                        line,
                        message: format!("field array of {} x {} values is too large", n_components, n_tuples),
                    })?;
                    tokens.require(n_values, "field array")?;
                    tokens.skip(n_values, "field value")?;
                }
            }
            "POINTS" => {
                let n = tokens.count("point count", 3)?;
                tokens.next("point type")?;
                points.reserve(n);
                for _ in 0..n {
                    let x: f64 = tokens.parse("x coordinate")?;
                    let y: f64 = tokens.parse("y coordinate")?;
                    let _z: f64 = tokens.parse("z coordinate")?;
                    points.push((x, y));
                }
            }
            "CELLS" => {
                let n = tokens.count("cell count", 1)?;
                let _size: usize = tokens.parse("cell list size")?;
                cell_ids.reserve(n);
                for _ in 0..n {
                    let k: usize = tokens.parse("cell vertex count")?;
                    let ids = (0..k)
                        .map(|_| tokens.parse("point index"))
                        .collect::<Result<Vec<usize>, _>>()?;
                    cell_ids.push(ids);
                }
            }
            "CELL_TYPES" => {
                let n = tokens.count("cell type count", 1)?;
                cell_types = (0..n)
                    .map(|_| tokens.parse("cell type"))
                    .collect::<Result<_, _>>()?;
            }
            // Attribute data is not part of the mesh
            "POINT_DATA" | "CELL_DATA" => break,
            other => {
                return Err(VtkError::Parse {
                    line,
                    message: format!("unexpected keyword {:?}", other),
                });
            }
        }
    }

    if cell_types.len() != cell_ids.len() {
        return Err(VtkError::Parse {
            line: tokens.last_line,
            message: format!(
                "{} cells but {} cell types",
                cell_ids.len(),
                cell_types.len()
            ),
        });
    }
    let cells: Vec<RawCell> = cell_types.into_iter().zip(cell_ids).collect();
    build_mesh(&points, &cells)
}

// =============================================================================
// XML format
// =============================================================================

/// One `<DataArray>` element.
struct XmlDataArray<'a> {
    name: Option<&'a str>,
    format: Option<&'a str>,
    body: &'a str,
    line: usize,
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

/// Value of `name="..."` inside an opening tag.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let key = format!(" {}=\"", name);
    let start = tag.find(&key)? + key.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

/// Content between `<name ...>` and `</name>`, with its byte offset.
fn element<'a>(content: &'a str, name: &str) -> Result<(usize, &'a str), VtkError> {
    let missing = || VtkError::Parse {
        line: line_of(content, content.len()),
        message: format!("missing <{}> element", name),
    };
    let open = format!("<{}", name);
    let close = format!("</{}>", name);
    let start = content.find(&open).ok_or_else(missing)?;
    let body_start = start + content[start..].find('>').ok_or_else(missing)? + 1;
    let end = body_start + content[body_start..].find(&close).ok_or_else(missing)?;
    Ok((body_start, &content[body_start..end]))
}

/// Every DataArray of a section, in order.
fn data_arrays<'a>(
    content: &'a str,
    offset: usize,
    section: &'a str,
) -> Result<Vec<XmlDataArray<'a>>, VtkError> {
    let mut arrays = Vec::new();
    let mut rest = 0;
    while let Some(found) = section[rest..].find("<DataArray") {
        let start = rest + found;
        let line = line_of(content, offset + start);
        let unterminated = || VtkError::Parse {
            line,
            message: "unterminated <DataArray>".to_string(),
        };
        let tag_end = start + section[start..].find('>').ok_or_else(unterminated)?;
        let tag = &section[start..tag_end];
        let body_end = tag_end + section[tag_end..].find("</DataArray>").ok_or_else(unterminated)?;
        arrays.push(XmlDataArray {
            name: attribute(tag, "Name"),
            format: attribute(tag, "format"),
            body: &section[tag_end + 1..body_end],
            line,
        });
        rest = body_end;
    }
    Ok(arrays)
}

impl XmlDataArray<'_> {
    fn values<T: FromStr>(&self) -> Result<Vec<T>, VtkError> {
        match self.format {
            Some("ascii") => {}
            other => {
                return Err(VtkError::UnsupportedFormat(format!(
                    "DataArray format {:?}",
                    other.unwrap_or("none")
                )));
            }
        }
        self.body
            .split_whitespace()
            .map(|t| {
                t.parse().map_err(|_| VtkError::Parse {
                    line: self.line,
                    message: format!("invalid value {:?} in {:?}", t, self.name.unwrap_or("DataArray")),
                })
            })
            .collect()
    }
}

fn named<'a, 'b>(
    arrays: &'b [XmlDataArray<'a>],
    name: &str,
    line: usize,
) -> Result<&'b XmlDataArray<'a>, VtkError> {
    arrays
        .iter()
        .find(|a| a.name == Some(name))
        .ok_or_else(|| VtkError::Parse {
            line,
            message: format!("missing {:?} DataArray", name),
        })
}

/// Parse ASCII XML UnstructuredGrid content.
pub fn parse_vtu(content: &str) -> Result<Mesh2D, VtkError> {
    let start = content.find("<VTKFile").ok_or_else(|| VtkError::Parse {
        line: 1,
        message: "missing <VTKFile> element".to_string(),
    })?;
    let file_tag = &content[start..];
    let tag_end = file_tag.find('>').unwrap_or(file_tag.len());
    if attribute(&file_tag[..tag_end], "type") != Some("UnstructuredGrid") {
        return Err(VtkError::UnsupportedFormat(
            "VTKFile type is not UnstructuredGrid".to_string(),
        ));
    }
    if content.contains("<AppendedData") {
        return Err(VtkError::UnsupportedFormat("appended data".to_string()));
    }

    let (points_offset, points_section) = element(content, "Points")?;
    let points_arrays = data_arrays(content, points_offset, points_section)?;
    let coordinates: Vec<f64> = points_arrays
        .first()
        .ok_or_else(|| VtkError::Parse {
            line: line_of(content, points_offset),
            message: "empty <Points> element".to_string(),
        })?
        .values()?;
    if coordinates.len() % 3 != 0 {
        return Err(VtkError::Parse {
            line: line_of(content, points_offset),
            message: format!("{} coordinates is not a multiple of 3", coordinates.len()),
        });
    }
    let points: Vec<(f64, f64)> = coordinates.chunks(3).map(|p| (p[0], p[1])).collect();

    let (cells_offset, cells_section) = element(content, "Cells")?;
    let cells_line = line_of(content, cells_offset);
    let cell_arrays = data_arrays(content, cells_offset, cells_section)?;
    let connectivity: Vec<usize> = named(&cell_arrays, "connectivity", cells_line)?.values()?;
    let offsets: Vec<usize> = named(&cell_arrays, "offsets", cells_line)?.values()?;
    let types: Vec<u8> = named(&cell_arrays, "types", cells_line)?.values()?;
    if offsets.len() != types.len() {
        return Err(VtkError::Parse {
            line: cells_line,
            message: format!("{} offsets but {} cell types", offsets.len(), types.len()),
        });
    }

    let mut cells = Vec::with_capacity(types.len());
    let mut begin = 0;
    for (&end, &cell_type) in offsets.iter().zip(&types) {
        let ids = connectivity.get(begin..end).ok_or_else(|| VtkError::Parse {
            line: cells_line,
            message: format!("cell offsets {}..{} out of range", begin, end),
        })?;
        cells.push((cell_type, ids.to_vec()));
        begin = end;
    }
    build_mesh(&points, &cells)
}
