//! Strongly-typed ids and plane geometry shared by the mesh, boundary and
//! solver layers.

mod indices;
mod point;

pub use indices::{CellId, EdgeId, NodeId};
pub use point::Point2;
