//! Mesh topology for unstructured triangular meshes.
//!
//! # Structure
//!
//! - `element`: nodes, edges and triangles plus the positive/negative side
//!   convention
//! - `mesh2d`: the [`Mesh2D`] arena with deduplicating edge construction and
//!   a uniform rectangle generator
//!
//! Mesh files are read through [`crate::io`].

mod element;
mod mesh2d;

pub use element::{Edge, EdgeSide, Node, Triangle};
pub use mesh2d::{Mesh2D, MeshError};
