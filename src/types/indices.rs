//! Strongly-typed dense ids for mesh entities.
//!
//! Nodes, edges and cells live in dense arenas owned by
//! [`Mesh2D`](crate::mesh::Mesh2D); adjacency is stored as these ids
//! instead of references, so an edge id can never be used to look up a cell.

use std::fmt;

/// Generate an id newtype that indexes slices and vectors directly.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw arena position.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Raw arena position.
            #[inline]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(id: $name) -> usize {
                id.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, id: $name) -> &T {
                &self[id.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, id: $name) -> &mut T {
                &mut self[id.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, id: $name) -> &T {
                &self[id.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, id: $name) -> &mut T {
                &mut self[id.0]
            }
        }
    };
}

define_id!(
    /// Position of a node in the mesh node arena.
    ///
    /// ```
    /// use vr_fv::types::NodeId;
    ///
    /// let n = NodeId::new(7);
    /// assert_eq!(n.index(), 7);
    /// assert_eq!(n.to_string(), "N7");
    /// ```
    NodeId,
    "N"
);

define_id!(
    /// Position of an edge in the mesh edge arena.
    EdgeId,
    "E"
);

define_id!(
    /// Position of a triangle in the mesh cell arena.
    ///
    /// Cell ids are dense and follow insertion order; the id found in a mesh
    /// file is kept separately as the cell label.
    CellId,
    "C"
);
