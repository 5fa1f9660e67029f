//! Boundary partitions, periodic stitching and edge couplings.
//!
//! Boundary edges are split into named groups by caller predicates. Each
//! group is then either paired with another group as periodic or given a
//! wall kind:
//!
//! | Condition | Flux | Reconstruction |
//! |-----------|------|----------------|
//! | periodic | Riemann flux against the translated partner cell | partner cell as a neighbour |
//! | solid wall | wall flux of the Riemann solver | mirror cell with equal average |
//! | free wall | physical flux of the interior state | mirror cell with equal average |
//!
//! [`BoundaryManager::finalize`] checks the configuration once and produces
//! the [`EdgeCouplings`] consumed by reconstruction and flux evaluation.

mod coupling;
mod manager;

pub use coupling::{EdgeCoupling, EdgeCouplings, Neighbor, WallKind};
pub use manager::{BoundaryError, BoundaryManager};
