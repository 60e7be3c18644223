//! Zoom-aware point clustering.
//!
//! [`SpatialClusterIndex`] bulk-loads weighted points and answers:
//! - which clusters and points are visible in a bbox at an integer zoom
//! - which original points sit under a cluster
//! - a cluster's direct children and the zoom at which it splits

mod index;
mod node;

pub use index::{ClusterHandle, ClusterItem, IndexPoint, SpatialClusterIndex};
