//! Zoom-aware clustering and pick resolution for interactive maps.
//!
//! ```rust
//! use geocluster::prelude::*;
//! use std::sync::Arc;
//!
//! let at = |lon, lat| Point::new(lon, lat);
//! let input: Arc<[GeoGroup<()>]> = vec![
//!     GeoGroup::new(at(10.0, 10.0), vec![GeoEntity::new("a", Some(at(10.0, 10.0)), ())]),
//!     GeoGroup::new(at(10.0001, 10.0), vec![GeoEntity::new("b", Some(at(10.0001, 10.0)), ())]),
//! ]
//! .into();
//!
//! let mut planner = RenderPlanner::from_config(&Config::default())?;
//! planner.update(&input, &Viewport::new(BBox::world(), 3.0))?;
//!
//! let cluster = planner.points()[0];
//! assert!(cluster.is_cluster());
//! assert_eq!(planner.resolve(&cluster).map(|pick| pick.count()), Some(2));
//! # Ok::<(), geocluster::ClusterError>(())
//! ```

pub mod cluster;
pub mod compute;
pub mod config;
pub mod error;
pub mod lookup;
pub mod network;
pub mod pick;
pub mod planner;
pub mod scene;

#[cfg(feature = "geojson")]
pub mod geojson;

#[cfg(feature = "sync")]
pub mod sync;

pub use cluster::{ClusterHandle, ClusterItem, IndexPoint, SpatialClusterIndex};
pub use config::{ClusterConfig, Config, PlannerConfig};
pub use error::{ClusterError, Result};
pub use lookup::Lookup;
pub use network::{DrawEdge, EdgePolicy, Network, RelationshipEdgeBuilder, build_network};
pub use pick::{ClusterAggregate, Pick, PickResolver};
pub use planner::{RenderPlanner, UpdateOutcome};
pub use scene::{Frame, Mode, compose};

pub use compute::{Rgba, color_of, group_by_coordinate, legend};

pub use geocluster_types::bbox::{BBox, Viewport};
pub use geocluster_types::edge::{EdgeRecord, EndpointPoint};
pub use geocluster_types::entity::{EntityId, GeoEntity, GeoGroup};
pub use geocluster_types::render::{ClusterId, GeoKey, RenderPoint, RenderTarget};

#[cfg(feature = "sync")]
pub use sync::SharedPlanner;

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterError, Config, Result, UpdateOutcome};

    pub use crate::{BBox, GeoEntity, GeoGroup, RenderPoint, Viewport};

    pub use crate::{Pick, RenderPlanner};

    pub use crate::{EdgePolicy, EdgeRecord, Network, build_network, color_of};

    pub use crate::{Mode, compose};

    #[cfg(feature = "sync")]
    pub use crate::SharedPlanner;

    pub use geo::Point;
}
