//! # geocluster-types
//!
//! Core data types shared by the geocluster engine and its hosts.
//!
//! - **Entity types**: `EntityId`, `GeoEntity`, `GeoGroup`
//! - **Render types**: `GeoKey`, `ClusterId`, `RenderPoint`
//! - **Relationship types**: `EdgeRecord`, `EndpointPoint`
//! - **Viewport types**: `BBox`, `Viewport`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! `Point`.
//!
//! ## Examples
//!
//! ```rust
//! use geocluster_types::bbox::{BBox, Viewport};
//! use geocluster_types::entity::{GeoEntity, GeoGroup};
//! use geo::Point;
//!
//! let campus = Point::new(13.3777, 52.5163);
//! let group = GeoGroup::new(
//!     campus,
//!     vec![GeoEntity::new("inst-1", Some(campus), "Humboldt")],
//! );
//! assert_eq!(group.count(), 1);
//!
//! let viewport = Viewport::new(BBox::new(13.0, 52.0, 14.0, 53.0), 7.6);
//! assert_eq!(viewport.zoom_bucket(), 7);
//! ```

pub mod bbox;
pub mod edge;
pub mod entity;
pub mod render;

pub use geo;
