//! Thread-safe wrapper for sharing one planner between consumers.
//!
//! `SharedPlanner` wraps [`RenderPlanner`] in `Arc<RwLock<_>>`: the writer
//! drives `update`, while any number of readers take the current primitive
//! list or resolve picks concurrently.
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! geocluster = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use geocluster::{BBox, GeoEntity, GeoGroup, Point, SharedPlanner, Viewport};
//! use std::sync::Arc;
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = SharedPlanner::<()>::with_defaults()?;
//! let at = Point::new(2.35, 48.85);
//! let input: Arc<[GeoGroup<()>]> =
//!     vec![GeoGroup::new(at, vec![GeoEntity::new("paris", Some(at), ())])].into();
//!
//! planner.update(&input, &Viewport::new(BBox::world(), 4.0))?;
//!
//! let reader = planner.clone();
//! let count = thread::spawn(move || reader.points().len()).join().unwrap();
//! assert_eq!(count, 1);
//! # Ok(())
//! # }
//! ```

use crate::config::{ClusterConfig, Config, PlannerConfig};
use crate::error::Result;
use crate::planner::{RenderPlanner, UpdateOutcome};
use geocluster_types::bbox::Viewport;
use geocluster_types::entity::GeoGroup;
use geocluster_types::render::RenderPoint;
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

/// Cloneable handle to a planner behind a read-write lock.
///
/// Clones share state. Reads run concurrently; `update` takes the write lock
/// for the duration of a rebuild or requery.
pub struct SharedPlanner<A> {
    inner: Arc<RwLock<RenderPlanner<A>>>,
}

impl<A> Clone for SharedPlanner<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> SharedPlanner<A> {
    pub fn new(planner: RenderPlanner<A>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(planner)),
        }
    }

    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(RenderPlanner::new(
            ClusterConfig::default(),
            PlannerConfig::default(),
        )?))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(RenderPlanner::from_config(config)?))
    }

    pub fn update(
        &self,
        input: &Arc<[GeoGroup<A>]>,
        viewport: &Viewport,
    ) -> Result<UpdateOutcome> {
        self.inner.write().update(input, viewport)
    }

    /// Copy of the current primitive list.
    pub fn points(&self) -> Vec<RenderPoint> {
        self.inner.read().points().to_vec()
    }

    pub fn expansion_zoom(&self, primitive: &RenderPoint) -> Option<i32> {
        self.inner.read().expansion_zoom(primitive)
    }

    /// Read access to the planner, for borrowing picks without copying.
    ///
    /// Hold the guard briefly; it blocks `update`.
    pub fn read(&self) -> RwLockReadGuard<'_, RenderPlanner<A>> {
        self.inner.read()
    }
}

impl<A: Clone> SharedPlanner<A> {
    /// Resolve a primitive into an owned group, released from the lock.
    pub fn resolve_owned(&self, primitive: &RenderPoint) -> Option<GeoGroup<A>> {
        self.inner
            .read()
            .resolve(primitive)
            .map(|pick| pick.to_group())
    }
}
