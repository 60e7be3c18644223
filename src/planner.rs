//! Viewport-driven render planning.
//!
//! The planner owns the cluster index and its lookup table as one snapshot
//! and decides, per host update, whether to rebuild them, requery them, or
//! hand back the previous primitive list untouched.
//!
//! | change                               | outcome     |
//! |--------------------------------------|-------------|
//! | new input array                      | `Rebuilt`   |
//! | zoom bucket crossed                  | `Requeried` |
//! | pan outside the padded covered area  | `Requeried` |
//! | anything else                        | `Reused`    |

use crate::cluster::{ClusterItem, SpatialClusterIndex};
use crate::config::{ClusterConfig, Config, PlannerConfig};
use crate::error::{ClusterError, Result};
use crate::lookup::Lookup;
use crate::pick::{Pick, PickResolver};
use geocluster_types::bbox::{BBox, Viewport};
use geocluster_types::entity::GeoGroup;
use geocluster_types::render::RenderPoint;
use std::sync::Arc;
use std::time::Instant;

/// What an [`RenderPlanner::update`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The previous primitive list still covers the viewport.
    Reused,
    /// Same data, new query.
    Requeried,
    /// Input changed; index and lookup were rebuilt and queried.
    Rebuilt,
}

/// Index and lookup over the same input snapshot.
struct Snapshot<A> {
    index: SpatialClusterIndex,
    lookup: Lookup<A>,
}

impl<A> Snapshot<A> {
    fn build(cluster: &ClusterConfig, input: &Arc<[GeoGroup<A>]>) -> Result<Self> {
        let started = Instant::now();
        let (lookup, points) = Lookup::build(Arc::clone(input));
        let mut index = SpatialClusterIndex::new(cluster.clone())?;
        index.load(&points);

        log::debug!(
            "Rebuilt render snapshot from {} groups ({} indexed) in {:?}",
            input.len(),
            lookup.len(),
            started.elapsed()
        );

        Ok(Self { index, lookup })
    }
}

/// Produces render primitives for a viewport, reusing work where it can.
pub struct RenderPlanner<A> {
    cluster: ClusterConfig,
    config: PlannerConfig,
    snapshot: Option<Snapshot<A>>,
    last_bucket: Option<i32>,
    covered: Option<BBox>,
    points: Vec<RenderPoint>,
}

impl<A> RenderPlanner<A> {
    pub fn new(cluster: ClusterConfig, config: PlannerConfig) -> Result<Self> {
        cluster.validate()?;
        config.validate()?;
        Ok(Self {
            cluster,
            config,
            snapshot: None,
            last_bucket: None,
            covered: None,
            points: Vec::new(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.cluster.clone(), config.planner.clone())
    }

    /// True iff there is no previous snapshot or `next` is a different array.
    ///
    /// Identity, not content: an equal but freshly allocated array rebuilds.
    pub fn should_rebuild_index(
        prev: Option<&Arc<[GeoGroup<A>]>>,
        next: &Arc<[GeoGroup<A>]>,
    ) -> bool {
        prev.is_none_or(|prev| !Arc::ptr_eq(prev, next))
    }

    pub fn should_requery(prev_bucket: Option<i32>, next_bucket: i32, data_changed: bool) -> bool {
        data_changed || prev_bucket != Some(next_bucket)
    }

    /// Query `index` and turn each result into a lightweight primitive.
    pub fn plan(
        index: &SpatialClusterIndex,
        lookup: &Lookup<A>,
        bbox: &BBox,
        zoom: i32,
    ) -> Result<Vec<RenderPoint>> {
        let items = index.get_clusters(bbox, zoom)?;
        let snapshot = index.snapshot().ok_or(ClusterError::NotLoaded)?;
        Ok(items
            .into_iter()
            .map(|item| match item {
                ClusterItem::Point(point) => {
                    debug_assert!(lookup.contains(&point.key));
                    RenderPoint::single(point.geolocation, point.weight, point.key, snapshot)
                }
                ClusterItem::Cluster(cluster) => {
                    RenderPoint::cluster(cluster.geolocation, cluster.weight, cluster.id)
                }
            })
            .collect())
    }

    /// Bring the primitive list up to date with `input` and `viewport`.
    ///
    /// The rebuild, if any, completes before the query that depends on it.
    /// On error the previous state is left in place.
    pub fn update(
        &mut self,
        input: &Arc<[GeoGroup<A>]>,
        viewport: &Viewport,
    ) -> Result<UpdateOutcome> {
        if !viewport.zoom.is_finite() {
            return Err(ClusterError::InvalidInput(format!(
                "Viewport zoom must be finite, got: {}",
                viewport.zoom
            )));
        }
        if !viewport.bbox.is_finite() {
            return Err(ClusterError::InvalidInput(format!(
                "Viewport bbox must be finite, got: {:?}",
                viewport.bbox
            )));
        }

        let prev = self.snapshot.as_ref().map(|snapshot| snapshot.lookup.groups());
        let rebuild = Self::should_rebuild_index(prev, input);
        let bucket = viewport.zoom_bucket();

        if !Self::should_requery(self.last_bucket, bucket, rebuild)
            && self
                .covered
                .is_some_and(|covered| covered.contains_bbox(&viewport.bbox))
        {
            log::trace!("Reusing {} render points at zoom {}", self.points.len(), bucket);
            return Ok(UpdateOutcome::Reused);
        }

        let query = viewport.bbox.padded(self.config.viewport_padding);
        let (snapshot, points) = if rebuild {
            let snapshot = Snapshot::build(&self.cluster, input)?;
            let points = Self::plan(&snapshot.index, &snapshot.lookup, &query, bucket)?;
            (Some(snapshot), points)
        } else {
            match &self.snapshot {
                Some(current) => (
                    None,
                    Self::plan(&current.index, &current.lookup, &query, bucket)?,
                ),
                None => return Err(ClusterError::NotLoaded),
            }
        };

        if let Some(snapshot) = snapshot {
            self.snapshot = Some(snapshot);
        }
        self.points = points;
        self.last_bucket = Some(bucket);
        self.covered = Some(query);

        log::trace!(
            "Planned {} render points at zoom {} ({})",
            self.points.len(),
            bucket,
            if rebuild { "rebuilt" } else { "requeried" }
        );

        Ok(if rebuild {
            UpdateOutcome::Rebuilt
        } else {
            UpdateOutcome::Requeried
        })
    }

    /// Primitives from the last successful update.
    pub fn points(&self) -> &[RenderPoint] {
        &self.points
    }

    /// Resolve a primitive against the current snapshot.
    pub fn resolve(&self, primitive: &RenderPoint) -> Option<Pick<'_, A>> {
        let snapshot = self.snapshot.as_ref()?;
        PickResolver::resolve(primitive, &snapshot.index, &snapshot.lookup)
    }

    /// Zoom at which a cluster primitive splits; `None` for singles and
    /// stale ids.
    pub fn expansion_zoom(&self, primitive: &RenderPoint) -> Option<i32> {
        let id = primitive.cluster_id()?;
        let snapshot = self.snapshot.as_ref()?;
        snapshot.index.get_cluster_expansion_zoom(id).ok().flatten()
    }

    pub fn index(&self) -> Option<&SpatialClusterIndex> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.index)
    }

    pub fn lookup(&self) -> Option<&Lookup<A>> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.lookup)
    }

    /// Padded area the current primitive list was computed for.
    pub fn covered(&self) -> Option<BBox> {
        self.covered
    }

    pub fn cluster_config(&self) -> &ClusterConfig {
        &self.cluster
    }

    pub fn planner_config(&self) -> &PlannerConfig {
        &self.config
    }
}
