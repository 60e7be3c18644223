//! Hierarchical greedy clustering over a per-zoom R-tree pyramid.
//!
//! ## Structure
//!
//! Points are projected into unit Web-Mercator space. The leaf level (one
//! node per point) sits at `max_cluster_zoom`. Every lower level down to
//! `min_zoom` is derived from the level above it:
//!
//! 1. Visit nodes in level order; skip nodes already absorbed at this zoom.
//! 2. Collect unvisited neighbors within `radius_pixels / (extent * 2^zoom)`
//!    using the level's R-tree.
//! 3. If the neighborhood holds at least `min_points` points, replace it with
//!    one cluster at the point-count weighted centroid. Otherwise carry the
//!    nodes down unchanged.
//!
//! Each level is bulk loaded into its own `rstar::RTree`, so loading is
//! O(n log n) per level and a viewport query is O(log n + k).
//!
//! Clusters live in an arena; a `ClusterId` is the arena slot tagged with the
//! load's snapshot number. Children point at the level above the cluster's
//! formation zoom, so leaves are reached by walking the arena, in time
//! proportional to the cluster size.

use crate::cluster::node::{ClusterRecord, Level, Node, NodeRef};
use crate::compute::projection::{lat_to_y, lon_to_x, x_to_lon, y_to_lat};
use crate::compute::validation::{is_valid_geolocation, validate_bbox};
use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use geo::Point;
use geocluster_types::bbox::{BBox, wrap_lon};
use geocluster_types::render::{ClusterId, GeoKey};
use rstar::AABB;
use smallvec::smallvec;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

static NEXT_SNAPSHOT: AtomicU64 = AtomicU64::new(1);

/// A weighted input point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexPoint {
    pub geolocation: Point,
    pub weight: u64,
    pub key: GeoKey,
}

impl IndexPoint {
    pub fn new(geolocation: Point, weight: u64) -> Self {
        Self {
            geolocation,
            weight,
            key: GeoKey::from_point(&geolocation),
        }
    }
}

/// A cluster visible at some zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterHandle {
    pub id: ClusterId,
    pub geolocation: Point,
    /// Number of original points underneath.
    pub num_points: u32,
    /// Sum of the underlying point weights.
    pub weight: u64,
}

/// One result of a viewport query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterItem {
    Point(IndexPoint),
    Cluster(ClusterHandle),
}

impl ClusterItem {
    pub fn geolocation(&self) -> Point {
        match self {
            ClusterItem::Point(point) => point.geolocation,
            ClusterItem::Cluster(cluster) => cluster.geolocation,
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            ClusterItem::Point(point) => point.weight,
            ClusterItem::Cluster(cluster) => cluster.weight,
        }
    }

    pub fn num_points(&self) -> u32 {
        match self {
            ClusterItem::Point(_) => 1,
            ClusterItem::Cluster(cluster) => cluster.num_points,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, ClusterItem::Cluster(_))
    }
}

struct Loaded {
    snapshot: u64,
    points: Vec<IndexPoint>,
    /// `levels[i]` holds zoom `min_zoom + i`; the last level holds the leaves.
    levels: Vec<Level>,
    clusters: Vec<ClusterRecord>,
}

/// Spatial clustering index answering viewport and expansion queries.
pub struct SpatialClusterIndex {
    config: ClusterConfig,
    loaded: Option<Loaded>,
}

impl SpatialClusterIndex {
    pub fn new(config: ClusterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            loaded: None,
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Number of indexed points (invalid input points excluded).
    pub fn len(&self) -> usize {
        self.loaded.as_ref().map_or(0, |loaded| loaded.points.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot number of the current load, if any.
    pub fn snapshot(&self) -> Option<u64> {
        self.loaded.as_ref().map(|loaded| loaded.snapshot)
    }

    /// Build the hierarchy over `points`, replacing any previous load.
    ///
    /// Points with a missing or out-of-range geolocation are skipped.
    pub fn load(&mut self, points: &[IndexPoint]) {
        let started = Instant::now();

        let kept: Vec<IndexPoint> = points
            .iter()
            .filter(|point| is_valid_geolocation(&point.geolocation))
            .copied()
            .collect();
        let skipped = points.len() - kept.len();

        let leaves: Vec<Node> = kept
            .iter()
            .enumerate()
            .map(|(i, point)| Node {
                x: lon_to_x(point.geolocation.x()),
                y: lat_to_y(point.geolocation.y()),
                num_points: 1,
                weight: point.weight,
                target: NodeRef::Leaf(i as u32),
            })
            .collect();

        let mut clusters = Vec::new();
        let mut levels = Vec::with_capacity(usize::from(
            self.config.max_cluster_zoom - self.config.min_zoom,
        ) + 1);
        let mut current = Level::new(leaves);

        for zoom in (self.config.min_zoom..self.config.max_cluster_zoom).rev() {
            let merged = self.cluster_level(&current, zoom, &mut clusters);
            levels.push(current);
            current = Level::new(merged);
        }
        levels.push(current);
        levels.reverse();

        let snapshot = NEXT_SNAPSHOT.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "Loaded cluster index snapshot {}: {} points ({} skipped), {} clusters over {} levels in {:?}",
            snapshot,
            kept.len(),
            skipped,
            clusters.len(),
            levels.len(),
            started.elapsed()
        );

        self.loaded = Some(Loaded {
            snapshot,
            points: kept,
            levels,
            clusters,
        });
    }

    fn cluster_level(
        &self,
        level: &Level,
        zoom: u8,
        clusters: &mut Vec<ClusterRecord>,
    ) -> Vec<Node> {
        let radius = self.config.radius_at(zoom);
        let mut visited = vec![false; level.nodes.len()];
        let mut merged = Vec::with_capacity(level.nodes.len());
        let mut neighbors: Vec<usize> = Vec::new();

        for (i, node) in level.nodes.iter().enumerate() {
            if visited[i] {
                continue;
            }
            visited[i] = true;

            neighbors.clear();
            neighbors.extend(
                level
                    .tree
                    .locate_within_distance([node.x, node.y], radius * radius)
                    .map(|entry| entry.data as usize)
                    .filter(|&j| !visited[j]),
            );
            neighbors.sort_unstable();

            let num_points = node.num_points
                + neighbors
                    .iter()
                    .map(|&j| level.nodes[j].num_points)
                    .sum::<u32>();

            if num_points > node.num_points && num_points as usize >= self.config.min_points {
                let mut wx = node.x * f64::from(node.num_points);
                let mut wy = node.y * f64::from(node.num_points);
                let mut weight = node.weight;
                let mut children = smallvec![node.target];

                for &j in &neighbors {
                    visited[j] = true;
                    let other = &level.nodes[j];
                    wx += other.x * f64::from(other.num_points);
                    wy += other.y * f64::from(other.num_points);
                    weight += other.weight;
                    children.push(other.target);
                }

                let x = wx / f64::from(num_points);
                let y = wy / f64::from(num_points);
                let slot = clusters.len() as u32;
                clusters.push(ClusterRecord {
                    x,
                    y,
                    num_points,
                    weight,
                    zoom,
                    children,
                });
                merged.push(Node {
                    x,
                    y,
                    num_points,
                    weight,
                    target: NodeRef::Cluster(slot),
                });
            } else {
                merged.push(*node);
                if num_points > 1 {
                    for &j in &neighbors {
                        visited[j] = true;
                        merged.push(level.nodes[j]);
                    }
                }
            }
        }

        merged
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(ClusterError::NotLoaded)
    }

    /// Clusters and points inside `bbox` at integer `zoom`.
    ///
    /// Zooms below `min_zoom` clamp to it; at or above `max_cluster_zoom`
    /// every point is returned individually. Results are ordered north to
    /// south, then west to east.
    pub fn get_clusters(&self, bbox: &BBox, zoom: i32) -> Result<Vec<ClusterItem>> {
        let loaded = self.loaded()?;

        if let Err(e) = validate_bbox(bbox) {
            log::warn!("Rejecting cluster query: {}", e);
            return Ok(Vec::new());
        }

        let level = &loaded.levels[self.level_index(zoom)];
        let south = bbox.south.clamp(-90.0, 90.0);
        let north = bbox.north.clamp(-90.0, 90.0);

        let mut hits: Vec<usize> = Vec::new();
        if bbox.lon_span() >= 360.0 {
            Self::query_level(level, -180.0, south, 180.0, north, &mut hits);
        } else {
            let west = wrap_lon(bbox.west);
            let east = wrap_lon(bbox.east);
            if west > east {
                Self::query_level(level, west, south, 180.0, north, &mut hits);
                Self::query_level(level, -180.0, south, east, north, &mut hits);
            } else {
                Self::query_level(level, west, south, east, north, &mut hits);
                // -180 and 180 are the same meridian
                if west == -180.0 {
                    Self::query_level(level, 180.0, south, 180.0, north, &mut hits);
                }
                if east == 180.0 {
                    Self::query_level(level, -180.0, south, -180.0, north, &mut hits);
                }
            }
        }

        hits.sort_unstable_by(|&a, &b| {
            let (na, nb) = (&level.nodes[a], &level.nodes[b]);
            na.y.total_cmp(&nb.y)
                .then(na.x.total_cmp(&nb.x))
                .then(a.cmp(&b))
        });
        hits.dedup();

        Ok(hits
            .into_iter()
            .map(|i| loaded.item_for(level.nodes[i].target))
            .collect())
    }

    fn query_level(
        level: &Level,
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        hits: &mut Vec<usize>,
    ) {
        let envelope = AABB::from_corners(
            [lon_to_x(west), lat_to_y(north)],
            [lon_to_x(east), lat_to_y(south)],
        );
        hits.extend(
            level
                .tree
                .locate_in_envelope(&envelope)
                .map(|entry| entry.data as usize),
        );
    }

    fn level_index(&self, zoom: i32) -> usize {
        let min = i32::from(self.config.min_zoom);
        let max = i32::from(self.config.max_cluster_zoom);
        (zoom.clamp(min, max) - min) as usize
    }

    /// Up to `limit` original points under `id`, skipping the first `offset`.
    ///
    /// Unknown or stale ids yield an empty list.
    pub fn get_leaves(
        &self,
        id: ClusterId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<IndexPoint>> {
        let loaded = self.loaded()?;
        let Some(record) = loaded.record(id) else {
            return Ok(Vec::new());
        };

        let mut leaves = Vec::with_capacity(limit.min(record.num_points as usize));
        let mut to_skip = offset;
        let mut stack: Vec<NodeRef> = record.children.iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            if leaves.len() >= limit {
                break;
            }
            match next {
                NodeRef::Leaf(i) => {
                    if to_skip > 0 {
                        to_skip -= 1;
                    } else {
                        leaves.push(loaded.points[i as usize]);
                    }
                }
                NodeRef::Cluster(slot) => {
                    let child = &loaded.clusters[slot as usize];
                    if to_skip >= child.num_points as usize {
                        to_skip -= child.num_points as usize;
                    } else {
                        stack.extend(child.children.iter().rev().copied());
                    }
                }
            }
        }

        Ok(leaves)
    }

    /// Nodes merged into `id`, as they appear one zoom level deeper.
    pub fn get_children(&self, id: ClusterId) -> Result<Vec<ClusterItem>> {
        let loaded = self.loaded()?;
        let Some(record) = loaded.record(id) else {
            return Ok(Vec::new());
        };

        Ok(record
            .children
            .iter()
            .map(|child| loaded.item_for(*child))
            .collect())
    }

    /// Zoom at which `id` splits apart, for click-to-zoom behavior.
    pub fn get_cluster_expansion_zoom(&self, id: ClusterId) -> Result<Option<i32>> {
        let loaded = self.loaded()?;
        Ok(loaded.record(id).map(|record| i32::from(record.zoom) + 1))
    }
}

impl Default for SpatialClusterIndex {
    fn default() -> Self {
        Self {
            config: ClusterConfig::default(),
            loaded: None,
        }
    }
}

impl Loaded {
    fn record(&self, id: ClusterId) -> Option<&ClusterRecord> {
        if id.snapshot != self.snapshot {
            return None;
        }
        self.clusters.get(id.slot as usize)
    }

    fn item_for(&self, target: NodeRef) -> ClusterItem {
        match target {
            NodeRef::Leaf(i) => ClusterItem::Point(self.points[i as usize]),
            NodeRef::Cluster(slot) => {
                let record = &self.clusters[slot as usize];
                ClusterItem::Cluster(ClusterHandle {
                    id: ClusterId::new(self.snapshot, slot),
                    geolocation: Point::new(x_to_lon(record.x), y_to_lat(record.y)),
                    num_points: record.num_points,
                    weight: record.weight,
                })
            }
        }
    }
}
