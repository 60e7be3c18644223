use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact coordinate signature of a location.
///
/// Two keys are equal only when both coordinates are bit-for-bit equal
/// (`-0.0` is folded into `0.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoKey {
    lon_bits: u64,
    lat_bits: u64,
}

impl GeoKey {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon_bits: canonical(lon).to_bits(),
            lat_bits: canonical(lat).to_bits(),
        }
    }

    pub fn from_point(point: &Point) -> Self {
        Self::new(point.x(), point.y())
    }

    pub fn lon(&self) -> f64 {
        f64::from_bits(self.lon_bits)
    }

    pub fn lat(&self) -> f64 {
        f64::from_bits(self.lat_bits)
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.lon(), self.lat())
    }
}

fn canonical(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl fmt::Display for GeoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon(), self.lat())
    }
}

/// Handle to a cluster produced by one particular index load.
///
/// `snapshot` changes on every load, so ids handed out before a rebuild no
/// longer resolve afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterId {
    pub snapshot: u64,
    pub slot: u32,
}

impl ClusterId {
    pub fn new(snapshot: u64, slot: u32) -> Self {
        Self { snapshot, slot }
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}:{}", self.snapshot, self.slot)
    }
}

/// What a render point refers back to.
///
/// Both variants are tied to the index load that produced them. A single
/// key from an earlier load does not resolve against a later one, even when
/// the new data has a group at the same coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "ref")]
pub enum RenderTarget {
    Single { key: GeoKey, snapshot: u64 },
    Cluster(ClusterId),
}

impl RenderTarget {
    /// Load that produced this reference.
    pub fn snapshot(&self) -> u64 {
        match self {
            RenderTarget::Single { snapshot, .. } => *snapshot,
            RenderTarget::Cluster(id) => id.snapshot,
        }
    }
}

/// Lightweight primitive handed to the renderer.
///
/// Carries only a key or cluster id plus the aggregated count; the full
/// record is resolved on interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPoint {
    geolocation: Point,
    count: u64,
    target: RenderTarget,
}

impl RenderPoint {
    pub fn single(geolocation: Point, count: u64, key: GeoKey, snapshot: u64) -> Self {
        Self {
            geolocation,
            count,
            target: RenderTarget::Single { key, snapshot },
        }
    }

    pub fn cluster(geolocation: Point, count: u64, id: ClusterId) -> Self {
        Self {
            geolocation,
            count,
            target: RenderTarget::Cluster(id),
        }
    }

    pub fn geolocation(&self) -> Point {
        self.geolocation
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn target(&self) -> RenderTarget {
        self.target
    }

    pub fn snapshot(&self) -> u64 {
        self.target.snapshot()
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self.target, RenderTarget::Cluster(_))
    }

    pub fn geo_key(&self) -> Option<GeoKey> {
        match self.target {
            RenderTarget::Single { key, .. } => Some(key),
            RenderTarget::Cluster(_) => None,
        }
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        match self.target {
            RenderTarget::Cluster(id) => Some(id),
            RenderTarget::Single { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_key_is_exact() {
        let a = GeoKey::new(10.0, 10.0);
        let b = GeoKey::new(10.0, 10.000_000_000_1);
        assert_ne!(a, b);
        assert_eq!(a, GeoKey::from_point(&Point::new(10.0, 10.0)));
        assert_eq!(GeoKey::new(-0.0, 5.0), GeoKey::new(0.0, 5.0));
        assert_eq!(a.to_string(), "10,10");
    }

    #[test]
    fn test_render_point_exactly_one_reference() {
        let single = RenderPoint::single(Point::new(1.0, 2.0), 3, GeoKey::new(1.0, 2.0), 4);
        assert!(!single.is_cluster());
        assert!(single.geo_key().is_some());
        assert!(single.cluster_id().is_none());
        assert_eq!(single.snapshot(), 4);

        let cluster = RenderPoint::cluster(Point::new(1.0, 2.0), 7, ClusterId::new(4, 0));
        assert!(cluster.is_cluster());
        assert!(cluster.geo_key().is_none());
        assert_eq!(cluster.cluster_id(), Some(ClusterId::new(4, 0)));
    }

    #[test]
    fn test_render_target_json_shape() {
        let cluster = RenderPoint::cluster(Point::new(0.5, 0.5), 2, ClusterId::new(1, 9));
        let json = serde_json::to_value(cluster).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["target"]["kind"], "cluster");
        assert_eq!(json["target"]["ref"]["slot"], 9);

        let single = RenderPoint::single(Point::new(0.5, 0.5), 1, GeoKey::new(0.5, 0.5), 3);
        let json = serde_json::to_value(single).unwrap();
        assert_eq!(json["target"]["kind"], "single");
        assert_eq!(json["target"]["ref"]["snapshot"], 3);
    }
}
