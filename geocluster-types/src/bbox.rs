use geo::Point;
use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// `west > east` denotes a box that crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BBox {
    /// Create a bounding box from its edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocluster_types::bbox::BBox;
    ///
    /// let europe = BBox::new(-10.0, 35.0, 40.0, 70.0);
    /// assert_eq!(europe.lon_span(), 50.0);
    ///
    /// let pacific = BBox::new(170.0, -20.0, -170.0, 20.0);
    /// assert!(pacific.crosses_antimeridian());
    /// assert_eq!(pacific.lon_span(), 20.0);
    /// ```
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The whole world in Web-Mercator friendly bounds.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    pub fn is_finite(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Longitudinal extent in degrees, accounting for antimeridian crossing.
    pub fn lon_span(&self) -> f64 {
        let (west, east) = self.lon_interval();
        east - west
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    fn lon_interval(&self) -> (f64, f64) {
        if self.crosses_antimeridian() {
            (self.west, self.east + 360.0)
        } else {
            (self.west, self.east)
        }
    }

    pub fn contains_point(&self, point: &Point) -> bool {
        if point.y() < self.south || point.y() > self.north {
            return false;
        }
        if self.lon_span() >= 360.0 {
            return true;
        }
        let (west, east) = self.lon_interval();
        [-360.0, 0.0, 360.0].iter().any(|shift| {
            let x = point.x() + shift;
            x >= west && x <= east
        })
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains_bbox(&self, other: &BBox) -> bool {
        if other.south < self.south || other.north > self.north {
            return false;
        }
        if self.lon_span() >= 360.0 {
            return true;
        }
        let (west, east) = self.lon_interval();
        let (other_west, other_east) = other.lon_interval();
        [-360.0, 0.0, 360.0]
            .iter()
            .any(|shift| other_west + shift >= west && other_east + shift <= east)
    }

    /// Grow the box by `fraction` of its span on every side.
    ///
    /// Latitudes are clamped to the poles; a box that would wrap the whole
    /// globe collapses to the full longitude range.
    pub fn padded(&self, fraction: f64) -> Self {
        let lon_pad = self.lon_span() * fraction;
        let lat_pad = self.lat_span() * fraction;
        let south = (self.south - lat_pad).max(-90.0);
        let north = (self.north + lat_pad).min(90.0);

        if self.lon_span() + 2.0 * lon_pad >= 360.0 {
            return Self::new(-180.0, south, 180.0, north);
        }

        Self::new(
            wrap_lon(self.west - lon_pad),
            south,
            wrap_lon(self.east + lon_pad),
            north,
        )
    }
}

/// Bring a longitude back into `[-180, 180]`.
pub fn wrap_lon(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Map state supplied by the host renderer every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bbox: BBox,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(bbox: BBox, zoom: f64) -> Self {
        Self { bbox, zoom }
    }

    /// Integer floor of the continuous zoom.
    pub fn zoom_bucket(&self) -> i32 {
        self.zoom.floor() as i32
    }
}
