//! Checks that decide which records can be placed on the map.
//!
//! Failing records are left out of clustering and networks; nothing here is
//! fatal to a render pass.

use crate::error::{ClusterError, Result};
use geo::Point;
use geocluster_types::bbox::BBox;
use geocluster_types::entity::GeoEntity;

fn axis_problem(axis: &str, value: f64, limit: f64) -> Option<String> {
    if !value.is_finite() {
        Some(format!("geolocation {} is not a finite number: {}", axis, value))
    } else if value.abs() > limit {
        Some(format!(
            "geolocation {} {} lies outside [-{}, {}]",
            axis, value, limit, limit
        ))
    } else {
        None
    }
}

fn geolocation_problem(point: &Point) -> Option<String> {
    axis_problem("longitude", point.x(), 180.0)
        .or_else(|| axis_problem("latitude", point.y(), 90.0))
}

/// Checks that a group or edge endpoint geolocation can be plotted.
///
/// Longitudes must lie in [-180, 180] and latitudes in [-90, 90], both ends
/// inclusive. Unwrapped longitudes are rejected here; only query boxes may
/// carry them.
///
/// # Examples
///
/// ```
/// use geocluster::compute::validation::validate_geolocation;
/// use geo::Point;
///
/// let rijksmuseum = Point::new(4.8852, 52.3600);
/// assert!(validate_geolocation(&rijksmuseum).is_ok());
///
/// let unwrapped = Point::new(364.8852, 52.3600);
/// assert!(validate_geolocation(&unwrapped).is_err());
///
/// let geocoder_miss = Point::new(f64::NAN, f64::NAN);
/// assert!(validate_geolocation(&geocoder_miss).is_err());
/// ```
pub fn validate_geolocation(point: &Point) -> Result<()> {
    match geolocation_problem(point) {
        Some(problem) => Err(ClusterError::InvalidInput(problem)),
        None => Ok(()),
    }
}

/// The plottable geolocation of an entity record.
///
/// Errors name the entity, for records with no geolocation at all as well
/// as for ones whose geolocation fails [`validate_geolocation`].
pub fn entity_geolocation<A>(entity: &GeoEntity<A>) -> Result<Point> {
    let Some(point) = entity.geolocation else {
        return Err(ClusterError::InvalidInput(format!(
            "Entity {} has no geolocation",
            entity.id
        )));
    };
    match geolocation_problem(&point) {
        Some(problem) => Err(ClusterError::InvalidInput(format!(
            "Entity {}: {}",
            entity.id, problem
        ))),
        None => Ok(point),
    }
}

/// Shorthand for the exclusion checks on input records.
pub fn is_valid_geolocation(point: &Point) -> bool {
    geolocation_problem(point).is_none()
}

/// Validates a query bounding box.
///
/// Edges may lie outside the canonical ranges (hosts pass unwrapped
/// longitudes while panning) but must be finite, and south must not exceed
/// north.
pub fn validate_bbox(bbox: &BBox) -> Result<()> {
    if !bbox.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "Bounding box must be finite, got: {:?}",
            bbox
        )));
    }

    if bbox.south > bbox.north {
        return Err(ClusterError::InvalidInput(format!(
            "Bounding box south {} exceeds north {}",
            bbox.south, bbox.north
        )));
    }

    Ok(())
}
