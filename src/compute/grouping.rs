//! Pre-aggregation of raw entities into exact-coordinate groups.

use crate::compute::validation::entity_geolocation;
use geocluster_types::entity::{GeoEntity, GeoGroup};
use geocluster_types::render::GeoKey;
use rustc_hash::FxHashMap;

/// Buckets entities sharing an exact coordinate into one `GeoGroup`.
///
/// Groups appear in the order their first entity appears. Entities without a
/// valid geolocation are dropped.
///
/// # Examples
///
/// ```
/// use geocluster::compute::group_by_coordinate;
/// use geocluster::GeoEntity;
///
/// let groups = group_by_coordinate(vec![
///     GeoEntity::located("a", 10.0, 10.0, ()),
///     GeoEntity::located("b", 20.0, 20.0, ()),
///     GeoEntity::located("c", 10.0, 10.0, ()),
///     GeoEntity::new("d", None, ()),
/// ]);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].count(), 2);
/// ```
pub fn group_by_coordinate<A>(entities: impl IntoIterator<Item = GeoEntity<A>>) -> Vec<GeoGroup<A>> {
    let mut slots: FxHashMap<GeoKey, usize> = FxHashMap::default();
    let mut groups: Vec<GeoGroup<A>> = Vec::new();
    let mut dropped = 0usize;

    for entity in entities {
        let point = match entity_geolocation(&entity) {
            Ok(point) => point,
            Err(e) => {
                log::trace!("Skipping entity: {}", e);
                dropped += 1;
                continue;
            }
        };

        let key = GeoKey::from_point(&point);
        match slots.get(&key) {
            Some(&slot) => groups[slot].push(entity),
            None => {
                slots.insert(key, groups.len());
                groups.push(GeoGroup::new(point, vec![entity]));
            }
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {} entities without a usable geolocation", dropped);
    }

    groups
}
