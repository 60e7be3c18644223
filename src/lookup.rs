//! Side table from coordinate keys to full groups.
//!
//! Render primitives carry only a `GeoKey`; the lookup turns that key back
//! into the `GeoGroup` the host supplied. The table indexes into the shared
//! input snapshot, so resolving a single hands back the caller's own value.

use crate::cluster::IndexPoint;
use crate::compute::validation::is_valid_geolocation;
use geocluster_types::entity::GeoGroup;
use geocluster_types::render::GeoKey;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

pub struct Lookup<A> {
    groups: Arc<[GeoGroup<A>]>,
    slots: FxHashMap<GeoKey, SmallVec<[usize; 1]>>,
}

impl<A> Lookup<A> {
    /// Build the table and the matching index input in one pass.
    ///
    /// Every returned `IndexPoint` has exactly one key in the table and vice
    /// versa. Groups with an invalid geolocation are left out of both.
    /// Groups sharing a coordinate are folded into one index point whose
    /// weight is their summed count, so no entity is lost.
    pub fn build(groups: Arc<[GeoGroup<A>]>) -> (Self, Vec<IndexPoint>) {
        let mut slots: FxHashMap<GeoKey, SmallVec<[usize; 1]>> = FxHashMap::default();
        slots.reserve(groups.len());
        let mut positions: FxHashMap<GeoKey, usize> = FxHashMap::default();
        let mut points: Vec<IndexPoint> = Vec::with_capacity(groups.len());
        let mut invalid = 0usize;

        for (slot, group) in groups.iter().enumerate() {
            let geolocation = group.geolocation();
            if !is_valid_geolocation(&geolocation) {
                invalid += 1;
                continue;
            }

            let key = group.geo_key();
            let weight = group.count() as u64;
            match positions.get(&key) {
                Some(&position) => {
                    log::warn!(
                        "Group at {} (input position {}) shares its coordinate with an earlier group, merging",
                        key,
                        slot
                    );
                    points[position].weight += weight;
                }
                None => {
                    positions.insert(key, points.len());
                    points.push(IndexPoint {
                        geolocation,
                        weight,
                        key,
                    });
                }
            }
            slots.entry(key).or_default().push(slot);
        }

        if invalid > 0 {
            log::debug!("Excluded {} groups with an invalid geolocation", invalid);
        }

        (Self { groups, slots }, points)
    }

    /// The one group at `key`.
    ///
    /// `None` when the key is unknown or shared by several groups; see
    /// [`Lookup::groups_at`] for the latter.
    pub fn get(&self, key: &GeoKey) -> Option<&GeoGroup<A>> {
        match self.slots.get(key)?.as_slice() {
            [slot] => Some(&self.groups[*slot]),
            _ => None,
        }
    }

    /// Every group at `key`, in input order.
    pub fn groups_at<'a>(
        &'a self,
        key: &GeoKey,
    ) -> impl Iterator<Item = &'a GeoGroup<A>> + use<'a, A> {
        self.slots
            .get(key)
            .into_iter()
            .flatten()
            .map(|&slot| &self.groups[slot])
    }

    /// Number of input groups folded into `key`.
    pub fn group_count(&self, key: &GeoKey) -> usize {
        self.slots.get(key).map_or(0, |slots| slots.len())
    }

    pub fn contains(&self, key: &GeoKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of distinct resolvable keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The input snapshot this table was built from.
    pub fn groups(&self) -> &Arc<[GeoGroup<A>]> {
        &self.groups
    }
}
