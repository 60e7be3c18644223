//! Resolving clicked or hovered primitives back to domain data.

use crate::cluster::SpatialClusterIndex;
use crate::lookup::Lookup;
use geo::Point;
use geocluster_types::entity::{EntityId, GeoEntity, GeoGroup};
use geocluster_types::render::{RenderPoint, RenderTarget};

/// All entities under a cluster primitive, merged on demand.
///
/// Borrows from the snapshot it was resolved against; drop it before the
/// next rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAggregate<'a, A> {
    pub geolocation: Point,
    pub entities: Vec<&'a GeoEntity<A>>,
    pub count: usize,
}

impl<'a, A> ClusterAggregate<'a, A> {
    fn empty(geolocation: Point) -> Self {
        Self {
            geolocation,
            entities: Vec::new(),
            count: 0,
        }
    }

    fn push_group(&mut self, group: &'a GeoGroup<A>) {
        self.entities.extend(group.entities());
        self.count += group.count();
    }
}

impl<A: Clone> ClusterAggregate<'_, A> {
    /// Copy the aggregate into an owned group at the cluster's position.
    pub fn to_group(&self) -> GeoGroup<A> {
        GeoGroup::new(
            self.geolocation,
            self.entities.iter().map(|entity| (*entity).clone()).collect(),
        )
    }
}

/// Outcome of a successful pick.
#[derive(Debug, Clone, PartialEq)]
pub enum Pick<'a, A> {
    /// The group the host supplied, by reference.
    Single(&'a GeoGroup<A>),
    Cluster(ClusterAggregate<'a, A>),
}

impl<'a, A> Pick<'a, A> {
    pub fn count(&self) -> usize {
        match self {
            Pick::Single(group) => group.count(),
            Pick::Cluster(aggregate) => aggregate.count,
        }
    }

    pub fn geolocation(&self) -> Point {
        match self {
            Pick::Single(group) => group.geolocation(),
            Pick::Cluster(aggregate) => aggregate.geolocation,
        }
    }

    pub fn entities(&self) -> Vec<&'a GeoEntity<A>> {
        match self {
            Pick::Single(group) => group.entities().iter().collect(),
            Pick::Cluster(aggregate) => aggregate.entities.clone(),
        }
    }

    pub fn entity_ids(&self) -> Vec<&'a EntityId> {
        self.entities().into_iter().map(|entity| &entity.id).collect()
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Pick::Cluster(_))
    }
}

impl<A: Clone> Pick<'_, A> {
    /// Owned copy, for hosts that keep the selection past the next rebuild.
    pub fn to_group(&self) -> GeoGroup<A> {
        match self {
            Pick::Single(group) => (*group).clone(),
            Pick::Cluster(aggregate) => aggregate.to_group(),
        }
    }
}

pub struct PickResolver;

impl PickResolver {
    /// Map a render primitive back to the data it represents.
    ///
    /// Returns `None` when the primitive no longer refers to anything in the
    /// given snapshot (a key or cluster id from an earlier load, or an
    /// unloaded index); hosts treat that as "selection no longer valid".
    /// A key shared by several input groups resolves to an aggregate of all
    /// of them.
    pub fn resolve<'a, A>(
        primitive: &RenderPoint,
        index: &SpatialClusterIndex,
        lookup: &'a Lookup<A>,
    ) -> Option<Pick<'a, A>> {
        match primitive.target() {
            RenderTarget::Single { key, snapshot } => {
                if index.snapshot() != Some(snapshot) {
                    log::debug!("Key {} belongs to snapshot {}, not current", key, snapshot);
                    return None;
                }
                if let Some(group) = lookup.get(&key) {
                    return Some(Pick::Single(group));
                }
                if !lookup.contains(&key) {
                    return None;
                }

                let mut aggregate = ClusterAggregate::empty(primitive.geolocation());
                lookup
                    .groups_at(&key)
                    .for_each(|group| aggregate.push_group(group));
                Some(Pick::Cluster(aggregate))
            }
            RenderTarget::Cluster(id) => {
                let leaves = match index.get_leaves(id, usize::MAX, 0) {
                    Ok(leaves) => leaves,
                    Err(e) => {
                        log::warn!("Cannot resolve cluster {}: {}", id, e);
                        return None;
                    }
                };
                if leaves.is_empty() {
                    return None;
                }

                let mut aggregate = ClusterAggregate::empty(primitive.geolocation());
                for leaf in &leaves {
                    if !lookup.contains(&leaf.key) {
                        log::warn!("Cluster {} leaf {} missing from lookup", id, leaf.key);
                        return None;
                    }
                    lookup
                        .groups_at(&leaf.key)
                        .for_each(|group| aggregate.push_group(group));
                }
                Some(Pick::Cluster(aggregate))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterItem;
    use geocluster_types::bbox::BBox;
    use geocluster_types::render::{ClusterId, GeoKey};
    use std::sync::Arc;

    fn fixture() -> (SpatialClusterIndex, Lookup<u32>) {
        let mut groups = Vec::new();
        for (i, (lon, lat, n)) in [
            (10.0, 10.0, 2),
            (10.0001, 10.0001, 1),
            (60.0, -20.0, 3),
            (-40.0, 30.0, 1),
            (-40.0, 30.0, 2),
        ]
        .into_iter()
        .enumerate()
        {
            let at = Point::new(lon, lat);
            let entities = (0..n)
                .map(|j| GeoEntity::new(format!("e{}-{}", i, j), Some(at), j))
                .collect();
            groups.push(GeoGroup::new(at, entities));
        }

        let (lookup, points) = Lookup::build(Arc::from(groups));
        let mut index = SpatialClusterIndex::default();
        index.load(&points);
        (index, lookup)
    }

    fn snapshot(index: &SpatialClusterIndex) -> u64 {
        index.snapshot().unwrap()
    }

    #[test]
    fn test_single_resolves_by_reference() {
        let (index, lookup) = fixture();
        let key = GeoKey::new(60.0, -20.0);
        let primitive = RenderPoint::single(Point::new(60.0, -20.0), 3, key, snapshot(&index));

        let Some(Pick::Single(group)) = PickResolver::resolve(&primitive, &index, &lookup) else {
            panic!("expected a single");
        };
        assert!(std::ptr::eq(group, lookup.get(&key).unwrap()));
        assert_eq!(group.count(), 3);
    }

    #[test]
    fn test_cluster_merges_all_leaves() {
        let (index, lookup) = fixture();
        let cluster = index
            .get_clusters(&BBox::world(), 5)
            .unwrap()
            .into_iter()
            .find_map(|item| match item {
                ClusterItem::Cluster(cluster) => Some(cluster),
                ClusterItem::Point(_) => None,
            })
            .unwrap();
        let primitive = RenderPoint::cluster(cluster.geolocation, cluster.weight, cluster.id);

        let pick = PickResolver::resolve(&primitive, &index, &lookup).unwrap();
        assert!(pick.is_cluster());
        assert_eq!(pick.count(), 3);

        let mut ids: Vec<&str> = pick.entity_ids().iter().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["e0-0", "e0-1", "e1-0"]);

        let owned = pick.to_group();
        assert_eq!(owned.count(), 3);
        assert_eq!(owned.geolocation(), cluster.geolocation);
    }

    #[test]
    fn test_shared_coordinate_resolves_to_all_groups() {
        let (index, lookup) = fixture();
        let key = GeoKey::new(-40.0, 30.0);
        let item = index
            .get_clusters(&BBox::world(), 16)
            .unwrap()
            .into_iter()
            .find_map(|item| match item {
                ClusterItem::Point(point) if point.key == key => Some(point),
                _ => None,
            })
            .unwrap();
        assert_eq!(item.weight, 3);

        let primitive =
            RenderPoint::single(item.geolocation, item.weight, item.key, snapshot(&index));
        let pick = PickResolver::resolve(&primitive, &index, &lookup).unwrap();
        assert!(pick.is_cluster());
        assert_eq!(pick.count(), 3);

        let ids: Vec<&str> = pick.entity_ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["e3-0", "e4-0", "e4-1"]);
    }

    #[test]
    fn test_unknown_references_resolve_to_none() {
        let (index, lookup) = fixture();

        let missing = RenderPoint::single(
            Point::new(1.0, 1.0),
            1,
            GeoKey::new(1.0, 1.0),
            snapshot(&index),
        );
        assert!(PickResolver::resolve(&missing, &index, &lookup).is_none());

        let earlier = RenderPoint::single(
            Point::new(60.0, -20.0),
            3,
            GeoKey::new(60.0, -20.0),
            snapshot(&index) - 1,
        );
        assert!(PickResolver::resolve(&earlier, &index, &lookup).is_none());

        let stale = RenderPoint::cluster(Point::new(1.0, 1.0), 1, ClusterId::new(0, 0));
        assert!(PickResolver::resolve(&stale, &index, &lookup).is_none());

        let unloaded = SpatialClusterIndex::default();
        let cluster = RenderPoint::cluster(Point::new(1.0, 1.0), 1, ClusterId::new(1, 0));
        assert!(PickResolver::resolve(&cluster, &unloaded, &lookup).is_none());
    }
}
