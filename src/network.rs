//! Relationship overlays: endpoints and drawable edges.
//!
//! [`build_network`] makes one linear pass over the relationship records.
//! Endpoints keep first-appearance order, and each carries the number of
//! distinct other entities it is linked to. How repeated rows between the
//! same pair turn into drawn edges is set by [`EdgePolicy`].

use crate::compute::color::{Rgba, color_of};
use crate::compute::validation::is_valid_geolocation;
use geocluster_types::edge::{EdgeRecord, EndpointPoint};
use geocluster_types::entity::EntityId;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;

/// How relationship rows between the same two entities are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// One edge per record.
    #[default]
    PassThrough,
    /// One edge per unordered pair of entities.
    MergeUnordered,
    /// One edge per unordered pair and category.
    MergeByCategory,
}

/// An edge ready to be drawn as an arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawEdge {
    /// The first record seen for this edge.
    pub record: EdgeRecord,
    /// Number of records folded into this edge.
    pub multiplicity: usize,
    pub color: Rgba,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub endpoints: Vec<EndpointPoint>,
    pub edges: Vec<DrawEdge>,
}

impl Network {
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty() && self.edges.is_empty()
    }

    pub fn endpoint(&self, id: &EntityId) -> Option<&EndpointPoint> {
        self.endpoints.iter().find(|endpoint| &endpoint.id == id)
    }

    /// Records touching `source_id`, in input order.
    pub fn focused_on(records: &[EdgeRecord], source_id: &EntityId) -> Vec<EdgeRecord> {
        records
            .iter()
            .filter(|record| record.touches(source_id))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PairKey<'a> {
    low: &'a EntityId,
    high: &'a EntityId,
    category: Option<u32>,
}

impl<'a> PairKey<'a> {
    fn new(record: &'a EdgeRecord, with_category: bool) -> Self {
        let (low, high) = if record.source_id <= record.target_id {
            (&record.source_id, &record.target_id)
        } else {
            (&record.target_id, &record.source_id)
        };
        Self {
            low,
            high,
            category: with_category.then_some(record.category_id),
        }
    }
}

/// Builds a [`Network`] from relationship records under a fixed policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipEdgeBuilder {
    policy: EdgePolicy,
}

impl RelationshipEdgeBuilder {
    pub fn new(policy: EdgePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    pub fn build(&self, records: &[EdgeRecord]) -> Network {
        let mut endpoints: Vec<EndpointPoint> = Vec::new();
        let mut endpoint_slots: FxHashMap<&EntityId, usize> = FxHashMap::default();
        let mut neighbors: Vec<FxHashSet<&EntityId>> = Vec::new();
        let mut edges: Vec<DrawEdge> = Vec::new();
        let mut edge_slots: FxHashMap<PairKey<'_>, usize> = FxHashMap::default();
        let mut skipped = 0usize;

        for record in records {
            if !is_valid_geolocation(&record.source_geo) || !is_valid_geolocation(&record.target_geo)
            {
                skipped += 1;
                continue;
            }

            let ends = [
                (&record.source_id, record.source_geo),
                (&record.target_id, record.target_geo),
            ];
            for (id, geolocation) in ends {
                endpoint_slots.entry(id).or_insert_with(|| {
                    endpoints.push(EndpointPoint {
                        id: id.clone(),
                        geolocation,
                        neighbor_count: 0,
                    });
                    neighbors.push(FxHashSet::default());
                    endpoints.len() - 1
                });
            }

            if !record.is_self_loop() {
                let source = endpoint_slots[&record.source_id];
                let target = endpoint_slots[&record.target_id];
                neighbors[source].insert(&record.target_id);
                neighbors[target].insert(&record.source_id);
            }

            match self.policy {
                EdgePolicy::PassThrough => edges.push(Self::draw(record)),
                EdgePolicy::MergeUnordered | EdgePolicy::MergeByCategory => {
                    let key = PairKey::new(record, self.policy == EdgePolicy::MergeByCategory);
                    match edge_slots.entry(key) {
                        Entry::Occupied(slot) => edges[*slot.get()].multiplicity += 1,
                        Entry::Vacant(slot) => {
                            slot.insert(edges.len());
                            edges.push(Self::draw(record));
                        }
                    }
                }
            }
        }

        for (endpoint, linked) in endpoints.iter_mut().zip(&neighbors) {
            endpoint.neighbor_count = linked.len();
        }

        if skipped > 0 {
            log::debug!(
                "Skipped {} relationship records with an invalid geolocation",
                skipped
            );
        }

        Network { endpoints, edges }
    }

    fn draw(record: &EdgeRecord) -> DrawEdge {
        DrawEdge {
            record: record.clone(),
            multiplicity: 1,
            color: color_of(record.category_id),
        }
    }
}

/// Convenience for [`RelationshipEdgeBuilder::build`].
pub fn build_network(records: &[EdgeRecord], policy: EdgePolicy) -> Network {
    RelationshipEdgeBuilder::new(policy).build(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn edge(source: &str, target: &str, category: u32) -> EdgeRecord {
        let at = |id: &str| Point::new(f64::from(id.as_bytes()[0]) / 10.0, 1.0);
        EdgeRecord::new(source, at(source), target, at(target), category)
    }

    fn neighbor_counts(network: &Network) -> Vec<(&str, usize)> {
        network
            .endpoints
            .iter()
            .map(|endpoint| (endpoint.id.as_str(), endpoint.neighbor_count))
            .collect()
    }

    #[test]
    fn test_distinct_neighbor_counting() {
        let records = [edge("A", "B", 1), edge("A", "B", 2), edge("A", "C", 1)];
        let network = build_network(&records, EdgePolicy::PassThrough);
        assert_eq!(neighbor_counts(&network), vec![("A", 2), ("B", 1), ("C", 1)]);
        assert_eq!(network.edges.len(), 3);
    }

    #[test]
    fn test_self_loop_adds_no_neighbor() {
        let records = [edge("A", "A", 1), edge("B", "A", 1)];
        let network = build_network(&records, EdgePolicy::PassThrough);
        assert_eq!(neighbor_counts(&network), vec![("A", 1), ("B", 1)]);
    }

    #[test]
    fn test_merge_unordered() {
        let records = [
            edge("A", "B", 1),
            edge("B", "A", 2),
            edge("A", "B", 1),
            edge("A", "C", 3),
        ];
        let network = build_network(&records, EdgePolicy::MergeUnordered);

        assert_eq!(network.edges.len(), 2);
        assert_eq!(network.edges[0].multiplicity, 3);
        assert_eq!(network.edges[0].record, records[0]);
        assert_eq!(network.edges[0].color, color_of(1));
        assert_eq!(network.edges[1].multiplicity, 1);
    }

    #[test]
    fn test_merge_by_category() {
        let records = [
            edge("A", "B", 1),
            edge("B", "A", 2),
            edge("B", "A", 1),
            edge("A", "C", 1),
        ];
        let network = build_network(&records, EdgePolicy::MergeByCategory);

        let shape: Vec<(u32, usize)> = network
            .edges
            .iter()
            .map(|edge| (edge.record.category_id, edge.multiplicity))
            .collect();
        assert_eq!(shape, vec![(1, 2), (2, 1), (1, 1)]);
    }

    #[test]
    fn test_invalid_geolocation_skipped_entirely() {
        let mut bad = edge("A", "Z", 1);
        bad.target_geo = Point::new(f64::NAN, 0.0);
        let records = [bad, edge("B", "C", 1)];

        let network = build_network(&records, EdgePolicy::PassThrough);
        assert_eq!(neighbor_counts(&network), vec![("B", 1), ("C", 1)]);
        assert_eq!(network.edges.len(), 1);
        assert!(network.endpoint(&EntityId::from("A")).is_none());
    }

    #[test]
    fn test_focused_on() {
        let records = [edge("A", "B", 1), edge("C", "D", 1), edge("D", "A", 2)];
        let focused = Network::focused_on(&records, &EntityId::from("A"));
        assert_eq!(focused, vec![records[0].clone(), records[2].clone()]);
    }

    #[test]
    fn test_empty() {
        let network = build_network(&[], EdgePolicy::MergeUnordered);
        assert!(network.is_empty());
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&EdgePolicy::MergeByCategory).unwrap();
        assert_eq!(json, "\"merge_by_category\"");
        assert_eq!(EdgePolicy::default(), EdgePolicy::PassThrough);
    }
}
