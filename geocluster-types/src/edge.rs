use crate::entity::EntityId;
use geo::Point;
use serde::{Deserialize, Serialize};

/// One relationship instance between two entities, e.g. one shared project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source_id: EntityId,
    pub target_id: EntityId,
    pub source_geo: Point,
    pub target_geo: Point,
    pub category_id: u32,
}

impl EdgeRecord {
    pub fn new(
        source_id: impl Into<EntityId>,
        source_geo: Point,
        target_id: impl Into<EntityId>,
        target_geo: Point,
        category_id: u32,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            source_geo,
            target_geo,
            category_id,
        }
    }

    /// Whether `id` is either end of this edge.
    pub fn touches(&self, id: &EntityId) -> bool {
        &self.source_id == id || &self.target_id == id
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}

/// A distinct entity appearing in at least one edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointPoint {
    pub id: EntityId,
    pub geolocation: Point,
    /// Number of distinct other entities linked to this one.
    pub neighbor_count: usize,
}
