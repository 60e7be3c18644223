use crate::render::GeoKey;
use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a domain record (institution, organisation, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single domain record with an optional location.
///
/// Entities without a geolocation (or with a malformed one) are carried by
/// the host but never enter the spatial structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEntity<A> {
    pub id: EntityId,
    pub geolocation: Option<Point>,
    pub attributes: A,
}

impl<A> GeoEntity<A> {
    pub fn new(id: impl Into<EntityId>, geolocation: Option<Point>, attributes: A) -> Self {
        Self {
            id: id.into(),
            geolocation,
            attributes,
        }
    }

    /// Create an entity located at `lon`/`lat`.
    pub fn located(id: impl Into<EntityId>, lon: f64, lat: f64, attributes: A) -> Self {
        Self::new(id, Some(Point::new(lon, lat)), attributes)
    }
}

/// A bucket of entities sharing one exact coordinate.
///
/// The count always equals the number of entities; the fields are private so
/// the two cannot drift apart after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoGroup<A> {
    geolocation: Point,
    entities: Vec<GeoEntity<A>>,
    count: usize,
}

impl<A> GeoGroup<A> {
    /// Create a group at `geolocation`.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocluster_types::entity::{GeoEntity, GeoGroup};
    /// use geo::Point;
    ///
    /// let at = Point::new(2.3522, 48.8566);
    /// let group = GeoGroup::new(at, vec![
    ///     GeoEntity::new("a", Some(at), ()),
    ///     GeoEntity::new("b", Some(at), ()),
    /// ]);
    /// assert_eq!(group.count(), 2);
    /// ```
    pub fn new(geolocation: Point, entities: Vec<GeoEntity<A>>) -> Self {
        let count = entities.len();
        Self {
            geolocation,
            entities,
            count,
        }
    }

    pub fn geolocation(&self) -> Point {
        self.geolocation
    }

    pub fn entities(&self) -> &[GeoEntity<A>] {
        &self.entities
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Exact coordinate signature of this group.
    pub fn geo_key(&self) -> GeoKey {
        GeoKey::from_point(&self.geolocation)
    }

    pub fn push(&mut self, entity: GeoEntity<A>) {
        self.entities.push(entity);
        self.count = self.entities.len();
    }

    pub fn into_entities(self) -> Vec<GeoEntity<A>> {
        self.entities
    }
}
