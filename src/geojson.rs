//! GeoJSON conversion for render points and relationship networks.

use crate::error::{ClusterError, Result};
use crate::network::Network;
use geo::Point;
use geocluster_types::render::{RenderPoint, RenderTarget};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, json};

fn position(point: &Point) -> Vec<f64> {
    vec![point.x(), point.y()]
}

fn feature(geometry: Value, properties: Map<String, serde_json::Value>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn render_point_to_feature(point: &RenderPoint) -> Feature {
    let mut props = Map::new();
    props.insert("count".to_string(), json!(point.count()));
    props.insert("cluster".to_string(), json!(point.is_cluster()));
    match point.target() {
        RenderTarget::Single { key, snapshot } => {
            props.insert("geo_key".to_string(), json!(key.to_string()));
            props.insert("snapshot".to_string(), json!(snapshot));
        }
        RenderTarget::Cluster(id) => {
            props.insert("cluster_id".to_string(), json!(id.to_string()));
        }
    }
    feature(Value::Point(position(&point.geolocation())), props)
}

/// One Point feature per render point, with `count`, `cluster`, and either
/// `geo_key` plus `snapshot` or `cluster_id` properties.
pub fn render_points_to_feature_collection(points: &[RenderPoint]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: points.iter().map(render_point_to_feature).collect(),
        foreign_members: None,
    }
}

/// Serialized form of [`render_points_to_feature_collection`].
pub fn render_points_to_geojson(points: &[RenderPoint]) -> Result<String> {
    serde_json::to_string(&render_points_to_feature_collection(points)).map_err(|e| {
        ClusterError::Serialization(format!("Failed to serialize render points: {}", e))
    })
}

/// Endpoints as Point features followed by edges as LineString features.
pub fn network_to_feature_collection(network: &Network) -> FeatureCollection {
    let endpoints = network.endpoints.iter().map(|endpoint| {
        let mut props = Map::new();
        props.insert("id".to_string(), json!(endpoint.id.as_str()));
        props.insert("neighbor_count".to_string(), json!(endpoint.neighbor_count));
        feature(Value::Point(position(&endpoint.geolocation)), props)
    });

    let edges = network.edges.iter().map(|edge| {
        let record = &edge.record;
        let mut props = Map::new();
        props.insert("source".to_string(), json!(record.source_id.as_str()));
        props.insert("target".to_string(), json!(record.target_id.as_str()));
        props.insert("category".to_string(), json!(record.category_id));
        props.insert("multiplicity".to_string(), json!(edge.multiplicity));
        props.insert("color".to_string(), json!(edge.color.0));
        feature(
            Value::LineString(vec![
                position(&record.source_geo),
                position(&record.target_geo),
            ]),
            props,
        )
    });

    FeatureCollection {
        bbox: None,
        features: endpoints.chain(edges).collect(),
        foreign_members: None,
    }
}
