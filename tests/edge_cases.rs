use geocluster::{
    BBox, ClusterConfig, ClusterError, ClusterId, EdgePolicy, EdgeRecord, GeoEntity, GeoGroup,
    GeoKey, IndexPoint, Lookup, PickResolver, PlannerConfig, Point, RenderPlanner, RenderPoint,
    SpatialClusterIndex, UpdateOutcome, Viewport, build_network,
};
use std::sync::Arc;

fn single(id: &str, lon: f64, lat: f64) -> GeoGroup<()> {
    let at = Point::new(lon, lat);
    GeoGroup::new(at, vec![GeoEntity::new(id, Some(at), ())])
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn planner() -> RenderPlanner<()> {
    RenderPlanner::new(ClusterConfig::default(), PlannerConfig::default()).unwrap()
}

/// Test 1: Empty input at every stage
#[test]
fn test_empty_input_everywhere() {
    let input: Arc<[GeoGroup<()>]> = Vec::new().into();
    let mut planner = planner();
    for zoom in [0.0, 5.5, 16.0, 20.0] {
        planner
            .update(&input, &Viewport::new(BBox::world(), zoom))
            .unwrap();
        assert!(planner.points().is_empty());
    }
    assert!(build_network(&[], EdgePolicy::MergeByCategory).is_empty());
}

/// Test 2: Queries before load are contract violations
#[test]
fn test_index_queries_before_load() {
    let index = SpatialClusterIndex::default();
    let id = ClusterId::new(1, 0);
    assert!(matches!(
        index.get_clusters(&BBox::world(), 3),
        Err(ClusterError::NotLoaded)
    ));
    assert!(matches!(
        index.get_leaves(id, 10, 0),
        Err(ClusterError::NotLoaded)
    ));
    assert!(matches!(
        index.get_children(id),
        Err(ClusterError::NotLoaded)
    ));
}

/// Test 3: Missing and out-of-range geolocations are excluded, not fatal
#[test]
fn test_invalid_geolocations_excluded() {
    init_logging();
    let input: Arc<[GeoGroup<()>]> = vec![
        single("ok", 1.0, 1.0),
        single("nan", f64::NAN, 1.0),
        single("inf", 1.0, f64::INFINITY),
        single("lat", 0.0, 91.0),
        single("lon", 181.0, 0.0),
    ]
    .into();
    let mut planner = planner();
    planner
        .update(&input, &Viewport::new(BBox::world(), 16.0))
        .unwrap();

    assert_eq!(planner.points().len(), 1);
    assert_eq!(planner.lookup().unwrap().len(), 1);
}

/// Test 4: Extreme but valid coordinates
#[test]
fn test_extreme_coordinates() {
    let input: Arc<[GeoGroup<()>]> = vec![
        single("ne", 180.0, 85.0),
        single("sw", -180.0, -85.0),
        single("pole", 0.0, 90.0),
        single("origin", 0.0, 0.0),
    ]
    .into();
    let mut planner = planner();
    planner
        .update(&input, &Viewport::new(BBox::world(), 16.0))
        .unwrap();
    assert_eq!(planner.points().len(), 4);

    planner
        .update(&input, &Viewport::new(BBox::world(), 0.0))
        .unwrap();
    let total: u64 = planner.points().iter().map(|p| p.count()).sum();
    assert_eq!(total, 4);
}

/// Test 5: Picks from a previous snapshot no longer resolve
#[test]
fn test_stale_pick_after_rebuild() {
    let make = || -> Arc<[GeoGroup<()>]> {
        vec![single("a", 5.0, 5.0), single("b", 5.0001, 5.0)].into()
    };
    let viewport = Viewport::new(BBox::world(), 4.0);
    let mut planner = planner();

    planner.update(&make(), &viewport).unwrap();
    let stale = planner.points()[0];
    assert!(stale.is_cluster());

    let outcome = planner.update(&make(), &viewport).unwrap();
    assert_eq!(outcome, UpdateOutcome::Rebuilt);
    assert!(planner.resolve(&stale).is_none());
    assert!(planner.expansion_zoom(&stale).is_none());
}

/// Test 6: Single keys from an earlier load do not resolve after a rebuild
#[test]
fn test_single_key_stale_after_rebuild() {
    let viewport = Viewport::new(BBox::world(), 16.0);
    let mut planner = planner();

    planner
        .update(&vec![single("old", 7.0, 7.0)].into(), &viewport)
        .unwrap();
    let old = planner.points()[0];
    assert_eq!(planner.resolve(&old).map(|pick| pick.count()), Some(1));

    planner
        .update(&vec![single("new", 7.0, 7.0)].into(), &viewport)
        .unwrap();
    let current = planner.points()[0];
    assert_eq!(old.geo_key(), current.geo_key());
    assert!(planner.resolve(&old).is_none());

    let ids: Vec<String> = planner
        .resolve(&current)
        .unwrap()
        .entity_ids()
        .iter()
        .map(|id| id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["new".to_string()]);
}

/// Test 7: Groups sharing a coordinate keep all their entities
#[test]
fn test_duplicate_coordinates_conserve_entities() {
    init_logging();
    let input: Arc<[GeoGroup<()>]> = vec![
        single("a", 3.0, 3.0),
        single("b", 3.0, 3.0),
        single("c", 3.0001, 3.0),
    ]
    .into();
    let mut planner = planner();

    planner
        .update(&input, &Viewport::new(BBox::world(), 2.0))
        .unwrap();
    let total: u64 = planner.points().iter().map(|p| p.count()).sum();
    assert_eq!(total, 3);
    let picked: usize = planner
        .points()
        .iter()
        .map(|point| planner.resolve(point).unwrap().entities().len())
        .sum();
    assert_eq!(picked, 3);

    planner
        .update(&input, &Viewport::new(BBox::world(), 16.0))
        .unwrap();
    assert_eq!(planner.points().len(), 2);
    let merged = planner
        .points()
        .iter()
        .find(|point| point.geo_key() == Some(GeoKey::new(3.0, 3.0)))
        .copied()
        .unwrap();
    assert_eq!(merged.count(), 2);

    let pick = planner.resolve(&merged).unwrap();
    let mut ids: Vec<&str> = pick.entity_ids().iter().map(|id| id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b"]);

    let (lookup, points) = Lookup::build(Arc::clone(&input));
    assert_eq!(points.len(), 2);
    assert_eq!(lookup.group_count(&GeoKey::new(3.0, 3.0)), 2);
}

/// Test 8: Negative zero and zero share a key
#[test]
fn test_signed_zero_key() {
    assert_eq!(GeoKey::new(-0.0, 0.0), GeoKey::new(0.0, -0.0));
}

/// Test 9: Viewports crossing the antimeridian see both sides
#[test]
fn test_antimeridian_viewport() {
    let input: Arc<[GeoGroup<()>]> = vec![
        single("east", 179.5, 0.0),
        single("west", -179.5, 0.0),
        single("far", 0.0, 0.0),
    ]
    .into();
    let mut planner = RenderPlanner::new(
        ClusterConfig::default(),
        PlannerConfig::default().with_viewport_padding(0.0),
    )
    .unwrap();

    planner
        .update(
            &input,
            &Viewport::new(BBox::new(179.0, -1.0, -179.0, 1.0), 16.0),
        )
        .unwrap();
    assert_eq!(planner.points().len(), 2);
}

/// Test 10: A box ending on the antimeridian sees both of its longitudes
#[test]
fn test_antimeridian_edge_is_one_meridian() {
    let input: Arc<[GeoGroup<()>]> = vec![
        single("west", -180.0, 0.0),
        single("east", 180.0, 0.0),
        single("inside", -175.0, 0.0),
        single("far", 0.0, 0.0),
    ]
    .into();
    let mut planner = RenderPlanner::new(
        ClusterConfig::default(),
        PlannerConfig::default().with_viewport_padding(0.0),
    )
    .unwrap();

    planner
        .update(
            &input,
            &Viewport::new(BBox::new(-180.0, -1.0, -170.0, 1.0), 16.0),
        )
        .unwrap();
    assert_eq!(planner.points().len(), 3);

    planner
        .update(
            &input,
            &Viewport::new(BBox::new(170.0, -1.0, 180.0, 1.0), 16.0),
        )
        .unwrap();
    assert_eq!(planner.points().len(), 2);
}

/// Test 11: Non-finite viewport is rejected and leaves state untouched
#[test]
fn test_non_finite_viewport_rejected() {
    let input: Arc<[GeoGroup<()>]> = vec![single("a", 1.0, 1.0)].into();
    let mut planner = planner();
    planner
        .update(&input, &Viewport::new(BBox::world(), 16.0))
        .unwrap();

    let bad = Viewport::new(BBox::new(0.0, f64::NAN, 1.0, 1.0), 16.0);
    assert!(matches!(
        planner.update(&input, &bad),
        Err(ClusterError::InvalidInput(_))
    ));
    assert_eq!(planner.points().len(), 1);

    let bad_zoom = Viewport::new(BBox::world(), f64::INFINITY);
    assert!(planner.update(&input, &bad_zoom).is_err());
}

/// Test 12: Non-finite bbox on the index is logged and yields nothing
#[test]
fn test_index_non_finite_bbox() {
    let mut index = SpatialClusterIndex::default();
    index.load(&[IndexPoint::new(Point::new(1.0, 1.0), 1)]);
    let bbox = BBox::new(f64::NAN, 0.0, 10.0, 10.0);
    assert!(index.get_clusters(&bbox, 5).unwrap().is_empty());
}

/// Test 13: Resolving against an index and lookup from different loads
#[test]
fn test_resolver_with_unknown_primitives() {
    let input: Arc<[GeoGroup<()>]> = vec![single("a", 1.0, 1.0)].into();
    let (lookup, points) = Lookup::build(input);
    let mut index = SpatialClusterIndex::default();
    index.load(&points);

    let snapshot = index.snapshot().unwrap();
    let unknown_key =
        RenderPoint::single(Point::new(2.0, 2.0), 1, GeoKey::new(2.0, 2.0), snapshot);
    assert!(PickResolver::resolve(&unknown_key, &index, &lookup).is_none());

    let known_key =
        RenderPoint::single(Point::new(1.0, 1.0), 1, GeoKey::new(1.0, 1.0), snapshot);
    assert!(PickResolver::resolve(&known_key, &index, &lookup).is_some());

    let mut reloaded = SpatialClusterIndex::default();
    reloaded.load(&points);
    assert!(PickResolver::resolve(&known_key, &reloaded, &lookup).is_none());

    let unknown_cluster = RenderPoint::cluster(Point::new(1.0, 1.0), 1, ClusterId::new(0, 99));
    assert!(PickResolver::resolve(&unknown_cluster, &index, &lookup).is_none());
}

/// Test 14: Edge records with invalid endpoints are dropped
#[test]
fn test_edges_with_invalid_endpoints() {
    let ok = Point::new(1.0, 1.0);
    let records = [
        EdgeRecord::new("a", ok, "b", Point::new(0.0, -95.0), 1),
        EdgeRecord::new("c", Point::new(f64::NAN, 0.0), "d", ok, 1),
        EdgeRecord::new("e", ok, "f", ok, 2),
    ];
    let network = build_network(&records, EdgePolicy::PassThrough);
    assert_eq!(network.endpoints.len(), 2);
    assert_eq!(network.edges.len(), 1);
}

/// Test 15: Large input stays consistent
#[test]
fn test_large_dataset() {
    let input: Arc<[GeoGroup<()>]> = (0..20_000)
        .map(|i| {
            let lon = -74.0 + (i % 200) as f64 * 0.001;
            let lat = 40.0 + (i / 200) as f64 * 0.001;
            single(&format!("p{}", i), lon, lat)
        })
        .collect();
    let mut planner = planner();
    planner
        .update(&input, &Viewport::new(BBox::new(-75.0, 39.0, -73.0, 41.0), 10.0))
        .unwrap();

    let total: u64 = planner.points().iter().map(|p| p.count()).sum();
    assert_eq!(total, 20_000);
}
