use serde_json::json;
use spatio_rewrite::prelude::*;
use spatio_rewrite::{
    IndexColumns, REWRITE_RESOLUTION, REWRITE_WINDOW, RewriteError, parse_coordinate,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rewriter() -> FilterRewriter {
    init_logging();
    FilterRewriter::new(RewriteConfig::orders()).expect("Failed to build rewriter")
}

fn bucket(value: &str) -> String {
    let coordinate = parse_coordinate(value).unwrap();
    CellCodec::default()
        .bucket(&coordinate, REWRITE_RESOLUTION, REWRITE_WINDOW)
        .unwrap()
        .into_string()
}

#[test]
fn test_selective_rewrite() {
    let rw = rewriter();
    let query = Query::new(vec![
        Filter::member(
            "Orders.location",
            FilterOperator::Equals,
            ["37.7749, -122.4194"],
        ),
        Filter::member("Orders.title", FilterOperator::Equals, ["Widget"]),
    ]);

    let rewritten = rw
        .rewrite(&query, &SecurityContext::anonymous())
        .expect("Rewrite failed");

    let filters = rewritten.member_filters();
    assert_eq!(filters.len(), 2);

    // First filter now targets the bucket column
    assert_eq!(filters[0].member, "Orders.h3_5");
    assert_eq!(filters[0].operator, FilterOperator::Equals);
    assert_eq!(filters[0].values.len(), 1);
    assert_eq!(filters[0].values[0].len(), 6);
    assert_eq!(filters[0].values[0], bucket("37.7749, -122.4194"));

    // Second filter untouched
    assert_eq!(rewritten.filters[1], query.filters[1]);
}

#[test]
fn test_input_query_is_not_mutated() {
    let rw = rewriter();
    let query = Query::new(vec![Filter::member(
        "Orders.location",
        FilterOperator::Equals,
        ["37.7749, -122.4194"],
    )]);
    let snapshot = query.clone();

    let rewritten = rw.rewrite_query(&query).unwrap();
    assert_ne!(rewritten, query);
    assert_eq!(query, snapshot);
}

#[test]
fn test_multi_value_rewrite_preserves_order() {
    let rw = rewriter();
    let values = ["37.7749, -122.4194", "-33.8688, 151.2093"];
    let query = Query::new(vec![Filter::member(
        "Orders.location",
        FilterOperator::Equals,
        values,
    )]);

    let rewritten = rw.rewrite_query(&query).unwrap();
    let filter = rewritten.member_filters()[0];

    assert_eq!(filter.values.len(), 2);
    assert_eq!(filter.values[0], bucket(values[0]));
    assert_eq!(filter.values[1], bucket(values[1]));
    assert_ne!(filter.values[0], filter.values[1]);
}

#[test]
fn test_query_without_coordinate_filters_keeps_shape() {
    let rw = rewriter();
    let query = Query::new(vec![
        Filter::member("Orders.title", FilterOperator::Equals, ["Widget"]),
        Filter::member("Orders.id", FilterOperator::Gt, ["10"]),
        Filter::or(vec![
            Filter::member("Vendors.name", FilterOperator::Contains, ["Acme"]),
            Filter::member("Orders.id", FilterOperator::Set, Vec::<String>::new()),
        ]),
    ])
    .with_field("measures", json!(["Orders.count"]));

    let rewritten = rw.rewrite_query(&query).unwrap();
    assert_eq!(rewritten, query);
}

#[test]
fn test_not_equals_operator_untouched() {
    let rw = rewriter();
    let query = Query::new(vec![Filter::member(
        "Orders.location",
        FilterOperator::NotEquals,
        ["37.7749, -122.4194"],
    )]);

    let rewritten = rw.rewrite_query(&query).unwrap();
    assert_eq!(rewritten, query);
}

#[test]
fn test_malformed_input_rejected() {
    let rw = rewriter();
    let query = Query::new(vec![
        Filter::member("Orders.location", FilterOperator::Equals, ["1.0, 2.0"]),
        Filter::member(
            "Orders.location",
            FilterOperator::Equals,
            ["not-a-number, 12"],
        ),
    ]);

    let result = rw.rewrite(&query, &SecurityContext::anonymous());
    match result {
        Err(RewriteError::MalformedCoordinateString { value, .. }) => {
            assert_eq!(value, "not-a-number, 12");
        }
        other => panic!("Expected MalformedCoordinateString, got {:?}", other),
    }
}

#[test]
fn test_out_of_range_rejected() {
    let rw = rewriter();
    let query = Query::new(vec![Filter::member(
        "Orders.location",
        FilterOperator::Equals,
        ["200, 50"],
    )]);

    assert!(matches!(
        rw.rewrite_query(&query),
        Err(RewriteError::InvalidCoordinate { latitude, .. }) if latitude == 200.0
    ));
}

#[test]
fn test_engine_json_round_trip() {
    let rw = rewriter();
    let raw = json!({
        "measures": ["Orders.count"],
        "dimensions": ["Vendors.name"],
        "filters": [
            {"member": "Orders.location", "operator": "equals", "values": ["37.7749, -122.4194"]},
            {"member": "Orders.title", "operator": "equals", "values": ["Widget"]}
        ],
        "timezone": "UTC"
    });

    let query: Query = serde_json::from_value(raw).unwrap();
    let rewritten = rw
        .rewrite(&query, &SecurityContext::new(json!({"userId": 42})))
        .unwrap();
    let out = serde_json::to_value(&rewritten).unwrap();

    assert_eq!(
        out,
        json!({
            "measures": ["Orders.count"],
            "dimensions": ["Vendors.name"],
            "filters": [
                {"member": "Orders.h3_5", "operator": "equals", "values": [bucket("37.7749, -122.4194")]},
                {"member": "Orders.title", "operator": "equals", "values": ["Widget"]}
            ],
            "timezone": "UTC"
        })
    );
}

#[test]
fn test_untouched_filters_serialize_back_unchanged() {
    let rw = rewriter();
    let raw = json!({
        "filters": [
            {"dimension": "Orders.title", "operator": "equals", "values": ["Widget"]},
            {"member": "Orders.id", "operator": "set", "values": []},
            {"or": [
                {"member": "Orders.id", "operator": "notSet", "meta": {"source": "ui"}}
            ]}
        ]
    });

    let query: Query = serde_json::from_value(raw.clone()).unwrap();
    let rewritten = rw
        .rewrite(&query, &SecurityContext::anonymous())
        .expect("Rewrite failed");

    assert_eq!(serde_json::to_value(&rewritten).unwrap(), raw);
}

#[test]
fn test_config_from_json_with_h3_mapping() {
    init_logging();
    let config = RewriteConfig::from_json(
        r#"{
            "scheme": "h3",
            "rules": [{
                "coordinateField": "Orders.location",
                "indexField": "Orders.h3_5",
                "resolution": 5,
                "truncateOffset": 2,
                "truncateLength": 6
            }],
            "joinKeys": [{"column": "h3_9"}]
        }"#,
    )
    .unwrap();

    let rw = FilterRewriter::new(config).unwrap();
    let query = Query::new(vec![Filter::member(
        "Orders.location",
        FilterOperator::Equals,
        ["37.7749, -122.4194"],
    )]);

    let rewritten = rw.rewrite_query(&query).unwrap();
    assert_eq!(rewritten.member_filters()[0].member, "Orders.h3_5");
    assert_eq!(
        rewritten.member_filters()[0].values[0],
        bucket("37.7749, -122.4194")
    );
}

#[test]
fn test_ingested_bucket_matches_rewritten_filter() {
    let (rw, columns) = RewriterBuilder::new()
        .config(RewriteConfig::orders())
        .build_with_columns()
        .unwrap();

    let value = "40.7128, -74.0060";
    let row = columns.columns_for_str(value).unwrap();

    let query = Query::new(vec![Filter::member(
        "Orders.location",
        FilterOperator::Equals,
        [value],
    )]);
    let rewritten = rw.rewrite_query(&query).unwrap();
    let filter = rewritten.member_filters()[0];

    let stored = row
        .iter()
        .find(|(column, _)| *column == filter.member)
        .map(|(_, v)| v.clone())
        .expect("Bucket column missing from ingested row");
    assert_eq!(filter.values, vec![stored]);
}

#[test]
fn test_geohash_scheme_end_to_end() {
    init_logging();
    let config = RewriteConfig::new()
        .with_scheme(GridScheme::Geohash)
        .with_rule(RewriteRule::new("Orders.location", "Orders.gh_6").with_resolution(6))
        .with_join_key(JoinKeyRule::new("gh_9"));
    let rw = FilterRewriter::new(config.clone()).unwrap();
    let columns = IndexColumns::new(&config).unwrap();

    let query = Query::new(vec![Filter::member(
        "Orders.location",
        FilterOperator::Equals,
        ["40.7128, -74.0060"],
    )]);
    let rewritten = rw.rewrite_query(&query).unwrap();
    assert_eq!(rewritten.member_filters()[0].values, vec!["dr5reg".to_string()]);

    let row = columns.columns_for_str("40.7128, -74.0060").unwrap();
    assert_eq!(row[1].0, "gh_9");
    assert_eq!(row[1].1.len(), 11);
    assert!(row[1].1.starts_with("09dr5regw3"));
}
