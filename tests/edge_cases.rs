use spatio_rewrite::prelude::*;
use spatio_rewrite::{REWRITE_RESOLUTION, REWRITE_WINDOW, canonical_len, encode, truncate_to_bucket};
use std::sync::Arc;
use std::thread;

/// Deterministic sweep over the globe, poles and antimeridian included.
fn sample_coordinates() -> Vec<Coordinate> {
    let mut points = Vec::new();
    for lat_step in 0..=36 {
        for lon_step in 0..=72 {
            let lat = -90.0 + lat_step as f64 * 5.0;
            let lon = -180.0 + lon_step as f64 * 5.0;
            points.push(Coordinate::new(lat, lon));
        }
    }
    points.push(Coordinate::new(37.7749, -122.4194));
    points.push(Coordinate::new(-0.0, 0.0));
    points
}

/// Test 1: Repeated encoding yields identical identifiers
#[test]
fn test_encode_determinism_across_globe() {
    for p in sample_coordinates() {
        for resolution in [0, 5, 9, 12, 15] {
            let first = encode(&p, resolution).expect("Encode failed");
            let second = encode(&p, resolution).expect("Encode failed");
            assert_eq!(first, second, "{p} at {resolution}");
        }
    }
}

/// Test 2: Every valid coordinate maps to exactly one well-formed identifier
#[test]
fn test_partition_every_coordinate_mapped() {
    for p in sample_coordinates() {
        let cell = encode(&p, REWRITE_RESOLUTION).expect("Coordinate left unmapped");
        assert_eq!(cell.resolution(), REWRITE_RESOLUTION);
        assert_eq!(
            CellIdentifier::parse(GridScheme::H3, cell.as_str()).expect("Malformed identifier"),
            cell
        );
    }
}

/// Test 3: Buckets at the rewrite resolution always have the window length
#[test]
fn test_truncation_stability() {
    for p in sample_coordinates() {
        let cell = encode(&p, REWRITE_RESOLUTION).unwrap();
        let bucket = truncate_to_bucket(&cell, REWRITE_WINDOW.offset, REWRITE_WINDOW.length)
            .expect("Truncation failed");
        assert_eq!(bucket.len(), REWRITE_WINDOW.length);
    }
}

/// Test 4: Finer cells nest in exactly one coarser cell
#[test]
fn test_hierarchical_containment() {
    let s2 = CellCodec::new(GridScheme::S2);
    for p in sample_coordinates().into_iter().step_by(7) {
        let leaf = s2.encode(&p, 30).unwrap();
        for level in 0..30 {
            assert_eq!(leaf.parent(level).unwrap(), s2.encode(&p, level).unwrap());
        }
    }

    // H3 ancestry is transitive and stays on the child's base cell
    for p in sample_coordinates().into_iter().step_by(7) {
        let leaf = encode(&p, 15).unwrap();
        for resolution in 0..15 {
            let parent = leaf.parent(resolution).unwrap();
            let via_child = leaf.parent(resolution + 1).unwrap().parent(resolution).unwrap();
            assert_eq!(parent.resolution(), resolution);
            assert_eq!(parent, via_child);
            assert_eq!(parent.as_str()[2..3], leaf.as_str()[2..3]);
        }
    }
}

/// Test 5: Identifier length depends only on scheme and resolution
#[test]
fn test_canonical_len_table() {
    assert_eq!(canonical_len(GridScheme::H3, 0), 15);
    assert_eq!(canonical_len(GridScheme::H3, 15), 15);
    assert_eq!(canonical_len(GridScheme::S2, 0), 18);
    assert_eq!(canonical_len(GridScheme::S2, 30), 18);
    assert_eq!(canonical_len(GridScheme::Geohash, 1), 3);
    assert_eq!(canonical_len(GridScheme::Geohash, 12), 14);
}

/// Test 6: Boundary coordinates accepted, just-outside rejected
#[test]
fn test_extreme_coordinates() {
    for (lat, lon) in [(90.0, 0.0), (-90.0, 0.0), (0.0, 180.0), (0.0, -180.0)] {
        assert!(encode(&Coordinate::new(lat, lon), 9).is_ok());
    }

    for (lat, lon) in [(90.0001, 0.0), (0.0, -180.0001), (f64::NAN, 0.0)] {
        assert!(matches!(
            encode(&Coordinate::new(lat, lon), 9),
            Err(RewriteError::InvalidCoordinate { .. })
        ));
    }
}

/// Test 7: Non-finite strings parse but are rejected by the codec
#[test]
fn test_non_finite_values_rejected() {
    let rewriter = FilterRewriter::new(RewriteConfig::orders()).unwrap();
    for value in ["NaN, 0", "0, inf"] {
        let query = Query::new(vec![Filter::member(
            "Orders.location",
            FilterOperator::Equals,
            [value],
        )]);
        assert!(matches!(
            rewriter.rewrite_query(&query),
            Err(RewriteError::InvalidCoordinate { .. })
        ));
    }
}

/// Test 8: Members only differing in case are not rewritten
#[test]
fn test_member_match_is_exact() {
    let rewriter = FilterRewriter::new(RewriteConfig::orders()).unwrap();
    let query = Query::new(vec![Filter::member(
        "orders.location",
        FilterOperator::Equals,
        ["not even a coordinate"],
    )]);
    assert_eq!(rewriter.rewrite_query(&query).unwrap(), query);
}

/// Test 9: One rewriter shared by concurrent request threads
#[test]
fn test_concurrent_rewrites() {
    let rewriter: Arc<dyn QueryRewrite> =
        Arc::new(FilterRewriter::new(RewriteConfig::orders()).unwrap());
    let expected = CellCodec::default()
        .bucket(
            &Coordinate::new(37.7749, -122.4194),
            REWRITE_RESOLUTION,
            REWRITE_WINDOW,
        )
        .unwrap()
        .into_string();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let rewriter = Arc::clone(&rewriter);
            thread::spawn(move || {
                let query = Query::new(vec![Filter::member(
                    "Orders.location",
                    FilterOperator::Equals,
                    ["37.7749, -122.4194"],
                )]);
                let mut buckets = Vec::new();
                for _ in 0..100 {
                    let rewritten = rewriter
                        .rewrite(&query, &SecurityContext::anonymous())
                        .expect("Rewrite failed");
                    buckets.push(rewritten.member_filters()[0].values[0].clone());
                }
                buckets
            })
        })
        .collect();

    for handle in handles {
        let buckets = handle.join().expect("Thread panicked");
        assert!(buckets.iter().all(|b| *b == expected));
    }
}

/// Test 10: Nearby join keys for order/vendor pairs
#[test]
fn test_join_keys_group_nearby_rows() {
    let columns = IndexColumns::new(&RewriteConfig::orders()).unwrap();
    let order = Coordinate::new(40.7128, -74.0060);
    let vendor = Coordinate::new(40.7170, -74.0000);

    assert!(columns.is_nearby("h3_9", &order, &vendor).unwrap());
    assert!(order.haversine_distance(&vendor) < 10_000.0);
    assert!(columns.is_nearby("missing", &order, &vendor).is_err());
}
