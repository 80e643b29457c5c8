use nearpick::KdTree;
use rand::prelude::*;
use rand::rngs::StdRng;

fn dist_sq(p: &[f64], q: &[f64]) -> f64 {
    p.iter().zip(q.iter()).map(|(a, b)| (a - b) * (a - b)).sum()
}

fn scenario_tree() -> KdTree<(&'static str, [f64; 2])> {
    KdTree::build(
        vec![
            ("A", [0.0, 0.0]),
            ("B", [1.0, 0.0]),
            ("C", [0.0, 1.0]),
            ("D", [5.0, 5.0]),
        ],
        |v| v.1.to_vec(),
    )
    .unwrap()
}

#[test]
fn test_nearest_two() {
    let tree = scenario_tree();
    let found = tree.nearest(&[0.0, 0.0], 2);

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].0, "A", "the exact match must come first");
    assert!(
        found[1].0 == "B" || found[1].0 == "C",
        "expected one of the two distance-1 points, got {}",
        found[1].0
    );
}

#[test]
fn test_max_distance_excludes() {
    let tree = scenario_tree();

    let found = tree.nearest_within(&[0.0, 0.0], 1, 0.5);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, "A");

    // Same radius with room for more results: B and C stay out at distance 1.
    let found = tree.nearest_within(&[0.0, 0.0], 4, 0.5);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, "A");
}

#[test]
fn test_radius_excluding_everything() {
    let tree = scenario_tree();
    assert!(tree.nearest_within(&[100.0, 100.0], 3, 1.0).is_empty());
}

#[test]
fn test_duplicate_points_both_returned() {
    let tree =
        KdTree::build(vec![("X", [2.0, 2.0]), ("Y", [2.0, 2.0])], |v| v.1.to_vec()).unwrap();
    let found = tree.nearest(&[2.0, 2.0], 2);

    assert_eq!(found.len(), 2);
    let names: Vec<&str> = found.iter().map(|v| v.0).collect();
    assert!(names.contains(&"X") && names.contains(&"Y"), "got {:?}", names);
}

#[test]
fn test_returns_all_points_ordered() {
    let mut rng = StdRng::seed_from_u64(42);
    let points: Vec<[f64; 2]> = (0..500)
        .map(|_| [rng.gen_range(0.0..30.0), rng.gen_range(0.0..30.0)])
        .collect();
    let tree = KdTree::build(points.clone(), |p| p.to_vec()).unwrap();

    for _ in 0..20 {
        let q = [rng.gen_range(0.0..30.0), rng.gen_range(0.0..30.0)];
        let found = tree.nearest(&q, points.len());
        assert_eq!(found.len(), points.len());

        let dists: Vec<f64> = found.iter().map(|p| dist_sq(*p, &q)).collect();
        for w in dists.windows(2) {
            assert!(w[0] <= w[1], "results out of order: {} > {}", w[0], w[1]);
        }
    }
}

#[test]
fn test_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    let points: Vec<[f64; 2]> = (0..300)
        .map(|_| [rng.gen_range(0.0..20.0), rng.gen_range(0.0..20.0)])
        .collect();
    let tree = KdTree::build(points.clone(), |p| p.to_vec()).unwrap();

    for _ in 0..50 {
        let q = [rng.gen_range(-5.0..25.0), rng.gen_range(-5.0..25.0)];

        let mut expected: Vec<f64> = points.iter().map(|p| dist_sq(p, &q)).collect();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());

        for &k in &[1usize, 3, 10, 50] {
            let found = tree.nearest(&q, k);
            assert_eq!(found.len(), k.min(points.len()));

            // Ties may resolve to different points, so compare distances.
            for (i, p) in found.iter().enumerate() {
                let d = dist_sq(*p, &q);
                assert!(
                    (d - expected[i]).abs() < 1e-9,
                    "rank {} at distance {} instead of {}",
                    i,
                    d,
                    expected[i]
                );
            }
        }
    }
}

#[test]
fn test_bounded_cardinality_and_distance() {
    let mut rng = StdRng::seed_from_u64(11);
    let points: Vec<[f64; 2]> = (0..200)
        .map(|_| [rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)])
        .collect();
    let tree = KdTree::build(points.clone(), |p| p.to_vec()).unwrap();

    for _ in 0..20 {
        let q = [rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)];
        for radius in [0.5, 2.0, 5.0] {
            for &k in &[1usize, 7, 300] {
                let found = tree.nearest_within(&q, k, radius);

                let within = points
                    .iter()
                    .filter(|p| dist_sq(*p, &q) <= radius * radius)
                    .count();
                assert_eq!(found.len(), within.min(k));

                for p in &found {
                    assert!(dist_sq(*p, &q) <= radius * radius);
                }
            }
        }
    }
}

#[test]
fn test_repeated_queries_identical() {
    let mut rng = StdRng::seed_from_u64(5);
    let points: Vec<[f64; 2]> = (0..150)
        .map(|_| [rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)])
        .collect();
    let tree = KdTree::build(points, |p| p.to_vec()).unwrap();

    let q = [3.3, 7.1];
    let first: Vec<[f64; 2]> = tree.nearest(&q, 12).into_iter().copied().collect();
    for _ in 0..10 {
        let again: Vec<[f64; 2]> = tree.nearest(&q, 12).into_iter().copied().collect();
        assert_eq!(first, again);
    }
}

#[test]
fn test_query_from_far_outside() {
    let tree = scenario_tree();
    let found = tree.nearest(&[-100.0, -100.0], 4);
    assert_eq!(found.len(), 4);
    assert_eq!(found[0].0, "A");
    assert_eq!(found[3].0, "D");
}
