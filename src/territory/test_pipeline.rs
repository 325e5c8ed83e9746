use super::assignment::assign_nearest;
use super::membership::{distinct_centres, summarize, territories};
use super::pipeline::{PassKind, TerritoryEngine};
use super::splitter::split_oversized;
use crate::engine_config::EngineConfig;
use crate::geodesic::Point;
use crate::stores::Store;

/// Three 6x5 grids of stores, 0.03 degrees apart, with the grids 20 degrees
/// from each other.
fn three_blobs() -> Vec<Store> {
    let anchors = [(40.0, -100.0), (20.0, -80.0), (50.0, -60.0)];
    let mut stores = Vec::new();

    for (b, &(lat, lon)) in anchors.iter().enumerate() {
        for row in 0..6 {
            for col in 0..5 {
                stores.push(Store::new(
                    format!("B{}-{}-{}", b, row, col),
                    Point::new(lat + row as f64 * 0.03, lon + col as f64 * 0.03),
                ));
            }
        }
    }

    stores
}

fn blob_config() -> EngineConfig {
    EngineConfig {
        radius_mi: 50.0 / 1.6,
        min_size: 10,
        max_size: 40,
        split_schedule: vec![25, 20],
    }
}

#[test]
fn test_full_pipeline_on_blobs() {
    let engine = TerritoryEngine::new(blob_config()).unwrap();
    let outcome = engine.cluster(three_blobs()).unwrap();

    assert_eq!(outcome.stores.len(), 90);
    assert_eq!(outcome.passes.len(), 3);

    // every store in a 30-store blob sees the other 29
    assert!(outcome.stores.iter().all(|s| s.neighbor_count == 29));
    assert!(outcome.stores.iter().all(|s| s.density.is_some()));

    let initial = &outcome.passes[0];
    assert_eq!(initial.kind, PassKind::Initial);
    assert_eq!(initial.territories_before, 3);
    assert_eq!(initial.territories_after, 3);
    assert_eq!(initial.largest_territory, 30);

    let first_split = &outcome.passes[1];
    assert_eq!(first_split.kind, PassKind::Split { max_size: 25 });
    assert_eq!(first_split.territories_before, 3);
    assert_eq!(first_split.territories_after, 6);
    assert!(first_split.largest_territory < 30);

    assert!(outcome.territory_count() >= 6);

    let centres = distinct_centres(&outcome.stores);
    for store in &outcome.stores {
        let centre = store.territory_centre.unwrap();
        assert!(centres.contains(&centre));
    }

    let summary = summarize(&outcome.stores);
    assert_eq!(summary.iter().map(|s| s.size).sum::<usize>(), 90);
}

#[test]
fn test_territories_never_cross_blobs() {
    let engine = TerritoryEngine::new(blob_config()).unwrap();
    let outcome = engine.cluster(three_blobs()).unwrap();

    for territory in territories(&outcome.stores) {
        let blobs: Vec<&str> = territory
            .members
            .iter()
            .map(|&i| &outcome.stores[i].account_number[..2])
            .collect();
        assert!(blobs.iter().all(|b| *b == blobs[0]));
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let engine = TerritoryEngine::new(blob_config()).unwrap();

    let first = engine.cluster(three_blobs()).unwrap();
    let second = engine.cluster(three_blobs()).unwrap();

    assert_eq!(first.stores, second.stores);
    assert_eq!(first.passes, second.passes);
}

#[test]
fn test_final_assignment_is_stable() {
    let engine = TerritoryEngine::new(blob_config()).unwrap();
    let outcome = engine.cluster(three_blobs()).unwrap();

    let centres = distinct_centres(&outcome.stores);
    let mut again = outcome.stores.clone();
    assign_nearest(&mut again, &centres).unwrap();
    let mut twice = again.clone();
    assign_nearest(&mut twice, &centres).unwrap();

    assert_eq!(again, twice);
}

#[test]
fn test_split_pass_replaces_every_oversized_centre() {
    let engine = TerritoryEngine::new(EngineConfig {
        split_schedule: Vec::new(),
        ..blob_config()
    })
    .unwrap();
    let outcome = engine.cluster(three_blobs()).unwrap();
    assert_eq!(outcome.passes.len(), 1);

    let threshold = 25;
    let oversized: Vec<Point> = territories(&outcome.stores)
        .into_iter()
        .filter(|t| t.size() > threshold)
        .map(|t| t.centre)
        .collect();
    assert_eq!(oversized.len(), 3);

    let mut stores = outcome.stores;
    let centres = split_oversized(&stores, threshold);
    assert_eq!(centres.len(), 6);
    assign_nearest(&mut stores, &centres).unwrap();

    let remaining = distinct_centres(&stores);
    assert!(oversized.iter().all(|c| !remaining.contains(c)));
}

#[test]
fn test_default_schedule_on_small_input_keeps_territories() {
    // 30-store blobs never exceed the default 250/160/120 thresholds
    let engine = TerritoryEngine::new(EngineConfig {
        min_size: 10,
        ..EngineConfig::default()
    })
    .unwrap();
    let outcome = engine.cluster(three_blobs()).unwrap();

    assert_eq!(outcome.passes.len(), 4);
    assert!(
        outcome
            .passes
            .iter()
            .all(|p| p.territories_after == p.territories_before)
    );
    assert_eq!(outcome.territory_count(), 3);
}
