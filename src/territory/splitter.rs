use super::membership::{Territory, territories};
use crate::geodesic::{Point, haversine_km};
use crate::stores::Store;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Member pair chosen to seed the two halves of an oversized territory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSeeds {
    pub first: Point,
    pub second: Point,
    pub score: f64,
}

/// Builds the next centre list. Every territory with more than `max_size`
/// members is replaced by the two members returned by
/// [`farthest_member_pair`]; every other territory keeps its centre.
///
/// Centres come out in the territories' first-appearance order, with the two
/// seeds of a split territory in place of its old centre. The caller is
/// expected to reassign (and usually realign) against the result.
pub fn split_oversized(stores: &[Store], max_size: usize) -> Vec<Point> {
    let start = Instant::now();
    let grouped = territories(stores);
    let oversized = grouped.iter().filter(|t| t.size() > max_size).count();

    info!(
        "Optimizing territory size: {} of {} territories exceed {} stores",
        oversized,
        grouped.len(),
        max_size
    );

    // Territories are independent; collect keeps their original order.
    let replacements: Vec<Vec<Point>> = grouped
        .par_iter()
        .map(|territory| {
            if territory.size() <= max_size {
                return vec![territory.centre];
            }

            match farthest_member_pair(territory, stores) {
                Some(seeds) => {
                    debug!(
                        "Splitting territory at {:?} ({} stores) into {:?} and {:?}",
                        territory.centre,
                        territory.size(),
                        seeds.first,
                        seeds.second
                    );
                    vec![seeds.first, seeds.second]
                }
                None => vec![territory.centre],
            }
        })
        .collect();

    let centres: Vec<Point> = replacements.into_iter().flatten().collect();

    debug!(
        "Identified {} optimized territories in {:?}",
        centres.len(),
        start.elapsed()
    );

    centres
}

/// Pair of distinct members maximising
/// `d(p1, centre) + d(p2, centre) + d(p1, p2)`.
///
/// Scanning ordered pairs `(i, j)` row by row and keeping the first strict
/// maximum always lands on some `i < j`, because `(j, i)` scores the same and
/// comes later. Only those pairs are scored here. Returns `None` for
/// territories with fewer than two members.
pub fn farthest_member_pair(territory: &Territory, stores: &[Store]) -> Option<SplitSeeds> {
    let points: Vec<Point> = territory.member_points(stores).collect();
    if points.len() < 2 {
        return None;
    }

    let to_centre: Vec<f64> = points
        .iter()
        .map(|p| haversine_km(p, &territory.centre))
        .collect();

    // best pair per row; rows are then reduced in order so ties keep the
    // earliest row
    let per_row: Vec<Option<(usize, usize, f64)>> = (0..points.len() - 1)
        .into_par_iter()
        .map(|i| {
            let mut best: Option<(usize, usize, f64)> = None;
            for j in (i + 1)..points.len() {
                let score = to_centre[i] + to_centre[j] + haversine_km(&points[i], &points[j]);
                if best.is_none_or(|(_, _, s)| score > s) {
                    best = Some((i, j, score));
                }
            }
            best
        })
        .collect();

    let mut best: Option<(usize, usize, f64)> = None;
    for candidate in per_row.into_iter().flatten() {
        if best.is_none_or(|(_, _, s)| candidate.2 > s) {
            best = Some(candidate);
        }
    }

    best.map(|(i, j, score)| SplitSeeds {
        first: points[i],
        second: points[j],
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::territory::assignment::assign_nearest;
    use crate::territory::membership::distinct_centres;

    /// Ordered-pair scan exactly as the heuristic is defined.
    fn brute_force_pair(points: &[Point], centre: &Point) -> (Point, Point, f64) {
        let mut max_distance = f64::NEG_INFINITY;
        let mut pair = (points[0], points[0]);

        for (i, p1) in points.iter().enumerate() {
            for (j, p2) in points.iter().enumerate() {
                if i == j {
                    continue;
                }
                let distance =
                    haversine_km(p1, centre) + haversine_km(p2, centre) + haversine_km(p1, p2);
                if distance > max_distance {
                    max_distance = distance;
                    pair = (*p1, *p2);
                }
            }
        }

        (pair.0, pair.1, max_distance)
    }

    fn clustered_territory(max_size: usize) -> (Vec<Store>, Point) {
        let centre = Point::new(45.0, -100.0);
        let mut stores = Vec::new();

        // max_size + 1 members packed around the centre, two of them outliers
        for k in 0..(max_size - 1) {
            let ring = (k % 7) as f64 * 0.01;
            let spoke = (k / 7) as f64 * 0.013;
            stores.push(Store::new(
                format!("near-{}", k),
                Point::new(centre.lat + ring, centre.lon + spoke),
            ));
        }
        stores.push(Store::new("outlier-west", Point::new(44.0, -104.0)));
        stores.push(Store::new("outlier-east", Point::new(46.5, -97.0)));

        for s in stores.iter_mut() {
            s.territory_centre = Some(centre);
        }

        (stores, centre)
    }

    #[test]
    fn test_splits_exactly_one_territory_into_two() {
        let max_size = 20;
        let (stores, centre) = clustered_territory(max_size);
        assert_eq!(stores.len(), max_size + 1);

        let centres = split_oversized(&stores, max_size);

        assert_eq!(centres.len(), 2);
        assert!(!centres.contains(&centre));

        let points: Vec<Point> = stores.iter().map(|s| s.location).collect();
        let (p1, p2, _) = brute_force_pair(&points, &centre);
        assert_eq!(centres, vec![p1, p2]);

        assert!(centres.contains(&Point::new(44.0, -104.0)));
        assert!(centres.contains(&Point::new(46.5, -97.0)));
    }

    #[test]
    fn test_matches_brute_force_reference() {
        let (stores, centre) = clustered_territory(40);
        let territory = &territories(&stores)[0];

        let seeds = farthest_member_pair(territory, &stores).unwrap();
        let points: Vec<Point> = stores.iter().map(|s| s.location).collect();
        let (p1, p2, score) = brute_force_pair(&points, &centre);

        assert_eq!(seeds.first, p1);
        assert_eq!(seeds.second, p2);
        assert!((seeds.score - score).abs() < 1e-9);
    }

    #[test]
    fn test_tied_pairs_resolve_like_ordered_scan() {
        // a square around the centre has several pairs with identical scores
        let centre = Point::new(0.0, 0.0);
        let corners = [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];
        let mut stores: Vec<Store> = corners
            .iter()
            .enumerate()
            .map(|(i, &(lat, lon))| Store::new(format!("c{}", i), Point::new(lat, lon)))
            .collect();
        for s in stores.iter_mut() {
            s.territory_centre = Some(centre);
        }

        let territory = &territories(&stores)[0];
        let seeds = farthest_member_pair(territory, &stores).unwrap();
        let points: Vec<Point> = stores.iter().map(|s| s.location).collect();
        let (p1, p2, _) = brute_force_pair(&points, &centre);

        assert_eq!((seeds.first, seeds.second), (p1, p2));
    }

    #[test]
    fn test_small_territories_keep_their_centre() {
        let (mut stores, _) = clustered_territory(10);
        let far_centre = Point::new(-30.0, 140.0);
        for k in 0..3 {
            let mut s = Store::new(format!("far-{}", k), Point::new(-30.0 + k as f64, 140.0));
            s.territory_centre = Some(far_centre);
            stores.push(s);
        }

        let centres = split_oversized(&stores, 10);

        // first territory split in place, second kept
        assert_eq!(centres.len(), 3);
        assert_eq!(centres[2], far_centre);

        let unchanged = split_oversized(&stores, 100);
        assert_eq!(unchanged, distinct_centres(&stores));
    }

    #[test]
    fn test_no_oversized_territory_keeps_its_centre_after_split() {
        let (mut stores, centre) = clustered_territory(20);
        let centres = split_oversized(&stores, 20);
        assign_nearest(&mut stores, &centres).unwrap();

        let after = distinct_centres(&stores);
        assert!(!after.contains(&centre));
        assert!(after.len() <= 2);
    }

    #[test]
    fn test_single_member_cannot_split() {
        let mut store = Store::new("solo", Point::new(1.0, 1.0));
        store.territory_centre = Some(Point::new(1.0, 1.0));
        let stores = vec![store];

        assert_eq!(farthest_member_pair(&territories(&stores)[0], &stores), None);
        assert_eq!(split_oversized(&stores, 0), vec![Point::new(1.0, 1.0)]);
    }

    #[test]
    fn test_empty_table() {
        assert!(split_oversized(&[], 250).is_empty());
    }
}
