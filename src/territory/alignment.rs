use super::assignment::assign_nearest;
use super::membership::territories;
use crate::errors::TerritoryResult;
use crate::geodesic::Point;
use crate::stores::Store;
use geo::{Centroid, MultiPoint};
use tracing::info;

/// Moves every territory centre to the plain mean of its members'
/// latitudes and longitudes, then reassigns all stores to the new centres.
///
/// Runs once; it is not iterated to convergence. Returns the centroid list
/// the stores were reassigned against, in first-appearance order of the old
/// centres.
pub fn align_to_centroids(stores: &mut [Store]) -> TerritoryResult<Vec<Point>> {
    info!("Aligning territories to their centroids");

    let table: &[Store] = stores;

    let centroids: Vec<Point> = territories(table)
        .iter()
        .filter_map(|territory| {
            let members: MultiPoint<f64> = territory
                .member_points(table)
                .map(geo_types::Point::from)
                .collect();

            members.centroid().map(Point::from)
        })
        .collect();

    assign_nearest(stores, &centroids)?;

    Ok(centroids)
}
