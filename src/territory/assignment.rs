use crate::errors::{TerritoryError, TerritoryResult};
use crate::geodesic::{Point, PointKey, haversine_km};
use crate::stores::Store;
use ahash::AHashSet as HashSet;
use tracing::{debug, info};

/// Points every store at its nearest centre.
///
/// A store standing exactly on a centre is given that centre without
/// computing any distance. Otherwise the first centre in list order with
/// the minimum distance wins, so ties are resolved by `centres` order.
pub fn assign_nearest(stores: &mut [Store], centres: &[Point]) -> TerritoryResult<()> {
    if stores.is_empty() {
        return Ok(());
    }

    if centres.is_empty() {
        return Err(TerritoryError::NoCentres {
            stores: stores.len(),
        });
    }

    info!(
        "Assigning {} stores to {} territory centres",
        stores.len(),
        centres.len()
    );

    let centre_keys: HashSet<PointKey> = centres.iter().map(Point::key).collect();

    for store in stores.iter_mut() {
        let closest = if centre_keys.contains(&store.location.key()) {
            store.location
        } else {
            nearest_centre(&store.location, centres)
        };

        store.territory_centre = Some(closest);
    }

    debug!("Territory assignment completed");

    Ok(())
}

/// First centre with the minimum distance to `point`. `centres` must not be
/// empty.
fn nearest_centre(point: &Point, centres: &[Point]) -> Point {
    let mut best = centres[0];
    let mut best_distance = haversine_km(point, &best);

    for centre in &centres[1..] {
        let distance = haversine_km(point, centre);
        if distance < best_distance {
            best = *centre;
            best_distance = distance;
        }
    }

    best
}
