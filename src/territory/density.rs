use super::distance_matrix::DistanceMatrix;
use crate::engine_config::EngineConfig;
use crate::stores::Store;
use tracing::{debug, info};

/// Fills `neighbor_count` and `density` for every store.
///
/// Neighbours are the matrix edges leaving the store's location that are
/// strictly shorter than the configured radius. `density` is their mean
/// length, or `None` when there are none.
pub fn estimate_density(stores: &mut [Store], matrix: &DistanceMatrix, config: &EngineConfig) {
    let radius_km = config.radius_km();

    info!(
        "Calculating neighbourhood metrics for {} stores within {} km",
        stores.len(),
        radius_km
    );

    for store in stores.iter_mut() {
        let (population, total) = matrix
            .edges_from(&store.location)
            .filter(|edge| edge.distance_km < radius_km)
            .fold((0usize, 0.0f64), |(count, sum), edge| {
                (count + 1, sum + edge.distance_km)
            });

        store.neighbor_count = population;
        store.density = if population == 0 {
            None
        } else {
            Some(total / population as f64)
        };
    }

    debug!(
        "{} stores have no neighbours in range",
        stores.iter().filter(|s| s.density.is_none()).count()
    );
}
