use crate::engine_config::EngineConfig;
use crate::geodesic::{Point, haversine_km};
use crate::stores::Store;
use std::cmp::Ordering;
use tracing::{debug, info, trace};

/// Greedy, order-sensitive centre selection.
///
/// Stores are visited by `density` descending with a stable sort, stores
/// without a density last. A store becomes a centre when it has at least
/// `min_size` neighbours, is not already a centre, and every centre chosen so
/// far lies strictly farther away than its separation threshold: `radius_km`
/// for stores with more than `max_size` neighbours, `2 * radius_km` otherwise.
pub fn select_centres(stores: &[Store], config: &EngineConfig) -> Vec<Point> {
    info!("Identifying territory centres among {} stores", stores.len());

    let radius_km = config.radius_km();

    let mut ranked: Vec<&Store> = stores.iter().collect();
    ranked.sort_by(|a, b| compare_density_descending(a.density, b.density));

    let mut centres: Vec<Point> = Vec::new();

    for store in ranked {
        if store.neighbor_count < config.min_size {
            continue;
        }

        let point = store.location;

        if centres.contains(&point) {
            continue;
        }

        let threshold = if store.neighbor_count > config.max_size {
            radius_km
        } else {
            radius_km * 2.0
        };

        let separated = centres
            .iter()
            .all(|centre| haversine_km(&point, centre) > threshold);

        if separated {
            trace!(
                "Accepted centre {:?} ({} neighbours, density {:?})",
                point, store.neighbor_count, store.density
            );
            centres.push(point);
        }
    }

    debug!("Identified {} potential territories", centres.len());

    centres
}

fn compare_density_descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
