use super::alignment::align_to_centroids;
use super::assignment::assign_nearest;
use super::centres::select_centres;
use super::density::estimate_density;
use super::distance_matrix::DistanceMatrix;
use super::membership::{distinct_centres, largest_territory};
use super::splitter::split_oversized;
use crate::engine_config::EngineConfig;
use crate::errors::TerritoryResult;
use crate::stores::Store;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Density-seeded assignment followed by the first alignment.
    Initial,
    /// Split pass against the given size threshold.
    Split { max_size: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub kind: PassKind,
    pub territories_before: usize,
    pub territories_after: usize,
    pub largest_territory: usize,
}

#[derive(Debug, Clone)]
pub struct ClusterOutcome {
    pub stores: Vec<Store>,
    pub passes: Vec<PassReport>,
}

impl ClusterOutcome {
    pub fn territory_count(&self) -> usize {
        distinct_centres(&self.stores).len()
    }
}

/// Runs the fixed clustering schedule: density, centre selection, one
/// assign+align pass, then one split+assign+align pass per entry of
/// `split_schedule`. There is no convergence loop and territories are never
/// merged.
pub struct TerritoryEngine {
    config: EngineConfig,
}

impl TerritoryEngine {
    pub fn new(config: EngineConfig) -> TerritoryResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Distance matrix plus neighbourhood metrics. This is the whole of the
    /// engine's quadratic work.
    pub fn annotate_density(&self, stores: &mut [Store]) -> DistanceMatrix {
        let matrix = DistanceMatrix::build(stores);
        estimate_density(stores, &matrix, &self.config);
        matrix
    }

    pub fn cluster(&self, mut stores: Vec<Store>) -> TerritoryResult<ClusterOutcome> {
        let start = Instant::now();
        let mut passes = Vec::with_capacity(self.config.split_schedule.len() + 1);

        if stores.is_empty() {
            info!("No stores to cluster");
            return Ok(ClusterOutcome { stores, passes });
        }

        self.annotate_density(&mut stores);

        let centres = select_centres(&stores, &self.config);
        info!(
            "Running clustering algorithm with {} seed centres",
            centres.len()
        );

        assign_nearest(&mut stores, &centres)?;
        align_to_centroids(&mut stores)?;
        passes.push(self.report(PassKind::Initial, centres.len(), &stores));

        let total = self.config.split_schedule.len();
        for (n, &max_size) in self.config.split_schedule.iter().enumerate() {
            info!(
                "Running territory optimization (iteration {} of {}, max size {})",
                n + 1,
                total,
                max_size
            );

            let before = distinct_centres(&stores).len();
            let centres = split_oversized(&stores, max_size);
            assign_nearest(&mut stores, &centres)?;
            align_to_centroids(&mut stores)?;

            passes.push(self.report(PassKind::Split { max_size }, before, &stores));
        }

        info!(
            "Clustered {} stores into {} territories in {:?}",
            stores.len(),
            distinct_centres(&stores).len(),
            start.elapsed()
        );

        Ok(ClusterOutcome { stores, passes })
    }

    fn report(&self, kind: PassKind, territories_before: usize, stores: &[Store]) -> PassReport {
        let report = PassReport {
            kind,
            territories_before,
            territories_after: distinct_centres(stores).len(),
            largest_territory: largest_territory(stores),
        };

        info!(
            "{:?}: {} -> {} territories, largest has {} stores",
            report.kind,
            report.territories_before,
            report.territories_after,
            report.largest_territory
        );

        report
    }
}
