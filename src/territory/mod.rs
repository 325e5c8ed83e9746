//! Density-seeded territory clustering.
//!
//! Stages run strictly in order: [`distance_matrix`] → [`density`] →
//! [`centres`] → [`assignment`] / [`alignment`] → [`splitter`], driven by
//! [`pipeline::TerritoryEngine`].

pub mod alignment;
pub mod assignment;
pub mod centres;
pub mod density;
pub mod distance_matrix;
pub mod membership;
pub mod pipeline;
pub mod splitter;

#[cfg(test)]
mod test_pipeline;

pub use membership::{Territory, TerritorySummary};
pub use pipeline::{ClusterOutcome, PassKind, PassReport, TerritoryEngine};
