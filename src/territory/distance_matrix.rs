use crate::errors::{TerritoryResult, io_err};
use crate::geodesic::{Point, PointKey, haversine_km};
use crate::stores::Store;
use ahash::AHashMap as HashMap;
use rayon::prelude::*;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// One directed entry of the matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEdge {
    pub from: Point,
    pub to: Point,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy)]
struct RowEntry {
    to: usize,
    distance_km: f64,
}

/// Pairwise great-circle distances between every ordered pair of distinct
/// rows of a store table.
///
/// Row `i` holds the edges leaving store `i`, in table order. Rows are also
/// indexed by origin point so that coincident stores can be queried together.
#[derive(Debug, Default)]
pub struct DistanceMatrix {
    points: Vec<Point>,
    rows: Vec<Vec<RowEntry>>,
    by_origin: HashMap<PointKey, Vec<usize>>,
}

impl DistanceMatrix {
    pub fn build(stores: &[Store]) -> Self {
        let start = Instant::now();
        let points: Vec<Point> = stores.iter().map(|s| s.location).collect();

        info!(
            "Calculating distance matrix for {} stores ({} edges)",
            points.len(),
            edge_count_for(points.len())
        );

        // Each row only reads the shared point list and writes its own vector.
        let rows: Vec<Vec<RowEntry>> = points
            .par_iter()
            .enumerate()
            .map(|(i, from)| {
                points
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(j, to)| RowEntry {
                        to: j,
                        distance_km: haversine_km(from, to),
                    })
                    .collect()
            })
            .collect();

        let mut by_origin: HashMap<PointKey, Vec<usize>> = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            by_origin.entry(p.key()).or_default().push(i);
        }

        debug!(
            "Distance matrix built in {:?}, {} distinct origins",
            start.elapsed(),
            by_origin.len()
        );

        DistanceMatrix {
            points,
            rows,
            by_origin,
        }
    }

    pub fn store_count(&self) -> usize {
        self.points.len()
    }

    pub fn edge_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }

    /// Edges leaving the store at table position `index`.
    pub fn row(&self, index: usize) -> impl Iterator<Item = DistanceEdge> + '_ {
        let from = self.points[index];
        self.rows[index].iter().map(move |entry| DistanceEdge {
            from,
            to: self.points[entry.to],
            distance_km: entry.distance_km,
        })
    }

    /// Every edge whose origin is exactly `point`. When several stores share
    /// a location their rows are all returned, in table order.
    pub fn edges_from(&self, point: &Point) -> impl Iterator<Item = DistanceEdge> + '_ {
        self.by_origin
            .get(&point.key())
            .into_iter()
            .flatten()
            .flat_map(move |&i| self.row(i))
    }

    pub fn edges(&self) -> impl Iterator<Item = DistanceEdge> + '_ {
        (0..self.rows.len()).flat_map(move |i| self.row(i))
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> TerritoryResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([
            "From Latitude",
            "From Longitude",
            "To Latitude",
            "To Longitude",
            "Distance",
        ])?;

        for edge in self.edges() {
            wtr.write_record(&[
                edge.from.lat.to_string(),
                edge.from.lon.to_string(),
                edge.to.lat.to_string(),
                edge.to.lon.to_string(),
                edge.distance_km.to_string(),
            ])?;
        }

        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn write_csv_to_path(&self, path: &Path) -> TerritoryResult<()> {
        let file = std::fs::File::create(path).map_err(|e| io_err!(path, e))?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}

fn edge_count_for(n: usize) -> usize {
    n * n.saturating_sub(1)
}
