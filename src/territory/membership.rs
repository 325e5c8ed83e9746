//! Territories are never stored. They are grouped out of the store table on
//! demand, keyed by `territory_centre`, in order of first appearance.

use crate::geodesic::{Point, PointKey};
use crate::stores::Store;
use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub centre: Point,
    /// Table positions of the member stores, ascending.
    pub members: Vec<usize>,
}

impl Territory {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn member_points<'a>(&'a self, stores: &'a [Store]) -> impl Iterator<Item = Point> + 'a {
        self.members.iter().map(move |&i| stores[i].location)
    }
}

/// Groups stores by their assigned centre. Unassigned stores are skipped.
pub fn territories(stores: &[Store]) -> Vec<Territory> {
    let mut index: HashMap<PointKey, usize> = HashMap::new();
    let mut grouped: Vec<Territory> = Vec::new();

    for (i, store) in stores.iter().enumerate() {
        let Some(centre) = store.territory_centre else {
            continue;
        };

        let slot = *index.entry(centre.key()).or_insert_with(|| {
            grouped.push(Territory {
                centre,
                members: Vec::new(),
            });
            grouped.len() - 1
        });

        grouped[slot].members.push(i);
    }

    grouped
}

/// Distinct centres in order of first appearance.
pub fn distinct_centres(stores: &[Store]) -> Vec<Point> {
    territories(stores).into_iter().map(|t| t.centre).collect()
}

pub fn largest_territory(stores: &[Store]) -> usize {
    territories(stores)
        .iter()
        .map(Territory::size)
        .max()
        .unwrap_or(0)
}

/// Per-territory figures the map needs for sizing and colouring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritorySummary {
    #[serde(rename = "Territory")]
    pub index: usize,
    #[serde(rename = "Centre Latitude")]
    pub centre_latitude: f64,
    #[serde(rename = "Centre Longitude")]
    pub centre_longitude: f64,
    #[serde(rename = "Stores")]
    pub size: usize,
}

impl TerritorySummary {
    pub fn centre(&self) -> Point {
        Point::new(self.centre_latitude, self.centre_longitude)
    }
}

pub fn summarize(stores: &[Store]) -> Vec<TerritorySummary> {
    territories(stores)
        .iter()
        .enumerate()
        .map(|(index, t)| TerritorySummary {
            index,
            centre_latitude: t.centre.lat,
            centre_longitude: t.centre.lon,
            size: t.size(),
        })
        .collect()
}
