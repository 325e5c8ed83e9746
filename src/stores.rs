use crate::errors::{TerritoryResult, io_err};
use crate::geodesic::Point;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// A geocoded retail location plus the fields the engine derives for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    pub account_number: String,
    pub account_name: Option<String>,
    pub store_status: Option<String>,
    pub location: Point,
    /// In-range neighbours, set by the density estimator.
    pub neighbor_count: usize,
    /// Mean distance in km to in-range neighbours. `None` without neighbours.
    pub density: Option<f64>,
    pub territory_centre: Option<Point>,
}

impl Store {
    pub fn new(account_number: impl Into<String>, location: Point) -> Self {
        Store {
            account_number: account_number.into(),
            account_name: None,
            store_status: None,
            location,
            neighbor_count: 0,
            density: None,
            territory_centre: None,
        }
    }

    /// True when the store sits exactly on its own territory centre.
    pub fn is_centre(&self) -> bool {
        self.territory_centre == Some(self.location)
    }
}

/// Row layout written by the geocoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodedStoreRow {
    #[serde(rename = "Account_Number")]
    pub account_number: String,
    #[serde(rename = "Account_Name", default)]
    pub account_name: Option<String>,
    #[serde(rename = "Store_Status", default)]
    pub store_status: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

impl From<GeocodedStoreRow> for Store {
    fn from(row: GeocodedStoreRow) -> Self {
        Store {
            account_name: row.account_name,
            store_status: row.store_status,
            ..Store::new(row.account_number, Point::new(row.latitude, row.longitude))
        }
    }
}

/// Row layout of the engine's output table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteredStoreRow {
    #[serde(rename = "Account_Number")]
    pub account_number: String,
    #[serde(rename = "Account_Name", default)]
    pub account_name: Option<String>,
    #[serde(rename = "Store_Status", default)]
    pub store_status: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Neighbors")]
    pub neighbors: usize,
    #[serde(rename = "Total Density")]
    pub total_density: Option<f64>,
    #[serde(rename = "Centre Latitude")]
    pub centre_latitude: Option<f64>,
    #[serde(rename = "Centre Longitude")]
    pub centre_longitude: Option<f64>,
}

impl From<&Store> for ClusteredStoreRow {
    fn from(store: &Store) -> Self {
        ClusteredStoreRow {
            account_number: store.account_number.clone(),
            account_name: store.account_name.clone(),
            store_status: store.store_status.clone(),
            latitude: store.location.lat,
            longitude: store.location.lon,
            neighbors: store.neighbor_count,
            total_density: store.density,
            centre_latitude: store.territory_centre.map(|c| c.lat),
            centre_longitude: store.territory_centre.map(|c| c.lon),
        }
    }
}

impl From<ClusteredStoreRow> for Store {
    fn from(row: ClusteredStoreRow) -> Self {
        let territory_centre = match (row.centre_latitude, row.centre_longitude) {
            (Some(lat), Some(lon)) => Some(Point::new(lat, lon)),
            _ => None,
        };

        Store {
            account_number: row.account_number,
            account_name: row.account_name,
            store_status: row.store_status,
            location: Point::new(row.latitude, row.longitude),
            neighbor_count: row.neighbors,
            density: row.total_density,
            territory_centre,
        }
    }
}

pub fn read_geocoded_stores<R: Read>(reader: R) -> TerritoryResult<Vec<Store>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut stores = Vec::new();
    for row in rdr.deserialize::<GeocodedStoreRow>() {
        stores.push(Store::from(row?));
    }

    Ok(stores)
}

pub fn read_geocoded_stores_from_path(path: &Path) -> TerritoryResult<Vec<Store>> {
    let file = std::fs::File::open(path).map_err(|e| io_err!(path, e))?;
    read_geocoded_stores(file)
}

pub fn read_clustered_stores<R: Read>(reader: R) -> TerritoryResult<Vec<Store>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut stores = Vec::new();
    for row in rdr.deserialize::<ClusteredStoreRow>() {
        stores.push(Store::from(row?));
    }

    Ok(stores)
}

pub fn read_clustered_stores_from_path(path: &Path) -> TerritoryResult<Vec<Store>> {
    let file = std::fs::File::open(path).map_err(|e| io_err!(path, e))?;
    read_clustered_stores(file)
}

pub fn write_clustered_stores<W: Write>(writer: W, stores: &[Store]) -> TerritoryResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for store in stores {
        wtr.serialize(ClusteredStoreRow::from(store))?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_clustered_stores_to_path(path: &Path, stores: &[Store]) -> TerritoryResult<()> {
    let file = std::fs::File::create(path).map_err(|e| io_err!(path, e))?;
    write_clustered_stores(file, stores)
}
