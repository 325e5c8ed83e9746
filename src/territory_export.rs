//! Files handed to the map renderer: a GeoJSON layer of stores and territory
//! centres, and a per-territory summary table.

use crate::errors::{TerritoryResult, io_err};
use crate::geodesic::{Point, PointKey};
use crate::stores::Store;
use crate::territory::membership::{TerritorySummary, summarize};
use ahash::AHashMap as HashMap;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use std::io::Write;
use std::path::Path;

fn point_geometry(p: &Point) -> Geometry {
    Geometry::new(Value::Point(vec![p.lon, p.lat]))
}

pub fn territory_geojson(stores: &[Store]) -> GeoJson {
    let summary = summarize(stores);
    let by_centre: HashMap<PointKey, &TerritorySummary> =
        summary.iter().map(|t| (t.centre().key(), t)).collect();

    let mut features = Vec::with_capacity(stores.len() + summary.len());

    for store in stores {
        let territory = store
            .territory_centre
            .and_then(|c| by_centre.get(&c.key()).copied());

        let mut properties = JsonObject::new();
        properties.insert("type".to_string(), "store".into());
        properties.insert(
            "account_number".to_string(),
            store.account_number.clone().into(),
        );
        properties.insert("account_name".to_string(), store.account_name.clone().into());
        properties.insert("store_status".to_string(), store.store_status.clone().into());
        properties.insert("neighbors".to_string(), store.neighbor_count.into());
        properties.insert("density_km".to_string(), store.density.into());
        properties.insert("territory".to_string(), territory.map(|t| t.index).into());
        properties.insert(
            "territory_size".to_string(),
            territory.map(|t| t.size).into(),
        );
        properties.insert("is_centre".to_string(), store.is_centre().into());

        features.push(Feature {
            bbox: None,
            geometry: Some(point_geometry(&store.location)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    for territory in &summary {
        let mut properties = JsonObject::new();
        properties.insert("type".to_string(), "territory_centre".into());
        properties.insert("territory".to_string(), territory.index.into());
        properties.insert("territory_size".to_string(), territory.size.into());

        features.push(Feature {
            bbox: None,
            geometry: Some(point_geometry(&territory.centre())),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

pub fn write_geojson_to_path(path: &Path, stores: &[Store]) -> TerritoryResult<()> {
    let file = std::fs::File::create(path).map_err(|e| io_err!(path, e))?;
    serde_json::to_writer(std::io::BufWriter::new(file), &territory_geojson(stores))?;
    Ok(())
}

pub fn write_summary<W: Write>(writer: W, stores: &[Store]) -> TerritoryResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for territory in summarize(stores) {
        wtr.serialize(territory)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_summary_to_path(path: &Path, stores: &[Store]) -> TerritoryResult<()> {
    let file = std::fs::File::create(path).map_err(|e| io_err!(path, e))?;
    write_summary(file, stores)
}
