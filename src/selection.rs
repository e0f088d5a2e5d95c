//! Turns catalogue rows into geometry-bearing records and drops the processing levels we do
//! not download.
use crate::copernicus::CatalogueRecord;
use crate::error::{Error, Result};
use geo_types::Geometry;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Top-of-atmosphere products are never downloaded.
pub const EXCLUDED_LEVEL: &str = "L1C";

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRecord {
    pub record: CatalogueRecord,
    pub geometry: Geometry<f64>,
    /// Product name up to the first `.`, e.g. `S2A_MSIL2A_..._20230501T170051` for a `.SAFE` product
    pub identifier: String,
}

impl FilteredRecord {
    pub fn id(self: &Self) -> &str {
        &self.record.id
    }

    pub fn name(self: &Self) -> &str {
        &self.record.name
    }
}

pub fn identifier(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

pub fn is_excluded(name: &str) -> bool {
    name.contains(EXCLUDED_LEVEL)
}

fn parse_footprint(footprint: &Value) -> std::result::Result<Geometry<f64>, geojson::Error> {
    let geometry = geojson::Geometry::from_json_value(footprint.clone())?;
    Geometry::<f64>::try_from(geometry)
}

/// Keep the records worth downloading, in catalogue order. An empty selection is reported
/// as [`Error::NoTiles`].
pub fn filter_records(records: Vec<CatalogueRecord>) -> Result<Vec<FilteredRecord>> {
    let total = records.len();
    let mut selected = Vec::with_capacity(total);

    for record in records {
        if is_excluded(&record.name) {
            debug!(name = %record.name, "Skipping {EXCLUDED_LEVEL} product");
            continue;
        }

        let geometry = match record.footprint.as_ref().map(parse_footprint) {
            Some(Ok(geometry)) => geometry,
            Some(Err(e)) => {
                warn!(name = %record.name, "Skipping product with unreadable footprint: {e}");
                continue;
            }
            None => {
                warn!(name = %record.name, "Skipping product without footprint");
                continue;
            }
        };

        let identifier = identifier(&record.name).to_string();
        selected.push(FilteredRecord {
            record,
            geometry,
            identifier,
        });
    }

    info!("Selected {} of {total} products", selected.len());
    if selected.is_empty() {
        return Err(Error::NoTiles);
    }
    Ok(selected)
}
