use crate::copernicus::{Credentials, Endpoints};
use crate::error::{Error, Result};
use crate::geometry::AreaOfInterest;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Search window; products whose sensing starts on `start` up to, but excluding, `end`.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(Error::Config(format!(
                "Period start {start} must lie before its end {end}"
            )));
        }
        Ok(Self { start, end })
    }
}

/// Everything a run needs, as read from the operator's configuration file.
#[derive(Deserialize, Clone, Debug)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    pub data_collection: String,
    pub area: AreaOfInterest,
    pub period: Period,
    pub attributes: BTreeMap<String, String>,
    pub user: Credentials,
    pub save_dir: PathBuf,
    pub endpoints: Endpoints,
}

/// File layout. The period is given either as a `period` table or as `start_date`/`end_date`.
#[derive(Deserialize)]
struct RawConfig {
    data_collection: String,
    area: AreaOfInterest,
    period: Option<Period>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    user: Credentials,
    save_dir: PathBuf,
    #[serde(default)]
    endpoints: Endpoints,
}

impl TryFrom<RawConfig> for Config {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        if raw.data_collection.trim().is_empty() {
            return Err(Error::Config("data_collection must not be empty".to_string()));
        }
        if raw.save_dir.as_os_str().is_empty() {
            return Err(Error::Config("save_dir must not be empty".to_string()));
        }

        let period = match (raw.period, raw.start_date, raw.end_date) {
            (Some(period), None, None) => Period::new(period.start, period.end)?,
            (None, Some(start), Some(end)) => Period::new(start, end)?,
            (None, _, _) => {
                return Err(Error::Config(
                    "Either period or start_date and end_date is required".to_string(),
                ))
            }
            (Some(_), _, _) => {
                return Err(Error::Config(
                    "period conflicts with start_date/end_date".to_string(),
                ))
            }
        };

        Ok(Self {
            data_collection: raw.data_collection,
            area: raw.area,
            period,
            attributes: raw.attributes,
            user: raw.user,
            save_dir: raw.save_dir,
            endpoints: raw.endpoints,
        })
    }
}

impl Config {
    /// Read a JSON configuration, or TOML when the file ends in `.toml`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("unable to read {}: {e}", path.display())))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| Error::Config(e.to_string())),
            _ => serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string())),
        }
    }

    /// Create the destination directory if it does not exist yet.
    pub fn ensure_save_dir(self: &Self) -> Result<()> {
        if !self.save_dir.exists() {
            fs::create_dir_all(&self.save_dir)?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn from_template(table: &toml::Table) -> Self {
        toml::from_str(&table.to_string()).expect("Error deserializing template")
    }
}
