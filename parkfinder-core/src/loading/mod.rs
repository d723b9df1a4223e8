//! Decoding of open-data snapshots into the data model.
//!
//! Fetching is the caller's job; this module only turns an already
//! downloaded JSON response or CSV export into [`Facility`] and [`Zone`]
//! records, degrading malformed fields to safe defaults.

mod de;
mod parser;
mod processor;
pub mod raw_types;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::info;
use serde_json::Value;

use crate::{Error, Facility, Zone};
use parser::{decode_csv_records, decode_json_records, decode_json_value};
use processor::{facility_from_raw, zone_from_raw};
use raw_types::{RawFacility, RawZone};

/// Encoding of a snapshot file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Csv,
}

impl SnapshotFormat {
    /// Guesses the format from the file extension.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidData`] for anything but `.json` or `.csv`.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(SnapshotFormat::Json),
            Some("csv") => Ok(SnapshotFormat::Csv),
            _ => Err(Error::InvalidData(format!(
                "cannot tell snapshot format of {}",
                path.display()
            ))),
        }
    }
}

/// Garages from an occupancy feed response.
///
/// # Errors
///
/// Returns an error when the text is not JSON or holds no record list.
pub fn facilities_from_json(text: &str) -> Result<Vec<Facility>, Error> {
    let raw: Vec<RawFacility> = decode_json_records(text)?;
    Ok(raw.into_iter().map(facility_from_raw).collect())
}

/// Garages from an already parsed feed response, as received in a request
/// body.
///
/// # Errors
///
/// Returns an error when the value holds no record list.
pub fn facilities_from_value(value: Value) -> Result<Vec<Facility>, Error> {
    let raw: Vec<RawFacility> = decode_json_value(value)?;
    Ok(raw.into_iter().map(facility_from_raw).collect())
}

/// Garages from a semicolon-separated export.
///
/// # Errors
///
/// Returns an error when the header row cannot be read.
pub fn facilities_from_csv<R: Read>(reader: R) -> Result<Vec<Facility>, Error> {
    let raw: Vec<RawFacility> = decode_csv_records(reader)?;
    Ok(raw.into_iter().map(facility_from_raw).collect())
}

/// Zones from a points-of-interest response.
///
/// # Errors
///
/// Returns an error when the text is not JSON or holds no record list.
pub fn zones_from_json(text: &str) -> Result<Vec<Zone>, Error> {
    let raw: Vec<RawZone> = decode_json_records(text)?;
    Ok(raw.into_iter().map(zone_from_raw).collect())
}

pub fn zones_from_value(value: Value) -> Result<Vec<Zone>, Error> {
    let raw: Vec<RawZone> = decode_json_value(value)?;
    Ok(raw.into_iter().map(zone_from_raw).collect())
}

/// Zones from a semicolon-separated export.
///
/// # Errors
///
/// Returns an error when the header row cannot be read.
pub fn zones_from_csv<R: Read>(reader: R) -> Result<Vec<Zone>, Error> {
    let raw: Vec<RawZone> = decode_csv_records(reader)?;
    Ok(raw.into_iter().map(zone_from_raw).collect())
}

/// Reads a garage snapshot file, JSON or CSV by extension.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_facilities(path: &Path) -> Result<Vec<Facility>, Error> {
    let facilities = match SnapshotFormat::from_path(path)? {
        SnapshotFormat::Json => facilities_from_json(&read_to_string(path)?)?,
        SnapshotFormat::Csv => facilities_from_csv(open(path)?)?,
    };
    info!(
        "Loaded {} facilities ({} open) from {}",
        facilities.len(),
        facilities.iter().filter(|f| f.is_open()).count(),
        path.display()
    );
    Ok(facilities)
}

/// Reads a zone snapshot file, JSON or CSV by extension.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_zones(path: &Path) -> Result<Vec<Zone>, Error> {
    let zones = match SnapshotFormat::from_path(path)? {
        SnapshotFormat::Json => zones_from_json(&read_to_string(path)?)?,
        SnapshotFormat::Csv => zones_from_csv(open(path)?)?,
    };
    info!("Loaded {} zones from {}", zones.len(), path.display());
    Ok(zones)
}

fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        ))
    })
}

fn read_to_string(path: &Path) -> Result<String, Error> {
    let mut text = String::new();
    open(path)?.read_to_string(&mut text)?;
    Ok(text)
}
