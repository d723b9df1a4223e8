use std::io::Read;

use log::warn;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Error;

/// The portal wraps records in `{"total_count": n, "results": [...]}`;
/// exports and hand-made files are plain arrays.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Envelope { results: Vec<Value> },
    Records(Vec<Value>),
}

pub(super) fn decode_json_records<T>(text: &str) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
{
    records_from_payload(serde_json::from_str(text).ok())
}

/// Same as [`decode_json_records`] for a body that is already parsed.
pub(super) fn decode_json_value<T>(value: Value) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
{
    records_from_payload(serde_json::from_value(value).ok())
}

fn records_from_payload<T>(payload: Option<Payload>) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
{
    let values = match payload {
        Some(Payload::Envelope { results }) => results,
        Some(Payload::Records(records)) => records,
        None => {
            return Err(Error::InvalidData(
                "expected a record array or an object with a 'results' array".to_string(),
            ));
        }
    };

    let total = values.len();
    let records: Vec<T> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if records.len() < total {
        warn!(
            "Skipped {} of {total} JSON records that could not be decoded",
            total - records.len()
        );
    }
    Ok(records)
}

pub(super) fn decode_csv_records<T, R>(reader: R) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    // fail early on an unreadable header instead of yielding nothing
    reader.headers()?;

    let mut skipped = 0usize;
    let records: Vec<T> = reader
        .deserialize()
        .filter_map(|row| {
            row.map_err(|e| {
                skipped += 1;
                log::trace!("Skipping CSV row: {e}");
            })
            .ok()
        })
        .collect();
    if skipped > 0 {
        warn!("Skipped {skipped} CSV rows that could not be decoded");
    }
    Ok(records)
}
