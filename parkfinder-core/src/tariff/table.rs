use chrono::NaiveDateTime;
use hashbrown::HashMap;
use log::debug;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine::round_chf;
use super::schedule::TariffSchedule;
use crate::{Error, Hours};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Currency {
    #[serde(rename = "CHF")]
    Chf,
}

/// Priced stay at one garage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeResult {
    pub facility_id: String,
    pub total_fee: Decimal,
    pub currency: Currency,
}

/// Schedule of one garage, as written in a tariff file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityTariff {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub schedule: TariffSchedule,
}

impl FacilityTariff {
    pub fn new(name: impl Into<String>, schedule: TariffSchedule) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            schedule,
        }
    }

    #[must_use]
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| (*a).to_string()).collect();
        self
    }
}

/// On-disk layout of a tariff table: a list of `[[facility]]` entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TariffFile {
    #[serde(rename = "facility", default)]
    pub facilities: Vec<FacilityTariff>,
}

impl TariffFile {
    /// Validates the entries and indexes them by name.
    ///
    /// # Errors
    ///
    /// See [`TariffTable::from_entries`].
    pub fn into_table(self) -> Result<TariffTable, Error> {
        TariffTable::from_entries(self.facilities)
    }
}

/// Lookup from garage name to schedule. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct TariffTable {
    entries: Vec<FacilityTariff>,
    index: HashMap<String, usize>,
}

impl TariffTable {
    /// Builds a table after validating every schedule.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTariff`] for a broken schedule or a name that is
    /// registered twice.
    pub fn from_entries(entries: Vec<FacilityTariff>) -> Result<Self, Error> {
        for entry in &entries {
            entry
                .schedule
                .validate()
                .map_err(|e| Error::InvalidTariff(format!("{}: {e}", entry.name)))?;
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            for name in std::iter::once(&entry.name).chain(&entry.aliases) {
                if index.insert(lookup_key(name), idx).is_some() {
                    return Err(Error::InvalidTariff(format!(
                        "facility name '{name}' is registered twice"
                    )));
                }
            }
        }

        Ok(Self { entries, index })
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn get(&self, facility: &str) -> Option<&FacilityTariff> {
        self.index
            .get(&lookup_key(facility))
            .map(|&idx| &self.entries[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FacilityTariff> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total fee for a stay of `duration_hours` starting at `arrival`.
    ///
    /// Fractional hours are billed as given; zero or negative durations are
    /// free.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownFacility`] when no schedule is registered for the name,
    /// [`Error::InvalidStay`] for a non-finite duration or a fee too large
    /// to express in centimes.
    pub fn compute_fee(
        &self,
        facility: &str,
        arrival: NaiveDateTime,
        duration_hours: Hours,
    ) -> Result<FeeResult, Error> {
        let entry = self
            .get(facility)
            .ok_or_else(|| Error::UnknownFacility(facility.to_string()))?;

        if duration_hours.is_nan() || duration_hours.is_infinite() {
            return Err(Error::InvalidStay(format!(
                "duration must be finite, got {duration_hours}"
            )));
        }

        let total_fee =
            round_chf(entry.schedule.raw_fee(arrival, duration_hours)).ok_or_else(|| {
                Error::InvalidStay(format!(
                    "fee for {duration_hours}h at {} exceeds the representable amount",
                    entry.name
                ))
            })?;
        debug!(
            "Fee at {} from {arrival} for {duration_hours}h: {total_fee} CHF",
            entry.name
        );

        Ok(FeeResult {
            facility_id: entry.name.clone(),
            total_fee,
            currency: Currency::Chf,
        })
    }

    /// Prices the same stay at several garages in parallel. Results keep
    /// the order of `facilities`.
    pub fn quote_all<S>(
        &self,
        facilities: &[S],
        arrival: NaiveDateTime,
        duration_hours: Hours,
    ) -> Vec<(String, Result<FeeResult, Error>)>
    where
        S: AsRef<str> + Sync,
    {
        facilities
            .par_iter()
            .map(|name| {
                let name = name.as_ref();
                (
                    name.to_string(),
                    self.compute_fee(name, arrival, duration_hours),
                )
            })
            .collect()
    }
}

impl Default for TariffTable {
    fn default() -> Self {
        Self::st_gallen()
    }
}

/// Case- and whitespace-insensitive key for name lookup
fn lookup_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
