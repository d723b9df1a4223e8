use serde::{Deserialize, Serialize};

use crate::Error;

/// Rate configuration of a single garage. All rates are CHF per hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TariffSchedule {
    /// One rate around the clock
    Flat { rate_per_hour: f64 },
    /// `day_rate` inside `[day_start, day_end)`, `night_rate` outside.
    /// The window may wrap midnight.
    DayNight {
        day_start: f64,
        day_end: f64,
        day_rate: f64,
        night_rate: f64,
    },
    /// Consecutive duration brackets; the last one is open-ended.
    Tiered { tiers: Vec<Tier> },
}

/// Duration bracket of a tiered schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Hours billed in this bracket, `None` for the open-ended last one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_hours: Option<f64>,
    pub rate_per_hour: f64,
    /// Round time in this bracket up to whole intervals of this many minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_minutes: Option<u32>,
}

impl Tier {
    pub fn bounded(threshold_hours: f64, rate_per_hour: f64) -> Self {
        Self {
            threshold_hours: Some(threshold_hours),
            rate_per_hour,
            interval_minutes: None,
        }
    }

    pub fn open(rate_per_hour: f64) -> Self {
        Self {
            threshold_hours: None,
            rate_per_hour,
            interval_minutes: None,
        }
    }

    #[must_use]
    pub fn in_intervals(mut self, minutes: u32) -> Self {
        self.interval_minutes = Some(minutes);
        self
    }
}

impl TariffSchedule {
    pub fn flat(rate_per_hour: f64) -> Self {
        TariffSchedule::Flat { rate_per_hour }
    }

    pub fn day_night(day_start: f64, day_end: f64, day_rate: f64, night_rate: f64) -> Self {
        TariffSchedule::DayNight {
            day_start,
            day_end,
            day_rate,
            night_rate,
        }
    }

    pub fn tiered(tiers: Vec<Tier>) -> Self {
        TariffSchedule::Tiered { tiers }
    }

    /// Checks the invariants the evaluator relies on.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTariff`] describing the first violation found.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            TariffSchedule::Flat { rate_per_hour } => check_rate(*rate_per_hour),
            TariffSchedule::DayNight {
                day_start,
                day_end,
                day_rate,
                night_rate,
            } => {
                check_hour(*day_start)?;
                check_hour(*day_end)?;
                check_rate(*day_rate)?;
                check_rate(*night_rate)
            }
            TariffSchedule::Tiered { tiers } => {
                let Some((last, bounded)) = tiers.split_last() else {
                    return Err(Error::InvalidTariff("tiered schedule has no tiers".into()));
                };
                for tier in bounded {
                    match tier.threshold_hours {
                        None => {
                            return Err(Error::InvalidTariff(
                                "only the last tier may be open-ended".into(),
                            ));
                        }
                        Some(hours) if !hours.is_finite() || hours <= 0.0 => {
                            return Err(Error::InvalidTariff(format!(
                                "tier threshold must be positive, got {hours}"
                            )));
                        }
                        Some(_) => {}
                    }
                }
                if last.threshold_hours.is_some() {
                    return Err(Error::InvalidTariff(
                        "last tier must be open-ended".into(),
                    ));
                }
                for tier in tiers {
                    check_rate(tier.rate_per_hour)?;
                    if tier.interval_minutes == Some(0) {
                        return Err(Error::InvalidTariff(
                            "billing interval must be at least one minute".into(),
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

fn check_rate(rate: f64) -> Result<(), Error> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTariff(format!(
            "rate must be a non-negative number, got {rate}"
        )))
    }
}

fn check_hour(hour: f64) -> Result<(), Error> {
    if (0.0..=24.0).contains(&hour) {
        Ok(())
    } else {
        Err(Error::InvalidTariff(format!(
            "hour of day must be within 0..=24, got {hour}"
        )))
    }
}
