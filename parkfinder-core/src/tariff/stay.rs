//! Derivation of the billed stay length from arrival and departure.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Hours};

/// How a stay is turned into billable hours before it reaches the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationRounding {
    /// Every started hour counts
    #[default]
    Ceil,
    /// Only completed hours count
    Floor,
    /// Fractional hours as measured
    Exact,
}

impl DurationRounding {
    pub fn apply(self, hours: Hours) -> Hours {
        match self {
            DurationRounding::Ceil => hours.ceil(),
            DurationRounding::Floor => hours.floor(),
            DurationRounding::Exact => hours,
        }
    }
}

impl std::str::FromStr for DurationRounding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ceil" => Ok(DurationRounding::Ceil),
            "floor" => Ok(DurationRounding::Floor),
            "exact" => Ok(DurationRounding::Exact),
            other => Err(Error::InvalidData(format!(
                "unknown duration rounding '{other}'"
            ))),
        }
    }
}

/// Stay length split for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StayBreakdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl StayBreakdown {
    /// # Errors
    ///
    /// [`Error::InvalidStay`] when departure is not after arrival.
    pub fn between(arrival: NaiveDateTime, departure: NaiveDateTime) -> Result<Self, Error> {
        let minutes = checked_stay(arrival, departure)?.num_minutes();
        Ok(Self {
            days: minutes / (24 * 60),
            hours: minutes / 60 % 24,
            minutes: minutes % 60,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn total_hours(&self) -> Hours {
        (self.days * 24 + self.hours) as f64 + self.minutes as f64 / 60.0
    }
}

/// Billable hours between arrival and departure.
///
/// # Errors
///
/// [`Error::InvalidStay`] when departure is not after arrival.
#[allow(clippy::cast_precision_loss)]
pub fn stay_hours(
    arrival: NaiveDateTime,
    departure: NaiveDateTime,
    rounding: DurationRounding,
) -> Result<Hours, Error> {
    let seconds = checked_stay(arrival, departure)?.num_seconds();
    Ok(rounding.apply(seconds as f64 / 3600.0))
}

fn checked_stay(
    arrival: NaiveDateTime,
    departure: NaiveDateTime,
) -> Result<chrono::TimeDelta, Error> {
    if departure <= arrival {
        return Err(Error::InvalidStay(format!(
            "departure {departure} must be later than arrival {arrival}"
        )));
    }
    Ok(departure - arrival)
}

/// Parses a `YYYY-MM-DD` date and a wall-clock time given as `HH:MM`,
/// `HHMM` or `HH.MM`.
///
/// # Errors
///
/// [`Error::InvalidStay`] when either part cannot be read.
pub fn parse_local_datetime(date: &str, time: &str) -> Result<NaiveDateTime, Error> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidStay(format!("invalid date '{date}': {e}")))?;

    let time = time.trim();
    let normalized = if time.len() == 4 && time.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}:{}", &time[..2], &time[2..])
    } else {
        time.replace('.', ":")
    };
    let time = NaiveTime::parse_from_str(&normalized, "%H:%M")
        .map_err(|e| Error::InvalidStay(format!("invalid time '{time}': {e}")))?;

    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(date: &str, time: &str) -> NaiveDateTime {
        parse_local_datetime(date, time).unwrap()
    }

    #[test]
    fn accepts_all_time_spellings() {
        let expected = dt("2024-05-10", "08:30");
        assert_eq!(dt("2024-05-10", "0830"), expected);
        assert_eq!(dt("2024-05-10", "08.30"), expected);
        assert_eq!(dt(" 2024-05-10 ", " 08:30 "), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_local_datetime("10.05.2024", "08:30"),
            Err(Error::InvalidStay(_))
        ));
        assert!(matches!(
            parse_local_datetime("2024-05-10", "25:00"),
            Err(Error::InvalidStay(_))
        ));
        assert!(parse_local_datetime("2024-05-10", "8h").is_err());
    }

    #[test]
    fn rounding_policies() {
        let arrival = dt("2024-05-10", "08:00");
        let departure = dt("2024-05-10", "10:20");
        let ceil = stay_hours(arrival, departure, DurationRounding::Ceil).unwrap();
        let floor = stay_hours(arrival, departure, DurationRounding::Floor).unwrap();
        let exact = stay_hours(arrival, departure, DurationRounding::Exact).unwrap();
        assert!((ceil - 3.0).abs() < 1e-9);
        assert!((floor - 2.0).abs() < 1e-9);
        assert!((exact - 7.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn departure_must_follow_arrival() {
        let arrival = dt("2024-05-10", "18:00");
        assert!(matches!(
            stay_hours(arrival, arrival, DurationRounding::Ceil),
            Err(Error::InvalidStay(_))
        ));
        assert!(StayBreakdown::between(arrival, dt("2024-05-10", "08:00")).is_err());
    }

    #[test]
    fn breakdown_spans_days() {
        let stay =
            StayBreakdown::between(dt("2024-05-10", "08:00"), dt("2024-05-12", "10:45")).unwrap();
        assert_eq!(
            stay,
            StayBreakdown {
                days: 2,
                hours: 2,
                minutes: 45
            }
        );
        assert!((stay.total_hours() - 50.75).abs() < 1e-9);
    }

    #[test]
    fn rounding_parses_from_text() {
        assert_eq!("Floor".parse::<DurationRounding>().unwrap(), DurationRounding::Floor);
        assert!("nearest".parse::<DurationRounding>().is_err());
    }
}
