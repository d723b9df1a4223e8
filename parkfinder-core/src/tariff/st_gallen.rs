//! Built-in rates for the garages of the St. Gallen parking guidance system.

use super::schedule::{TariffSchedule, Tier};
use super::table::{FacilityTariff, TariffTable};

impl TariffTable {
    /// Table for the garages reported by the St. Gallen occupancy feed.
    pub fn st_gallen() -> Self {
        Self::from_entries(st_gallen_entries()).unwrap_or_else(|e| {
            log::error!("Built-in tariff table rejected: {e}");
            Self::empty()
        })
    }
}

/// Thirty-minute steps after the first hour
fn hourly_then_half_hours(rate_per_hour: f64) -> TariffSchedule {
    TariffSchedule::tiered(vec![
        Tier::bounded(1.0, rate_per_hour),
        Tier::open(rate_per_hour).in_intervals(30),
    ])
}

fn three_hours_then(rate_per_hour: f64) -> Vec<Tier> {
    vec![Tier::bounded(3.0, 2.0), Tier::open(rate_per_hour)]
}

pub(crate) fn st_gallen_entries() -> Vec<FacilityTariff> {
    vec![
        FacilityTariff::new(
            "Manor",
            TariffSchedule::tiered(vec![
                Tier::bounded(1.0, 2.0),
                Tier::bounded(2.0, 3.0).in_intervals(20),
                Tier::open(4.5).in_intervals(20),
            ]),
        ),
        FacilityTariff::new("Bahnhof", hourly_then_half_hours(2.4)),
        FacilityTariff::new("Brühltor", hourly_then_half_hours(2.0)).with_aliases(&["Bruehltor"]),
        FacilityTariff::new("Burggraben", hourly_then_half_hours(2.0)),
        FacilityTariff::new("Stadtpark AZSG", hourly_then_half_hours(1.6))
            .with_aliases(&["Stadtpark/AZSG"]),
        FacilityTariff::new("Neumarkt", TariffSchedule::flat(1.0)),
        FacilityTariff::new("Rathaus", TariffSchedule::day_night(7.0, 22.0, 2.4, 1.2)),
        FacilityTariff::new(
            "Kreuzbleiche",
            TariffSchedule::day_night(7.0, 22.0, 1.5, 1.0),
        ),
        FacilityTariff::new(
            "Oberer Graben",
            TariffSchedule::day_night(6.0, 23.0, 2.0, 1.5),
        ),
        FacilityTariff::new("Raiffeisen", TariffSchedule::tiered(three_hours_then(1.5))),
        FacilityTariff::new("Einstein", TariffSchedule::flat(2.5)),
        FacilityTariff::new("Spisertor", TariffSchedule::flat(2.5)),
        FacilityTariff::new("Spelterini", TariffSchedule::tiered(three_hours_then(1.5))),
        FacilityTariff::new(
            "OLMA Messe",
            TariffSchedule::tiered(vec![
                Tier::bounded(3.0, 2.0),
                Tier::open(1.5).in_intervals(60),
            ]),
        )
        .with_aliases(&["Olma fairs"]),
        FacilityTariff::new("Unterer Graben", TariffSchedule::flat(2.0)),
        FacilityTariff::new(
            "OLMA Parkplatz",
            TariffSchedule::day_night(6.0, 23.0, 2.0, 1.5),
        )
        .with_aliases(&["Olma parking lot"]),
    ]
}
