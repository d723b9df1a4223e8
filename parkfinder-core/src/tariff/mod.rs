//! Tariff computation
//!
//! Every garage has a declarative [`TariffSchedule`]; one evaluator
//! interprets all of them. Fees are accumulated unrounded and rounded to
//! the centime only when the [`FeeResult`] is produced.

mod engine;
mod schedule;
mod st_gallen;
mod stay;
mod table;

pub use schedule::{TariffSchedule, Tier};
pub use stay::{DurationRounding, StayBreakdown, parse_local_datetime, stay_hours};
pub use table::{Currency, FacilityTariff, FeeResult, TariffFile, TariffTable};
