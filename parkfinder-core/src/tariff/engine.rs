//! Evaluation of [`TariffSchedule`] values.

use chrono::{NaiveDateTime, Timelike};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::schedule::{TariffSchedule, Tier};
use crate::Hours;

/// Durations below this are treated as fully consumed.
const EPSILON: f64 = 1e-9;
const HOURS_PER_DAY: f64 = 24.0;

impl TariffSchedule {
    /// Unrounded fee in CHF for a stay of `hours` starting at `arrival`.
    /// Zero or negative durations cost nothing.
    pub(crate) fn raw_fee(&self, arrival: NaiveDateTime, hours: Hours) -> f64 {
        if hours <= 0.0 {
            return 0.0;
        }
        match self {
            TariffSchedule::Flat { rate_per_hour } => rate_per_hour * hours,
            TariffSchedule::DayNight {
                day_start,
                day_end,
                day_rate,
                night_rate,
            } => {
                let window = DayWindow {
                    start: *day_start,
                    end: *day_end,
                };
                day_night_fee(window, *day_rate, *night_rate, hour_of_day(arrival), hours)
            }
            TariffSchedule::Tiered { tiers } => tiered_fee(tiers, hours),
        }
    }
}

/// Wall-clock time as fractional hours since midnight
pub(crate) fn hour_of_day(time: NaiveDateTime) -> f64 {
    f64::from(time.hour())
        + f64::from(time.minute()) / 60.0
        + f64::from(time.second()) / 3600.0
}

/// Final CHF amount with two decimal places, or `None` when the fee is
/// not finite or too large to hold at centime precision.
pub(crate) fn round_chf(fee: f64) -> Option<Decimal> {
    if !fee.is_finite() {
        return None;
    }
    let mut amount = Decimal::from_f64(fee.max(0.0))?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);
    // rescale silently drops precision when the mantissa would overflow
    (amount.scale() == 2).then_some(amount)
}

#[derive(Debug, Clone, Copy)]
struct DayWindow {
    start: f64,
    end: f64,
}

impl DayWindow {
    fn is_empty(self) -> bool {
        (self.start - self.end).abs() < EPSILON
    }

    fn contains(self, clock: f64) -> bool {
        if self.is_empty() {
            false
        } else if self.start < self.end {
            self.start <= clock && clock < self.end
        } else {
            clock >= self.start || clock < self.end
        }
    }

    /// Hours per day billed at the day rate.
    fn day_hours(self) -> f64 {
        if self.is_empty() {
            0.0
        } else if self.start < self.end {
            self.end - self.start
        } else {
            HOURS_PER_DAY - self.start + self.end
        }
    }

    /// Hours from `clock` until the regime flips.
    fn hours_until_switch(self, clock: f64) -> f64 {
        if self.is_empty() {
            return f64::INFINITY;
        }
        let boundary = if self.contains(clock) {
            self.end
        } else {
            self.start
        };
        let ahead = (boundary - clock).rem_euclid(HOURS_PER_DAY);
        // a boundary sitting exactly on the clock means a full day ahead
        if ahead < EPSILON { HOURS_PER_DAY } else { ahead }
    }
}

/// Bills whole days in one step, then walks the remainder regime by
/// regime, wrapping the clock at midnight.
fn day_night_fee(
    window: DayWindow,
    day_rate: f64,
    night_rate: f64,
    start_clock: f64,
    hours: Hours,
) -> f64 {
    let day_hours = window.day_hours();
    let full_day = day_hours * day_rate + (HOURS_PER_DAY - day_hours) * night_rate;
    let days = (hours / HOURS_PER_DAY).floor();

    let mut clock = start_clock;
    // clamped because `days * 24` is inexact for very long stays
    let mut remaining = (hours - days * HOURS_PER_DAY).clamp(0.0, HOURS_PER_DAY);
    let mut fee = days * full_day;

    while remaining > EPSILON {
        let rate = if window.contains(clock) {
            day_rate
        } else {
            night_rate
        };
        let span = remaining.min(window.hours_until_switch(clock));
        fee += span * rate;
        remaining -= span;
        clock = (clock + span).rem_euclid(HOURS_PER_DAY);
    }

    fee
}

fn tiered_fee(tiers: &[Tier], hours: Hours) -> f64 {
    let mut remaining = hours;
    let mut fee = 0.0;

    for tier in tiers {
        if remaining <= EPSILON {
            break;
        }
        let span = tier
            .threshold_hours
            .map_or(remaining, |threshold| remaining.min(threshold));
        fee += tier.charge(span);
        remaining -= span;
    }

    // only reachable for unvalidated schedules without an open-ended tier
    if remaining > EPSILON
        && let Some(last) = tiers.last()
    {
        fee += last.charge(remaining);
    }

    fee
}

impl Tier {
    fn charge(&self, hours: Hours) -> f64 {
        match self.interval_minutes {
            Some(minutes) if minutes > 0 => {
                let interval = f64::from(minutes);
                let units = (hours * 60.0 / interval - EPSILON).ceil().max(0.0);
                units * interval / 60.0 * self.rate_per_hour
            }
            _ => hours * self.rate_per_hour,
        }
    }
}
