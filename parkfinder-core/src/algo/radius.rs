use log::trace;

use crate::{Coordinate, Facility, Meters, Zone};

/// Anything that can be placed on the map and radius-filtered.
pub trait Locatable {
    fn location(&self) -> Coordinate;

    /// Reported free spaces, `None` when the record carries no count.
    fn free_spaces(&self) -> Option<u32> {
        None
    }
}

impl Locatable for Facility {
    fn location(&self) -> Coordinate {
        self.location
    }

    fn free_spaces(&self) -> Option<u32> {
        self.free_spaces
    }
}

impl Locatable for Zone {
    fn location(&self) -> Coordinate {
        self.location
    }
}

impl<T: Locatable + ?Sized> Locatable for &T {
    fn location(&self) -> Coordinate {
        (**self).location()
    }

    fn free_spaces(&self) -> Option<u32> {
        (**self).free_spaces()
    }
}

/// Records within `radius` meters of `destination`, in input order.
///
/// Without a destination nothing is filtered. Records that cannot be
/// located are dropped. With `free_only` a record also needs at least one
/// reported free space, so records without a count never pass.
pub fn filter_by_radius<'a, T: Locatable>(
    records: &'a [T],
    destination: Option<Coordinate>,
    radius: Meters,
    free_only: bool,
) -> Vec<&'a T> {
    let Some(destination) = destination else {
        return records.iter().collect();
    };

    records
        .iter()
        .filter(|record| {
            let location = record.location();
            if !location.is_locatable() {
                trace!("Skipping record at {location} - not locatable");
                return false;
            }
            // written so that a NaN radius keeps nothing
            let within = location.distance_to(&destination) <= radius;
            if !within {
                return false;
            }
            !free_only || record.free_spaces().is_some_and(|free| free > 0)
        })
        .collect()
}
