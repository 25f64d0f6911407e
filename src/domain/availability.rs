use crate::domain::{Booking, DateRange, day_key};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Days a property cannot be newly booked, derived from one existing booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl BlockedPeriod {
    pub fn as_range(&self) -> DateRange {
        DateRange {
            start: self.from,
            end: self.to,
        }
    }
}

/// One blocked period per well-formed booking, in input order.
///
/// `today` does not block anything by itself; past days stay selectable unless a
/// booking covers them. Malformed bookings are skipped with a warning.
pub fn compute_blocked_periods(bookings: &[Booking], today: NaiveDate) -> Vec<BlockedPeriod> {
    debug!(
        "Computing blocked periods for {} bookings as of {}",
        bookings.len(),
        day_key(today)
    );

    bookings
        .iter()
        .filter(|booking| {
            let ok = booking.is_well_formed();
            if !ok {
                warn!(
                    "Skipping malformed booking {} -> {}",
                    booking.check_in, booking.check_out
                );
            }
            ok
        })
        .map(|booking| BlockedPeriod {
            from: booking.check_in,
            to: booking.check_out,
        })
        .collect()
}

/// Set of disabled calendar days, both ends of every blocked period included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledDateIndex {
    days: HashSet<NaiveDate>,
}

impl DisabledDateIndex {
    pub fn from_periods(periods: &[BlockedPeriod]) -> Self {
        periods.iter().copied().collect()
    }

    pub fn from_bookings(bookings: &[Booking], today: NaiveDate) -> Self {
        Self::from_periods(&compute_blocked_periods(bookings, today))
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Sorted day keys, for display and debugging.
    pub fn keys(&self) -> Vec<String> {
        let mut days: Vec<NaiveDate> = self.days.iter().copied().collect();
        days.sort_unstable();
        days.into_iter().map(day_key).collect()
    }

    /// The disabled days among `days`, in the order given.
    pub fn conflicts(&self, days: &[NaiveDate]) -> Vec<NaiveDate> {
        days.iter().copied().filter(|day| self.contains(*day)).collect()
    }
}

impl FromIterator<BlockedPeriod> for DisabledDateIndex {
    fn from_iter<I: IntoIterator<Item = BlockedPeriod>>(iter: I) -> Self {
        let days = iter
            .into_iter()
            .flat_map(|period| period.as_range().days())
            .collect();
        Self { days }
    }
}
