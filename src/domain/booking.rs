use crate::domain::BookingError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub i64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PropertyId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub i64);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for BookingId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// An existing reservation as read from storage.
///
/// Fields are public so that data-access code can hand over whatever it read;
/// use [`Booking::new`] to build one with the `check_in < check_out` check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl Booking {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        let booking = Self {
            check_in,
            check_out,
        };
        if booking.is_well_formed() {
            Ok(booking)
        } else {
            Err(BookingError::Malformed {
                check_in,
                check_out,
            })
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.check_in < self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

/// The bookable side of a property: what a property view needs to price a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    pub id: PropertyId,
    pub name: String,
    pub nightly_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProperty {
    pub name: String,
    pub nightly_price: Decimal,
}

impl NewProperty {
    pub fn new(name: impl Into<String>, nightly_price: Decimal) -> Self {
        Self {
            name: name.into(),
            nightly_price,
        }
    }
}

/// Payload handed to the booking-creation side once a selection is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub property_id: PropertyId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// A persisted reservation together with the totals charged for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBooking {
    pub id: BookingId,
    pub property_id: PropertyId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_nights: i64,
    pub order_total: Decimal,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_booking_rejects_malformed_range() {
        assert!(Booking::new(date(2024, 6, 10), date(2024, 6, 15)).is_ok());

        let same_day = Booking::new(date(2024, 6, 10), date(2024, 6, 10));
        assert_eq!(
            same_day,
            Err(BookingError::Malformed {
                check_in: date(2024, 6, 10),
                check_out: date(2024, 6, 10),
            })
        );
        assert!(Booking::new(date(2024, 6, 15), date(2024, 6, 10)).is_err());
    }

    #[test]
    fn test_booking_nights() {
        let booking = Booking::new(date(2024, 6, 10), date(2024, 6, 15)).unwrap();
        assert_eq!(booking.nights(), 5);
    }

    #[test]
    fn test_property_id_parsing() {
        assert_eq!(" 42 ".parse::<PropertyId>(), Ok(PropertyId(42)));
        assert!("abc".parse::<PropertyId>().is_err());
    }

    #[test]
    fn test_booking_request_serializes_camel_case() {
        let request = BookingRequest {
            property_id: PropertyId(7),
            check_in: date(2024, 6, 20),
            check_out: date(2024, 6, 25),
        };
        let json = serde_json::to_value(request).unwrap();

        assert_eq!(json["propertyId"], 7);
        assert_eq!(json["checkIn"], "2024-06-20");
        assert_eq!(json["checkOut"], "2024-06-25");
    }
}
