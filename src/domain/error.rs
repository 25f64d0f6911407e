use crate::domain::PropertyId;
use chrono::NaiveDate;
use thiserror::Error;

/// Raised when a stay is priced with a check-out that does not follow the check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("check-out {check_out} must be after check-in {check_in}")]
pub struct InvalidRangeError {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("malformed booking: check-in {check_in} is not before check-out {check_out}")]
    Malformed {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("property {property_id} is already booked on {first_conflict}")]
    Conflict {
        property_id: PropertyId,
        first_conflict: NaiveDate,
    },

    #[error("property {0} does not exist")]
    UnknownProperty(PropertyId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no property view is open")]
    NotOpen,

    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    /// An intermediate amount left the range `Decimal` can represent.
    #[error("{0} is too large to compute")]
    Overflow(&'static str),
}
