use crate::domain::{
    Booking, BookingId, BookingRequest, NewProperty, PriceBreakdown, PropertyId, PropertyListing,
    StoredBooking,
};
use anyhow::Result;

/// Persistence seen from the booking engine.
pub trait BookingRepository {
    fn add_property(&self, property: NewProperty) -> Result<PropertyListing>;

    fn load_property(&self, id: PropertyId) -> Result<Option<PropertyListing>>;

    fn list_properties(&self) -> Result<Vec<PropertyListing>>;

    /// Existing bookings of a property, ordered by check-in.
    fn list_bookings(&self, property_id: PropertyId) -> Result<Vec<Booking>>;

    /// Persist a confirmed selection.
    ///
    /// Availability is checked again at write time; a range that was taken in the
    /// meantime fails with [`crate::domain::BookingError::Conflict`].
    fn create_booking(
        &self,
        request: &BookingRequest,
        breakdown: &PriceBreakdown,
    ) -> Result<StoredBooking>;

    /// Stored bookings, newest first, optionally for one property only.
    fn list_reservations(&self, property_id: Option<PropertyId>) -> Result<Vec<StoredBooking>>;

    /// Returns whether a booking was removed.
    fn delete_booking(&self, id: BookingId) -> Result<bool>;
}
