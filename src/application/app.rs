use crate::application::Config;
use crate::domain::{
    BlockedPeriod, BookingError, BookingId, BookingRequest, NewProperty, PriceBreakdown,
    PropertyId, PropertyListing, RangeSelection, SelectionSession, StoredBooking, Transition,
    compute_blocked_periods,
};
use crate::infrastructure::{BookingRepository, DuckDbStorage, HookRegistry, ReservationLogHook};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

/// A priced, validated selection ready to be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub listing: PropertyListing,
    pub request: BookingRequest,
    pub breakdown: PriceBreakdown,
}

pub struct BookingApp {
    repository: Box<dyn BookingRepository>,
    config: Config,
    session: SelectionSession,
}

impl BookingApp {
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("Failed to create data directory {}", config.data_dir.display())
        })?;

        let mut hook_registry = HookRegistry::new();
        hook_registry.register(ReservationLogHook::new(config.reservation_log.clone()));

        let storage = DuckDbStorage::with_hooks(&config.db_path, hook_registry)
            .context("Failed to initialize DuckDB storage")?;

        Ok(Self::with_repository(config, Box::new(storage)))
    }

    pub fn with_repository(config: Config, repository: Box<dyn BookingRepository>) -> Self {
        let session = SelectionSession::new(config.pricing);
        Self {
            repository,
            config,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SelectionSession {
        &mut self.session
    }

    pub fn add_property(&self, name: &str, nightly_price: Decimal) -> Result<PropertyListing> {
        if nightly_price.is_sign_negative() {
            bail!("Nightly price must not be negative, got {}", nightly_price);
        }
        self.repository
            .add_property(NewProperty::new(name, nightly_price))
    }

    pub fn properties(&self) -> Result<Vec<PropertyListing>> {
        self.repository.list_properties()
    }

    fn require_property(&self, id: PropertyId) -> Result<PropertyListing> {
        self.repository
            .load_property(id)?
            .ok_or_else(|| BookingError::UnknownProperty(id).into())
    }

    /// Start a fresh selection for a property, replacing any open one.
    pub fn open_property(&mut self, id: PropertyId) -> Result<Transition> {
        let listing = self.require_property(id)?;
        let bookings = self
            .repository
            .list_bookings(id)
            .with_context(|| format!("Failed to load bookings for property {}", id))?;

        let today = self.config.today();
        Ok(self.session.open(listing, bookings, today)?)
    }

    pub fn blocked_periods(&self, id: PropertyId) -> Result<Vec<BlockedPeriod>> {
        self.require_property(id)?;
        let bookings = self.repository.list_bookings(id)?;
        Ok(compute_blocked_periods(&bookings, self.config.today()))
    }

    /// Run a check-in/check-out pair through a fresh session and price it.
    pub fn quote(
        &mut self,
        id: PropertyId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Quote> {
        self.open_property(id)?;

        match self
            .session
            .set_range(RangeSelection::between(check_in, check_out))?
        {
            Transition::Completed { .. } => self.current_quote(),
            Transition::Rejected { conflicts, .. } => {
                let first_conflict = conflicts
                    .first()
                    .copied()
                    .ok_or_else(|| anyhow!("Range rejected without conflicting days"))?;
                Err(BookingError::Conflict {
                    property_id: id,
                    first_conflict,
                }
                .into())
            }
            Transition::Degenerate { day } => {
                bail!("Check-out must be after check-in, got {} for both", day)
            }
            other => bail!("Unexpected selection outcome: {:?}", other),
        }
    }

    /// The quote for the session's current selection, if it is complete.
    pub fn current_quote(&self) -> Result<Quote> {
        let request = self
            .session
            .confirmation()
            .ok_or_else(|| anyhow!("Select both a check-in and a check-out day first"))?;
        let breakdown = self
            .session
            .price_breakdown()?
            .ok_or_else(|| anyhow!("No price available for the current selection"))?;
        let listing = self
            .session
            .listing()
            .cloned()
            .ok_or_else(|| anyhow!("No property is open"))?;

        Ok(Quote {
            listing,
            request,
            breakdown,
        })
    }

    /// Book the session's current selection and refresh the open view.
    pub fn confirm_booking(&mut self) -> Result<StoredBooking> {
        let quote = self.current_quote()?;
        let stored = self
            .repository
            .create_booking(&quote.request, &quote.breakdown)?;

        info!(
            "Booked property {} from {} to {} for {}",
            stored.property_id, stored.check_in, stored.check_out, stored.order_total
        );

        self.open_property(quote.request.property_id)?;
        Ok(stored)
    }

    pub fn book(
        &mut self,
        id: PropertyId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<StoredBooking> {
        self.quote(id, check_in, check_out)?;
        self.confirm_booking()
    }

    pub fn reservations(&self, property_id: Option<PropertyId>) -> Result<Vec<StoredBooking>> {
        self.repository.list_reservations(property_id)
    }

    pub fn cancel(&self, id: BookingId) -> Result<()> {
        if !self.repository.delete_booking(id)? {
            bail!("Booking {} does not exist", id);
        }
        Ok(())
    }
}
