use crate::domain::{PriceBreakdown, StoredBooking};
use anyhow::Result;
use log::warn;

/// Context provided to booking hooks
#[derive(Debug, Clone)]
pub struct BookingContext {
    pub property_name: String,
    pub breakdown: PriceBreakdown,
}

/// Trait for plugins that respond to newly stored bookings
pub trait BookingHook: Send + Sync {
    /// Called after a booking has been committed to storage
    fn on_booking_created(&self, context: &BookingContext, booking: &StoredBooking) -> Result<()>;

    /// Human-readable name for this hook
    fn name(&self) -> &str;
}

/// Registry for managing booking hooks
pub struct HookRegistry {
    hooks: Vec<Box<dyn BookingHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn register<H>(&mut self, hook: H)
    where
        H: BookingHook + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Run every hook; a failing hook is logged and the rest still run.
    pub fn execute_booking_hooks(&self, context: &BookingContext, booking: &StoredBooking) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_booking_created(context, booking) {
                warn!("Hook '{}' failed for booking {}: {:#}", hook.name(), booking.id, e);
            }
        }
    }

    pub fn list_hooks(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
