use crate::domain::StoredBooking;
use crate::infrastructure::{BookingContext, BookingHook};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Appends one line per stored booking to a plain-text log
pub struct ReservationLogHook {
    log_path: PathBuf,
}

impl ReservationLogHook {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }
}

impl BookingHook for ReservationLogHook {
    fn on_booking_created(&self, context: &BookingContext, booking: &StoredBooking) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open {}", self.log_path.display()))?;

        writeln!(
            file,
            "[{}] Booking {} for '{}' (property {}) - {} to {} - {} nights - total {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            booking.id,
            context.property_name,
            booking.property_id,
            booking.check_in,
            booking.check_out,
            booking.total_nights,
            context.breakdown.order_total,
        )?;

        Ok(())
    }

    fn name(&self) -> &str {
        "Reservation Log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingId, PriceBreakdown, PropertyId};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_appends_one_line_per_booking() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs").join("reservations.log");
        let hook = ReservationLogHook::new(&log_path);

        let context = BookingContext {
            property_name: "Cabin".to_string(),
            breakdown: PriceBreakdown {
                total_nights: 3,
                sub_total: dec!(300),
                cleaning_fee: dec!(50),
                service_fee: dec!(30),
                tax: dec!(19),
                order_total: dec!(399),
            },
        };
        let booking = StoredBooking {
            id: BookingId(9),
            property_id: PropertyId(2),
            check_in: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 6, 23).unwrap(),
            total_nights: 3,
            order_total: dec!(399),
            created_at: "2024-06-01 10:00:00".to_string(),
        };

        hook.on_booking_created(&context, &booking).unwrap();
        hook.on_booking_created(&context, &booking).unwrap();

        let log = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Booking 9 for 'Cabin'"));
        assert!(lines[0].contains("2024-06-20 to 2024-06-23"));
        assert!(lines[0].contains("total 399"));
    }
}
