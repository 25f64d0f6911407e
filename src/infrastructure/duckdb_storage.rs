use crate::domain::{
    Booking, BookingError, BookingId, BookingRequest, NewProperty, PriceBreakdown, PropertyId,
    PropertyListing, StoredBooking, day_key, parse_day_key, round_currency,
};
use crate::infrastructure::{BookingContext, BookingRepository, HookRegistry};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use duckdb::{Connection, OptionalExt, params};
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Schema migrations, applied in order and recorded in the `migrations` table.
const MIGRATIONS: &[(i32, &str, &str)] = &[
    (
        1,
        "001_create_properties",
        include_str!("../../migrations/001_create_properties.sql"),
    ),
    (
        2,
        "002_create_bookings",
        include_str!("../../migrations/002_create_bookings.sql"),
    ),
];

pub struct DuckDbStorage {
    conn: Mutex<Connection>,
    hooks: HookRegistry,
}

impl DuckDbStorage {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open DuckDB connection")?;
        Self::with_connection(conn, HookRegistry::new())
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory DuckDB connection")?;
        Self::with_connection(conn, HookRegistry::new())
    }

    pub fn with_hooks<P: AsRef<Path>>(db_path: P, hooks: HookRegistry) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open DuckDB connection")?;
        Self::with_connection(conn, hooks)
    }

    fn with_connection(conn: Connection, hooks: HookRegistry) -> Result<Self> {
        let storage = Self {
            conn: Mutex::new(conn),
            hooks,
        };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn initialize(&self) -> Result<()> {
        self.setup_migration_system()?;
        self.run_migrations()?;
        Ok(())
    }

    pub fn backend_info(&self) -> &str {
        "DuckDB Storage Backend v1.0"
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("DuckDB connection lock poisoned"))
    }

    fn setup_migration_system(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        )
        .context("Failed to create migrations table")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        let applied = self.get_applied_migrations()?;

        for (version, name, sql_content) in MIGRATIONS {
            if !applied.contains(version) {
                self.apply_migration(*version, name, sql_content)
                    .with_context(|| format!("Failed to apply migration {}: {}", version, name))?;
            }
        }

        Ok(())
    }

    fn get_applied_migrations(&self) -> Result<HashSet<i32>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT version FROM migrations ORDER BY version")
            .context("Failed to prepare migration query")?;

        let rows = stmt.query_map([], |row| row.get::<_, i32>(0))?;

        let mut applied = HashSet::new();
        for version in rows {
            applied.insert(version?);
        }

        Ok(applied)
    }

    fn apply_migration(&self, version: i32, name: &str, sql_content: &str) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(sql_content)
            .with_context(|| format!("Failed to execute migration SQL for {}", name))?;

        conn.execute(
            "INSERT INTO migrations (version, name) VALUES (?, ?)",
            params![version, name],
        )
        .with_context(|| format!("Failed to record migration {} as applied", name))?;

        debug!("Applied migration {}", name);
        Ok(())
    }
}

fn to_cents(amount: Decimal) -> Result<i64> {
    round_currency(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| anyhow!("Amount {} does not fit in minor units", amount))
}

fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn parse_stored_day(value: &str) -> Result<NaiveDate> {
    parse_day_key(value).with_context(|| format!("Failed to parse date '{}' from database", value))
}

type ReservationRow = (i64, i64, String, String, i64, i64, String);

fn reservation_from_row(row: ReservationRow) -> Result<StoredBooking> {
    let (id, property_id, check_in, check_out, total_nights, order_total_cents, created_at) = row;
    Ok(StoredBooking {
        id: BookingId(id),
        property_id: PropertyId(property_id),
        check_in: parse_stored_day(&check_in)?,
        check_out: parse_stored_day(&check_out)?,
        total_nights,
        order_total: from_cents(order_total_cents),
        created_at,
    })
}

impl BookingRepository for DuckDbStorage {
    fn add_property(&self, property: NewProperty) -> Result<PropertyListing> {
        let cents = to_cents(property.nightly_price)?;
        let conn = self.conn()?;

        let id: i64 = conn
            .query_row(
                "INSERT INTO properties (name, nightly_price_cents) VALUES (?, ?) RETURNING id",
                params![property.name, cents],
                |row| row.get(0),
            )
            .context("Failed to insert property")?;

        info!("Added property {} '{}'", id, property.name);
        Ok(PropertyListing {
            id: PropertyId(id),
            name: property.name,
            nightly_price: from_cents(cents),
        })
    }

    fn load_property(&self, id: PropertyId) -> Result<Option<PropertyListing>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT name, nightly_price_cents FROM properties WHERE id = ?",
                params![id.0],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()
            .context("Failed to load property")?;

        Ok(row.map(|(name, cents)| PropertyListing {
            id,
            name,
            nightly_price: from_cents(cents),
        }))
    }

    fn list_properties(&self) -> Result<Vec<PropertyListing>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, name, nightly_price_cents FROM properties ORDER BY id")
            .context("Failed to prepare property query")?;

        let rows = stmt.query_map([], |row| {
            Ok(PropertyListing {
                id: PropertyId(row.get(0)?),
                name: row.get(1)?,
                nightly_price: from_cents(row.get(2)?),
            })
        })?;

        let mut properties = Vec::new();
        for property in rows {
            properties.push(property?);
        }

        Ok(properties)
    }

    fn list_bookings(&self, property_id: PropertyId) -> Result<Vec<Booking>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT check_in, check_out FROM bookings WHERE property_id = ? ORDER BY check_in",
            )
            .context("Failed to prepare booking query")?;

        let rows = stmt.query_map(params![property_id.0], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut bookings = Vec::new();
        for row in rows {
            let (check_in, check_out) = row?;
            bookings.push(Booking {
                check_in: parse_stored_day(&check_in)?,
                check_out: parse_stored_day(&check_out)?,
            });
        }

        Ok(bookings)
    }

    fn create_booking(
        &self,
        request: &BookingRequest,
        breakdown: &PriceBreakdown,
    ) -> Result<StoredBooking> {
        let booking = Booking::new(request.check_in, request.check_out)?;
        if booking.nights() != breakdown.total_nights {
            bail!(
                "Breakdown is for {} nights but {} -> {} is {} nights",
                breakdown.total_nights,
                booking.check_in,
                booking.check_out,
                booking.nights()
            );
        }
        let check_in = day_key(booking.check_in);
        let check_out = day_key(booking.check_out);
        let order_total_cents = to_cents(breakdown.order_total)?;
        let created_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let (stored, property_name) = {
            // The lock is held from the availability check through the insert.
            let conn = self.conn()?;

            let property_name: Option<String> = conn
                .query_row(
                    "SELECT name FROM properties WHERE id = ?",
                    params![request.property_id.0],
                    |row| row.get(0),
                )
                .optional()
                .context("Failed to look up property")?;
            let Some(property_name) = property_name else {
                return Err(BookingError::UnknownProperty(request.property_id).into());
            };

            let first_conflict: Option<String> = conn
                .query_row(
                    "SELECT MIN(GREATEST(check_in, ?)) FROM bookings \
                     WHERE property_id = ? AND check_in <= ? AND check_out >= ?",
                    params![check_in, request.property_id.0, check_out, check_in],
                    |row| row.get(0),
                )
                .context("Failed to check availability")?;
            if let Some(day) = first_conflict {
                return Err(BookingError::Conflict {
                    property_id: request.property_id,
                    first_conflict: parse_stored_day(&day)?,
                }
                .into());
            }

            let id: i64 = conn
                .query_row(
                    r#"
                    INSERT INTO bookings (
                        property_id, check_in, check_out,
                        total_nights, order_total_cents, created_at
                    ) VALUES (?, ?, ?, ?, ?, ?) RETURNING id
                "#,
                    params![
                        request.property_id.0,
                        check_in,
                        check_out,
                        breakdown.total_nights,
                        order_total_cents,
                        created_at
                    ],
                    |row| row.get(0),
                )
                .context("Failed to save booking")?;

            let stored = StoredBooking {
                id: BookingId(id),
                property_id: request.property_id,
                check_in: booking.check_in,
                check_out: booking.check_out,
                total_nights: breakdown.total_nights,
                order_total: from_cents(order_total_cents),
                created_at,
            };
            (stored, property_name)
        };

        info!(
            "Stored booking {} for property {} ({} -> {})",
            stored.id, stored.property_id, stored.check_in, stored.check_out
        );

        let context = BookingContext {
            property_name,
            breakdown: *breakdown,
        };
        self.hooks.execute_booking_hooks(&context, &stored);

        Ok(stored)
    }

    fn list_reservations(&self, property_id: Option<PropertyId>) -> Result<Vec<StoredBooking>> {
        let conn = self.conn()?;
        let base = "SELECT id, property_id, check_in, check_out, total_nights, \
                    order_total_cents, created_at FROM bookings";

        let map_row = |row: &duckdb::Row<'_>| -> duckdb::Result<ReservationRow> {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        };

        let raw: Vec<ReservationRow> = match property_id {
            Some(property_id) => {
                let mut stmt = conn
                    .prepare(&format!("{} WHERE property_id = ? ORDER BY id DESC", base))
                    .context("Failed to prepare reservation query")?;
                let rows = stmt.query_map(params![property_id.0], map_row)?;
                rows.collect::<duckdb::Result<_>>()?
            }
            None => {
                let mut stmt = conn
                    .prepare(&format!("{} ORDER BY id DESC", base))
                    .context("Failed to prepare reservation query")?;
                let rows = stmt.query_map([], map_row)?;
                rows.collect::<duckdb::Result<_>>()?
            }
        };

        raw.into_iter().map(reservation_from_row).collect()
    }

    fn delete_booking(&self, id: BookingId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn
            .execute("DELETE FROM bookings WHERE id = ?", params![id.0])
            .context("Failed to delete booking")?;

        if deleted > 0 {
            info!("Deleted booking {}", id);
        }
        Ok(deleted > 0)
    }
}
