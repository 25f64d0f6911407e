use crate::application::{
    BookingApp, CalendarResult, CalendarView, Theme, format_currency, format_date, summary_rows,
};
use crate::domain::{BookingId, DAY_KEY_FORMAT, PropertyId};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(name = "staybook")]
#[command(about = "Pick stay dates, see what they cost, and book them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage bookable properties
    Property {
        #[command(subcommand)]
        action: PropertyCommand,
    },
    /// Show the blocked periods of a property
    Availability {
        #[arg(short, long)]
        property: PropertyId,
        /// Print the blocked days as JSON keys
        #[arg(long)]
        json: bool,
    },
    /// Price a stay without booking it
    Quote {
        #[arg(short, long)]
        property: PropertyId,
        /// Check-in day (YYYY-MM-DD)
        #[arg(long = "check-in", value_parser = parse_day)]
        check_in: NaiveDate,
        /// Check-out day (YYYY-MM-DD)
        #[arg(long = "check-out", value_parser = parse_day)]
        check_out: NaiveDate,
        #[arg(long)]
        json: bool,
    },
    /// Book a stay
    Book {
        #[arg(short, long)]
        property: PropertyId,
        #[arg(long = "check-in", value_parser = parse_day)]
        check_in: NaiveDate,
        #[arg(long = "check-out", value_parser = parse_day)]
        check_out: NaiveDate,
    },
    /// List stored bookings
    Bookings {
        #[arg(short, long)]
        property: Option<PropertyId>,
    },
    /// Cancel a booking
    Cancel {
        #[arg(short, long)]
        booking: BookingId,
    },
    /// Open the interactive calendar for a property
    Calendar {
        #[arg(short, long)]
        property: PropertyId,
    },
}

#[derive(Subcommand)]
pub enum PropertyCommand {
    /// Add a property with its nightly price
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        price: Decimal,
    },
    /// List properties
    List,
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DAY_KEY_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", raw, e))
}

impl Cli {
    pub fn run() -> Result<()> {
        let cli = Self::parse();
        let mut app = BookingApp::new()?;
        let symbol = app.config().currency_symbol.clone();

        match cli.command {
            Commands::Property { action } => match action {
                PropertyCommand::Add { name, price } => {
                    let listing = app.add_property(&name, price)?;
                    println!(
                        "Added property {} '{}' at {} per night",
                        listing.id,
                        listing.name,
                        format_currency(listing.nightly_price, &symbol)
                    );
                }
                PropertyCommand::List => {
                    let properties = app.properties()?;
                    if properties.is_empty() {
                        println!("No properties yet. Add one with `staybook property add`.");
                    }
                    for listing in properties {
                        println!(
                            "{:>4}  {:<30} {:>12}",
                            listing.id,
                            listing.name,
                            format_currency(listing.nightly_price, &symbol)
                        );
                    }
                }
            },
            Commands::Availability { property, json } => {
                app.open_property(property)?;
                if json {
                    let keys = app
                        .session()
                        .disabled_dates()
                        .map(|index| index.keys())
                        .unwrap_or_default();
                    println!("{}", serde_json::to_string_pretty(&keys)?);
                } else {
                    let periods = app.session().blocked_periods();
                    if periods.is_empty() {
                        println!("Every day is available.");
                    }
                    for period in periods {
                        println!(
                            "Blocked {} to {}",
                            format_date(period.from),
                            format_date(period.to)
                        );
                    }
                }
            }
            Commands::Quote {
                property,
                check_in,
                check_out,
                json,
            } => {
                let quote = app.quote(property, check_in, check_out)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&quote)?);
                } else {
                    println!(
                        "{}: {} to {}",
                        quote.listing.name,
                        format_date(quote.request.check_in),
                        format_date(quote.request.check_out)
                    );
                    for (label, amount) in summary_rows(&quote.listing, &quote.breakdown, &symbol)
                    {
                        println!("  {:<28}{:>14}", label, amount);
                    }
                }
            }
            Commands::Book {
                property,
                check_in,
                check_out,
            } => {
                let stored = app.book(property, check_in, check_out)?;
                println!(
                    "Booked {} ({} to {}, {} nights) for {}",
                    stored.id,
                    format_date(stored.check_in),
                    format_date(stored.check_out),
                    stored.total_nights,
                    format_currency(stored.order_total, &symbol)
                );
            }
            Commands::Bookings { property } => {
                let reservations = app.reservations(property)?;
                if reservations.is_empty() {
                    println!("No bookings.");
                }
                for stored in reservations {
                    println!(
                        "{:>4}  property {:<4} {} to {}  {:>3} nights  {:>12}",
                        stored.id,
                        stored.property_id,
                        format_date(stored.check_in),
                        format_date(stored.check_out),
                        stored.total_nights,
                        format_currency(stored.order_total, &symbol)
                    );
                }
            }
            Commands::Cancel { booking } => {
                app.cancel(booking)?;
                println!("Cancelled booking {}", booking);
            }
            Commands::Calendar { property } => {
                run_calendar(&mut app, property, &symbol)?;
            }
        }

        Ok(())
    }
}

fn run_calendar(app: &mut BookingApp, property: PropertyId, symbol: &str) -> Result<()> {
    app.open_property(property)?;
    let theme = Theme::by_name(&app.config().theme);
    let today = app.config().today();
    let mut notice = None;

    loop {
        let result = {
            let mut view = CalendarView::new(
                today,
                app.session_mut(),
                theme.clone(),
                symbol.to_string(),
                notice.take(),
            )
            .context("Failed to start the calendar")?;
            view.run()?
        }; // view is dropped here, releasing the session

        match result {
            CalendarResult::ConfirmRequested(request) => match app.confirm_booking() {
                Ok(stored) => {
                    notice = Some(format!(
                        "Booked {} to {} for {}",
                        format_date(stored.check_in),
                        format_date(stored.check_out),
                        format_currency(stored.order_total, symbol)
                    ));
                }
                Err(e) => {
                    log::warn!(
                        "Booking {} to {} failed: {}",
                        request.check_in,
                        request.check_out,
                        e
                    );
                    notice = Some(format!("Booking failed: {}", e));
                }
            },
            CalendarResult::Exited => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_quote_arguments() {
        let cli = Cli::try_parse_from([
            "staybook",
            "quote",
            "--property",
            "3",
            "--check-in",
            "2024-06-20",
            "--check-out",
            "2024-06-23",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Quote {
                property,
                check_in,
                check_out,
                json,
            } => {
                assert_eq!(property, PropertyId(3));
                assert_eq!(check_in, NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
                assert_eq!(check_out, NaiveDate::from_ymd_opt(2024, 6, 23).unwrap());
                assert!(json);
            }
            _ => panic!("expected quote command"),
        }
    }

    #[test]
    fn test_bad_day_is_rejected() {
        let result = Cli::try_parse_from([
            "staybook",
            "book",
            "--property",
            "1",
            "--check-in",
            "06/20/2024",
            "--check-out",
            "2024-06-23",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_property_add() {
        let cli = Cli::try_parse_from([
            "staybook",
            "property",
            "add",
            "--name",
            "Lake Cabin",
            "--price",
            "120.50",
        ])
        .unwrap();
        match cli.command {
            Commands::Property {
                action: PropertyCommand::Add { name, price },
            } => {
                assert_eq!(name, "Lake Cabin");
                assert_eq!(price, Decimal::new(12050, 2));
            }
            _ => panic!("expected property add"),
        }
    }
}
