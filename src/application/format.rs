use crate::domain::{PriceBreakdown, PropertyListing, round_currency};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// `1234.5` with `$` renders as `$1,234.50`.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    let rounded = round_currency(amount.abs());
    let plain = format!("{:.2}", rounded);
    let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{symbol}{grouped}.{cents}")
}

/// `2024-06-10` renders as `Jun 10, 2024`.
pub fn format_date(day: NaiveDate) -> String {
    day.format("%b %-d, %Y").to_string()
}

/// Label/amount rows of a booking summary, total last.
pub fn summary_rows(
    listing: &PropertyListing,
    breakdown: &PriceBreakdown,
    symbol: &str,
) -> Vec<(String, String)> {
    let nights = if breakdown.total_nights == 1 {
        "night"
    } else {
        "nights"
    };

    vec![
        (
            format!(
                "{} x {} {}",
                format_currency(listing.nightly_price, symbol),
                breakdown.total_nights,
                nights
            ),
            format_currency(breakdown.sub_total, symbol),
        ),
        (
            "Cleaning fee".to_string(),
            format_currency(breakdown.cleaning_fee, symbol),
        ),
        (
            "Service fee".to_string(),
            format_currency(breakdown.service_fee, symbol),
        ),
        ("Tax".to_string(), format_currency(breakdown.tax, symbol)),
        (
            "Booking Total".to_string(),
            format_currency(breakdown.order_total, symbol),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PropertyId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(0), "$"), "$0.00");
        assert_eq!(format_currency(dec!(19), "$"), "$19.00");
        assert_eq!(format_currency(dec!(999.995), "$"), "$1,000.00");
        assert_eq!(format_currency(dec!(1234.5), "$"), "$1,234.50");
        assert_eq!(format_currency(dec!(1234567.891), "€"), "€1,234,567.89");
        assert_eq!(format_currency(dec!(-42.1), "$"), "-$42.10");
        assert_eq!(format_currency(dec!(-0.001), "$"), "$0.00");
    }

    #[test]
    fn test_format_date() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(format_date(day), "Jun 5, 2024");
    }

    #[test]
    fn test_summary_rows() {
        let listing = PropertyListing {
            id: PropertyId(1),
            name: "Cabin".to_string(),
            nightly_price: dec!(100),
        };
        let breakdown = PriceBreakdown {
            total_nights: 3,
            sub_total: dec!(300),
            cleaning_fee: dec!(50),
            service_fee: dec!(30),
            tax: dec!(19),
            order_total: dec!(399),
        };

        let rows = summary_rows(&listing, &breakdown, "$");

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], ("$100.00 x 3 nights".to_string(), "$300.00".to_string()));
        assert_eq!(rows[4], ("Booking Total".to_string(), "$399.00".to_string()));
    }
}
