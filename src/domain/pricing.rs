use crate::domain::{InvalidRangeError, PricingError};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Minor-unit precision of every amount in a breakdown.
pub const CURRENCY_SCALE: u32 = 2;

/// Round half-up to the currency's minor unit.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayQuote {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub total_nights: i64,
    pub sub_total: Decimal,
    pub cleaning_fee: Decimal,
    pub service_fee: Decimal,
    pub tax: Decimal,
    pub order_total: Decimal,
}

impl PriceBreakdown {
    /// Order total in minor units (cents), as payment providers expect it.
    pub fn order_total_minor_units(&self) -> Option<i64> {
        self.order_total
            .checked_mul(Decimal::ONE_HUNDRED)?
            .trunc()
            .to_i64()
    }
}

/// Fee and tax rates applied on top of the nightly subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    /// Flat fee per booking, independent of the number of nights.
    pub cleaning_fee: Decimal,
    /// Fraction of the subtotal.
    pub service_fee_rate: Decimal,
    /// Fraction of subtotal plus fees.
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            cleaning_fee: Decimal::new(50, 0),
            service_fee_rate: Decimal::new(10, 2),
            tax_rate: Decimal::new(5, 2),
        }
    }
}

impl PricingPolicy {
    /// Price a stay.
    ///
    /// Each component is rounded to cents as soon as it is computed, tax is taken
    /// from the rounded components, and the order total is their exact sum.
    /// Amounts past what `Decimal` can hold fail with [`PricingError::Overflow`].
    pub fn calculate_total(&self, quote: &StayQuote) -> Result<PriceBreakdown, PricingError> {
        let total_nights = (quote.check_out - quote.check_in).num_days();
        if total_nights < 1 {
            return Err(InvalidRangeError {
                check_in: quote.check_in,
                check_out: quote.check_out,
            }
            .into());
        }

        let sub_total = quote
            .price
            .checked_mul(Decimal::from(total_nights))
            .map(round_currency)
            .ok_or(PricingError::Overflow("subtotal"))?;
        let cleaning_fee = round_currency(self.cleaning_fee);
        let service_fee = sub_total
            .checked_mul(self.service_fee_rate)
            .map(round_currency)
            .ok_or(PricingError::Overflow("service fee"))?;
        let tax = sub_total
            .checked_add(cleaning_fee)
            .and_then(|amount| amount.checked_add(service_fee))
            .and_then(|amount| amount.checked_mul(self.tax_rate))
            .map(round_currency)
            .ok_or(PricingError::Overflow("tax"))?;
        let order_total = sub_total
            .checked_add(cleaning_fee)
            .and_then(|amount| amount.checked_add(service_fee))
            .and_then(|amount| amount.checked_add(tax))
            .ok_or(PricingError::Overflow("order total"))?;

        Ok(PriceBreakdown {
            total_nights,
            sub_total,
            cleaning_fee,
            service_fee,
            tax,
            order_total,
        })
    }
}

/// Price a stay with the default policy.
pub fn calculate_total(quote: &StayQuote) -> Result<PriceBreakdown, PricingError> {
    PricingPolicy::default().calculate_total(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quote(nights: i64, price: Decimal) -> StayQuote {
        let check_in = date(2024, 6, 20);
        StayQuote {
            check_in,
            check_out: check_in + chrono::Duration::days(nights),
            price,
        }
    }

    #[test]
    fn test_three_night_breakdown() {
        let breakdown = calculate_total(&quote(3, dec!(100))).unwrap();

        assert_eq!(breakdown.total_nights, 3);
        assert_eq!(breakdown.sub_total, dec!(300));
        assert_eq!(breakdown.cleaning_fee, dec!(50));
        assert_eq!(breakdown.service_fee, dec!(30));
        assert_eq!(breakdown.tax, dec!(19));
        assert_eq!(breakdown.order_total, dec!(399));
        assert_eq!(breakdown.order_total_minor_units(), Some(39_900));
    }

    #[test]
    fn test_nights_counted_across_month_boundary() {
        let stay = StayQuote {
            check_in: date(2024, 6, 28),
            check_out: date(2024, 7, 3),
            price: dec!(80),
        };
        assert_eq!(calculate_total(&stay).unwrap().total_nights, 5);
    }

    #[test]
    fn test_components_round_half_up_and_sum_exactly() {
        let policy = PricingPolicy {
            cleaning_fee: dec!(21),
            service_fee_rate: dec!(0.125),
            tax_rate: dec!(0.0825),
        };
        let breakdown = policy.calculate_total(&quote(1, dec!(99.99))).unwrap();

        // 99.99 * 0.125 = 12.49875
        assert_eq!(breakdown.service_fee, dec!(12.50));
        // (99.99 + 21 + 12.50) * 0.0825 = 11.0129...
        assert_eq!(breakdown.tax, dec!(11.01));
        assert_eq!(
            breakdown.order_total,
            breakdown.sub_total + breakdown.cleaning_fee + breakdown.service_fee + breakdown.tax
        );
        assert_eq!(breakdown.order_total, dec!(144.50));
        assert_eq!(breakdown.order_total_minor_units(), Some(14_450));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        assert_eq!(round_currency(dec!(0.125)), dec!(0.13));
        assert_eq!(round_currency(dec!(2.345)), dec!(2.35));
        assert_eq!(round_currency(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn test_pricing_is_deterministic() {
        let stay = quote(4, dec!(123.45));
        assert_eq!(calculate_total(&stay), calculate_total(&stay));
    }

    #[test]
    fn test_zero_and_negative_nights_are_rejected() {
        let same_day = quote(0, dec!(100));
        assert_eq!(
            calculate_total(&same_day),
            Err(PricingError::InvalidRange(InvalidRangeError {
                check_in: same_day.check_in,
                check_out: same_day.check_out,
            }))
        );
        assert!(calculate_total(&quote(-2, dec!(100))).is_err());
    }

    #[test]
    fn test_huge_price_overflows_without_panicking() {
        // Decimal::MAX is about 7.9e28
        let stay = quote(3, Decimal::from_i128_with_scale(3 * 10i128.pow(28), 0));
        assert_eq!(calculate_total(&stay), Err(PricingError::Overflow("subtotal")));

        let policy = PricingPolicy {
            cleaning_fee: Decimal::MAX,
            ..PricingPolicy::default()
        };
        assert_eq!(
            policy.calculate_total(&quote(1, dec!(100))),
            Err(PricingError::Overflow("tax"))
        );
    }

    #[test]
    fn test_minor_units_of_unrepresentable_total() {
        let breakdown = PriceBreakdown {
            total_nights: 1,
            sub_total: Decimal::MAX,
            cleaning_fee: Decimal::ZERO,
            service_fee: Decimal::ZERO,
            tax: Decimal::ZERO,
            order_total: Decimal::MAX,
        };
        assert_eq!(breakdown.order_total_minor_units(), None);
    }
}
