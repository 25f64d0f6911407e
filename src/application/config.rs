use crate::domain::{PricingPolicy, normalize_day};
use anyhow::{Context, Result, anyhow};
use chrono::{FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub reservation_log: PathBuf,
    pub pricing: PricingPolicy,
    pub currency_symbol: String,
    /// Zone in which instants are cut into calendar days.
    pub reference_offset: FixedOffset,
    pub theme: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("STAYBOOK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("staybook")
            });

        let db_path = data_dir.join("staybook.db");
        let reservation_log = data_dir.join("reservations.log");

        let defaults = PricingPolicy::default();
        let pricing = PricingPolicy {
            cleaning_fee: parse_decimal(&lookup, "STAYBOOK_CLEANING_FEE")?
                .unwrap_or(defaults.cleaning_fee),
            service_fee_rate: parse_decimal(&lookup, "STAYBOOK_SERVICE_FEE_RATE")?
                .unwrap_or(defaults.service_fee_rate),
            tax_rate: parse_decimal(&lookup, "STAYBOOK_TAX_RATE")?.unwrap_or(defaults.tax_rate),
        };
        for (name, value) in [
            ("STAYBOOK_CLEANING_FEE", pricing.cleaning_fee),
            ("STAYBOOK_SERVICE_FEE_RATE", pricing.service_fee_rate),
            ("STAYBOOK_TAX_RATE", pricing.tax_rate),
        ] {
            if value.is_sign_negative() {
                return Err(anyhow!("{} must not be negative, got {}", name, value));
            }
        }

        let currency_symbol = lookup("STAYBOOK_CURRENCY").unwrap_or_else(|| "$".to_string());

        let reference_offset = match lookup("STAYBOOK_UTC_OFFSET_MINUTES") {
            Some(raw) => {
                let minutes: i32 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid STAYBOOK_UTC_OFFSET_MINUTES '{}'", raw))?;
                FixedOffset::east_opt(minutes * 60)
                    .ok_or_else(|| anyhow!("UTC offset out of range: {} minutes", minutes))?
            }
            None => FixedOffset::east_opt(0).ok_or_else(|| anyhow!("UTC offset unavailable"))?,
        };

        let theme = lookup("STAYBOOK_THEME").unwrap_or_else(|| "dark".to_string());

        Ok(Self {
            data_dir,
            db_path,
            reservation_log,
            pricing,
            currency_symbol,
            reference_offset,
            theme,
        })
    }

    /// Today's calendar day in the reference zone.
    pub fn today(&self) -> NaiveDate {
        normalize_day(&Utc::now(), &self.reference_offset)
    }
}

fn parse_decimal<F>(lookup: &F, key: &str) -> Result<Option<Decimal>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            Decimal::from_str(raw.trim()).with_context(|| format!("Invalid {} '{}'", key, raw))
        })
        .transpose()
}
