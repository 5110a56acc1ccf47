//! Display helpers for catalog rows (pt-BR currency and dates).

use chrono::{Local, TimeZone};
use pricebook_core::domain::timestamp::parse_timestamp;
use pricebook_core::{PriceRecord, ProductRecord};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (units, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (index, digit) in units.chars().enumerate() {
        if index > 0 && (units.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}R$ {grouped},{cents}")
}

pub fn format_timestamp_in<Tz: TimeZone>(raw: &str, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw) {
        Some(parsed) => parsed.with_timezone(zone).format("%d/%m/%Y, %H:%M").to_string(),
        None => raw.to_string(),
    }
}

pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

pub fn status_label(active: bool) -> &'static str {
    if active {
        "ATIVO"
    } else {
        "INATIVO"
    }
}

#[derive(Debug, Serialize)]
pub struct ProductRow<'a> {
    #[serde(flatten)]
    pub record: &'a ProductRecord,
    pub status_label: &'static str,
    pub created_display: String,
}

impl<'a> From<&'a ProductRecord> for ProductRow<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        Self {
            record,
            status_label: status_label(record.status),
            created_display: format_timestamp(&record.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PriceRow<'a> {
    #[serde(flatten)]
    pub record: &'a PriceRecord,
    pub price_display: String,
    pub created_display: String,
}

impl<'a> From<&'a PriceRecord> for PriceRow<'a> {
    fn from(record: &'a PriceRecord) -> Self {
        Self {
            record,
            price_display: format_brl(record.price),
            created_display: format_timestamp(&record.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{format_brl, format_timestamp_in, status_label};

    #[test]
    fn formats_brazilian_currency() {
        assert_eq!(format_brl(Decimal::new(499, 2)), "R$ 4,99");
        assert_eq!(format_brl(Decimal::new(123456789, 2)), "R$ 1.234.567,89");
        assert_eq!(format_brl(Decimal::new(5, 0)), "R$ 5,00");
        assert_eq!(format_brl(Decimal::new(-1005, 3)), "-R$ 1,01");
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn formats_timestamps_day_first() {
        assert_eq!(format_timestamp_in("2024-03-01T10:05:00Z", &Utc), "01/03/2024, 10:05");
        assert_eq!(format_timestamp_in("garbage", &Utc), "garbage");
    }

    #[test]
    fn status_labels_match_catalog_wording() {
        assert_eq!(status_label(true), "ATIVO");
        assert_eq!(status_label(false), "INATIVO");
    }
}
