//! Daily reports and the history record codec.
//!
//! One report per (date, kind). Only daily reports are persisted;
//! weekly and monthly aggregates are derived on demand (see
//! [`crate::stats`]).
//!
//! The persisted encoding keeps the storage contract inherited from
//! earlier releases: six semicolon-separated fields in fixed order
//! `date;cigarettesSmoked;avgTimeExceededMs;avgIntervalMs;moneySavedCents;kind`,
//! records joined by `|`. Decoding is tolerant -- a short or malformed
//! record substitutes per-field defaults (zeroes, epoch date) instead of
//! failing the whole history load.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Daily,
    Weekly,
    Monthly,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Daily => "daily",
            ReportKind::Weekly => "weekly",
            ReportKind::Monthly => "monthly",
        }
    }

    /// Unknown kinds decode as daily (the only persisted kind).
    fn parse(raw: &str) -> Self {
        match raw {
            "weekly" => ReportKind::Weekly,
            "monthly" => ReportKind::Monthly,
            _ => ReportKind::Daily,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one calendar day (or one aggregated period).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub cigarettes_smoked: u32,
    /// Mean of the actual waits between cigarettes over the period.
    pub avg_interval_ms: i64,
    /// Mean overrun duration over the period's overrun events.
    pub avg_time_exceeded_ms: i64,
    pub money_saved_cents: i64,
    pub kind: ReportKind,
}

impl DailyReport {
    pub fn empty(date: NaiveDate, kind: ReportKind) -> Self {
        Self {
            date,
            cigarettes_smoked: 0,
            avg_interval_ms: 0,
            avg_time_exceeded_ms: 0,
            money_saved_cents: 0,
            kind,
        }
    }

    /// A seeded placeholder with no recorded activity yet.
    pub fn is_empty(&self) -> bool {
        self.cigarettes_smoked == 0 && self.avg_interval_ms == 0 && self.avg_time_exceeded_ms == 0
    }

    /// Encode one record in the fixed field order.
    pub fn serialize_record(&self) -> String {
        format!(
            "{};{};{};{};{};{}",
            self.date,
            self.cigarettes_smoked,
            self.avg_time_exceeded_ms,
            self.avg_interval_ms,
            self.money_saved_cents,
            self.kind
        )
    }

    /// Decode one record; missing or malformed fields fall back to
    /// defaults (zero counts, epoch date, daily kind).
    pub fn deserialize_record(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split(';').collect();
        let field = |i: usize| parts.get(i).copied().unwrap_or("");
        Self {
            date: field(0).parse().unwrap_or_default(),
            cigarettes_smoked: field(1).parse().unwrap_or(0),
            avg_time_exceeded_ms: field(2).parse().unwrap_or(0),
            avg_interval_ms: field(3).parse().unwrap_or(0),
            money_saved_cents: field(4).parse().unwrap_or(0),
            kind: ReportKind::parse(field(5)),
        }
    }
}

/// Encode a report list, records joined by `|`.
pub fn serialize_reports(reports: &[DailyReport]) -> String {
    reports
        .iter()
        .map(DailyReport::serialize_record)
        .collect::<Vec<_>>()
        .join("|")
}

/// Decode a report list. A blank input is an empty history.
pub fn deserialize_reports(raw: &str) -> Vec<DailyReport> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split('|').map(DailyReport::deserialize_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn report(date: &str, smoked: u32) -> DailyReport {
        DailyReport {
            date: date.parse().unwrap(),
            cigarettes_smoked: smoked,
            avg_interval_ms: 2_880_000,
            avg_time_exceeded_ms: 120_000,
            money_saved_cents: 1_450,
            kind: ReportKind::Daily,
        }
    }

    #[test]
    fn record_roundtrip() {
        let r = report("2024-01-01", 12);
        assert_eq!(
            r.serialize_record(),
            "2024-01-01;12;120000;2880000;1450;daily"
        );
        assert_eq!(DailyReport::deserialize_record(&r.serialize_record()), r);
    }

    #[test]
    fn list_roundtrip() {
        let reports = vec![report("2024-01-01", 12), report("2024-01-02", 9)];
        let encoded = serialize_reports(&reports);
        assert!(encoded.contains('|'));
        assert_eq!(deserialize_reports(&encoded), reports);
    }

    #[test]
    fn blank_input_is_empty_history() {
        assert!(deserialize_reports("").is_empty());
        assert!(deserialize_reports("   ").is_empty());
    }

    #[test]
    fn short_record_fills_defaults() {
        let r = DailyReport::deserialize_record("2024-03-05;4");
        assert_eq!(r.date, "2024-03-05".parse().unwrap());
        assert_eq!(r.cigarettes_smoked, 4);
        assert_eq!(r.avg_time_exceeded_ms, 0);
        assert_eq!(r.avg_interval_ms, 0);
        assert_eq!(r.money_saved_cents, 0);
        assert_eq!(r.kind, ReportKind::Daily);
    }

    #[test]
    fn malformed_fields_fill_defaults() {
        let r = DailyReport::deserialize_record("not-a-date;x;y;z;w;weekly");
        assert_eq!(r.date, NaiveDate::default());
        assert_eq!(r.cigarettes_smoked, 0);
        assert_eq!(r.kind, ReportKind::Weekly);
    }

    proptest! {
        #[test]
        fn roundtrip_any_valid_report(
            year in 2000i32..2100,
            ordinal in 1u32..=365,
            smoked in 0u32..500,
            exceeded in 0i64..DAY_MS_PROP,
            interval in 0i64..DAY_MS_PROP,
            cents in 0i64..10_000_000,
        ) {
            let r = DailyReport {
                date: NaiveDate::from_yo_opt(year, ordinal).unwrap(),
                cigarettes_smoked: smoked,
                avg_interval_ms: interval,
                avg_time_exceeded_ms: exceeded,
                money_saved_cents: cents,
                kind: ReportKind::Daily,
            };
            prop_assert_eq!(DailyReport::deserialize_record(&r.serialize_record()), r);
        }
    }

    const DAY_MS_PROP: i64 = 24 * 60 * 60 * 1000;
}
