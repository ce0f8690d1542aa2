//! History aggregation and derived statistics.
//!
//! Everything here is pure and recomputed on read: weekly and monthly
//! aggregates are never persisted, so they can't drift from the daily
//! history they summarize.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::report::{DailyReport, ReportKind};

/// Aggregation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Weekly,
    Monthly,
}

/// Group daily reports into weekly (ISO week) or monthly aggregates.
///
/// Counts and savings are summed; the two averages are meaned across
/// the group's reports. The representative `date` is the last day in
/// the group, and the result is sorted most recent first. Non-daily
/// inputs are ignored; periods with no reports are simply absent.
pub fn aggregate(reports: &[DailyReport], period: Period) -> Vec<DailyReport> {
    let mut groups: BTreeMap<(i32, u32), Builder> = BTreeMap::new();
    for r in reports.iter().filter(|r| r.kind == ReportKind::Daily) {
        let key = match period {
            Period::Weekly => {
                let iso = r.date.iso_week();
                (iso.year(), iso.week())
            }
            Period::Monthly => (r.date.year(), r.date.month()),
        };
        groups.entry(key).or_default().add(r);
    }

    let kind = match period {
        Period::Weekly => ReportKind::Weekly,
        Period::Monthly => ReportKind::Monthly,
    };
    let mut out: Vec<DailyReport> = groups.into_values().map(|b| b.build(kind)).collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

/// Mean `avg_time_exceeded_ms` over the most recent `n` daily reports.
/// The presentation layer shows this for n = 7 and n = 30.
pub fn recent_overrun_average(reports: &[DailyReport], n: usize) -> i64 {
    let mut daily: Vec<&DailyReport> = reports
        .iter()
        .filter(|r| r.kind == ReportKind::Daily)
        .collect();
    daily.sort_by_key(|r| r.date);

    let tail = &daily[daily.len().saturating_sub(n)..];
    if tail.is_empty() {
        return 0;
    }
    tail.iter().map(|r| r.avg_time_exceeded_ms).sum::<i64>() / tail.len() as i64
}

#[derive(Default)]
struct Builder {
    date: NaiveDate,
    cigarettes: u32,
    money_cents: i64,
    sum_interval_ms: i64,
    sum_exceeded_ms: i64,
    count: u32,
}

impl Builder {
    fn add(&mut self, r: &DailyReport) {
        self.date = self.date.max(r.date);
        self.cigarettes += r.cigarettes_smoked;
        self.money_cents += r.money_saved_cents;
        self.sum_interval_ms += r.avg_interval_ms;
        self.sum_exceeded_ms += r.avg_time_exceeded_ms;
        self.count += 1;
    }

    fn build(self, kind: ReportKind) -> DailyReport {
        let n = i64::from(self.count.max(1));
        DailyReport {
            date: self.date,
            cigarettes_smoked: self.cigarettes,
            avg_interval_ms: self.sum_interval_ms / n,
            avg_time_exceeded_ms: self.sum_exceeded_ms / n,
            money_saved_cents: self.money_cents,
            kind,
        }
    }
}
