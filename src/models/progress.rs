use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Per-day adherence bucket, derived fresh on every aggregation call.
/// `rate` is `taken / scheduled * 100`, or `0` for an empty day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAdherence {
    pub date: NaiveDate,
    pub scheduled: u32,
    pub taken: u32,
    pub missed: u32,
    pub rate: f64,
}

/// Period-level adherence totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total_doses_scheduled: u32,
    pub doses_taken: u32,
    pub doses_missed: u32,
    pub doses_skipped: u32,
    pub adherence_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_active_medications: u32,
}

/// Adherence report for a reporting window. Computed on demand from the
/// dose logs in the window; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub period_start: NaiveDateTime,
    pub period_end: NaiveDateTime,
    pub stats: ProgressStats,
    pub daily_adherence: Vec<DailyAdherence>,
    pub generated_at: NaiveDateTime,
}
