//! Adherence aggregation: daily bucketing, period statistics, and
//! perfect-day streaks over recorded dose instances.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::models::enums::DoseStatus;
use crate::models::{DailyAdherence, DoseLog, ProgressReport, ProgressStats};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdherenceError {
    #[error("period end {end} precedes period start {start}")]
    InvalidPeriod {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Build an adherence report from the dose instances scheduled within
/// `[period_start, period_end]`. The caller supplies instances already
/// filtered to the period, plus the number of currently active
/// schedules, which is carried through to the report untouched.
///
/// Instances are bucketed by the calendar date of `scheduled_time`;
/// input order is irrelevant. Days with no instances produce no bucket.
/// Zero input is a valid report, never an error.
pub fn compute_adherence(
    instances: &[DoseLog],
    active_schedule_count: u32,
    period_start: NaiveDateTime,
    period_end: NaiveDateTime,
) -> Result<ProgressReport, AdherenceError> {
    if period_end < period_start {
        return Err(AdherenceError::InvalidPeriod {
            start: period_start,
            end: period_end,
        });
    }

    // BTreeMap keeps buckets in ascending date order, which the streak
    // scans below depend on.
    let mut buckets: BTreeMap<NaiveDate, DayCounts> = BTreeMap::new();
    let mut taken = 0u32;
    let mut missed = 0u32;
    let mut skipped = 0u32;

    for dose in instances {
        let day = buckets.entry(dose.scheduled_time.date()).or_default();
        day.scheduled += 1;
        match dose.status {
            DoseStatus::Taken => {
                day.taken += 1;
                taken += 1;
            }
            DoseStatus::Missed => {
                day.missed += 1;
                missed += 1;
            }
            DoseStatus::Skipped => skipped += 1,
            DoseStatus::Scheduled => {}
        }
    }

    let daily_adherence: Vec<DailyAdherence> = buckets
        .into_iter()
        .map(|(date, counts)| DailyAdherence {
            date,
            scheduled: counts.scheduled,
            taken: counts.taken,
            missed: counts.missed,
            rate: rate_pct(counts.taken, counts.scheduled),
        })
        .collect();

    let total_scheduled = instances.len() as u32;

    let stats = ProgressStats {
        total_doses_scheduled: total_scheduled,
        doses_taken: taken,
        doses_missed: missed,
        doses_skipped: skipped,
        adherence_rate: round2(rate_pct(taken, total_scheduled)),
        current_streak: calculate_streak(&daily_adherence),
        longest_streak: calculate_longest_streak(&daily_adherence),
        total_active_medications: active_schedule_count,
    };

    Ok(ProgressReport {
        period_start,
        period_end,
        stats,
        daily_adherence,
        generated_at: Local::now().naive_local(),
    })
}

/// Consecutive perfect days ending at the most recent bucket. A most
/// recent day under 100% means no current streak at all.
pub fn calculate_streak(daily: &[DailyAdherence]) -> u32 {
    let mut streak = 0;
    for day in daily.iter().rev() {
        // exact equality is the contract: any shortfall breaks the run
        if day.rate == 100.0 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Longest run of consecutive perfect days anywhere in the sequence.
pub fn calculate_longest_streak(daily: &[DailyAdherence]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    for day in daily {
        if day.rate == 100.0 {
            run += 1;
        } else {
            longest = longest.max(run);
            run = 0;
        }
    }
    // a streak that reaches the final day never hits the reset branch
    longest.max(run)
}

#[derive(Default)]
struct DayCounts {
    scheduled: u32,
    taken: u32,
    missed: u32,
}

fn rate_pct(taken: u32, scheduled: u32) -> f64 {
    if scheduled == 0 {
        0.0
    } else {
        f64::from(taken) / f64::from(scheduled) * 100.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn dose_on(scheduled: &str, status: DoseStatus) -> DoseLog {
        let now = dt("2025-03-10 09:00:00");
        DoseLog {
            id: Uuid::new_v4(),
            medication_id: Uuid::new_v4(),
            drug_name: "Metformin".into(),
            dosage: "500mg".into(),
            scheduled_time: dt(scheduled),
            actual_time: None,
            status,
            notes: None,
            side_effects_reported: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn days(rates: &[f64]) -> Vec<DailyAdherence> {
        let base = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        rates
            .iter()
            .enumerate()
            .map(|(i, &rate)| DailyAdherence {
                date: base + Duration::days(i as i64),
                scheduled: 2,
                taken: if rate == 100.0 { 2 } else { 0 },
                missed: if rate == 100.0 { 0 } else { 2 },
                rate,
            })
            .collect()
    }

    // ── Bucketing and totals ─────────────────────────────────

    #[test]
    fn empty_input_yields_zeroed_report() {
        let report =
            compute_adherence(&[], 3, dt("2025-03-01 00:00:00"), dt("2025-03-07 23:59:59"))
                .unwrap();

        assert!(report.daily_adherence.is_empty());
        assert_eq!(report.stats.total_doses_scheduled, 0);
        assert_eq!(report.stats.doses_taken, 0);
        assert_eq!(report.stats.adherence_rate, 0.0);
        assert_eq!(report.stats.current_streak, 0);
        assert_eq!(report.stats.longest_streak, 0);
        assert_eq!(report.stats.total_active_medications, 3);
        assert_eq!(report.period_start, dt("2025-03-01 00:00:00"));
        assert_eq!(report.period_end, dt("2025-03-07 23:59:59"));
    }

    #[test]
    fn buckets_by_calendar_date_ascending() {
        // deliberately scrambled input order
        let instances = vec![
            dose_on("2025-03-03 08:00:00", DoseStatus::Taken),
            dose_on("2025-03-01 20:00:00", DoseStatus::Missed),
            dose_on("2025-03-02 08:00:00", DoseStatus::Taken),
            dose_on("2025-03-01 08:00:00", DoseStatus::Taken),
        ];
        let report =
            compute_adherence(&instances, 1, dt("2025-03-01 00:00:00"), dt("2025-03-03 23:59:59"))
                .unwrap();

        let dates: Vec<NaiveDate> = report.daily_adherence.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            ]
        );
        assert_eq!(report.daily_adherence[0].scheduled, 2);
        assert_eq!(report.daily_adherence[0].taken, 1);
        assert_eq!(report.daily_adherence[0].missed, 1);
        assert_eq!(report.daily_adherence[0].rate, 50.0);
        assert_eq!(report.daily_adherence[1].rate, 100.0);
    }

    #[test]
    fn pending_doses_count_as_scheduled_only() {
        let instances = vec![
            dose_on("2025-03-01 08:00:00", DoseStatus::Taken),
            dose_on("2025-03-01 14:00:00", DoseStatus::Scheduled),
            dose_on("2025-03-01 20:00:00", DoseStatus::Scheduled),
        ];
        let report =
            compute_adherence(&instances, 1, dt("2025-03-01 00:00:00"), dt("2025-03-01 23:59:59"))
                .unwrap();

        let day = &report.daily_adherence[0];
        assert_eq!(day.scheduled, 3);
        assert_eq!(day.taken, 1);
        assert_eq!(day.missed, 0);
        assert_eq!(report.stats.total_doses_scheduled, 3);
        assert_eq!(report.stats.adherence_rate, 33.33);
    }

    #[test]
    fn skipped_counts_in_totals_but_not_missed() {
        let instances = vec![
            dose_on("2025-03-01 08:00:00", DoseStatus::Taken),
            dose_on("2025-03-01 14:00:00", DoseStatus::Skipped),
            dose_on("2025-03-02 08:00:00", DoseStatus::Missed),
        ];
        let report =
            compute_adherence(&instances, 1, dt("2025-03-01 00:00:00"), dt("2025-03-02 23:59:59"))
                .unwrap();

        assert_eq!(report.stats.doses_skipped, 1);
        assert_eq!(report.stats.doses_missed, 1);
        assert_eq!(report.stats.doses_taken, 1);
        // the skipped dose still breaks its day's perfection
        assert_eq!(report.daily_adherence[0].rate, 50.0);
        assert_eq!(report.daily_adherence[0].missed, 0);
    }

    #[test]
    fn period_rate_rounds_to_two_decimals() {
        let instances = vec![
            dose_on("2025-03-01 08:00:00", DoseStatus::Taken),
            dose_on("2025-03-01 14:00:00", DoseStatus::Taken),
            dose_on("2025-03-01 20:00:00", DoseStatus::Missed),
        ];
        let report =
            compute_adherence(&instances, 1, dt("2025-03-01 00:00:00"), dt("2025-03-01 23:59:59"))
                .unwrap();

        // 2/3 = 66.666...%
        assert_eq!(report.stats.adherence_rate, 66.67);
    }

    #[test]
    fn input_order_does_not_change_the_report() {
        let mut instances = vec![
            dose_on("2025-03-01 08:00:00", DoseStatus::Taken),
            dose_on("2025-03-01 20:00:00", DoseStatus::Taken),
            dose_on("2025-03-02 08:00:00", DoseStatus::Missed),
            dose_on("2025-03-03 08:00:00", DoseStatus::Taken),
            dose_on("2025-03-03 20:00:00", DoseStatus::Skipped),
        ];
        let start = dt("2025-03-01 00:00:00");
        let end = dt("2025-03-03 23:59:59");

        let forward = compute_adherence(&instances, 2, start, end).unwrap();
        instances.reverse();
        let reversed = compute_adherence(&instances, 2, start, end).unwrap();
        instances.swap(0, 3);
        let shuffled = compute_adherence(&instances, 2, start, end).unwrap();

        assert_eq!(forward.stats, reversed.stats);
        assert_eq!(forward.daily_adherence, reversed.daily_adherence);
        assert_eq!(forward.stats, shuffled.stats);
        assert_eq!(forward.daily_adherence, shuffled.daily_adherence);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = compute_adherence(&[], 0, dt("2025-03-05 00:00:00"), dt("2025-03-01 00:00:00"))
            .unwrap_err();
        assert!(matches!(err, AdherenceError::InvalidPeriod { .. }));

        // a single-instant period is fine
        assert!(
            compute_adherence(&[], 0, dt("2025-03-05 00:00:00"), dt("2025-03-05 00:00:00"))
                .is_ok()
        );
    }

    #[test]
    fn zero_scheduled_never_divides() {
        assert_eq!(rate_pct(0, 0), 0.0);
        assert_eq!(rate_pct(5, 0), 0.0);
        assert_eq!(rate_pct(1, 4), 25.0);
    }

    // ── Streaks ──────────────────────────────────────────────

    #[test]
    fn empty_sequence_has_no_streaks() {
        assert_eq!(calculate_streak(&[]), 0);
        assert_eq!(calculate_longest_streak(&[]), 0);
    }

    #[test]
    fn unbroken_run_counts_fully() {
        let daily = days(&[100.0, 100.0, 100.0]);
        assert_eq!(calculate_streak(&daily), 3);
        assert_eq!(calculate_longest_streak(&daily), 3);
    }

    #[test]
    fn run_after_a_gap() {
        let daily = days(&[100.0, 0.0, 100.0, 100.0]);
        assert_eq!(calculate_streak(&daily), 2);
        assert_eq!(calculate_longest_streak(&daily), 2);
    }

    #[test]
    fn trailing_gap_zeroes_current_streak() {
        let daily = days(&[100.0, 100.0, 0.0]);
        assert_eq!(calculate_streak(&daily), 0);
        assert_eq!(calculate_longest_streak(&daily), 2);
    }

    #[test]
    fn longest_run_before_current() {
        let daily = days(&[100.0, 100.0, 100.0, 0.0, 100.0, 100.0]);
        assert_eq!(calculate_streak(&daily), 2);
        assert_eq!(calculate_longest_streak(&daily), 3);
    }

    #[test]
    fn multiple_gaps() {
        let daily = days(&[100.0, 0.0, 100.0, 100.0, 0.0, 100.0, 100.0, 100.0, 0.0]);
        assert_eq!(calculate_streak(&daily), 0);
        assert_eq!(calculate_longest_streak(&daily), 3);
    }

    #[test]
    fn partial_day_breaks_streak() {
        let mut daily = days(&[100.0, 100.0]);
        daily.push(DailyAdherence {
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            scheduled: 2,
            taken: 1,
            missed: 1,
            rate: 50.0,
        });
        assert_eq!(calculate_streak(&daily), 0);
        assert_eq!(calculate_longest_streak(&daily), 2);
    }

    #[test]
    fn longest_streak_outlives_a_broken_current_one() {
        // perfect, perfect, broken: longest must stay 2 while current is 0
        let instances = vec![
            dose_on("2025-03-01 08:00:00", DoseStatus::Taken),
            dose_on("2025-03-02 08:00:00", DoseStatus::Taken),
            dose_on("2025-03-03 08:00:00", DoseStatus::Missed),
        ];
        let report =
            compute_adherence(&instances, 1, dt("2025-03-01 00:00:00"), dt("2025-03-03 23:59:59"))
                .unwrap();

        assert_eq!(report.stats.current_streak, 0);
        assert_eq!(report.stats.longest_streak, 2);
    }
}
