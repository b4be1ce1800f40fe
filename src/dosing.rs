//! Dose generation: expands a medication schedule into concrete,
//! timestamped dose instances across a bounded horizon.

use chrono::{Duration, Local, NaiveTime};
use uuid::Uuid;

use crate::models::enums::DoseStatus;
use crate::models::{DoseLog, MedicationSchedule};

/// Upper bound on the generation horizon, in days.
pub const MAX_HORIZON_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DosingError {
    #[error("invalid time \"{value}\": expected HH:MM (24-hour)")]
    InvalidTime { value: String },

    #[error("horizon must be between 1 and 365 days, got {days}")]
    HorizonOutOfRange { days: u32 },
}

/// Parse a single "HH:MM" entry. Hour 00-23, minute 00-59, nothing else
/// accepted.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, DosingError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| DosingError::InvalidTime {
        value: value.to_string(),
    })
}

/// Validate a whole time-of-day list, reporting the first offending
/// entry. Used by callers that need to reject bad input before any
/// write happens.
pub fn validate_times(times: &[String]) -> Result<(), DosingError> {
    for time in times {
        parse_time_of_day(time)?;
    }
    Ok(())
}

/// Expand `schedule` into one dose instance per (day, time-of-day) pair
/// across `horizon_days` days starting at the schedule's start date.
///
/// Instances come out day-major: all of day 0 in the order the times are
/// listed, then day 1, and so on. Every instance starts as `scheduled`
/// with no actual time. An empty time list yields an empty batch. Any
/// malformed time entry fails the whole call before a single instance is
/// built — a partial batch is worse than none.
pub fn generate_doses(
    schedule: &MedicationSchedule,
    horizon_days: u32,
) -> Result<Vec<DoseLog>, DosingError> {
    if horizon_days == 0 || horizon_days > MAX_HORIZON_DAYS {
        return Err(DosingError::HorizonOutOfRange { days: horizon_days });
    }

    let mut times = Vec::with_capacity(schedule.specific_times.len());
    for raw in &schedule.specific_times {
        times.push(parse_time_of_day(raw)?);
    }

    let start_day = schedule.start_date.date();
    let now = Local::now().naive_local();

    let mut doses = Vec::with_capacity(times.len() * horizon_days as usize);
    for offset in 0..i64::from(horizon_days) {
        let day = start_day + Duration::days(offset);
        for time in &times {
            doses.push(DoseLog {
                id: Uuid::new_v4(),
                medication_id: schedule.id,
                drug_name: schedule.drug_name.clone(),
                dosage: schedule.dosage.clone(),
                scheduled_time: day.and_time(*time),
                actual_time: None,
                status: DoseStatus::Scheduled,
                notes: None,
                side_effects_reported: Vec::new(),
                created_at: now,
                updated_at: now,
            });
        }
    }

    Ok(doses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{DosageForm, FrequencyType};
    use chrono::{NaiveDateTime, Timelike};
    use std::collections::HashSet;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn schedule_with_times(times: &[&str]) -> MedicationSchedule {
        let now = dt("2025-03-01 09:00:00");
        MedicationSchedule {
            id: Uuid::new_v4(),
            drug_id: Uuid::new_v4(),
            drug_name: "Metformin".into(),
            dosage: "500mg".into(),
            dosage_form: DosageForm::Tablet,
            frequency: FrequencyType::TwiceDaily,
            custom_frequency: None,
            times_per_day: times.len() as u32,
            specific_times: times.iter().map(|t| t.to_string()).collect(),
            start_date: dt("2025-03-01 00:00:00"),
            end_date: None,
            duration_days: None,
            with_food: false,
            special_instructions: None,
            reminder_enabled: true,
            reminder_minutes_before: 15,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn produces_one_instance_per_day_time_pair() {
        let schedule = schedule_with_times(&["08:00", "14:00", "20:00"]);
        let doses = generate_doses(&schedule, 7).unwrap();

        assert_eq!(doses.len(), 21);
        for dose in &doses {
            assert_eq!(dose.status, DoseStatus::Scheduled);
            assert!(dose.actual_time.is_none());
            assert_eq!(dose.medication_id, schedule.id);
            assert_eq!(dose.drug_name, "Metformin");
            assert_eq!(dose.dosage, "500mg");
        }
    }

    #[test]
    fn day_major_order_follows_input_time_order() {
        // deliberately not ascending: output must follow the list order
        let schedule = schedule_with_times(&["20:00", "08:00"]);
        let doses = generate_doses(&schedule, 2).unwrap();

        let times: Vec<String> = doses
            .iter()
            .map(|d| d.scheduled_time.format("%Y-%m-%d %H:%M").to_string())
            .collect();
        assert_eq!(
            times,
            vec![
                "2025-03-01 20:00",
                "2025-03-01 08:00",
                "2025-03-02 20:00",
                "2025-03-02 08:00",
            ]
        );
    }

    #[test]
    fn scheduled_times_use_calendar_day_with_seconds_zeroed() {
        let mut schedule = schedule_with_times(&["08:30"]);
        // the start date's own clock time is irrelevant
        schedule.start_date = dt("2025-03-01 15:42:33");

        let doses = generate_doses(&schedule, 3).unwrap();
        assert_eq!(doses.len(), 3);
        assert_eq!(doses[0].scheduled_time, dt("2025-03-01 08:30:00"));
        assert_eq!(doses[1].scheduled_time, dt("2025-03-02 08:30:00"));
        assert_eq!(doses[2].scheduled_time, dt("2025-03-03 08:30:00"));
        for dose in &doses {
            assert_eq!(dose.scheduled_time.second(), 0);
        }
    }

    #[test]
    fn horizon_crosses_month_boundary() {
        let mut schedule = schedule_with_times(&["09:00"]);
        schedule.start_date = dt("2025-03-30 00:00:00");

        let doses = generate_doses(&schedule, 4).unwrap();
        let days: Vec<String> = doses
            .iter()
            .map(|d| d.scheduled_time.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(
            days,
            vec!["2025-03-30", "2025-03-31", "2025-04-01", "2025-04-02"]
        );
    }

    #[test]
    fn empty_time_list_yields_empty_batch() {
        // as-needed schedules have no fixed times; that is not an error
        let schedule = schedule_with_times(&[]);
        assert!(generate_doses(&schedule, 7).unwrap().is_empty());
    }

    #[test]
    fn malformed_time_fails_whole_call() {
        for bad in ["25:00", "08:61", "0800", "eight", "08:00:00", ""] {
            let schedule = schedule_with_times(&["08:00", bad]);
            let err = generate_doses(&schedule, 7).unwrap_err();
            assert_eq!(
                err,
                DosingError::InvalidTime {
                    value: bad.to_string()
                }
            );
        }
    }

    #[test]
    fn horizon_bounds_enforced() {
        let schedule = schedule_with_times(&["08:00"]);

        assert_eq!(
            generate_doses(&schedule, 0).unwrap_err(),
            DosingError::HorizonOutOfRange { days: 0 }
        );
        assert_eq!(
            generate_doses(&schedule, MAX_HORIZON_DAYS + 1).unwrap_err(),
            DosingError::HorizonOutOfRange { days: 366 }
        );
        assert_eq!(generate_doses(&schedule, 1).unwrap().len(), 1);
        assert_eq!(
            generate_doses(&schedule, MAX_HORIZON_DAYS).unwrap().len(),
            365
        );
    }

    #[test]
    fn instances_are_distinct_per_day_time_pair() {
        let schedule = schedule_with_times(&["08:00", "20:00"]);
        let doses = generate_doses(&schedule, 7).unwrap();

        let ids: HashSet<Uuid> = doses.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), doses.len());

        let slots: HashSet<NaiveDateTime> = doses.iter().map(|d| d.scheduled_time).collect();
        assert_eq!(slots.len(), doses.len());
    }

    #[test]
    fn validate_times_reports_first_offender() {
        assert!(validate_times(&["08:00".into(), "20:00".into()]).is_ok());
        assert!(validate_times(&[]).is_ok());

        let err = validate_times(&["08:00".into(), "24:30".into(), "99:99".into()]).unwrap_err();
        assert_eq!(
            err,
            DosingError::InvalidTime {
                value: "24:30".into()
            }
        );
    }
}
