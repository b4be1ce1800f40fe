use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DosageForm, FrequencyType};

/// A recurring dosing schedule the user created for a drug.
///
/// `frequency` is advisory metadata; `specific_times` is the authoritative
/// recurrence source (clock times as `"HH:MM"`, used by dose generation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationSchedule {
    pub id: Uuid,
    pub drug_id: Uuid,
    pub drug_name: String,
    pub dosage: String,
    pub dosage_form: DosageForm,
    pub frequency: FrequencyType,
    pub custom_frequency: Option<String>,
    pub times_per_day: u32,
    pub specific_times: Vec<String>,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub duration_days: Option<u32>,
    pub with_food: bool,
    pub special_instructions: Option<String>,
    pub reminder_enabled: bool,
    pub reminder_minutes_before: u32,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Create payload for a schedule. `start_date` defaults to now when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInput {
    pub drug_id: Uuid,
    pub drug_name: String,
    pub dosage: String,
    pub dosage_form: DosageForm,
    pub frequency: FrequencyType,
    pub custom_frequency: Option<String>,
    #[serde(default = "default_times_per_day")]
    pub times_per_day: u32,
    #[serde(default)]
    pub specific_times: Vec<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub with_food: bool,
    pub special_instructions: Option<String>,
    #[serde(default = "default_reminder_enabled")]
    pub reminder_enabled: bool,
    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes_before: u32,
}

fn default_times_per_day() -> u32 {
    1
}

fn default_reminder_enabled() -> bool {
    true
}

fn default_reminder_minutes() -> u32 {
    15
}

/// Partial-update payload for a schedule. Absent (or null) fields are
/// left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleUpdate {
    pub drug_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<FrequencyType>,
    pub custom_frequency: Option<String>,
    pub times_per_day: Option<u32>,
    pub specific_times: Option<Vec<String>>,
    pub end_date: Option<NaiveDateTime>,
    pub duration_days: Option<u32>,
    pub with_food: Option<bool>,
    pub special_instructions: Option<String>,
    pub reminder_enabled: Option<bool>,
    pub reminder_minutes_before: Option<u32>,
    pub active: Option<bool>,
}
