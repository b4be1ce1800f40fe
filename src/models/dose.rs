use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DoseStatus;

/// One concrete scheduled occurrence of a dose.
///
/// `medication_id` is a lookup key back to the schedule, not an ownership
/// pointer; `drug_name` and `dosage` are denormalized for display without
/// a join. `actual_time` is set only when the status leaves `Scheduled`
/// through a user action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseLog {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub drug_name: String,
    pub dosage: String,
    pub scheduled_time: NaiveDateTime,
    pub actual_time: Option<NaiveDateTime>,
    pub status: DoseStatus,
    pub notes: Option<String>,
    pub side_effects_reported: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Create payload for logging a dose by hand (as-needed medications).
/// `scheduled_time` defaults to now, `status` to `Scheduled`.
#[derive(Debug, Clone, Deserialize)]
pub struct DoseInput {
    pub medication_id: Uuid,
    pub drug_name: String,
    pub dosage: String,
    pub scheduled_time: Option<NaiveDateTime>,
    pub actual_time: Option<NaiveDateTime>,
    pub status: Option<DoseStatus>,
    pub notes: Option<String>,
    #[serde(default)]
    pub side_effects_reported: Vec<String>,
}

/// Partial-update payload for a dose log. Absent (or null) fields are
/// left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoseUpdate {
    pub actual_time: Option<NaiveDateTime>,
    pub status: Option<DoseStatus>,
    pub notes: Option<String>,
    pub side_effects_reported: Option<Vec<String>>,
}
