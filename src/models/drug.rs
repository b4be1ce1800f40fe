use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DosageForm;

/// Pharmacokinetic profile for a drug. Clients plot concentration
/// curves from the numeric fields, so these are numbers, not display
/// strings: time fields are hours, `bioavailability` and
/// `protein_binding` are percentages, `volume_distribution` is L/kg
/// and `clearance_rate` is mL/min.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pharmacokinetics {
    pub absorption_time: Option<f64>,
    pub peak_concentration_time: Option<f64>,
    pub half_life: Option<f64>,
    pub bioavailability: Option<f64>,
    pub protein_binding: Option<f64>,
    pub volume_distribution: Option<f64>,
    pub clearance_rate: Option<f64>,
    pub metabolism_pathway: Option<String>,
    pub excretion_route: Option<String>,
}

/// Catalog entry for a drug the user can schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drug {
    pub id: Uuid,
    pub name: String,
    pub active_ingredient: String,
    pub description: Option<String>,
    pub dosage_forms: Vec<DosageForm>,
    pub standard_dosages: Vec<String>,
    pub pharmacokinetics: Option<Pharmacokinetics>,
    pub interactions: Vec<String>,
    pub contraindications: Vec<String>,
    pub side_effects: Vec<String>,
    pub warnings: Vec<String>,
    pub category: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Create/replace payload for a drug entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DrugInput {
    pub name: String,
    pub active_ingredient: String,
    pub description: Option<String>,
    #[serde(default)]
    pub dosage_forms: Vec<DosageForm>,
    #[serde(default)]
    pub standard_dosages: Vec<String>,
    pub pharmacokinetics: Option<Pharmacokinetics>,
    #[serde(default)]
    pub interactions: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub category: Option<String>,
}
