use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

// ═══════════════════════════════════════════
// Column codecs
// ═══════════════════════════════════════════

/// Stored datetime format. Lexicographic order == chronological order,
/// which the range filters below rely on.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| DatabaseError::Corrupted {
            what: "datetime",
            detail: s.to_string(),
        })
}

fn parse_datetime_opt(s: Option<String>) -> Result<Option<NaiveDateTime>, DatabaseError> {
    s.map(|v| parse_datetime(&v)).transpose()
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::Corrupted {
        what: "uuid",
        detail: e.to_string(),
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Corrupted {
        what: "json list",
        detail: e.to_string(),
    })
}

fn from_json<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::Corrupted {
        what: "json list",
        detail: e.to_string(),
    })
}

// ═══════════════════════════════════════════
// Drug repository
// ═══════════════════════════════════════════

pub fn insert_drug(conn: &Connection, drug: &Drug) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO drugs (id, name, active_ingredient, description, dosage_forms,
         standard_dosages, pharmacokinetics, interactions, contraindications,
         side_effects, warnings, category, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            drug.id.to_string(),
            drug.name,
            drug.active_ingredient,
            drug.description,
            to_json(&drug.dosage_forms)?,
            to_json(&drug.standard_dosages)?,
            drug.pharmacokinetics.as_ref().map(to_json).transpose()?,
            to_json(&drug.interactions)?,
            to_json(&drug.contraindications)?,
            to_json(&drug.side_effects)?,
            to_json(&drug.warnings)?,
            drug.category,
            format_datetime(&drug.created_at),
            format_datetime(&drug.updated_at),
        ],
    )?;
    Ok(())
}

const DRUG_COLUMNS: &str = "id, name, active_ingredient, description, dosage_forms,
         standard_dosages, pharmacokinetics, interactions, contraindications,
         side_effects, warnings, category, created_at, updated_at";

pub fn get_drug(conn: &Connection, id: &Uuid) -> Result<Option<Drug>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE id = ?1"))?;

    let result = stmt.query_row(params![id.to_string()], drug_row);

    match result {
        Ok(row) => Ok(Some(drug_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch drugs with optional search (name or active ingredient, partial,
/// case-insensitive) and exact category filter. Sorted by name.
pub fn list_drugs(
    conn: &Connection,
    search: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<Drug>, DatabaseError> {
    let mut sql = format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE 1=1");

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(query) = search {
        if !query.trim().is_empty() {
            let pattern = format!("%{}%", query.trim());
            sql.push_str(&format!(
                " AND (name LIKE ?{p} COLLATE NOCASE
                   OR active_ingredient LIKE ?{p} COLLATE NOCASE)",
                p = param_idx
            ));
            params_vec.push(Box::new(pattern));
            param_idx += 1;
        }
    }

    if let Some(cat) = category {
        sql.push_str(&format!(" AND category = ?{param_idx}"));
        params_vec.push(Box::new(cat.to_string()));
    }

    sql.push_str(" ORDER BY name COLLATE NOCASE ASC");

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_refs.as_slice(), drug_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(drug_from_row).collect()
}

/// Replace all user-editable fields of a drug. `id` and `created_at`
/// are preserved; `updated_at` is bumped.
pub fn update_drug(
    conn: &Connection,
    id: &Uuid,
    input: &DrugInput,
    now: NaiveDateTime,
) -> Result<Drug, DatabaseError> {
    let changed = conn.execute(
        "UPDATE drugs SET name = ?2, active_ingredient = ?3, description = ?4,
         dosage_forms = ?5, standard_dosages = ?6, pharmacokinetics = ?7,
         interactions = ?8, contraindications = ?9, side_effects = ?10,
         warnings = ?11, category = ?12, updated_at = ?13
         WHERE id = ?1",
        params![
            id.to_string(),
            input.name,
            input.active_ingredient,
            input.description,
            to_json(&input.dosage_forms)?,
            to_json(&input.standard_dosages)?,
            input.pharmacokinetics.as_ref().map(to_json).transpose()?,
            to_json(&input.interactions)?,
            to_json(&input.contraindications)?,
            to_json(&input.side_effects)?,
            to_json(&input.warnings)?,
            input.category,
            format_datetime(&now),
        ],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Drug",
            id: id.to_string(),
        });
    }

    get_drug(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity: "Drug",
        id: id.to_string(),
    })
}

pub fn delete_drug(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM drugs WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Drug",
            id: id.to_string(),
        });
    }
    Ok(())
}

// Internal row type for Drug mapping
struct DrugRow {
    id: String,
    name: String,
    active_ingredient: String,
    description: Option<String>,
    dosage_forms: String,
    standard_dosages: String,
    pharmacokinetics: Option<String>,
    interactions: String,
    contraindications: String,
    side_effects: String,
    warnings: String,
    category: Option<String>,
    created_at: String,
    updated_at: String,
}

fn drug_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DrugRow> {
    Ok(DrugRow {
        id: row.get(0)?,
        name: row.get(1)?,
        active_ingredient: row.get(2)?,
        description: row.get(3)?,
        dosage_forms: row.get(4)?,
        standard_dosages: row.get(5)?,
        pharmacokinetics: row.get(6)?,
        interactions: row.get(7)?,
        contraindications: row.get(8)?,
        side_effects: row.get(9)?,
        warnings: row.get(10)?,
        category: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn drug_from_row(row: DrugRow) -> Result<Drug, DatabaseError> {
    Ok(Drug {
        id: parse_uuid(&row.id)?,
        name: row.name,
        active_ingredient: row.active_ingredient,
        description: row.description,
        dosage_forms: from_json(&row.dosage_forms)?,
        standard_dosages: from_json(&row.standard_dosages)?,
        pharmacokinetics: row.pharmacokinetics.as_deref().map(from_json).transpose()?,
        interactions: from_json(&row.interactions)?,
        contraindications: from_json(&row.contraindications)?,
        side_effects: from_json(&row.side_effects)?,
        warnings: from_json(&row.warnings)?,
        category: row.category,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

// ═══════════════════════════════════════════
// Schedule repository
// ═══════════════════════════════════════════

pub fn insert_schedule(
    conn: &Connection,
    schedule: &MedicationSchedule,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medication_schedules (id, drug_id, drug_name, dosage, dosage_form,
         frequency, custom_frequency, times_per_day, specific_times, start_date,
         end_date, duration_days, with_food, special_instructions, reminder_enabled,
         reminder_minutes_before, active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            schedule.id.to_string(),
            schedule.drug_id.to_string(),
            schedule.drug_name,
            schedule.dosage,
            schedule.dosage_form.as_str(),
            schedule.frequency.as_str(),
            schedule.custom_frequency,
            schedule.times_per_day,
            to_json(&schedule.specific_times)?,
            format_datetime(&schedule.start_date),
            schedule.end_date.as_ref().map(format_datetime),
            schedule.duration_days,
            schedule.with_food as i32,
            schedule.special_instructions,
            schedule.reminder_enabled as i32,
            schedule.reminder_minutes_before,
            schedule.active as i32,
            format_datetime(&schedule.created_at),
            format_datetime(&schedule.updated_at),
        ],
    )?;
    Ok(())
}

const SCHEDULE_COLUMNS: &str = "id, drug_id, drug_name, dosage, dosage_form,
         frequency, custom_frequency, times_per_day, specific_times, start_date,
         end_date, duration_days, with_food, special_instructions, reminder_enabled,
         reminder_minutes_before, active, created_at, updated_at";

pub fn get_schedule(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<MedicationSchedule>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM medication_schedules WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], schedule_row);

    match result {
        Ok(row) => Ok(Some(schedule_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch schedules, newest first. `active_only` hides deactivated ones.
pub fn list_schedules(
    conn: &Connection,
    active_only: bool,
) -> Result<Vec<MedicationSchedule>, DatabaseError> {
    let mut sql = format!("SELECT {SCHEDULE_COLUMNS} FROM medication_schedules");
    if active_only {
        sql.push_str(" WHERE active = 1");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], schedule_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(schedule_from_row).collect()
}

pub fn count_active_schedules(conn: &Connection) -> Result<u32, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM medication_schedules WHERE active = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Apply a partial update to a schedule. Only the provided columns are
/// written, in one UPDATE statement; absent fields keep their stored
/// value even when another writer touches the row between calls.
/// `updated_at` is always bumped. Returns the updated row.
pub fn update_schedule(
    conn: &Connection,
    id: &Uuid,
    update: &ScheduleUpdate,
    now: NaiveDateTime,
) -> Result<MedicationSchedule, DatabaseError> {
    let mut sets: Vec<String> = Vec::new();
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(drug_name) = &update.drug_name {
        sets.push(format!("drug_name = ?{param_idx}"));
        params_vec.push(Box::new(drug_name.clone()));
        param_idx += 1;
    }
    if let Some(dosage) = &update.dosage {
        sets.push(format!("dosage = ?{param_idx}"));
        params_vec.push(Box::new(dosage.clone()));
        param_idx += 1;
    }
    if let Some(frequency) = update.frequency {
        sets.push(format!("frequency = ?{param_idx}"));
        params_vec.push(Box::new(frequency.as_str()));
        param_idx += 1;
    }
    if let Some(custom_frequency) = &update.custom_frequency {
        sets.push(format!("custom_frequency = ?{param_idx}"));
        params_vec.push(Box::new(custom_frequency.clone()));
        param_idx += 1;
    }
    if let Some(times_per_day) = update.times_per_day {
        sets.push(format!("times_per_day = ?{param_idx}"));
        params_vec.push(Box::new(times_per_day));
        param_idx += 1;
    }
    if let Some(specific_times) = &update.specific_times {
        sets.push(format!("specific_times = ?{param_idx}"));
        params_vec.push(Box::new(to_json(specific_times)?));
        param_idx += 1;
    }
    if let Some(end_date) = &update.end_date {
        sets.push(format!("end_date = ?{param_idx}"));
        params_vec.push(Box::new(format_datetime(end_date)));
        param_idx += 1;
    }
    if let Some(duration_days) = update.duration_days {
        sets.push(format!("duration_days = ?{param_idx}"));
        params_vec.push(Box::new(duration_days));
        param_idx += 1;
    }
    if let Some(with_food) = update.with_food {
        sets.push(format!("with_food = ?{param_idx}"));
        params_vec.push(Box::new(with_food as i32));
        param_idx += 1;
    }
    if let Some(special_instructions) = &update.special_instructions {
        sets.push(format!("special_instructions = ?{param_idx}"));
        params_vec.push(Box::new(special_instructions.clone()));
        param_idx += 1;
    }
    if let Some(reminder_enabled) = update.reminder_enabled {
        sets.push(format!("reminder_enabled = ?{param_idx}"));
        params_vec.push(Box::new(reminder_enabled as i32));
        param_idx += 1;
    }
    if let Some(reminder_minutes_before) = update.reminder_minutes_before {
        sets.push(format!("reminder_minutes_before = ?{param_idx}"));
        params_vec.push(Box::new(reminder_minutes_before));
        param_idx += 1;
    }
    if let Some(active) = update.active {
        sets.push(format!("active = ?{param_idx}"));
        params_vec.push(Box::new(active as i32));
        param_idx += 1;
    }
    sets.push(format!("updated_at = ?{param_idx}"));
    params_vec.push(Box::new(format_datetime(&now)));
    param_idx += 1;

    let sql = format!(
        "UPDATE medication_schedules SET {} WHERE id = ?{param_idx}",
        sets.join(", ")
    );
    params_vec.push(Box::new(id.to_string()));

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let changed = conn.execute(&sql, params_refs.as_slice())?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity: "MedicationSchedule",
            id: id.to_string(),
        });
    }

    get_schedule(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity: "MedicationSchedule",
        id: id.to_string(),
    })
}

/// Delete a schedule and its dose logs. Returns how many dose logs went
/// with it. The cascade is explicit: dose_logs.medication_id is a lookup
/// key, not a foreign key.
pub fn delete_schedule_cascade(conn: &Connection, id: &Uuid) -> Result<u32, DatabaseError> {
    let id_str = id.to_string();

    let tx = conn.unchecked_transaction()?;
    let removed_logs = tx.execute(
        "DELETE FROM dose_logs WHERE medication_id = ?1",
        params![id_str],
    )?;
    let deleted = tx.execute(
        "DELETE FROM medication_schedules WHERE id = ?1",
        params![id_str],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity: "MedicationSchedule",
            id: id_str,
        });
    }
    tx.commit()?;

    Ok(removed_logs as u32)
}

// Internal row type for MedicationSchedule mapping
struct ScheduleRow {
    id: String,
    drug_id: String,
    drug_name: String,
    dosage: String,
    dosage_form: String,
    frequency: String,
    custom_frequency: Option<String>,
    times_per_day: u32,
    specific_times: String,
    start_date: String,
    end_date: Option<String>,
    duration_days: Option<u32>,
    with_food: i32,
    special_instructions: Option<String>,
    reminder_enabled: i32,
    reminder_minutes_before: u32,
    active: i32,
    created_at: String,
    updated_at: String,
}

fn schedule_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduleRow> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        drug_id: row.get(1)?,
        drug_name: row.get(2)?,
        dosage: row.get(3)?,
        dosage_form: row.get(4)?,
        frequency: row.get(5)?,
        custom_frequency: row.get(6)?,
        times_per_day: row.get(7)?,
        specific_times: row.get(8)?,
        start_date: row.get(9)?,
        end_date: row.get(10)?,
        duration_days: row.get(11)?,
        with_food: row.get(12)?,
        special_instructions: row.get(13)?,
        reminder_enabled: row.get(14)?,
        reminder_minutes_before: row.get(15)?,
        active: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

fn schedule_from_row(row: ScheduleRow) -> Result<MedicationSchedule, DatabaseError> {
    Ok(MedicationSchedule {
        id: parse_uuid(&row.id)?,
        drug_id: parse_uuid(&row.drug_id)?,
        drug_name: row.drug_name,
        dosage: row.dosage,
        dosage_form: DosageForm::from_str(&row.dosage_form)?,
        frequency: FrequencyType::from_str(&row.frequency)?,
        custom_frequency: row.custom_frequency,
        times_per_day: row.times_per_day,
        specific_times: from_json(&row.specific_times)?,
        start_date: parse_datetime(&row.start_date)?,
        end_date: parse_datetime_opt(row.end_date)?,
        duration_days: row.duration_days,
        with_food: row.with_food != 0,
        special_instructions: row.special_instructions,
        reminder_enabled: row.reminder_enabled != 0,
        reminder_minutes_before: row.reminder_minutes_before,
        active: row.active != 0,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

// ═══════════════════════════════════════════
// Dose log repository
// ═══════════════════════════════════════════

pub fn insert_dose_log(conn: &Connection, dose: &DoseLog) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO dose_logs (id, medication_id, drug_name, dosage, scheduled_time,
         actual_time, status, notes, side_effects_reported, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            dose.id.to_string(),
            dose.medication_id.to_string(),
            dose.drug_name,
            dose.dosage,
            format_datetime(&dose.scheduled_time),
            dose.actual_time.as_ref().map(format_datetime),
            dose.status.as_str(),
            dose.notes,
            to_json(&dose.side_effects_reported)?,
            format_datetime(&dose.created_at),
            format_datetime(&dose.updated_at),
        ],
    )?;
    Ok(())
}

/// Insert a generated batch of dose logs atomically. All-or-nothing:
/// generation output is only useful as a complete set.
pub fn insert_dose_logs(conn: &Connection, doses: &[DoseLog]) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO dose_logs (id, medication_id, drug_name, dosage, scheduled_time,
             actual_time, status, notes, side_effects_reported, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for dose in doses {
            stmt.execute(params![
                dose.id.to_string(),
                dose.medication_id.to_string(),
                dose.drug_name,
                dose.dosage,
                format_datetime(&dose.scheduled_time),
                dose.actual_time.as_ref().map(format_datetime),
                dose.status.as_str(),
                dose.notes,
                to_json(&dose.side_effects_reported)?,
                format_datetime(&dose.created_at),
                format_datetime(&dose.updated_at),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

const DOSE_COLUMNS: &str = "id, medication_id, drug_name, dosage, scheduled_time,
         actual_time, status, notes, side_effects_reported, created_at, updated_at";

pub fn get_dose_log(conn: &Connection, id: &Uuid) -> Result<Option<DoseLog>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {DOSE_COLUMNS} FROM dose_logs WHERE id = ?1"))?;

    let result = stmt.query_row(params![id.to_string()], dose_row);

    match result {
        Ok(row) => Ok(Some(dose_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Filter parameters for the dose log list.
#[derive(Debug, Clone, Default)]
pub struct DoseLogFilter {
    pub medication_id: Option<Uuid>,
    pub status: Option<DoseStatus>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

/// Fetch dose logs with dynamic filters, most recent scheduled first.
/// Range bounds are inclusive. Capped at 1000 rows — this is a display
/// query; the aggregation path uses `list_dose_logs_in_period`.
pub fn list_dose_logs(
    conn: &Connection,
    filter: &DoseLogFilter,
) -> Result<Vec<DoseLog>, DatabaseError> {
    let mut sql = format!("SELECT {DOSE_COLUMNS} FROM dose_logs WHERE 1=1");

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(medication_id) = &filter.medication_id {
        sql.push_str(&format!(" AND medication_id = ?{param_idx}"));
        params_vec.push(Box::new(medication_id.to_string()));
        param_idx += 1;
    }

    if let Some(status) = filter.status {
        sql.push_str(&format!(" AND status = ?{param_idx}"));
        params_vec.push(Box::new(status.as_str()));
        param_idx += 1;
    }

    if let Some(from) = &filter.from {
        sql.push_str(&format!(" AND scheduled_time >= ?{param_idx}"));
        params_vec.push(Box::new(format_datetime(from)));
        param_idx += 1;
    }

    if let Some(to) = &filter.to {
        sql.push_str(&format!(" AND scheduled_time <= ?{param_idx}"));
        params_vec.push(Box::new(format_datetime(to)));
    }

    sql.push_str(" ORDER BY scheduled_time DESC LIMIT 1000");

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_refs.as_slice(), dose_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(dose_from_row).collect()
}

/// Fetch every dose log scheduled within `[from, to]`, both ends
/// inclusive, ascending. Input to adherence aggregation — no row cap.
pub fn list_dose_logs_in_period(
    conn: &Connection,
    from: &NaiveDateTime,
    to: &NaiveDateTime,
) -> Result<Vec<DoseLog>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOSE_COLUMNS} FROM dose_logs
         WHERE scheduled_time >= ?1 AND scheduled_time <= ?2
         ORDER BY scheduled_time ASC"
    ))?;

    let rows = stmt
        .query_map(
            params![format_datetime(from), format_datetime(to)],
            dose_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(dose_from_row).collect()
}

/// Apply a partial update to a dose log. Only the provided columns are
/// written, in one UPDATE statement; absent fields keep their stored
/// value even when another writer touches the row between calls.
/// Returns the updated row.
pub fn update_dose_log(
    conn: &Connection,
    id: &Uuid,
    update: &DoseUpdate,
    now: NaiveDateTime,
) -> Result<DoseLog, DatabaseError> {
    let mut sets: Vec<String> = Vec::new();
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(actual_time) = &update.actual_time {
        sets.push(format!("actual_time = ?{param_idx}"));
        params_vec.push(Box::new(format_datetime(actual_time)));
        param_idx += 1;
    }
    if let Some(status) = update.status {
        sets.push(format!("status = ?{param_idx}"));
        params_vec.push(Box::new(status.as_str()));
        param_idx += 1;
    }
    if let Some(notes) = &update.notes {
        sets.push(format!("notes = ?{param_idx}"));
        params_vec.push(Box::new(notes.clone()));
        param_idx += 1;
    }
    if let Some(side_effects) = &update.side_effects_reported {
        sets.push(format!("side_effects_reported = ?{param_idx}"));
        params_vec.push(Box::new(to_json(side_effects)?));
        param_idx += 1;
    }
    sets.push(format!("updated_at = ?{param_idx}"));
    params_vec.push(Box::new(format_datetime(&now)));
    param_idx += 1;

    let sql = format!(
        "UPDATE dose_logs SET {} WHERE id = ?{param_idx}",
        sets.join(", ")
    );
    params_vec.push(Box::new(id.to_string()));

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let changed = conn.execute(&sql, params_refs.as_slice())?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity: "DoseLog",
            id: id.to_string(),
        });
    }

    get_dose_log(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity: "DoseLog",
        id: id.to_string(),
    })
}

/// Mark a dose as taken at `now`, optionally replacing its note. One
/// UPDATE statement; a `None` note keeps the stored note via COALESCE.
/// Idempotent in effect: a repeat call leaves status `taken` and moves
/// `actual_time` forward to the latest call.
pub fn mark_dose_taken(
    conn: &Connection,
    id: &Uuid,
    notes: Option<&str>,
    now: NaiveDateTime,
) -> Result<DoseLog, DatabaseError> {
    let changed = conn.execute(
        "UPDATE dose_logs SET status = ?2, actual_time = ?3,
         notes = COALESCE(?4, notes), updated_at = ?5
         WHERE id = ?1",
        params![
            id.to_string(),
            DoseStatus::Taken.as_str(),
            format_datetime(&now),
            notes,
            format_datetime(&now),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity: "DoseLog",
            id: id.to_string(),
        });
    }

    get_dose_log(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity: "DoseLog",
        id: id.to_string(),
    })
}

// Internal row type for DoseLog mapping
struct DoseRow {
    id: String,
    medication_id: String,
    drug_name: String,
    dosage: String,
    scheduled_time: String,
    actual_time: Option<String>,
    status: String,
    notes: Option<String>,
    side_effects_reported: String,
    created_at: String,
    updated_at: String,
}

fn dose_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DoseRow> {
    Ok(DoseRow {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        drug_name: row.get(2)?,
        dosage: row.get(3)?,
        scheduled_time: row.get(4)?,
        actual_time: row.get(5)?,
        status: row.get(6)?,
        notes: row.get(7)?,
        side_effects_reported: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn dose_from_row(row: DoseRow) -> Result<DoseLog, DatabaseError> {
    Ok(DoseLog {
        id: parse_uuid(&row.id)?,
        medication_id: parse_uuid(&row.medication_id)?,
        drug_name: row.drug_name,
        dosage: row.dosage,
        scheduled_time: parse_datetime(&row.scheduled_time)?,
        actual_time: parse_datetime_opt(row.actual_time)?,
        status: DoseStatus::from_str(&row.status)?,
        notes: row.notes,
        side_effects_reported: from_json(&row.side_effects_reported)?,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
