use crate::config::EventCalendar;
use crate::models::planning_model::PlanningErr;
use chrono::{NaiveDate, NaiveTime, Timelike};
use scheduler::{ClassRegistration, ClockTime, DayPart, Institution};
use sqlx::{FromRow, Pool, Postgres};
use std::collections::{BTreeMap, HashMap};
use tracing::{trace, warn};

#[derive(Debug, Clone, FromRow)]
pub struct InstitutionRow {
    pub id: String,
    pub name: String,
    pub visit_address: String,
    pub capacity_per_slot: i32,
    pub program_duration: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct AvailabilityRow {
    pub institution_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub is_available: bool,
}

/// A class joined with the teacher who registered it.
#[derive(Debug, Clone, FromRow)]
pub struct ClassRow {
    pub id: String,
    pub teacher_name: String,
    pub college: String,
    pub school_address: String,
    pub class_name: String,
    pub student_count: String,
    pub year: i32,
    pub previous_visits: Option<String>,
    pub preferred_day: Option<String>,
    pub preferred_time_slot: Option<String>,
    pub activity_count: i32,
}

pub fn clock_time(time: NaiveTime) -> Result<ClockTime, PlanningErr> {
    ClockTime::from_hm(time.hour(), time.minute()).map_err(|e| PlanningErr::InvalidInput(e.to_string()))
}

/// Groups offered start times per institution and date.
///
/// Rows marked unavailable are dropped. Times on a date come out sorted
/// without duplicates.
pub fn availability_from_rows(
    rows: &[AvailabilityRow],
) -> Result<HashMap<String, BTreeMap<NaiveDate, Vec<ClockTime>>>, PlanningErr> {
    let mut availability: HashMap<String, BTreeMap<NaiveDate, Vec<ClockTime>>> = HashMap::new();
    for row in rows.iter().filter(|row| row.is_available) {
        availability
            .entry(row.institution_id.clone())
            .or_default()
            .entry(row.date)
            .or_default()
            .push(clock_time(row.start_time)?);
    }

    for times in availability.values_mut().flat_map(|dates| dates.values_mut()) {
        times.sort();
        times.dedup();
    }
    Ok(availability)
}

/// Splits the free-text list of previously visited institutions.
pub fn parse_previous_visits(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|visit| !visit.is_empty())
        .map(String::from)
        .collect()
}

pub fn institution_from_row(
    row: InstitutionRow,
    availability: &mut HashMap<String, BTreeMap<NaiveDate, Vec<ClockTime>>>,
) -> Result<Institution, PlanningErr> {
    let capacity = u32::try_from(row.capacity_per_slot)
        .map_err(|_| PlanningErr::InvalidInput(format!("institution {} has a negative capacity", row.id)))?;
    let duration = u32::try_from(row.program_duration)
        .map_err(|_| PlanningErr::InvalidInput(format!("institution {} has a negative duration", row.id)))?;

    Ok(Institution {
        availability: availability.remove(&row.id).unwrap_or_default(),
        id: row.id,
        name: row.name,
        address: row.visit_address,
        capacity,
        duration,
    })
}

pub fn class_from_row(row: ClassRow, calendar: &EventCalendar) -> Result<ClassRegistration, PlanningErr> {
    let activity_count = u8::try_from(row.activity_count).map_err(|_| {
        PlanningErr::InvalidInput(format!("class {} asks for {} activities", row.id, row.activity_count))
    })?;

    let preferred_day = row.preferred_day.as_deref().unwrap_or_default();
    let selected_day = calendar.resolve_day(preferred_day);
    if selected_day.is_none() && !preferred_day.trim().is_empty() {
        warn!("class {}: ignoring unknown day preference {preferred_day:?}", row.id);
    }

    // A day-part preference only applies to single visits.
    let day_part = match row.preferred_time_slot.as_deref() {
        Some(slot) if activity_count == 1 && !slot.trim().is_empty() => match slot.parse::<DayPart>() {
            Ok(day_part) => Some(day_part),
            Err(e) => {
                warn!("class {}: {e}", row.id);
                None
            }
        },
        _ => None,
    };

    Ok(ClassRegistration {
        previous_visits: row.previous_visits.as_deref().map(parse_previous_visits).unwrap_or_default(),
        id: row.id,
        teacher_name: row.teacher_name,
        college: row.college,
        school_address: row.school_address,
        class_name: row.class_name,
        student_count: row.student_count,
        year: row.year.to_string(),
        selected_day,
        activity_count,
        day_part,
    })
}

/// Loads every institution with its open slots, in registration order.
pub async fn institutions_get(db_pool: &Pool<Postgres>) -> Result<Vec<Institution>, PlanningErr> {
    let rows = sqlx::query_as::<Postgres, InstitutionRow>(
        r#"
        SELECT id, name, visit_address, capacity_per_slot, program_duration
        FROM institutions
        ORDER BY created_at, id"#,
    )
    .fetch_all(db_pool)
    .await?;

    let availability_rows = sqlx::query_as::<Postgres, AvailabilityRow>(
        r#"
        SELECT institution_id, date, start_time, is_available
        FROM institution_availability
        ORDER BY institution_id, date, start_time"#,
    )
    .fetch_all(db_pool)
    .await?;
    trace!("{} institutions, {} availability rows", rows.len(), availability_rows.len());

    let mut availability = availability_from_rows(&availability_rows)?;
    rows.into_iter()
        .map(|row| institution_from_row(row, &mut availability))
        .collect()
}

/// Loads every registered class, in registration order.
pub async fn classes_get(db_pool: &Pool<Postgres>, calendar: &EventCalendar) -> Result<Vec<ClassRegistration>, PlanningErr> {
    let rows = sqlx::query_as::<Postgres, ClassRow>(
        r#"
        SELECT
            c.id,
            t.name AS teacher_name,
            t.college,
            t.address AS school_address,
            c.class_name,
            c.student_count,
            c.year,
            c.previous_visits,
            c.preferred_day,
            c.preferred_time_slot,
            c.activity_count
        FROM classes c
        JOIN teachers t ON t.id = c.teacher_id
        ORDER BY c.created_at, c.id"#,
    )
    .fetch_all(db_pool)
    .await?;
    trace!("{} classes", rows.len());

    rows.into_iter().map(|row| class_from_row(row, calendar)).collect()
}
