use crate::config::{EventCalendar, PlanningSettings};
use crate::models::registration_model::{classes_get, clock_time, institutions_get};
use crate::types::ApiStatusCode;
use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use chrono::{NaiveDate, NaiveTime};
use scheduler::{
    Assignment, ClassRegistration, InputError, Institution, Schedule, ScoringWeights, generate_schedule_with,
};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};
use sqlx::{FromRow, Pool, Postgres};
use std::collections::HashMap;
use tracing::{debug, info, trace};

/// An enumeration of errors that may occur
#[derive(Debug, thiserror::Error, Serialize)]
pub enum PlanningErr {
    #[error("Planning io failed: {0}")]
    IoError(String),
    #[error("{0} doesn't exist")]
    DoesNotExist(String),
    #[error("Invalid planning input: {0}")]
    InvalidInput(String),
    #[error("Planning run did not finish: {0}")]
    Aborted(String),
}

impl PlanningErr {
    pub fn status(&self) -> StatusCode {
        match self {
            PlanningErr::IoError(_) | PlanningErr::Aborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlanningErr::DoesNotExist(_) => StatusCode::NOT_FOUND,
            PlanningErr::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<sqlx::Error> for PlanningErr {
    fn from(e: sqlx::Error) -> Self {
        PlanningErr::IoError(e.to_string())
    }
}

impl From<InputError> for PlanningErr {
    fn from(e: InputError) -> Self {
        PlanningErr::InvalidInput(e.to_string())
    }
}

impl From<tokio::task::JoinError> for PlanningErr {
    fn from(e: tokio::task::JoinError) -> Self {
        PlanningErr::Aborted(e.to_string())
    }
}

/// struct that represents a planning error, but include a `StatusCode`
/// in addition to a `PlanningErr`
#[derive(Debug)]
pub struct PlanningError {
    pub status: ApiStatusCode,
    pub error: String,
}

/// Implements the `Serialize` trait for `PlanningError`
impl Serialize for PlanningError {
    /// Serializes a `PlanningError`
    ///
    /// The serialized JSON object will have two properties:
    ///
    /// * `status`: A string for the HTTP status code
    /// * `error`: A string describing the error
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let status: String = self.status.to_string();
        let mut state = serializer.serialize_struct("PlanningError", 2)?;
        state.serialize_field("status", &status)?;
        state.serialize_field("error", &self.error)?;
        state.end()
    }
}

impl PlanningError {
    /// Creates a `Response` instance from a `StatusCode` and `PlanningErr`.
    ///
    /// # Parameters
    ///
    /// * `status`: The HTTP status code.
    /// * `error`: The `PlanningErr` instance.
    ///
    /// # Returns
    ///
    /// `Response` instance with the status code and JSON body containing the error.
    pub fn response(status: ApiStatusCode, error: PlanningErr) -> Response {
        let error = PlanningError {
            status,
            error: error.to_string(),
        };
        (status.as_status_code(), Json(error)).into_response()
    }
}

impl IntoResponse for PlanningErr {
    fn into_response(self) -> Response {
        PlanningError::response(ApiStatusCode::from(self.status()), self)
    }
}

/// Input for a planning run that is not stored anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub institutions: Vec<Institution>,
    pub classes: Vec<ClassRegistration>,
}

/// A stored visit as read back from the `planning` table.
#[derive(Debug, Clone, FromRow)]
pub struct PlanningRow {
    pub class_id: String,
    pub institution_id: String,
    pub visit_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl PlanningRow {
    pub fn into_assignment(self) -> Result<Assignment, PlanningErr> {
        let duration = u32::try_from((self.end_time - self.start_time).num_minutes()).map_err(|_| {
            PlanningErr::InvalidInput(format!("stored visit of class {} ends before it starts", self.class_id))
        })?;
        Ok(Assignment {
            time: clock_time(self.start_time)?,
            class_id: self.class_id,
            institution_id: self.institution_id,
            date: self.visit_date,
            duration,
        })
    }
}

/// Everything the export views need, loaded in one go.
#[derive(Debug, Clone)]
pub struct PlanningSnapshot {
    pub institutions: Vec<Institution>,
    pub classes: Vec<ClassRegistration>,
    pub assignments: Vec<Assignment>,
}

fn naive_time(minutes: u32) -> Result<NaiveTime, PlanningErr> {
    minutes
        .checked_mul(60)
        .and_then(|seconds| NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0))
        .ok_or_else(|| PlanningErr::InvalidInput(format!("visit would end after midnight ({minutes} minutes)")))
}

/// Numbers each class's visits 1, 2 in the order they were booked.
pub fn activity_orders(assignments: &[Assignment]) -> Vec<i32> {
    let mut seen: HashMap<&str, i32> = HashMap::new();
    assignments
        .iter()
        .map(|assignment| {
            let order = seen.entry(assignment.class_id.as_str()).or_insert(0);
            *order += 1;
            *order
        })
        .collect()
}

/// Runs the planner off the async runtime.
///
/// # Errors
/// Returns `PlanningErr::InvalidInput` for malformed input and
/// `PlanningErr::Aborted` if the planning task panicked.
pub async fn run_planner(
    institutions: Vec<Institution>,
    classes: Vec<ClassRegistration>,
    weights: ScoringWeights,
) -> Result<Schedule, PlanningErr> {
    let schedule =
        tokio::task::spawn_blocking(move || generate_schedule_with(&institutions, &classes, &weights)).await??;
    Ok(schedule)
}

/// Plans a week from posted data without touching the database.
pub async fn planning_preview(request: PreviewRequest, weights: ScoringWeights) -> Result<Schedule, PlanningErr> {
    debug!(
        "previewing planning for {} institutions and {} classes",
        request.institutions.len(),
        request.classes.len()
    );
    run_planner(request.institutions, request.classes, weights).await
}

/// Plans the registered classes and replaces the stored planning.
///
/// # Returns
/// The new `Schedule`, including the conflicts that were not stored.
///
/// # Errors
/// Returns a `PlanningErr` if loading, planning or storing fails. A failed
/// store leaves the previous planning in place.
pub async fn planning_generate(db_pool: &Pool<Postgres>, settings: &PlanningSettings) -> Result<Schedule, PlanningErr> {
    let institutions = institutions_get(db_pool).await?;
    let classes = classes_get(db_pool, &settings.calendar).await?;
    info!("planning {} classes over {} institutions", classes.len(), institutions.len());

    let schedule = run_planner(institutions, classes, settings.weights).await?;
    planning_store(db_pool, &schedule.assignments).await?;
    Ok(schedule)
}

/// Replaces every stored visit with `assignments` in one transaction.
pub async fn planning_store(db_pool: &Pool<Postgres>, assignments: &[Assignment]) -> Result<(), PlanningErr> {
    let mut transaction = db_pool.begin().await?;
    sqlx::query("DELETE FROM planning").execute(&mut *transaction).await?;

    for (assignment, order) in assignments.iter().zip(activity_orders(assignments)) {
        sqlx::query(
            r#"
            INSERT INTO planning
                (class_id, institution_id, visit_date, start_time, end_time, activity_order, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            "#,
        )
        .bind(&assignment.class_id)
        .bind(&assignment.institution_id)
        .bind(assignment.date)
        .bind(naive_time(assignment.time.minutes())?)
        .bind(naive_time(assignment.end_minutes())?)
        .bind(order)
        .execute(&mut *transaction)
        .await?;
    }

    transaction.commit().await?;
    debug!("stored {} planned visits", assignments.len());
    Ok(())
}

pub async fn planning_clear(db_pool: &Pool<Postgres>) -> Result<u64, PlanningErr> {
    let result = sqlx::query("DELETE FROM planning").execute(db_pool).await?;
    info!("cleared {} planned visits", result.rows_affected());
    Ok(result.rows_affected())
}

/// Reads the stored planning back as assignments.
pub async fn assignments_get(db_pool: &Pool<Postgres>) -> Result<Vec<Assignment>, PlanningErr> {
    let rows = sqlx::query_as::<Postgres, PlanningRow>(
        r#"
        SELECT class_id, institution_id, visit_date, start_time, end_time
        FROM planning
        WHERE status <> 'cancelled'
        ORDER BY visit_date, start_time, activity_order"#,
    )
    .fetch_all(db_pool)
    .await?;
    trace!("planning rows: {:?}", &rows);

    rows.into_iter().map(PlanningRow::into_assignment).collect()
}

pub async fn planning_snapshot(db_pool: &Pool<Postgres>, calendar: &EventCalendar) -> Result<PlanningSnapshot, PlanningErr> {
    Ok(PlanningSnapshot {
        institutions: institutions_get(db_pool).await?,
        classes: classes_get(db_pool, calendar).await?,
        assignments: assignments_get(db_pool).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(class_id: &str, at: &str, duration: u32) -> Assignment {
        Assignment {
            class_id: class_id.into(),
            institution_id: "nemo".into(),
            date: "2026-09-01".parse().unwrap(),
            time: at.parse().unwrap(),
            duration,
        }
    }

    #[test]
    fn activity_orders_count_per_class() {
        let assignments = vec![visit("a", "09:00", 60), visit("b", "09:00", 60), visit("a", "13:00", 60)];
        assert_eq!(activity_orders(&assignments), vec![1, 1, 2]);
    }

    #[test]
    fn stored_rows_become_assignments() {
        let row = PlanningRow {
            class_id: "a".into(),
            institution_id: "nemo".into(),
            visit_date: "2026-09-01".parse().unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 45, 0).unwrap(),
        };
        assert_eq!(row.into_assignment().unwrap(), visit("a", "10:30", 75));
    }

    #[test]
    fn inverted_rows_are_rejected() {
        let row = PlanningRow {
            class_id: "a".into(),
            institution_id: "nemo".into(),
            visit_date: "2026-09-01".parse().unwrap(),
            start_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };
        assert!(matches!(row.into_assignment(), Err(PlanningErr::InvalidInput(_))));
    }

    #[test]
    fn end_times_past_midnight_cannot_be_stored() {
        assert_eq!(naive_time(16 * 60 + 30).unwrap(), NaiveTime::from_hms_opt(16, 30, 0).unwrap());
        assert!(naive_time(24 * 60 + 15).is_err());
        assert!(naive_time(u32::MAX).is_err());
        assert!(naive_time(u32::MAX / 60 + 1).is_err());
    }

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(
            PlanningErr::from(InputError::ZeroCapacity("nemo".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(PlanningErr::DoesNotExist("class a".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(PlanningErr::IoError("down".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_carries_status_and_message() {
        let body = serde_json::to_value(PlanningError {
            status: ApiStatusCode::from(StatusCode::NOT_FOUND),
            error: PlanningErr::DoesNotExist("institution rijks".into()).to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"status": "404", "error": "institution rijks doesn't exist"}));
    }

    #[tokio::test]
    async fn preview_plans_without_a_database() {
        let request: PreviewRequest = serde_json::from_value(serde_json::json!({
            "institutions": [{
                "id": "nemo",
                "name": "NEMO Science Museum",
                "address": "Oosterdok 2, Amsterdam Centrum",
                "capacity": 1,
                "duration": 60,
                "availability": {"2026-09-01": ["09:00"]}
            }],
            "classes": [{
                "id": "a",
                "teacherName": "J. de Vries",
                "college": "MBO College Centrum",
                "schoolAddress": "Amsterdam Centrum",
                "className": "1A",
                "studentCount": "<25",
                "year": "1",
                "activityCount": 1
            }]
        }))
        .unwrap();

        let schedule = planning_preview(request, ScoringWeights::default()).await.unwrap();
        assert_eq!(schedule.assignments, vec![Assignment {
            class_id: "a".into(),
            institution_id: "nemo".into(),
            date: "2026-09-01".parse().unwrap(),
            time: "09:00".parse().unwrap(),
            duration: 60,
        }]);
        assert!(schedule.conflicts.is_empty());
    }
}
