use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::AppState;
use crate::models::planning_model::{PlanningErr, PlanningSnapshot, planning_snapshot};
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use chrono::NaiveDate;
use scheduler::{class_view, college_view, day_overview, institution_view};

async fn snapshot(app_state: &Arc<RwLock<AppState>>) -> Result<PlanningSnapshot, PlanningErr> {
    let app_state_lock = app_state.read().await;
    let read_lock = app_state_lock.planning_data.read().await;
    planning_snapshot(&read_lock.planning_db, &app_state_lock.settings.calendar).await
}

#[debug_handler]
/// Returns the program of one institution
///
/// This function is a handler for the route `GET /api/v1/planning/institutions/{id}`.
///
/// # Errors
/// 404 Not Found if no institution has the given id.
pub async fn institution_program(
    State(app_state): State<Arc<RwLock<AppState>>>,
    Path(id): Path<String>,
) -> Response {
    let snapshot = match snapshot(&app_state).await {
        Ok(snapshot) => snapshot,
        Err(e) => return e.into_response(),
    };
    if !snapshot.institutions.iter().any(|institution| institution.id == id) {
        return PlanningErr::DoesNotExist(format!("institution {id}")).into_response();
    }
    Json(institution_view(&id, &snapshot.assignments, &snapshot.classes)).into_response()
}

#[debug_handler]
/// Returns the program of one class
///
/// This function is a handler for the route `GET /api/v1/planning/classes/{id}`. Visits are
/// numbered in the order they happen.
///
/// # Errors
/// 404 Not Found if no class has the given id.
pub async fn class_program(
    State(app_state): State<Arc<RwLock<AppState>>>,
    Path(id): Path<String>,
) -> Response {
    let snapshot = match snapshot(&app_state).await {
        Ok(snapshot) => snapshot,
        Err(e) => return e.into_response(),
    };
    if !snapshot.classes.iter().any(|class| class.id == id) {
        return PlanningErr::DoesNotExist(format!("class {id}")).into_response();
    }
    Json(class_view(&id, &snapshot.assignments, &snapshot.institutions)).into_response()
}

#[debug_handler]
/// Returns every visit of the classes of one college
///
/// A college without planned visits gets an empty list.
pub async fn college_program(
    State(app_state): State<Arc<RwLock<AppState>>>,
    Path(college): Path<String>,
) -> Response {
    match snapshot(&app_state).await {
        Ok(snapshot) => Json(college_view(
            &college,
            &snapshot.assignments,
            &snapshot.classes,
            &snapshot.institutions,
        ))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

#[debug_handler]
pub async fn day_program(
    State(app_state): State<Arc<RwLock<AppState>>>,
    Path(date): Path<NaiveDate>,
) -> Response {
    match snapshot(&app_state).await {
        Ok(snapshot) => Json(day_overview(
            date,
            &snapshot.assignments,
            &snapshot.classes,
            &snapshot.institutions,
        ))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
