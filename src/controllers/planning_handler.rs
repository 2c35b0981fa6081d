use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::AppState;
use crate::models::planning_model::{
    PlanningError, PreviewRequest, planning_clear, planning_generate, planning_preview,
};
use crate::types::ApiStatusCode;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use serde_json::json;

#[debug_handler]
/// Plans posted data without storing anything
///
/// This function is a handler for the route `POST /api/v1/planning/preview`. The body holds the
/// institutions and classes to plan.
///
/// # Parameters
/// - `app_state` - Thread-safe shared state wrapped in an Arc and RwLock
/// - `request` - The institutions and classes to plan
///
/// # Returns
/// `Response` with a status code of 200 OK and the schedule as JSON, or an error response.
///
/// # Errors
/// Malformed input (zero capacity, zero duration, an activity count other than 1 or 2, duplicate
/// ids) is answered with 422 Unprocessable Entity. Classes that do not fit are not an error; they
/// are listed in the schedule's conflicts.
pub async fn preview(
    State(app_state): State<Arc<RwLock<AppState>>>,
    Json(request): Json<PreviewRequest>,
) -> Response {
    let weights = app_state.read().await.settings.weights;
    match planning_preview(request, weights).await {
        Ok(schedule) => Json(schedule).into_response(),
        Err(e) => PlanningError::response(ApiStatusCode::from(e.status()), e),
    }
}

#[debug_handler]
/// Generates the planning
///
/// This function is a handler for the route `POST /api/v1/planning/generate`. It plans every
/// registered class and replaces the stored planning with the result.
///
/// # Parameters
/// - `app_state` - Thread-safe shared state wrapped in an Arc and RwLock
///
/// # Returns
/// `Response` with a status code of 200 OK and the new schedule as JSON, or an error response.
///
/// # Errors
/// If the registrations cannot be loaded or the planning cannot be stored, a planning error
/// response is returned and the previous planning stays in place.
pub async fn generate(State(app_state): State<Arc<RwLock<AppState>>>) -> Response {
    let app_state_lock = app_state.read().await;
    let write_lock = app_state_lock.planning_data.write().await;
    match planning_generate(&write_lock.planning_db, &app_state_lock.settings).await {
        Ok(schedule) => Json(schedule).into_response(),
        Err(e) => PlanningError::response(ApiStatusCode::from(e.status()), e),
    }
}

#[debug_handler]
/// Clears the planning
///
/// This function is a handler for the route `POST /api/v1/planning/clear`. It deletes every
/// stored visit.
///
/// # Parameters
/// - `app_state` - Thread-safe shared state wrapped in an Arc and RwLock
///
/// # Returns
/// `Response` with a status code of 200 OK and the number of deleted visits, or an error
/// response.
pub async fn clear(State(app_state): State<Arc<RwLock<AppState>>>) -> Response {
    let app_state_lock = app_state.read().await;
    let write_lock = app_state_lock.planning_data.write().await;
    match planning_clear(&write_lock.planning_db).await {
        Ok(removed) => Json(json!({ "removed": removed })).into_response(),
        Err(e) => PlanningError::response(ApiStatusCode::from(e.status()), e),
    }
}
