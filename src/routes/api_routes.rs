use crate::config::AppState;
use crate::controllers::{
    export_handler::{class_program, college_program, day_program, institution_program},
    planning_handler::{clear, generate, preview},
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Returns a router with all the routes for the API
///
/// Planning runs live under `/planning`; the read-only views of the stored planning sit next to
/// them.
///
/// # Returns
/// A router with all the routes for the API
pub fn get_routes() -> Router<Arc<RwLock<AppState>>> {
    let planning_routes = Router::new()
        .route("/planning/preview", post(preview))
        .route("/planning/generate", post(generate))
        .route("/planning/clear", post(clear));

    let export_routes = Router::new()
        .route("/planning/institutions/{id}", get(institution_program))
        .route("/planning/classes/{id}", get(class_program))
        .route("/planning/colleges/{college}", get(college_program))
        .route("/planning/days/{date}", get(day_program));

    planning_routes.merge(export_routes)
}
