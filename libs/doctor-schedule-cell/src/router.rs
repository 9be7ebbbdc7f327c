use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_schedule_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/defaults", get(handlers::get_schedule_defaults))
        .route("/candidate-slots", get(handlers::get_candidate_slots))
        .route("/availability", post(handlers::compute_doctor_availability))
        .route("/availability/grid", post(handlers::compute_availability_grid))
        .with_state(state)
}
