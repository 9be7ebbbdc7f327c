use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use doctor_schedule_cell::router::doctor_schedule_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Hospital schedule API is running!" }))
        .nest("/doctor-schedules", doctor_schedule_routes(state.clone()))
}
