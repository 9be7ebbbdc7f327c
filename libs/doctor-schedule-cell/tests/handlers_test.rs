// libs/doctor-schedule-cell/tests/handlers_test.rs

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use doctor_schedule_cell::router::doctor_schedule_routes;
use shared_config::{AppConfig, ScheduleSettings};

fn create_test_app(config: AppConfig) -> Router {
    doctor_schedule_routes(Arc::new(config))
}

fn config_without_defaults() -> AppConfig {
    AppConfig {
        schedule_defaults: None,
        ..AppConfig::default()
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn status_of(slots: &Value, time: &str) -> String {
    slots
        .as_array()
        .unwrap()
        .iter()
        .find(|slot| slot["time"] == time)
        .map(|slot| slot["status"].as_str().unwrap().to_string())
        .unwrap_or_else(|| panic!("no slot at {time}"))
}

#[tokio::test]
async fn test_get_schedule_defaults() {
    let app = create_test_app(AppConfig::default());

    let (status, body) = send(app, get("/defaults")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["work_start"], "09:00");
    assert_eq!(body["work_end"], "17:00");
    assert_eq!(body["break_window"]["start"], "12:00");
    assert_eq!(body["slot_granularity_minutes"], 30);
    assert_eq!(body["working_days"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_get_schedule_defaults_when_disabled() {
    let app = create_test_app(config_without_defaults());

    let (status, body) = send(app, get("/defaults")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_misconfigured_defaults_are_server_errors() {
    let app = create_test_app(AppConfig {
        schedule_defaults: Some(ScheduleSettings {
            work_start: "9am".to_string(),
            ..ScheduleSettings::default()
        }),
        ..AppConfig::default()
    });

    let (status, body) = send(
        app,
        post_json(
            "/availability",
            json!({
                "doctor": { "doctor_id": Uuid::new_v4() },
                "date": "2025-06-16"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("9am"));
}

#[tokio::test]
async fn test_get_candidate_slots() {
    let app = create_test_app(AppConfig::default());

    let (status, body) = send(
        app,
        get("/candidate-slots?work_start=09:00&work_end=11:00&granularity_minutes=45"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_slots"], 3);
    assert_eq!(body["slots"], json!(["09:00", "09:45", "10:30"]));
}

#[tokio::test]
async fn test_get_candidate_slots_rejects_bad_time() {
    let app = create_test_app(AppConfig::default());

    let (status, body) = send(app, get("/candidate-slots?work_start=9am&work_end=11:00")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("9am"));
}

#[tokio::test]
async fn test_compute_availability_default_monday() {
    let app = create_test_app(AppConfig::default());
    let doctor_id = Uuid::new_v4();

    let (status, body) = send(
        app,
        post_json(
            "/availability",
            json!({
                "doctor": { "doctor_id": doctor_id },
                "date": "2025-06-16",
                "booked_times": ["10:00"],
                "appointments": [
                    {
                        "doctor_id": doctor_id,
                        "date": "2025-06-16",
                        "time": "14:00",
                        "status": "confirmed"
                    },
                    {
                        "doctor_id": doctor_id,
                        "date": "2025-06-16",
                        "time": "15:00",
                        "status": "cancelled"
                    }
                ]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctor_id"], json!(doctor_id));
    assert_eq!(body["slots"].as_array().unwrap().len(), 16);
    assert_eq!(status_of(&body["slots"], "09:00"), "available");
    assert_eq!(status_of(&body["slots"], "10:00"), "booked");
    assert_eq!(status_of(&body["slots"], "12:00"), "break");
    assert_eq!(status_of(&body["slots"], "14:00"), "booked");
    assert_eq!(status_of(&body["slots"], "15:00"), "available");
    assert_eq!(body["summary"]["booked"], 2);
    assert_eq!(body["summary"]["next_available"], "09:00");
}

#[tokio::test]
async fn test_compute_availability_with_approved_leave() {
    let app = create_test_app(AppConfig::default());

    let (status, body) = send(
        app,
        post_json(
            "/availability",
            json!({
                "doctor": {
                    "doctor_id": Uuid::new_v4(),
                    "leave_records": [
                        { "date": "2025-06-16", "status": "Approved", "reason": "Sick day" }
                    ]
                },
                "date": "2025-06-16"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["on_leave"], 16);
}

#[tokio::test]
async fn test_compute_availability_global_flag_scoped_to_today() {
    let app = create_test_app(AppConfig::default());

    let (status, body) = send(
        app,
        post_json(
            "/availability",
            json!({
                "doctor": { "doctor_id": Uuid::new_v4(), "is_on_leave": true },
                "date": "2025-06-16",
                "today": "2025-06-13"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["on_leave"], 0);
    assert_eq!(body["summary"]["available"], 14);
}

#[tokio::test]
async fn test_compute_availability_custom_schedule() {
    let app = create_test_app(AppConfig::default());

    let (status, body) = send(
        app,
        post_json(
            "/availability",
            json!({
                "doctor": {
                    "doctor_id": Uuid::new_v4(),
                    "schedule": {
                        "working_days": ["Saturday"],
                        "work_start": "10:00",
                        "work_end": "12:00",
                        "slot_granularity_minutes": 60
                    }
                },
                "date": "2025-06-21"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["slots"],
        json!([
            { "time": "10:00", "status": "available" },
            { "time": "11:00", "status": "available" }
        ])
    );
}

#[tokio::test]
async fn test_compute_availability_invalid_time_format() {
    let app = create_test_app(AppConfig::default());

    let (status, body) = send(
        app,
        post_json(
            "/availability",
            json!({
                "doctor": { "doctor_id": Uuid::new_v4() },
                "date": "2025-06-16",
                "booked_times": ["10:00:00"]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("10:00:00"));
}

#[tokio::test]
async fn test_compute_availability_invalid_schedule() {
    let app = create_test_app(AppConfig::default());

    let (status, _) = send(
        app,
        post_json(
            "/availability",
            json!({
                "doctor": {
                    "doctor_id": Uuid::new_v4(),
                    "schedule": { "work_start": "18:00", "work_end": "08:00" }
                },
                "date": "2025-06-16"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compute_availability_missing_schedule() {
    let app = create_test_app(config_without_defaults());

    let (status, body) = send(
        app,
        post_json(
            "/availability",
            json!({
                "doctor": { "doctor_id": Uuid::new_v4() },
                "date": "2025-06-16"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_compute_availability_grid() {
    let app = create_test_app(AppConfig::default());
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let broken = Uuid::new_v4();

    let (status, body) = send(
        app,
        post_json(
            "/availability/grid",
            json!({
                "date": "2025-06-16",
                "doctors": [
                    { "doctor_id": first },
                    { "doctor_id": broken, "schedule": { "work_start": "nine" } },
                    { "doctor_id": second, "is_on_leave": true }
                ],
                "appointments": [
                    { "doctor_id": first, "date": "2025-06-16", "time": "09:00", "status": "scheduled" }
                ]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_doctors"], 3);

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows[0]["doctor_id"], json!(first));
    assert_eq!(status_of(&rows[0]["slots"], "09:00"), "booked");

    assert_eq!(rows[1]["doctor_id"], json!(broken));
    assert!(rows[1]["error"].as_str().unwrap().contains("nine"));
    assert!(rows[1]["slots"].as_array().unwrap().is_empty());

    assert_eq!(rows[2]["doctor_id"], json!(second));
    assert_eq!(rows[2]["summary"]["on_leave"], 16);
}
