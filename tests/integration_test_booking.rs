mod common;

use axum::http::StatusCode;
use common::{date_from_today, TestApp};
use serde_json::{json, Value};

fn booking_payload(session_id: &str, date: &str, slot: &str) -> Value {
    json!({
        "sessionId": session_id,
        "date": date,
        "timeSlot": slot,
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "mobile": "9876543210"
    })
}

async fn seed(app: &TestApp, date: &str) -> String {
    app.create_session(json!({
        "sessionName": "Candle Making",
        "dates": [{
            "date": date,
            "timeSlots": [
                "08:00",
                {"time": "10:00", "capacity": 3, "booked": 2},
                {"time": "12:00", "capacity": 1, "booked": 1}
            ]
        }]
    })).await
}

#[tokio::test]
async fn test_create_booking_increments_slot() {
    let app = TestApp::new().await;
    let day = date_from_today(5);
    let session_id = seed(&app, &day).await;

    let (status, booking) = app.send("POST", "/api/v1/bookings", Some(booking_payload(&session_id, &day, "10:00"))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", booking);
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["sessionName"], "Candle Making");
    assert_eq!(booking["sessionDate"], json!(day));
    assert_eq!(booking["timeSlot"], "10:00");
    assert!(booking["bookedAt"].is_string());

    assert_eq!(app.slot_booked(&session_id, &day, "10:00").await, 3);
    assert_eq!(app.booking_count().await, 1);

    let (_, listed) = app.send("GET", "/api/v1/bookings", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["status"], "confirmed");

    let (_, fetched) = app.send("GET", &format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap()), None).await;
    assert_eq!(fetched["email"], "ada@example.com");
}

#[tokio::test]
async fn test_invalid_mobile_writes_nothing() {
    let app = TestApp::new().await;
    let day = date_from_today(5);
    let session_id = seed(&app, &day).await;

    let mut payload = booking_payload(&session_id, &day, "10:00");
    payload["mobile"] = json!("12345");

    let (status, body) = app.send("POST", "/api/v1/bookings", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "mobile");

    assert_eq!(app.booking_count().await, 0);
    assert_eq!(app.slot_booked(&session_id, &day, "10:00").await, 2);
}

#[tokio::test]
async fn test_validation_reports_first_missing_field() {
    let app = TestApp::new().await;
    let day = date_from_today(5);
    let session_id = seed(&app, &day).await;

    let (status, body) = app.send("POST", "/api/v1/bookings", Some(json!({"name": "No Session"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "sessionId");

    let mut payload = booking_payload(&session_id, &day, "10:00");
    payload["email"] = json!("ada.example.com");
    payload["timeSlot"] = json!("");
    let (_, body) = app.send("POST", "/api/v1/bookings", Some(payload)).await;
    assert_eq!(body["field"], "email");

    let mut payload = booking_payload(&session_id, &day, "10:00");
    payload["timeSlot"] = json!("");
    let (_, body) = app.send("POST", "/api/v1/bookings", Some(payload)).await;
    assert_eq!(body["field"], "timeSlot");

    let (status, body) = app.send("POST", "/api/v1/bookings", Some(booking_payload(&session_id, &day, "23:00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "timeSlot");

    assert_eq!(app.booking_count().await, 0);
}

#[tokio::test]
async fn test_full_slot_is_rejected() {
    let app = TestApp::new().await;
    let day = date_from_today(5);
    let session_id = seed(&app, &day).await;

    let (status, _) = app.send("POST", "/api/v1/bookings", Some(booking_payload(&session_id, &day, "12:00"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(app.booking_count().await, 0);
    assert_eq!(app.slot_booked(&session_id, &day, "12:00").await, 1);
}

#[tokio::test]
async fn test_open_slot_has_no_counter() {
    let app = TestApp::new().await;
    let day = date_from_today(5);
    let session_id = seed(&app, &day).await;

    for _ in 0..3 {
        let (status, _) = app.send("POST", "/api/v1/bookings", Some(booking_payload(&session_id, &day, "08:00"))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    assert_eq!(app.booking_count().await, 3);
    assert_eq!(app.slot_booked(&session_id, &day, "08:00").await, 0);
}

#[tokio::test]
async fn test_unknown_session_and_past_date() {
    let app = TestApp::new().await;
    let yesterday = date_from_today(-1);

    let (status, _) = app.send("POST", "/api/v1/bookings", Some(booking_payload("missing", &date_from_today(1), "10:00"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let session_id = seed(&app, &yesterday).await;
    let (status, body) = app.send("POST", "/api/v1/bookings", Some(booking_payload(&session_id, &yesterday, "10:00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "date");
    assert_eq!(app.slot_booked(&session_id, &yesterday, "10:00").await, 2);
}

#[tokio::test]
async fn test_booking_keeps_session_name_snapshot() {
    let app = TestApp::new().await;
    let day = date_from_today(5);
    let session_id = seed(&app, &day).await;

    let (_, booking) = app.send("POST", "/api/v1/bookings", Some(booking_payload(&session_id, &day, "10:00"))).await;

    sqlx::query("UPDATE live_sessions SET session_name = 'Renamed' WHERE id = ?")
        .bind(&session_id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (_, fetched) = app.send("GET", &format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap()), None).await;
    assert_eq!(fetched["sessionName"], "Candle Making");

    let (_, by_session) = app.send("GET", &format!("/api/v1/sessions/{}/bookings", session_id), None).await;
    assert_eq!(by_session.as_array().unwrap().len(), 1);
}
