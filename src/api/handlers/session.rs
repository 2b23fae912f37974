use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateSessionRequest, SlotsQuery};
use crate::api::dtos::responses::{DatesResponse, SlotsResponse};
use crate::domain::models::session::LiveSession;
use crate::domain::services::catalog::{available_dates, available_slots, today_in};
use crate::error::AppError;
use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use tracing::info;

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = LiveSession::new(payload.session_name.trim().to_string(), payload.schedule.migrate());
    session.validate()?;

    let created = state.session_repo.create(&session).await?;

    info!("Created live session {} ({} dates)", created.id, created.dates.len());
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.session_repo.list().await?;
    Ok(Json(sessions))
}

pub async fn list_bookable_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let today = today_in(&state.config.timezone, Utc::now());
    let sessions = state.session_repo.find_bookable_sessions(today).await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session_repo.find_by_id(&session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    Ok(Json(session))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.session_repo.delete(&session_id).await?;
    info!("Deleted session {}", session_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn get_available_dates(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session_repo.find_by_id(&session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    let today = today_in(&state.config.timezone, Utc::now());
    Ok(Json(DatesResponse {
        dates: available_dates(&session, today),
        session_id: session.id,
    }))
}

pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| AppError::validation("date", "Invalid date format"))?;

    let session = state.session_repo.find_by_id(&session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    let entry = session.date_entry(date)
        .ok_or(AppError::NotFound("Date not offered by this session".into()))?;

    Ok(Json(SlotsResponse {
        date,
        slots: available_slots(entry, query.current_slot.as_deref()),
    }))
}
