//! Conflict and free-slot endpoints.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use tempo_core::{timefmt, DurationSecs, Event, TimeSlot};

use crate::routes::{ok, ApiError, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/availability/free-slots", get(free_slots))
        .route("/availability/free-slots/next", get(next_free_slot))
        .route("/availability/conflicts", get(conflicts))
}

fn default_start_hour() -> u32 {
    9
}

fn default_end_hour() -> u32 {
    17
}

fn default_min_duration_minutes() -> i64 {
    30
}

#[derive(Deserialize)]
struct FreeSlotsQuery {
    date: String,
    #[serde(rename = "startHour", default = "default_start_hour")]
    start_hour: u32,
    #[serde(rename = "endHour", default = "default_end_hour")]
    end_hour: u32,
    /// Minimum slot length in minutes.
    #[serde(rename = "minDuration", default = "default_min_duration_minutes")]
    min_duration: i64,
}

/// GET /availability/free-slots
async fn free_slots(
    State(state): State<AppState>,
    Query(query): Query<FreeSlotsQuery>,
) -> Result<Json<ApiResponse<Vec<TimeSlot>>>, ApiError> {
    let date = timefmt::parse_date(&query.date)?;
    let slots = state.engine().free_slots_on(
        date,
        query.start_hour,
        query.end_hour,
        query.min_duration,
    )?;
    Ok(ok(slots))
}

#[derive(Deserialize)]
struct NextSlotQuery {
    /// Requested slot length in minutes.
    #[serde(default = "default_next_slot_minutes")]
    duration: i64,
    /// Search start; defaults to now.
    after: Option<String>,
    #[serde(rename = "startHour", default = "default_start_hour")]
    start_hour: u32,
    #[serde(rename = "endHour", default = "default_end_hour")]
    end_hour: u32,
}

fn default_next_slot_minutes() -> i64 {
    60
}

/// GET /availability/free-slots/next - first fitting slot going forward
async fn next_free_slot(
    State(state): State<AppState>,
    Query(query): Query<NextSlotQuery>,
) -> Result<Json<ApiResponse<TimeSlot>>, ApiError> {
    let after = match query.after.as_deref() {
        Some(s) => timefmt::parse_instant(s)?,
        None => Utc::now(),
    };
    let slot = state.engine().next_available_slot(
        query.duration,
        after,
        query.start_hour,
        query.end_hour,
    )?;
    Ok(ok(slot))
}

#[derive(Deserialize)]
struct ConflictsQuery {
    time: String,
    /// Candidate duration in seconds.
    #[serde(default = "default_conflict_secs")]
    duration: i64,
}

fn default_conflict_secs() -> i64 {
    3600
}

/// GET /availability/conflicts
async fn conflicts(
    State(state): State<AppState>,
    Query(query): Query<ConflictsQuery>,
) -> Result<Json<ApiResponse<Vec<Event>>>, ApiError> {
    let start = timefmt::parse_instant(&query.time)?;
    let duration = DurationSecs::new(query.duration)?;
    let found = state.engine().conflicts_at(start, duration)?;
    Ok(ok(found))
}
