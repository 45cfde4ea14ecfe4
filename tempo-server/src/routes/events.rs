//! Event CRUD and listing endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use tempo_core::{timefmt, DurationSecs, Event, EventPatch, EventStore, Window};

use crate::routes::{ok, ok_empty, ApiError, ApiResponse};
use crate::state::AppState;

/// Default listing horizon when the caller gives no window.
const DEFAULT_LIST_DAYS: i64 = 365;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/next", get(next_event))
        .route("/events/{id}", get(get_event).put(update_event).delete(delete_event))
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    expanded: bool,
    start: Option<String>,
    end: Option<String>,
}

/// GET /events - list events, optionally expanding recurrence rules
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Event>>>, ApiError> {
    let now = Utc::now();
    let start = match query.start.as_deref() {
        Some(s) => timefmt::parse_instant(s)?,
        None => now,
    };
    let end = match query.end.as_deref() {
        Some(s) => timefmt::parse_instant(s)?,
        None => start + Duration::days(DEFAULT_LIST_DAYS),
    };
    let window = Window::new(start, end)?;
    debug!(expanded = query.expanded, "GET /events");

    let events = state.engine().events_in_window(&window, query.expanded)?;
    Ok(ok(events))
}

/// GET /events/next - the next upcoming occurrence, or null
async fn next_event(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Option<Event>>>, ApiError> {
    let next = state.engine().next_event(Utc::now())?;
    Ok(ok(next))
}

/// GET /events/:id
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    Ok(ok(state.store.get(&id)?))
}

#[derive(Deserialize)]
struct CreateEventRequest {
    title: String,
    description: Option<String>,
    time: String,
    /// Seconds; the wire never carries minutes.
    #[serde(default = "default_duration_secs")]
    duration: i64,
    #[serde(default)]
    category: String,
}

fn default_duration_secs() -> i64 {
    3600
}

/// POST /events
async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    let event = Event {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        description: req.description,
        time: timefmt::parse_instant(&req.time)?,
        duration: DurationSecs::new(req.duration)?,
        category: req.category,
        recurring: false,
        rule_id: None,
    };
    state.store.create_event(event.clone())?;
    Ok(ok(event))
}

/// PUT /events/:id - partial update
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<ApiResponse<Event>>, ApiError> {
    Ok(ok(state.store.update_event(&id, patch)?))
}

#[derive(Deserialize)]
struct DeleteQuery {
    /// Tombstone by default; `soft=false` removes for good.
    soft: Option<bool>,
    /// When set on a recurring event, only this occurrence instant is
    /// excluded from future expansions.
    time: Option<String>,
}

/// DELETE /events/:id
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if let Some(time) = query.time.as_deref() {
        let instant = timefmt::parse_instant(time)?;
        state.store.exclude_occurrence(&id, instant)?;
    } else {
        state.store.delete(&id, query.soft.unwrap_or(true))?;
    }
    Ok(ok_empty())
}
