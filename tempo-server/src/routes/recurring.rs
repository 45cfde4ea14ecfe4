//! Recurring event endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use tempo_core::{
    timefmt, DurationSecs, Event, EventStore, RecurrencePattern, RecurringRule,
};

use crate::routes::{ok, ok_empty, ApiError, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recurring", get(list_recurring).post(create_recurring))
        .route("/recurring/{id}", put(update_recurring).delete(delete_recurring))
}

/// GET /recurring - all live recurring rules (masters with patterns)
async fn list_recurring(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RecurringRule>>>, ApiError> {
    Ok(ok(state.store.all_rules()?))
}

#[derive(Deserialize)]
struct RecurringRequest {
    title: String,
    description: Option<String>,
    /// Anchor start instant.
    start: String,
    /// Seconds per occurrence.
    #[serde(default = "default_duration_secs")]
    duration: i64,
    #[serde(default)]
    category: String,
    pattern: RecurrencePattern,
}

fn default_duration_secs() -> i64 {
    3600
}

impl RecurringRequest {
    fn into_parts(self, id: String) -> Result<(Event, RecurrencePattern), ApiError> {
        self.pattern.validate()?;
        let event = Event {
            id,
            title: self.title,
            description: self.description,
            time: timefmt::parse_instant(&self.start)?,
            duration: DurationSecs::new(self.duration)?,
            category: self.category,
            recurring: true,
            rule_id: None,
        };
        Ok((event, self.pattern))
    }
}

/// POST /recurring
async fn create_recurring(
    State(state): State<AppState>,
    Json(req): Json<RecurringRequest>,
) -> Result<Json<ApiResponse<RecurringRule>>, ApiError> {
    let (event, pattern) = req.into_parts(Uuid::new_v4().to_string())?;
    state.store.create_rule(event.clone(), pattern.clone())?;
    Ok(ok(RecurringRule {
        event,
        pattern,
        exclusions: Default::default(),
    }))
}

/// PUT /recurring/:id - replace the master and its rule
async fn update_recurring(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RecurringRequest>,
) -> Result<Json<ApiResponse<RecurringRule>>, ApiError> {
    let (event, pattern) = req.into_parts(id.clone())?;
    let rule = state.store.replace_rule(&id, event, pattern)?;
    Ok(ok(rule))
}

#[derive(Deserialize)]
struct DeleteQuery {
    soft: Option<bool>,
}

/// DELETE /recurring/:id
async fn delete_recurring(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store.delete(&id, query.soft.unwrap_or(true))?;
    Ok(ok_empty())
}
