//! Aggregate statistics endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use tempo_core::{timefmt, EventStats, Window};

use crate::routes::{ok, ApiError, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats/events/{start}/{end}", get(event_stats))
}

#[derive(Deserialize)]
struct StatsPath {
    start: String,
    end: String,
}

/// GET /stats/events/:start/:end - stats over the expanded event set
async fn event_stats(
    State(state): State<AppState>,
    Path(path): Path<StatsPath>,
) -> Result<Json<ApiResponse<EventStats>>, ApiError> {
    let start = timefmt::parse_date(&path.start)?;
    let end = timefmt::parse_date(&path.end)?;
    let (window_start, _) = timefmt::day_bounds(start);
    let (_, window_end) = timefmt::day_bounds(end);
    let window = Window::new(window_start, window_end)?;
    Ok(ok(state.engine().stats(&window)?))
}
