//! Wake preview endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use tempo_core::{timefmt, WakePreview};

use crate::routes::{ok, ApiError, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/wake/preview/{date}", get(preview))
}

/// GET /wake/preview/:date - compute-only wake decision for a day
async fn preview(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<ApiResponse<WakePreview>>, ApiError> {
    let date = timefmt::parse_date(&date)?;
    Ok(ok(state.engine().wake_preview(date, &state.wake)?))
}
