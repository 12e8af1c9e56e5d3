use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::BTreeMap;
use tracing::info;

use crate::api::{state::AppState, types::*};
use crate::error::RefreshError;
use crate::services::TriggerOutcome;

/// GET /
pub async fn api_info() -> Json<ApiInfo> {
    let endpoints = BTreeMap::from([
        ("/api/data", "Get all league data"),
        ("/api/standings", "Get league standings"),
        ("/api/results", "Get recent game results"),
        ("/api/upcoming", "Get upcoming games"),
        ("/api/stats", "Get stat leaders"),
        ("/api/games/:id", "Get one game by id"),
        ("/api/status", "Get refresh status"),
        ("/api/refresh", "Manually trigger a data refresh (POST)"),
    ]);
    Json(ApiInfo {
        name: "LBL Live Data API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints,
    })
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.league.get_snapshot().ok();
    let phase = state.league.phase();
    Json(StatusResponse {
        phase,
        refreshing: phase.is_in_cycle(),
        data_available: snapshot.is_some(),
        last_updated: snapshot.map(|s| s.fetched_at),
        refresh_interval_secs: state.league.scheduler().settings().interval.as_secs(),
        uptime_seconds: state.uptime_seconds(),
        refresh: state.league.stats().await,
    })
}

fn in_progress(state: &AppState) -> Response {
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse {
            error: RefreshError::RefreshInProgress.to_string(),
            last_updated: state.league.get_snapshot().ok().map(|s| s.fetched_at),
        }),
    )
        .into_response()
}

/// POST /api/refresh
///
/// Waits for the cycle by default; `?wait=false` only starts it.
pub async fn refresh(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Response {
    if !query.wait.unwrap_or(true) {
        return match state.league.trigger_refresh() {
            TriggerOutcome::Accepted => {
                info!("background refresh requested");
                (
                    StatusCode::ACCEPTED,
                    Json(RefreshAccepted { accepted: true }),
                )
                    .into_response()
            }
            TriggerOutcome::RefreshInProgress => in_progress(&state),
        };
    }

    info!("manual refresh requested");
    match state.league.refresh_now().await {
        Ok(report) => Json(RefreshResponse {
            success: true,
            last_updated: Some(report.fetched_at),
            error: None,
        })
        .into_response(),
        Err(RefreshError::RefreshInProgress) => in_progress(&state),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(RefreshResponse {
                success: false,
                last_updated: state.league.get_snapshot().ok().map(|s| s.fetched_at),
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}
