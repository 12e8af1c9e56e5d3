use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::{state::AppState, types::*};
use crate::domain::{GameRecord, Snapshot};
use crate::error::{GameLookupError, NotYetAvailable};

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// 503 answered by every data route before the first successful refresh
pub fn not_available() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: NotYetAvailable.to_string(),
            last_updated: None,
        }),
    )
}

fn current(state: &AppState) -> std::result::Result<Arc<Snapshot>, ApiError> {
    state.league.get_snapshot().map_err(|_| not_available())
}

/// GET /api/data
pub async fn get_data(State(state): State<AppState>) -> std::result::Result<Response, ApiError> {
    let snapshot = current(&state)?;
    Ok(Json(snapshot.as_ref()).into_response())
}

/// GET /api/standings
pub async fn get_standings(
    State(state): State<AppState>,
) -> std::result::Result<Json<StandingsResponse>, ApiError> {
    let snapshot = current(&state)?;
    Ok(Json(StandingsResponse {
        standings: snapshot.data.standings.clone(),
        last_updated: snapshot.fetched_at,
    }))
}

/// GET /api/results
pub async fn get_results(
    State(state): State<AppState>,
) -> std::result::Result<Json<ResultsResponse>, ApiError> {
    let snapshot = current(&state)?;
    Ok(Json(ResultsResponse {
        results: snapshot.data.results.clone(),
        last_updated: snapshot.fetched_at,
    }))
}

/// GET /api/upcoming
pub async fn get_upcoming(
    State(state): State<AppState>,
) -> std::result::Result<Json<UpcomingResponse>, ApiError> {
    let snapshot = current(&state)?;
    Ok(Json(UpcomingResponse {
        upcoming: snapshot.data.upcoming.clone(),
        last_updated: snapshot.fetched_at,
    }))
}

/// GET /api/stats
pub async fn get_stats_leaders(
    State(state): State<AppState>,
) -> std::result::Result<Json<StatsLeadersResponse>, ApiError> {
    let snapshot = current(&state)?;
    Ok(Json(StatsLeadersResponse {
        stats_leaders: snapshot.data.stats.clone(),
        last_updated: snapshot.fetched_at,
    }))
}

/// GET /api/games/:id
pub async fn get_game_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<GameRecord>, ApiError> {
    match state.league.get_game_by_id(&id) {
        Ok(game) => Ok(Json(game)),
        Err(GameLookupError::NotYetAvailable(_)) => Err(not_available()),
        Err(e @ GameLookupError::NotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
                last_updated: state.league.get_snapshot().ok().map(|s| s.fetched_at),
            }),
        )),
    }
}
