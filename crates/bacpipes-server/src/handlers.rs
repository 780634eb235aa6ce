//! BACpipes Request Handlers
//!
//! One handler per dashboard endpoint. Parameters are validated before the
//! store is touched; every handler reads "now" once and passes it down.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::error::{
    ApiError, ErrorResponse, EXPORT_FAILED, HEALTH_FAILED, POINTS_FAILED, TREND_FAILED,
};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bacpipes_timeseries::{
    export, health, snapshot, trend, ExportRequest, HealthSnapshot, SeriesSnapshot,
    SnapshotRequest, TrendPoint, TrendRange,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Liveness
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
    pub version: String,
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Not found", "NOT_FOUND")),
    )
}

// =============================================================================
// Snapshot
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PointsParams {
    pub search: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointsResponse {
    pub points: Vec<SeriesSnapshot>,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/points`
pub async fn get_points(
    State(state): State<AppState>,
    Query(params): Query<PointsParams>,
) -> Result<Json<PointsResponse>, ApiError> {
    let fail = |e| ApiError::new(POINTS_FAILED, e);
    let request =
        SnapshotRequest::from_params(params.search.as_deref(), params.limit.as_deref())
            .map_err(fail)?;

    let now = state.now();
    let points = snapshot::snapshot(state.store(), &request, now)
        .await
        .map_err(fail)?;

    Ok(Json(PointsResponse {
        total: points.len(),
        points,
        timestamp: now,
    }))
}

// =============================================================================
// Trend
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    pub point: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrendResponse {
    pub point: String,
    /// Window actually queried; unrecognized names resolve to `1h`.
    pub range: TrendRange,
    pub data: Vec<TrendPoint>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/trends`
pub async fn get_trend(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendResponse>, ApiError> {
    let fail = |e| ApiError::new(TREND_FAILED, e);
    let point = trend::require_series_key(params.point.as_deref()).map_err(fail)?;
    let range = TrendRange::from_param(params.range.as_deref());

    let now = state.now();
    let series = trend::trend(state.store(), point, range, now)
        .await
        .map_err(fail)?;

    Ok(Json(TrendResponse {
        count: series.len(),
        point: series.series_key,
        range: series.range,
        data: series.points,
        timestamp: now,
    }))
}

// =============================================================================
// Export
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub format: Option<String>,
}

/// `GET /api/export`
pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let fail = |e| ApiError::new(EXPORT_FAILED, e);
    let request = ExportRequest::from_params(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.format.as_deref(),
    )
    .map_err(fail)?;

    let table = export::export(state.store(), &request)
        .await
        .map_err(fail)?;

    let disposition = format!("attachment; filename=\"{}\"", table.format().filename());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        table.to_csv(),
    ))
}

// =============================================================================
// Health
// =============================================================================

/// `GET /api/health`
pub async fn get_health(State(state): State<AppState>) -> Result<Json<HealthSnapshot>, ApiError> {
    let snapshot = health::health(state.store(), state.now())
        .await
        .map_err(|e| ApiError::new(HEALTH_FAILED, e))?;
    Ok(Json(snapshot))
}
