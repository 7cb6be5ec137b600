//! HTTP route handlers.

use axum::body::Body;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::warn;

use crate::registry::{DriverRegistry, Notifier, RiderRegistry, StationRegistry, TripService};

use super::dto::{
    ErrorResponse, StatusResponse, StreamAckResponse, TryMatchRequest, TryMatchResponse,
};
use super::state::AppState;
use super::stream::location_samples;

/// Create the application router.
pub fn create_router<S, D, R, T, N>(state: AppState<S, D, R, T, N>) -> Router
where
    S: StationRegistry + 'static,
    D: DriverRegistry + 'static,
    R: RiderRegistry + 'static,
    T: TripService + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/v1/status", get(status))
        .route("/v1/locations/stream", post(stream_locations))
        .route("/v1/match/try", post(try_match))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Occupancy of the detector's cache and debounce ledger.
async fn status<S, D, R, T, N>(State(state): State<AppState<S, D, R, T, N>>) -> Json<StatusResponse>
where
    S: StationRegistry + 'static,
    D: DriverRegistry + 'static,
    R: RiderRegistry + 'static,
    T: TripService + 'static,
    N: Notifier + 'static,
{
    Json(StatusResponse::from_status(state.detector.status().await))
}

/// Consume an NDJSON location stream until the client closes it, then
/// acknowledge with the sample and trigger counts.
///
/// Each connection runs its own detector loop; concurrent drivers stream
/// over separate connections and never serialize on each other.
async fn stream_locations<S, D, R, T, N>(
    State(state): State<AppState<S, D, R, T, N>>,
    body: Body,
) -> Json<StreamAckResponse>
where
    S: StationRegistry + 'static,
    D: DriverRegistry + 'static,
    R: RiderRegistry + 'static,
    T: TripService + 'static,
    N: Notifier + 'static,
{
    let samples = location_samples(Box::pin(body.into_data_stream()));
    let summary = state.detector.consume(samples).await;

    Json(StreamAckResponse {
        ok: true,
        samples: summary.samples,
        triggers: summary.triggers,
    })
}

/// Direct match attempt.
///
/// A collaborator failure is not surfaced as an HTTP error: the caller
/// gets the best-known remaining-seat count and no trip, and the failure
/// is logged here.
async fn try_match<S, D, R, T, N>(
    State(state): State<AppState<S, D, R, T, N>>,
    Json(request): Json<TryMatchRequest>,
) -> Response
where
    S: StationRegistry + 'static,
    D: DriverRegistry + 'static,
    R: RiderRegistry + 'static,
    T: TripService + 'static,
    N: Notifier + 'static,
{
    let Some(attempt) = request.into_attempt() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "arrival_eta_unix is not a representable timestamp".to_string(),
            }),
        )
            .into_response();
    };

    match state.engine.try_match(&attempt).await {
        Ok(outcome) => Json(TryMatchResponse::from_outcome(outcome)).into_response(),
        Err(e) => {
            warn!(
                route = %attempt.route_id,
                station = %attempt.station_id,
                error = %e,
                "match attempt aborted"
            );
            Json(TryMatchResponse::seats_only(e.seats_remaining)).into_response()
        }
    }
}
