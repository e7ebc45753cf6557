use axum::Json;
use axum::extract::State;

use crate::api::models::*;
use crate::service::SharedState;

/// GET /calibration - Gas baseline calibration status
pub async fn get_calibration(State(state): State<SharedState>) -> Json<CalibrationResponse> {
    let state = state.read().await;

    Json(CalibrationResponse {
        status: state.calibration.clone(),
        recalibration_pending: state.recalibration_requested,
    })
}

/// POST /calibration - Queue a gas sensor re-calibration
pub async fn start_calibration(State(state): State<SharedState>) -> Json<CalibrationResponse> {
    let mut state = state.write().await;

    state.request_recalibration();

    tracing::info!("Gas sensor re-calibration queued");

    Json(CalibrationResponse {
        status: state.calibration.clone(),
        recalibration_pending: state.recalibration_requested,
    })
}
