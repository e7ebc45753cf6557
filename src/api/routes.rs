use axum::Router;
use axum::routing::get;

use super::handlers::{calibration, device, freshness};
use crate::service::SharedState;

/// Create the API router with all endpoints
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // Device info
        .route("/device/info", get(device::get_device_info))
        // Freshness readout and fruit selection
        .route("/freshness", get(freshness::get_freshness))
        .route(
            "/fruit",
            get(freshness::get_fruit).post(freshness::set_fruit),
        )
        .route("/profiles", get(freshness::get_profiles))
        // Gas sensor calibration
        .route(
            "/calibration",
            get(calibration::get_calibration).post(calibration::start_calibration),
        )
        // Add state to all routes
        .with_state(state)
}
