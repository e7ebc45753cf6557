use axum::Json;
use axum::extract::State;

use crate::api::models::*;
use crate::processing::FruitType;
use crate::service::SharedState;

/// GET /freshness - Latest assessment and reading
pub async fn get_freshness(State(state): State<SharedState>) -> Json<FreshnessResponse> {
    let state = state.read().await;

    Json(FreshnessResponse {
        fruit: state.active_fruit,
        fruit_name: state.active_fruit.display_name(),
        emoji: state.active_fruit.emoji(),
        sensor_available: state.sensor_available(),
        calibration_phase: state.calibration.phase,
        stage_label: state.latest_assessment.as_ref().map(|a| a.stage.label()),
        assessment: state.latest_assessment.clone(),
        reading: state.latest_reading.clone(),
        invalid_readings: state.invalid_readings,
    })
}

/// GET /fruit - Active fruit and any queued switch
pub async fn get_fruit(State(state): State<SharedState>) -> Json<FruitSelectionResponse> {
    let state = state.read().await;

    Json(FruitSelectionResponse {
        active: state.active_fruit,
        pending: state.pending_fruit,
    })
}

/// POST /fruit - Queue a fruit switch for the next monitoring cycle
pub async fn set_fruit(
    State(state): State<SharedState>,
    Json(request): Json<FruitSelectionRequest>,
) -> Json<FruitSelectionResponse> {
    let mut state = state.write().await;

    state.request_fruit(request.fruit);

    tracing::info!("Fruit switch to {} queued", request.fruit);

    Json(FruitSelectionResponse {
        active: state.active_fruit,
        pending: state.pending_fruit,
    })
}

/// GET /profiles - All fruit storage profiles
pub async fn get_profiles() -> Json<Vec<ProfileEntry>> {
    Json(
        FruitType::ALL
            .iter()
            .map(|&fruit| ProfileEntry {
                fruit,
                profile: fruit.profile(),
            })
            .collect(),
    )
}
