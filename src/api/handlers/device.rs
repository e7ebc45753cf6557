use axum::Json;

use crate::api::models::*;
use crate::processing::FruitType;

/// GET /device/info - Return device capabilities
pub async fn get_device_info() -> Json<DeviceInfoResponse> {
    Json(DeviceInfoResponse {
        device_type: "freshness-monitor".to_string(),
        name: "Fruit Freshness Monitor".to_string(),
        capabilities: DeviceCapabilities {
            has_temperature: true,
            has_humidity: true,
            has_gas_sensor: true,
            supported_fruits: FruitType::ALL.to_vec(),
        },
    })
}
