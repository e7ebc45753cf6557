use serde::{Deserialize, Serialize};

use crate::processing::{FruitProfile, FruitType};
use crate::protocol::SensorReading;
use crate::service::state::{CalibrationPhase, CalibrationStatus, FreshnessAssessment};

// ============= Device Endpoints =============

#[derive(Debug, Serialize)]
pub struct DeviceInfoResponse {
    #[serde(rename = "type")]
    pub device_type: String,
    pub name: String,
    pub capabilities: DeviceCapabilities,
}

#[derive(Debug, Serialize)]
pub struct DeviceCapabilities {
    pub has_temperature: bool,
    pub has_humidity: bool,
    pub has_gas_sensor: bool,
    pub supported_fruits: Vec<FruitType>,
}

// ============= Freshness Endpoints =============

#[derive(Debug, Serialize)]
pub struct FreshnessResponse {
    pub fruit: FruitType,
    pub fruit_name: &'static str,
    pub emoji: &'static str,
    pub sensor_available: bool,
    pub calibration_phase: CalibrationPhase,
    pub stage_label: Option<&'static str>,
    pub assessment: Option<FreshnessAssessment>,
    pub reading: Option<SensorReading>,
    pub invalid_readings: u64,
}

#[derive(Debug, Deserialize)]
pub struct FruitSelectionRequest {
    pub fruit: FruitType,
}

#[derive(Debug, Serialize)]
pub struct FruitSelectionResponse {
    pub active: FruitType,
    pub pending: Option<FruitType>,
}

#[derive(Debug, Serialize)]
pub struct ProfileEntry {
    pub fruit: FruitType,
    #[serde(flatten)]
    pub profile: &'static FruitProfile,
}

// ============= Calibration Endpoints =============

#[derive(Debug, Serialize)]
pub struct CalibrationResponse {
    #[serde(flatten)]
    pub status: CalibrationStatus,
    pub recalibration_pending: bool,
}
