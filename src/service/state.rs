use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::processing::{FreshnessStage, FruitType};
use crate::protocol::SensorReading;

/// Gas calibration phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationPhase {
    Calibrating,
    Ready,
}

/// Published calibration progress
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationStatus {
    pub phase: CalibrationPhase,
    pub baseline: i32,
    pub samples: u32,
    pub progress_percent: u8,
}

impl Default for CalibrationStatus {
    fn default() -> Self {
        Self {
            phase: CalibrationPhase::Calibrating,
            baseline: 0,
            samples: 0,
            progress_percent: 0,
        }
    }
}

/// Outputs of one scoring cycle
#[derive(Debug, Clone, Serialize)]
pub struct FreshnessAssessment {
    pub timestamp: DateTime<Utc>,
    pub fruit: FruitType,
    pub score: f64,
    pub stage: FreshnessStage,
    /// -1 once expired
    pub remaining_days: i32,
    pub storage_quality: i32,
    pub age_hours: f64,
}

/// Application state shared between the monitoring loop and the API
///
/// Only the monitoring loop writes results. Handlers write pending requests,
/// which the loop applies at the start of its next cycle.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub active_fruit: FruitType,
    pub pending_fruit: Option<FruitType>,
    pub recalibration_requested: bool,

    pub calibration: CalibrationStatus,

    pub latest_reading: Option<SensorReading>,
    pub latest_assessment: Option<FreshnessAssessment>,
    pub invalid_readings: u64,
}

impl MonitorState {
    pub fn new(fruit: FruitType) -> Self {
        Self {
            active_fruit: fruit,
            ..Self::default()
        }
    }

    /// Queue a fruit switch for the next monitoring cycle
    pub fn request_fruit(&mut self, fruit: FruitType) {
        self.pending_fruit = Some(fruit);
    }

    pub fn request_recalibration(&mut self) {
        self.recalibration_requested = true;
    }

    /// Take all pending requests, leaving none behind
    pub fn take_requests(&mut self) -> PendingRequests {
        PendingRequests {
            fruit: self.pending_fruit.take(),
            recalibrate: std::mem::take(&mut self.recalibration_requested),
        }
    }

    /// Whether the last reading came from a working sensor
    pub fn sensor_available(&self) -> bool {
        self.latest_reading.as_ref().is_some_and(|r| r.valid)
    }
}

/// Requests queued by handlers between cycles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingRequests {
    pub fruit: Option<FruitType>,
    pub recalibrate: bool,
}

/// Thread-safe shared state
pub type SharedState = Arc<RwLock<MonitorState>>;

/// Create a new shared state instance
pub fn create_shared_state(fruit: FruitType) -> SharedState {
    Arc::new(RwLock::new(MonitorState::new(fruit)))
}
