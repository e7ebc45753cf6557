use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw reading from the 10-bit gas sensor ADC (0-1023)
pub type RawGasValue = i32;

/// Maximum valid gas ADC value
pub const MAX_GAS_ADC: RawGasValue = 1023;

/// One sample as reported by the sensor board
///
/// Temperature and humidity are NaN when the board failed to read the
/// humidity/temperature sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub gas_raw: RawGasValue,
}

impl SensorSample {
    pub fn new(temperature: f64, humidity: f64, gas_raw: RawGasValue) -> Self {
        Self {
            timestamp: Utc::now(),
            temperature,
            humidity,
            gas_raw,
        }
    }

    pub fn with_timestamp(
        timestamp: DateTime<Utc>,
        temperature: f64,
        humidity: f64,
        gas_raw: RawGasValue,
    ) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
            gas_raw,
        }
    }
}

/// A sample combined with the frozen gas baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub gas_raw: RawGasValue,
    pub gas_baseline: RawGasValue,
    /// gas_raw - gas_baseline, saturating at the i32 bounds
    pub gas_delta: i32,
    pub valid: bool,
    pub validation_error: Option<String>,
}

impl SensorReading {
    pub fn new(sample: &SensorSample, gas_baseline: RawGasValue) -> Self {
        Self {
            timestamp: sample.timestamp,
            temperature: sample.temperature,
            humidity: sample.humidity,
            gas_raw: sample.gas_raw,
            gas_baseline,
            gas_delta: sample.gas_raw.saturating_sub(gas_baseline),
            valid: true,
            validation_error: None,
        }
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.valid = false;
        self.validation_error = Some(error);
        self
    }
}
