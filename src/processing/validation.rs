use crate::protocol::types::{MAX_GAS_ADC, RawGasValue, SensorReading, SensorSample};

/// Operating range of the temperature sensor in °C
pub const TEMPERATURE_RANGE: (f64, f64) = (-40.0, 80.0);

/// Operating range of the humidity sensor in %RH
pub const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);

/// Reading validator
///
/// A reading is valid when temperature and humidity are present and inside
/// the sensor's operating range and the gas value fits the 10-bit ADC.
/// Invalid readings must never reach the freshness model.
pub struct ReadingValidator;

impl ReadingValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate temperature and humidity
    ///
    /// Returns Ok(()) if valid, Err with description if invalid
    pub fn validate(&self, temperature: f64, humidity: f64) -> Result<(), String> {
        if temperature.is_nan() {
            return Err("temperature reading missing".to_string());
        }

        if humidity.is_nan() {
            return Err("humidity reading missing".to_string());
        }

        let (t_min, t_max) = TEMPERATURE_RANGE;
        if !(t_min..=t_max).contains(&temperature) {
            return Err(format!(
                "temperature ({:.1}) outside sensor range [{}, {}]",
                temperature, t_min, t_max
            ));
        }

        let (h_min, h_max) = HUMIDITY_RANGE;
        if !(h_min..=h_max).contains(&humidity) {
            return Err(format!(
                "humidity ({:.1}) outside sensor range [{}, {}]",
                humidity, h_min, h_max
            ));
        }

        Ok(())
    }

    /// Validate a raw gas ADC value
    pub fn validate_gas(&self, gas_raw: RawGasValue) -> Result<(), String> {
        if !(0..=MAX_GAS_ADC).contains(&gas_raw) {
            return Err(format!(
                "gas ADC value ({}) outside range [0, {}]",
                gas_raw, MAX_GAS_ADC
            ));
        }

        Ok(())
    }

    /// Build a reading from a sample and the frozen gas baseline, marking it
    /// invalid when validation fails
    pub fn reading(&self, sample: &SensorSample, gas_baseline: RawGasValue) -> SensorReading {
        let reading = SensorReading::new(sample, gas_baseline);

        let result = self
            .validate(sample.temperature, sample.humidity)
            .and_then(|()| self.validate_gas(sample.gas_raw));

        match result {
            Ok(()) => reading,
            Err(error) => reading.with_error(error),
        }
    }
}

impl Default for ReadingValidator {
    fn default() -> Self {
        Self::new()
    }
}
