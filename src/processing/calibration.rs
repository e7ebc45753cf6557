/// Gas sensor baseline calibrator
///
/// Accumulates raw ADC samples while the sensor sits in clean air and uses
/// their arithmetic mean as the reference point for every later gas delta.
/// The baseline is live while sampling; callers read it once the calibration
/// window has elapsed.
#[derive(Debug, Default, Clone)]
pub struct GasCalibrator {
    sum: i64,
    count: u32,
    baseline: i32,
}

impl GasCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one raw reading to the running mean
    pub fn add_sample(&mut self, raw: i32) {
        self.sum += i64::from(raw);
        self.count += 1;
        self.baseline = (self.sum / i64::from(self.count)) as i32;
    }

    /// Current baseline; 0 until the first sample arrives
    pub fn baseline(&self) -> i32 {
        self.baseline
    }

    pub fn sample_count(&self) -> u32 {
        self.count
    }

    pub fn is_calibrated(&self) -> bool {
        self.count > 0
    }

    /// Discard all accumulated samples before a re-calibration
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
