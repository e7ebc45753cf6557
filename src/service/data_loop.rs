use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc;

use crate::data_source::TimeBase;
use crate::error::FreshnessError;
use crate::processing::{
    Clock, FreshnessModel, FruitType, GasCalibrator, ManualClock, MonotonicClock,
    ReadingValidator,
};
use crate::protocol::{SensorReading, SensorSample};
use crate::service::state::{
    CalibrationPhase, CalibrationStatus, FreshnessAssessment, PendingRequests, SharedState,
};

/// Runtime settings for the monitoring loop
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub fruit: FruitType,
    /// Minimum span of samples averaged into the gas baseline
    pub calibration_window: std::time::Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            fruit: FruitType::Banana,
            calibration_window: std::time::Duration::from_secs(10),
        }
    }
}

/// Result of processing one sample
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Sample went into the gas baseline
    Calibrating(CalibrationStatus),
    /// Calibration window elapsed; baseline frozen
    Calibrated(CalibrationStatus),
    /// Sensor failure; model left untouched
    Invalid(SensorReading),
    Assessed {
        reading: SensorReading,
        assessment: FreshnessAssessment,
    },
}

/// Background monitoring loop
///
/// Owns the freshness model and the gas calibrator. Every mutation of either
/// happens here, one sample at a time.
pub struct MonitoringLoop {
    state: SharedState,
    model: FreshnessModel,
    calibrator: GasCalibrator,
    validator: ReadingValidator,
    calibration_window: TimeDelta,
    calibration_started: Option<DateTime<Utc>>,
    phase: CalibrationPhase,
    sample_clock: Option<Arc<ManualClock>>,
    timeline_origin: Option<DateTime<Utc>>,
}

impl MonitoringLoop {
    pub fn new(state: SharedState, config: &MonitorConfig, time_base: TimeBase) -> Self {
        let (clock, sample_clock): (Arc<dyn Clock>, Option<Arc<ManualClock>>) = match time_base {
            TimeBase::Wall => (Arc::new(MonotonicClock::new()), None),
            TimeBase::Sample => {
                let clock = Arc::new(ManualClock::new(0));
                (clock.clone(), Some(clock))
            }
        };

        let calibration_window =
            TimeDelta::from_std(config.calibration_window).unwrap_or(TimeDelta::MAX);

        Self {
            state,
            model: FreshnessModel::with_fruit(config.fruit, clock),
            calibrator: GasCalibrator::new(),
            validator: ReadingValidator::new(),
            calibration_window,
            calibration_started: None,
            phase: CalibrationPhase::Calibrating,
            sample_clock,
            timeline_origin: None,
        }
    }

    /// Run the loop, receiving samples from the channel
    pub async fn run(
        mut self,
        mut sample_rx: mpsc::Receiver<SensorSample>,
    ) -> Result<(), FreshnessError> {
        tracing::info!(
            "Monitoring loop started for {} (calibration window {}s)",
            self.model.fruit_type(),
            self.calibration_window.num_seconds()
        );

        while let Some(sample) = sample_rx.recv().await {
            let requests = {
                let mut state = self.state.write().await;
                state.take_requests()
            };

            let outcome = self.process_sample(&sample, requests);
            self.publish(outcome).await;
        }

        tracing::info!("Monitoring loop finished");
        Ok(())
    }

    /// Process a single sample after applying queued requests
    fn process_sample(
        &mut self,
        sample: &SensorSample,
        requests: PendingRequests,
    ) -> CycleOutcome {
        self.advance_sample_clock(sample.timestamp);
        self.apply_requests(requests);

        if self.phase == CalibrationPhase::Calibrating {
            return self.calibrate(sample);
        }

        let reading = self.validator.reading(sample, self.calibrator.baseline());

        if !reading.valid {
            tracing::warn!(
                "Invalid reading, keeping previous score: {:?}",
                reading.validation_error
            );
            return CycleOutcome::Invalid(reading);
        }

        self.model
            .update_readings(reading.temperature, reading.humidity, reading.gas_delta);

        let assessment = FreshnessAssessment {
            timestamp: reading.timestamp,
            fruit: self.model.fruit_type(),
            score: self.model.score(),
            stage: self.model.stage(),
            remaining_days: self.model.remaining_days(),
            storage_quality: self.model.storage_score(reading.temperature, reading.humidity),
            age_hours: self.model.age_hours(),
        };

        tracing::debug!(
            "Assessed {}: T={:.1} H={:.1} gas_delta={} score={:.1} stage={} days={} storage={}",
            assessment.fruit,
            reading.temperature,
            reading.humidity,
            reading.gas_delta,
            assessment.score,
            assessment.stage.label(),
            assessment.remaining_days,
            assessment.storage_quality
        );

        CycleOutcome::Assessed {
            reading,
            assessment,
        }
    }

    fn advance_sample_clock(&mut self, timestamp: DateTime<Utc>) {
        let Some(clock) = &self.sample_clock else {
            return;
        };

        let origin = *self.timeline_origin.get_or_insert(timestamp);
        let elapsed = (timestamp - origin).num_milliseconds().max(0);
        clock.set_millis(elapsed as u64);
    }

    fn apply_requests(&mut self, requests: PendingRequests) {
        if requests.recalibrate {
            tracing::info!("Re-calibrating gas sensor");
            self.calibrator.reset();
            self.calibration_started = None;
            self.phase = CalibrationPhase::Calibrating;
        }

        if let Some(fruit) = requests.fruit {
            tracing::info!("Switching fruit from {} to {}", self.model.fruit_type(), fruit);
            self.model.set_fruit_type(fruit);
        }
    }

    fn calibrate(&mut self, sample: &SensorSample) -> CycleOutcome {
        match self.validator.validate_gas(sample.gas_raw) {
            Ok(()) => self.calibrator.add_sample(sample.gas_raw),
            Err(error) => tracing::warn!("Skipping calibration sample: {}", error),
        }

        let started = *self.calibration_started.get_or_insert(sample.timestamp);
        let elapsed = sample.timestamp - started;

        let progress = if self.calibration_window <= TimeDelta::zero() {
            100
        } else {
            let ratio = elapsed.num_milliseconds() as f64
                / self.calibration_window.num_milliseconds() as f64;
            (ratio * 100.0).clamp(0.0, 100.0) as u8
        };

        let done = elapsed >= self.calibration_window && self.calibrator.is_calibrated();
        if done {
            self.phase = CalibrationPhase::Ready;
            tracing::info!(
                "Gas baseline calibrated at {} from {} samples",
                self.calibrator.baseline(),
                self.calibrator.sample_count()
            );
        }

        let status = CalibrationStatus {
            phase: self.phase,
            baseline: self.calibrator.baseline(),
            samples: self.calibrator.sample_count(),
            progress_percent: progress,
        };

        if done {
            CycleOutcome::Calibrated(status)
        } else {
            tracing::trace!("Calibrating: {}%", progress);
            CycleOutcome::Calibrating(status)
        }
    }

    /// Write the outcome of a cycle to shared state
    async fn publish(&self, outcome: CycleOutcome) {
        let mut state = self.state.write().await;
        state.active_fruit = self.model.fruit_type();

        match outcome {
            CycleOutcome::Calibrating(status) | CycleOutcome::Calibrated(status) => {
                state.calibration = status;
            }
            CycleOutcome::Invalid(reading) => {
                state.invalid_readings += 1;
                state.latest_reading = Some(reading);
            }
            CycleOutcome::Assessed {
                reading,
                assessment,
            } => {
                state.latest_reading = Some(reading);
                state.latest_assessment = Some(assessment);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    use super::*;
    use crate::processing::FreshnessStage;
    use crate::protocol::parse_line;
    use crate::service::state::create_shared_state;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
    }

    fn sample_at(seconds: i64, temperature: f64, humidity: f64, gas: i32) -> SensorSample {
        SensorSample::with_timestamp(
            t0() + TimeDelta::seconds(seconds),
            temperature,
            humidity,
            gas,
        )
    }

    fn new_loop() -> MonitoringLoop {
        let state = create_shared_state(FruitType::Banana);
        MonitoringLoop::new(state, &MonitorConfig::default(), TimeBase::Sample)
    }

    fn calibrate(monitor: &mut MonitoringLoop, gas: i32) {
        for second in 0..=10 {
            monitor.process_sample(
                &sample_at(second, 20.0, 65.0, gas),
                PendingRequests::default(),
            );
        }
        assert_eq!(monitor.phase, CalibrationPhase::Ready);
    }

    #[test]
    fn test_calibration_window() {
        let mut monitor = new_loop();

        let outcome =
            monitor.process_sample(&sample_at(0, 20.0, 65.0, 390), PendingRequests::default());
        let CycleOutcome::Calibrating(status) = outcome else {
            panic!("Expected calibrating");
        };
        assert_eq!(status.progress_percent, 0);
        assert_eq!(status.baseline, 390);

        let outcome =
            monitor.process_sample(&sample_at(5, 20.0, 65.0, 410), PendingRequests::default());
        let CycleOutcome::Calibrating(status) = outcome else {
            panic!("Expected calibrating");
        };
        assert_eq!(status.progress_percent, 50);

        let outcome =
            monitor.process_sample(&sample_at(10, 20.0, 65.0, 400), PendingRequests::default());
        let CycleOutcome::Calibrated(status) = outcome else {
            panic!("Expected calibrated");
        };
        assert_eq!(status.phase, CalibrationPhase::Ready);
        assert_eq!(status.baseline, 400);
        assert_eq!(status.samples, 3);
        assert_eq!(status.progress_percent, 100);
    }

    #[test]
    fn test_invalid_sample_counts_toward_calibration() {
        let mut monitor = new_loop();

        let outcome = monitor.process_sample(
            &sample_at(0, f64::NAN, f64::NAN, 420),
            PendingRequests::default(),
        );
        assert!(matches!(outcome, CycleOutcome::Calibrating(_)));
        assert_eq!(monitor.calibrator.baseline(), 420);
    }

    #[test]
    fn test_scoring_after_calibration() {
        let mut monitor = new_loop();
        calibrate(&mut monitor, 400);

        let outcome =
            monitor.process_sample(&sample_at(11, 20.0, 65.0, 400), PendingRequests::default());
        let CycleOutcome::Assessed {
            reading,
            assessment,
        } = outcome
        else {
            panic!("Expected assessment");
        };

        assert!(reading.valid);
        assert_eq!(reading.gas_delta, 0);
        assert!(assessment.score > 99.9);
        assert_eq!(assessment.stage, FreshnessStage::VeryFresh);
        assert_eq!(assessment.remaining_days, 6);
        assert_eq!(assessment.storage_quality, 100);
    }

    #[test]
    fn test_banana_scenario_on_sample_timeline() {
        let mut monitor = new_loop();
        calibrate(&mut monitor, 400);

        // Switching restarts the decay clock at this sample
        let switch = PendingRequests {
            fruit: Some(FruitType::Banana),
            recalibrate: false,
        };
        let outcome = monitor.process_sample(&sample_at(60, 20.0, 65.0, 400), switch);
        let CycleOutcome::Assessed { assessment, .. } = outcome else {
            panic!("Expected assessment");
        };
        assert_relative_eq!(assessment.score, 100.0);
        assert_eq!(assessment.remaining_days, 7);

        let outcome = monitor.process_sample(
            &sample_at(60 + 24 * 3600, 30.0, 65.0, 460),
            PendingRequests::default(),
        );
        let CycleOutcome::Assessed { assessment, .. } = outcome else {
            panic!("Expected assessment");
        };

        assert_relative_eq!(assessment.score, 46.6, epsilon = 1e-9);
        assert_relative_eq!(assessment.age_hours, 24.0);
        assert_eq!(assessment.stage, FreshnessStage::EatToday);
        assert_eq!(assessment.remaining_days, 3);
        assert_eq!(assessment.storage_quality, 60);
    }

    #[test]
    fn test_invalid_reading_keeps_previous_score() {
        let mut monitor = new_loop();
        calibrate(&mut monitor, 400);

        monitor.process_sample(&sample_at(20, 25.0, 65.0, 400), PendingRequests::default());
        let score = monitor.model.score();

        let outcome = monitor.process_sample(
            &sample_at(3600, f64::NAN, 65.0, 900),
            PendingRequests::default(),
        );
        let CycleOutcome::Invalid(reading) = outcome else {
            panic!("Expected invalid reading");
        };

        assert!(!reading.valid);
        assert_relative_eq!(monitor.model.score(), score);
    }

    #[test]
    fn test_extreme_gas_line_is_rejected() {
        let mut monitor = new_loop();
        calibrate(&mut monitor, 400);

        monitor.process_sample(&sample_at(20, 25.0, 65.0, 400), PendingRequests::default());
        let score = monitor.model.score();

        for line in ["T=20.0 H=65.0 GAS=-2147483648", "T=nan H=nan GAS=2147483647"] {
            let sample = parse_line(line)
                .into_sample(t0() + TimeDelta::seconds(30))
                .unwrap();

            let outcome = monitor.process_sample(&sample, PendingRequests::default());
            let CycleOutcome::Invalid(reading) = outcome else {
                panic!("Expected invalid reading for {line}");
            };
            assert!(!reading.valid);
        }

        assert_relative_eq!(monitor.model.score(), score);
    }

    #[test]
    fn test_out_of_range_gas_skipped_during_calibration() {
        let mut monitor = new_loop();

        monitor.process_sample(&sample_at(0, 20.0, 65.0, 400), PendingRequests::default());
        let outcome =
            monitor.process_sample(&sample_at(5, 20.0, 65.0, -5000), PendingRequests::default());
        let CycleOutcome::Calibrating(status) = outcome else {
            panic!("Expected calibrating");
        };

        assert_eq!(status.samples, 1);
        assert_eq!(status.baseline, 400);
    }

    #[test]
    fn test_fruit_switch_applied_before_scoring() {
        let mut monitor = new_loop();
        calibrate(&mut monitor, 400);

        let switch = PendingRequests {
            fruit: Some(FruitType::Apple),
            recalibrate: false,
        };
        let outcome = monitor.process_sample(&sample_at(7200, 2.0, 92.5, 400), switch);
        let CycleOutcome::Assessed { assessment, .. } = outcome else {
            panic!("Expected assessment");
        };

        assert_eq!(assessment.fruit, FruitType::Apple);
        assert_relative_eq!(assessment.score, 100.0);
        assert_relative_eq!(assessment.age_hours, 0.0);
        assert_eq!(assessment.remaining_days, 30);
    }

    #[test]
    fn test_recalibration_discards_old_baseline() {
        let mut monitor = new_loop();
        calibrate(&mut monitor, 400);

        let recalibrate = PendingRequests {
            fruit: None,
            recalibrate: true,
        };
        let outcome = monitor.process_sample(&sample_at(100, 20.0, 65.0, 500), recalibrate);
        assert!(matches!(outcome, CycleOutcome::Calibrating(_)));
        assert_eq!(monitor.calibrator.baseline(), 500);

        let outcome =
            monitor.process_sample(&sample_at(110, 20.0, 65.0, 500), PendingRequests::default());
        let CycleOutcome::Calibrated(status) = outcome else {
            panic!("Expected calibrated");
        };
        assert_eq!(status.baseline, 500);
    }

    #[test]
    fn test_zero_window_calibrates_on_first_sample() {
        let state = create_shared_state(FruitType::Grape);
        let config = MonitorConfig {
            fruit: FruitType::Grape,
            calibration_window: std::time::Duration::ZERO,
        };
        let mut monitor = MonitoringLoop::new(state, &config, TimeBase::Wall);

        let outcome =
            monitor.process_sample(&sample_at(0, 1.0, 92.5, 350), PendingRequests::default());
        assert!(matches!(outcome, CycleOutcome::Calibrated(_)));
        assert_eq!(monitor.model.fruit_type(), FruitType::Grape);
    }

    #[tokio::test]
    async fn test_run_publishes_to_state() {
        let state = create_shared_state(FruitType::Banana);
        let config = MonitorConfig {
            fruit: FruitType::Banana,
            calibration_window: std::time::Duration::ZERO,
        };
        let monitor = MonitoringLoop::new(state.clone(), &config, TimeBase::Sample);

        state.write().await.request_fruit(FruitType::Orange);

        let (tx, rx) = mpsc::channel(8);
        tx.send(sample_at(0, 7.0, 87.5, 410)).await.unwrap();
        tx.send(sample_at(1, 7.0, 87.5, 410)).await.unwrap();
        tx.send(sample_at(2, f64::NAN, 87.5, 410)).await.unwrap();
        drop(tx);

        monitor.run(rx).await.unwrap();

        let state = state.read().await;
        assert_eq!(state.active_fruit, FruitType::Orange);
        assert!(state.pending_fruit.is_none());
        assert_eq!(state.calibration.phase, CalibrationPhase::Ready);
        assert_eq!(state.calibration.baseline, 410);
        assert_eq!(state.invalid_readings, 1);
        assert!(!state.sensor_available());

        let assessment = state.latest_assessment.as_ref().unwrap();
        assert_eq!(assessment.fruit, FruitType::Orange);
        assert_eq!(assessment.stage, FreshnessStage::VeryFresh);
    }
}
