use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::profiles::{FruitProfile, FruitType};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Storage quality penalty per degree outside the optimal temperature band
const STORAGE_TEMP_PENALTY: f64 = 5.0;

/// Storage quality penalty per percent outside the optimal humidity band
const STORAGE_HUMIDITY_PENALTY: f64 = 2.0;

/// Discrete freshness classification derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FreshnessStage {
    /// [80, 100]
    VeryFresh,
    /// [60, 80)
    Good,
    /// [40, 60)
    EatToday,
    /// [0, 40)
    Spoiled,
}

impl FreshnessStage {
    /// Classify a score; lower bounds are inclusive
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            FreshnessStage::VeryFresh
        } else if score >= 60.0 {
            FreshnessStage::Good
        } else if score >= 40.0 {
            FreshnessStage::EatToday
        } else {
            FreshnessStage::Spoiled
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FreshnessStage::VeryFresh => "VERY FRESH",
            FreshnessStage::Good => "GOOD",
            FreshnessStage::EatToday => "EAT TODAY",
            FreshnessStage::Spoiled => "SPOILED",
        }
    }
}

/// Stateful freshness scorer for the currently monitored fruit
///
/// The score is recomputed from scratch on every reading; the only state
/// carried between readings is the time origin, which restarts whenever the
/// fruit type changes.
pub struct FreshnessModel {
    fruit: FruitType,
    profile: &'static FruitProfile,
    current_score: f64,
    start_time: u64,
    clock: Arc<dyn Clock>,
}

impl FreshnessModel {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_fruit(FruitType::default(), clock)
    }

    pub fn with_fruit(fruit: FruitType, clock: Arc<dyn Clock>) -> Self {
        let profile = fruit.profile();
        Self {
            fruit,
            profile,
            current_score: profile.initial_score,
            start_time: clock.now_millis(),
            clock,
        }
    }

    /// Switch profile, re-seed the score and restart the decay clock
    pub fn set_fruit_type(&mut self, fruit: FruitType) {
        self.fruit = fruit;
        self.profile = fruit.profile();
        self.current_score = self.profile.initial_score;
        self.start_time = self.clock.now_millis();
    }

    pub fn fruit_type(&self) -> FruitType {
        self.fruit
    }

    pub fn profile(&self) -> &'static FruitProfile {
        self.profile
    }

    /// Recompute the score from a valid reading
    pub fn update_readings(&mut self, temperature: f64, humidity: f64, gas_delta: i32) {
        self.current_score = self.calculate_score(temperature, humidity, gas_delta);
    }

    /// Hours elapsed since the last fruit-type reset
    pub fn age_hours(&self) -> f64 {
        let elapsed = self.clock.now_millis().saturating_sub(self.start_time);
        elapsed as f64 / MILLIS_PER_HOUR
    }

    fn calculate_score(&self, temperature: f64, humidity: f64, gas_delta: i32) -> f64 {
        freshness_score(self.profile, temperature, humidity, gas_delta, self.age_hours())
    }

    pub fn score(&self) -> f64 {
        self.current_score
    }

    /// Remaining shelf life in whole days, or -1 once expired
    pub fn remaining_days(&self) -> i32 {
        if self.current_score <= 0.0 {
            return -1;
        }

        let ratio = self.current_score / 100.0;
        (ratio * f64::from(self.profile.expected_life_days)).floor() as i32
    }

    pub fn stage(&self) -> FreshnessStage {
        FreshnessStage::from_score(self.current_score)
    }

    /// Rate how well ambient conditions match the profile's storage band
    ///
    /// Independent of elapsed time and of the freshness score.
    pub fn storage_score(&self, temperature: f64, humidity: f64) -> i32 {
        storage_score(self.profile, temperature, humidity)
    }
}

/// Freshness score for a reading taken `age_hours` after the time origin
///
/// Temperature and humidity are penalized symmetrically around the profile
/// midpoints. Gas and time only ever subtract.
pub fn freshness_score(
    profile: &FruitProfile,
    temperature: f64,
    humidity: f64,
    gas_delta: i32,
    age_hours: f64,
) -> f64 {
    let temp_penalty = (temperature - profile.optimal_temp()).abs() * profile.temp_decay_coeff;
    let humid_penalty =
        (humidity - profile.optimal_humidity()).abs() * profile.humid_decay_coeff;

    let gas_penalty = if gas_delta > 0 {
        f64::from(gas_delta) * profile.gas_decay_coeff
    } else {
        0.0
    };

    let time_penalty = age_hours * profile.time_decay_coeff;

    let score = profile.initial_score - temp_penalty - humid_penalty - gas_penalty - time_penalty;
    score.clamp(0.0, 100.0)
}

/// Storage quality in 0-100; only readings outside the band are penalized
pub fn storage_score(profile: &FruitProfile, temperature: f64, humidity: f64) -> i32 {
    let mut score: i32 = 100;

    if temperature < profile.min_temp {
        score = deduct(score, (profile.min_temp - temperature) * STORAGE_TEMP_PENALTY);
    } else if temperature > profile.max_temp {
        score = deduct(score, (temperature - profile.max_temp) * STORAGE_TEMP_PENALTY);
    }

    if humidity < profile.min_humidity {
        score = deduct(score, (profile.min_humidity - humidity) * STORAGE_HUMIDITY_PENALTY);
    } else if humidity > profile.max_humidity {
        score = deduct(score, (humidity - profile.max_humidity) * STORAGE_HUMIDITY_PENALTY);
    }

    score.clamp(0, 100)
}

// Integer score minus a fractional penalty, truncated toward zero
fn deduct(score: i32, penalty: f64) -> i32 {
    (f64::from(score) - penalty) as i32
}
