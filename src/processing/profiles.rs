use serde::{Deserialize, Serialize};

/// Supported fruit types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FruitType {
    #[default]
    Banana,
    Orange,
    Apple,
    Grape,
}

/// Storage parameters and decay coefficients for one fruit type
///
/// Storage ranges follow Kader (2002), gas sensitivity Saltveit (1999).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FruitProfile {
    pub name: &'static str,
    pub emoji: &'static str,

    pub min_temp: f64,
    pub max_temp: f64,
    pub min_humidity: f64,
    pub max_humidity: f64,

    pub gas_threshold: f64,

    pub temp_decay_coeff: f64,
    pub humid_decay_coeff: f64,
    pub gas_decay_coeff: f64,
    /// Score points lost per hour of elapsed time
    pub time_decay_coeff: f64,

    pub initial_score: f64,
    pub expected_life_days: u32,
}

impl FruitProfile {
    /// Midpoint of the optimal temperature range
    pub fn optimal_temp(&self) -> f64 {
        (self.min_temp + self.max_temp) / 2.0
    }

    /// Midpoint of the optimal humidity range
    pub fn optimal_humidity(&self) -> f64 {
        (self.min_humidity + self.max_humidity) / 2.0
    }
}

static BANANA: FruitProfile = FruitProfile {
    name: "Banana",
    emoji: "🍌",
    min_temp: 18.0,
    max_temp: 22.0,
    min_humidity: 60.0,
    max_humidity: 70.0,
    gas_threshold: 50.0,
    temp_decay_coeff: 3.0,
    humid_decay_coeff: 2.0,
    gas_decay_coeff: 0.15,
    time_decay_coeff: 0.6,
    initial_score: 100.0,
    expected_life_days: 7,
};

static ORANGE: FruitProfile = FruitProfile {
    name: "Orange",
    emoji: "🍊",
    min_temp: 4.0,
    max_temp: 10.0,
    min_humidity: 85.0,
    max_humidity: 90.0,
    gas_threshold: 80.0,
    temp_decay_coeff: 2.5,
    humid_decay_coeff: 1.5,
    gas_decay_coeff: 0.08,
    time_decay_coeff: 0.3,
    initial_score: 100.0,
    expected_life_days: 14,
};

static APPLE: FruitProfile = FruitProfile {
    name: "Apple",
    emoji: "🍎",
    min_temp: 0.0,
    max_temp: 4.0,
    min_humidity: 90.0,
    max_humidity: 95.0,
    gas_threshold: 60.0,
    temp_decay_coeff: 2.0,
    humid_decay_coeff: 1.5,
    gas_decay_coeff: 0.10,
    time_decay_coeff: 0.2,
    initial_score: 100.0,
    expected_life_days: 30,
};

static GRAPE: FruitProfile = FruitProfile {
    name: "Grape",
    emoji: "🍇",
    min_temp: 0.0,
    max_temp: 2.0,
    min_humidity: 90.0,
    max_humidity: 95.0,
    gas_threshold: 70.0,
    temp_decay_coeff: 2.5,
    humid_decay_coeff: 2.0,
    gas_decay_coeff: 0.12,
    time_decay_coeff: 0.8,
    initial_score: 100.0,
    expected_life_days: 10,
};

impl FruitType {
    pub const ALL: [FruitType; 4] = [
        FruitType::Banana,
        FruitType::Orange,
        FruitType::Apple,
        FruitType::Grape,
    ];

    /// Look up the static profile for this fruit type
    pub fn profile(&self) -> &'static FruitProfile {
        match self {
            FruitType::Banana => &BANANA,
            FruitType::Orange => &ORANGE,
            FruitType::Apple => &APPLE,
            FruitType::Grape => &GRAPE,
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.profile().name
    }

    pub fn emoji(&self) -> &'static str {
        self.profile().emoji
    }
}

impl std::fmt::Display for FruitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
