pub mod calibration;
pub mod clock;
pub mod freshness;
pub mod profiles;
pub mod validation;

pub use calibration::GasCalibrator;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use freshness::{FreshnessModel, FreshnessStage};
pub use profiles::{FruitProfile, FruitType};
pub use validation::ReadingValidator;
