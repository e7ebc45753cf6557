pub mod calibration;
pub mod device;
pub mod freshness;
