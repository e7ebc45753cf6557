use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::types::{RawGasValue, SensorSample};

static READING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^T=(\S+)\s+H=(\S+)\s+GAS=(-?\d+)$").unwrap()
});

/// Parsed line variants from the sensor board's serial output
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// T=<celsius> H=<percent> GAS=<adc>
    Reading {
        temperature: f64,
        humidity: f64,
        gas_raw: RawGasValue,
    },
    /// Error message from the board
    Error(String),
    /// Unrecognized line (boot banner, blank line, ...)
    Unknown(String),
}

impl ParsedLine {
    /// Convert a reading line into a sample stamped with `timestamp`
    pub fn into_sample(self, timestamp: DateTime<Utc>) -> Option<SensorSample> {
        match self {
            ParsedLine::Reading {
                temperature,
                humidity,
                gas_raw,
            } => Some(SensorSample::with_timestamp(
                timestamp,
                temperature,
                humidity,
                gas_raw,
            )),
            _ => None,
        }
    }
}

// The board prints "nan" for a failed read, which f64 parsing accepts
fn parse_float(value: &str) -> Option<f64> {
    value.parse::<f64>().ok()
}

/// Parse a single line from the sensor board
pub fn parse_line(input: &str) -> ParsedLine {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return ParsedLine::Unknown(String::new());
    }

    if let Some(caps) = READING_REGEX.captures(trimmed) {
        let temperature = parse_float(&caps[1]);
        let humidity = parse_float(&caps[2]);
        let gas_raw = caps[3].parse::<RawGasValue>().ok();

        if let (Some(temperature), Some(humidity), Some(gas_raw)) = (temperature, humidity, gas_raw)
        {
            return ParsedLine::Reading {
                temperature,
                humidity,
                gas_raw,
            };
        }
    }

    if let Some(msg) = trimmed.strip_prefix("ERROR ") {
        return ParsedLine::Error(msg.to_string());
    }

    ParsedLine::Unknown(trimmed.to_string())
}
