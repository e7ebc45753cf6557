use thiserror::Error;

/// Main error type for the freshness service
#[derive(Error, Debug)]
pub enum FreshnessError {
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    #[error("Protocol parse error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data source error: {0}")]
    DataSource(String),
}

/// Errors in the sensor board line protocol
#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    #[error("Device reported error: {0}")]
    DeviceError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::InvalidTimestamp("2025/01/15".to_string());
        assert!(err.to_string().contains("Invalid timestamp format: 2025/01/15"));

        let err = ProtocolError::DeviceError("DHT22 timeout".to_string());
        assert!(err.to_string().contains("DHT22 timeout"));
    }

    #[test]
    fn test_freshness_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FreshnessError = io_err.into();
        assert!(matches!(err, FreshnessError::Io(_)));
    }

    #[test]
    fn test_freshness_error_from_protocol() {
        let err: FreshnessError = ProtocolError::ParseError("bad line".to_string()).into();
        assert!(err.to_string().contains("bad line"));
    }

    #[test]
    fn test_config_error() {
        let err = FreshnessError::Config("calibration window must be positive".to_string());
        assert!(err.to_string().contains("calibration window must be positive"));
    }
}
