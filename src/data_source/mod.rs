pub mod playback;
pub mod serial;

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::FreshnessError;
use crate::protocol::{ParsedLine, SensorSample};

/// Trait for abstracting data sources (real hardware vs playback)
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Start the data source and return a channel receiver for samples
    async fn start(&mut self) -> Result<mpsc::Receiver<SensorSample>, FreshnessError>;

    /// Stop the data source
    async fn stop(&mut self) -> Result<(), FreshnessError>;

    /// Check if data source is active
    fn is_active(&self) -> bool;

    /// Get the name of this data source for logging
    fn name(&self) -> &str;
}

/// Time base the freshness model should follow for a data source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBase {
    /// Wall-clock monotonic time
    Wall,
    /// Timestamps carried by the samples themselves
    Sample,
}

/// Configuration for creating data sources
#[derive(Debug, Clone)]
pub enum DataSourceConfig {
    /// Real serial port connection
    Serial { port: String, baud_rate: u32 },
    /// Log file playback
    Playback {
        log_file: PathBuf,
        speed_multiplier: f64,
        loop_playback: bool,
    },
}

impl DataSourceConfig {
    /// Create a data source from this configuration
    pub fn create_source(&self) -> Box<dyn DataSource> {
        match self {
            DataSourceConfig::Serial { port, baud_rate } => {
                Box::new(serial::SerialDataSource::new(port.clone(), *baud_rate))
            }
            DataSourceConfig::Playback {
                log_file,
                speed_multiplier,
                loop_playback,
            } => Box::new(playback::PlaybackDataSource::new(
                log_file.clone(),
                *speed_multiplier,
                *loop_playback,
            )),
        }
    }

    /// Playback decays fruit along the log's own timeline
    pub fn time_base(&self) -> TimeBase {
        match self {
            DataSourceConfig::Serial { .. } => TimeBase::Wall,
            DataSourceConfig::Playback { .. } => TimeBase::Sample,
        }
    }
}

/// Log non-reading lines from the board
pub(crate) fn log_non_reading(line: &ParsedLine) {
    match line {
        ParsedLine::Error(msg) => {
            let err = crate::error::ProtocolError::DeviceError(msg.clone());
            tracing::warn!("{}", err);
        }
        ParsedLine::Unknown(content) if !content.is_empty() => {
            tracing::trace!("Ignoring line: {}", content);
        }
        _ => {}
    }
}
