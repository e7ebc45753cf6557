use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::data_source::DataSourceConfig;
use crate::error::FreshnessError;
use crate::processing::FruitType;
use crate::service::MonitorConfig;

#[derive(Parser, Debug)]
#[command(name = "freshness-service")]
#[command(about = "Fruit freshness monitor: scores storage telemetry per fruit profile")]
#[command(version)]
pub struct Cli {
    /// HTTP server port
    #[arg(short, long, default_value = "8110")]
    pub listen: u16,

    /// HTTP server host
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// List available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Fruit monitored at startup
    #[arg(long, value_enum, default_value = "banana")]
    pub fruit: FruitArg,

    /// Gas sensor calibration window in seconds
    #[arg(long, env = "FRESHNESS_CALIBRATION_SECS", default_value = "10")]
    pub calibration_secs: u64,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Mode {
    /// Read the sensor board over a serial port
    Serial(SerialArgs),

    /// Playback from log file
    Playback(PlaybackArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SerialArgs {
    /// Serial port device path (e.g., COM3 on Windows, /dev/ttyACM0 on Linux)
    #[arg(short, long)]
    pub device: String,

    /// Baud rate
    #[arg(short, long, default_value = "9600")]
    pub baud: u32,
}

#[derive(Args, Debug, Clone)]
pub struct PlaybackArgs {
    /// Path to log file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Playback speed multiplier (1.0 = real-time, 60.0 = one hour per minute)
    #[arg(short, long, default_value = "1.0")]
    pub speed: f64,

    /// Loop playback when file ends
    #[arg(long, default_value = "false")]
    pub loop_playback: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum FruitArg {
    #[default]
    Banana,
    Orange,
    Apple,
    Grape,
}

impl From<FruitArg> for FruitType {
    fn from(arg: FruitArg) -> Self {
        match arg {
            FruitArg::Banana => FruitType::Banana,
            FruitArg::Orange => FruitType::Orange,
            FruitArg::Apple => FruitType::Apple,
            FruitArg::Grape => FruitType::Grape,
        }
    }
}

impl Cli {
    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), FreshnessError> {
        if let Some(Mode::Playback(args)) = &self.mode {
            if !args.speed.is_finite() || args.speed <= 0.0 {
                return Err(FreshnessError::Config(format!(
                    "playback speed must be positive, got {}",
                    args.speed
                )));
            }
        }

        Ok(())
    }

    /// Convert CLI args to DataSourceConfig
    pub fn to_data_source_config(&self) -> Option<DataSourceConfig> {
        match &self.mode {
            Some(Mode::Serial(args)) => Some(DataSourceConfig::Serial {
                port: args.device.clone(),
                baud_rate: args.baud,
            }),
            Some(Mode::Playback(args)) => Some(DataSourceConfig::Playback {
                log_file: args.file.clone(),
                speed_multiplier: args.speed,
                loop_playback: args.loop_playback,
            }),
            None => None,
        }
    }

    /// Convert CLI args to MonitorConfig
    pub fn to_monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            fruit: self.fruit.into(),
            calibration_window: Duration::from_secs(self.calibration_secs),
        }
    }
}
