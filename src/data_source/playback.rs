use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

use super::{DataSource, log_non_reading};
use crate::error::{FreshnessError, ProtocolError};
use crate::protocol::{SensorSample, parse_line};

// ISO8601 timestamp at start of line, with optional timezone (Z or +HH:MM)
static TIMESTAMPED_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?)\s+(.*)$")
        .unwrap()
});

/// Pause before re-reading a looped log that produced no readings
const EMPTY_PASS_BACKOFF: Duration = Duration::from_secs(1);

/// A line from the log file with its timestamp
#[derive(Debug, Clone)]
struct TimestampedLine {
    timestamp: DateTime<Utc>,
    content: String,
}

/// Data source for log file playback with timestamp-based timing
pub struct PlaybackDataSource {
    log_file: PathBuf,
    speed_multiplier: f64,
    loop_playback: bool,
    is_active: Arc<AtomicBool>,
    reader_task: Option<JoinHandle<()>>,
}

impl PlaybackDataSource {
    pub fn new(log_file: PathBuf, speed_multiplier: f64, loop_playback: bool) -> Self {
        Self {
            log_file,
            speed_multiplier: speed_multiplier.max(0.1), // Minimum 0.1x speed
            loop_playback,
            is_active: Arc::new(AtomicBool::new(false)),
            reader_task: None,
        }
    }

    /// Parse a timestamped line from the log file
    /// Format: "2025-01-15T10:30:00.123 T=20.10 H=64.80 GAS=402"
    fn parse_timestamped_line(line: &str) -> Result<TimestampedLine, ProtocolError> {
        let caps = TIMESTAMPED_LINE_REGEX
            .captures(line.trim())
            .ok_or_else(|| ProtocolError::ParseError(line.trim().to_string()))?;
        let timestamp_str = &caps[1];
        let content = &caps[2];

        let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                // Without timezone, assume UTC
                NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%dT%H:%M:%S%.f")
                    .map(|ndt| ndt.and_utc())
            })
            .or_else(|_| {
                NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%dT%H:%M:%S")
                    .map(|ndt| ndt.and_utc())
            })
            .map_err(|_| ProtocolError::InvalidTimestamp(timestamp_str.to_string()))?;

        Ok(TimestampedLine {
            timestamp,
            content: content.to_string(),
        })
    }
}

/// What one pass over the log produced
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct PassSummary {
    samples: usize,
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
}

impl PassSummary {
    /// Shift applied to the next pass, one second past the last timestamp
    fn loop_span(&self) -> Option<chrono::Duration> {
        match (self.first, self.last) {
            (Some(first), Some(last)) => Some(last - first + chrono::Duration::seconds(1)),
            _ => None,
        }
    }
}

/// Replay the log once, pacing samples by their timestamps
async fn play_pass(
    log_file: &Path,
    speed_multiplier: f64,
    loop_offset: chrono::Duration,
    is_active: &AtomicBool,
    sample_tx: &mpsc::Sender<SensorSample>,
) -> Result<PassSummary, FreshnessError> {
    let file = File::open(log_file).await?;
    let mut lines = BufReader::new(file).lines();
    let playback_start = std::time::Instant::now();
    let mut summary = PassSummary::default();

    while is_active.load(Ordering::SeqCst) {
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let timestamped = match PlaybackDataSource::parse_timestamped_line(&line) {
            Ok(timestamped) => timestamped,
            Err(e) => {
                tracing::trace!("Skipping log line: {}", e);
                continue;
            }
        };

        let log_start = *summary.first.get_or_insert(timestamped.timestamp);
        summary.last = Some(timestamped.timestamp);

        let log_elapsed = (timestamped.timestamp - log_start).num_milliseconds() as f64;
        let target_elapsed_ms = log_elapsed / speed_multiplier;
        let actual_elapsed_ms = playback_start.elapsed().as_millis() as f64;

        let wait_ms = target_elapsed_ms - actual_elapsed_ms;
        if wait_ms > 0.0 {
            sleep(Duration::from_millis(wait_ms as u64)).await;
        }

        let parsed = parse_line(&timestamped.content);
        log_non_reading(&parsed);

        if let Some(sample) = parsed.into_sample(timestamped.timestamp + loop_offset) {
            sample_tx.send(sample).await.map_err(|_| {
                FreshnessError::DataSource("sample receiver dropped".to_string())
            })?;
            summary.samples += 1;
        }
    }

    Ok(summary)
}

#[async_trait]
impl DataSource for PlaybackDataSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<SensorSample>, FreshnessError> {
        // Fail early if the log is missing
        File::open(&self.log_file).await?;

        let (sample_tx, sample_rx) = mpsc::channel(32);

        self.is_active.store(true, Ordering::SeqCst);
        let is_active = self.is_active.clone();
        let speed_multiplier = self.speed_multiplier;
        let loop_playback = self.loop_playback;
        let log_file = self.log_file.clone();

        let reader_handle = tokio::spawn(async move {
            tracing::info!(
                "Playback started from {:?} at {}x speed",
                log_file,
                speed_multiplier
            );

            // Timestamps keep increasing across loops so the sample clock never rewinds
            let mut loop_offset = chrono::Duration::zero();

            loop {
                let summary = match play_pass(
                    &log_file,
                    speed_multiplier,
                    loop_offset,
                    &is_active,
                    &sample_tx,
                )
                .await
                {
                    Ok(summary) => summary,
                    Err(e) => {
                        tracing::warn!("Stopping playback: {}", e);
                        break;
                    }
                };

                if !loop_playback || !is_active.load(Ordering::SeqCst) {
                    break;
                }

                if let Some(span) = summary.loop_span() {
                    loop_offset += span;
                }

                if summary.samples == 0 {
                    tracing::warn!(
                        "No readings in {:?}, retrying in {:?}",
                        log_file,
                        EMPTY_PASS_BACKOFF
                    );
                    sleep(EMPTY_PASS_BACKOFF).await;
                }

                tracing::info!("Looping playback from start");
            }

            tracing::info!("Playback finished");
        });

        self.reader_task = Some(reader_handle);

        Ok(sample_rx)
    }

    async fn stop(&mut self) -> Result<(), FreshnessError> {
        self.is_active.store(false, Ordering::SeqCst);

        if let Some(handle) = self.reader_task.take() {
            handle.abort();
            let _ = handle.await;
        }

        tracing::info!("Playback data source stopped");

        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        self.log_file.to_str().unwrap_or("playback")
    }
}
