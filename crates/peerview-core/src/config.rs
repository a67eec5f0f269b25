//! Configuration for the peer view and its monitors

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{PeerViewError, PeerViewResult};

/// Face detector configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Detector input size in pixels (square)
    pub input_size: u32,
    /// Minimum confidence for a detection to count
    pub score_threshold: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        DetectorOptions {
            input_size: 160,
            score_threshold: 0.5,
        }
    }
}

/// Monitor configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Run the face detection loop while a video track is bound
    pub face_detection: bool,
    /// Resolution poll period
    pub resolution_poll_ms: u64,
    /// Extra delay after each completed detection cycle
    pub face_detection_throttle_ms: u64,
    /// Display refresh period driving the detection loop
    pub refresh_interval_ms: u64,
    pub detector: DetectorOptions,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            face_detection: false,
            resolution_poll_ms: 1000,
            face_detection_throttle_ms: 100,
            refresh_interval_ms: 16,
            detector: DetectorOptions::default(),
        }
    }
}

impl MonitorConfig {
    /// Defaults with face detection turned on
    pub fn with_face_detection() -> Self {
        MonitorConfig {
            face_detection: true,
            ..Self::default()
        }
    }

    pub fn resolution_poll_interval(&self) -> Duration {
        Duration::from_millis(self.resolution_poll_ms)
    }

    pub fn face_detection_throttle(&self) -> Duration {
        Duration::from_millis(self.face_detection_throttle_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn validate(&self) -> PeerViewResult<()> {
        if self.resolution_poll_ms == 0 {
            return Err(PeerViewError::InvalidConfig(
                "resolution_poll_ms must be positive".into(),
            ));
        }
        if self.refresh_interval_ms == 0 {
            return Err(PeerViewError::InvalidConfig(
                "refresh_interval_ms must be positive".into(),
            ));
        }
        if self.detector.input_size == 0 {
            return Err(PeerViewError::InvalidConfig(
                "detector.input_size must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detector.score_threshold) {
            return Err(PeerViewError::InvalidConfig(format!(
                "detector.score_threshold {} outside [0, 1]",
                self.detector.score_threshold
            )));
        }
        Ok(())
    }
}

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

/// Top level peer view configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerViewConfig {
    /// Initial visibility of the info panel
    pub show_info: bool,
    /// Show the loading spinner while the video score is below this value
    pub spinner_score_threshold: u8,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

impl Default for PeerViewConfig {
    fn default() -> Self {
        PeerViewConfig {
            show_info: false,
            spinner_score_threshold: 5,
            monitor: MonitorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PeerViewConfig {
    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> PeerViewResult<Self> {
        let config: PeerViewConfig =
            serde_json::from_str(json).map_err(|e| PeerViewError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PeerViewResult<()> {
        self.monitor.validate()
    }
}
