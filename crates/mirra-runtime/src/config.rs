//! Runtime configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mirra_coach::{CoachConfig, DEFAULT_WINDOW_CAPACITY};
use mirra_core::{MirraError, MirraResult, SkeletonLayout};
use mirra_score::{ScoringPolicy, DEFAULT_SAMPLES};

/// Default smoothing weight of the current frame
pub const DEFAULT_ALPHA: f64 = 0.7;

/// Default offline sampling rate
pub const DEFAULT_SAMPLE_HZ: f64 = 15.0;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `MIRRA_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration of the motion service and the offline pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// EMA weight of the current frame, in [0, 1]
    pub alpha: f64,
    /// Offline extraction sampling rate (Hz)
    pub sample_hz: f64,
    /// Resampling grid size for offline comparison
    pub offline_samples: usize,
    /// Rolling window length
    pub window_capacity: usize,
    pub scoring: ScoringPolicy,
    /// Directory holding one sub-directory per reference video
    pub corpus_root: PathBuf,
    /// Video loaded on first use when none was selected
    pub default_video: Option<String>,
    pub logging: LoggingConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            alpha: DEFAULT_ALPHA,
            sample_hz: DEFAULT_SAMPLE_HZ,
            offline_samples: DEFAULT_SAMPLES,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            scoring: ScoringPolicy::granular(),
            corpus_root: PathBuf::from("data"),
            default_video: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// The lenient scoring used by early builds
    pub fn legacy() -> Self {
        RuntimeConfig {
            scoring: ScoringPolicy::legacy(),
            ..Default::default()
        }
    }

    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json_str(text: &str) -> MirraResult<Self> {
        let config: RuntimeConfig = serde_json::from_str(text)
            .map_err(|e| MirraError::InvalidArgument(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> MirraResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            MirraError::MissingSource(format!("{}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> MirraResult<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(MirraError::InvalidArgument(format!(
                "alpha must be in [0, 1], got {}",
                self.alpha
            )));
        }
        if self.sample_hz.is_nan() || self.sample_hz <= 0.0 {
            return Err(MirraError::InvalidArgument(format!(
                "sample_hz must be positive, got {}",
                self.sample_hz
            )));
        }
        if self.offline_samples < 2 {
            return Err(MirraError::InvalidArgument(format!(
                "offline_samples must be at least 2, got {}",
                self.offline_samples
            )));
        }
        if self.window_capacity == 0 {
            return Err(MirraError::InvalidArgument(
                "window_capacity must be at least 1".into(),
            ));
        }
        if self.scoring.distance_scale.is_nan() || self.scoring.distance_scale <= 0.0 {
            return Err(MirraError::InvalidArgument(format!(
                "distance_scale must be positive, got {}",
                self.scoring.distance_scale
            )));
        }
        Ok(())
    }

    pub fn coach_config(&self) -> CoachConfig {
        CoachConfig {
            window_capacity: self.window_capacity,
            layout: SkeletonLayout::BLAZEPOSE_33,
        }
    }
}
