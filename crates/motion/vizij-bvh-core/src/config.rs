//! Configuration for BVH clips

use crate::BvhError;
use serde::{Deserialize, Serialize};

/// Largest number of fractional digits that still means something for an `f64`.
const MAX_WRITE_PRECISION: usize = 17;

fn default_looping() -> bool {
    true
}

fn default_play_rate() -> f64 {
    1.0
}

/// Playback defaults and writer options for a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BvhConfig {
    /// Whether playback wraps around at the last frame
    #[serde(default = "default_looping")]
    pub looping: bool,
    /// Initial playback speed multiplier
    #[serde(default = "default_play_rate")]
    pub play_rate: f64,
    /// Fractional digits for written values; `None` writes the shortest
    /// representation that parses back to the same `f64`
    #[serde(default)]
    pub write_precision: Option<usize>,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            looping: default_looping(),
            play_rate: default_play_rate(),
            write_precision: None,
        }
    }
}

impl BvhConfig {
    /// Parse a configuration from JSON, filling omitted fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self, BvhError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), BvhError> {
        if !self.play_rate.is_finite() {
            return Err(BvhError::InvalidValue {
                reason: "Play rate must be finite".to_string(),
            });
        }

        if let Some(precision) = self.write_precision {
            if precision > MAX_WRITE_PRECISION {
                return Err(BvhError::InvalidValue {
                    reason: format!(
                        "Write precision must be at most {MAX_WRITE_PRECISION}, got {precision}"
                    ),
                });
            }
        }

        Ok(())
    }

    /// Enable or disable looping
    #[inline]
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set the initial play rate
    #[inline]
    pub fn with_play_rate(mut self, rate: f64) -> Self {
        self.play_rate = rate;
        self
    }

    /// Set fixed precision for written channel values
    #[inline]
    pub fn with_write_precision(mut self, precision: usize) -> Self {
        self.write_precision = Some(precision);
        self
    }
}
