#![forbid(unsafe_code)]

//! Tunable parameters for a bottom sheet.
//!
//! [`SheetConfig::default()`] reproduces the stock behavior: a 300 ms
//! ease-in-out transition and velocity-only completion. With the `config`
//! feature the same struct loads from TOML or JSON:
//!
//! ```toml
//! transition_ms = 250
//! easing = "ease_out"
//!
//! [completion]
//! kind = "position_fallback"
//! min_velocity = 40.0
//! threshold = 0.5
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::animation::Easing;
use crate::panel::CompletionPolicy;

/// Default transition length.
pub const DEFAULT_TRANSITION_MS: u64 = 300;

/// Configuration errors. Unlike engine contract violations these are
/// recoverable: the caller fixes the document and retries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(String),

    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(String),
}

/// Bottom sheet configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetConfig {
    /// Full Collapsed ↔ Expanded transition length in milliseconds.
    pub transition_ms: u64,
    pub easing: Easing,
    pub completion: CompletionPolicy,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            transition_ms: DEFAULT_TRANSITION_MS,
            easing: Easing::EaseInOut,
            completion: CompletionPolicy::VelocityOnly,
        }
    }
}

impl SheetConfig {
    #[must_use]
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    #[must_use]
    pub fn with_transition(mut self, duration: Duration) -> Self {
        self.transition_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn with_completion(mut self, completion: CompletionPolicy) -> Self {
        self.completion = completion;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let CompletionPolicy::PositionFallback {
            min_velocity,
            threshold,
        } = self.completion
        {
            if !min_velocity.is_finite() || min_velocity < 0.0 {
                return Err(ConfigError::Invalid {
                    field: "completion.min_velocity",
                    message: format!("must be finite and non-negative, got {min_velocity}"),
                });
            }
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::Invalid {
                    field: "completion.threshold",
                    message: format!("must be within [0, 1], got {threshold}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(feature = "config")]
impl SheetConfig {
    /// Parse and validate a TOML document. Missing fields take defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
