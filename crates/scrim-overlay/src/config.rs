#![forbid(unsafe_code)]

//! Overlay behavior configuration.
//!
//! [`OverlayConfig`] bundles the dismissal switches with optional timing
//! overrides. Built in code with the setters, or, with the `policy-config`
//! feature, loaded from TOML or JSON:
//!
//! ```toml
//! close_on_backdrop_click = true
//! close_on_escape = false
//!
//! [animation]
//! enter_ms = 200
//! exit_ms = 150
//! fallback_factor = 3
//! reduced_motion = false
//! ```
//!
//! Missing keys keep their defaults. A missing `[animation]` table leaves
//! timing to the shell.

use crate::animation::AnimationConfig;
use crate::dismissal::DismissalConfig;

/// Behavior settings for one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayConfig {
    pub dismissal: DismissalConfig,
    /// Timing override; `None` uses the shell's default.
    pub animation: Option<AnimationConfig>,
}

impl OverlayConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dismissal(mut self, dismissal: DismissalConfig) -> Self {
        self.dismissal = dismissal;
        self
    }

    #[must_use]
    pub fn close_on_backdrop_click(mut self, close: bool) -> Self {
        self.dismissal.close_on_backdrop_click = close;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.dismissal.close_on_escape = close;
        self
    }

    #[must_use]
    pub fn animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = Some(animation);
        self
    }
}

#[cfg(feature = "policy-config")]
mod load {
    use std::time::Duration;

    use serde::Deserialize;

    use super::OverlayConfig;
    use crate::animation::{AnimationConfig, DEFAULT_ENTER, DEFAULT_EXIT, DEFAULT_FALLBACK_FACTOR};
    use crate::dismissal::DismissalConfig;
    use crate::error::ConfigError;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct RawConfig {
        close_on_backdrop_click: Option<bool>,
        close_on_escape: Option<bool>,
        animation: Option<RawAnimation>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct RawAnimation {
        enter_ms: Option<u64>,
        exit_ms: Option<u64>,
        fallback_factor: Option<u32>,
        reduced_motion: Option<bool>,
    }

    impl RawConfig {
        fn into_config(self) -> Result<OverlayConfig, ConfigError> {
            let defaults = DismissalConfig::default();
            let dismissal = DismissalConfig {
                close_on_backdrop_click: self
                    .close_on_backdrop_click
                    .unwrap_or(defaults.close_on_backdrop_click),
                close_on_escape: self.close_on_escape.unwrap_or(defaults.close_on_escape),
            };
            let animation = self.animation.map(RawAnimation::into_config).transpose()?;
            Ok(OverlayConfig {
                dismissal,
                animation,
            })
        }
    }

    impl RawAnimation {
        fn into_config(self) -> Result<AnimationConfig, ConfigError> {
            let fallback_factor = self.fallback_factor.unwrap_or(DEFAULT_FALLBACK_FACTOR);
            if fallback_factor == 0 {
                return Err(ConfigError::Invalid {
                    field: "fallback_factor",
                    reason: "must be at least 1".into(),
                });
            }
            Ok(AnimationConfig {
                enter: self.enter_ms.map_or(DEFAULT_ENTER, Duration::from_millis),
                exit: self.exit_ms.map_or(DEFAULT_EXIT, Duration::from_millis),
                fallback_factor,
                reduced_motion: self.reduced_motion.unwrap_or(false),
            })
        }
    }

    impl OverlayConfig {
        /// Parse a TOML document.
        ///
        /// # Errors
        ///
        /// [`ConfigError::Parse`] on malformed input or unknown keys,
        /// [`ConfigError::Invalid`] on out-of-range values.
        pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
            let raw: RawConfig =
                toml::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))?;
            raw.into_config()
        }

        /// Parse a JSON document.
        ///
        /// # Errors
        ///
        /// Same as [`OverlayConfig::from_toml_str`].
        pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
            let raw: RawConfig =
                serde_json::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))?;
            raw.into_config()
        }
    }
}
