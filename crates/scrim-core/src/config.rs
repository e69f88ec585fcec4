#![forbid(unsafe_code)]

//! Timing and presentation knobs for the overlay core.

use core::time::Duration;
use std::fmt;

/// Viewport content that disables pinch-zoom while a media viewer is open.
pub const LOCKED_VIEWPORT_CONTENT: &str =
    "width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no";

/// Configuration shared by every component of a page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrimConfig {
    /// Delay between `resume()` and the deferred scroll write + resize event.
    /// Default: 10ms
    #[cfg_attr(feature = "serde", serde(with = "millis", rename = "scroll_restore_delay_ms"))]
    pub scroll_restore_delay: Duration,

    /// Delay between closing the side menus and calling the registered
    /// scroll-unlock function, so the close transition finishes first.
    /// Default: 100ms
    #[cfg_attr(feature = "serde", serde(with = "millis", rename = "menu_unlock_delay_ms"))]
    pub menu_unlock_delay: Duration,

    /// Delay used by `close_menus_on_interaction`.
    /// Default: 50ms
    #[cfg_attr(
        feature = "serde",
        serde(with = "millis", rename = "menu_interaction_delay_ms")
    )]
    pub menu_interaction_delay: Duration,

    /// Viewport meta content forced by viewport guards.
    pub locked_viewport_content: String,

    /// Pad the body by the scrollbar width while the page lock pins it.
    /// Default: true
    pub compensate_scrollbar: bool,
}

impl Default for ScrimConfig {
    fn default() -> Self {
        Self {
            scroll_restore_delay: Duration::from_millis(10),
            menu_unlock_delay: Duration::from_millis(100),
            menu_interaction_delay: Duration::from_millis(50),
            locked_viewport_content: LOCKED_VIEWPORT_CONTENT.to_owned(),
            compensate_scrollbar: true,
        }
    }
}

impl ScrimConfig {
    /// Set the scroll restore delay.
    #[must_use]
    pub fn with_scroll_restore_delay(mut self, delay: Duration) -> Self {
        self.scroll_restore_delay = delay;
        self
    }

    /// Set the menu unlock delay.
    #[must_use]
    pub fn with_menu_unlock_delay(mut self, delay: Duration) -> Self {
        self.menu_unlock_delay = delay;
        self
    }

    /// Set the menu interaction delay.
    #[must_use]
    pub fn with_menu_interaction_delay(mut self, delay: Duration) -> Self {
        self.menu_interaction_delay = delay;
        self
    }

    /// Set the viewport content forced by viewport guards.
    #[must_use]
    pub fn with_locked_viewport_content(mut self, content: impl Into<String>) -> Self {
        self.locked_viewport_content = content.into();
        self
    }

    /// Enable or disable scrollbar compensation for the page lock.
    #[must_use]
    pub fn with_compensate_scrollbar(mut self, enabled: bool) -> Self {
        self.compensate_scrollbar = enabled;
        self
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Errors from loading a [`ScrimConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The input could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid scrim config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(feature = "serde")]
mod millis {
    use core::time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u128::from(u64::MAX)) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ScrimConfig::default();
        assert_eq!(config.scroll_restore_delay, Duration::from_millis(10));
        assert_eq!(config.menu_unlock_delay, Duration::from_millis(100));
        assert_eq!(config.menu_interaction_delay, Duration::from_millis(50));
        assert!(config.locked_viewport_content.contains("user-scalable=no"));
        assert!(config.compensate_scrollbar);
    }

    #[test]
    fn builders_override_fields() {
        let config = ScrimConfig::default()
            .with_scroll_restore_delay(Duration::ZERO)
            .with_menu_unlock_delay(Duration::from_millis(1))
            .with_compensate_scrollbar(false)
            .with_locked_viewport_content("width=device-width");
        assert_eq!(config.scroll_restore_delay, Duration::ZERO);
        assert_eq!(config.menu_unlock_delay, Duration::from_millis(1));
        assert!(!config.compensate_scrollbar);
        assert_eq!(config.locked_viewport_content, "width=device-width");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_uses_milliseconds_and_defaults() {
        let config = ScrimConfig::from_json(r#"{"menu_unlock_delay_ms": 250}"#).unwrap();
        assert_eq!(config.menu_unlock_delay, Duration::from_millis(250));
        assert_eq!(config.scroll_restore_delay, Duration::from_millis(10));

        let err = ScrimConfig::from_json("{").unwrap_err();
        assert!(err.to_string().starts_with("invalid scrim config"));
    }
}
