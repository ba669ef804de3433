#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Every selector, storage key, asset path and fit range used by the page
//! behaviors lives here, with defaults matching the site's markup. Hosts can
//! override any subset with JSON:
//!
//! ```
//! use vitrine_core::config::PageConfig;
//!
//! let config = PageConfig::from_json(r#"{ "debug": { "toggle_key": "g" } }"#).unwrap();
//! assert_eq!(config.debug.toggle_key, 'g');
//! assert_eq!(config.theme.storage_key, "theme-mode");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fit::FitRange;
use crate::theme::ThemeMode;

/// Errors from loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// JSON was malformed or had the wrong shape.
    Parse(String),
    /// A field had a value the behaviors cannot use.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid config JSON: {msg}"),
            Self::Invalid { field, reason } => write!(f, "invalid config field `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Theme switch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub storage_key: String,
    /// Root attribute holding the mode.
    pub attribute: String,
    /// Id of the labelled toggle button.
    pub toggle_id: String,
    /// Selector of an extra element that also toggles the theme.
    pub arrow_selector: String,
    pub logo_id: String,
    pub logo_light_src: String,
    pub logo_dark_src: String,
    pub icon_selector: String,
    /// Name of the broadcast event.
    pub change_event: String,
}

impl ThemeConfig {
    /// Logo source for `mode`.
    #[must_use]
    pub fn logo_src(&self, mode: ThemeMode) -> &str {
        match mode {
            ThemeMode::Light => &self.logo_light_src,
            ThemeMode::Dark => &self.logo_dark_src,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme-mode".into(),
            attribute: "data-theme".into(),
            toggle_id: "themeToggle".into(),
            arrow_selector: "#subhead .subhead-arrow".into(),
            logo_id: "footerLogo".into(),
            logo_light_src: "logo-black.svg".into(),
            logo_dark_src: "logo-white.svg".into(),
            icon_selector: ".contact-icon".into(),
            change_event: "themechange".into(),
        }
    }
}

/// Debug overlay settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub storage_key: String,
    pub attribute: String,
    pub legend_id: String,
    pub toggle_key: char,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            storage_key: "debug.v2".into(),
            attribute: "data-debug".into(),
            legend_id: "debugLegend".into(),
            toggle_key: 'd',
        }
    }
}

/// Timeline width sync settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub container_selector: String,
    /// Selector of the reference element, relative to the container.
    pub reference_selector: String,
    pub property: String,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            container_selector: ".section--timeline".into(),
            reference_selector: ".timeline-item:first-child .timeline-column--date".into(),
            property: "--timeline-date-col".into(),
        }
    }
}

/// Headline fitting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlineConfig {
    /// Element whose client width is the target.
    pub measure_selector: String,
    pub text_id: String,
    /// Word selector, relative to the text element.
    pub word_selector: String,
    pub range: FitRange,
}

impl Default for HeadlineConfig {
    fn default() -> Self {
        Self {
            measure_selector: "#header .header-measure".into(),
            text_id: "headerText".into(),
            word_selector: ".header-text__word".into(),
            range: FitRange::HEADLINE,
        }
    }
}

/// Subhead fitting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubheadConfig {
    /// Box whose inner width is the target.
    pub box_selector: String,
    pub line_selector: String,
    pub range: FitRange,
}

impl Default for SubheadConfig {
    fn default() -> Self {
        Self {
            box_selector: "#subhead .subhead-box".into(),
            line_selector: "#subhead .subhead-line".into(),
            range: FitRange::SUBHEAD,
        }
    }
}

/// Complete page configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
    pub timeline: TimelineConfig,
    pub headline: HeadlineConfig,
    pub subhead: SubheadConfig,
    /// Maximum log level: `error`, `warn`, `info`, `debug`, `trace` or `off`.
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
            timeline: TimelineConfig::default(),
            headline: HeadlineConfig::default(),
            subhead: SubheadConfig::default(),
            log_level: "warn".into(),
        }
    }
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl PageConfig {
    /// Parse and validate a JSON override. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("theme.storage_key", &self.theme.storage_key),
            ("theme.attribute", &self.theme.attribute),
            ("debug.storage_key", &self.debug.storage_key),
            ("debug.attribute", &self.debug.attribute),
            ("timeline.property", &self.timeline.property),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty",
                });
            }
        }
        if !self.timeline.property.starts_with("--") {
            return Err(ConfigError::Invalid {
                field: "timeline.property",
                reason: "custom properties must start with `--`",
            });
        }
        if !self.debug.toggle_key.is_alphanumeric() {
            return Err(ConfigError::Invalid {
                field: "debug.toggle_key",
                reason: "must be a letter or digit",
            });
        }
        self.headline
            .range
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                field: "headline.range",
                reason,
            })?;
        self.subhead
            .range
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                field: "subhead.range",
                reason,
            })?;
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "log_level",
                reason: "expected off, error, warn, info, debug or trace",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        assert!(PageConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_json_yields_defaults() {
        assert_eq!(PageConfig::from_json("{}").unwrap(), PageConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let config = PageConfig::from_json(
            r#"{ "theme": { "logo_dark_src": "logo-inverse.svg" }, "log_level": "debug" }"#,
        )
        .unwrap();
        assert_eq!(config.theme.logo_dark_src, "logo-inverse.svg");
        assert_eq!(config.theme.logo_light_src, "logo-black.svg");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.headline.range, FitRange::HEADLINE);
    }

    #[test]
    fn range_override() {
        let config = PageConfig::from_json(
            r#"{ "subhead": { "range": { "low": 8, "high": 200, "iterations": 16 } } }"#,
        )
        .unwrap();
        assert_eq!(config.subhead.range, FitRange::new(8.0, 200.0, 16));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            PageConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn inverted_range_rejected() {
        let err = PageConfig::from_json(
            r#"{ "headline": { "range": { "low": 50, "high": 10, "iterations": 22 } } }"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                field: "headline.range",
                reason: "lower bound must be below upper bound",
            }
        );
    }

    #[test]
    fn unbounded_iterations_rejected() {
        let err = PageConfig::from_json(
            r#"{ "subhead": { "range": { "low": 6, "high": 320, "iterations": 4000000000 } } }"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                field: "subhead.range",
                reason: "too many iterations",
            }
        );
    }

    #[test]
    fn iteration_cap_is_inclusive() {
        let config = PageConfig::from_json(
            r#"{ "headline": { "range": { "low": 6, "high": 2400, "iterations": 64 } } }"#,
        )
        .unwrap();
        assert_eq!(config.headline.range.iterations, 64);
    }

    #[test]
    fn property_must_be_custom() {
        let err = PageConfig::from_json(r#"{ "timeline": { "property": "width" } }"#).unwrap_err();
        assert!(err.to_string().contains("timeline.property"));
    }

    #[test]
    fn empty_key_rejected() {
        let err = PageConfig::from_json(r#"{ "theme": { "storage_key": "" } }"#).unwrap_err();
        assert_eq!(err.to_string(), "invalid config field `theme.storage_key`: must not be empty");
    }

    #[test]
    fn unknown_log_level_rejected() {
        assert!(PageConfig::from_json(r#"{ "log_level": "loud" }"#).is_err());
        assert!(PageConfig::from_json(r#"{ "log_level": "TRACE" }"#).is_ok());
    }

    #[test]
    fn logo_src_per_mode() {
        let theme = ThemeConfig::default();
        assert_eq!(theme.logo_src(ThemeMode::Light), "logo-black.svg");
        assert_eq!(theme.logo_src(ThemeMode::Dark), "logo-white.svg");
    }
}
