#![forbid(unsafe_code)]

//! Card layout configuration.
//!
//! The timeline lays out fixed-height chapter cards separated by a constant
//! gap. At most one card is expanded at a time and grows by a fixed extra
//! height. All of these are plain pixel values so the layout can be derived
//! in closed form.
//!
//! # Environment Variables
//! - `TIMELINE_CARD_HEIGHT` (u32, >= 1)
//! - `TIMELINE_CARD_GAP` (u32)
//! - `TIMELINE_EXPANDED_EXTRA` (u32)
//! - `TIMELINE_BOTTOM_MARGIN` (u32)
//! - `TIMELINE_EMPTY_HEIGHT` (u32)
//! - `TIMELINE_OVERSCAN` (u32, items)
//!
//! Invalid values are reported as [`ConfigError`]s and the default is kept.

use std::env;
use std::fmt;

const ENV_CARD_HEIGHT: &str = "TIMELINE_CARD_HEIGHT";
const ENV_CARD_GAP: &str = "TIMELINE_CARD_GAP";
const ENV_EXPANDED_EXTRA: &str = "TIMELINE_EXPANDED_EXTRA";
const ENV_BOTTOM_MARGIN: &str = "TIMELINE_BOTTOM_MARGIN";
const ENV_EMPTY_HEIGHT: &str = "TIMELINE_EMPTY_HEIGHT";
const ENV_OVERSCAN: &str = "TIMELINE_OVERSCAN";

/// Pixel metrics for the card list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutConfig {
    /// Height of a collapsed card.
    pub card_height: u32,
    /// Vertical gap between consecutive cards.
    pub gap: u32,
    /// Height added to the single expanded card.
    pub expanded_extra: u32,
    /// Padding below the last card.
    pub bottom_margin: u32,
    /// Total height reported for an empty list (room for the "no results" message).
    pub empty_height: u32,
    /// Items mounted beyond each visible edge.
    pub overscan: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_height: 164,
            gap: 18,
            expanded_extra: 240,
            bottom_margin: 24,
            empty_height: 160,
            overscan: 8,
        }
    }
}

/// Result of reading [`LayoutConfig`] from the environment.
#[derive(Debug, Clone)]
pub struct LayoutConfigParse {
    pub config: LayoutConfig,
    pub errors: Vec<ConfigError>,
}

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl LayoutConfig {
    /// Distance between the tops of two consecutive collapsed cards.
    #[inline]
    pub const fn stride(&self) -> u64 {
        self.card_height as u64 + self.gap as u64
    }

    /// Set the collapsed card height.
    #[must_use]
    pub fn with_card_height(mut self, card_height: u32) -> Self {
        self.card_height = card_height;
        self
    }

    /// Set the gap between cards.
    #[must_use]
    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    /// Set the extra height of the expanded card.
    #[must_use]
    pub fn with_expanded_extra(mut self, expanded_extra: u32) -> Self {
        self.expanded_extra = expanded_extra;
        self
    }

    /// Set the padding below the last card.
    #[must_use]
    pub fn with_bottom_margin(mut self, bottom_margin: u32) -> Self {
        self.bottom_margin = bottom_margin;
        self
    }

    /// Set the placeholder height used for an empty list.
    #[must_use]
    pub fn with_empty_height(mut self, empty_height: u32) -> Self {
        self.empty_height = empty_height;
        self
    }

    /// Set the overscan item count.
    #[must_use]
    pub fn with_overscan(mut self, overscan: u32) -> Self {
        self.overscan = overscan;
        self
    }

    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> LayoutConfig {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> LayoutConfigParse {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Parse config from an arbitrary key lookup.
    pub fn from_env_with<F>(mut get: F) -> LayoutConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = LayoutConfig::default();
        let mut config = defaults;
        let mut errors = Vec::new();

        let mut read = |key: &str, field: &'static str, slot: &mut u32| {
            if let Some(value) = get(key) {
                match parse_u32(&value) {
                    Some(parsed) => *slot = parsed,
                    None => errors.push(ConfigError::new(
                        field,
                        value,
                        "expected non-negative integer",
                    )),
                }
            }
        };

        read(ENV_CARD_HEIGHT, "card_height", &mut config.card_height);
        read(ENV_CARD_GAP, "gap", &mut config.gap);
        read(ENV_EXPANDED_EXTRA, "expanded_extra", &mut config.expanded_extra);
        read(ENV_BOTTOM_MARGIN, "bottom_margin", &mut config.bottom_margin);
        read(ENV_EMPTY_HEIGHT, "empty_height", &mut config.empty_height);
        read(ENV_OVERSCAN, "overscan", &mut config.overscan);

        if let Err(invalid) = config.validate() {
            for error in &invalid {
                if error.field == "card_height" {
                    config.card_height = defaults.card_height;
                }
            }
            errors.extend(invalid);
        }

        LayoutConfigParse { config, errors }
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if self.card_height == 0 {
            errors.push(ConfigError::new(
                "card_height",
                self.card_height.to_string(),
                "must be >= 1",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Short human-readable summary for logs.
    #[must_use]
    pub fn summary_short(&self) -> String {
        format!(
            "card {}px · gap {}px · expand +{}px · overscan {}",
            self.card_height, self.gap, self.expanded_extra, self.overscan
        )
    }
}

#[inline]
fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(pairs: &[(&str, &str)]) -> LayoutConfigParse {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        LayoutConfig::from_env_with(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_card_layout() {
        let config = LayoutConfig::default();
        assert_eq!(config.card_height, 164);
        assert_eq!(config.gap, 18);
        assert_eq!(config.stride(), 182);
        assert_eq!(config.overscan, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_env_yields_defaults() {
        let parsed = parse(&[]);
        assert_eq!(parsed.config, LayoutConfig::default());
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn env_overrides_apply() {
        let parsed = parse(&[
            ("TIMELINE_CARD_HEIGHT", "100"),
            ("TIMELINE_CARD_GAP", " 10 "),
            ("TIMELINE_OVERSCAN", "2"),
        ]);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config.card_height, 100);
        assert_eq!(parsed.config.gap, 10);
        assert_eq!(parsed.config.overscan, 2);
        assert_eq!(parsed.config.expanded_extra, 240);
    }

    #[test]
    fn invalid_values_keep_defaults_and_report() {
        let parsed = parse(&[
            ("TIMELINE_CARD_GAP", "wide"),
            ("TIMELINE_EXPANDED_EXTRA", "-4"),
        ]);
        assert_eq!(parsed.config, LayoutConfig::default());
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].field, "gap");
        assert_eq!(parsed.errors[1].field, "expanded_extra");
    }

    #[test]
    fn zero_card_height_rejected() {
        let parsed = parse(&[("TIMELINE_CARD_HEIGHT", "0")]);
        assert_eq!(parsed.config.card_height, 164);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].to_string(), "card_height=0 (must be >= 1)");
    }

    #[test]
    fn builder_setters_chain() {
        let config = LayoutConfig::default()
            .with_card_height(40)
            .with_gap(0)
            .with_expanded_extra(10)
            .with_bottom_margin(0)
            .with_empty_height(5)
            .with_overscan(1);
        assert_eq!(config.stride(), 40);
        assert!(config.summary_short().contains("card 40px"));
    }
}
