use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::animator::AnimatorOptions;
use crate::popover::PopoverOptions;
use crate::spring::SpringParams;
use crate::wheel::WheelParams;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub spring: SpringParams,
    #[serde(default)]
    pub animator: AnimatorOptions,
    #[serde(default)]
    pub wheel: WheelParams,
    #[serde(default)]
    pub popover: PopoverOptions,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frames per second while something is animating
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Date the demo picker starts on; today when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            start_date: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_rate() -> u64 {
    250
}

fn default_animation_fps() -> u32 {
    60
}

impl UiConfig {
    /// Seconds per animation frame
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.animation_fps.max(1) as f64
    }
}

impl AppConfig {
    /// Load configuration from file or use defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/kinetic/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("kinetic")
            .join("config.toml")
    }

    /// Reject values the engine would refuse at runtime
    pub fn validate(&self) -> crate::Result<()> {
        let spring = &self.spring;
        if !(spring.damping_ratio.is_finite() && spring.damping_ratio >= 0.0) {
            return Err(crate::Error::Config(format!(
                "spring.damping_ratio must be a non-negative number, got {}",
                spring.damping_ratio
            )));
        }
        if !(spring.period.is_finite() && spring.period > 0.0) {
            return Err(crate::Error::Config(format!(
                "spring.period must be positive, got {}",
                spring.period
            )));
        }
        if !(spring.motion_threshold.is_finite() && spring.motion_threshold > 0.0) {
            return Err(crate::Error::Config(format!(
                "spring.motion_threshold must be positive, got {}",
                spring.motion_threshold
            )));
        }

        self.animator
            .validate()
            .map_err(|e| crate::Error::Config(format!("animator: {}", e)))?;
        self.wheel
            .validate()
            .map_err(|e| crate::Error::Config(format!("wheel: {}", e)))?;

        let popover = &self.popover;
        for (name, value) in [
            ("arrow_size", popover.arrow_size),
            ("max_padding", popover.max_padding),
            ("max_lift", popover.max_lift),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(crate::Error::Config(format!(
                    "popover.{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if self.ui.animation_fps == 0 {
            return Err(crate::Error::Config("ui.animation_fps must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.spring.period, 0.3);
        assert_eq!(config.animator.horizon, 1.0);
        assert_eq!(config.wheel.radius, 300.0);
        assert_eq!(config.popover.arrow_size, 16.0);
        assert_eq!(config.ui.animation_fps, 60);
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [wheel]
            damping = 12.5

            [popover]
            reduce_motion = true

            [animator]
            fill_forwards = false
            "#,
        )
        .unwrap();
        assert_eq!(config.wheel.damping, 12.5);
        assert_eq!(config.wheel.steering, 60.0);
        assert!(config.popover.reduce_motion);
        assert!(!config.animator.fill_forwards);
        assert_eq!(config.animator.time_step, 1.0 / 60.0);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = AppConfig::default();
        config.ui.start_date = NaiveDate::from_ymd_opt(2024, 3, 30);
        config.spring.damping_ratio = 0.6;
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.ui.start_date, NaiveDate::from_ymd_opt(2024, 3, 30));
        assert_eq!(parsed.spring.damping_ratio, 0.6);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_toml("[spring]\nperiod = 0.0\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));

        let err = AppConfig::from_toml("[wheel]\nradius = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("wheel"));

        assert!(AppConfig::from_toml("[ui]\nanimation_fps = 0\n").is_err());
        assert!(AppConfig::from_toml("[general\n").is_err());
    }
}
