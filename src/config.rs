//! Tuning configuration: defaults, optional TOML file, CLI overrides, validation

use crate::cli::TuningArgs;
use crate::geometry::ScreenSize;
use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "cammouse.toml";

/// Rejected configuration value. The engine refuses to start with any of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Sensitivity(f64),
    Smoothing(f64),
    ClickThreshold { button: &'static str, value: f64 },
    Cooldown(f64),
    MinConfidence(f64),
    Screen { width: u32, height: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Sensitivity(v) => write!(f, "sensitivity must be > 0 (got {})", v),
            ConfigError::Smoothing(v) => {
                write!(f, "smoothing must be in [0, 1) (got {})", v)
            }
            ConfigError::ClickThreshold { button, value } => {
                write!(f, "{} click threshold must be > 0 (got {})", button, value)
            }
            ConfigError::Cooldown(v) => {
                write!(f, "click cooldown must be >= 0 seconds (got {})", v)
            }
            ConfigError::MinConfidence(v) => {
                write!(f, "minimum hand confidence must be in [0, 1] (got {})", v)
            }
            ConfigError::Screen { width, height } => {
                write!(f, "screen size must be positive (got {}x{})", width, height)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Gesture tuning consumed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Multiplier from normalized hand motion to screen motion
    pub sensitivity: f64,
    /// Weight of the previous cursor position in the low-pass filter
    pub smoothing: f64,
    /// Thumb-to-index distance (normalized) that counts as a left click
    pub left_click_threshold: f64,
    /// Thumb-to-middle distance (normalized) that counts as a right click
    pub right_click_threshold: f64,
    /// Minimum seconds between two emitted clicks
    pub click_cooldown: f64,
    /// Hands reported below this detector score are ignored
    pub min_confidence: f64,
    /// Flip landmarks horizontally before mapping
    pub mirror: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            sensitivity: 1.5,
            smoothing: 0.7,
            left_click_threshold: 0.05,
            right_click_threshold: 0.05,
            click_cooldown: 0.3,
            min_confidence: 0.7,
            mirror: false,
        }
    }
}

impl TrackingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Written as negated comparisons so NaN is rejected too
        if !(self.sensitivity > 0.0) || !self.sensitivity.is_finite() {
            return Err(ConfigError::Sensitivity(self.sensitivity));
        }
        if !(self.smoothing >= 0.0 && self.smoothing < 1.0) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        if !(self.left_click_threshold > 0.0) {
            return Err(ConfigError::ClickThreshold {
                button: "left",
                value: self.left_click_threshold,
            });
        }
        if !(self.right_click_threshold > 0.0) {
            return Err(ConfigError::ClickThreshold {
                button: "right",
                value: self.right_click_threshold,
            });
        }
        if !(self.click_cooldown >= 0.0) || !self.click_cooldown.is_finite() {
            return Err(ConfigError::Cooldown(self.click_cooldown));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::MinConfidence(self.min_confidence));
        }
        Ok(())
    }

    /// Apply command-line values on top of the file/default values
    pub fn apply_overrides(&mut self, args: &TuningArgs) {
        if let Some(v) = args.sensitivity {
            self.sensitivity = v;
        }
        if let Some(v) = args.smoothing {
            self.smoothing = v;
        }
        if let Some(v) = args.left_threshold {
            self.left_click_threshold = v;
        }
        if let Some(v) = args.right_threshold {
            self.right_click_threshold = v;
        }
        if let Some(v) = args.cooldown {
            self.click_cooldown = v;
        }
        if let Some(v) = args.min_confidence {
            self.min_confidence = v;
        }
        if args.mirror {
            self.mirror = true;
        }
    }
}

pub fn validate_screen(screen: ScreenSize) -> Result<(), ConfigError> {
    if screen.width == 0 || screen.height == 0 {
        return Err(ConfigError::Screen {
            width: screen.width,
            height: screen.height,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Display index to size the mapping against (see `cammouse list displays`)
    pub display: Option<usize>,
}

impl ScreenConfig {
    pub fn size(&self) -> Option<ScreenSize> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(ScreenSize::new(w, h)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Drive the OS cursor from startup
    pub system_control: bool,
    /// Stop driving the cursor when the pointer sits in the top-left corner
    pub failsafe: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            system_control: false,
            failsafe: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub screen: ScreenConfig,
    pub control: ControlConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        Ok(config)
    }
}

/// Load the explicit config file, else the per-user one if present, else defaults
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        let config = Config::load(path)?;
        log::info!("Loaded config from {:?}", path);
        return Ok(config);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            let config = Config::load(&path)?;
            log::info!("Loaded config from {:?}", path);
            Ok(config)
        }
        _ => {
            log::debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
