//! Configuration file support for touchremote.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/touchremote/config.toml`. Settings include the receiving host,
//! mouse pad behaviour, tilt sensors and one or more keypad layouts.
//!
//! If no config file exists, sensible defaults are used automatically. Values that are out
//! of range are clamped with a warning, so the input core never sees an invalid grid.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::SensorMode;
pub use types::{ConnectionConfig, LayoutConfig, PadConfig, SensorsConfig};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::protocol::KeyAction;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [connection]
/// host = "192.168.1.20"
/// port = 5555
/// password = "secret"
///
/// [pad]
/// pinch_zoom = true
///
/// [sensors]
/// mode = "cursor"
///
/// [[layouts]]
/// name = "Arrows"
/// rows = 2
/// cols = 3
/// keys = ["escape", "cursor_up", "return", "cursor_left", "cursor_down", "cursor_right"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Index into `layouts` of the layout shown at startup
    #[serde(default)]
    pub active_layout: usize,

    /// Destination and credentials
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Mouse pad behaviour
    #[serde(default)]
    pub pad: PadConfig,

    /// Tilt sensor behaviour
    #[serde(default)]
    pub sensors: SensorsConfig,

    /// Keypad layouts; at least one is always present after loading
    #[serde(default = "types::default_layouts")]
    pub layouts: Vec<LayoutConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active_layout: 0,
            connection: ConnectionConfig::default(),
            pad: PadConfig::default(),
            sensors: SensorsConfig::default(),
            layouts: types::default_layouts(),
        }
    }
}

const MAX_GRID_DIMENSION: usize = 20;

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `connection.port`: non-zero
    /// - `connection.probe_timeout_ms`: 100 - 60000
    /// - `pad.wheel_width`: 0 - 1000
    /// - `pad.tap_window_ms`: 10 - 1000
    /// - `pad.pressure_ratio`: 0.0 - 1.0
    /// - `sensors.threshold`, `sensors.scale`: positive
    /// - `sensors.hysteresis`: 0.0 or more
    /// - `layouts[].rows`, `layouts[].cols`: 1 - 20
    /// - `layouts[].mouse_speed`: 1 - 10
    /// - `layouts[].pad_percent`: 0 - 100
    /// - `layouts[].keys`: padded with `dummy` or truncated to `rows × cols`
    /// - `active_layout`: a valid index
    pub fn validate_and_clamp(&mut self) {
        if self.connection.port == 0 {
            warn!("Invalid port 0, falling back to 5555");
            self.connection.port = ConnectionConfig::default().port;
        }

        if !(100..=60_000).contains(&self.connection.probe_timeout_ms) {
            warn!(
                "Invalid probe_timeout_ms {}, clamping to 100-60000 range",
                self.connection.probe_timeout_ms
            );
            self.connection.probe_timeout_ms = self.connection.probe_timeout_ms.clamp(100, 60_000);
        }

        if self.pad.wheel_width > 1000 {
            warn!(
                "Invalid wheel_width {}, clamping to 0-1000 range",
                self.pad.wheel_width
            );
            self.pad.wheel_width = 1000;
        }

        if !(10..=1000).contains(&self.pad.tap_window_ms) {
            warn!(
                "Invalid tap_window_ms {}, clamping to 10-1000 range",
                self.pad.tap_window_ms
            );
            self.pad.tap_window_ms = self.pad.tap_window_ms.clamp(10, 1000);
        }

        if !(0.0..=1.0).contains(&self.pad.pressure_ratio) {
            warn!(
                "Invalid pressure_ratio {:.2}, clamping to 0.0-1.0 range",
                self.pad.pressure_ratio
            );
            self.pad.pressure_ratio = clamp_or(self.pad.pressure_ratio, 0.0, 1.0, 0.7);
        }

        let sensor_defaults = SensorsConfig::default();
        if !(self.sensors.threshold > 0.0) {
            warn!(
                "Invalid sensor threshold {:.2}, falling back to {:.1}",
                self.sensors.threshold, sensor_defaults.threshold
            );
            self.sensors.threshold = sensor_defaults.threshold;
        }
        if !(self.sensors.hysteresis >= 0.0) {
            warn!(
                "Invalid sensor hysteresis {:.2}, falling back to {:.1}",
                self.sensors.hysteresis, sensor_defaults.hysteresis
            );
            self.sensors.hysteresis = sensor_defaults.hysteresis;
        }
        if !(self.sensors.scale > 0.0) {
            warn!(
                "Invalid sensor scale {:.2}, falling back to {:.1}",
                self.sensors.scale, sensor_defaults.scale
            );
            self.sensors.scale = sensor_defaults.scale;
        }

        if self.layouts.is_empty() {
            warn!("No layouts configured, using the default layout");
            self.layouts = types::default_layouts();
        }
        for layout in &mut self.layouts {
            validate_layout(layout);
        }

        if self.active_layout >= self.layouts.len() {
            warn!(
                "Invalid active_layout {}, only {} layout(s) defined; using 0",
                self.active_layout,
                self.layouts.len()
            );
            self.active_layout = 0;
        }
    }

    /// The layout selected by `active_layout`.
    pub fn active(&self) -> &LayoutConfig {
        self.layouts
            .get(self.active_layout)
            .or_else(|| self.layouts.first())
            .unwrap_or(&DEFAULT_LAYOUT_FALLBACK)
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/touchremote/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("touchremote");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if it does not exist.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to the default path.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Writes the documented example config to the user's config directory.
    ///
    /// # Errors
    /// Returns an error if a config file already exists at the target path, or if the
    /// directory or file cannot be written.
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(&config_path, EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

/// The documented example configuration shipped with the binary.
pub const EXAMPLE_CONFIG: &str = include_str!("../../config.example.toml");

static DEFAULT_LAYOUT_FALLBACK: std::sync::LazyLock<LayoutConfig> =
    std::sync::LazyLock::new(LayoutConfig::default);

fn validate_layout(layout: &mut LayoutConfig) {
    if !(1..=MAX_GRID_DIMENSION).contains(&layout.rows) {
        warn!(
            "Layout '{}': invalid rows {}, clamping to 1-{MAX_GRID_DIMENSION} range",
            layout.name, layout.rows
        );
        layout.rows = layout.rows.clamp(1, MAX_GRID_DIMENSION);
    }
    if !(1..=MAX_GRID_DIMENSION).contains(&layout.cols) {
        warn!(
            "Layout '{}': invalid cols {}, clamping to 1-{MAX_GRID_DIMENSION} range",
            layout.name, layout.cols
        );
        layout.cols = layout.cols.clamp(1, MAX_GRID_DIMENSION);
    }
    if !(1..=10).contains(&layout.mouse_speed) {
        warn!(
            "Layout '{}': invalid mouse_speed {}, clamping to 1-10 range",
            layout.name, layout.mouse_speed
        );
        layout.mouse_speed = layout.mouse_speed.clamp(1, 10);
    }
    if layout.pad_percent > 100 {
        warn!(
            "Layout '{}': invalid pad_percent {}, clamping to 0-100 range",
            layout.name, layout.pad_percent
        );
        layout.pad_percent = 100;
    }

    let cells = layout.rows * layout.cols;
    if layout.keys.len() > cells {
        warn!(
            "Layout '{}': {} keys for {} cells, ignoring the extra keys",
            layout.name,
            layout.keys.len(),
            cells
        );
        layout.keys.truncate(cells);
    } else if layout.keys.len() < cells {
        debug!(
            "Layout '{}': filling {} empty cells with dummy keys",
            layout.name,
            cells - layout.keys.len()
        );
        layout.keys.resize(cells, KeyAction::Dummy);
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
