//! Configuration type definitions.

use super::enums::SensorMode;
use crate::protocol::KeyAction;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where commands are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionConfig {
    /// Host name or IP address of the receiving agent
    #[serde(default = "default_host")]
    pub host: String,

    /// UDP port of the receiving agent (1 - 65535)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret applied to every outgoing datagram
    #[serde(default)]
    pub password: String,

    /// Keyboard language index announced with `LNG` on startup and resume
    #[serde(default = "default_language")]
    pub language: u32,

    /// How long `--probe` waits for a `pong`, in milliseconds (100 - 60000)
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: String::new(),
            language: default_language(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// Mouse pad behaviour shared by all layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PadConfig {
    /// Reserve a strip on the right edge of the pad for scrolling
    #[serde(default = "default_true")]
    pub wheel_enabled: bool,

    /// Width of the scroll strip in pixels (0 - 1000)
    #[serde(default = "default_wheel_width")]
    pub wheel_width: u32,

    /// Send a left click when the pad is tapped
    #[serde(default = "default_true")]
    pub click_on_tap: bool,

    /// Longest touch still counted as a tap, in milliseconds (10 - 1000)
    #[serde(default = "default_tap_window_ms")]
    pub tap_window_ms: u64,

    /// Send `MPZ` zoom steps for two-finger pinches
    #[serde(default)]
    pub pinch_zoom: bool,

    /// Ignore motion while pressure is below this fraction of the initial
    /// pressure (0.0 - 1.0)
    #[serde(default = "default_pressure_ratio")]
    pub pressure_ratio: f32,

    /// Haptic feedback on key presses and taps
    #[serde(default = "default_true")]
    pub vibrate: bool,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            wheel_enabled: true,
            wheel_width: default_wheel_width(),
            click_on_tap: true,
            tap_window_ms: default_tap_window_ms(),
            pinch_zoom: false,
            pressure_ratio: default_pressure_ratio(),
            vibrate: true,
        }
    }
}

/// Tilt sensor behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SensorsConfig {
    /// Start with sensors enabled
    #[serde(default)]
    pub enabled: bool,

    /// `mouse`, `cursor` or `mouse-game`
    #[serde(default)]
    pub mode: SensorMode,

    /// React to left/right tilt
    #[serde(default = "default_true")]
    pub x_enabled: bool,

    /// React to forward/back tilt
    #[serde(default = "default_true")]
    pub y_enabled: bool,

    /// Tilt that engages a direction (must be positive)
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Additional tilt beyond the threshold before engaging (0.0 or more)
    #[serde(default = "default_hysteresis")]
    pub hysteresis: f32,

    /// Gain for `mouse-game` mode (must be positive)
    #[serde(default = "default_scale")]
    pub scale: f32,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: SensorMode::default(),
            x_enabled: true,
            y_enabled: true,
            threshold: default_threshold(),
            hysteresis: default_hysteresis(),
            scale: default_scale(),
        }
    }
}

/// One keypad layout.
///
/// `keys` is read row-major; missing entries are filled with `dummy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayoutConfig {
    #[serde(default = "default_layout_name")]
    pub name: String,

    /// Number of key rows (1 - 20)
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Number of key columns (1 - 20)
    #[serde(default = "default_cols")]
    pub cols: usize,

    #[serde(default = "default_keys")]
    pub keys: Vec<KeyAction>,

    /// Relative motion multiplier (1 - 10)
    #[serde(default = "default_mouse_speed")]
    pub mouse_speed: i32,

    /// Share of the surface height used by the mouse pad, in percent (0 - 100)
    #[serde(default = "default_pad_percent")]
    pub pad_percent: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            name: default_layout_name(),
            rows: default_rows(),
            cols: default_cols(),
            keys: default_keys(),
            mouse_speed: default_mouse_speed(),
            pad_percent: default_pad_percent(),
        }
    }
}

impl LayoutConfig {
    /// Binding of a 1-based key index; unlisted cells are `dummy`.
    pub fn key(&self, index: usize) -> KeyAction {
        index
            .checked_sub(1)
            .and_then(|i| self.keys.get(i))
            .copied()
            .unwrap_or(KeyAction::Dummy)
    }
}

pub(crate) fn default_layouts() -> Vec<LayoutConfig> {
    vec![LayoutConfig::default()]
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "192.168.10.184".to_string()
}

fn default_port() -> u16 {
    5555
}

fn default_language() -> u32 {
    1
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

fn default_wheel_width() -> u32 {
    80
}

fn default_tap_window_ms() -> u64 {
    150
}

fn default_pressure_ratio() -> f32 {
    0.7
}

fn default_threshold() -> f32 {
    1.0
}

fn default_hysteresis() -> f32 {
    0.2
}

fn default_scale() -> f32 {
    5.0
}

fn default_layout_name() -> String {
    "Default".to_string()
}

fn default_rows() -> usize {
    5
}

fn default_cols() -> usize {
    4
}

fn default_mouse_speed() -> i32 {
    2
}

fn default_pad_percent() -> u32 {
    50
}

fn default_keys() -> Vec<KeyAction> {
    use KeyAction::*;
    vec![
        Escape,
        LeftCtrl,
        CursorUp,
        Return,
        Space,
        CursorLeft,
        Dummy,
        CursorRight,
        Tab,
        MouseUp,
        CursorDown,
        Plus,
        MouseLeft,
        Dummy,
        MouseRight,
        Minus,
        MouseClick,
        MouseDown,
        MouseRightClick,
        Dummy,
    ]
}
