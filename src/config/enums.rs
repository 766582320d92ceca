//! Configuration enum types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What tilting the device does.
///
/// ```toml
/// [sensors]
/// mode = "mouse-game"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SensorMode {
    /// Hold a pointer direction (`MML`/`MSL`, ...) while tilted
    #[default]
    Mouse,
    /// Hold an arrow key (`KBP37`/`KBR37`, ...) while tilted
    Cursor,
    /// Stream relative mouse motion proportional to the tilt
    MouseGame,
}
