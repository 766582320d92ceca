//! Scripted input scenarios.
//!
//! A scenario is a TOML file with a list of `[[steps]]`, each one touch batch,
//! sensor sample or remote event. Replaying it drives a [`RemoteState`] exactly
//! as a touchscreen would and collects the resulting effects.
//!
//! ```toml
//! [[steps]]
//! kind = "touch"
//! action = "down"
//! id = 0
//! pointers = [{ id = 0, x = 50.0, y = 500.0 }]
//!
//! [[steps]]
//! kind = "touch"
//! action = "up"
//! id = 0
//! pointers = [{ id = 0, x = 50.0, y = 500.0, time_ms = 40 }]
//!
//! [[steps]]
//! kind = "event"
//! event = { switch_layout = 1 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::SensorMode;
use crate::input::{
    Axis, Effect, Pointer, RemoteEvent, RemoteState, Rotation, SensorSample, TouchAction,
    TouchBatch,
};

/// Errors that can occur while loading or replaying a scenario.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read scenario {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Step {step}: '{action}' needs the id of the pointer that changed")]
    MissingPointerId { step: usize, action: &'static str },

    #[error("Step {step}: pointer {id} is not part of the batch")]
    PointerNotInBatch { step: usize, id: u32 },

    #[error("Step {step}: rotation must be 0, 90, 180 or 270, got {degrees}")]
    InvalidRotation { step: usize, degrees: u32 },

    #[error("Step {step}: sensor step needs x and y, or raw")]
    MissingSensorValue { step: usize },
}

/// A parsed scenario file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    Touch {
        action: TouchKind,
        /// Pointer that went down or up
        #[serde(default)]
        id: Option<u32>,
        #[serde(default)]
        pointers: Vec<PointerSpec>,
    },
    Sensor {
        #[serde(default)]
        x: Option<f32>,
        #[serde(default)]
        y: Option<f32>,
        /// Raw accelerometer reading, projected with `rotation`
        #[serde(default)]
        raw: Option<[f32; 3]>,
        #[serde(default)]
        rotation: u32,
    },
    Resize {
        width: u32,
        height: u32,
    },
    Event {
        event: ScriptedEvent,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchKind {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointerSpec {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_pressure")]
    pub pressure: f32,
    /// When this pointer went down
    #[serde(default)]
    pub down_ms: u64,
    /// Timestamp of this sample
    #[serde(default)]
    pub time_ms: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisName {
    X,
    Y,
}

/// Remote events as written in a scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedEvent {
    ToggleStickyEditing,
    CycleEditMode,
    SwitchLayout(usize),
    SetSensorMode(SensorMode),
    SetSensorsEnabled(bool),
    SetSensorAxis { axis: AxisName, enabled: bool },
    BeginCalibration,
    SelectLanguage(u32),
    TypeText(String),
    Backspace,
    Resume,
    Pause,
}

/// One step, checked and ready to feed to the state.
#[derive(Debug, Clone)]
enum Input {
    Touch(TouchBatch),
    Sensor(SensorSample),
    Event(RemoteEvent),
}

fn default_pressure() -> f32 {
    1.0
}

impl FromStr for Scenario {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let text = fs::read_to_string(path).map_err(|source| ReplayError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario: Scenario = text.parse()?;
        log::info!(
            "Loaded scenario {} ({} steps)",
            path.display(),
            scenario.steps.len()
        );
        Ok(scenario)
    }

    fn compile(&self) -> Result<Vec<Input>, ReplayError> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| step.compile(i + 1))
            .collect()
    }
}

impl Step {
    fn compile(&self, step: usize) -> Result<Input, ReplayError> {
        match self {
            Step::Touch {
                action,
                id,
                pointers,
            } => {
                let pointers: Vec<Pointer> = pointers.iter().map(|p| p.to_pointer()).collect();
                let action = match (action, id) {
                    (TouchKind::Move, _) => TouchAction::Move,
                    (TouchKind::Cancel, _) => TouchAction::Cancel,
                    (TouchKind::Down, Some(id)) => TouchAction::Down { id: *id },
                    (TouchKind::Up, Some(id)) => TouchAction::Up { id: *id },
                    (TouchKind::Down, None) => {
                        return Err(ReplayError::MissingPointerId {
                            step,
                            action: "down",
                        });
                    }
                    (TouchKind::Up, None) => {
                        return Err(ReplayError::MissingPointerId { step, action: "up" });
                    }
                };
                if let TouchAction::Down { id } | TouchAction::Up { id } = action {
                    if !pointers.iter().any(|p| p.id == id) {
                        return Err(ReplayError::PointerNotInBatch { step, id });
                    }
                }
                Ok(Input::Touch(TouchBatch::new(action, pointers)))
            }
            Step::Sensor {
                x,
                y,
                raw,
                rotation,
            } => {
                let sample = match (raw, x, y) {
                    (Some(raw), _, _) => {
                        let rotation = Rotation::from_degrees(*rotation).ok_or(
                            ReplayError::InvalidRotation {
                                step,
                                degrees: *rotation,
                            },
                        )?;
                        SensorSample::project(*raw, rotation)
                    }
                    (None, Some(x), Some(y)) => SensorSample::new(*x, *y),
                    _ => return Err(ReplayError::MissingSensorValue { step }),
                };
                Ok(Input::Sensor(sample))
            }
            Step::Resize { width, height } => Ok(Input::Event(RemoteEvent::Resize {
                width: *width,
                height: *height,
            })),
            Step::Event { event } => Ok(Input::Event(event.clone().into())),
        }
    }
}

impl PointerSpec {
    fn to_pointer(self) -> Pointer {
        Pointer {
            id: self.id,
            x: self.x,
            y: self.y,
            pressure: self.pressure,
            down_time: Duration::from_millis(self.down_ms),
            event_time: Duration::from_millis(self.time_ms),
        }
    }
}

impl From<AxisName> for Axis {
    fn from(axis: AxisName) -> Self {
        match axis {
            AxisName::X => Axis::X,
            AxisName::Y => Axis::Y,
        }
    }
}

impl From<ScriptedEvent> for RemoteEvent {
    fn from(event: ScriptedEvent) -> Self {
        match event {
            ScriptedEvent::ToggleStickyEditing => RemoteEvent::ToggleStickyEditing,
            ScriptedEvent::CycleEditMode => RemoteEvent::CycleEditMode,
            ScriptedEvent::SwitchLayout(index) => RemoteEvent::SwitchLayout(index),
            ScriptedEvent::SetSensorMode(mode) => RemoteEvent::SetSensorMode(mode),
            ScriptedEvent::SetSensorsEnabled(enabled) => RemoteEvent::SetSensorsEnabled(enabled),
            ScriptedEvent::SetSensorAxis { axis, enabled } => RemoteEvent::SetSensorAxis {
                axis: axis.into(),
                enabled,
            },
            ScriptedEvent::BeginCalibration => RemoteEvent::BeginCalibration,
            ScriptedEvent::SelectLanguage(index) => RemoteEvent::SelectLanguage(index),
            ScriptedEvent::TypeText(text) => RemoteEvent::TypeText(text),
            ScriptedEvent::Backspace => RemoteEvent::Backspace,
            ScriptedEvent::Resume => RemoteEvent::Resume,
            ScriptedEvent::Pause => RemoteEvent::Pause,
        }
    }
}

/// Replays every step against `state` and returns the effects in order.
///
/// The whole scenario is checked before the first step is applied, so an
/// invalid file leaves `state` untouched.
pub fn run(state: &mut RemoteState, scenario: &Scenario) -> Result<Vec<Effect>, ReplayError> {
    let inputs = scenario.compile()?;
    let mut effects = Vec::new();
    for input in inputs {
        match input {
            Input::Touch(batch) => state.process_touch(&batch),
            Input::Sensor(sample) => state.process_sensor(sample),
            Input::Event(event) => state.apply(event),
        }
        effects.extend(state.take_effects());
    }
    Ok(effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn commands(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Send(cmd) => Some(cmd.to_string()),
                Effect::Vibrate => None,
            })
            .collect()
    }

    fn replay(text: &str) -> Result<Vec<String>, ReplayError> {
        let scenario: Scenario = text.parse()?;
        let mut state = RemoteState::new(&Config::default());
        run(&mut state, &scenario).map(|effects| commands(&effects))
    }

    #[test]
    fn tap_scenario_clicks() {
        let out = replay(
            r#"
            [[steps]]
            kind = "touch"
            action = "down"
            id = 0
            pointers = [{ id = 0, x = 50.0, y = 500.0 }]

            [[steps]]
            kind = "touch"
            action = "up"
            id = 0
            pointers = [{ id = 0, x = 50.0, y = 500.0, time_ms = 40 }]
            "#,
        )
        .unwrap();
        assert_eq!(out, vec!["MLC", "MLR"]);
    }

    #[test]
    fn events_and_sensor_steps() {
        let out = replay(
            r#"
            [[steps]]
            kind = "event"
            event = { select_language = 2 }

            [[steps]]
            kind = "event"
            event = { set_sensors_enabled = true }

            [[steps]]
            kind = "sensor"
            raw = [0.0, 2.0, 9.8]

            [[steps]]
            kind = "event"
            event = "pause"
            "#,
        )
        .unwrap();
        // Raw y of 2.0 projects to screen y -2.0 at 0 degrees.
        assert_eq!(out, vec!["LNG2", "MMD", "MSD"]);
    }

    #[test]
    fn resize_step_rebuilds_grid() {
        let scenario: Scenario = r#"
            [[steps]]
            kind = "resize"
            width = 800
            height = 600
        "#
        .parse()
        .unwrap();
        let mut state = RemoteState::new(&Config::default());
        run(&mut state, &scenario).unwrap();
        assert_eq!(state.surface(), (800, 600));
    }

    #[test]
    fn down_without_id_is_rejected() {
        let err = replay(
            r#"
            [[steps]]
            kind = "touch"
            action = "down"
            pointers = [{ id = 0, x = 1.0, y = 1.0 }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ReplayError::MissingPointerId { step: 1, .. }));
    }

    #[test]
    fn lifted_pointer_must_be_in_batch() {
        let err = replay(
            r#"
            [[steps]]
            kind = "touch"
            action = "up"
            id = 3
            pointers = [{ id = 0, x = 1.0, y = 1.0 }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ReplayError::PointerNotInBatch { step: 1, id: 3 }));
    }

    #[test]
    fn bad_rotation_is_rejected() {
        let err = replay(
            r#"
            [[steps]]
            kind = "sensor"
            raw = [0.0, 0.0, 9.8]
            rotation = 45
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ReplayError::InvalidRotation { degrees: 45, .. }));
    }

    #[test]
    fn invalid_scenario_leaves_state_untouched() {
        let scenario: Scenario = r#"
            [[steps]]
            kind = "event"
            event = { switch_layout = 0 }

            [[steps]]
            kind = "sensor"
            x = 1.0
        "#
        .parse()
        .unwrap();
        let mut state = RemoteState::new(&Config::default());
        let err = run(&mut state, &scenario).unwrap_err();
        assert!(matches!(err, ReplayError::MissingSensorValue { step: 2 }));
        assert!(state.take_effects().is_empty());
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let err = "[[steps]]\nkind = \"jump\"\n".parse::<Scenario>().unwrap_err();
        assert!(matches!(err, ReplayError::Parse(_)));
    }

    #[test]
    fn bundled_demos_parse() {
        for text in [
            include_str!("../demos/pad_tap.toml"),
            include_str!("../demos/sticky_keys.toml"),
        ] {
            let scenario: Scenario = text.parse().unwrap();
            assert!(!scenario.steps.is_empty());
        }
    }
}
