use crate::config::SensorMode;
use crate::input::sensor::Axis;
use crate::protocol::Command;

use super::RemoteState;

/// Key code typed by [`RemoteEvent::Backspace`].
const BACKSPACE_CODE: u32 = 8;

/// Non-touch input to the remote, handled by [`RemoteState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    /// Newly pressed keys latch (or stop latching)
    ToggleStickyEditing,
    /// Rotate through binding, name and color editing
    CycleEditMode,
    SwitchLayout(usize),
    /// The drawing surface changed size
    Resize { width: u32, height: u32 },
    SetSensorMode(SensorMode),
    SetSensorsEnabled(bool),
    SetSensorAxis { axis: Axis, enabled: bool },
    /// The next sensor samples become the neutral tilt
    BeginCalibration,
    SelectLanguage(u32),
    /// Type each character as a key press and release
    TypeText(String),
    Backspace,
    /// The remote came to the foreground
    Resume,
    /// The remote went to the background
    Pause,
}

impl RemoteState {
    /// Applies one event, queueing any resulting effects.
    ///
    /// Events that change what keys or directions mean release whatever is
    /// currently held before the change takes effect.
    pub fn apply(&mut self, event: RemoteEvent) {
        log::debug!("Remote event: {event:?}");
        match event {
            RemoteEvent::ToggleStickyEditing => {
                self.latch.toggle_sticky_editing();
            }
            RemoteEvent::CycleEditMode => {
                self.release_held_keys();
                self.edit_mode = self.edit_mode.cycle();
                log::info!("Edit mode: {:?}", self.edit_mode);
            }
            RemoteEvent::SwitchLayout(index) => self.switch_layout(index),
            RemoteEvent::Resize { width, height } => {
                if (width, height) == self.surface {
                    return;
                }
                self.release_held_keys();
                self.unstick_all();
                self.surface = (width, height);
                self.rebuild();
            }
            RemoteEvent::SetSensorMode(mode) => {
                let mut out = Vec::new();
                self.sensor.set_mode(mode, &mut out);
                self.sensors_config.mode = mode;
                self.extend(out);
            }
            RemoteEvent::SetSensorsEnabled(enabled) => {
                self.sensors_wanted = enabled;
                let mut out = Vec::new();
                if enabled {
                    self.sensor.activate(&mut out);
                } else {
                    self.sensor.deactivate(&mut out);
                }
                self.extend(out);
            }
            RemoteEvent::SetSensorAxis { axis, enabled } => {
                let mut out = Vec::new();
                self.sensor.set_axis_enabled(axis, enabled, &mut out);
                self.extend(out);
            }
            RemoteEvent::BeginCalibration => {
                // The batch that ends calibration is dropped, so nothing may
                // stay held across it.
                self.release_held_keys();
                self.gesture.reset();
                let mut out = Vec::new();
                self.sensor.begin_calibration(&mut out);
                self.extend(out);
            }
            RemoteEvent::SelectLanguage(index) => {
                self.language = index;
                self.send(Command::Language(index));
            }
            RemoteEvent::TypeText(text) => {
                for c in text.chars() {
                    let code = u32::from(c);
                    self.send(Command::KeyPress(code));
                    self.send(Command::KeyRelease(code));
                }
            }
            RemoteEvent::Backspace => {
                self.send(Command::KeyPress(BACKSPACE_CODE));
                self.send(Command::KeyRelease(BACKSPACE_CODE));
            }
            RemoteEvent::Resume => {
                self.send(Command::Language(self.language));
                if self.sensors_wanted {
                    let mut out = Vec::new();
                    self.sensor.activate(&mut out);
                    self.extend(out);
                }
            }
            RemoteEvent::Pause => {
                self.release_held_keys();
                self.unstick_all();
                self.gesture.reset();
                let mut out = Vec::new();
                self.sensor.deactivate(&mut out);
                self.extend(out);
            }
        }
    }

    fn switch_layout(&mut self, index: usize) {
        if index >= self.layouts.len() {
            log::warn!(
                "Ignoring switch to layout {index}: only {} defined",
                self.layouts.len()
            );
            return;
        }
        if index == self.active_layout {
            return;
        }
        self.release_held_keys();
        self.unstick_all();
        self.active_layout = index;
        log::info!("Switched to layout '{}'", self.layout().name);
        self.rebuild();
    }
}
