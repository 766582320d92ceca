//! Composite remote state: grid, latch, pad and sensors behind one owner.

use std::mem;
use std::time::Duration;

use crate::config::{Config, LayoutConfig, PadConfig, SensorsConfig};
use crate::input::events::Effect;
use crate::input::gesture::{GestureEngine, GestureMode, PadGeometry, PadSettings};
use crate::input::grid::{GridTransition, KeyGrid, KeyState};
use crate::input::sensor::{SensorEngine, SensorSettings};
use crate::input::sticky::{EditMode, LatchEffect, StickyLatch};
use crate::protocol::{Command, KeyAction};
use crate::util::Rect;

/// Surface size assumed until the embedding UI reports a real one.
pub(crate) const DEFAULT_SURFACE: (u32, u32) = (480, 800);

/// A key press captured while an edit mode is active.
///
/// The embedding UI resolves it (e.g. by showing a binding picker) and may
/// call [`RemoteState::set_binding`] with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRequest {
    pub mode: EditMode,
    /// 1-based key index
    pub key: usize,
    /// Current binding of that key
    pub action: KeyAction,
}

/// Owns every input state machine and routes one batch at a time.
///
/// All processing is synchronous; outbound work is queued as [`Effect`]s and
/// collected with [`take_effects`](Self::take_effects).
pub struct RemoteState {
    /// Layouts, including runtime rebinds
    pub(crate) layouts: Vec<LayoutConfig>,
    pub(crate) active_layout: usize,
    pub(crate) pad_config: PadConfig,
    pub(crate) sensors_config: SensorsConfig,
    /// Language index announced on resume
    pub(crate) language: u32,
    /// Surface width and height in pixels
    pub(crate) surface: (u32, u32),
    pub(crate) grid: KeyGrid,
    pub(crate) latch: StickyLatch,
    pub(crate) gesture: GestureEngine,
    pub(crate) sensor: SensorEngine,
    pub(crate) edit_mode: EditMode,
    /// Whether sensors should run while the remote is in the foreground
    pub(crate) sensors_wanted: bool,
    effects: Vec<Effect>,
    pending_edit: Option<EditRequest>,
}

impl RemoteState {
    /// Builds the state for `config`'s active layout on a default-sized surface.
    ///
    /// Sensors start inactive; send [`RemoteEvent::Resume`](super::RemoteEvent::Resume)
    /// to bring them up if enabled.
    pub fn new(config: &Config) -> Self {
        let layouts = if config.layouts.is_empty() {
            vec![LayoutConfig::default()]
        } else {
            config.layouts.clone()
        };
        let active_layout = config.active_layout.min(layouts.len() - 1);
        let layout = &layouts[active_layout];

        let pad_settings = pad_settings(&config.pad, layout);
        let sensor_settings = sensor_settings(&config.sensors, layout);

        let mut state = Self {
            grid: KeyGrid::new(layout.rows, layout.cols, Rect::default()),
            latch: StickyLatch::new(layout.rows * layout.cols),
            gesture: GestureEngine::new(pad_settings, PadGeometry::default()),
            sensor: SensorEngine::new(sensor_settings),
            layouts,
            active_layout,
            pad_config: config.pad.clone(),
            sensors_config: config.sensors.clone(),
            language: config.connection.language,
            surface: DEFAULT_SURFACE,
            edit_mode: EditMode::None,
            sensors_wanted: config.sensors.enabled,
            effects: Vec::new(),
            pending_edit: None,
        };
        state.rebuild();
        state
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layouts[self.active_layout]
    }

    pub fn layouts(&self) -> &[LayoutConfig] {
        &self.layouts
    }

    pub fn active_layout(&self) -> usize {
        self.active_layout
    }

    pub fn surface(&self) -> (u32, u32) {
        self.surface
    }

    pub fn grid(&self) -> &KeyGrid {
        &self.grid
    }

    pub fn key_state(&self, index: usize) -> KeyState {
        self.grid.state(index)
    }

    /// Binding of a 1-based key index in the active layout.
    pub fn binding(&self, index: usize) -> KeyAction {
        self.layout().key(index)
    }

    pub fn gesture_mode(&self) -> GestureMode {
        self.gesture.mode()
    }

    pub fn sensor(&self) -> &SensorEngine {
        &self.sensor
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn sticky_editing(&self) -> bool {
        self.latch.sticky_editing()
    }

    /// Drains queued effects in emission order.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        mem::take(&mut self.effects)
    }

    /// Takes the last key press captured in edit mode.
    pub fn take_pending_edit(&mut self) -> Option<EditRequest> {
        self.pending_edit.take()
    }

    /// Rebinds a key of the active layout.
    ///
    /// If the key is latched its old binding is released first.
    pub fn set_binding(&mut self, index: usize, action: KeyAction) {
        let Some(slot) = index.checked_sub(1).filter(|&i| i < self.grid.len()) else {
            log::warn!("Ignoring rebind of key {index}: layout has {} keys", self.grid.len());
            return;
        };
        if self.latch.unstick(index) {
            self.send_release(self.binding(index));
        }

        let layout = &mut self.layouts[self.active_layout];
        if layout.keys.len() <= slot {
            layout.keys.resize(slot + 1, KeyAction::Dummy);
        }
        log::info!(
            "Key {index} in layout '{}' rebound: {:?} -> {:?}",
            layout.name,
            layout.keys[slot],
            action
        );
        layout.keys[slot] = action;
    }

    /// Recomputes grid and pad geometry for the active layout and surface.
    ///
    /// Grid state is reset; callers flush held keys first.
    pub(crate) fn rebuild(&mut self) {
        let layout = self.layout().clone();
        let (width, height) = self.surface;
        let pad_height = height.saturating_mul(layout.pad_percent.min(100)) / 100;
        let keypad_height = height - pad_height;

        let area = Rect {
            x: 0,
            y: 0,
            width: width as i32,
            height: keypad_height as i32,
        };
        self.grid = KeyGrid::new(layout.rows, layout.cols, area);
        self.latch.reset(self.grid.len());
        self.gesture
            .set_settings(pad_settings(&self.pad_config, &layout));
        self.gesture.set_geometry(PadGeometry {
            top: keypad_height as f32,
            width: width as f32,
        });
        self.sensor.set_speed(layout.mouse_speed);
    }

    pub(crate) fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub(crate) fn send(&mut self, command: Command) {
        self.effects.push(Effect::Send(command));
    }

    pub(crate) fn extend(&mut self, effects: Vec<Effect>) {
        self.effects.extend(effects);
    }

    pub(crate) fn send_release(&mut self, action: KeyAction) {
        if let Some(command) = action.release() {
            self.send(command);
        }
    }

    /// Feeds one grid transition through the latch and the vocabulary.
    pub(crate) fn apply_transition(&mut self, transition: GridTransition) {
        match transition {
            GridTransition::KeyDown(index) => {
                let action = self.binding(index);
                match self.latch.key_down(index, self.edit_mode) {
                    LatchEffect::Press => {
                        if let Some(command) = action.press() {
                            self.send(command);
                        }
                        if self.pad_config.vibrate && action != KeyAction::Dummy {
                            self.push(Effect::Vibrate);
                        }
                    }
                    LatchEffect::Release => self.send_release(action),
                    LatchEffect::Edit(mode) => {
                        log::debug!("Key {index} captured for {mode:?} edit");
                        self.pending_edit = Some(EditRequest {
                            mode,
                            key: index,
                            action,
                        });
                    }
                    LatchEffect::Nothing => {}
                }
            }
            GridTransition::KeyUp(index) => {
                if self.latch.key_up(index, self.edit_mode) == LatchEffect::Release {
                    self.send_release(self.binding(index));
                }
            }
        }
    }

    /// Releases every finger-held key through the latch.
    pub(crate) fn release_held_keys(&mut self) {
        for transition in self.grid.release_all() {
            self.apply_transition(transition);
        }
    }

    /// Releases every latched key.
    pub(crate) fn unstick_all(&mut self) {
        for index in self.latch.unstick_all() {
            self.send_release(self.binding(index));
        }
    }
}

fn pad_settings(pad: &PadConfig, layout: &LayoutConfig) -> PadSettings {
    PadSettings {
        wheel_enabled: pad.wheel_enabled,
        wheel_width: pad.wheel_width as f32,
        click_on_tap: pad.click_on_tap,
        tap_window: Duration::from_millis(pad.tap_window_ms),
        pinch_zoom: pad.pinch_zoom,
        speed: layout.mouse_speed,
        pressure_ratio: pad.pressure_ratio,
        vibrate: pad.vibrate,
    }
}

fn sensor_settings(sensors: &SensorsConfig, layout: &LayoutConfig) -> SensorSettings {
    SensorSettings {
        mode: sensors.mode,
        x_enabled: sensors.x_enabled,
        y_enabled: sensors.y_enabled,
        threshold: sensors.threshold,
        hysteresis: sensors.hysteresis,
        scale: sensors.scale,
        speed: layout.mouse_speed,
    }
}
