//! Tilt-driven motion engine.
//!
//! In `mouse-game` mode every calibrated sample becomes relative motion. In
//! `mouse` and `cursor` modes each axis runs a three-state machine with a
//! hysteresis band beyond the threshold, holding a pointer direction or an
//! arrow key while the device stays tilted.

pub use crate::config::SensorMode;
use crate::input::events::{Effect, SensorSample};
use crate::protocol::{Command, Direction};

/// Sensor tunables, normally taken from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSettings {
    pub mode: SensorMode,
    pub x_enabled: bool,
    pub y_enabled: bool,
    /// Tilt past which a direction engages
    pub threshold: f32,
    /// Extra tilt required beyond the threshold; the band in between is inert
    pub hysteresis: f32,
    /// Continuous-mode gain applied before truncation
    pub scale: f32,
    /// Relative motion multiplier
    pub speed: i32,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            mode: SensorMode::Mouse,
            x_enabled: true,
            y_enabled: true,
            threshold: 1.0,
            hysteresis: 0.2,
            scale: 5.0,
            speed: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Held direction on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisState {
    #[default]
    None,
    Negative,
    Positive,
}

impl Axis {
    fn direction(self, state: AxisState) -> Option<Direction> {
        match (self, state) {
            (_, AxisState::None) => None,
            (Axis::X, AxisState::Positive) => Some(Direction::Left),
            (Axis::X, AxisState::Negative) => Some(Direction::Right),
            (Axis::Y, AxisState::Positive) => Some(Direction::Up),
            (Axis::Y, AxisState::Negative) => Some(Direction::Down),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SensorEngine {
    settings: SensorSettings,
    active: bool,
    calibrating: bool,
    calibration: SensorSample,
    x: AxisState,
    y: AxisState,
    /// Continuous-mode output already emitted, per axis
    consumed: (f32, f32),
}

impl SensorEngine {
    pub fn new(settings: SensorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &SensorSettings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    pub fn calibration(&self) -> SensorSample {
        self.calibration
    }

    pub fn set_calibration(&mut self, calibration: SensorSample) {
        self.calibration = calibration;
    }

    pub fn axis_state(&self, axis: Axis) -> AxisState {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn set_speed(&mut self, speed: i32) {
        self.settings.speed = speed;
    }

    /// Starts consuming samples. Entering `mouse-game` centers the mouse.
    pub fn activate(&mut self, out: &mut Vec<Effect>) {
        if self.active {
            return;
        }
        log::info!("Sensors enabled ({:?})", self.settings.mode);
        self.active = true;
        self.consumed = (0.0, 0.0);
        if self.settings.mode == SensorMode::MouseGame {
            out.push(Effect::Send(Command::CenterMouse));
        }
    }

    /// Stops consuming samples, releasing any held direction.
    pub fn deactivate(&mut self, out: &mut Vec<Effect>) {
        if !self.active {
            return;
        }
        log::info!("Sensors disabled");
        self.flush(out);
        self.active = false;
    }

    pub fn set_mode(&mut self, mode: SensorMode, out: &mut Vec<Effect>) {
        if self.settings.mode == mode {
            return;
        }
        self.flush(out);
        log::debug!("Sensor mode {:?} -> {:?}", self.settings.mode, mode);
        self.settings.mode = mode;
        self.consumed = (0.0, 0.0);
        if self.active && mode == SensorMode::MouseGame {
            out.push(Effect::Send(Command::CenterMouse));
        }
    }

    pub fn set_axis_enabled(&mut self, axis: Axis, enabled: bool, out: &mut Vec<Effect>) {
        if !enabled {
            self.flush_axis(axis, out);
        }
        match axis {
            Axis::X => self.settings.x_enabled = enabled,
            Axis::Y => self.settings.y_enabled = enabled,
        }
    }

    /// Subsequent samples only update the calibration offset until
    /// [`finish_calibration`](Self::finish_calibration).
    pub fn begin_calibration(&mut self, out: &mut Vec<Effect>) {
        self.flush(out);
        self.calibrating = true;
        log::info!("Sensor calibration started");
    }

    pub fn finish_calibration(&mut self) {
        if self.calibrating {
            self.calibrating = false;
            self.consumed = (0.0, 0.0);
            log::info!(
                "Sensor calibration set to ({:.2}, {:.2})",
                self.calibration.x,
                self.calibration.y
            );
        }
    }

    pub fn process(&mut self, sample: SensorSample, out: &mut Vec<Effect>) {
        if self.calibrating {
            self.calibration = sample;
            return;
        }
        if !self.active {
            return;
        }

        let value = sample.offset_by(self.calibration);
        match self.settings.mode {
            SensorMode::MouseGame => self.continuous(value, out),
            SensorMode::Mouse | SensorMode::Cursor => {
                if self.settings.x_enabled {
                    self.discrete(Axis::X, value.x, out);
                }
                if self.settings.y_enabled {
                    self.discrete(Axis::Y, value.y, out);
                }
            }
        }
    }

    fn continuous(&mut self, value: SensorSample, out: &mut Vec<Effect>) {
        let scale = self.settings.scale;
        let speed = self.settings.speed;

        let acc_x = -value.x * scale;
        let dx = (acc_x - self.consumed.0).trunc() as i32;
        if dx != 0 && self.settings.x_enabled {
            self.consumed.0 = acc_x;
            out.push(Effect::Send(Command::MoveX(dx * speed)));
        }

        let acc_y = -value.y * scale;
        let dy = (acc_y - self.consumed.1).trunc() as i32;
        if dy != 0 && self.settings.y_enabled {
            self.consumed.1 = acc_y;
            out.push(Effect::Send(Command::MoveY(dy * speed)));
        }
    }

    fn classify(&self, value: f32) -> Option<AxisState> {
        let t = self.settings.threshold;
        let h = self.settings.hysteresis;
        if value > t + h {
            Some(AxisState::Positive)
        } else if value > t {
            None
        } else if value < -t - h {
            Some(AxisState::Negative)
        } else if value < -t {
            None
        } else {
            Some(AxisState::None)
        }
    }

    fn discrete(&mut self, axis: Axis, value: f32, out: &mut Vec<Effect>) {
        let Some(target) = self.classify(value) else {
            return;
        };
        let current = self.axis_state(axis);
        if current == target {
            return;
        }
        log::debug!("Sensor {axis:?} {current:?} -> {target:?}");
        if let Some(dir) = axis.direction(current) {
            out.extend(self.stop_command(dir).map(Effect::Send));
        }
        if let Some(dir) = axis.direction(target) {
            out.extend(self.start_command(dir).map(Effect::Send));
        }
        self.set_axis_state(axis, target);
    }

    fn start_command(&self, dir: Direction) -> Option<Command> {
        match self.settings.mode {
            SensorMode::Mouse => Some(Command::PointerStart(dir)),
            SensorMode::Cursor => Some(Command::KeyPress(dir.cursor_key_code())),
            SensorMode::MouseGame => None,
        }
    }

    fn stop_command(&self, dir: Direction) -> Option<Command> {
        match self.settings.mode {
            SensorMode::Mouse => Some(Command::PointerStop(dir)),
            SensorMode::Cursor => Some(Command::KeyRelease(dir.cursor_key_code())),
            SensorMode::MouseGame => None,
        }
    }

    fn set_axis_state(&mut self, axis: Axis, state: AxisState) {
        match axis {
            Axis::X => self.x = state,
            Axis::Y => self.y = state,
        }
    }

    fn flush_axis(&mut self, axis: Axis, out: &mut Vec<Effect>) {
        if let Some(dir) = axis.direction(self.axis_state(axis)) {
            out.extend(self.stop_command(dir).map(Effect::Send));
        }
        self.set_axis_state(axis, AxisState::None);
    }

    /// Emits stops for every held direction.
    fn flush(&mut self, out: &mut Vec<Effect>) {
        self.flush_axis(Axis::X, out);
        self.flush_axis(Axis::Y, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(mode: SensorMode) -> SensorEngine {
        let mut engine = SensorEngine::new(SensorSettings {
            mode,
            speed: 1,
            ..SensorSettings::default()
        });
        engine.activate(&mut Vec::new());
        engine
    }

    fn feed(engine: &mut SensorEngine, x: f32, y: f32) -> Vec<String> {
        let mut out = Vec::new();
        engine.process(SensorSample::new(x, y), &mut out);
        out.into_iter()
            .filter_map(|e| match e {
                Effect::Send(cmd) => Some(cmd.to_string()),
                Effect::Vibrate => None,
            })
            .collect()
    }

    #[test]
    fn tilt_starts_and_stops_pointer_motion() {
        let mut sensors = engine(SensorMode::Mouse);
        assert_eq!(feed(&mut sensors, 1.5, 0.0), vec!["MML"]);
        assert!(feed(&mut sensors, 1.6, 0.0).is_empty());
        assert_eq!(feed(&mut sensors, 0.0, 0.0), vec!["MSL"]);
        assert_eq!(feed(&mut sensors, 0.0, -2.0), vec!["MMD"]);
    }

    #[test]
    fn crossing_directly_swaps_direction() {
        let mut sensors = engine(SensorMode::Cursor);
        assert_eq!(feed(&mut sensors, -1.3, 0.0), vec!["KBP39"]);
        assert_eq!(feed(&mut sensors, 1.3, 0.0), vec!["KBR39", "KBP37"]);
        assert_eq!(feed(&mut sensors, 0.0, 1.5), vec!["KBR37", "KBP38"]);
    }

    #[test]
    fn noise_inside_band_is_inert() {
        let mut sensors = engine(SensorMode::Mouse);
        for v in [1.05, 1.15, 1.01, 1.18, 1.1, -1.1, -1.19, -1.05] {
            assert!(feed(&mut sensors, v, v).is_empty(), "value {v}");
        }
        assert_eq!(sensors.axis_state(Axis::X), AxisState::None);

        // Once engaged, dropping into the band keeps the direction held.
        assert_eq!(feed(&mut sensors, 1.3, 0.0), vec!["MML"]);
        for v in [1.1, 1.19, 1.01, 1.15] {
            assert!(feed(&mut sensors, v, 0.0).is_empty(), "value {v}");
        }
        assert_eq!(sensors.axis_state(Axis::X), AxisState::Positive);
    }

    #[test]
    fn calibration_offsets_thresholds() {
        let mut sensors = engine(SensorMode::Mouse);
        sensors.begin_calibration(&mut Vec::new());
        assert!(feed(&mut sensors, 3.0, 0.5).is_empty());
        sensors.finish_calibration();
        assert!(feed(&mut sensors, 3.5, 0.5).is_empty());
        assert_eq!(feed(&mut sensors, 4.5, 0.5), vec!["MML"]);
    }

    #[test]
    fn deactivate_flushes_only_held_axes() {
        let mut sensors = engine(SensorMode::Mouse);
        feed(&mut sensors, 0.0, 2.0);
        let mut out = Vec::new();
        sensors.deactivate(&mut out);
        assert_eq!(out, vec![Effect::Send(Command::PointerStop(Direction::Up))]);
        assert!(feed(&mut sensors, 5.0, 5.0).is_empty());
    }

    #[test]
    fn disabled_axis_is_ignored_and_flushed() {
        let mut sensors = engine(SensorMode::Cursor);
        feed(&mut sensors, 2.0, 0.0);
        let mut out = Vec::new();
        sensors.set_axis_enabled(Axis::X, false, &mut out);
        assert_eq!(out, vec![Effect::Send(Command::KeyRelease(37))]);
        assert!(feed(&mut sensors, -2.0, 0.0).is_empty());
    }

    #[test]
    fn game_mode_streams_relative_motion() {
        let mut sensors = engine(SensorMode::MouseGame);
        assert_eq!(feed(&mut sensors, 0.1, 0.0), Vec::<String>::new());
        assert_eq!(feed(&mut sensors, 0.5, -0.4), vec!["XMM-2", "YMM2"]);
        assert_eq!(feed(&mut sensors, 0.5, -0.4), Vec::<String>::new());
    }

    #[test]
    fn switching_to_game_mode_centers_mouse() {
        let mut sensors = engine(SensorMode::Mouse);
        feed(&mut sensors, 2.0, 0.0);
        let mut out = Vec::new();
        sensors.set_mode(SensorMode::MouseGame, &mut out);
        assert_eq!(
            out,
            vec![
                Effect::Send(Command::PointerStop(Direction::Left)),
                Effect::Send(Command::CenterMouse),
            ]
        );
    }
}
