//! Touch-pad gesture engine.
//!
//! Tracks one move-pointer on the pad and classifies its activity as drag,
//! tap or (together with a second pointer) pinch. The rightmost strip of the
//! pad can act as a scroll wheel.

use std::time::Duration;

use crate::input::events::{Effect, Pointer, TouchAction, TouchBatch};
use crate::protocol::Command;
use crate::util::spacing;

/// Pinch distance, in pixels, per zoom step.
const ZOOM_STEP_PX: f32 = 30.0;
/// Vertical pixels per wheel step inside the wheel strip.
const WHEEL_STEP_PX: f32 = 6.0;

/// Tunables for the pad, normally taken from the active layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PadSettings {
    pub wheel_enabled: bool,
    /// Width of the wheel strip at the pad's right edge
    pub wheel_width: f32,
    pub click_on_tap: bool,
    /// A touch shorter than this is a tap
    pub tap_window: Duration,
    pub pinch_zoom: bool,
    /// Relative motion multiplier
    pub speed: i32,
    /// Motion is ignored while pressure is below this fraction of the
    /// pressure seen at the first motion sample
    pub pressure_ratio: f32,
    pub vibrate: bool,
}

impl Default for PadSettings {
    fn default() -> Self {
        Self {
            wheel_enabled: true,
            wheel_width: 80.0,
            click_on_tap: true,
            tap_window: Duration::from_millis(150),
            pinch_zoom: false,
            speed: 2,
            pressure_ratio: 0.7,
            vibrate: true,
        }
    }
}

/// Where the pad sits on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PadGeometry {
    /// Touches with `y > top` are on the pad
    pub top: f32,
    /// Surface width; the wheel strip is measured from this edge
    pub width: f32,
}

/// Pad gesture mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureMode {
    #[default]
    NoGesture,
    /// A second finger just landed; the next sample decides pinch or tap
    AwaitingGesture,
    Zoom,
}

#[derive(Debug, Clone)]
struct MoveTrack {
    id: u32,
    origin: (f32, f32),
    consumed: (f32, f32),
    reference_pressure: Option<f32>,
}

impl MoveTrack {
    fn start(pointer: &Pointer) -> Self {
        Self {
            id: pointer.id,
            origin: pointer.position(),
            consumed: (0.0, 0.0),
            reference_pressure: None,
        }
    }

    fn rebase(&mut self, pointer: &Pointer) {
        self.origin = pointer.position();
        self.consumed = (0.0, 0.0);
    }
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    second_id: u32,
    base_distance: f32,
    emitted_steps: i32,
}

#[derive(Debug, Clone, Default)]
pub struct GestureEngine {
    settings: PadSettings,
    geometry: PadGeometry,
    mode: GestureMode,
    track: Option<MoveTrack>,
    pinch: Option<Pinch>,
}

impl GestureEngine {
    pub fn new(settings: PadSettings, geometry: PadGeometry) -> Self {
        Self {
            settings,
            geometry,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn move_pointer(&self) -> Option<u32> {
        self.track.as_ref().map(|t| t.id)
    }

    pub fn settings(&self) -> &PadSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: PadSettings) {
        self.settings = settings;
    }

    pub fn geometry(&self) -> PadGeometry {
        self.geometry
    }

    /// Moves the pad; any gesture in progress is dropped.
    pub fn set_geometry(&mut self, geometry: PadGeometry) {
        self.geometry = geometry;
        self.reset();
    }

    pub fn is_on_pad(&self, pointer: &Pointer) -> bool {
        pointer.y > self.geometry.top
    }

    fn in_wheel_strip(&self, pointer: &Pointer) -> bool {
        self.settings.wheel_enabled
            && self.is_on_pad(pointer)
            && pointer.x > self.geometry.width - self.settings.wheel_width
    }

    /// Forgets the move-pointer and returns to `NoGesture` without emitting.
    pub fn reset(&mut self) {
        if self.track.is_some() {
            log::debug!("Pad gesture reset from {:?}", self.mode);
        }
        self.mode = GestureMode::NoGesture;
        self.track = None;
        self.pinch = None;
    }

    fn set_mode(&mut self, mode: GestureMode) {
        if self.mode != mode {
            log::debug!("Pad gesture {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Processes one touch batch, appending any effects to `out`.
    pub fn process(&mut self, batch: &TouchBatch, out: &mut Vec<Effect>) {
        if batch.pointers.is_empty() {
            self.reset();
            return;
        }
        match batch.action {
            TouchAction::Cancel => self.reset(),
            TouchAction::Down { id } => self.pointer_down(batch, id),
            TouchAction::Up { id } => self.pointer_up(batch, id, out),
            TouchAction::Move => self.pointer_move(batch, out),
        }
    }

    fn pointer_down(&mut self, batch: &TouchBatch, id: u32) {
        let Some(pointer) = batch.pointer(id) else {
            debug_assert!(false, "down event for pointer {id} not in batch");
            return;
        };
        if !self.is_on_pad(pointer) {
            return;
        }

        match (self.move_pointer(), self.mode) {
            (None, _) => {
                self.track = Some(MoveTrack::start(pointer));
                self.set_mode(GestureMode::NoGesture);
            }
            // The tracked contact never reported its lift; this is a new touch.
            (Some(track_id), _) if track_id == id => {
                log::debug!("Pointer {id} went down again, restarting pad track");
                self.pinch = None;
                self.track = Some(MoveTrack::start(pointer));
                self.set_mode(GestureMode::NoGesture);
            }
            (Some(track_id), GestureMode::NoGesture) => {
                let Some(first) = batch.pointer(track_id) else {
                    self.reset();
                    return;
                };
                self.pinch = Some(Pinch {
                    second_id: id,
                    base_distance: spacing(first.position(), pointer.position()),
                    emitted_steps: 0,
                });
                self.set_mode(GestureMode::AwaitingGesture);
            }
            // A third finger, or a new finger mid-pinch: not tracked.
            _ => {}
        }
    }

    fn pointer_up(&mut self, batch: &TouchBatch, id: u32, out: &mut Vec<Effect>) {
        let Some(track_id) = self.move_pointer() else {
            return;
        };

        if id == track_id {
            if self.mode != GestureMode::Zoom {
                if let Some(pointer) = batch.pointer(id) {
                    self.check_tap(pointer, out);
                }
            }
            self.reset();
            return;
        }

        if self.pinch.is_some_and(|p| p.second_id == id) {
            let mode = self.mode;
            self.pinch = None;
            self.set_mode(GestureMode::NoGesture);
            match mode {
                GestureMode::AwaitingGesture => {
                    if let Some(pointer) = batch.pointer(id) {
                        self.check_tap(pointer, out);
                    }
                }
                GestureMode::Zoom => self.rebase(batch, track_id),
                GestureMode::NoGesture => {}
            }
        }
    }

    fn pointer_move(&mut self, batch: &TouchBatch, out: &mut Vec<Effect>) {
        let Some(track_id) = self.move_pointer() else {
            return;
        };
        if batch.pointer(track_id).is_none() {
            self.reset();
            return;
        }

        match self.mode {
            GestureMode::NoGesture => self.emit_motion(batch, track_id, out),
            GestureMode::AwaitingGesture => {
                let second_present = self
                    .pinch
                    .is_some_and(|p| batch.pointer(p.second_id).is_some());
                if second_present {
                    self.set_mode(GestureMode::Zoom);
                    self.emit_zoom(batch, track_id, out);
                } else {
                    self.pinch = None;
                    self.set_mode(GestureMode::NoGesture);
                }
            }
            GestureMode::Zoom => self.emit_zoom(batch, track_id, out),
        }
    }

    fn rebase(&mut self, batch: &TouchBatch, track_id: u32) {
        match (batch.pointer(track_id), self.track.as_mut()) {
            (Some(pointer), Some(track)) => track.rebase(pointer),
            _ => self.reset(),
        }
    }

    fn emit_zoom(&mut self, batch: &TouchBatch, track_id: u32, out: &mut Vec<Effect>) {
        let Some(mut pinch) = self.pinch else {
            self.set_mode(GestureMode::NoGesture);
            return;
        };
        let (Some(first), Some(second)) = (batch.pointer(track_id), batch.pointer(pinch.second_id))
        else {
            self.pinch = None;
            self.set_mode(GestureMode::NoGesture);
            self.rebase(batch, track_id);
            return;
        };

        let distance = spacing(first.position(), second.position());
        let steps = ((distance - pinch.base_distance) / ZOOM_STEP_PX).trunc() as i32;
        let delta = steps - pinch.emitted_steps;
        if delta != 0 {
            pinch.emitted_steps = steps;
            if self.settings.pinch_zoom {
                out.push(Effect::Send(Command::PinchZoom(delta)));
            }
        }
        self.pinch = Some(pinch);
    }

    fn emit_motion(&mut self, batch: &TouchBatch, track_id: u32, out: &mut Vec<Effect>) {
        let Some(pointer) = batch.pointer(track_id) else {
            return;
        };
        let in_wheel = self.in_wheel_strip(pointer);
        let speed = self.settings.speed;
        let ratio = self.settings.pressure_ratio;
        let Some(track) = self.track.as_mut() else {
            return;
        };

        let reference = *track.reference_pressure.get_or_insert(pointer.pressure);
        if pointer.pressure < reference * ratio {
            return;
        }

        let acc = (pointer.x - track.origin.0, pointer.y - track.origin.1);
        let dx = (acc.0 - track.consumed.0).trunc() as i32;
        let dy_raw = acc.1 - track.consumed.1;
        let dy = dy_raw.trunc() as i32;

        if dx != 0 {
            track.consumed.0 = acc.0;
            if !in_wheel {
                out.push(Effect::Send(Command::MoveX(dx * speed)));
            }
        }
        if dy != 0 {
            track.consumed.1 = acc.1;
            if in_wheel {
                let steps = (dy_raw / WHEEL_STEP_PX).trunc() as i32;
                let steps = if steps != 0 { steps } else { dy.signum() };
                out.push(Effect::Send(Command::WheelStep(steps)));
            } else {
                out.push(Effect::Send(Command::MoveY(dy * speed)));
            }
        }
    }

    fn check_tap(&self, pointer: &Pointer, out: &mut Vec<Effect>) {
        if !self.settings.click_on_tap || self.in_wheel_strip(pointer) {
            return;
        }
        let held = pointer.event_time.saturating_sub(pointer.down_time);
        if held < self.settings.tap_window {
            log::debug!("Tap after {held:?}");
            out.push(Effect::Send(Command::LeftPress));
            out.push(Effect::Send(Command::LeftRelease));
            if self.settings.vibrate {
                out.push(Effect::Vibrate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(settings: PadSettings) -> GestureEngine {
        GestureEngine::new(
            settings,
            PadGeometry {
                top: 0.0,
                width: 480.0,
            },
        )
    }

    fn quiet() -> PadSettings {
        PadSettings {
            speed: 1,
            vibrate: false,
            pinch_zoom: true,
            ..PadSettings::default()
        }
    }

    fn at(id: u32, x: f32, y: f32, down_ms: u64, now_ms: u64) -> Pointer {
        Pointer {
            id,
            x,
            y,
            pressure: 1.0,
            down_time: Duration::from_millis(down_ms),
            event_time: Duration::from_millis(now_ms),
        }
    }

    fn run(engine: &mut GestureEngine, action: TouchAction, pointers: Vec<Pointer>) -> Vec<String> {
        let mut out = Vec::new();
        engine.process(&TouchBatch::new(action, pointers), &mut out);
        out.into_iter()
            .map(|effect| match effect {
                Effect::Send(cmd) => cmd.to_string(),
                Effect::Vibrate => "vibrate".to_string(),
            })
            .collect()
    }

    #[test]
    fn quick_lift_is_a_click() {
        let mut pad = engine(quiet());
        assert!(run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 50.0, 500.0, 0, 0)]).is_empty());
        let out = run(&mut pad, TouchAction::Up { id: 0 }, vec![at(0, 50.0, 500.0, 0, 80)]);
        assert_eq!(out, vec!["MLC", "MLR"]);
        assert_eq!(pad.move_pointer(), None);
    }

    #[test]
    fn slow_lift_is_not_a_click() {
        let mut pad = engine(quiet());
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 50.0, 500.0, 0, 0)]);
        let out = run(&mut pad, TouchAction::Up { id: 0 }, vec![at(0, 50.0, 500.0, 0, 150)]);
        assert!(out.is_empty());
    }

    #[test]
    fn tap_vibrates_when_enabled() {
        let mut pad = engine(PadSettings {
            vibrate: true,
            ..quiet()
        });
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 50.0, 500.0, 0, 0)]);
        let out = run(&mut pad, TouchAction::Up { id: 0 }, vec![at(0, 50.0, 500.0, 0, 20)]);
        assert_eq!(out, vec!["MLC", "MLR", "vibrate"]);
    }

    #[test]
    fn drag_emits_relative_motion() {
        let mut pad = engine(quiet());
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 10.0, 10.0, 0, 0)]);
        let out = run(&mut pad, TouchAction::Move, vec![at(0, 15.0, 10.0, 0, 16)]);
        assert_eq!(out, vec!["XMM5"]);
    }

    #[test]
    fn fractional_motion_accumulates() {
        let mut pad = engine(PadSettings { speed: 3, ..quiet() });
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 10.0, 10.0, 0, 0)]);
        assert!(run(&mut pad, TouchAction::Move, vec![at(0, 10.6, 10.0, 0, 10)]).is_empty());
        assert_eq!(
            run(&mut pad, TouchAction::Move, vec![at(0, 11.2, 12.5, 0, 20)]),
            vec!["XMM3", "YMM6"]
        );
    }

    #[test]
    fn low_pressure_motion_is_ignored() {
        let mut pad = engine(quiet());
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 10.0, 10.0, 0, 0)]);
        run(&mut pad, TouchAction::Move, vec![at(0, 12.0, 10.0, 0, 10)]);
        let mut lifting = at(0, 20.0, 10.0, 0, 20);
        lifting.pressure = 0.5;
        assert!(run(&mut pad, TouchAction::Move, vec![lifting]).is_empty());
        // The skipped distance is still pending once pressure recovers.
        assert_eq!(
            run(&mut pad, TouchAction::Move, vec![at(0, 21.0, 10.0, 0, 30)]),
            vec!["XMM9"]
        );
    }

    #[test]
    fn pinch_emits_zoom_steps() {
        let mut pad = engine(quiet());
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 100.0, 300.0, 0, 0)]);
        let a = at(0, 100.0, 300.0, 0, 10);
        run(&mut pad, TouchAction::Down { id: 1 }, vec![a, at(1, 200.0, 300.0, 10, 10)]);
        assert_eq!(pad.mode(), GestureMode::AwaitingGesture);

        let out = run(&mut pad, TouchAction::Move, vec![a, at(1, 260.0, 300.0, 10, 30)]);
        assert_eq!(out, vec!["MPZ2"]);
        assert_eq!(pad.mode(), GestureMode::Zoom);

        let out = run(&mut pad, TouchAction::Move, vec![a, at(1, 215.0, 300.0, 10, 40)]);
        assert_eq!(out, vec!["MPZ-2"]);
    }

    #[test]
    fn pinch_respects_zoom_setting() {
        let mut pad = engine(PadSettings {
            pinch_zoom: false,
            ..quiet()
        });
        let a = at(0, 100.0, 300.0, 0, 0);
        run(&mut pad, TouchAction::Down { id: 0 }, vec![a]);
        run(&mut pad, TouchAction::Down { id: 1 }, vec![a, at(1, 200.0, 300.0, 0, 0)]);
        let out = run(&mut pad, TouchAction::Move, vec![a, at(1, 300.0, 300.0, 0, 10)]);
        assert!(out.is_empty());
        assert_eq!(pad.mode(), GestureMode::Zoom);
    }

    #[test]
    fn second_finger_tap_clicks() {
        let mut pad = engine(quiet());
        let a = at(0, 100.0, 300.0, 0, 0);
        run(&mut pad, TouchAction::Down { id: 0 }, vec![a]);
        run(&mut pad, TouchAction::Down { id: 1 }, vec![a, at(1, 200.0, 300.0, 500, 500)]);
        let out = run(&mut pad, TouchAction::Up { id: 1 }, vec![a, at(1, 200.0, 300.0, 500, 560)]);
        assert_eq!(out, vec!["MLC", "MLR"]);
        assert_eq!(pad.mode(), GestureMode::NoGesture);
        assert_eq!(pad.move_pointer(), Some(0));
    }

    #[test]
    fn releasing_pinch_resumes_motion_without_jump() {
        let mut pad = engine(quiet());
        let a = at(0, 100.0, 300.0, 0, 0);
        run(&mut pad, TouchAction::Down { id: 0 }, vec![a]);
        run(&mut pad, TouchAction::Down { id: 1 }, vec![a, at(1, 200.0, 300.0, 0, 0)]);
        let a_moved = at(0, 150.0, 300.0, 0, 10);
        run(&mut pad, TouchAction::Move, vec![a_moved, at(1, 200.0, 300.0, 0, 10)]);
        let out = run(&mut pad, TouchAction::Up { id: 1 }, vec![a_moved, at(1, 200.0, 300.0, 0, 20)]);
        assert!(out.is_empty());

        let out = run(&mut pad, TouchAction::Move, vec![at(0, 152.0, 300.0, 0, 30)]);
        assert_eq!(out, vec!["XMM2"]);
    }

    #[test]
    fn lifting_move_pointer_during_zoom_does_not_click() {
        let mut pad = engine(quiet());
        let a = at(0, 100.0, 300.0, 0, 0);
        let b = at(1, 200.0, 300.0, 0, 0);
        run(&mut pad, TouchAction::Down { id: 0 }, vec![a]);
        run(&mut pad, TouchAction::Down { id: 1 }, vec![a, b]);
        run(&mut pad, TouchAction::Move, vec![a, b]);
        let out = run(&mut pad, TouchAction::Up { id: 0 }, vec![at(0, 100.0, 300.0, 0, 50), b]);
        assert!(out.is_empty());
        assert_eq!(pad.mode(), GestureMode::NoGesture);
        assert_eq!(pad.move_pointer(), None);
    }

    #[test]
    fn wheel_strip_scrolls_instead_of_moving() {
        let mut pad = engine(quiet());
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 450.0, 300.0, 0, 0)]);
        assert_eq!(
            run(&mut pad, TouchAction::Move, vec![at(0, 455.0, 312.0, 0, 10)]),
            vec!["MWS2"]
        );
        assert_eq!(
            run(&mut pad, TouchAction::Move, vec![at(0, 455.0, 310.0, 0, 20)]),
            vec!["MWS-1"]
        );
        let out = run(&mut pad, TouchAction::Up { id: 0 }, vec![at(0, 455.0, 310.0, 0, 30)]);
        assert!(out.is_empty(), "no tap on the wheel strip");
    }

    #[test]
    fn cancel_resets_without_emission() {
        let mut pad = engine(quiet());
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 50.0, 50.0, 0, 0)]);
        let out = run(&mut pad, TouchAction::Cancel, vec![at(0, 50.0, 50.0, 0, 10)]);
        assert!(out.is_empty());
        assert_eq!(pad.move_pointer(), None);
    }

    #[test]
    fn touches_above_the_pad_are_ignored() {
        let mut pad = GestureEngine::new(
            quiet(),
            PadGeometry {
                top: 200.0,
                width: 480.0,
            },
        );
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 50.0, 100.0, 0, 0)]);
        assert_eq!(pad.move_pointer(), None);
        let out = run(&mut pad, TouchAction::Up { id: 0 }, vec![at(0, 50.0, 100.0, 0, 10)]);
        assert!(out.is_empty());
    }

    #[test]
    fn repeated_down_restarts_the_track() {
        let mut pad = engine(quiet());
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 100.0, 100.0, 0, 0)]);
        run(&mut pad, TouchAction::Down { id: 0 }, vec![at(0, 300.0, 300.0, 900, 900)]);
        assert_eq!(pad.move_pointer(), Some(0));
        let out = run(&mut pad, TouchAction::Move, vec![at(0, 301.0, 300.0, 900, 920)]);
        assert_eq!(out, vec!["XMM1"]);
    }
}
