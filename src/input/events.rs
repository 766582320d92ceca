//! Platform-neutral input and output event types.

use std::time::Duration;

use crate::protocol::Command;

/// One active touch contact within a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Stable for the lifetime of the contact
    pub id: u32,
    pub x: f32,
    pub y: f32,
    /// Contact pressure, 0..1
    pub pressure: f32,
    /// Monotonic time at which this contact touched down
    pub down_time: Duration,
    /// Monotonic time of this sample
    pub event_time: Duration,
}

impl Pointer {
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// What changed in this batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// A new contact with this id touched down
    Down { id: u32 },
    /// One or more contacts moved
    Move,
    /// The contact with this id lifted; it is still listed in the batch
    Up { id: u32 },
    /// The platform aborted the whole gesture
    Cancel,
}

/// All live pointers at one instant, plus the change that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchBatch {
    pub action: TouchAction,
    pub pointers: Vec<Pointer>,
}

impl TouchBatch {
    pub fn new(action: TouchAction, pointers: Vec<Pointer>) -> Self {
        Self { action, pointers }
    }

    /// Id of the pointer that lifted in this batch, if any.
    pub fn lifted_id(&self) -> Option<u32> {
        match self.action {
            TouchAction::Up { id } => Some(id),
            _ => None,
        }
    }

    pub fn pointer(&self, id: u32) -> Option<&Pointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    /// Positions of pointers that are still in contact after this batch.
    ///
    /// The lifted pointer is excluded, as is everything on cancel.
    pub fn live_positions(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let lifted = self.lifted_id();
        let cancelled = self.action == TouchAction::Cancel;
        self.pointers
            .iter()
            .filter(move |p| !cancelled && Some(p.id) != lifted)
            .map(Pointer::position)
    }
}

/// Display rotation relative to the device's natural orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Maps a rotation in degrees (0, 90, 180, 270) to a variant.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }
}

/// Screen-relative tilt reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSample {
    pub x: f32,
    pub y: f32,
}

impl SensorSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Projects a raw accelerometer reading `[x, y, z]` onto the screen axes
    /// for the given display rotation. The z component is unused.
    pub fn project(raw: [f32; 3], rotation: Rotation) -> Self {
        let [ax, ay, _] = raw;
        let (x, y) = match rotation {
            Rotation::R0 => (ax, -ay),
            Rotation::R90 => (-ay, -ax),
            Rotation::R180 => (-ax, ay),
            Rotation::R270 => (ay, ax),
        };
        Self { x, y }
    }

    pub fn offset_by(self, calibration: SensorSample) -> Self {
        Self {
            x: self.x - calibration.x,
            y: self.y - calibration.y,
        }
    }
}

/// Output of the input core, consumed in order by the embedding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand this command to the dispatcher
    Send(Command),
    /// Short haptic pulse
    Vibrate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(id: u32, x: f32, y: f32) -> Pointer {
        Pointer {
            id,
            x,
            y,
            pressure: 1.0,
            down_time: Duration::ZERO,
            event_time: Duration::ZERO,
        }
    }

    #[test]
    fn live_positions_skip_lifted_pointer() {
        let batch = TouchBatch::new(
            TouchAction::Up { id: 2 },
            vec![pointer(1, 1.0, 1.0), pointer(2, 5.0, 5.0)],
        );
        let live: Vec<_> = batch.live_positions().collect();
        assert_eq!(live, vec![(1.0, 1.0)]);
    }

    #[test]
    fn cancel_has_no_live_positions() {
        let batch = TouchBatch::new(TouchAction::Cancel, vec![pointer(1, 1.0, 1.0)]);
        assert_eq!(batch.live_positions().count(), 0);
    }

    #[test]
    fn projection_follows_display_rotation() {
        let raw = [1.0, 2.0, 9.8];
        assert_eq!(SensorSample::project(raw, Rotation::R0), SensorSample::new(1.0, -2.0));
        assert_eq!(SensorSample::project(raw, Rotation::R90), SensorSample::new(-2.0, -1.0));
        assert_eq!(SensorSample::project(raw, Rotation::R180), SensorSample::new(-1.0, 2.0));
        assert_eq!(SensorSample::project(raw, Rotation::R270), SensorSample::new(2.0, 1.0));
    }

    #[test]
    fn rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::R270));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::R90));
        assert_eq!(Rotation::from_degrees(45), None);
    }
}
