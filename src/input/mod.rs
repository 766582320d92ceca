//! Touch and tilt input core.
//!
//! This module turns touch batches and sensor samples into protocol commands.
//! The key grid, sticky latch, pad gesture engine and sensor engine are plain
//! synchronous state machines; [`RemoteState`] owns one of each and routes
//! every event through them in order.

pub mod events;
pub mod gesture;
pub mod grid;
pub mod sensor;
pub mod state;
pub mod sticky;

// Re-export commonly used types at module level
pub use events::{Effect, Pointer, Rotation, SensorSample, TouchAction, TouchBatch};
pub use gesture::{GestureMode, PadSettings};
pub use grid::{KeyGrid, KeyState};
pub use sensor::{Axis, SensorEngine};
pub use state::{EditRequest, RemoteEvent, RemoteState};
pub use sticky::EditMode;
