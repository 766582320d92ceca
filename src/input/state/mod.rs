mod actions;
mod core;
mod touch;

pub use actions::RemoteEvent;
pub use core::{EditRequest, RemoteState};
