//! Library exports for the touchremote input core.
//!
//! The input state machines, the command vocabulary and the configuration types
//! are usable on their own, so a touchscreen front end can embed them and hand
//! the resulting commands to [`dispatch::Dispatcher`].

pub mod config;
pub mod dispatch;
pub mod input;
pub mod notification;
pub mod protocol;
pub mod replay;
pub mod util;

pub use config::Config;
