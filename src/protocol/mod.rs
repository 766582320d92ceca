//! Outbound command protocol.
//!
//! [`Command`] is the typed form of every message the remote can send;
//! [`KeyAction`] is the vocabulary of bindable keys and the commands they
//! produce on press and release.

pub mod command;
pub mod vocabulary;

pub use command::{Command, Direction};
pub use vocabulary::{Binding, KEY_TABLE, KeyAction, KeyEntry};
