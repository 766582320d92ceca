//! Outbound command delivery.
//!
//! Wire commands are encoded by a [`Cipher`] and sent over a [`Transport`]
//! (UDP by default) from a background task. Delivery is best effort: the
//! input core never waits on it and never sees its errors.

pub mod cipher;
pub mod types;

mod dependencies;
mod dispatcher;
mod probe;

pub use cipher::{Cipher, PasswordPrefix, Plaintext};
pub use dependencies::{
    DesktopNotifier, DispatchDependencies, LogNotifier, Notifier, Transport, UdpTransport,
};
pub use dispatcher::Dispatcher;
pub use probe::probe;
pub use types::{DispatchError, DispatchStatus};
