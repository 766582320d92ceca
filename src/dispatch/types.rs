//! Error and status types for outbound command delivery.

use std::time::Duration;
use thiserror::Error;

/// Health of the transport as last observed by the dispatcher worker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DispatchStatus {
    /// Nothing sent yet
    #[default]
    Idle,
    /// The last datagram was handed to the socket
    Sending,
    /// The last send failed with this message
    Failing(String),
}

/// Errors that can occur while delivering commands.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to encode message: {0}")]
    Cipher(String),

    #[error("Transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No reply within {0:?}")]
    Timeout(Duration),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("Dispatcher not running")]
    ChannelClosed,
}
