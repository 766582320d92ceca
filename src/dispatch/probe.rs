//! One-shot liveness check against the agent.

use std::time::Duration;

use tokio::net::UdpSocket;

use crate::dispatch::{cipher::Cipher, types::DispatchError};
use crate::protocol::Command;

const PONG: &str = "pong";

/// Sends an encoded `ping` and waits up to `timeout` for a reply starting
/// with `pong`.
pub async fn probe(
    host: &str,
    port: u16,
    cipher: &dyn Cipher,
    timeout: Duration,
) -> Result<(), DispatchError> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect((host, port)).await?;
    let payload = cipher.encrypt(&Command::Ping.to_string())?;
    socket.send(&payload).await?;

    let mut reply = [0u8; 64];
    let len = tokio::time::timeout(timeout, socket.recv(&mut reply))
        .await
        .map_err(|_| DispatchError::Timeout(timeout))??;

    check_reply(&reply[..len])
}

fn check_reply(reply: &[u8]) -> Result<(), DispatchError> {
    let text = String::from_utf8_lossy(reply);
    if text.starts_with(PONG) {
        log::debug!("Probe answered: {}", text.trim_end());
        Ok(())
    } else {
        Err(DispatchError::UnexpectedReply(text.trim_end().to_string()))
    }
}
