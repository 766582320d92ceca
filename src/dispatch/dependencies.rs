use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::OnceCell;

use crate::config::ConnectionConfig;
use crate::dispatch::{
    cipher::{Cipher, PasswordPrefix},
    types::DispatchError,
};
use crate::notification;

/// Abstraction over how an encoded datagram reaches the agent.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, payload: &[u8]) -> Result<(), DispatchError>;

    /// Human-readable destination, used in notifications.
    fn target(&self) -> String;
}

/// Abstraction over surfacing non-fatal delivery problems to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, summary: &str, body: &str);
}

/// Bundle of dependencies used by the dispatcher. Each component can be mocked in tests.
#[derive(Clone)]
pub struct DispatchDependencies {
    pub cipher: Arc<dyn Cipher>,
    pub transport: Arc<dyn Transport>,
    pub notifier: Arc<dyn Notifier>,
}

impl DispatchDependencies {
    /// UDP to the configured agent, password prefix, desktop notifications.
    pub fn for_connection(connection: &ConnectionConfig) -> Self {
        Self {
            cipher: Arc::new(PasswordPrefix::new(connection.password.clone())),
            transport: Arc::new(UdpTransport::new(&connection.host, connection.port)),
            notifier: Arc::new(DesktopNotifier),
        }
    }
}

/// Best-effort UDP sender. The socket is bound on first use.
pub struct UdpTransport {
    target: String,
    socket: OnceCell<UdpSocket>,
}

impl UdpTransport {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            target: format!("{host}:{port}"),
            socket: OnceCell::new(),
        }
    }

    async fn socket(&self) -> Result<&UdpSocket, DispatchError> {
        self.socket
            .get_or_try_init(|| async {
                let socket = UdpSocket::bind("0.0.0.0:0").await?;
                log::debug!("Bound UDP socket {:?}", socket.local_addr());
                Ok::<_, DispatchError>(socket)
            })
            .await
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, payload: &[u8]) -> Result<(), DispatchError> {
        let socket = self.socket().await?;
        socket.send_to(payload, self.target.as_str()).await?;
        Ok(())
    }

    fn target(&self) -> String {
        self.target.clone()
    }
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, summary: &str, body: &str) {
        log::error!("{summary}: {body}");
    }
}

/// Shows notifications on the desktop, falling back to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, summary: &str, body: &str) {
        log::error!("{summary}: {body}");
        if let Err(e) = notification::send_notification(summary, body).await {
            log::warn!("Failed to send notification: {}", e);
        }
    }
}
