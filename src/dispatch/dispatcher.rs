use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::dispatch::{
    dependencies::DispatchDependencies,
    types::{DispatchError, DispatchStatus},
};
use crate::input::Effect;
use crate::protocol::Command;

/// Fire-and-forget command sender.
///
/// Commands are queued on an unbounded channel and sent in order by a
/// background task, so queueing never waits on the network. Send failures
/// are logged and reported through the notifier once per failure streak;
/// they are never returned to the caller.
pub struct Dispatcher {
    /// Channel for queued wire commands.
    command_tx: Option<mpsc::UnboundedSender<String>>,
    /// Shared status of the transport.
    status: Arc<Mutex<DispatchStatus>>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Create a dispatcher and spawn its worker on `runtime_handle`.
    pub fn new(runtime_handle: &tokio::runtime::Handle, dependencies: DispatchDependencies) -> Self {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<String>();
        let status = Arc::new(Mutex::new(DispatchStatus::Idle));
        let status_clone = status.clone();

        let worker = runtime_handle.spawn(async move {
            let target = dependencies.transport.target();
            let mut notified = false;

            while let Some(message) = command_rx.recv().await {
                log::debug!("Sending {message} to {target}");
                match send_one(&dependencies, &message).await {
                    Ok(()) => {
                        if notified {
                            log::info!("Connection to {target} recovered");
                        }
                        notified = false;
                        *status_clone.lock().await = DispatchStatus::Sending;
                    }
                    Err(e) => {
                        let error_message = e.to_string();
                        log::warn!("Failed to send {message} to {target}: {error_message}");
                        *status_clone.lock().await = DispatchStatus::Failing(error_message.clone());
                        if !notified {
                            notified = true;
                            dependencies
                                .notifier
                                .notify(
                                    "Connection failed",
                                    &format!("{target}: {error_message}"),
                                )
                                .await;
                        }
                    }
                }
            }
            log::debug!("Dispatcher for {target} stopped");
        });

        Self {
            command_tx: Some(command_tx),
            status,
            worker: Some(worker),
        }
    }

    /// Queue one command.
    pub fn dispatch(&self, command: &Command) -> Result<(), DispatchError> {
        let tx = self.command_tx.as_ref().ok_or(DispatchError::ChannelClosed)?;
        tx.send(command.to_string())
            .map_err(|_| DispatchError::ChannelClosed)
    }

    /// Queue every `Send` effect in order. Other effects are left to the caller.
    pub fn dispatch_effects(&self, effects: &[Effect]) -> Result<(), DispatchError> {
        for effect in effects {
            if let Effect::Send(command) = effect {
                self.dispatch(command)?;
            }
        }
        Ok(())
    }

    pub async fn status(&self) -> DispatchStatus {
        self.status.lock().await.clone()
    }

    /// Stop accepting commands and wait until the queue is drained.
    pub async fn shutdown(mut self) {
        self.command_tx.take();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                log::error!("Dispatcher worker failed: {e}");
            }
        }
    }
}

async fn send_one(dependencies: &DispatchDependencies, message: &str) -> Result<(), DispatchError> {
    let payload = dependencies.cipher.encrypt(message)?;
    dependencies.transport.send(&payload).await
}

#[cfg(test)]
impl Dispatcher {
    pub(crate) fn with_closed_channel_for_test() -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(rx);
        Self {
            command_tx: Some(tx),
            status: Arc::new(Mutex::new(DispatchStatus::Idle)),
            worker: None,
        }
    }
}
