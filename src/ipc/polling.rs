// Polling watcher
//
// Re-queries the renderer on a fixed interval for values it never pushes,
// such as camera position and device layout.

use crate::ipc::{Message, MessageChannel};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollingError {
    #[error("Polling watcher is already running")]
    AlreadyStarted,

    #[error("Polling watcher was stopped; create a new one for a new session")]
    Stopped,
}

enum WatcherState {
    Idle,
    Running(JoinHandle<()>),
    Stopped,
}

/// Periodically queries the renderer and reports each answer to a sink.
///
/// One instance covers exactly one `start` / `stop` session. Query failures
/// are logged and the loop keeps going; polled values are advisory.
///
/// Results are delivered from the polling task itself, so a sink that touches
/// UI-bound state should marshal (see [`crate::host::ContextBridge::sink`]).
pub struct PollingWatcher {
    channel: Arc<MessageChannel>,
    query: Message,
    cancel_tx: watch::Sender<bool>,
    /// Held while checking cancellation and delivering, and by `stop`.
    delivery_gate: Arc<Mutex<()>>,
    state: WatcherState,
}

impl PollingWatcher {
    pub fn new(channel: Arc<MessageChannel>, query: Message) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            channel,
            query,
            cancel_tx,
            delivery_gate: Arc::new(Mutex::new(())),
            state: WatcherState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, WatcherState::Running(_))
    }

    /// Start polling every `interval`.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, interval: Duration, on_result: F) -> Result<(), PollingError>
    where
        F: FnMut(String) + Send + 'static,
    {
        match self.state {
            WatcherState::Idle => {}
            WatcherState::Running(_) => return Err(PollingError::AlreadyStarted),
            WatcherState::Stopped => return Err(PollingError::Stopped),
        }

        let mut cancel_rx = self.cancel_tx.subscribe();
        let channel = self.channel.clone();
        let query = self.query.clone();
        let gate = self.delivery_gate.clone();
        let mut on_result = on_result;

        tracing::debug!("Polling {} every {:?}", query.command, interval);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => return,
                    _ = tokio::time::sleep(interval) => {}
                }

                if *cancel_rx.borrow() {
                    return;
                }

                let response = tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => return,
                    response = channel.query(&query) => response,
                };

                match response {
                    Ok(data) => {
                        let _gate = gate.lock().unwrap_or_else(PoisonError::into_inner);
                        if *cancel_rx.borrow() {
                            return;
                        }
                        on_result(data);
                    }
                    Err(e) => {
                        tracing::warn!("Polling query {} failed: {}", query.command, e);
                    }
                }
            }
        });

        self.state = WatcherState::Running(task);
        Ok(())
    }

    /// Cancel the wait and any in-flight query.
    ///
    /// Once this returns no further result is delivered. Calling it on an
    /// idle watcher retires the watcher as well.
    pub fn stop(&mut self) {
        {
            let _gate = self
                .delivery_gate
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.cancel_tx.send_replace(true);
        }

        if let WatcherState::Running(task) =
            std::mem::replace(&mut self.state, WatcherState::Stopped)
        {
            task.abort();
            tracing::debug!("Stopped polling {}", self.query.command);
        }
    }
}

impl Drop for PollingWatcher {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}
