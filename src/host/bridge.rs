// ContextBridge - Marshals work from tokio tasks onto the settings context
//
// The settings tree has exactly one mutator: the task running
// `SettingsHost::run`. Polling tasks, query completions and the UI never touch
// it directly. They post closures through this bridge instead, and the host
// runs them in arrival order.

use crate::host::SettingsHost;
use crate::metrics::Metrics;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Unit of work executed on the settings context.
pub type ContextTask = Box<dyn FnOnce(&mut SettingsHost) + Send>;

/// Bounded to 100 tasks so a stalled context cannot grow memory without limit.
pub const CONTEXT_QUEUE_CAPACITY: usize = 100;

/// Cloneable handle for posting [`ContextTask`]s.
#[derive(Clone)]
pub struct ContextBridge {
    tx: mpsc::Sender<ContextTask>,
    metrics: Arc<Metrics>,
}

impl ContextBridge {
    /// Create a bridge and the receiving end the host drains.
    pub fn channel(metrics: Arc<Metrics>) -> (Self, mpsc::Receiver<ContextTask>) {
        let (tx, rx) = mpsc::channel(CONTEXT_QUEUE_CAPACITY);
        (Self { tx, metrics }, rx)
    }

    /// Schedule `task` on the settings context from any thread.
    ///
    /// Never blocks. When the queue is full the task is dropped with a warning.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce(&mut SettingsHost) + Send + 'static,
    {
        match self.tx.try_send(Box::new(task)) {
            Ok(()) => self.metrics.record_context_task(),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.record_context_channel_full();
                tracing::warn!("Settings context queue full - dropping task");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Failed to post task - settings context has stopped");
            }
        }
    }

    /// Turn `apply` into a result sink for a [`PollingWatcher`](crate::ipc::PollingWatcher).
    ///
    /// Each delivered value is posted to the context; `apply` runs there.
    pub fn sink<F>(&self, apply: F) -> impl FnMut(String) + Send + 'static
    where
        F: Fn(&mut SettingsHost, String) + Send + Sync + 'static,
    {
        let bridge = self.clone();
        let apply = Arc::new(apply);
        move |value| {
            let apply = apply.clone();
            bridge.post(move |host| apply(host, value));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
