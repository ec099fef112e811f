// Message channel to the renderer
//
// Fire-and-forget sends plus correlated queries. Each query waits on a
// oneshot keyed by its id until `route_inbound` sees the matching response.

use crate::ipc::Message;
use crate::metrics::Metrics;
use regex::Regex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/// Matches a query response envelope: `!<id>|<payload>`.
static RESPONSE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^!(\d+)\|(.*)$").expect("Invalid response regex"));

/// Errors raised by the transport or by a query waiting on it
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload of {0} bytes exceeds the datagram limit")]
    PayloadTooLarge(usize),

    #[error("Query {command} (id {id}) timed out after {timeout:?}")]
    QueryTimeout {
        id: u64,
        command: String,
        timeout: Duration,
    },

    #[error("Query {0} was abandoned before a response arrived")]
    QueryAbandoned(u64),
}

/// Raw byte transport to the renderer.
///
/// Implementations must not block past the time it takes to hand the bytes to
/// the OS. Responses and inbound commands come back through
/// [`MessageChannel::route_inbound`], fed by whatever receive loop the
/// transport runs.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send_raw(&self, bytes: &[u8]) -> Result<(), TransportError>;
}

/// Send / query primitive over a [`Transport`].
///
/// Queries carry a correlation id (`?<id>|<command>:<content>`) and the peer
/// answers with `!<id>|<payload>`, so several queries can be in flight at once.
pub struct MessageChannel {
    transport: Arc<dyn Transport>,
    pending: Mutex<HashMap<u64, oneshot::Sender<String>>>,
    next_query_id: AtomicU64,
    query_timeout: Option<Duration>,
    metrics: Arc<Metrics>,
}

impl MessageChannel {
    pub fn new(transport: Arc<dyn Transport>, metrics: Arc<Metrics>) -> Self {
        Self {
            transport,
            pending: Mutex::new(HashMap::new()),
            next_query_id: AtomicU64::new(0),
            query_timeout: None,
            metrics,
        }
    }

    /// Fail queries that get no response within `timeout`.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Send a message, reporting transport failure to the caller.
    pub fn try_send(&self, message: &Message) -> Result<(), TransportError> {
        let text = message.encode();
        match self.transport.send_raw(text.as_bytes()) {
            Ok(()) => {
                self.metrics.record_message_sent();
                tracing::trace!("Sent {}", message);
                Ok(())
            }
            Err(e) => {
                self.metrics.record_send_failure();
                Err(e)
            }
        }
    }

    /// Fire-and-forget send. Failures are logged and swallowed.
    pub fn send(&self, message: &Message) {
        if let Err(e) = self.try_send(message) {
            tracing::warn!("Failed to send {}: {}", message, e);
        }
    }

    /// Send a query and wait for its correlated response.
    ///
    /// Dropping the returned future cancels the query; a late response for it
    /// is then discarded by [`route_inbound`](Self::route_inbound).
    pub async fn query(&self, message: &Message) -> Result<String, TransportError> {
        self.metrics.record_query();
        let result = self.query_inner(message).await;
        if result.is_err() {
            self.metrics.record_query_failure();
        }
        result
    }

    async fn query_inner(&self, message: &Message) -> Result<String, TransportError> {
        let id = self.next_query_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        self.lock_pending().insert(id, tx);
        let _pending = PendingQuery { channel: self, id };

        let envelope = format!("?{}|{}", id, message.encode());
        self.transport.send_raw(envelope.as_bytes())?;
        tracing::trace!("Query {} sent: {}", id, message);

        let response = match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, rx).await.map_err(|_| {
                TransportError::QueryTimeout {
                    id,
                    command: message.command.clone(),
                    timeout: limit,
                }
            })?,
            None => rx.await,
        };

        response.map_err(|_| TransportError::QueryAbandoned(id))
    }

    /// Route one inbound datagram.
    ///
    /// Query responses complete their waiter and yield `None`. Anything else
    /// is decoded as an inbound command for the settings context.
    pub fn route_inbound(&self, text: &str) -> Option<Message> {
        if let Some(caps) = RESPONSE_PATTERN.captures(text) {
            let payload = caps.get(2).map_or("", |m| m.as_str());
            match caps[1].parse::<u64>() {
                Ok(id) => self.complete_query(id, payload),
                Err(e) => tracing::warn!("Malformed query id in response: {}", e),
            }
            return None;
        }

        match Message::decode(text) {
            Some(message) => {
                self.metrics.record_inbound_command();
                Some(message)
            }
            None => {
                tracing::debug!("Ignoring empty inbound datagram");
                None
            }
        }
    }

    /// Number of queries still waiting for a response.
    pub fn pending_queries(&self) -> usize {
        self.lock_pending().len()
    }

    /// Abandon every pending query (used at shutdown).
    pub fn cancel_pending(&self) {
        let abandoned = std::mem::take(&mut *self.lock_pending());
        if !abandoned.is_empty() {
            tracing::debug!("Abandoned {} pending queries", abandoned.len());
        }
    }

    fn complete_query(&self, id: u64, payload: &str) {
        let waiter = self.lock_pending().remove(&id);
        match waiter {
            Some(tx) => {
                if tx.send(payload.to_string()).is_err() {
                    tracing::debug!("Query {} was dropped before its response arrived", id);
                }
            }
            None => {
                self.metrics.record_orphan_response();
                tracing::warn!("Dropping response for unknown query id {}", id);
            }
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<String>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes a query's waiter when the query future finishes or is dropped.
struct PendingQuery<'a> {
    channel: &'a MessageChannel,
    id: u64,
}

impl Drop for PendingQuery<'_> {
    fn drop(&mut self) {
        self.channel.lock_pending().remove(&self.id);
    }
}
