// IPC metrics module
//
// Lightweight counters for the renderer link and the settings context

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-wide IPC metrics
///
/// Uses atomic operations for thread-safe tracking without locks. Counters are
/// logged on shutdown so a session's traffic can be checked after the fact.
#[derive(Debug)]
pub struct Metrics {
    /// Datagrams handed to the transport (batches count once)
    pub messages_sent: AtomicU64,

    /// Sends the transport rejected
    pub send_failures: AtomicU64,

    /// Composite transactions flushed as a `CommandArray`
    pub batches_flushed: AtomicU64,

    /// Messages carried inside flushed batches
    pub batched_messages: AtomicU64,

    /// Queries issued
    pub queries: AtomicU64,

    /// Queries that failed, timed out or were abandoned
    pub query_failures: AtomicU64,

    /// Inbound commands routed to the settings context
    pub inbound_commands: AtomicU64,

    /// Inbound commands no category handled
    pub inbound_ignored: AtomicU64,

    /// Responses whose correlation id matched no pending query
    pub orphan_responses: AtomicU64,

    /// Tasks posted to the settings context
    pub context_tasks: AtomicU64,

    /// Tasks dropped because the context queue was full or closed
    pub context_channel_full: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            messages_sent: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
            batches_flushed: AtomicU64::new(0),
            batched_messages: AtomicU64::new(0),
            queries: AtomicU64::new(0),
            query_failures: AtomicU64::new(0),
            inbound_commands: AtomicU64::new(0),
            inbound_ignored: AtomicU64::new(0),
            orphan_responses: AtomicU64::new(0),
            context_tasks: AtomicU64::new(0),
            context_channel_full: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a flushed composite carrying `count` messages
    pub fn record_batch_flushed(&self, count: usize) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        self.batched_messages
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query_failure(&self) {
        self.query_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inbound_command(&self) {
        self.inbound_commands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inbound_ignored(&self) {
        self.inbound_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_orphan_response(&self) {
        self.orphan_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_context_task(&self) {
        self.context_tasks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_context_channel_full(&self) {
        self.context_channel_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average number of messages per flushed batch
    pub fn avg_batch_size(&self) -> f64 {
        let batches = self.batches_flushed.load(Ordering::Relaxed);
        let messages = self.batched_messages.load(Ordering::Relaxed);
        if batches > 0 {
            messages as f64 / batches as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== IPC Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", uptime.as_secs_f64());
        tracing::info!(
            "Messages: {} sent, {} failed",
            self.messages_sent.load(Ordering::Relaxed),
            self.send_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Batches: {} flushed (avg: {:.1} messages per batch)",
            self.batches_flushed.load(Ordering::Relaxed),
            self.avg_batch_size()
        );
        tracing::info!(
            "Queries: {} issued, {} failed, orphan responses: {}",
            self.queries.load(Ordering::Relaxed),
            self.query_failures.load(Ordering::Relaxed),
            self.orphan_responses.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Inbound: {} commands, {} ignored",
            self.inbound_commands.load(Ordering::Relaxed),
            self.inbound_ignored.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Context tasks: {}, channel full errors: {}",
            self.context_tasks.load(Ordering::Relaxed),
            self.context_channel_full.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.messages_sent.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.queries.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_batches() {
        let metrics = Metrics::new();

        metrics.record_batch_flushed(4);
        metrics.record_batch_flushed(2);

        assert_eq!(metrics.batches_flushed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.batched_messages.load(Ordering::Relaxed), 6);
        assert_eq!(metrics.avg_batch_size(), 3.0);
    }

    #[test]
    fn test_avg_batch_size_no_batches() {
        assert_eq!(Metrics::new().avg_batch_size(), 0.0);
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }

    #[test]
    fn test_traffic_counters() {
        let metrics = Metrics::new();

        metrics.record_message_sent();
        metrics.record_send_failure();
        metrics.record_query();
        metrics.record_query_failure();
        metrics.record_inbound_command();
        metrics.record_inbound_ignored();
        metrics.record_orphan_response();
        metrics.record_context_task();
        metrics.record_context_channel_full();

        assert_eq!(metrics.messages_sent.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.send_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.queries.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.query_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.inbound_commands.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.inbound_ignored.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.orphan_responses.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.context_tasks.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.context_channel_full.load(Ordering::Relaxed), 1);
    }
}
