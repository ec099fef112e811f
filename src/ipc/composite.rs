// Command composite
//
// Buffers messages between nested start/end calls and flushes them as one
// CommandArray batch when the outermost transaction ends.

use crate::ipc::{CommandArray, Message, MessageChannel, MessageSender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct CompositeState {
    /// Open transaction depth. Zero means idle.
    depth: usize,
    buffer: Vec<Message>,
}

/// Transaction wrapper around [`MessageChannel`].
///
/// While at least one composite is open, sends are buffered in call order.
/// When the outermost composite ends, the buffer is flushed as a single
/// `CommandArray` message so the renderer applies every change before it
/// re-evaluates once. Nested start/end pairs from independent call sites
/// (a bulk load that triggers a reset, for example) share one transaction.
pub struct CommandComposite {
    channel: Arc<MessageChannel>,
    state: Mutex<CompositeState>,
}

impl CommandComposite {
    pub fn new(channel: Arc<MessageChannel>) -> Self {
        Self {
            channel,
            state: Mutex::new(CompositeState::default()),
        }
    }

    pub fn channel(&self) -> &Arc<MessageChannel> {
        &self.channel
    }

    /// Whether a transaction is currently open.
    pub fn is_open(&self) -> bool {
        self.lock_state().depth > 0
    }

    pub fn depth(&self) -> usize {
        self.lock_state().depth
    }

    /// Number of messages waiting for the outermost `end_composite`.
    pub fn buffered(&self) -> usize {
        self.lock_state().buffer.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, CompositeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MessageSender for CommandComposite {
    fn send_message(&self, message: Message) {
        // Sending under the lock keeps idle sends ordered against a flush
        // happening on another task.
        let mut state = self.lock_state();
        if state.depth > 0 {
            state.buffer.push(message);
        } else {
            self.channel.send(&message);
        }
    }

    fn start_composite(&self) {
        let mut state = self.lock_state();
        state.depth += 1;
        if state.depth == 1 {
            tracing::trace!("Command composite opened");
        }
    }

    fn end_composite(&self) {
        let mut state = self.lock_state();
        if state.depth == 0 {
            tracing::warn!("end_composite called without a matching start_composite");
            return;
        }

        state.depth -= 1;
        if state.depth > 0 {
            return;
        }

        let items = std::mem::take(&mut state.buffer);
        if items.is_empty() {
            tracing::trace!("Command composite closed with no messages");
            return;
        }

        let count = items.len();
        match CommandArray::new(items).to_message() {
            Ok(batch) => {
                self.channel.send(&batch);
                self.channel.metrics().record_batch_flushed(count);
                tracing::debug!("Flushed command composite with {} messages", count);
            }
            Err(e) => {
                tracing::error!("Discarding command composite of {} messages: {}", count, e);
            }
        }
    }
}

/// Open composite transaction that ends when dropped.
///
/// ```ignore
/// {
///     let _scope = CompositeScope::open(sender);
///     window.reset_to_default();
///     motion.reset_to_default();
/// } // flushed here, also on early return
/// ```
pub struct CompositeScope<'a> {
    sender: &'a dyn MessageSender,
}

impl<'a> CompositeScope<'a> {
    pub fn open(sender: &'a dyn MessageSender) -> Self {
        sender.start_composite();
        Self { sender }
    }
}

impl Drop for CompositeScope<'_> {
    fn drop(&mut self) {
        self.sender.end_composite();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::channel::MockTransport;
    use crate::ipc::names;
    use crate::metrics::Metrics;
    use proptest::prelude::*;

    /// Composite over a mock transport that records each datagram.
    fn recording_composite() -> (CommandComposite, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = sent.clone();
        let mut mock = MockTransport::new();
        mock.expect_send_raw().returning(move |bytes| {
            sink.lock()
                .unwrap()
                .push(String::from_utf8(bytes.to_vec()).unwrap());
            Ok(())
        });

        let channel = Arc::new(MessageChannel::new(Arc::new(mock), Arc::new(Metrics::new())));
        (CommandComposite::new(channel), sent)
    }

    fn batch_items(datagram: &str) -> Vec<Message> {
        let msg = Message::decode(datagram).unwrap();
        assert_eq!(msg.command, names::send::COMMAND_ARRAY);
        CommandArray::parse(&msg.content).unwrap().items
    }

    #[test]
    fn test_idle_send_is_immediate() {
        let (composite, sent) = recording_composite();
        composite.send_message(Message::new("TopMost", "True"));
        assert_eq!(*sent.lock().unwrap(), vec!["TopMost:True".to_string()]);
    }

    #[test]
    fn test_nested_composite_flushes_once() {
        let (composite, sent) = recording_composite();
        let msg = |c: &str| Message::new(c, "1");

        composite.start_composite();
        composite.send_message(msg("A"));
        composite.send_message(msg("B"));
        composite.start_composite();
        composite.send_message(msg("C"));
        composite.end_composite();
        assert!(sent.lock().unwrap().is_empty(), "inner end must not flush");
        composite.send_message(msg("D"));
        composite.end_composite();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            batch_items(&sent[0]),
            vec![msg("A"), msg("B"), msg("C"), msg("D")]
        );
        assert!(!composite.is_open());
    }

    #[test]
    fn test_empty_composite_sends_nothing() {
        let (composite, sent) = recording_composite();
        composite.start_composite();
        composite.end_composite();
        assert!(sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unbalanced_end_is_ignored() {
        let (composite, sent) = recording_composite();
        composite.end_composite();
        assert_eq!(composite.depth(), 0);

        composite.send_message(Message::new("A", ""));
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_scope_closes_on_early_return() {
        let (composite, sent) = recording_composite();

        fn apply(sender: &dyn MessageSender, fail: bool) -> Result<(), &'static str> {
            let _scope = CompositeScope::open(sender);
            sender.send_message(Message::new("A", "1"));
            if fail {
                return Err("midway");
            }
            sender.send_message(Message::new("B", "2"));
            Ok(())
        }

        assert!(apply(&composite, true).is_err());
        assert!(!composite.is_open());
        assert_eq!(batch_items(&sent.lock().unwrap()[0]).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_batch_preserves_call_order(commands in proptest::collection::vec("[A-Za-z]{1,12}", 0..40)) {
            let (composite, sent) = recording_composite();

            composite.start_composite();
            for (i, command) in commands.iter().enumerate() {
                composite.send_message(Message::new(command.clone(), i.to_string()));
            }
            composite.end_composite();

            let sent = sent.lock().unwrap();
            if commands.is_empty() {
                prop_assert!(sent.is_empty());
            } else {
                prop_assert_eq!(sent.len(), 1);
                let items = batch_items(&sent[0]);
                let expected: Vec<Message> = commands
                    .iter()
                    .enumerate()
                    .map(|(i, c)| Message::new(c.clone(), i.to_string()))
                    .collect();
                prop_assert_eq!(items, expected);
            }
        }
    }
}
