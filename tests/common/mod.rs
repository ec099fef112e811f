//! Shared fixtures for integration tests
//!
//! Builds the production stack (channel + composite) over an in-memory
//! transport that records every datagram.

#![allow(dead_code)]

use avatar_config_sync::ipc::names::send;
use avatar_config_sync::ipc::{CommandArray, Transport, TransportError};
use avatar_config_sync::{
    CommandComposite, EventHub, Message, MessageChannel, MessageSender, Metrics, RootSettingSync,
    SaveSlotManager,
};
use camino::Utf8PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Transport that keeps every outbound datagram as text.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<String>>,
}

impl Transport for RecordingTransport {
    fn send_raw(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push(String::from_utf8(bytes.to_vec()).unwrap());
        Ok(())
    }
}

impl RecordingTransport {
    pub fn raw(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Datagrams decoded as messages (query envelopes included verbatim).
    pub fn messages(&self) -> Vec<Message> {
        self.raw()
            .iter()
            .filter_map(|text| Message::decode(text))
            .collect()
    }

    /// Messages with `CommandArray` batches expanded into their items.
    pub fn flattened(&self) -> Vec<Message> {
        self.messages()
            .into_iter()
            .flat_map(|m| {
                if m.command == send::COMMAND_ARRAY {
                    CommandArray::parse(&m.content).unwrap().items
                } else {
                    vec![m]
                }
            })
            .collect()
    }

    pub fn count(&self, command: &str) -> usize {
        self.flattened()
            .iter()
            .filter(|m| m.command == command)
            .count()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

pub struct Stack {
    pub transport: Arc<RecordingTransport>,
    pub channel: Arc<MessageChannel>,
    pub sender: Arc<dyn MessageSender>,
}

pub fn stack() -> Stack {
    let transport = Arc::new(RecordingTransport::default());
    let channel = Arc::new(MessageChannel::new(
        transport.clone(),
        Arc::new(Metrics::new()),
    ));
    let sender: Arc<dyn MessageSender> = Arc::new(CommandComposite::new(channel.clone()));
    Stack {
        transport,
        channel,
        sender,
    }
}

impl Stack {
    pub fn root(&self) -> RootSettingSync {
        RootSettingSync::new(self.sender.clone())
    }
}

/// Temporary save directory and a slot manager on it.
pub fn slots() -> (TempDir, SaveSlotManager, EventHub) {
    let dir = TempDir::new().unwrap();
    let path = utf8(&dir).join("slots");
    let events = EventHub::new();
    (dir, SaveSlotManager::new(path, events.clone()), events)
}

pub fn utf8(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
}

/// An existing file usable as a local character path.
pub fn character_file(dir: &TempDir, name: &str) -> String {
    let path = utf8(dir).join(name);
    std::fs::write(&path, b"glTF").unwrap();
    path.into_string()
}
