//! Settings context: the single owner and mutator of the settings tree.
//!
//! [`SettingsHost`] ties the tree to the save slots, the renderer channel and
//! the event hub. It runs as one tokio task ([`SettingsHost::run`]) that drains
//! inbound renderer commands and [`ContextTask`]s posted through the
//! [`ContextBridge`]. Anything that needs the tree from another task (polling
//! results, query answers, the UI) goes through the bridge.

pub mod bridge;

pub use bridge::{CONTEXT_QUEUE_CAPACITY, ContextBridge, ContextTask};

use crate::events::{EventHub, NameListKind, SettingsEvent};
use crate::ipc::{
    CompositeScope, Message, MessageChannel, PollingError, PollingWatcher, names::query,
};
use crate::metrics::Metrics;
use crate::services::{
    CharacterLoad, Language, LoadOutcome, LoadSelection, LocaleProvider, MessageIndication,
    SaveSlotManager, SlotError,
};
use crate::sync::{InboundAction, RootSettingSync};
use camino::Utf8Path;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Default camera position polling interval while free-camera mode is on.
pub const DEFAULT_CAMERA_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default device layout polling interval, running for the whole session.
pub const DEFAULT_DEVICE_LAYOUT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

pub struct SettingsHost {
    root: RootSettingSync,
    slots: SaveSlotManager,
    channel: Arc<MessageChannel>,
    events: EventHub,
    bridge: ContextBridge,
    locale: Box<dyn LocaleProvider + Send>,
    camera_poll_interval: Duration,
    camera_watcher: Option<PollingWatcher>,
    device_layout_poll_interval: Duration,
    device_layout_watcher: Option<PollingWatcher>,
    metrics: Arc<Metrics>,
}

impl SettingsHost {
    /// Build the host and the task queue [`run`](Self::run) drains.
    ///
    /// `root` must send through a composite wrapping `channel`.
    pub fn new(
        root: RootSettingSync,
        slots: SaveSlotManager,
        channel: Arc<MessageChannel>,
        events: EventHub,
        locale: Box<dyn LocaleProvider + Send>,
    ) -> (Self, mpsc::Receiver<ContextTask>) {
        let metrics = channel.metrics().clone();
        let (bridge, tasks_rx) = ContextBridge::channel(metrics.clone());
        let host = Self {
            root,
            slots,
            channel,
            events,
            bridge,
            locale,
            camera_poll_interval: DEFAULT_CAMERA_POLL_INTERVAL,
            camera_watcher: None,
            device_layout_poll_interval: DEFAULT_DEVICE_LAYOUT_POLL_INTERVAL,
            device_layout_watcher: None,
            metrics,
        };
        (host, tasks_rx)
    }

    pub fn with_camera_poll_interval(mut self, interval: Duration) -> Self {
        self.camera_poll_interval = interval;
        self
    }

    pub fn with_device_layout_poll_interval(mut self, interval: Duration) -> Self {
        self.device_layout_poll_interval = interval;
        self
    }

    pub fn root(&self) -> &RootSettingSync {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut RootSettingSync {
        &mut self.root
    }

    pub fn slots(&self) -> &SaveSlotManager {
        &self.slots
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn bridge(&self) -> &ContextBridge {
        &self.bridge
    }

    /// Current UI language, for building indications.
    pub fn language(&self) -> Language {
        Language::from_name(self.root.language_name.get())
    }

    /// Startup sequence: apply the auto-save, settle the language, start
    /// device layout polling, reopen the last character.
    ///
    /// The auto-save is applied as one transaction so the renderer sees the
    /// restored state in a single batch.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn startup(&mut self) -> CharacterLoad {
        let sender = self.root.sender().clone();
        {
            let _scope = CompositeScope::open(sender.as_ref());
            match self.slots.load_auto_save(&mut self.root) {
                Ok(true) => tracing::info!("Restored settings from auto-save"),
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("Failed to load auto-save: {}", e);
                    self.publish_failure(e.load_indication(self.language()));
                }
            }
        }

        self.root.initialize_language_if_needed(self.locale.as_ref());
        if let Err(e) = self.start_device_layout_polling() {
            tracing::warn!("Device layout polling not started: {}", e);
        }
        self.slots.auto_load_last_character(&mut self.root)
    }

    /// Keep the stored device layout in step with the renderer.
    ///
    /// Answers are applied silently on the settings context.
    pub fn start_device_layout_polling(&mut self) -> Result<(), PollingError> {
        if self.is_polling_device_layout() {
            return Ok(());
        }

        let mut watcher = PollingWatcher::new(
            self.channel.clone(),
            Message::command_only(query::CURRENT_DEVICE_LAYOUT),
        );
        let sink = self.bridge.sink(|host, layout| {
            host.root.layout.device_layout.apply_remote(layout);
        });
        watcher.start(self.device_layout_poll_interval, sink)?;
        self.device_layout_watcher = Some(watcher);
        Ok(())
    }

    pub fn is_polling_device_layout(&self) -> bool {
        self.device_layout_watcher
            .as_ref()
            .is_some_and(PollingWatcher::is_running)
    }

    /// Toggle free-camera mode and its camera position polling.
    pub fn set_free_camera_mode(&mut self, enabled: bool) -> Result<(), PollingError> {
        self.root.layout.enable_free_camera_mode.apply_local(enabled);

        if !enabled {
            if let Some(mut watcher) = self.camera_watcher.take() {
                watcher.stop();
            }
            return Ok(());
        }

        if self.camera_watcher.as_ref().is_some_and(PollingWatcher::is_running) {
            return Ok(());
        }

        let mut watcher = PollingWatcher::new(
            self.channel.clone(),
            Message::command_only(query::CURRENT_CAMERA_POSITION),
        );
        let sink = self.bridge.sink(|host, position| {
            if *host.root.layout.enable_free_camera_mode.get() {
                host.root.layout.camera_position.apply_remote(position);
            }
        });
        watcher.start(self.camera_poll_interval, sink)?;
        self.camera_watcher = Some(watcher);
        Ok(())
    }

    pub fn is_polling_camera(&self) -> bool {
        self.camera_watcher.as_ref().is_some_and(PollingWatcher::is_running)
    }

    /// Ask once for the current device layout, without waiting for the next
    /// poll, and store it silently.
    pub fn request_device_layout(&self) {
        let channel = self.channel.clone();
        let bridge = self.bridge.clone();
        tokio::spawn(async move {
            match channel
                .query(&Message::command_only(query::CURRENT_DEVICE_LAYOUT))
                .await
            {
                Ok(layout) => bridge.post(move |host| {
                    host.root.layout.device_layout.apply_remote(layout);
                }),
                Err(e) => tracing::warn!("Device layout query failed: {}", e),
            }
        });
    }

    /// Query microphone, camera and custom motion clip names. Each answer is
    /// published as [`SettingsEvent::NameListReceived`].
    pub fn request_name_lists(&self) {
        let lists = [
            (NameListKind::Microphone, query::MICROPHONE_DEVICE_NAMES),
            (NameListKind::Camera, query::CAMERA_DEVICE_NAMES),
            (
                NameListKind::CustomMotionClip,
                query::GET_AVAILABLE_CUSTOM_MOTION_CLIP_NAMES,
            ),
        ];

        let channel = self.channel.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            for (kind, command) in lists {
                match channel.query(&Message::command_only(command)).await {
                    Ok(raw) => events.publish(SettingsEvent::NameListReceived {
                        kind,
                        names: split_name_list(&raw),
                    }),
                    Err(e) => tracing::warn!("{} query failed: {}", command, e),
                }
            }
        });
    }

    pub fn save_slot(&mut self, index: usize) -> bool {
        match self.slots.save(&self.root, index) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to save slot {}: {}", index, e);
                self.publish_failure(e.save_indication(self.language()));
                false
            }
        }
    }

    /// Load a slot on the user's request.
    pub fn load_slot(&mut self, index: usize, selection: LoadSelection) -> Option<LoadOutcome> {
        match self.slots.load(&mut self.root, index, selection, false) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!("Failed to load slot {}: {}", index, e);
                self.publish_failure(e.load_indication(self.language()));
                None
            }
        }
    }

    pub fn export_settings(&mut self, path: &Utf8Path) -> bool {
        let result = self.slots.export_to(&self.root, path);
        self.report(result, |e, lang| e.save_indication(lang))
    }

    pub fn import_settings(&mut self, path: &Utf8Path) -> bool {
        let result = self.slots.import_from(&mut self.root, path);
        self.report(result, |e, lang| e.load_indication(lang))
    }

    pub fn reset_to_default(&mut self) {
        self.root.reset_to_default();
        self.events.publish(SettingsEvent::SettingsReset);
    }

    /// Route one inbound renderer command.
    pub fn process_inbound(&mut self, message: &Message) {
        match self.root.handle_inbound(message) {
            InboundAction::Applied => {}
            InboundAction::Notify(event) => self.events.publish(event),
            InboundAction::Ignored => self.metrics.record_inbound_ignored(),
        }
    }

    /// Drive the context until `shutdown` resolves or the inbound stream ends,
    /// then run [`shutdown`](Self::shutdown).
    pub async fn run<S>(
        mut self,
        mut inbound_rx: mpsc::UnboundedReceiver<Message>,
        mut tasks_rx: mpsc::Receiver<ContextTask>,
        shutdown: S,
    ) where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::debug!("Settings context started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                inbound = inbound_rx.recv() => match inbound {
                    Some(message) => self.process_inbound(&message),
                    None => {
                        tracing::info!("Inbound stream closed");
                        break;
                    }
                },
                Some(task) = tasks_rx.recv() => task(&mut self),
            }
        }

        self.shutdown();
    }

    /// Stop polling, write the auto-save and abandon pending queries.
    pub fn shutdown(&mut self) {
        for mut watcher in [self.camera_watcher.take(), self.device_layout_watcher.take()]
            .into_iter()
            .flatten()
        {
            watcher.stop();
        }

        match self.slots.save_auto_save(&self.root) {
            Ok(()) => tracing::info!("Auto-save written to {}", self.slots.slot_path(0)),
            Err(e) => tracing::error!("Failed to write auto-save: {}", e),
        }

        self.channel.cancel_pending();
        tracing::debug!("Settings context stopped");
    }

    fn report<F>(&self, result: Result<(), SlotError>, indication: F) -> bool
    where
        F: FnOnce(&SlotError, Language) -> MessageIndication,
    {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Setting file operation failed: {}", e);
                self.publish_failure(indication(&e, self.language()));
                false
            }
        }
    }

    fn publish_failure(&self, indication: MessageIndication) {
        self.events.publish(SettingsEvent::OperationFailed(indication));
    }
}

/// Renderer name lists are tab separated; empty entries are dropped.
fn split_name_list(raw: &str) -> Vec<String> {
    raw.split('\t')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
