//! Integration tests for SettingsHost
//!
//! These tests verify:
//! - Startup replays the auto-save as one batch and reopens the character
//! - The run loop serializes renderer commands and posted tasks
//! - Shutdown persists the auto-save

mod common;

use avatar_config_sync::ipc::names::{receive, send};
use avatar_config_sync::services::{CharacterLoad, FixedLocale, LoadSelection};
use avatar_config_sync::{EventHub, Message, SaveSlotManager, SettingsEvent, SettingsHost};
use common::{character_file, stack, utf8, Stack};
use tempfile::TempDir;
use tokio::sync::mpsc;

fn host(stack: &Stack, dir: &TempDir, locale: &str) -> (SettingsHost, mpsc::Receiver<avatar_config_sync::host::ContextTask>) {
    let events = EventHub::new();
    let slots = SaveSlotManager::new(utf8(dir).join("slots"), events.clone());
    SettingsHost::new(
        stack.root(),
        slots,
        stack.channel.clone(),
        events,
        Box::new(FixedLocale::new(locale)),
    )
}

#[tokio::test]
async fn test_startup_restores_session() {
    let dir = TempDir::new().unwrap();
    let character = character_file(&dir, "avatar.vrm");

    // Previous session
    {
        let stack = stack();
        let (mut host, _tasks) = host(&stack, &dir, "en_US.UTF-8");
        host.root_mut().on_local_model_loaded(character.clone());
        host.root_mut().auto_load_last_loaded_vrm.apply_local(true);
        host.root_mut().set_language("Japanese");
        host.root_mut().light.light_intensity.apply_local(70);
        host.shutdown();
    }

    let stack = stack();
    let (mut host, _tasks) = host(&stack, &dir, "en_US.UTF-8");

    let opened = host.startup();

    assert_eq!(opened, CharacterLoad::LocalFileOpened(character.clone().into()));
    let raw = stack.transport.messages();
    assert_eq!(raw.len(), 3);
    assert_eq!(raw[0].command, send::COMMAND_ARRAY);
    assert_eq!(raw[1], Message::new(send::OPEN_VRM, character.clone()));
    assert_eq!(raw[2], Message::command_only(send::REQUEST_AUTO_ADJUST_EYEBROW));

    let flattened = stack.transport.flattened();
    assert!(flattened.contains(&Message::new(send::LANGUAGE, "Japanese")));
    assert!(flattened.contains(&Message::new(send::LIGHT_INTENSITY, "70")));
    assert_eq!(host.root().last_loaded_character_file_path(), character);
}

#[tokio::test]
async fn test_run_loop_handles_commands_and_tasks() {
    let dir = TempDir::new().unwrap();
    let stack = stack();
    let (mut host, tasks_rx) = host(&stack, &dir, "ja-JP");
    host.startup();

    let bridge = host.bridge().clone();
    let mut events = host.events().subscribe();
    let auto_save = host.slots().slot_path(0);
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    let running = tokio::spawn(host.run(inbound_rx, tasks_rx, std::future::pending()));

    bridge.post(|host| {
        host.root_mut().window.top_most.apply_local(false);
        host.save_slot(1);
    });
    assert_eq!(events.recv().await.unwrap(), SettingsEvent::SettingsSaved { slot: 1 });

    bridge.post(|host| {
        host.load_slot(1, LoadSelection::ALL);
    });
    assert_eq!(events.recv().await.unwrap(), SettingsEvent::SettingsLoaded { slot: 1 });

    inbound_tx
        .send(Message::command_only(receive::CLOSE_CONFIG_WINDOW))
        .unwrap();
    assert_eq!(events.recv().await.unwrap(), SettingsEvent::CloseConfigWindowRequested);

    // Closing the inbound stream ends the loop and writes the auto-save
    drop(inbound_tx);
    running.await.unwrap();
    assert!(auto_save.is_file());
    assert_eq!(stack.transport.count(send::TOP_MOST), 1);
}

#[tokio::test]
async fn test_inbound_values_are_not_echoed() {
    let dir = TempDir::new().unwrap();
    let stack = stack();
    let (mut host, _tasks) = host(&stack, &dir, "en-US");
    host.startup();
    stack.transport.clear();

    host.process_inbound(&Message::new(receive::SET_CALIBRATION_FACE_DATA, "{\"pitch\":1}"));
    host.process_inbound(&Message::new(receive::EX_TRACKER_CALIBRATE_COMPLETE, "{\"x\":2}"));
    host.process_inbound(&Message::new(receive::EXTRA_BLEND_SHAPE_CLIP_NAMES, "Joy,Sorrow"));

    assert!(stack.transport.raw().is_empty());
    assert_eq!(host.root().motion.calibrate_face_data.get(), "{\"pitch\":1}");
    assert_eq!(host.root().external_tracker.calibration_data.get(), "{\"x\":2}");
    assert!(host.root().word_to_motion.extra_blend_shape_clip_names().contains("Sorrow"));
}

#[tokio::test]
async fn test_remote_load_completion_replaces_local_identity() {
    let dir = TempDir::new().unwrap();
    let stack = stack();
    let (mut host, _tasks) = host(&stack, &dir, "en-US");

    host.root_mut().on_local_model_loaded("/models/a.vrm");
    host.process_inbound(&Message::new(receive::VROID_MODEL_LOAD_COMPLETED, "hub-3"));

    assert_eq!(host.root().last_loaded_character_file_path(), "");
    assert_eq!(host.root().last_loaded_character_remote_id(), "hub-3");
    assert_eq!(
        stack.transport.messages(),
        vec![Message::command_only(send::REQUEST_AUTO_ADJUST_EYEBROW)]
    );
}
