//! avatar-config-sync - headless settings host for the avatar renderer
//!
//! # Overview
//!
//! Runs the settings context without a UI. It initializes:
//! - Configuration ([`AppConfig`]: optional YAML file + `AVATAR_SYNC__*` env)
//! - Logging infrastructure (file rotation + console output)
//! - Tokio async runtime
//! - UDP transport, message channel and command composite
//! - The settings host ([`SettingsHost`]) driving the sync tree
//!
//! # Execution Flow
//!
//! 1. Load configuration (path from the first argument, if any)
//! 2. Initialize logging → `<logging.dir>/<logging.prefix>.<date>`
//! 3. Bind the UDP transport and spawn the receive loop
//! 4. Apply the auto-save, settle the language, reopen the last character
//! 5. Run the settings context until Ctrl+C
//! 6. Write the auto-save and log the IPC metrics summary

use anyhow::{Context, Result};
use avatar_config_sync::events::SettingsEvent;
use avatar_config_sync::ipc::{UdpTransport, spawn_receiver};
use avatar_config_sync::services::EnvLocale;
use avatar_config_sync::{
    APP_NAME, AppConfig, CommandComposite, EventHub, MessageChannel, MessageSender, Metrics,
    RootSettingSync, SaveSlotManager, SettingsHost, VERSION,
};
use std::sync::Arc;
use tokio::sync::mpsc;

fn main() -> Result<()> {
    let config = AppConfig::from_args()?;
    let _log_guard = avatar_config_sync::logging::init_logging(&config.logging)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("avatar-sync-worker")
        .build()?;

    runtime.block_on(run(config))?;

    // Bounded wait for tasks still winding down
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));
    tracing::info!("Application shutdown complete");
    Ok(())
}

async fn run(config: AppConfig) -> Result<()> {
    let metrics = Arc::new(Metrics::new());

    let transport = UdpTransport::bind(config.ipc.listen_addr, config.ipc.renderer_addr)
        .await
        .with_context(|| format!("Failed to bind UDP transport on {}", config.ipc.listen_addr))?;
    let socket = transport.socket();

    let mut channel = MessageChannel::new(Arc::new(transport), metrics.clone());
    if let Some(timeout) = config.ipc.query_timeout() {
        channel = channel.with_query_timeout(timeout);
    }
    let channel = Arc::new(channel);

    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let receiver = spawn_receiver(socket, channel.clone(), inbound_tx);

    let sender: Arc<dyn MessageSender> = Arc::new(CommandComposite::new(channel.clone()));
    let root = RootSettingSync::new(sender);
    let events = EventHub::new();
    let slots = SaveSlotManager::new(config.storage.save_dir.clone(), events.clone());

    let event_logger = tokio::spawn(log_events(events.clone()));

    let (host, tasks_rx) = SettingsHost::new(root, slots, channel, events, Box::new(EnvLocale));
    let mut host = host
        .with_camera_poll_interval(config.polling.camera_interval())
        .with_device_layout_poll_interval(config.polling.device_layout_interval());

    let character = host.startup();
    tracing::info!("Startup complete, character: {:?}", character);
    host.request_device_layout();
    host.request_name_lists();

    host.run(inbound_rx, tasks_rx, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        tracing::info!("Shutdown requested");
    })
    .await;

    receiver.abort();
    event_logger.abort();
    metrics.log_summary();
    Ok(())
}

/// Without a UI, settings events are only logged.
async fn log_events(events: EventHub) {
    let mut rx = events.subscribe();
    loop {
        match rx.recv().await {
            Ok(SettingsEvent::OperationFailed(indication)) => {
                tracing::warn!("{}: {}", indication.title, indication.content);
            }
            Ok(SettingsEvent::RemoteCharacterLoadRequested { model_id }) => {
                tracing::info!("Remote character {} needs confirmation in the UI", model_id);
            }
            Ok(event) => tracing::debug!("Event: {:?}", event),
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Event logger lagged, skipped {} events", skipped);
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}
