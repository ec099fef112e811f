// avatar-config-sync - Settings synchronization between an avatar configurator
// and its renderer process
//
// This is the library crate containing the sync tree, IPC layer and setting
// file persistence. The binary crate (main.rs) hosts it headlessly.

pub mod config;
pub mod events;
pub mod host;
pub mod ipc;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod sync;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use events::{EventHub, NameListKind, SettingsEvent};
pub use host::{ContextBridge, SettingsHost};
pub use ipc::{CommandComposite, Message, MessageChannel, MessageSender};
pub use metrics::Metrics;
pub use models::SettingFile;
pub use services::{LoadSelection, SaveSlotManager};
pub use sync::RootSettingSync;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
