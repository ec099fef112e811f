//! Serializable setting data.
//!
//! - [`SettingFile`]: one setting file (slot, auto-save or export) with its
//!   gated root fields and a block per category
//! - [`settings`]: per-category blocks ([`WindowSetting`], [`MotionSetting`], ...)
//!   and the small value types they use
//!
//! # Architecture Note
//!
//! These are plain data. The live, syncing tree is
//! [`RootSettingSync`](crate::sync::RootSettingSync); it exports to and imports
//! from these blocks through each category's `save` / `load`.

pub mod setting_file;
pub mod settings;

pub use setting_file::{CURRENT_VERSION, SettingFile};
pub use settings::{
    AutoAdjustParameters, ExternalTrackerSetting, ExternalTrackerSource, GamepadLeanMode,
    GamepadSetting, LayoutSetting, LightSetting, MotionSetting, Rgb, WindowSetting,
    WordToMotionDevice, WordToMotionSetting,
};
