//! Services module - persistence and user-facing helpers around the settings tree.
//!
//! Nothing here talks to the transport directly. Field changes made while
//! applying a file go through the tree's [`MessageSender`](crate::ipc::MessageSender)
//! like any other change, so they are batched by the caller's transaction.
//!
//! # Components
//!
//! - [`SettingFileCodec`] / [`SettingFileIo`]: capture, encode, decode and
//!   apply versioned YAML setting files, with scope and privacy rules
//! - [`SaveSlotManager`]: numbered slots plus the auto-save, including the
//!   character reload policy after a slot is applied
//! - [`MessageIndication`]: localized title/content pairs for the UI
//! - [`LocaleProvider`]: OS locale lookup used once to pick a language

pub mod indication;
pub mod locale;
pub mod save_slots;
pub mod setting_file;

pub use indication::{Language, MessageIndication};
pub use locale::{EnvLocale, FixedLocale, LocaleProvider, language_for_locale};
pub use save_slots::{
    AUTO_SAVE_INDEX, CharacterLoad, FILE_COUNT, LoadOutcome, SaveSlotManager, SlotError,
    SlotOverview,
};
pub use setting_file::{
    DecodeError, LoadScope, LoadSelection, SaveFileMode, SettingFileCodec, SettingFileError,
    SettingFileIo,
};
