//! Live, synchronized configuration tree.
//!
//! Each category owns a set of [`SyncedField`]s. Changes made on this side go
//! through `apply_local` and reach the renderer as one message each (batched
//! when a composite is open); values reported by the renderer go through
//! `apply_remote` and are never echoed.
//!
//! [`RootSettingSync`] aggregates the categories and owns character identity
//! and language.

pub mod external_tracker;
pub mod field;
pub mod gamepad;
pub mod layout;
pub mod light;
pub mod motion;
pub mod root;
pub mod window;
pub mod word_to_motion;

pub use external_tracker::ExternalTrackerSettingSync;
pub use field::{SyncedField, WireValue};
pub use gamepad::GamepadSettingSync;
pub use layout::LayoutSettingSync;
pub use light::LightSettingSync;
pub use motion::MotionSettingSync;
pub use root::{AVAILABLE_LANGUAGES, CharacterIdentity, InboundAction, RootSettingSync};
pub use window::WindowSettingSync;
pub use word_to_motion::WordToMotionSettingSync;

use crate::ipc::Message;

/// Common surface of every setting category.
pub trait SettingCategorySync {
    /// Serialized block for this category.
    type Data;

    /// Stable name used in logs.
    const NAME: &'static str;

    /// Export the persisted fields.
    fn save(&self) -> Self::Data;

    /// Import persisted fields through the emitting path.
    fn load(&mut self, data: &Self::Data);

    fn reset_to_default(&mut self);

    /// Apply an inbound renderer command. Returns whether it was consumed.
    fn handle_inbound(&mut self, _message: &Message) -> bool {
        false
    }
}
