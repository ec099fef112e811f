use crate::ipc::{Message, MessageSender};
use crate::models::{ExternalTrackerSource, GamepadLeanMode, Rgb, WordToMotionDevice};
use std::fmt;
use std::sync::Arc;

/// Text form of a field value inside a message's content.
pub trait WireValue {
    fn to_wire(&self) -> String;
}

impl WireValue for bool {
    fn to_wire(&self) -> String {
        if *self { "True" } else { "False" }.to_string()
    }
}

impl WireValue for i32 {
    fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl WireValue for String {
    fn to_wire(&self) -> String {
        self.clone()
    }
}

impl WireValue for Rgb {
    fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl WireValue for GamepadLeanMode {
    fn to_wire(&self) -> String {
        self.code().to_string()
    }
}

impl WireValue for WordToMotionDevice {
    fn to_wire(&self) -> String {
        self.code().to_string()
    }
}

impl WireValue for ExternalTrackerSource {
    fn to_wire(&self) -> String {
        self.code().to_string()
    }
}

struct Emitter {
    sender: Arc<dyn MessageSender>,
    command: &'static str,
}

/// One synchronized setting value.
///
/// `apply_local` is the path for changes made on this side: it emits exactly
/// one message when the value actually changes. `apply_remote` is for values
/// that came from the renderer and must never be echoed back.
///
/// A field built with [`SyncedField::local`] has no wire command and never
/// emits.
pub struct SyncedField<T> {
    value: T,
    default: T,
    emitter: Option<Emitter>,
}

impl<T> SyncedField<T>
where
    T: Clone + PartialEq + WireValue,
{
    pub fn new(sender: &Arc<dyn MessageSender>, command: &'static str, default: T) -> Self {
        Self {
            value: default.clone(),
            default,
            emitter: Some(Emitter {
                sender: sender.clone(),
                command,
            }),
        }
    }

    /// Field that is only kept locally and persisted.
    pub fn local(default: T) -> Self {
        Self {
            value: default.clone(),
            default,
            emitter: None,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn value(&self) -> T {
        self.value.clone()
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn is_default(&self) -> bool {
        self.value == self.default
    }

    pub fn command(&self) -> Option<&'static str> {
        self.emitter.as_ref().map(|e| e.command)
    }

    /// Set from this side. Returns whether the value changed.
    pub fn apply_local(&mut self, value: impl Into<T>) -> bool {
        let value = value.into();
        if value == self.value {
            return false;
        }

        self.value = value;
        if let Some(emitter) = &self.emitter {
            emitter
                .sender
                .send_message(Message::new(emitter.command, self.value.to_wire()));
        }
        true
    }

    /// Set from a renderer report. Never emits.
    pub fn apply_remote(&mut self, value: impl Into<T>) {
        self.value = value.into();
    }

    pub fn reset_to_default(&mut self) -> bool {
        let default = self.default.clone();
        self.apply_local(default)
    }
}

impl<T: fmt::Debug> fmt::Debug for SyncedField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncedField")
            .field("value", &self.value)
            .field("command", &self.emitter.as_ref().map(|e| e.command))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::test_support::RecordingSender;

    fn sender() -> (Arc<RecordingSender>, Arc<dyn MessageSender>) {
        let recorder = Arc::new(RecordingSender::new());
        let sender: Arc<dyn MessageSender> = recorder.clone();
        (recorder, sender)
    }

    #[test]
    fn test_bool_wire_form() {
        assert_eq!(true.to_wire(), "True");
        assert_eq!(false.to_wire(), "False");
    }

    #[test]
    fn test_apply_local_emits_once_per_change() {
        let (recorder, sender) = sender();
        let mut field = SyncedField::new(&sender, "TopMost", true);

        assert!(!field.apply_local(true));
        assert!(recorder.delivered().is_empty());

        assert!(field.apply_local(false));
        assert!(!field.apply_local(false));
        assert_eq!(recorder.delivered(), vec![Message::new("TopMost", "False")]);
    }

    #[test]
    fn test_apply_remote_is_silent() {
        let (recorder, sender) = sender();
        let mut field = SyncedField::new(&sender, "SetCalibrationFaceData", String::new());

        field.apply_remote("calibrated");
        assert_eq!(field.get(), "calibrated");
        assert!(recorder.delivered().is_empty());

        // Setting the same value locally afterwards is not a change either
        assert!(!field.apply_local("calibrated"));
        assert!(recorder.delivered().is_empty());
    }

    #[test]
    fn test_local_field_never_emits() {
        let mut field = SyncedField::local(false);
        assert!(field.apply_local(true));
        assert!(field.command().is_none());
        assert!(field.reset_to_default());
        assert!(field.is_default());
    }

    #[test]
    fn test_reset_sends_default_only_when_different() {
        let (recorder, sender) = sender();
        let mut field = SyncedField::new(&sender, "LightColor", Rgb::new(255, 255, 255));

        assert!(!field.reset_to_default());
        field.apply_local(Rgb::new(10, 20, 30));
        field.reset_to_default();

        assert_eq!(
            recorder.delivered(),
            vec![
                Message::new("LightColor", "10,20,30"),
                Message::new("LightColor", "255,255,255"),
            ]
        );
    }
}
