use crate::ipc::{MessageSender, names::send};
use crate::models::{GamepadLeanMode, GamepadSetting};
use crate::sync::{SettingCategorySync, SyncedField};
use std::sync::Arc;

pub struct GamepadSettingSync {
    pub gamepad_enabled: SyncedField<bool>,
    pub prefer_direct_input_gamepad: SyncedField<bool>,
    pub gamepad_lean_mode: SyncedField<GamepadLeanMode>,
    pub gamepad_lean_reverse_horizontal: SyncedField<bool>,
    pub gamepad_lean_reverse_vertical: SyncedField<bool>,
}

impl GamepadSettingSync {
    pub fn new(sender: &Arc<dyn MessageSender>) -> Self {
        let d = GamepadSetting::default();
        Self {
            gamepad_enabled: SyncedField::new(sender, send::ENABLE_GAMEPAD, d.gamepad_enabled),
            prefer_direct_input_gamepad: SyncedField::new(
                sender,
                send::PREFER_DIRECT_INPUT_GAMEPAD,
                d.prefer_direct_input_gamepad,
            ),
            gamepad_lean_mode: SyncedField::new(sender, send::GAMEPAD_LEAN_MODE, d.gamepad_lean_mode),
            gamepad_lean_reverse_horizontal: SyncedField::new(
                sender,
                send::GAMEPAD_LEAN_REVERSE_HORIZONTAL,
                d.gamepad_lean_reverse_horizontal,
            ),
            gamepad_lean_reverse_vertical: SyncedField::new(
                sender,
                send::GAMEPAD_LEAN_REVERSE_VERTICAL,
                d.gamepad_lean_reverse_vertical,
            ),
        }
    }
}

impl SettingCategorySync for GamepadSettingSync {
    type Data = GamepadSetting;
    const NAME: &'static str = "gamepad";

    fn save(&self) -> GamepadSetting {
        GamepadSetting {
            gamepad_enabled: self.gamepad_enabled.value(),
            prefer_direct_input_gamepad: self.prefer_direct_input_gamepad.value(),
            gamepad_lean_mode: self.gamepad_lean_mode.value(),
            gamepad_lean_reverse_horizontal: self.gamepad_lean_reverse_horizontal.value(),
            gamepad_lean_reverse_vertical: self.gamepad_lean_reverse_vertical.value(),
        }
    }

    fn load(&mut self, data: &GamepadSetting) {
        self.gamepad_enabled.apply_local(data.gamepad_enabled);
        self.prefer_direct_input_gamepad
            .apply_local(data.prefer_direct_input_gamepad);
        self.gamepad_lean_mode.apply_local(data.gamepad_lean_mode);
        self.gamepad_lean_reverse_horizontal
            .apply_local(data.gamepad_lean_reverse_horizontal);
        self.gamepad_lean_reverse_vertical
            .apply_local(data.gamepad_lean_reverse_vertical);
    }

    fn reset_to_default(&mut self) {
        self.load(&GamepadSetting::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::Message;
    use crate::ipc::test_support::RecordingSender;

    #[test]
    fn test_lean_mode_sent_as_code() {
        let recorder = Arc::new(RecordingSender::new());
        let sender: Arc<dyn MessageSender> = recorder.clone();
        let mut gamepad = GamepadSettingSync::new(&sender);

        gamepad.gamepad_lean_mode.apply_local(GamepadLeanMode::RightStick);
        assert_eq!(
            recorder.delivered(),
            vec![Message::new(send::GAMEPAD_LEAN_MODE, "2")]
        );
    }
}
