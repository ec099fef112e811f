use crate::ipc::{MessageSender, names::send};
use crate::models::{Rgb, WindowSetting};
use crate::sync::{SettingCategorySync, SyncedField};
use std::sync::Arc;

pub struct WindowSettingSync {
    pub background_color: SyncedField<Rgb>,
    pub is_transparent: SyncedField<bool>,
    pub window_draggable: SyncedField<bool>,
    pub top_most: SyncedField<bool>,
    pub background_image_path: SyncedField<String>,
    pub whole_window_transparency_level: SyncedField<i32>,
    pub alpha_value_on_transparent: SyncedField<i32>,
}

impl WindowSettingSync {
    pub fn new(sender: &Arc<dyn MessageSender>) -> Self {
        let d = WindowSetting::default();
        Self {
            background_color: SyncedField::new(sender, send::CHROMAKEY, d.background_color),
            is_transparent: SyncedField::new(sender, send::SET_TRANSPARENT, d.is_transparent),
            window_draggable: SyncedField::new(sender, send::WINDOW_DRAGGABLE, d.window_draggable),
            top_most: SyncedField::new(sender, send::TOP_MOST, d.top_most),
            background_image_path: SyncedField::new(
                sender,
                send::SET_BACKGROUND_IMAGE_PATH,
                d.background_image_path,
            ),
            whole_window_transparency_level: SyncedField::new(
                sender,
                send::SET_WHOLE_WINDOW_TRANSPARENCY_LEVEL,
                d.whole_window_transparency_level,
            ),
            alpha_value_on_transparent: SyncedField::new(
                sender,
                send::SET_ALPHA_VALUE_ON_TRANSPARENT,
                d.alpha_value_on_transparent,
            ),
        }
    }
}

impl SettingCategorySync for WindowSettingSync {
    type Data = WindowSetting;
    const NAME: &'static str = "window";

    fn save(&self) -> WindowSetting {
        WindowSetting {
            background_color: self.background_color.value(),
            is_transparent: self.is_transparent.value(),
            window_draggable: self.window_draggable.value(),
            top_most: self.top_most.value(),
            background_image_path: self.background_image_path.value(),
            whole_window_transparency_level: self.whole_window_transparency_level.value(),
            alpha_value_on_transparent: self.alpha_value_on_transparent.value(),
        }
    }

    fn load(&mut self, data: &WindowSetting) {
        self.background_color.apply_local(data.background_color);
        self.is_transparent.apply_local(data.is_transparent);
        self.window_draggable.apply_local(data.window_draggable);
        self.top_most.apply_local(data.top_most);
        self.background_image_path
            .apply_local(data.background_image_path.clone());
        self.whole_window_transparency_level
            .apply_local(data.whole_window_transparency_level);
        self.alpha_value_on_transparent
            .apply_local(data.alpha_value_on_transparent);
    }

    fn reset_to_default(&mut self) {
        self.background_color.reset_to_default();
        self.is_transparent.reset_to_default();
        self.window_draggable.reset_to_default();
        self.top_most.reset_to_default();
        self.background_image_path.reset_to_default();
        self.whole_window_transparency_level.reset_to_default();
        self.alpha_value_on_transparent.reset_to_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::Message;
    use crate::ipc::test_support::RecordingSender;

    #[test]
    fn test_load_emits_only_changed_fields() {
        let recorder = Arc::new(RecordingSender::new());
        let sender: Arc<dyn MessageSender> = recorder.clone();
        let mut window = WindowSettingSync::new(&sender);

        let mut data = WindowSetting::default();
        data.top_most = false;
        data.background_color = Rgb::new(0, 0, 255);
        window.load(&data);

        assert_eq!(
            recorder.delivered(),
            vec![
                Message::new("Chromakey", "0,0,255"),
                Message::new("TopMost", "False"),
            ]
        );
        assert_eq!(window.save(), data);
    }
}
