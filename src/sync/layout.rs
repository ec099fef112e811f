use crate::ipc::{Message, MessageSender, names::send};
use crate::models::LayoutSetting;
use crate::sync::{SettingCategorySync, SyncedField};
use std::sync::Arc;

/// Number of quick-save view point slots.
pub const VIEW_POINT_COUNT: usize = 3;

/// Layout category.
///
/// `camera_position` and `device_layout` are mostly written back from
/// renderer queries (free camera polling, layout capture) with `apply_remote`.
/// Quick-save view points are stored locally and only sent when loaded.
pub struct LayoutSettingSync {
    sender: Arc<dyn MessageSender>,

    pub camera_fov: SyncedField<i32>,
    pub enable_mid_hold: SyncedField<bool>,
    pub hid_visibility: SyncedField<bool>,
    pub pen_visibility: SyncedField<bool>,
    pub midi_controller_visibility: SyncedField<bool>,
    pub selected_typing_effect_id: SyncedField<i32>,
    pub hide_unused_devices: SyncedField<bool>,

    pub camera_position: SyncedField<String>,
    pub device_layout: SyncedField<String>,
    quick_save_view_points: [SyncedField<String>; VIEW_POINT_COUNT],

    /// Runtime only; while on, the host polls the camera position.
    pub enable_free_camera_mode: SyncedField<bool>,
}

impl LayoutSettingSync {
    pub fn new(sender: &Arc<dyn MessageSender>) -> Self {
        let d = LayoutSetting::default();
        Self {
            sender: sender.clone(),

            camera_fov: SyncedField::new(sender, send::CAMERA_FOV, d.camera_fov),
            enable_mid_hold: SyncedField::new(sender, send::ENABLE_MID_HOLD, d.enable_mid_hold),
            hid_visibility: SyncedField::new(sender, send::HID_VISIBILITY, d.hid_visibility),
            pen_visibility: SyncedField::new(sender, send::PEN_VISIBILITY, d.pen_visibility),
            midi_controller_visibility: SyncedField::new(
                sender,
                send::MIDI_CONTROLLER_VISIBILITY,
                d.midi_controller_visibility,
            ),
            selected_typing_effect_id: SyncedField::new(
                sender,
                send::SET_KEYBOARD_TYPING_EFFECT_TYPE,
                d.selected_typing_effect_id,
            ),
            hide_unused_devices: SyncedField::new(sender, send::HIDE_UNUSED_DEVICES, d.hide_unused_devices),

            camera_position: SyncedField::new(sender, send::SET_CUSTOM_CAMERA_POSITION, d.camera_position),
            device_layout: SyncedField::new(sender, send::SET_DEVICE_LAYOUT, d.device_layout),
            quick_save_view_points: [
                SyncedField::local(d.quick_save_view_point_1),
                SyncedField::local(d.quick_save_view_point_2),
                SyncedField::local(d.quick_save_view_point_3),
            ],

            enable_free_camera_mode: SyncedField::new(sender, send::ENABLE_FREE_CAMERA_MODE, false),
        }
    }

    /// Stored view point for `index` in `1..=VIEW_POINT_COUNT`.
    pub fn view_point(&self, index: usize) -> Option<&str> {
        let slot = index.checked_sub(1)?;
        self.quick_save_view_points.get(slot).map(|f| f.get().as_str())
    }

    /// Store a camera position captured from the renderer.
    pub fn store_view_point(&mut self, index: usize, position: String) -> bool {
        match index
            .checked_sub(1)
            .and_then(|slot| self.quick_save_view_points.get_mut(slot))
        {
            Some(field) => {
                field.apply_remote(position);
                true
            }
            None => {
                tracing::warn!("Ignoring view point for invalid slot {}", index);
                false
            }
        }
    }

    /// Ask the renderer to move the camera to a stored view point.
    ///
    /// Returns false for an invalid or empty slot.
    pub fn quick_load_view_point(&self, index: usize) -> bool {
        match self.view_point(index) {
            Some(position) if !position.is_empty() => {
                self.sender
                    .send_message(Message::new(send::QUICK_LOAD_VIEW_POINT, position));
                true
            }
            _ => false,
        }
    }
}

impl SettingCategorySync for LayoutSettingSync {
    type Data = LayoutSetting;
    const NAME: &'static str = "layout";

    /// The gamepad block is filled in by the file codec.
    fn save(&self) -> LayoutSetting {
        let [vp1, vp2, vp3] = &self.quick_save_view_points;
        LayoutSetting {
            camera_fov: self.camera_fov.value(),
            enable_mid_hold: self.enable_mid_hold.value(),
            hid_visibility: self.hid_visibility.value(),
            pen_visibility: self.pen_visibility.value(),
            midi_controller_visibility: self.midi_controller_visibility.value(),
            selected_typing_effect_id: self.selected_typing_effect_id.value(),
            hide_unused_devices: self.hide_unused_devices.value(),
            camera_position: self.camera_position.value(),
            device_layout: self.device_layout.value(),
            quick_save_view_point_1: vp1.value(),
            quick_save_view_point_2: vp2.value(),
            quick_save_view_point_3: vp3.value(),
            gamepad: None,
        }
    }

    fn load(&mut self, data: &LayoutSetting) {
        self.camera_fov.apply_local(data.camera_fov);
        self.enable_mid_hold.apply_local(data.enable_mid_hold);
        self.hid_visibility.apply_local(data.hid_visibility);
        self.pen_visibility.apply_local(data.pen_visibility);
        self.midi_controller_visibility
            .apply_local(data.midi_controller_visibility);
        self.selected_typing_effect_id
            .apply_local(data.selected_typing_effect_id);
        self.hide_unused_devices.apply_local(data.hide_unused_devices);

        self.camera_position.apply_local(data.camera_position.clone());
        self.device_layout.apply_local(data.device_layout.clone());

        let [vp1, vp2, vp3] = &mut self.quick_save_view_points;
        vp1.apply_local(data.quick_save_view_point_1.clone());
        vp2.apply_local(data.quick_save_view_point_2.clone());
        vp3.apply_local(data.quick_save_view_point_3.clone());
    }

    fn reset_to_default(&mut self) {
        self.load(&LayoutSetting::default());
    }
}
