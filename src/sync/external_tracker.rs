use crate::ipc::{Message, MessageSender, names::receive, names::send};
use crate::models::{ExternalTrackerSetting, ExternalTrackerSource};
use crate::sync::{SettingCategorySync, SyncedField};
use std::sync::Arc;

pub struct ExternalTrackerSettingSync {
    sender: Arc<dyn MessageSender>,

    pub enable_external_tracking: SyncedField<bool>,
    pub enable_lip_sync: SyncedField<bool>,
    pub enable_emphasize_expression: SyncedField<bool>,
    pub enable_perfect_sync: SyncedField<bool>,
    pub tracker_source: SyncedField<ExternalTrackerSource>,
    pub app_specific_settings: SyncedField<String>,
    pub calibration_data: SyncedField<String>,
    pub face_switch_setting: SyncedField<String>,
}

impl ExternalTrackerSettingSync {
    pub fn new(sender: &Arc<dyn MessageSender>) -> Self {
        let d = ExternalTrackerSetting::default();
        Self {
            sender: sender.clone(),
            enable_external_tracking: SyncedField::new(sender, send::EX_TRACKER_ENABLE, d.enable_external_tracking),
            enable_lip_sync: SyncedField::new(sender, send::EX_TRACKER_ENABLE_LIP_SYNC, d.enable_lip_sync),
            enable_emphasize_expression: SyncedField::new(
                sender,
                send::EX_TRACKER_ENABLE_EMPHASIZE_EXPRESSION,
                d.enable_emphasize_expression,
            ),
            enable_perfect_sync: SyncedField::new(
                sender,
                send::EX_TRACKER_ENABLE_PERFECT_SYNC,
                d.enable_perfect_sync,
            ),
            tracker_source: SyncedField::new(sender, send::EX_TRACKER_SET_SOURCE, d.tracker_source),
            app_specific_settings: SyncedField::new(
                sender,
                send::EX_TRACKER_SET_APPLICATION_VALUE,
                d.app_specific_settings,
            ),
            calibration_data: SyncedField::new(
                sender,
                send::EX_TRACKER_SET_CALIBRATE_DATA,
                d.calibration_data,
            ),
            face_switch_setting: SyncedField::new(
                sender,
                send::EX_TRACKER_SET_FACE_SWITCH_SETTING,
                d.face_switch_setting,
            ),
        }
    }

    /// Ask the renderer to calibrate; it answers with `ExTrackerCalibrateComplete`.
    pub fn calibrate(&self) {
        self.sender
            .send_message(Message::command_only(send::EX_TRACKER_CALIBRATE));
    }
}

impl SettingCategorySync for ExternalTrackerSettingSync {
    type Data = ExternalTrackerSetting;
    const NAME: &'static str = "externalTracker";

    fn save(&self) -> ExternalTrackerSetting {
        ExternalTrackerSetting {
            enable_external_tracking: self.enable_external_tracking.value(),
            enable_lip_sync: self.enable_lip_sync.value(),
            enable_emphasize_expression: self.enable_emphasize_expression.value(),
            enable_perfect_sync: self.enable_perfect_sync.value(),
            tracker_source: self.tracker_source.value(),
            app_specific_settings: self.app_specific_settings.value(),
            calibration_data: self.calibration_data.value(),
            face_switch_setting: self.face_switch_setting.value(),
        }
    }

    fn load(&mut self, data: &ExternalTrackerSetting) {
        self.enable_external_tracking
            .apply_local(data.enable_external_tracking);
        self.enable_lip_sync.apply_local(data.enable_lip_sync);
        self.enable_emphasize_expression
            .apply_local(data.enable_emphasize_expression);
        self.enable_perfect_sync.apply_local(data.enable_perfect_sync);
        self.tracker_source.apply_local(data.tracker_source);
        self.app_specific_settings
            .apply_local(data.app_specific_settings.clone());
        self.calibration_data.apply_local(data.calibration_data.clone());
        self.face_switch_setting
            .apply_local(data.face_switch_setting.clone());
    }

    fn reset_to_default(&mut self) {
        self.load(&ExternalTrackerSetting::default());
    }

    fn handle_inbound(&mut self, message: &Message) -> bool {
        if message.command == receive::EX_TRACKER_CALIBRATE_COMPLETE {
            self.calibration_data.apply_remote(message.content.clone());
            return true;
        }
        false
    }
}
