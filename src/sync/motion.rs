use crate::ipc::{Message, MessageSender, names::receive, names::send};
use crate::models::{AutoAdjustParameters, MotionSetting};
use crate::sync::{SettingCategorySync, SyncedField};
use std::sync::Arc;

/// Motion category: face, mouth, eyebrow, hand and wait motion.
///
/// Besides the persisted fields it tracks two runtime values that are never
/// saved: the microphone meter visibility and the last reported volume.
pub struct MotionSettingSync {
    sender: Arc<dyn MessageSender>,

    pub enable_no_hand_track_mode: SyncedField<bool>,

    pub enable_face_tracking: SyncedField<bool>,
    pub camera_device_name: SyncedField<String>,
    pub auto_blink_during_face_tracking: SyncedField<bool>,
    pub enable_body_lean_z: SyncedField<bool>,
    pub enable_blink_adjust: SyncedField<bool>,
    pub enable_voice_based_motion: SyncedField<bool>,
    pub disable_face_tracking_horizontal_flip: SyncedField<bool>,
    pub enable_image_based_hand_tracking: SyncedField<bool>,
    pub calibrate_face_data: SyncedField<String>,
    pub face_default_fun: SyncedField<i32>,
    pub face_neutral_clip: SyncedField<String>,
    pub face_offset_clip: SyncedField<String>,

    pub enable_lip_sync: SyncedField<bool>,
    pub lip_sync_microphone_device_name: SyncedField<String>,
    pub microphone_sensitivity: SyncedField<i32>,

    pub eyebrow_left_up_key: SyncedField<String>,
    pub eyebrow_left_down_key: SyncedField<String>,
    pub use_separated_key_for_eyebrow: SyncedField<bool>,
    pub eyebrow_right_up_key: SyncedField<String>,
    pub eyebrow_right_down_key: SyncedField<String>,
    pub eyebrow_up_scale: SyncedField<i32>,
    pub eyebrow_down_scale: SyncedField<i32>,

    pub length_from_wrist_to_palm: SyncedField<i32>,
    pub length_from_wrist_to_tip: SyncedField<i32>,
    pub hand_y_offset_basic: SyncedField<i32>,
    pub hand_y_offset_after_key_down: SyncedField<i32>,

    pub enable_wait_motion: SyncedField<bool>,
    pub wait_motion_scale: SyncedField<i32>,
    pub wait_motion_period: SyncedField<i32>,

    show_microphone_volume: SyncedField<bool>,
    microphone_volume_level: i32,
    avatar_extra_clip_names: Vec<String>,
}

impl MotionSettingSync {
    pub fn new(sender: &Arc<dyn MessageSender>) -> Self {
        let d = MotionSetting::default();
        let field = |command, value| SyncedField::new(sender, command, value);
        let text = |command, value: String| SyncedField::new(sender, command, value);
        let number = |command, value: i32| SyncedField::new(sender, command, value);

        Self {
            sender: sender.clone(),

            enable_no_hand_track_mode: field(send::ENABLE_NO_HAND_TRACK_MODE, d.enable_no_hand_track_mode),

            enable_face_tracking: field(send::ENABLE_FACE_TRACKING, d.enable_face_tracking),
            camera_device_name: text(send::SET_CAMERA_DEVICE_NAME, d.camera_device_name),
            auto_blink_during_face_tracking: field(
                send::AUTO_BLINK_DURING_FACE_TRACKING,
                d.auto_blink_during_face_tracking,
            ),
            enable_body_lean_z: field(send::ENABLE_BODY_LEAN_Z, d.enable_body_lean_z),
            enable_blink_adjust: field(send::ENABLE_BLINK_ADJUST, d.enable_blink_adjust),
            enable_voice_based_motion: field(send::ENABLE_VOICE_BASED_MOTION, d.enable_voice_based_motion),
            disable_face_tracking_horizontal_flip: field(
                send::DISABLE_FACE_TRACKING_HORIZONTAL_FLIP,
                d.disable_face_tracking_horizontal_flip,
            ),
            enable_image_based_hand_tracking: field(
                send::ENABLE_IMAGE_BASED_HAND_TRACKING,
                d.enable_image_based_hand_tracking,
            ),
            calibrate_face_data: text(send::SET_CALIBRATION_FACE_DATA, d.calibrate_face_data),
            face_default_fun: number(send::FACE_DEFAULT_FUN, d.face_default_fun),
            face_neutral_clip: text(send::FACE_NEUTRAL_CLIP, d.face_neutral_clip),
            face_offset_clip: text(send::FACE_OFFSET_CLIP, d.face_offset_clip),

            enable_lip_sync: field(send::ENABLE_LIP_SYNC, d.enable_lip_sync),
            lip_sync_microphone_device_name: text(
                send::SET_MICROPHONE_DEVICE_NAME,
                d.lip_sync_microphone_device_name,
            ),
            microphone_sensitivity: number(send::SET_MICROPHONE_SENSITIVITY, d.microphone_sensitivity),

            eyebrow_left_up_key: text(send::EYEBROW_LEFT_UP_KEY, d.eyebrow_left_up_key),
            eyebrow_left_down_key: text(send::EYEBROW_LEFT_DOWN_KEY, d.eyebrow_left_down_key),
            use_separated_key_for_eyebrow: field(
                send::USE_SEPARATED_KEY_FOR_EYEBROW,
                d.use_separated_key_for_eyebrow,
            ),
            eyebrow_right_up_key: text(send::EYEBROW_RIGHT_UP_KEY, d.eyebrow_right_up_key),
            eyebrow_right_down_key: text(send::EYEBROW_RIGHT_DOWN_KEY, d.eyebrow_right_down_key),
            eyebrow_up_scale: number(send::EYEBROW_UP_SCALE, d.eyebrow_up_scale),
            eyebrow_down_scale: number(send::EYEBROW_DOWN_SCALE, d.eyebrow_down_scale),

            length_from_wrist_to_palm: number(send::LENGTH_FROM_WRIST_TO_PALM, d.length_from_wrist_to_palm),
            length_from_wrist_to_tip: number(send::LENGTH_FROM_WRIST_TO_TIP, d.length_from_wrist_to_tip),
            hand_y_offset_basic: number(send::HAND_Y_OFFSET_BASIC, d.hand_y_offset_basic),
            hand_y_offset_after_key_down: number(
                send::HAND_Y_OFFSET_AFTER_KEY_DOWN,
                d.hand_y_offset_after_key_down,
            ),

            enable_wait_motion: field(send::ENABLE_WAIT_MOTION, d.enable_wait_motion),
            wait_motion_scale: number(send::WAIT_MOTION_SCALE, d.wait_motion_scale),
            wait_motion_period: number(send::WAIT_MOTION_PERIOD, d.wait_motion_period),

            show_microphone_volume: field(send::SET_MICROPHONE_VOLUME_VISIBILITY, false),
            microphone_volume_level: 0,
            avatar_extra_clip_names: Vec::new(),
        }
    }

    /// Turning lip sync off also hides the microphone meter.
    pub fn set_enable_lip_sync(&mut self, enabled: bool) {
        self.enable_lip_sync.apply_local(enabled);
        if !enabled {
            self.set_show_microphone_volume(false);
        }
    }

    pub fn show_microphone_volume(&self) -> bool {
        *self.show_microphone_volume.get()
    }

    pub fn set_show_microphone_volume(&mut self, visible: bool) {
        self.show_microphone_volume.apply_local(visible);
        if !visible {
            self.microphone_volume_level = 0;
        }
    }

    /// Last volume reported while the meter is shown.
    pub fn microphone_volume_level(&self) -> i32 {
        self.microphone_volume_level
    }

    /// Extra blend shape clips of the currently loaded avatar.
    pub fn avatar_extra_clip_names(&self) -> &[String] {
        &self.avatar_extra_clip_names
    }

    pub fn calibrate_face(&self) {
        self.sender.send_message(Message::command_only(send::CALIBRATE_FACE));
    }

    pub fn request_auto_adjust(&self) {
        self.sender
            .send_message(Message::command_only(send::REQUEST_AUTO_ADJUST));
    }

    pub fn request_auto_adjust_eyebrow(&self) {
        self.sender
            .send_message(Message::command_only(send::REQUEST_AUTO_ADJUST_EYEBROW));
    }

    /// Renderer already applied these values; store them without echoing.
    fn apply_auto_adjust(&mut self, params: &AutoAdjustParameters, include_hands: bool) {
        self.eyebrow_left_up_key
            .apply_remote(params.eyebrow_left_up_key.clone());
        self.eyebrow_left_down_key
            .apply_remote(params.eyebrow_left_down_key.clone());
        self.use_separated_key_for_eyebrow
            .apply_remote(params.use_separated_key_for_eyebrow);
        self.eyebrow_right_up_key
            .apply_remote(params.eyebrow_right_up_key.clone());
        self.eyebrow_right_down_key
            .apply_remote(params.eyebrow_right_down_key.clone());
        self.eyebrow_up_scale.apply_remote(params.eyebrow_up_scale);
        self.eyebrow_down_scale.apply_remote(params.eyebrow_down_scale);

        if include_hands {
            self.length_from_wrist_to_palm
                .apply_remote(params.length_from_wrist_to_palm);
            self.length_from_wrist_to_tip
                .apply_remote(params.length_from_wrist_to_tip);
        }
    }

    fn parse_auto_adjust(content: &str) -> Option<AutoAdjustParameters> {
        match serde_json::from_str(content) {
            Ok(params) => Some(params),
            Err(e) => {
                tracing::warn!("Ignoring malformed auto adjust result: {}", e);
                None
            }
        }
    }
}

impl SettingCategorySync for MotionSettingSync {
    type Data = MotionSetting;
    const NAME: &'static str = "motion";

    fn save(&self) -> MotionSetting {
        MotionSetting {
            enable_no_hand_track_mode: self.enable_no_hand_track_mode.value(),

            enable_face_tracking: self.enable_face_tracking.value(),
            camera_device_name: self.camera_device_name.value(),
            auto_blink_during_face_tracking: self.auto_blink_during_face_tracking.value(),
            enable_body_lean_z: self.enable_body_lean_z.value(),
            enable_blink_adjust: self.enable_blink_adjust.value(),
            enable_voice_based_motion: self.enable_voice_based_motion.value(),
            disable_face_tracking_horizontal_flip: self.disable_face_tracking_horizontal_flip.value(),
            enable_image_based_hand_tracking: self.enable_image_based_hand_tracking.value(),
            calibrate_face_data: self.calibrate_face_data.value(),
            face_default_fun: self.face_default_fun.value(),
            face_neutral_clip: self.face_neutral_clip.value(),
            face_offset_clip: self.face_offset_clip.value(),

            enable_lip_sync: self.enable_lip_sync.value(),
            lip_sync_microphone_device_name: self.lip_sync_microphone_device_name.value(),
            microphone_sensitivity: self.microphone_sensitivity.value(),

            eyebrow_left_up_key: self.eyebrow_left_up_key.value(),
            eyebrow_left_down_key: self.eyebrow_left_down_key.value(),
            use_separated_key_for_eyebrow: self.use_separated_key_for_eyebrow.value(),
            eyebrow_right_up_key: self.eyebrow_right_up_key.value(),
            eyebrow_right_down_key: self.eyebrow_right_down_key.value(),
            eyebrow_up_scale: self.eyebrow_up_scale.value(),
            eyebrow_down_scale: self.eyebrow_down_scale.value(),

            length_from_wrist_to_palm: self.length_from_wrist_to_palm.value(),
            length_from_wrist_to_tip: self.length_from_wrist_to_tip.value(),
            hand_y_offset_basic: self.hand_y_offset_basic.value(),
            hand_y_offset_after_key_down: self.hand_y_offset_after_key_down.value(),

            enable_wait_motion: self.enable_wait_motion.value(),
            wait_motion_scale: self.wait_motion_scale.value(),
            wait_motion_period: self.wait_motion_period.value(),
        }
    }

    fn load(&mut self, d: &MotionSetting) {
        self.enable_no_hand_track_mode.apply_local(d.enable_no_hand_track_mode);

        self.enable_face_tracking.apply_local(d.enable_face_tracking);
        self.camera_device_name.apply_local(d.camera_device_name.clone());
        self.auto_blink_during_face_tracking
            .apply_local(d.auto_blink_during_face_tracking);
        self.enable_body_lean_z.apply_local(d.enable_body_lean_z);
        self.enable_blink_adjust.apply_local(d.enable_blink_adjust);
        self.enable_voice_based_motion.apply_local(d.enable_voice_based_motion);
        self.disable_face_tracking_horizontal_flip
            .apply_local(d.disable_face_tracking_horizontal_flip);
        self.enable_image_based_hand_tracking
            .apply_local(d.enable_image_based_hand_tracking);
        self.calibrate_face_data.apply_local(d.calibrate_face_data.clone());
        self.face_default_fun.apply_local(d.face_default_fun);
        self.face_neutral_clip.apply_local(d.face_neutral_clip.clone());
        self.face_offset_clip.apply_local(d.face_offset_clip.clone());

        self.set_enable_lip_sync(d.enable_lip_sync);
        self.lip_sync_microphone_device_name
            .apply_local(d.lip_sync_microphone_device_name.clone());
        self.microphone_sensitivity.apply_local(d.microphone_sensitivity);

        self.eyebrow_left_up_key.apply_local(d.eyebrow_left_up_key.clone());
        self.eyebrow_left_down_key.apply_local(d.eyebrow_left_down_key.clone());
        self.use_separated_key_for_eyebrow
            .apply_local(d.use_separated_key_for_eyebrow);
        self.eyebrow_right_up_key.apply_local(d.eyebrow_right_up_key.clone());
        self.eyebrow_right_down_key
            .apply_local(d.eyebrow_right_down_key.clone());
        self.eyebrow_up_scale.apply_local(d.eyebrow_up_scale);
        self.eyebrow_down_scale.apply_local(d.eyebrow_down_scale);

        self.length_from_wrist_to_palm.apply_local(d.length_from_wrist_to_palm);
        self.length_from_wrist_to_tip.apply_local(d.length_from_wrist_to_tip);
        self.hand_y_offset_basic.apply_local(d.hand_y_offset_basic);
        self.hand_y_offset_after_key_down
            .apply_local(d.hand_y_offset_after_key_down);

        self.enable_wait_motion.apply_local(d.enable_wait_motion);
        self.wait_motion_scale.apply_local(d.wait_motion_scale);
        self.wait_motion_period.apply_local(d.wait_motion_period);
    }

    fn reset_to_default(&mut self) {
        self.load(&MotionSetting::default());
    }

    fn handle_inbound(&mut self, message: &Message) -> bool {
        match message.command.as_str() {
            receive::SET_CALIBRATION_FACE_DATA => {
                self.calibrate_face_data.apply_remote(message.content.clone());
                true
            }
            receive::AUTO_ADJUST_RESULTS => {
                if let Some(params) = Self::parse_auto_adjust(&message.content) {
                    self.apply_auto_adjust(&params, true);
                }
                true
            }
            receive::AUTO_ADJUST_EYEBROW_RESULTS => {
                if let Some(params) = Self::parse_auto_adjust(&message.content) {
                    self.apply_auto_adjust(&params, false);
                }
                true
            }
            receive::MICROPHONE_VOLUME_LEVEL => {
                if self.show_microphone_volume() {
                    match message.content.trim().parse::<i32>() {
                        Ok(level) => self.microphone_volume_level = level,
                        Err(e) => tracing::debug!("Bad microphone volume '{}': {}", message.content, e),
                    }
                }
                true
            }
            receive::EXTRA_BLEND_SHAPE_CLIP_NAMES => {
                self.avatar_extra_clip_names = message
                    .content
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::test_support::RecordingSender;

    fn motion() -> (Arc<RecordingSender>, MotionSettingSync) {
        let recorder = Arc::new(RecordingSender::new());
        let sender: Arc<dyn MessageSender> = recorder.clone();
        (recorder, MotionSettingSync::new(&sender))
    }

    #[test]
    fn test_calibration_data_is_not_echoed() {
        let (recorder, mut motion) = motion();
        let msg = Message::new(receive::SET_CALIBRATION_FACE_DATA, "{\"pitch\":3}");

        assert!(motion.handle_inbound(&msg));
        assert_eq!(motion.calibrate_face_data.get(), "{\"pitch\":3}");
        assert!(recorder.delivered().is_empty());
        assert_eq!(motion.save().calibrate_face_data, "{\"pitch\":3}");
    }

    #[test]
    fn test_auto_adjust_results_update_eyebrow_and_hands() {
        let (recorder, mut motion) = motion();
        let json = r#"{"EyebrowLeftUpKey":"Surprised","EyebrowUpScale":80,"LengthFromWristToPalm":7,"LengthFromWristToTip":14}"#;

        assert!(motion.handle_inbound(&Message::new(receive::AUTO_ADJUST_RESULTS, json)));
        assert_eq!(motion.eyebrow_left_up_key.get(), "Surprised");
        assert_eq!(motion.eyebrow_up_scale.value(), 80);
        assert_eq!(motion.length_from_wrist_to_palm.value(), 7);
        assert_eq!(motion.length_from_wrist_to_tip.value(), 14);
        assert!(recorder.delivered().is_empty());
    }

    #[test]
    fn test_eyebrow_results_leave_hands_alone() {
        let (_, mut motion) = motion();
        let json = r#"{"EyebrowDownScale":90}"#;

        motion.handle_inbound(&Message::new(receive::AUTO_ADJUST_EYEBROW_RESULTS, json));
        assert_eq!(motion.eyebrow_down_scale.value(), 90);
        assert_eq!(motion.length_from_wrist_to_palm.value(), 6);
    }

    #[test]
    fn test_malformed_auto_adjust_changes_nothing() {
        let (_, mut motion) = motion();
        let before = motion.save();
        assert!(motion.handle_inbound(&Message::new(receive::AUTO_ADJUST_RESULTS, "not json")));
        assert_eq!(motion.save(), before);
    }

    #[test]
    fn test_volume_only_tracked_while_meter_shown() {
        let (recorder, mut motion) = motion();
        let level = Message::new(receive::MICROPHONE_VOLUME_LEVEL, "30");

        motion.handle_inbound(&level);
        assert_eq!(motion.microphone_volume_level(), 0);

        motion.set_show_microphone_volume(true);
        motion.handle_inbound(&level);
        assert_eq!(motion.microphone_volume_level(), 30);

        motion.set_enable_lip_sync(false);
        assert!(!motion.show_microphone_volume());
        assert_eq!(motion.microphone_volume_level(), 0);

        assert_eq!(
            recorder.delivered(),
            vec![
                Message::new(send::SET_MICROPHONE_VOLUME_VISIBILITY, "True"),
                Message::new(send::ENABLE_LIP_SYNC, "False"),
                Message::new(send::SET_MICROPHONE_VOLUME_VISIBILITY, "False"),
            ]
        );
    }

    #[test]
    fn test_extra_clip_names_parsed() {
        let (_, mut motion) = motion();
        motion.handle_inbound(&Message::new(receive::EXTRA_BLEND_SHAPE_CLIP_NAMES, "Smile,,Wink"));
        assert_eq!(motion.avatar_extra_clip_names(), ["Smile", "Wink"]);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (_, mut motion) = motion();
        motion.wait_motion_scale.apply_local(300);
        motion.camera_device_name.apply_local("USB Camera");
        motion.reset_to_default();
        assert_eq!(motion.save(), MotionSetting::default());
    }
}
