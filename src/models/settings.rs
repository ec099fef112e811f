use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 8-bit RGB color, `"r,g,b"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected r,g,b but got '{}'", s));
        }
        let channel = |p: &str| p.parse::<u8>().map_err(|e| format!("bad channel '{}': {}", p, e));
        Ok(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
    }
}

/// Window block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowSetting {
    pub background_color: Rgb,
    pub is_transparent: bool,
    pub window_draggable: bool,
    pub top_most: bool,
    pub background_image_path: String,
    pub whole_window_transparency_level: i32,
    pub alpha_value_on_transparent: i32,
}

impl Default for WindowSetting {
    fn default() -> Self {
        Self {
            background_color: Rgb::new(0, 255, 0),
            is_transparent: false,
            window_draggable: true,
            top_most: true,
            background_image_path: String::new(),
            whole_window_transparency_level: 2,
            alpha_value_on_transparent: 128,
        }
    }
}

/// Motion block: face, mouth, eyebrow, hand and wait motion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MotionSetting {
    pub enable_no_hand_track_mode: bool,

    pub enable_face_tracking: bool,
    pub camera_device_name: String,
    pub auto_blink_during_face_tracking: bool,
    pub enable_body_lean_z: bool,
    pub enable_blink_adjust: bool,
    pub enable_voice_based_motion: bool,
    pub disable_face_tracking_horizontal_flip: bool,
    pub enable_image_based_hand_tracking: bool,
    pub calibrate_face_data: String,
    pub face_default_fun: i32,
    pub face_neutral_clip: String,
    pub face_offset_clip: String,

    pub enable_lip_sync: bool,
    pub lip_sync_microphone_device_name: String,
    pub microphone_sensitivity: i32,

    pub eyebrow_left_up_key: String,
    pub eyebrow_left_down_key: String,
    pub use_separated_key_for_eyebrow: bool,
    pub eyebrow_right_up_key: String,
    pub eyebrow_right_down_key: String,
    pub eyebrow_up_scale: i32,
    pub eyebrow_down_scale: i32,

    pub length_from_wrist_to_palm: i32,
    pub length_from_wrist_to_tip: i32,
    pub hand_y_offset_basic: i32,
    pub hand_y_offset_after_key_down: i32,

    pub enable_wait_motion: bool,
    pub wait_motion_scale: i32,
    pub wait_motion_period: i32,
}

impl Default for MotionSetting {
    fn default() -> Self {
        Self {
            enable_no_hand_track_mode: false,

            enable_face_tracking: true,
            camera_device_name: String::new(),
            auto_blink_during_face_tracking: true,
            enable_body_lean_z: false,
            enable_blink_adjust: true,
            enable_voice_based_motion: true,
            disable_face_tracking_horizontal_flip: false,
            enable_image_based_hand_tracking: false,
            calibrate_face_data: String::new(),
            face_default_fun: 20,
            face_neutral_clip: String::new(),
            face_offset_clip: String::new(),

            enable_lip_sync: true,
            lip_sync_microphone_device_name: String::new(),
            microphone_sensitivity: 0,

            eyebrow_left_up_key: String::new(),
            eyebrow_left_down_key: String::new(),
            use_separated_key_for_eyebrow: false,
            eyebrow_right_up_key: String::new(),
            eyebrow_right_down_key: String::new(),
            eyebrow_up_scale: 100,
            eyebrow_down_scale: 100,

            length_from_wrist_to_palm: 6,
            length_from_wrist_to_tip: 12,
            hand_y_offset_basic: 3,
            hand_y_offset_after_key_down: 2,

            enable_wait_motion: true,
            wait_motion_scale: 125,
            wait_motion_period: 10,
        }
    }
}

/// Parameters the renderer measures on the loaded avatar.
///
/// Sent as JSON with the renderer's PascalCase keys. Eyebrow-only results
/// leave the hand fields at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AutoAdjustParameters {
    pub eyebrow_left_up_key: String,
    pub eyebrow_left_down_key: String,
    pub use_separated_key_for_eyebrow: bool,
    pub eyebrow_right_up_key: String,
    pub eyebrow_right_down_key: String,
    pub eyebrow_up_scale: i32,
    pub eyebrow_down_scale: i32,

    pub length_from_wrist_to_palm: i32,
    pub length_from_wrist_to_tip: i32,
}

/// Layout block. The gamepad block is nested here in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSetting {
    pub camera_fov: i32,
    pub enable_mid_hold: bool,
    pub hid_visibility: bool,
    pub pen_visibility: bool,
    pub midi_controller_visibility: bool,
    pub selected_typing_effect_id: i32,
    pub hide_unused_devices: bool,

    pub camera_position: String,
    pub device_layout: String,
    pub quick_save_view_point_1: String,
    pub quick_save_view_point_2: String,
    pub quick_save_view_point_3: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamepad: Option<GamepadSetting>,
}

impl Default for LayoutSetting {
    fn default() -> Self {
        Self {
            camera_fov: 40,
            enable_mid_hold: false,
            hid_visibility: true,
            pen_visibility: true,
            midi_controller_visibility: false,
            selected_typing_effect_id: 0,
            hide_unused_devices: false,

            camera_position: String::new(),
            device_layout: String::new(),
            quick_save_view_point_1: String::new(),
            quick_save_view_point_2: String::new(),
            quick_save_view_point_3: String::new(),

            gamepad: None,
        }
    }
}

/// Which gamepad input drives body lean. Wire value is the integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamepadLeanMode {
    None,
    #[default]
    LeftStick,
    RightStick,
    LeftButtons,
}

impl GamepadLeanMode {
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::LeftStick => 1,
            Self::RightStick => 2,
            Self::LeftButtons => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GamepadSetting {
    pub gamepad_enabled: bool,
    pub prefer_direct_input_gamepad: bool,
    pub gamepad_lean_mode: GamepadLeanMode,
    pub gamepad_lean_reverse_horizontal: bool,
    pub gamepad_lean_reverse_vertical: bool,
}

impl Default for GamepadSetting {
    fn default() -> Self {
        Self {
            gamepad_enabled: true,
            prefer_direct_input_gamepad: false,
            gamepad_lean_mode: GamepadLeanMode::LeftStick,
            gamepad_lean_reverse_horizontal: false,
            gamepad_lean_reverse_vertical: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LightSetting {
    pub light_intensity: i32,
    pub light_yaw: i32,
    pub light_pitch: i32,
    pub light_color: Rgb,

    pub enable_shadow: bool,
    pub shadow_intensity: i32,

    pub enable_bloom: bool,
    pub bloom_intensity: i32,

    pub enable_wind: bool,
    pub wind_strength: i32,
}

impl Default for LightSetting {
    fn default() -> Self {
        Self {
            light_intensity: 100,
            light_yaw: -30,
            light_pitch: 50,
            light_color: Rgb::new(255, 255, 255),

            enable_shadow: true,
            shadow_intensity: 65,

            enable_bloom: true,
            bloom_intensity: 50,

            enable_wind: true,
            wind_strength: 100,
        }
    }
}

/// Input device that triggers word-to-motion items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WordToMotionDevice {
    None,
    #[default]
    KeyboardWord,
    Gamepad,
    KeyboardTenKey,
    MidiController,
}

impl WordToMotionDevice {
    pub fn code(self) -> i32 {
        match self {
            Self::None => -1,
            Self::KeyboardWord => 0,
            Self::Gamepad => 1,
            Self::KeyboardTenKey => 2,
            Self::MidiController => 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WordToMotionSetting {
    pub selected_device: WordToMotionDevice,
    /// Serialized motion items as produced by the UI; opaque here.
    pub items_content: String,
    pub midi_note_to_motion_map: String,
    /// Blend shape clips seen on any avatar, in first-seen order.
    pub extra_blend_shape_clip_names: IndexSet<String>,
}

/// Face tracker application feeding the external tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExternalTrackerSource {
    #[default]
    None,
    IFacialMocap,
}

impl ExternalTrackerSource {
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::IFacialMocap => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalTrackerSetting {
    pub enable_external_tracking: bool,
    pub enable_lip_sync: bool,
    pub enable_emphasize_expression: bool,
    pub enable_perfect_sync: bool,
    pub tracker_source: ExternalTrackerSource,
    /// Connection settings for the selected source app.
    pub app_specific_settings: String,
    pub calibration_data: String,
    pub face_switch_setting: String,
}

impl Default for ExternalTrackerSetting {
    fn default() -> Self {
        Self {
            enable_external_tracking: false,
            enable_lip_sync: true,
            enable_emphasize_expression: false,
            enable_perfect_sync: false,
            tracker_source: ExternalTrackerSource::None,
            app_specific_settings: String::new(),
            calibration_data: String::new(),
            face_switch_setting: String::new(),
        }
    }
}
